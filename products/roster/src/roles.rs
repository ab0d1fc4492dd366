use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleParseError {
    #[error("unknown designation `{0}`")]
    Unknown(String),
}

/// Every designation an employee of the facility can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    SuperAdmin,
    Director,
    SchoolAdministrator,
    GroundSupervisor,
    StableManager,
    SeniorExecutiveAdmin,
    SeniorExecutiveAccounts,
    ExecutiveAdmin,
    ExecutiveAccounts,
    Guard,
    Gardener,
    Housekeeping,
    Electrician,
    Groom,
    RidingBoy,
    Rider,
    Instructor,
    Farrier,
    Jamedar,
}

impl Role {
    pub const ALL: [Role; 19] = [
        Role::SuperAdmin,
        Role::Director,
        Role::SchoolAdministrator,
        Role::GroundSupervisor,
        Role::StableManager,
        Role::SeniorExecutiveAdmin,
        Role::SeniorExecutiveAccounts,
        Role::ExecutiveAdmin,
        Role::ExecutiveAccounts,
        Role::Guard,
        Role::Gardener,
        Role::Housekeeping,
        Role::Electrician,
        Role::Groom,
        Role::RidingBoy,
        Role::Rider,
        Role::Instructor,
        Role::Farrier,
        Role::Jamedar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Director => "Director",
            Role::SchoolAdministrator => "School Administrator",
            Role::GroundSupervisor => "Ground Supervisor",
            Role::StableManager => "Stable Manager",
            Role::SeniorExecutiveAdmin => "Senior Executive Admin",
            Role::SeniorExecutiveAccounts => "Senior Executive Accounts",
            Role::ExecutiveAdmin => "Executive Admin",
            Role::ExecutiveAccounts => "Executive Accounts",
            Role::Guard => "Guard",
            Role::Gardener => "Gardener",
            Role::Housekeeping => "Housekeeping",
            Role::Electrician => "Electrician",
            Role::Groom => "Groom",
            Role::RidingBoy => "Riding Boy",
            Role::Rider => "Rider",
            Role::Instructor => "Instructor",
            Role::Farrier => "Farrier",
            Role::Jamedar => "Jamedar",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = normalize_label(value);
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(&key))
            .ok_or_else(|| RoleParseError::Unknown(value.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// Collapses `_`, `-` and whitespace runs into single spaces.
fn normalize_label(value: &str) -> String {
    value
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The designation carried by an external record or viewer.
///
/// Directory data is free text and can hold legacy titles the role tables
/// have never heard of. Those are kept verbatim so they can be echoed back
/// and receive the "no relationship" defaults instead of failing the call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Designation {
    Known(Role),
    Unrecognized(String),
}

impl Designation {
    pub fn parse(value: &str) -> Self {
        match value.parse::<Role>() {
            Ok(role) => Designation::Known(role),
            Err(_) => Designation::Unrecognized(value.trim().to_string()),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Designation::Known(role) => Some(*role),
            Designation::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Designation::Known(role) => role.as_str(),
            Designation::Unrecognized(raw) => raw,
        }
    }
}

impl From<Role> for Designation {
    fn from(value: Role) -> Self {
        Designation::Known(value)
    }
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Designation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Designation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Designation::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_parse() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn parse_tolerates_case_and_separators() {
        assert_eq!("stable_manager".parse::<Role>(), Ok(Role::StableManager));
        assert_eq!("  RIDING-boy ".parse::<Role>(), Ok(Role::RidingBoy));
        assert_eq!(
            "Senior   Executive\tAccounts".parse::<Role>(),
            Ok(Role::SeniorExecutiveAccounts)
        );
    }

    #[test]
    fn unknown_label_is_an_error() {
        assert_eq!(
            "Vet".parse::<Role>(),
            Err(RoleParseError::Unknown("Vet".into()))
        );
    }

    #[test]
    fn designation_keeps_unrecognized_text() {
        let designation = Designation::parse(" Head Trainer ");
        assert_eq!(designation, Designation::Unrecognized("Head Trainer".into()));
        assert_eq!(designation.role(), None);
        assert_eq!(Designation::parse("groom"), Designation::Known(Role::Groom));
    }

    #[test]
    fn serde_uses_canonical_labels() {
        let json = serde_json::to_string(&Role::SchoolAdministrator).unwrap();
        assert_eq!(json, "\"School Administrator\"");
        let back: Role = serde_json::from_str("\"school administrator\"").unwrap();
        assert_eq!(back, Role::SchoolAdministrator);
        assert!(serde_json::from_str::<Role>("\"Vet\"").is_err());

        let designation: Designation = serde_json::from_str("\"Vet\"").unwrap();
        assert_eq!(serde_json::to_string(&designation).unwrap(), "\"Vet\"");
    }
}
