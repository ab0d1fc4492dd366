use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::roles::{Designation, Role};

static NOTHING_VISIBLE: Visibility = Visibility::Only(BTreeSet::new());

/// Roles a viewer may see in employee listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VisibilityRepr", into = "VisibilityRepr")]
pub enum Visibility {
    All,
    Only(BTreeSet<Role>),
}

impl Visibility {
    pub fn only(roles: &[Role]) -> Self {
        Visibility::Only(roles.iter().copied().collect())
    }

    pub fn admits(&self, designation: &Designation) -> bool {
        match (self, designation) {
            (Visibility::All, _) => true,
            (Visibility::Only(roles), Designation::Known(role)) => roles.contains(role),
            (Visibility::Only(_), Designation::Unrecognized(_)) => false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum VisibilityRepr {
    Keyword(String),
    Roles(BTreeSet<Role>),
}

impl TryFrom<VisibilityRepr> for Visibility {
    type Error = String;

    fn try_from(value: VisibilityRepr) -> Result<Self, Self::Error> {
        match value {
            VisibilityRepr::Keyword(word) if word.eq_ignore_ascii_case("all") => Ok(Visibility::All),
            VisibilityRepr::Keyword(word) => Err(format!(
                "expected \"all\" or a list of designations, found \"{word}\""
            )),
            VisibilityRepr::Roles(roles) => Ok(Visibility::Only(roles)),
        }
    }
}

impl From<Visibility> for VisibilityRepr {
    fn from(value: Visibility) -> Self {
        match value {
            Visibility::All => VisibilityRepr::Keyword("all".into()),
            Visibility::Only(roles) => VisibilityRepr::Roles(roles),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityTable {
    entries: BTreeMap<Role, Visibility>,
}

impl VisibilityTable {
    pub fn standard() -> Self {
        Role::ALL
            .into_iter()
            .map(|role| (role, standard_visibility(role)))
            .collect()
    }

    /// Visibility of `role`; a role missing from the table sees nobody.
    pub fn lookup(&self, role: Role) -> &Visibility {
        self.entries.get(&role).unwrap_or(&NOTHING_VISIBLE)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.entries.contains_key(&role)
    }

    pub fn insert(&mut self, role: Role, visibility: Visibility) -> Option<Visibility> {
        self.entries.insert(role, visibility)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &Visibility)> {
        self.entries.iter().map(|(role, visibility)| (*role, visibility))
    }
}

impl FromIterator<(Role, Visibility)> for VisibilityTable {
    fn from_iter<I: IntoIterator<Item = (Role, Visibility)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn standard_visibility(role: Role) -> Visibility {
    use Role::*;

    match role {
        SuperAdmin | Director | SchoolAdministrator => Visibility::All,
        GroundSupervisor => Visibility::only(&[
            GroundSupervisor,
            Director,
            Guard,
            Gardener,
            Housekeeping,
            Electrician,
        ]),
        StableManager => Visibility::only(&[
            StableManager,
            Director,
            Jamedar,
            Groom,
            RidingBoy,
            Farrier,
            Rider,
            Instructor,
        ]),
        SeniorExecutiveAdmin => Visibility::only(&[
            SeniorExecutiveAdmin,
            Director,
            ExecutiveAdmin,
            SeniorExecutiveAccounts,
            ExecutiveAccounts,
            GroundSupervisor,
            StableManager,
            Guard,
            Gardener,
            Housekeeping,
            Electrician,
        ]),
        SeniorExecutiveAccounts => Visibility::only(&[
            SeniorExecutiveAccounts,
            Director,
            ExecutiveAccounts,
            SeniorExecutiveAdmin,
            ExecutiveAdmin,
            GroundSupervisor,
            StableManager,
        ]),
        ExecutiveAdmin => Visibility::only(&[
            ExecutiveAdmin,
            SeniorExecutiveAdmin,
            Guard,
            Gardener,
            Housekeeping,
            Electrician,
        ]),
        ExecutiveAccounts => Visibility::only(&[ExecutiveAccounts, SeniorExecutiveAccounts]),
        Instructor => Visibility::only(&[Instructor, SchoolAdministrator, Rider, RidingBoy]),
        Rider => Visibility::only(&[Rider, SchoolAdministrator, Instructor]),
        Jamedar => Visibility::only(&[Jamedar, StableManager, Groom, RidingBoy, Farrier]),
        Groom => Visibility::only(&[Groom, Jamedar, StableManager]),
        RidingBoy => Visibility::only(&[RidingBoy, StableManager, Jamedar]),
        Farrier => Visibility::only(&[Farrier, StableManager]),
        Guard => Visibility::only(&[Guard, GroundSupervisor]),
        Gardener => Visibility::only(&[Gardener, GroundSupervisor]),
        Housekeeping => Visibility::only(&[Housekeeping, GroundSupervisor]),
        Electrician => Visibility::only(&[Electrician, GroundSupervisor]),
    }
}
