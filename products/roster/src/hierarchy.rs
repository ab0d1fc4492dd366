//! Chain-of-command table used to prioritise employees relative to a viewer.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::roles::Role;

static NO_RELATIONS: HierarchyEntry = HierarchyEntry {
    superiors: BTreeSet::new(),
    subordinates: BTreeSet::new(),
};

/// Declared superior and subordinate roles of a single role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEntry {
    #[serde(default)]
    pub superiors: BTreeSet<Role>,
    #[serde(default)]
    pub subordinates: BTreeSet<Role>,
}

impl HierarchyEntry {
    pub fn new(superiors: &[Role], subordinates: &[Role]) -> Self {
        Self {
            superiors: superiors.iter().copied().collect(),
            subordinates: subordinates.iter().copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.superiors.is_empty() && self.subordinates.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HierarchyTable {
    entries: BTreeMap<Role, HierarchyEntry>,
}

impl HierarchyTable {
    pub fn standard() -> Self {
        Role::ALL
            .into_iter()
            .map(|role| (role, standard_entry(role)))
            .collect()
    }

    /// Entry for `role`; roles absent from the table relate to nobody.
    pub fn lookup(&self, role: Role) -> &HierarchyEntry {
        self.entries.get(&role).unwrap_or(&NO_RELATIONS)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.entries.contains_key(&role)
    }

    pub fn insert(&mut self, role: Role, entry: HierarchyEntry) -> Option<HierarchyEntry> {
        self.entries.insert(role, entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &HierarchyEntry)> {
        self.entries.iter().map(|(role, entry)| (*role, entry))
    }
}

impl FromIterator<(Role, HierarchyEntry)> for HierarchyTable {
    fn from_iter<I: IntoIterator<Item = (Role, HierarchyEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn standard_entry(role: Role) -> HierarchyEntry {
    use Role::*;

    match role {
        SuperAdmin => HierarchyEntry::new(
            &[],
            &[
                Director,
                SchoolAdministrator,
                GroundSupervisor,
                StableManager,
                SeniorExecutiveAdmin,
                SeniorExecutiveAccounts,
                ExecutiveAdmin,
                ExecutiveAccounts,
                Instructor,
                Rider,
                Jamedar,
                RidingBoy,
                Farrier,
                Groom,
                Guard,
                Gardener,
                Housekeeping,
                Electrician,
            ],
        ),
        Director => HierarchyEntry::new(
            &[SuperAdmin],
            &[
                SchoolAdministrator,
                GroundSupervisor,
                StableManager,
                SeniorExecutiveAdmin,
                SeniorExecutiveAccounts,
                ExecutiveAdmin,
                ExecutiveAccounts,
                Instructor,
                Rider,
                Jamedar,
                RidingBoy,
                Farrier,
                Groom,
                Guard,
                Gardener,
                Housekeeping,
                Electrician,
            ],
        ),
        SchoolAdministrator => HierarchyEntry::new(&[Director, SuperAdmin], &[Instructor, Rider]),
        GroundSupervisor => HierarchyEntry::new(
            &[Director, SuperAdmin],
            &[Guard, Gardener, Housekeeping, Electrician],
        ),
        StableManager => HierarchyEntry::new(
            &[Director, SuperAdmin],
            &[Jamedar, RidingBoy, Farrier, Groom],
        ),
        SeniorExecutiveAdmin => HierarchyEntry::new(&[Director, SuperAdmin], &[ExecutiveAdmin]),
        SeniorExecutiveAccounts => {
            HierarchyEntry::new(&[Director, SuperAdmin], &[ExecutiveAccounts])
        }
        ExecutiveAdmin => HierarchyEntry::new(&[SeniorExecutiveAdmin, Director, SuperAdmin], &[]),
        ExecutiveAccounts => {
            HierarchyEntry::new(&[SeniorExecutiveAccounts, Director, SuperAdmin], &[])
        }
        Instructor | Rider => {
            HierarchyEntry::new(&[SchoolAdministrator, Director, SuperAdmin], &[])
        }
        Jamedar => HierarchyEntry::new(&[StableManager, Director, SuperAdmin], &[Groom]),
        RidingBoy | Farrier => HierarchyEntry::new(&[StableManager, Director, SuperAdmin], &[]),
        Groom => HierarchyEntry::new(&[Jamedar, StableManager, Director, SuperAdmin], &[]),
        Guard | Gardener | Housekeeping | Electrician => {
            HierarchyEntry::new(&[GroundSupervisor, Director, SuperAdmin], &[])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_covers_every_role() {
        let table = HierarchyTable::standard();
        for role in Role::ALL {
            assert!(table.contains(role), "{role} missing");
        }
    }

    #[test]
    fn missing_role_has_no_relations() {
        let table = HierarchyTable::default();
        assert!(table.lookup(Role::Groom).is_empty());
    }

    #[test]
    fn groom_reports_up_to_super_admin() {
        let table = HierarchyTable::standard();
        let groom = table.lookup(Role::Groom);
        assert!(groom.superiors.contains(&Role::Jamedar));
        assert!(groom.superiors.contains(&Role::SuperAdmin));
        assert!(groom.subordinates.is_empty());
        assert!(table.lookup(Role::StableManager).subordinates.contains(&Role::Groom));
    }

    #[test]
    fn no_role_is_its_own_superior_or_subordinate() {
        let table = HierarchyTable::standard();
        for (role, entry) in table.iter() {
            assert!(!entry.superiors.contains(&role));
            assert!(!entry.subordinates.contains(&role));
        }
    }

    #[test]
    fn table_deserializes_from_labels() {
        let table: HierarchyTable = serde_json::from_str(
            r#"{"Groom": {"superiors": ["Jamedar"]}, "jamedar": {"subordinates": ["Groom"]}}"#,
        )
        .unwrap();
        assert_eq!(
            table.lookup(Role::Groom),
            &HierarchyEntry::new(&[Role::Jamedar], &[])
        );
        assert_eq!(
            table.lookup(Role::Jamedar),
            &HierarchyEntry::new(&[], &[Role::Groom])
        );
    }
}
