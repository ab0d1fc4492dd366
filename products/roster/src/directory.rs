//! Process-wide registry holding the hierarchy and visibility tables.

use std::{fmt, fs, path::Path};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    hierarchy::{HierarchyEntry, HierarchyTable},
    roles::{Designation, Role},
    visibility::{Visibility, VisibilityTable},
};

static SHARED: Lazy<RoleDirectory> = Lazy::new(RoleDirectory::standard);

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("failed to read role tables from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid role tables: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("visibility of {0} does not include its own role")]
    SelfNotVisible(Role),
}

/// Sort priority of an employee's role relative to the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RolePriority {
    Superior = 1,
    Peer = 2,
    Subordinate = 3,
    Unrelated = 4,
}

impl RolePriority {
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// Inconsistency found while auditing the tables. Issues are reported, never repaired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableIssue {
    /// `superior` lists `role` as a subordinate but `role` does not list it back.
    MissingSuperior { role: Role, superior: Role },
    /// `subordinate` lists `role` as a superior but `role` does not list it back.
    MissingSubordinate { role: Role, subordinate: Role },
    MissingHierarchy(Role),
    MissingVisibility(Role),
}

impl fmt::Display for TableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIssue::MissingSuperior { role, superior } => write!(
                f,
                "{superior} lists {role} as subordinate but {role} does not list {superior} as superior"
            ),
            TableIssue::MissingSubordinate { role, subordinate } => write!(
                f,
                "{subordinate} lists {role} as superior but {role} does not list {subordinate} as subordinate"
            ),
            TableIssue::MissingHierarchy(role) => write!(f, "{role} has no hierarchy entry"),
            TableIssue::MissingVisibility(role) => write!(f, "{role} has no visibility entry"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDirectory {
    #[serde(default)]
    pub hierarchy: HierarchyTable,
    #[serde(default)]
    pub visibility: VisibilityTable,
}

impl RoleDirectory {
    pub fn new(hierarchy: HierarchyTable, visibility: VisibilityTable) -> Self {
        Self {
            hierarchy,
            visibility,
        }
    }

    /// The tables the facility ships with.
    pub fn standard() -> Self {
        Self::new(HierarchyTable::standard(), VisibilityTable::standard())
    }

    /// Read-only instance shared by every caller in the process.
    pub fn shared() -> &'static RoleDirectory {
        &SHARED
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TableLoadError> {
        let directory: RoleDirectory = serde_json::from_str(raw)?;
        for (role, visibility) in directory.visibility.iter() {
            if !visibility.admits(&Designation::Known(role)) {
                return Err(TableLoadError::SelfNotVisible(role));
            }
        }
        Ok(directory)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableLoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| TableLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn hierarchy_of(&self, role: Role) -> &HierarchyEntry {
        if !self.hierarchy.contains(role) {
            debug!(role = %role, "no hierarchy entry; treating as unrelated to everyone");
        }
        self.hierarchy.lookup(role)
    }

    pub fn visibility_of(&self, role: Role) -> &Visibility {
        if !self.visibility.contains(role) {
            warn!(role = %role, "no visibility entry; viewer will see nobody");
        }
        self.visibility.lookup(role)
    }

    pub fn can_see(&self, viewer: &Designation, designation: &Designation) -> bool {
        match viewer {
            Designation::Known(role) => self.visibility_of(*role).admits(designation),
            Designation::Unrecognized(_) => false,
        }
    }

    /// Where `designation` ranks for `viewer` within an approval group.
    pub fn relation(&self, viewer: &Designation, designation: &Designation) -> RolePriority {
        let empty = HierarchyEntry::default();
        let entry = match viewer {
            Designation::Known(role) => self.hierarchy.lookup(*role),
            Designation::Unrecognized(_) => &empty,
        };
        priority_within(entry, viewer, designation)
    }

    /// Checks that the two tables agree with each other and cover every role.
    pub fn audit(&self) -> Vec<TableIssue> {
        let mut issues = Vec::new();
        for role in Role::ALL {
            if !self.hierarchy.contains(role) {
                issues.push(TableIssue::MissingHierarchy(role));
            }
            if !self.visibility.contains(role) {
                issues.push(TableIssue::MissingVisibility(role));
            }
        }
        for (role, entry) in self.hierarchy.iter() {
            for subordinate in &entry.subordinates {
                if !self.hierarchy.lookup(*subordinate).superiors.contains(&role) {
                    issues.push(TableIssue::MissingSuperior {
                        role: *subordinate,
                        superior: role,
                    });
                }
            }
            for superior in &entry.superiors {
                if !self.hierarchy.lookup(*superior).subordinates.contains(&role) {
                    issues.push(TableIssue::MissingSubordinate {
                        role: *superior,
                        subordinate: role,
                    });
                }
            }
        }
        issues
    }
}

pub(crate) fn priority_within(
    entry: &HierarchyEntry,
    viewer: &Designation,
    designation: &Designation,
) -> RolePriority {
    match designation {
        Designation::Known(role) if entry.superiors.contains(role) => RolePriority::Superior,
        _ if designation == viewer => RolePriority::Peer,
        Designation::Known(role) if entry.subordinates.contains(role) => RolePriority::Subordinate,
        _ => RolePriority::Unrelated,
    }
}
