//! Employee visibility and hierarchy resolution.
//!
//! Given the designation of whoever is looking at a listing and the employees
//! returned by the directory, decides which employees are shown and in which
//! order. Everything here is pure and synchronous; the tables are read-only
//! once constructed and can be shared freely between threads.

pub mod directory;
pub mod hierarchy;
pub mod roles;
pub mod roster;
pub mod visibility;

pub use directory::{RoleDirectory, RolePriority, TableIssue, TableLoadError};
pub use hierarchy::{HierarchyEntry, HierarchyTable};
pub use roles::{Designation, Role, RoleParseError};
pub use roster::{EmployeeId, EmployeeRecord, RosterEntry, RosterQuery, filter_and_sort};
pub use visibility::{Visibility, VisibilityTable};
