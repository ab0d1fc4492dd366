use std::{cmp::Ordering, fmt};

use icu_collator::{CaseFirst, Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::{
    directory::{RoleDirectory, RolePriority, priority_within},
    roles::Designation,
};

/// Identifier assigned by the employee directory; numeric or opaque text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmployeeId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeId::Number(id) => write!(f, "{id}"),
            EmployeeId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EmployeeId {
    fn from(value: i64) -> Self {
        EmployeeId::Number(value)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        EmployeeId::Text(value.to_string())
    }
}

/// Employee as listed by the directory. Fields beyond the ones the roster
/// needs are carried in `extra` and serialized back untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub full_name: String,
    pub designation: Designation,
    pub is_approved: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmployeeRecord {
    pub fn new(
        id: impl Into<EmployeeId>,
        full_name: impl Into<String>,
        designation: impl Into<Designation>,
        is_approved: bool,
    ) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            designation: designation.into(),
            is_approved,
            extra: Map::new(),
        }
    }
}

/// Narrowing applied by consumers after the roster has been ordered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RosterQuery {
    pub search: Option<String>,
    pub approved_only: bool,
}

impl RosterQuery {
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RosterEntry {
    #[serde(flatten)]
    pub employee: EmployeeRecord,
    pub priority: RolePriority,
}

struct Ranked<'a> {
    priority: RolePriority,
    folded_name: String,
    employee: &'a EmployeeRecord,
}

impl Ranked<'_> {
    fn order(&self, other: &Self, collator: Option<&Collator>) -> Ordering {
        let (left, right) = (&self.employee.full_name, &other.employee.full_name);
        self.employee
            .is_approved
            .cmp(&other.employee.is_approved)
            .then(self.priority.cmp(&other.priority))
            .then_with(|| match collator {
                Some(collator) => collator.compare(left, right),
                None => Ordering::Equal,
            })
            .then_with(|| self.folded_name.cmp(&other.folded_name))
            // equal ignoring case: lowercase sorts ahead of uppercase
            .then_with(|| right.cmp(left))
    }
}

/// Root-locale collation, tertiary strength, lowercase before uppercase.
fn name_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    options.case_first = Some(CaseFirst::LowerFirst);
    Collator::try_new(&Default::default(), options)
        .inspect_err(|err| warn!(error = %err, "name collation unavailable; using folded names"))
        .ok()
}

impl RoleDirectory {
    /// Employees `viewer` may see, unapproved first, then by chain of command
    /// relative to the viewer, then by name. Never reorders `employees`.
    pub fn filter_and_sort<'a>(
        &self,
        viewer: &Designation,
        employees: &'a [EmployeeRecord],
    ) -> Vec<&'a EmployeeRecord> {
        self.rank(viewer, employees)
            .into_iter()
            .map(|ranked| ranked.employee)
            .collect()
    }

    /// [`RoleDirectory::filter_and_sort`] narrowed by `query`, with the priority
    /// each employee was sorted under.
    pub fn roster(
        &self,
        viewer: &Designation,
        employees: &[EmployeeRecord],
        query: &RosterQuery,
    ) -> Vec<RosterEntry> {
        let needle = query.needle();
        self.rank(viewer, employees)
            .into_iter()
            .filter(|ranked| !query.approved_only || ranked.employee.is_approved)
            .filter(|ranked| {
                needle
                    .as_deref()
                    .is_none_or(|needle| ranked.folded_name.contains(needle))
            })
            .map(|ranked| RosterEntry {
                employee: ranked.employee.clone(),
                priority: ranked.priority,
            })
            .collect()
    }

    #[instrument(name = "roster.rank", skip_all, fields(viewer = %viewer))]
    fn rank<'a>(&self, viewer: &Designation, employees: &'a [EmployeeRecord]) -> Vec<Ranked<'a>> {
        let Some(role) = viewer.role() else {
            warn!(
                designation = %viewer,
                "no visibility entry for unregistered viewer; viewer will see nobody"
            );
            return Vec::new();
        };
        let visible = self.visibility_of(role);
        let hierarchy = self.hierarchy_of(role);

        let mut ranked = employees
            .iter()
            .filter(|employee| visible.admits(&employee.designation))
            .map(|employee| {
                if let Designation::Unrecognized(raw) = &employee.designation {
                    debug!(employee = %employee.id, designation = %raw, "unregistered designation");
                }
                Ranked {
                    priority: priority_within(hierarchy, viewer, &employee.designation),
                    folded_name: employee.full_name.to_lowercase(),
                    employee,
                }
            })
            .collect::<Vec<_>>();
        // `sort_by` is stable.
        let collator = name_collator();
        ranked.sort_by(|a, b| a.order(b, collator.as_ref()));

        debug!(
            listed = employees.len(),
            visible = ranked.len(),
            "roster resolved"
        );
        ranked
    }
}

/// [`RoleDirectory::filter_and_sort`] against the shared standard tables.
pub fn filter_and_sort<'a>(
    viewer: &Designation,
    employees: &'a [EmployeeRecord],
) -> Vec<&'a EmployeeRecord> {
    RoleDirectory::shared().filter_and_sort(viewer, employees)
}
