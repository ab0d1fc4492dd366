use std::cmp::Ordering;

use icu_collator::{CaseFirst, Collator, CollatorOptions, Strength};
use products_roster::{
    Designation, EmployeeRecord, Role, RoleDirectory, RolePriority, Visibility, filter_and_sort,
};

fn employee(id: i64, name: &str, designation: impl Into<Designation>, approved: bool) -> EmployeeRecord {
    EmployeeRecord::new(id, name, designation, approved)
}

fn known(role: Role) -> Designation {
    Designation::Known(role)
}

/// Two employees per role (one approved, one not) plus a legacy title.
fn full_staff() -> Vec<EmployeeRecord> {
    let mut staff = Vec::new();
    let mut id = 0;
    for role in Role::ALL.into_iter().rev() {
        for approved in [true, false] {
            id += 1;
            let name = format!("{} {}", role.as_str(), if approved { "B" } else { "A" });
            staff.push(employee(id, &name, role, approved));
        }
    }
    staff.push(employee(id + 1, "Old Timer", Designation::parse("Head Trainer"), true));
    staff
}

#[test]
fn stable_manager_scenario() {
    let employees = vec![
        employee(1, "Gopal", Role::Groom, true),
        employee(2, "Dina", Role::Director, true),
        employee(3, "Suresh", Role::StableManager, false),
        employee(4, "Gita", Role::Guard, true),
    ];
    let sorted = filter_and_sort(&Role::StableManager.into(), &employees);
    let roles: Vec<_> = sorted.iter().map(|e| (e.designation.clone(), e.is_approved)).collect();
    assert_eq!(
        roles,
        [
            (known(Role::StableManager), false),
            (known(Role::Director), true),
            (known(Role::Groom), true),
        ]
    );
}

#[test]
fn grooms_are_ordered_by_name_for_a_groom() {
    let employees = vec![
        employee(1, "Zara", Role::Groom, true),
        employee(2, "Amit", Role::Groom, true),
        employee(3, "Jai", Role::Jamedar, true),
    ];
    let sorted = filter_and_sort(&Role::Groom.into(), &employees);
    let names: Vec<_> = sorted.iter().map(|e| e.full_name.as_str()).collect();
    // the jamedar is the groom's superior
    assert_eq!(names, ["Jai", "Amit", "Zara"]);

    let peers: Vec<_> = sorted
        .iter()
        .filter(|e| e.designation == known(Role::Groom))
        .map(|e| e.full_name.as_str())
        .collect();
    assert_eq!(peers, ["Amit", "Zara"]);
}

#[test]
fn unrestricted_viewer_sees_everyone() {
    let staff = full_staff();
    let sorted = filter_and_sort(&Role::Director.into(), &staff);
    assert_eq!(sorted.len(), staff.len());

    let first_approved = sorted.iter().position(|e| e.is_approved).unwrap();
    assert!(sorted[..first_approved].iter().all(|e| !e.is_approved));
    assert!(sorted[first_approved..].iter().all(|e| e.is_approved));

    // superior, peer, subordinates, then the unregistered title
    assert_eq!(sorted[first_approved].designation, known(Role::SuperAdmin));
    assert_eq!(sorted[first_approved + 1].designation, known(Role::Director));
    assert_eq!(sorted.last().unwrap().full_name, "Old Timer");
}

#[test]
fn restricted_viewers_never_see_roles_outside_their_set() {
    let directory = RoleDirectory::standard();
    let staff = full_staff();
    for viewer in Role::ALL {
        let Visibility::Only(allowed) = directory.visibility.lookup(viewer) else {
            continue;
        };
        let sorted = directory.filter_and_sort(&viewer.into(), &staff);
        for e in &sorted {
            let role = e.designation.role().expect("legacy titles are hidden");
            assert!(allowed.contains(&role), "{viewer} saw {role}");
        }
        let expected = staff
            .iter()
            .filter(|e| e.designation.role().is_some_and(|r| allowed.contains(&r)))
            .count();
        assert_eq!(sorted.len(), expected, "{viewer} lost employees");
    }
}

fn root_collator() -> Collator {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    options.case_first = Some(CaseFirst::LowerFirst);
    Collator::try_new(&Default::default(), options).unwrap()
}

#[test]
fn ordering_keys_hold_for_every_viewer() {
    let directory = RoleDirectory::standard();
    let collator = root_collator();
    let mut staff = full_staff();
    staff.extend([
        employee(90, "Émile Roux", Role::Groom, true),
        employee(91, "Zoë Adams", Role::Farrier, true),
        employee(92, "ayesha Rider", Role::Rider, true),
        employee(93, "Åsa Berg", Role::Guard, false),
    ]);
    for viewer in Role::ALL {
        let viewer: Designation = viewer.into();
        let sorted = directory.filter_and_sort(&viewer, &staff);
        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let key = |e: &EmployeeRecord| (e.is_approved, directory.relation(&viewer, &e.designation));
            let in_order = match key(a).cmp(&key(b)) {
                Ordering::Less => true,
                Ordering::Equal => collator.compare(&a.full_name, &b.full_name) != Ordering::Greater,
                Ordering::Greater => false,
            };
            assert!(in_order, "{viewer}: {} before {}", a.full_name, b.full_name);
        }
    }
}

#[test]
fn superiors_precede_peers_and_subordinates() {
    let directory = RoleDirectory::standard();
    let staff = full_staff();
    let viewer: Designation = Role::Jamedar.into();
    let sorted = directory.filter_and_sort(&viewer, &staff);
    let approved: Vec<_> = sorted
        .iter()
        .filter(|e| e.is_approved)
        .map(|e| directory.relation(&viewer, &e.designation))
        .collect();
    assert_eq!(
        approved,
        [
            RolePriority::Superior,
            RolePriority::Peer,
            RolePriority::Subordinate,
            RolePriority::Unrelated,
            RolePriority::Unrelated,
        ]
    );
}

#[test]
fn sorting_is_deterministic_and_leaves_input_alone() {
    let staff = full_staff();
    let before = staff.clone();
    let first = filter_and_sort(&Role::SeniorExecutiveAdmin.into(), &staff);
    let second = filter_and_sort(&Role::SeniorExecutiveAdmin.into(), &staff);
    assert_eq!(first, second);
    assert_eq!(staff, before);

    let owned: Vec<EmployeeRecord> = first.into_iter().cloned().collect();
    let resorted = filter_and_sort(&Role::SeniorExecutiveAdmin.into(), &owned);
    assert!(resorted.iter().zip(&owned).all(|(a, b)| *a == b));
}

#[test]
fn empty_and_unregistered_inputs_degrade_quietly() {
    assert!(filter_and_sort(&Role::Director.into(), &[]).is_empty());

    let staff = full_staff();
    assert!(filter_and_sort(&Designation::parse("Head Trainer"), &staff).is_empty());

    let bare = RoleDirectory::default();
    assert!(bare.filter_and_sort(&Role::Director.into(), &staff).is_empty());
}
