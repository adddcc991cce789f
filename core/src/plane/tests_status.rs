use crate::error::PlaneError;
use crate::plane::{Plane, PlaneEvent, Status};
use crate::topo::EntityId;
use std::sync::{Arc, Mutex};

fn id(plane: &Plane, name: &str) -> EntityId {
    plane.find_by_name(name).unwrap_or_else(|| panic!("no item named {}", name))
}

fn recorder(plane: &mut Plane) -> Arc<Mutex<Vec<PlaneEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    plane.subscribe(Box::new(move |e| sink.lock().unwrap().push(e.clone())));
    seen
}

#[test]
fn test_set_known_notifies_once_per_command() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [10.0, 0.0]);
    let seen = recorder(&mut plane);

    let p1 = id(&plane, "P1");
    plane.set_known(p1).unwrap();

    let events = seen.lock().unwrap().clone();
    assert!(events.contains(&PlaneEvent::StatusChanged {
        id: p1,
        name: "P1".into(),
        status: Status::Known,
        reason: Some("known".into()),
    }));
    let solved = events.iter().filter(|e| matches!(e, PlaneEvent::Solved { .. })).count();
    assert_eq!(solved, 1);
    assert!(plane.events.pending().is_empty());
    assert!(!plane.is_dirty());
}

#[test]
fn test_set_known_is_idempotent() {
    let mut plane = Plane::default();
    let p = plane.add_point([1.0, 2.0]);
    plane.set_known(p).unwrap();
    let seen = recorder(&mut plane);
    plane.set_known(p).unwrap();
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_set_unknown_retracts_derivations() {
    let mut plane = Plane::default();
    let line = plane.add_line([0.0, 0.0], [10.0, 0.0]);
    let (p1, p2) = (id(&plane, "P1"), id(&plane, "P2"));
    plane.set_known(p1).unwrap();
    plane.set_known(p2).unwrap();
    assert_eq!(plane.status(line).unwrap(), Status::Derived);

    plane.set_unknown(p1).unwrap();
    assert_eq!(plane.status(line).unwrap(), Status::Unknown);
    assert_eq!(plane.status(p1).unwrap(), Status::Unknown);
    assert_eq!(plane.status(p2).unwrap(), Status::Known);
    assert!(plane.status(id(&plane, "P2.x")).unwrap().is_determined());
    assert!(!plane.status(id(&plane, "L1.length")).unwrap().is_determined());
    assert_eq!(plane.formula_text(id(&plane, "L1.length")).unwrap(), None);
}

#[test]
fn test_set_unknown_rejects_derived() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [10.0, 0.0]);
    plane.set_known(id(&plane, "P1")).unwrap();
    let x = id(&plane, "P1.x");
    assert_eq!(plane.status(x).unwrap(), Status::Derived);
    assert!(matches!(plane.set_unknown(x), Err(PlaneError::NotAllowed { .. })));
}

#[test]
fn test_reset_derived_keeps_asserted() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [10.0, 0.0]);
    let p1 = id(&plane, "P1");
    plane.set_fixed(p1).unwrap();
    plane.reset_derived();
    assert_eq!(plane.status(p1).unwrap(), Status::Fixed);
    // Re-solved straight away.
    assert_eq!(plane.status(id(&plane, "P1.x")).unwrap(), Status::Derived);
}

#[test]
fn test_solve_pass_bound() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [10.0, 5.0]);
    plane.add_line([0.0, 5.0], [10.0, 0.0]);
    plane.set_known(id(&plane, "P1")).unwrap();
    plane.set_known(id(&plane, "P2")).unwrap();
    plane.set_known(id(&plane, "P3")).unwrap();
    plane.set_known(id(&plane, "P4")).unwrap();
    let passes = plane.solve();
    assert!(passes >= 1);
    assert!(passes <= plane.len());
    assert_eq!(Plane::default().solve(), 0);
}

#[test]
fn test_capabilities() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [10.0, 0.0]);

    let x = plane.capabilities(id(&plane, "P1.x")).unwrap();
    assert!(x.can_set_value && x.can_set_known && !x.can_set_unknown && !x.can_show_derivation);
    assert!(!plane.capabilities(id(&plane, "L1.mid.x")).unwrap().can_set_value);
    assert!(!plane.capabilities(id(&plane, "L1.length")).unwrap().can_set_value);
    assert!(plane.capabilities(id(&plane, "L1.angle")).unwrap().can_set_value);

    plane.set_known(id(&plane, "P1")).unwrap();
    let x = plane.capabilities(id(&plane, "P1.x")).unwrap();
    assert!(x.can_show_derivation);
    let p1 = plane.capabilities(id(&plane, "P1")).unwrap();
    assert!(p1.can_set_unknown && !p1.can_set_known && p1.can_set_fixed);
}

#[test]
fn test_equivalent_position() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [10.0, 0.0]);
    let free = plane.add_point([10.0, 0.0]);
    plane.set_known(id(&plane, "P2")).unwrap();

    assert_eq!(plane.status(free).unwrap(), Status::Derived);
    let fx = plane.point(free).unwrap().x;
    assert_eq!(plane.item(fx).unwrap().reason.as_deref(), Some("equivalent position"));
    assert_eq!(plane.formula_text(fx).unwrap().as_deref(), Some("P3.x == P2.x"));
}

#[test]
fn test_set_formula() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    let (len, dx, dy) = (id(&plane, "L1.length"), id(&plane, "L1.dx"), id(&plane, "L1.dy"));

    assert!(matches!(
        plane.set_formula(len, "custom", "@0 == @1", &[dx, len]),
        Err(PlaneError::NotAllowed { .. })
    ));
    assert!(matches!(
        plane.set_formula(len, "custom", "@0 == @1 +", &[len, dx]),
        Err(PlaneError::Formula(_))
    ));

    plane.set_formula(len, "pythagoras", "@0 == sqrt(@1^2 + @2^2)", &[len, dx, dy]).unwrap();
    assert_eq!(plane.status(len).unwrap(), Status::Derived);
    assert_eq!(plane.formula_text(len).unwrap().as_deref(), Some("L1.length == sqrt(L1.dx^2 + L1.dy^2)"));
    assert_eq!(plane.derived_formula(len).unwrap().as_deref(), Some("L1.length == sqrt(L1.dx^2 + L1.dy^2)"));
    assert!(plane.check_consistency().is_empty());
}

#[test]
fn test_attached_formula_survives_reset() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    let (len, dx, dy) = (id(&plane, "L1.length"), id(&plane, "L1.dx"), id(&plane, "L1.dy"));
    plane.set_formula(len, "pythagoras", "@0 == sqrt(@1^2 + @2^2)", &[len, dx, dy]).unwrap();

    plane.reset_derived();
    assert_eq!(plane.status(len).unwrap(), Status::Unknown);
    assert_eq!(plane.formula_text(len).unwrap().as_deref(), Some("L1.length == sqrt(L1.dx^2 + L1.dy^2)"));

    // One delta is not enough, and no line rule replaces the attached formula.
    plane.set_known(dx).unwrap();
    assert_eq!(plane.status(len).unwrap(), Status::Unknown);

    plane.set_known(dy).unwrap();
    assert_eq!(plane.status(len).unwrap(), Status::Derived);
    assert_eq!(plane.item(len).unwrap().reason.as_deref(), Some("pythagoras"));
    assert_eq!(plane.formula_text(len).unwrap().as_deref(), Some("L1.length == sqrt(L1.dx^2 + L1.dy^2)"));
}

#[test]
fn test_rule_formulas_are_cleared_by_reset() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    plane.set_known(id(&plane, "P1")).unwrap();
    plane.set_known(id(&plane, "P2")).unwrap();
    let len = id(&plane, "L1.length");
    assert!(plane.formula_text(len).unwrap().is_some());

    plane.set_unknown(id(&plane, "P2")).unwrap();
    assert_eq!(plane.status(len).unwrap(), Status::Unknown);
    assert_eq!(plane.formula_text(len).unwrap(), None);
}

#[test]
fn test_solve_delivers_events() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    let seen = recorder(&mut plane);

    plane.solve();
    let events = seen.lock().unwrap();
    assert!(matches!(events.last(), Some(PlaneEvent::Solved { .. })));
}

#[test]
fn test_derivation_chain() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    plane.set_known(id(&plane, "P1")).unwrap();
    plane.set_known(id(&plane, "P2")).unwrap();

    let steps = plane.derivation(id(&plane, "L1.length")).unwrap();
    let names: Vec<_> = steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names[0], "L1.length");
    assert!(names.contains(&"L1.dx"));
    assert!(names.contains(&"P2.x"));
    assert_eq!(steps[0].derived, "L1.length == sqrt(3^2 + 4^2)");
}

#[test]
fn test_remove_line() {
    let mut plane = Plane::default();
    let l1 = plane.add_line([-10.0, -10.0], [10.0, 10.0]);
    plane.add_line([-10.0, 10.0], [10.0, -10.0]);
    assert_eq!(plane.ids_of("vertex").len(), 1);

    let p1 = id(&plane, "P1");
    assert!(matches!(plane.remove(p1), Err(PlaneError::NotAllowed { .. })));
    plane.remove(l1).unwrap();

    assert!(plane.get(l1).is_none());
    assert!(plane.get(p1).is_none());
    assert!(plane.ids_of("vertex").is_empty());
    assert!(plane.find_by_name("L1.length").is_none());
    let l2 = plane.line(id(&plane, "L2")).unwrap();
    assert!(l2.vertices.is_empty());
}

#[test]
fn test_rows_serialize() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    plane.set_known(id(&plane, "P1")).unwrap();
    let rows = plane.rows();
    assert_eq!(rows.len(), plane.len());
    let json = serde_json::to_value(&rows).unwrap();
    assert_eq!(json[0]["name"], "L1");
    assert_eq!(json[0]["kind"], "line");
    let p1x = rows.iter().find(|r| r.name == "P1.x").unwrap();
    assert_eq!(p1x.status, Status::Derived);
    assert_eq!(p1x.formula.as_deref(), Some("P1.x == 0"));
}
