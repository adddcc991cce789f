use crate::plane::{Plane, Status};
use crate::topo::EntityId;
use crate::error::PlaneError;

fn id(plane: &Plane, name: &str) -> EntityId {
    plane.find_by_name(name).unwrap_or_else(|| panic!("no item named {}", name))
}

fn value(plane: &Plane, name: &str) -> f64 {
    plane.value(id(plane, name)).unwrap().unwrap()
}

#[test]
fn test_line_values_from_endpoints() {
    let mut plane = Plane::default();
    plane.add_line([10.0, 20.0], [30.0, 40.0]);

    assert!((value(&plane, "L1.mid.x") - 20.0).abs() < 1e-9);
    assert!((value(&plane, "L1.mid.y") - 30.0).abs() < 1e-9);
    assert!((value(&plane, "L1.dx") - 20.0).abs() < 1e-9);
    assert!((value(&plane, "L1.dy") - 20.0).abs() < 1e-9);
    assert!((value(&plane, "L1.length") - 800f64.sqrt()).abs() < 1e-9);
    assert!((value(&plane, "L1.length") - 28.2843).abs() < 1e-4);
    assert!((value(&plane, "L1.angle") - 45.0).abs() < 1e-9);
}

#[test]
fn test_angle_range_includes_180() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [0.0, -5.0]);
    assert!((value(&plane, "L1.angle") - 180.0).abs() < 1e-9);

    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [-5.0, 0.0]);
    assert!((value(&plane, "L1.angle") + 90.0).abs() < 1e-9);
}

#[test]
fn test_known_endpoints_determine_line() {
    let mut plane = Plane::default();
    let line = plane.add_line([10.0, 20.0], [30.0, 40.0]);
    plane.set_known(id(&plane, "P1")).unwrap();
    assert_eq!(plane.status(line).unwrap(), Status::Unknown);
    plane.set_known(id(&plane, "P2")).unwrap();

    assert_eq!(plane.status(line).unwrap(), Status::Derived);
    assert_eq!(plane.item(line).unwrap().reason.as_deref(), Some("known endpoints"));
    for name in ["L1.mid.x", "L1.mid.y", "L1.dx", "L1.dy", "L1.length", "L1.angle"] {
        assert!(plane.status(id(&plane, name)).unwrap().is_determined(), "{} undetermined", name);
    }

    let length = id(&plane, "L1.length");
    assert_eq!(
        plane.formula_text(length).unwrap().as_deref(),
        Some("L1.length == sqrt(L1.dx^2 + L1.dy^2)")
    );
    assert_eq!(
        plane.derived_formula(length).unwrap().as_deref(),
        Some("L1.length == sqrt(20^2 + 20^2)")
    );
    assert!(plane.check_consistency().is_empty());
}

#[test]
fn test_known_line_promotes_endpoints() {
    let mut plane = Plane::default();
    let line = plane.add_line([10.0, 20.0], [30.0, 40.0]);
    plane.set_known(line).unwrap();

    let p1 = id(&plane, "P1");
    assert_eq!(plane.status(p1).unwrap(), Status::Derived);
    assert_eq!(plane.item(p1).unwrap().reason.as_deref(), Some("known line"));
    assert!(plane.status(id(&plane, "P2.y")).unwrap().is_determined());
    assert!(plane.status(id(&plane, "L1.angle")).unwrap().is_determined());
}

#[test]
fn test_length_and_angle_from_one_endpoint() {
    let mut plane = Plane::default();
    let line = plane.add_line([10.0, 20.0], [30.0, 40.0]);
    plane.set_known(id(&plane, "P1")).unwrap();
    plane.set_known(id(&plane, "L1.length")).unwrap();
    plane.set_known(id(&plane, "L1.angle")).unwrap();

    let dx = id(&plane, "L1.dx");
    assert_eq!(plane.item(dx).unwrap().reason.as_deref(), Some("length and angle"));
    let to_x = id(&plane, "P2.x");
    assert_eq!(plane.item(to_x).unwrap().reason.as_deref(), Some("endpoint and delta"));
    assert_eq!(plane.formula_text(to_x).unwrap().as_deref(), Some("P2.x == P1.x + L1.dx"));
    assert_eq!(plane.status(line).unwrap(), Status::Derived);
    assert!(plane.check_consistency().is_empty());
}

#[test]
fn test_endpoint_and_midpoint() {
    let mut plane = Plane::default();
    let line = plane.add_line([10.0, 20.0], [30.0, 40.0]);
    plane.set_known(id(&plane, "P2")).unwrap();
    plane.set_known(id(&plane, "L1.mid")).unwrap();

    let from_x = id(&plane, "P1.x");
    assert_eq!(plane.formula_text(from_x).unwrap().as_deref(), Some("P1.x == 2 * L1.mid.x - P2.x"));
    assert_eq!(plane.status(line).unwrap(), Status::Derived);
}

#[test]
fn test_length_and_delta_keeps_sign() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, -4.0]);
    plane.set_known(id(&plane, "L1.length")).unwrap();
    plane.set_known(id(&plane, "L1.dx")).unwrap();

    let dy = id(&plane, "L1.dy");
    assert_eq!(plane.formula_text(dy).unwrap().as_deref(), Some("L1.dy == -sqrt(L1.length^2 - L1.dx^2)"));
    assert!(plane.check_consistency().is_empty());
}

/// Of the 256 subsets of the eight independent line variables, exactly 116
/// leave the line fully determined.
#[test]
fn test_line_determinacy_count() {
    let names = ["P1.x", "P1.y", "P2.x", "P2.y", "L1.mid.x", "L1.mid.y", "L1.length", "L1.angle"];
    let mut determined = 0;
    for mask in 0u32..256 {
        let mut plane = Plane::default();
        let line = plane.add_line([10.0, 20.0], [30.0, 40.0]);
        for (bit, name) in names.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                plane.set_known(id(&plane, name)).unwrap();
            }
        }
        plane.reset_derived();
        if plane.status(line).unwrap().is_determined() {
            determined += 1;
        }
    }
    assert_eq!(determined, 116);
}

#[test]
fn test_drag_midpoint_translates_line() {
    let mut plane = Plane::default();
    plane.add_line([10.0, 20.0], [30.0, 40.0]);
    plane.drag(&[(id(&plane, "L1.mid"), [25.0, 35.0])]).unwrap();

    assert_eq!(plane.position(id(&plane, "P1")).unwrap(), [15.0, 25.0]);
    assert_eq!(plane.position(id(&plane, "P2")).unwrap(), [35.0, 45.0]);
    assert!((value(&plane, "L1.length") - 800f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_drag_fixed_point_fails() {
    let mut plane = Plane::default();
    plane.add_line([10.0, 20.0], [30.0, 40.0]);
    let p1 = id(&plane, "P1");
    plane.set_fixed(p1).unwrap();

    let result = plane.move_point(p1, [0.0, 0.0]);
    assert_eq!(result, Err(PlaneError::Fixed(p1)));
    assert_eq!(plane.position(p1).unwrap(), [10.0, 20.0]);

    // The midpoint drags the fixed endpoint along.
    assert!(plane.drag(&[(id(&plane, "L1.mid"), [0.0, 0.0])]).is_err());
}

#[test]
fn test_drag_keeps_fixed_measurements() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    let p2 = id(&plane, "P2");
    let length = id(&plane, "L1.length");
    plane.set_fixed(length).unwrap();

    assert_eq!(plane.move_point(p2, [6.0, 8.0]), Err(PlaneError::Fixed(length)));
    assert_eq!(plane.position(p2).unwrap(), [3.0, 4.0]);
    assert_eq!(plane.value(length).unwrap(), Some(5.0));

    // Rotating or translating keeps the length.
    plane.move_point(p2, [4.0, 3.0]).unwrap();
    plane.drag(&[(id(&plane, "L1.mid"), [10.0, 10.0])]).unwrap();
    assert!((plane.value(length).unwrap().unwrap() - 5.0).abs() < 1e-9);

    let dx = id(&plane, "L1.dx");
    plane.set_fixed(dx).unwrap();
    assert_eq!(plane.move_point(p2, [20.0, 20.0]), Err(PlaneError::Fixed(dx)));
}

#[test]
fn test_drag_fixed_line_fails() {
    let mut plane = Plane::default();
    let line = plane.add_line([0.0, 0.0], [3.0, 4.0]);
    plane.set_fixed(line).unwrap();
    let p1 = id(&plane, "P1");

    assert_eq!(plane.move_point(p1, [1.0, 1.0]), Err(PlaneError::Fixed(line)));
    assert_eq!(plane.position(p1).unwrap(), [0.0, 0.0]);
    assert!(plane.drag(&[(id(&plane, "L1.mid"), [5.0, 5.0])]).is_err());
}

#[test]
fn test_set_value_rotates_line() {
    let mut plane = Plane::default();
    plane.add_line([10.0, 20.0], [30.0, 40.0]);
    plane.set_value(id(&plane, "L1.angle"), 90.0).unwrap();

    let to = plane.position(id(&plane, "P2")).unwrap();
    assert!((to[0] - (10.0 + 800f64.sqrt())).abs() < 1e-9);
    assert!((to[1] - 20.0).abs() < 1e-9);
    assert!((value(&plane, "L1.angle") - 90.0).abs() < 1e-9);
}

#[test]
fn test_set_value_moves_coordinate() {
    let mut plane = Plane::default();
    plane.add_line([10.0, 20.0], [30.0, 40.0]);
    plane.set_value(id(&plane, "P2.x"), 50.0).unwrap();
    assert!((value(&plane, "L1.dx") - 40.0).abs() < 1e-9);

    let length = id(&plane, "L1.length");
    assert!(matches!(plane.set_value(length, 3.0), Err(PlaneError::NotAllowed { .. })));
}
