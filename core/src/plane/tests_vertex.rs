use crate::plane::{Plane, Status};
use crate::topo::EntityId;

fn id(plane: &Plane, name: &str) -> EntityId {
    plane.find_by_name(name).unwrap_or_else(|| panic!("no item named {}", name))
}

/// Two segments crossing at the origin, away from their midpoints.
fn crossing() -> Plane {
    let mut plane = Plane::default();
    plane.add_line([-10.0, -10.0], [30.0, 30.0]);
    plane.add_line([-10.0, 10.0], [30.0, -30.0]);
    plane
}

#[test]
fn test_crossing_lines_create_vertex() {
    let plane = crossing();
    let vertices = plane.ids_of("vertex");
    assert_eq!(vertices.len(), 1);

    let vertex = plane.get(vertices[0]).unwrap().as_vertex().unwrap().clone();
    assert_eq!(vertex.line_a, id(&plane, "L2"));
    assert_eq!(vertex.line_b, id(&plane, "L1"));
    let pos = plane.position(vertex.position).unwrap();
    assert!(pos[0].abs() < 1e-12 && pos[1].abs() < 1e-12);
    // 135 - 45
    assert!((plane.value(vertex.angle).unwrap().unwrap() - 90.0).abs() < 1e-9);
    assert!(plane.line(id(&plane, "L1")).unwrap().vertices.contains(&vertices[0]));
}

#[test]
fn test_no_vertex_for_disjoint_or_parallel_segments() {
    let mut plane = Plane::default();
    plane.add_line([-10.0, -10.0], [10.0, 10.0]);
    // Their infinite extensions cross at (15, 15), outside both segments.
    plane.add_line([20.0, 10.0], [30.0, 0.0]);
    // Parallel to the first.
    plane.add_line([0.0, -5.0], [20.0, 15.0]);
    assert!(plane.ids_of("vertex").is_empty());
}

#[test]
fn test_shared_endpoint_is_a_vertex() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [10.0, 0.0]);
    plane.add_line([10.0, 0.0], [10.0, 10.0]);
    let vertices = plane.ids_of("vertex");
    assert_eq!(vertices.len(), 1);
    let position = plane.get(vertices[0]).unwrap().as_vertex().unwrap().position;
    let pos = plane.position(position).unwrap();
    assert!((pos[0] - 10.0).abs() < 1e-9 && pos[1].abs() < 1e-9);
}

#[test]
fn test_vertex_follows_and_disappears_on_drag() {
    let mut plane = crossing();
    let p1 = id(&plane, "P1");
    plane.move_point(p1, [-10.0, -6.0]).unwrap();
    let vertex = plane.ids_of("vertex")[0];
    let position = plane.get(vertex).unwrap().as_vertex().unwrap().position;
    let pos = plane.position(position).unwrap();
    // (-10,-6)-(30,30) meets y = -x at x = -30/19
    assert!((pos[0] + 30.0 / 19.0).abs() < 1e-9);
    assert!((pos[0] + pos[1]).abs() < 1e-9);

    // Move the whole first line away.
    plane.move_point(p1, [20.0, 20.0]).unwrap();
    plane.move_point(id(&plane, "P2"), [30.0, 20.0]).unwrap();
    assert!(plane.ids_of("vertex").is_empty());
    assert!(plane.get(vertex).is_none());
    assert!(plane.get(position).is_none());
    assert!(plane.line(id(&plane, "L2")).unwrap().vertices.is_empty());

    // And back: a new vertex is discovered.
    plane.move_point(p1, [-10.0, -10.0]).unwrap();
    plane.move_point(id(&plane, "P2"), [30.0, 30.0]).unwrap();
    assert_eq!(plane.ids_of("vertex").len(), 1);
}

#[test]
fn test_known_lines_determine_vertex() {
    let mut plane = crossing();
    plane.set_known(id(&plane, "L1")).unwrap();
    plane.set_known(id(&plane, "L2")).unwrap();

    let vertex_id = plane.ids_of("vertex")[0];
    let vertex = plane.get(vertex_id).unwrap().as_vertex().unwrap().clone();
    assert_eq!(plane.item(vertex.angle).unwrap().reason.as_deref(), Some("line angles"));
    assert_eq!(
        plane.formula_text(vertex.angle).unwrap().as_deref(),
        Some("V1.angle == L2.angle - L1.angle")
    );
    let x = plane.point(vertex.position).unwrap().x;
    assert_eq!(plane.item(x).unwrap().reason.as_deref(), Some("line intersection"));
    assert_eq!(plane.status(vertex_id).unwrap(), Status::Derived);
    assert!(plane.check_consistency().is_empty());
}

#[test]
fn test_known_vertex_promotes_position_and_angle() {
    let mut plane = crossing();
    let vertex_id = plane.ids_of("vertex")[0];
    plane.set_known(vertex_id).unwrap();

    let vertex = plane.get(vertex_id).unwrap().as_vertex().unwrap().clone();
    assert_eq!(plane.status(vertex.position).unwrap(), Status::Derived);
    assert_eq!(plane.status(vertex.angle).unwrap(), Status::Derived);
    assert_eq!(plane.item(vertex.angle).unwrap().reason.as_deref(), Some("known vertex"));
}
