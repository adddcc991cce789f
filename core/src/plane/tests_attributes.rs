use crate::error::PlaneError;
use crate::plane::{Attributes, Plane, Status};
use crate::topo::EntityId;

fn id(plane: &Plane, name: &str) -> EntityId {
    plane.find_by_name(name).unwrap_or_else(|| panic!("no item named {}", name))
}

fn solved_plane() -> Plane {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    plane.set_known(id(&plane, "P1")).unwrap();
    plane.set_known(id(&plane, "P2")).unwrap();
    plane
}

#[test]
fn test_export_variable_with_formula() {
    let plane = solved_plane();
    let length = id(&plane, "L1.length");
    let map = plane.attributes(length).unwrap();

    assert_eq!(map["name"], "L1.length");
    assert_eq!(map["kind"], "variable");
    assert_eq!(map["status"], "derived");
    assert_eq!(map["role"], "Length");
    assert_eq!(map["value"], "5");
    assert_eq!(map["formula"], "@0 == sqrt(@1^2 + @2^2)");
    let terms: Vec<&str> = map["terms"].split(',').collect();
    assert_eq!(terms[0], length.to_string());
    assert_eq!(terms[1], id(&plane, "L1.dx").to_string());
    assert_eq!(map["location"], id(&plane, "L1.mid").to_string());
}

#[test]
fn test_round_trip_restores_status_and_formulas() {
    let original = solved_plane();
    let maps: Vec<Attributes> = original
        .items()
        .map(|item| original.attributes(item.id).unwrap())
        .collect();

    // Same seed and construction sequence, so the ids match.
    let mut restored = Plane::default();
    restored.add_line([0.0, 0.0], [3.0, 4.0]);
    for map in maps.iter().rev() {
        restored.read_attributes(map).unwrap();
    }
    assert_eq!(restored.resolve_references(), 0);

    for item in original.items() {
        assert_eq!(restored.status(item.id).unwrap(), item.status, "{}", item.name);
        assert_eq!(
            restored.formula_text(item.id).unwrap(),
            original.formula_text(item.id).unwrap(),
            "{}",
            item.name
        );
    }
}

#[test]
fn test_forward_location_reference() {
    let mut source = Plane::default();
    source.add_line([0.0, 0.0], [3.0, 4.0]);
    let later = source.add_point([7.0, 7.0]);
    let length = id(&source, "L1.length");
    let mut map = source.attributes(length).unwrap();
    map.insert("location".into(), later.to_string());

    let mut target = Plane::default();
    target.add_line([0.0, 0.0], [3.0, 4.0]);
    target.read_attributes(&map).unwrap();
    assert_eq!(target.pending_references().len(), 1);

    assert_eq!(target.add_point([7.0, 7.0]), later);
    assert_eq!(target.resolve_references(), 0);
    let variable = target.get(length).unwrap().as_variable().unwrap();
    assert_eq!(variable.location, Some(later));
}

#[test]
fn test_unresolvable_reference_is_dropped() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    let length = id(&plane, "L1.length");
    let mut map = plane.attributes(length).unwrap();
    map.insert("location".into(), EntityId::new_deterministic("nowhere").to_string());

    plane.read_attributes(&map).unwrap();
    assert_eq!(plane.resolve_references(), 1);
    assert!(plane.pending_references().is_empty());
}

#[test]
fn test_bad_attributes() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    let p1 = id(&plane, "P1");

    let mut map = plane.attributes(p1).unwrap();
    map.insert("status".into(), "maybe".into());
    assert!(matches!(plane.read_attributes(&map), Err(PlaneError::Attribute { .. })));

    let mut map = Attributes::new();
    map.insert("id".into(), "garbage".into());
    assert!(matches!(plane.read_attributes(&map), Err(PlaneError::Attribute { .. })));

    let mut map = Attributes::new();
    map.insert("id".into(), EntityId::new_deterministic("nowhere").to_string());
    assert!(matches!(plane.read_attributes(&map), Err(PlaneError::NotFound(_))));

    assert_eq!(plane.status(p1).unwrap(), Status::Unknown);
}

#[test]
fn test_attached_formula_round_trip() {
    let mut original = Plane::default();
    original.add_line([0.0, 0.0], [3.0, 4.0]);
    let (len, dx, dy) = (id(&original, "L1.length"), id(&original, "L1.dx"), id(&original, "L1.dy"));
    original.set_formula(len, "pythagoras", "@0 == sqrt(@1^2 + @2^2)", &[len, dx, dy]).unwrap();
    let map = original.attributes(len).unwrap();
    assert_eq!(map["formula_attached"], "true");

    let mut restored = Plane::default();
    restored.add_line([0.0, 0.0], [3.0, 4.0]);
    restored.read_attributes(&map).unwrap();
    assert_eq!(restored.resolve_references(), 0);

    // Still attached: a reset keeps it.
    restored.reset_derived();
    assert!(restored.formula_text(len).unwrap().is_some());
}

#[test]
fn test_role_must_match() {
    let mut plane = Plane::default();
    plane.add_line([0.0, 0.0], [3.0, 4.0]);
    let mut map = plane.attributes(id(&plane, "L1.length")).unwrap();
    map.insert("role".into(), "Dx".into());
    assert!(matches!(plane.read_attributes(&map), Err(PlaneError::Attribute { .. })));
    map.insert("role".into(), "Wobble".into());
    assert!(matches!(plane.read_attributes(&map), Err(PlaneError::Attribute { .. })));
}
