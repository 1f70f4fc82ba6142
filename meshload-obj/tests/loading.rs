use std::fs;

use meshload_obj::{ load_model, load_obj, ObjError, V3 };

const SHIP_OBJ: &str = "\
# Ship
mtllib ship.mtl
v -1 0 0
v 1 0 0
v 0 1 0
v 0 0 1
vt 0 0
vt 1 0
vt 0.5 1
vn 0 0 1
o Hull
usemtl Steel
f 1/1/1 2/2/1 3/3/1
usemtl Glass
f 1 2 4
o Flag
usemtl Cloth
l 3 4
";

const SHIP_MTL: &str = "\
newmtl Steel
Kd 0.5 0.5 0.5
newmtl Glass
Kd 0.1 0.2 0.3
d 0.4
";

#[test]
fn load_model_resolves_materials_next_to_obj() {
    let dir = tempfile::tempdir().unwrap();
    let obj_path = dir.path().join("ship.obj");
    fs::write(&obj_path, SHIP_OBJ).unwrap();
    fs::write(dir.path().join("ship.mtl"), SHIP_MTL).unwrap();

    let model = load_model(&obj_path).unwrap();
    let names = model.objects.iter().map(|o| o.name()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Hull", "Hull_1", "Flag"]);

    let hull = &model.objects[0];
    assert_eq!(hull.vertex_count(), 3);
    assert_eq!(hull.material.as_ref().map(|m| m.diffuse_color), Some(V3(0.5, 0.5, 0.5)));

    let glass = &model.objects[1];
    assert_eq!(glass.material.as_ref().map(|m| m.dissolve), Some(0.4));

    // No `Cloth` in the library
    let flag = &model.objects[2];
    assert_eq!(flag.vertex_count(), 2);
    assert!(flag.material.is_none());

    assert_eq!(model.stats.objects_or_groups, 2);
    assert_eq!(model.stats.faces, 2);
    assert_eq!(model.stats.lines, 1);
    assert_eq!(model.materials.len(), 2);
}

#[test]
fn missing_material_library_fails() {
    let dir = tempfile::tempdir().unwrap();
    let obj_path = dir.path().join("ship.obj");
    fs::write(&obj_path, SHIP_OBJ).unwrap();

    match load_model(&obj_path) {
        Err(ObjError::General(message)) => assert!(message.contains("ship.mtl")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn missing_obj_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(load_obj(dir.path().join("nothing.obj")), Err(ObjError::General(_))));
}
