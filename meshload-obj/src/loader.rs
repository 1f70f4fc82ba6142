use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::warn;

use crate::document::{ Document, DocumentStats };
use crate::flatten::{ flatten_document, FlatObject };
use crate::material::{ Material, MaterialLibrary };
use crate::ObjError;

/// A flattened object and the material it resolved to, if any.
#[derive(Debug, Clone)]
pub struct MeshObject {
    pub object: FlatObject,
    pub material: Option<Arc<Material>>,
}

impl MeshObject {
    pub fn name(&self) -> &str {
        &self.object.name
    }

    pub fn vertex_count(&self) -> usize {
        self.object.vertex_count()
    }
}

/// Renderer-ready contents of an OBJ file.
#[derive(Debug, Clone)]
pub struct Model {
    pub objects: Vec<MeshObject>,
    pub materials: HashMap<String, Arc<Material>>,
    pub stats: DocumentStats,
}

/// Flattens every object of `document` and attaches materials by name.
pub fn build_model(document: &Document, libraries: Vec<MaterialLibrary>) -> Result<Model, ObjError> {
    // Later libraries win when names collide
    let materials = libraries.into_iter()
        .flat_map(|lib| lib.materials.into_iter())
        .map(|mtl| (mtl.name.clone(), Arc::new(mtl)))
        .collect::<HashMap<_, _>>();

    let objects = flatten_document(document)?.into_iter()
        .map(|object| {
            let material = match object.material.as_str() {
                "" => None,
                name => match materials.get(name) {
                    Some(mtl) => Some(mtl.clone()),
                    None => {
                        warn!("Unable to find material {} while building object {}", name, object.name);
                        None
                    },
                },
            };
            MeshObject { object, material }
        })
        .collect();

    Ok(Model { objects, materials, stats: document.stats() })
}

/// Loads every material library referenced by `document`,
/// resolving relative names against `base_dir`.
pub fn load_material_libraries(document: &Document, base_dir: &Path) -> Result<Vec<MaterialLibrary>, ObjError> {
    document.material_libraries.iter()
        .map(|name| load_mtl(base_dir.join(name)))
        .collect()
}

pub fn load_model(path: impl AsRef<Path>) -> Result<Model, ObjError> {
    let obj_path = path.as_ref();
    let document = load_obj(obj_path)?;
    let base_dir = obj_path.parent().unwrap_or_else(|| Path::new("."));
    let libraries = load_material_libraries(&document, base_dir)?;
    build_model(&document, libraries)
}

pub fn load_obj(path: impl AsRef<Path>) -> Result<Document, ObjError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ObjError::General(format!("load_obj: expected obj file at path {}", path.display())));
    }

    let file = std::fs::File::open(path)?;
    crate::parser::parse_obj_file(file)
}

pub fn load_mtl(path: impl AsRef<Path>) -> Result<MaterialLibrary, ObjError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ObjError::General(format!("load_mtl: expected mtl file at path {}", path.display())));
    }

    let file = std::fs::File::open(path)?;
    crate::material::parse_mtl_file(file)
}

#[cfg(test)]
mod test {
    use super::build_model;
    use crate::material::{ Material, MaterialLibrary };
    use crate::parser::parse_obj_str;

    #[test]
    fn attaches_materials_by_name() {
        let doc = parse_obj_str("\
mtllib ship.mtl
v 0 0 0
o Ship
usemtl Hull
p 1
usemtl Missing
p 1
o Bare
p 1
").unwrap();
        let lib = MaterialLibrary { materials: vec![Material::new("Hull")] };
        let model = build_model(&doc, vec![lib]).unwrap();

        let names = model.objects.iter().map(|o| o.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Ship", "Ship_1", "Bare"]);
        assert_eq!(model.objects[0].material.as_ref().map(|m| m.name.as_str()), Some("Hull"));
        assert!(model.objects[1].material.is_none());
        // `Bare` inherits the current material
        assert_eq!(model.objects[2].object.material, "Missing");
        assert_eq!(model.stats.objects, 3);
        assert_eq!(model.stats.points, 3);
    }

    #[test]
    fn later_library_wins() {
        let doc = parse_obj_str("v 0 0 0\nusemtl A\np 1\n").unwrap();
        let mut first = Material::new("A");
        first.dissolve = 0.5;
        let second = Material::new("A");
        let model = build_model(&doc, vec![
            MaterialLibrary { materials: vec![first] },
            MaterialLibrary { materials: vec![second] },
        ]).unwrap();
        assert_eq!(model.objects[0].material.as_ref().map(|m| m.dissolve), Some(1.0));
    }
}
