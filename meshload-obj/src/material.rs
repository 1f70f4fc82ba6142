use std::io::{ BufRead, BufReader, Read };

use crate::geometry::parse_fields;
use crate::types::V3;
use crate::{ ObjError, ParseErrorKind };

// MTL parser
//
// Reads the subset of the MTL format needed to pick a shading model:
// newmtl, Ka, Kd, Ks, Ns, d and map_Kd. Everything else is skipped.
//
// See: https://en.wikipedia.org/wiki/Wavefront_.obj_file#Material_template_library

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient_color: V3,
    pub diffuse_color: V3,
    pub specular_color: V3,
    pub specular_exponent: f32,
    pub dissolve: f32,
    pub diffuse_color_map: Option<String>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Material {
            name: name.into(),
            ambient_color: V3::ZERO,
            diffuse_color: V3::ONE,
            specular_color: V3::ZERO,
            specular_exponent: 0.0,
            dissolve: 1.0,
            diffuse_color_map: None,
        }
    }

    pub fn is_textured(&self) -> bool {
        self.diffuse_color_map.is_some()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MaterialLibrary {
    pub materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }
}

fn parse_color(raw: &str) -> Result<V3, ParseErrorKind> {
    // `Kd r` is shorthand for `Kd r r r`
    match parse_fields(raw, 1, 3)?.as_slice() {
        &[r] => Ok(V3(r, r, r)),
        &[r, g, b] => Ok(V3(r, g, b)),
        _ => Err(ParseErrorKind::MalformedGeometry(format!("expected 1 or 3 color values in `{raw}`"))),
    }
}

fn parse_scalar(raw: &str) -> Result<f32, ParseErrorKind> {
    Ok(parse_fields(raw, 1, 1)?[0])
}

pub fn parse_mtl_file(source: impl Read) -> Result<MaterialLibrary, ObjError> {

    let mut materials = Vec::new();
    let mut current: Option<Material> = None;

    for (line_no, line) in BufReader::new(source).split(b'\n').enumerate() {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim();
        // Skip comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (directive, value) = match line.find(char::is_whitespace) {
            Some(split) => (&line[..split], line[split..].trim()),
            None => (line, ""),
        };
        let parse_error = |kind: ParseErrorKind| ObjError::Parse { line: line_no + 1, kind };

        if directive == "newmtl" {
            // Starting a new material?
            if let Some(mtl) = current.take() {
                materials.push(mtl);
            }
            current = Some(Material::new(value));
            continue;
        }

        // Properties before the first newmtl have nothing to attach to
        let Some(mtl) = current.as_mut() else {
            continue;
        };
        match directive {
            "Ka" => mtl.ambient_color = parse_color(value).map_err(parse_error)?,
            "Kd" => mtl.diffuse_color = parse_color(value).map_err(parse_error)?,
            "Ks" => mtl.specular_color = parse_color(value).map_err(parse_error)?,
            "Ns" => mtl.specular_exponent = parse_scalar(value).map_err(parse_error)?,
            "d"  => mtl.dissolve = parse_scalar(value).map_err(parse_error)?,
            "map_Kd" => mtl.diffuse_color_map = Some(value.to_string()),
            _ => {}
        }
    }

    // Emit the last material
    if let Some(mtl) = current {
        materials.push(mtl);
    }

    Ok(MaterialLibrary { materials })
}

#[cfg(test)]
mod test {
    use super::{ parse_mtl_file, Material };
    use crate::types::V3;
    use crate::ObjError;

    #[test]
    fn reads_materials() {
        let source = "\
# Blender MTL File
newmtl Hull
Ns 96.078431
Ka 0.1 0.1 0.1
Kd 0.64 0.64 0.64
Ks 0.5 0.5 0.5
illum 2
map_Kd textures/hull.png

newmtl Glass
Kd 0.2
d 0.25
";
        let lib = parse_mtl_file(source.as_bytes()).unwrap();
        assert_eq!(lib.materials.len(), 2);

        let hull = lib.get("Hull").unwrap();
        assert_eq!(hull.ambient_color, V3(0.1, 0.1, 0.1));
        assert_eq!(hull.diffuse_color, V3(0.64, 0.64, 0.64));
        assert_eq!(hull.specular_exponent, 96.078431);
        assert_eq!(hull.diffuse_color_map.as_deref(), Some("textures/hull.png"));
        assert!(hull.is_textured());

        let glass = lib.get("Glass").unwrap();
        assert_eq!(glass.diffuse_color, V3(0.2, 0.2, 0.2));
        assert_eq!(glass.dissolve, 0.25);
        assert!(!glass.is_textured());
    }

    #[test]
    fn defaults() {
        let lib = parse_mtl_file("newmtl Plain\n".as_bytes()).unwrap();
        assert_eq!(lib.materials, vec![Material::new("Plain")]);
        assert!(lib.get("Other").is_none());
    }

    #[test]
    fn latin1_bytes_are_tolerated() {
        let lib = parse_mtl_file(&b"# Mat\xe9riaux\nnewmtl Caf\xe9\nKd 0.5 0.5 0.5\r\n"[..]).unwrap();
        assert_eq!(lib.materials.len(), 1);
        assert_eq!(lib.materials[0].name, "Caf\u{fffd}");
        assert_eq!(lib.materials[0].diffuse_color, V3(0.5, 0.5, 0.5));
    }

    #[test]
    fn bad_color_is_line_numbered() {
        match parse_mtl_file("newmtl A\n\nKd 1 x 1\n".as_bytes()) {
            Err(ObjError::Parse { line: 3, .. }) => {},
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
