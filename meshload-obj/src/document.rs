use crate::geometry::{ GeometryKind, GeometryStore };
use crate::ParseErrorKind;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Object,
    Group,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimitiveKind {
    Face,
    Line,
    Point,
}

impl PrimitiveKind {
    pub fn min_declarations(self) -> usize {
        match self {
            PrimitiveKind::Face  => 3,
            PrimitiveKind::Line  => 2,
            PrimitiveKind::Point => 1,
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PrimitiveKind::Face  => "face",
            PrimitiveKind::Line  => "line",
            PrimitiveKind::Point => "point",
        })
    }
}

/// One `v/vt/vn` reference of a face, line or point.
/// All indices are absolute and 1-based.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub vertex: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

impl Declaration {
    /// Parses declarations of the form `v`, `v/vt`, `v//vn` or `v/vt/vn`.
    ///
    /// Negative indices count back from the most recent record of their
    /// kind in `geometry` and are resolved to absolute indices here.
    pub fn parse(s: &str, geometry: &GeometryStore) -> Result<Declaration, ParseErrorKind> {
        let mut parts = s.split('/');
        let vertex = match parts.next() {
            Some(v) if !v.is_empty() => parse_index(v, GeometryKind::Vertex, geometry)?,
            _ => return Err(ParseErrorKind::MalformedDeclaration(format!("`{s}` has no vertex index"))),
        };
        let uv = match parts.next() {
            None | Some("") => None,
            Some(v) => Some(parse_index(v, GeometryKind::Uv, geometry)?),
        };
        let normal = match parts.next() {
            None | Some("") => None,
            Some(v) => Some(parse_index(v, GeometryKind::Normal, geometry)?),
        };
        if parts.next().is_some() {
            return Err(ParseErrorKind::MalformedDeclaration(format!("`{s}` has more than three parts")));
        }
        Ok(Declaration { vertex, uv, normal })
    }
}

fn parse_index(part: &str, kind: GeometryKind, geometry: &GeometryStore) -> Result<usize, ParseErrorKind> {
    let malformed = |reason: String| ParseErrorKind::MalformedDeclaration(reason);
    let index: i64 = part.parse()
        .map_err(|_| malformed(format!("`{part}` is not a valid {kind} index")))?;
    if index == 0 {
        return Err(malformed(format!("{kind} index 0 is invalid, indices start at 1")));
    }
    if index > 0 {
        return usize::try_from(index)
            .map_err(|_| malformed(format!("{kind} index {index} is out of range")));
    }
    let declared = geometry.len(kind);
    match usize::try_from(index.unsigned_abs()) {
        Ok(back) if back <= declared => Ok(declared - back + 1),
        _ => Err(malformed(format!("relative {kind} index {index} precedes the first {kind} ({declared} declared)"))),
    }
}

/// Parses the whitespace separated declaration list of a face, line or point record.
pub fn parse_declarations(kind: PrimitiveKind, raw: &str, geometry: &GeometryStore) -> Result<Vec<Declaration>, ParseErrorKind> {
    let declarations = raw.split_whitespace()
        .map(|s| Declaration::parse(s, geometry))
        .collect::<Result<Vec<_>, _>>()?;
    let min = kind.min_declarations();
    if declarations.len() < min {
        return Err(ParseErrorKind::MalformedDeclaration(
            format!("{kind} needs at least {min} declarations, found {}", declarations.len())));
    }
    Ok(declarations)
}

/// A single face, line or point.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    pub kind: PrimitiveKind,
    pub declarations: Vec<Declaration>,
    pub smoothing_group: Option<String>,
    /// Source line the primitive was declared on
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    pub kind: ObjectKind,
    pub material: String,
    pub vertex_data: Vec<VertexData>,
    pub comments: Vec<String>,
}

impl Object {
    pub fn new(kind: ObjectKind, name: impl Into<String>, material: impl Into<String>) -> Self {
        Object {
            name: name.into(),
            kind,
            material: material.into(),
            vertex_data: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn has_vertex_data(&self) -> bool {
        !self.vertex_data.is_empty()
    }
}

// Matched case-insensitively against object comments
const STATISTICS_MARKERS: [&str; 6] = ["vertices", "normals", "uvs", "texture coords", "polygons", "triangles"];

/// True if a comment looks like exporter statistics (e.g. `# 24 vertices`).
pub fn is_statistics_comment(comment: &str) -> bool {
    let comment = comment.to_lowercase();
    STATISTICS_MARKERS.iter().any(|marker| comment.contains(marker))
}

/// The parsed contents of one OBJ file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    pub objects: Vec<Object>,
    pub material_libraries: Vec<String>,
    /// Comments preceding the first object and the first material library
    pub comments: Vec<String>,
    pub geometry: GeometryStore,
    /// Number of `o` and `g` records seen
    pub object_or_group_count: usize,
}

impl Document {
    /// Appends a new, empty object and returns its index.
    pub fn create_object(&mut self, kind: ObjectKind, name: impl Into<String>, material: impl Into<String>) -> usize {
        self.objects.push(Object::new(kind, name, material));
        self.objects.len() - 1
    }

    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats {
            objects: self.objects.len(),
            objects_or_groups: self.object_or_group_count,
            vertices: self.geometry.vertices.len(),
            normals: self.geometry.normals.len(),
            uvs: self.geometry.uvs.len(),
            parameters: self.geometry.parameters.len(),
            ..Default::default()
        };
        for data in self.objects.iter().flat_map(|o| o.vertex_data.iter()) {
            match data.kind {
                PrimitiveKind::Face  => stats.faces += 1,
                PrimitiveKind::Line  => stats.lines += 1,
                PrimitiveKind::Point => stats.points += 1,
            }
        }
        stats
    }

    /// Releases excess capacity left over from parsing.
    pub fn shrink_to_fit(&mut self) {
        self.geometry.shrink_to_fit();
        self.objects.shrink_to_fit();
        for obj in self.objects.iter_mut() {
            obj.vertex_data.shrink_to_fit();
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DocumentStats {
    pub objects: usize,
    pub objects_or_groups: usize,
    pub vertices: usize,
    pub normals: usize,
    pub uvs: usize,
    pub parameters: usize,
    pub faces: usize,
    pub lines: usize,
    pub points: usize,
}

#[cfg(test)]
mod test {
    use super::*;

    fn store_with_vertices(count: usize) -> GeometryStore {
        let mut store = GeometryStore::default();
        for i in 0..count {
            store.read_value(GeometryKind::Vertex, &format!("{i} 0 0")).unwrap();
        }
        store
    }

    #[test]
    fn declaration_forms() {
        let store = GeometryStore::default();
        let parse = |s| Declaration::parse(s, &store);
        assert_eq!(parse("3"), Ok(Declaration { vertex: 3, uv: None, normal: None }));
        assert_eq!(parse("3/4"), Ok(Declaration { vertex: 3, uv: Some(4), normal: None }));
        assert_eq!(parse("3//5"), Ok(Declaration { vertex: 3, uv: None, normal: Some(5) }));
        assert_eq!(parse("3/4/5"), Ok(Declaration { vertex: 3, uv: Some(4), normal: Some(5) }));
    }

    #[test]
    fn declaration_errors() {
        let store = GeometryStore::default();
        let malformed = |s| matches!(Declaration::parse(s, &store), Err(ParseErrorKind::MalformedDeclaration(_)));
        assert!(malformed("0"));
        assert!(malformed("1/0"));
        assert!(malformed("a"));
        assert!(malformed("1.5"));
        assert!(malformed("/1/1"));
        assert!(malformed("1/2/3/4"));
    }

    #[test]
    fn relative_indices() {
        let store = store_with_vertices(4);
        assert_eq!(Declaration::parse("-1", &store).map(|d| d.vertex), Ok(4));
        assert_eq!(Declaration::parse("-4", &store).map(|d| d.vertex), Ok(1));
        assert!(Declaration::parse("-5", &store).is_err());
    }

    #[test]
    fn declaration_counts() {
        let store = GeometryStore::default();
        assert!(parse_declarations(PrimitiveKind::Face, "1 2", &store).is_err());
        assert_eq!(parse_declarations(PrimitiveKind::Face, "1 2 3 4", &store).map(|d| d.len()), Ok(4));
        assert!(parse_declarations(PrimitiveKind::Line, "1", &store).is_err());
        assert!(parse_declarations(PrimitiveKind::Point, "", &store).is_err());
        assert_eq!(parse_declarations(PrimitiveKind::Point, "7", &store).map(|d| d.len()), Ok(1));
    }

    #[test]
    fn statistics_comments() {
        assert!(is_statistics_comment("8 Vertices"));
        assert!(is_statistics_comment("6 POLYGONS"));
        assert!(is_statistics_comment("12 triangles"));
        assert!(is_statistics_comment("4 texture coords"));
        assert!(is_statistics_comment("6 Normals"));
        assert!(is_statistics_comment("14 uvs"));
        assert!(!is_statistics_comment("Exported by Tool X"));
    }
}
