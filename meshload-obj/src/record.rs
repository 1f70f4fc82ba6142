use crate::document::{ ObjectKind, PrimitiveKind };
use crate::geometry::GeometryKind;

/// The kind of a single OBJ line, determined by its leading token.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordType {
    Comment,
    MaterialLibraryRef,
    MaterialUse,
    Vertex,
    Normal,
    Uv,
    Parameter,
    Face,
    Line,
    Point,
    ChildObject,
    ChildGroup,
    SmoothingGroup,
    Unknown,
}

impl RecordType {
    pub fn geometry_kind(self) -> Option<GeometryKind> {
        match self {
            RecordType::Vertex    => Some(GeometryKind::Vertex),
            RecordType::Normal    => Some(GeometryKind::Normal),
            RecordType::Uv        => Some(GeometryKind::Uv),
            RecordType::Parameter => Some(GeometryKind::Parameter),
            _ => None,
        }
    }

    pub fn primitive_kind(self) -> Option<PrimitiveKind> {
        match self {
            RecordType::Face  => Some(PrimitiveKind::Face),
            RecordType::Line  => Some(PrimitiveKind::Line),
            RecordType::Point => Some(PrimitiveKind::Point),
            _ => None,
        }
    }

    pub fn object_kind(self) -> Option<ObjectKind> {
        match self {
            RecordType::ChildObject => Some(ObjectKind::Object),
            RecordType::ChildGroup  => Some(ObjectKind::Group),
            _ => None,
        }
    }
}

/// Splits one line into its record type and the trimmed value following the
/// leading token.
///
/// Any line starting with `#` is a comment, whether or not whitespace follows
/// the marker. The value of a comment is the text after the `#`.
pub fn classify(line: &str) -> (RecordType, &str) {
    let line = line.trim();
    if let Some(comment) = line.strip_prefix('#') {
        return (RecordType::Comment, comment.trim());
    }

    let (directive, value) = match line.find(char::is_whitespace) {
        Some(split) => (&line[..split], line[split..].trim()),
        None => (line, ""),
    };

    let record = match directive {
        "mtllib" => RecordType::MaterialLibraryRef,
        "usemtl" => RecordType::MaterialUse,
        "v"      => RecordType::Vertex,
        "vn"     => RecordType::Normal,
        "vt"     => RecordType::Uv,
        "vp"     => RecordType::Parameter,
        "f"      => RecordType::Face,
        "l"      => RecordType::Line,
        "p"      => RecordType::Point,
        "o"      => RecordType::ChildObject,
        "g"      => RecordType::ChildGroup,
        "s"      => RecordType::SmoothingGroup,
        _        => RecordType::Unknown,
    };
    (record, value)
}

#[cfg(test)]
mod test {
    use super::{ classify, RecordType };

    #[test]
    fn directives() {
        assert_eq!(classify("v 1 2 3"), (RecordType::Vertex, "1 2 3"));
        assert_eq!(classify("vn 0 1 0"), (RecordType::Normal, "0 1 0"));
        assert_eq!(classify("vt 0.5 0.5"), (RecordType::Uv, "0.5 0.5"));
        assert_eq!(classify("vp 0.2"), (RecordType::Parameter, "0.2"));
        assert_eq!(classify("f 1/1 2/2 3/3"), (RecordType::Face, "1/1 2/2 3/3"));
        assert_eq!(classify("l 1 2"), (RecordType::Line, "1 2"));
        assert_eq!(classify("p 1"), (RecordType::Point, "1"));
        assert_eq!(classify("o Cube"), (RecordType::ChildObject, "Cube"));
        assert_eq!(classify("g Wheels"), (RecordType::ChildGroup, "Wheels"));
        assert_eq!(classify("s 1"), (RecordType::SmoothingGroup, "1"));
        assert_eq!(classify("mtllib scene.mtl"), (RecordType::MaterialLibraryRef, "scene.mtl"));
        assert_eq!(classify("usemtl Steel"), (RecordType::MaterialUse, "Steel"));
    }

    #[test]
    fn value_skips_whitespace_run() {
        assert_eq!(classify("  v \t 1   2 3  "), (RecordType::Vertex, "1   2 3"));
        assert_eq!(classify("o"), (RecordType::ChildObject, ""));
    }

    #[test]
    fn comments() {
        assert_eq!(classify("# Exported by Tool X"), (RecordType::Comment, "Exported by Tool X"));
        assert_eq!(classify("#no space"), (RecordType::Comment, "no space"));
        assert_eq!(classify("#"), (RecordType::Comment, ""));
    }

    #[test]
    fn leading_token_must_match_exactly() {
        assert_eq!(classify("xq 1 2 3").0, RecordType::Unknown);
        assert_eq!(classify("vx 1 2 3").0, RecordType::Unknown);
        assert_eq!(classify("V 1 2 3").0, RecordType::Unknown);
        assert_eq!(classify("cstype bspline").0, RecordType::Unknown);
    }
}
