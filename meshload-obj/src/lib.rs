mod types;
mod record;
mod geometry;
mod document;
mod parser;
mod flatten;
mod material;
mod loader;

pub use types::{ V3, V4 };
pub use record::{ RecordType, classify };
pub use geometry::{ GeometryKind, GeometryStore };
pub use document::{ Declaration, Document, DocumentStats, Object, ObjectKind, PrimitiveKind, VertexData };
pub use parser::{ ObjParser, ParseOptions, Transition, parse_obj_file, parse_obj_file_with_options, parse_obj_str };
pub use flatten::{ FlatObject, VERTEX_STRIDE, emission_order, flatten_document, flatten_object };
pub use material::{ Material, MaterialLibrary, parse_mtl_file };
pub use loader::{ MeshObject, Model, build_model, load_material_libraries, load_model, load_mtl, load_obj };

#[derive(thiserror::Error, Debug)]
pub enum ObjError {
    #[error("Error loading OBJ file: {0}")]
    General(String),
    #[error("Line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ObjError {
    /// The 1-based source line the error is attributed to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ObjError::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<&ParseErrorKind> {
        match self {
            ObjError::Parse { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),
    #[error("Malformed declaration: {0}")]
    MalformedDeclaration(String),
    #[error("Unresolved {kind} reference {index}")]
    UnresolvedReference { kind: GeometryKind, index: usize },
    #[error("Unsupported line: {0}")]
    UnsupportedRecord(String),
}
