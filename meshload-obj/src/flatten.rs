use crate::document::{ Declaration, Document, Object, ObjectKind, PrimitiveKind };
use crate::geometry::{ GeometryKind, GeometryStore };
use crate::types::V3;
use crate::{ ObjError, ParseErrorKind };

/// Floats per emitted vertex: position xyz, normal xyz, uv
pub const VERTEX_STRIDE: usize = 8;

/// An object flattened into an interleaved vertex buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatObject {
    pub name: String,
    pub kind: ObjectKind,
    pub material: String,
    pub vertices: Vec<f32>,
}

impl FlatObject {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }
}

/// Order in which the declarations of a primitive are emitted.
///
/// Lines and points are emitted as declared. Faces emit `d0, d1, d2` and
/// then `d[i-3], d[i-1], d[i]` for every further declaration `i`, which
/// splits a quad `d0..d3` into `(d0, d1, d2)` and `(d0, d2, d3)`.
pub fn emission_order(kind: PrimitiveKind, count: usize) -> impl Iterator<Item = usize> {
    let head = match kind {
        PrimitiveKind::Face => count.min(3),
        PrimitiveKind::Line | PrimitiveKind::Point => count,
    };
    (0..head).chain((head.max(3)..count).flat_map(|i| [i - 3, i - 1, i]))
}

fn emitted_count(kind: PrimitiveKind, count: usize) -> usize {
    match kind {
        PrimitiveKind::Face if count > 3 => 3 * (count - 2),
        _ => count,
    }
}

fn unresolved(kind: GeometryKind, index: usize) -> ParseErrorKind {
    ParseErrorKind::UnresolvedReference { kind, index }
}

fn push_vertex(out: &mut Vec<f32>, declaration: &Declaration, geometry: &GeometryStore) -> Result<(), ParseErrorKind> {
    let position = geometry.vertex(declaration.vertex)
        .ok_or_else(|| unresolved(GeometryKind::Vertex, declaration.vertex))?
        .xyz();
    let normal = match declaration.normal {
        None => V3::ZERO,
        Some(i) => geometry.normal(i).ok_or_else(|| unresolved(GeometryKind::Normal, i))?.xyz(),
    };
    let uv = match declaration.uv {
        None => V3::ZERO,
        Some(i) => geometry.uv(i).ok_or_else(|| unresolved(GeometryKind::Uv, i))?,
    };
    out.extend_from_slice(&[
        position.0, position.1, position.2,
        normal.0, normal.1, normal.2,
        uv.0, uv.1,
    ]);
    Ok(())
}

/// Resolves every declaration of `obj` against `geometry` into a stride-8
/// interleaved buffer. Shared vertices are repeated, not deduplicated.
pub fn flatten_object(obj: &Object, geometry: &GeometryStore) -> Result<Vec<f32>, ObjError> {
    let capacity = obj.vertex_data.iter()
        .map(|data| emitted_count(data.kind, data.declarations.len()))
        .sum::<usize>() * VERTEX_STRIDE;
    let mut out = Vec::with_capacity(capacity);
    for data in obj.vertex_data.iter() {
        for i in emission_order(data.kind, data.declarations.len()) {
            push_vertex(&mut out, &data.declarations[i], geometry)
                .map_err(|kind| ObjError::Parse { line: data.line, kind })?;
        }
    }
    Ok(out)
}

pub fn flatten_document(document: &Document) -> Result<Vec<FlatObject>, ObjError> {
    document.objects.iter()
        .map(|obj| -> Result<FlatObject, ObjError> {
            Ok(FlatObject {
                name: obj.name.clone(),
                kind: obj.kind,
                material: obj.material.clone(),
                vertices: flatten_object(obj, &document.geometry)?,
            })
        })
        .collect()
}
