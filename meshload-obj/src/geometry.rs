use arrayvec::ArrayVec;

use crate::types::{ V3, V4 };
use crate::ParseErrorKind;

/// The four kinds of numeric records held by the [GeometryStore].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Vertex,
    Normal,
    Uv,
    Parameter,
}

impl GeometryKind {
    /// Minimum and maximum number of values accepted on one record.
    fn arity(self) -> (usize, usize) {
        match self {
            GeometryKind::Vertex | GeometryKind::Normal => (3, 4),
            GeometryKind::Uv | GeometryKind::Parameter  => (1, 3),
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GeometryKind::Vertex    => "vertex",
            GeometryKind::Normal    => "normal",
            GeometryKind::Uv        => "texture coordinate",
            GeometryKind::Parameter => "parameter",
        };
        f.write_str(label)
    }
}

pub(crate) const MAX_FIELDS: usize = 4;

/// Parses between `min` and `max` whitespace separated floats.
pub(crate) fn parse_fields(raw: &str, min: usize, max: usize) -> Result<ArrayVec<f32, MAX_FIELDS>, ParseErrorKind> {
    let mut values = ArrayVec::new();
    for part in raw.split_whitespace() {
        if values.len() == max {
            return Err(ParseErrorKind::MalformedGeometry(format!("unexpected value `{part}`, expected at most {max} values")));
        }
        let value = part.parse()
            .map_err(|_| ParseErrorKind::MalformedGeometry(format!("`{part}` is not a number")))?;
        values.push(value);
    }
    if values.len() < min {
        return Err(ParseErrorKind::MalformedGeometry(format!("expected at least {min} values, found {} in `{raw}`", values.len())));
    }
    Ok(values)
}

/// File-global storage for every numeric record of a document.
///
/// Each kind is kept in its own sequence, addressed with the 1-based
/// indices used by face, line and point declarations.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeometryStore {
    pub vertices: Vec<V4>,
    pub normals: Vec<V4>,
    pub uvs: Vec<V3>,
    pub parameters: Vec<V3>,
}

impl GeometryStore {
    /// Parses `raw` as a record of the given kind and appends it,
    /// returning the new 1-based index.
    pub fn read_value(&mut self, kind: GeometryKind, raw: &str) -> Result<usize, ParseErrorKind> {
        let (min, max) = kind.arity();
        let fields = parse_fields(raw, min, max)?;
        let get = |i: usize, default: f32| fields.get(i).copied().unwrap_or(default);
        match kind {
            GeometryKind::Vertex => {
                self.vertices.push(V4(get(0, 0.0), get(1, 0.0), get(2, 0.0), get(3, 1.0)));
            },
            GeometryKind::Normal => {
                self.normals.push(V4(get(0, 0.0), get(1, 0.0), get(2, 0.0), get(3, 1.0)));
            },
            GeometryKind::Uv => {
                self.uvs.push(V3(get(0, 0.0), get(1, 0.0), get(2, 0.0)));
            },
            GeometryKind::Parameter => {
                // Curve parameters default to a weight of 1
                self.parameters.push(V3(get(0, 0.0), get(1, 0.0), get(2, 1.0)));
            },
        }
        Ok(self.len(kind))
    }

    pub fn len(&self, kind: GeometryKind) -> usize {
        match kind {
            GeometryKind::Vertex    => self.vertices.len(),
            GeometryKind::Normal    => self.normals.len(),
            GeometryKind::Uv        => self.uvs.len(),
            GeometryKind::Parameter => self.parameters.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
            && self.normals.is_empty()
            && self.uvs.is_empty()
            && self.parameters.is_empty()
    }

    pub fn vertex(&self, index: usize) -> Option<V4> {
        lookup(&self.vertices, index)
    }

    pub fn normal(&self, index: usize) -> Option<V4> {
        lookup(&self.normals, index)
    }

    pub fn uv(&self, index: usize) -> Option<V3> {
        lookup(&self.uvs, index)
    }

    pub fn parameter(&self, index: usize) -> Option<V3> {
        lookup(&self.parameters, index)
    }

    pub fn shrink_to_fit(&mut self) {
        self.vertices.shrink_to_fit();
        self.normals.shrink_to_fit();
        self.uvs.shrink_to_fit();
        self.parameters.shrink_to_fit();
    }
}

fn lookup<T: Copy>(values: &[T], index: usize) -> Option<T> {
    index.checked_sub(1).and_then(|i| values.get(i)).copied()
}

#[cfg(test)]
mod test {
    use super::{ GeometryKind, GeometryStore };
    use crate::types::{ V3, V4 };
    use crate::ParseErrorKind;

    fn is_malformed(result: Result<usize, ParseErrorKind>) -> bool {
        matches!(result, Err(ParseErrorKind::MalformedGeometry(_)))
    }

    #[test]
    fn indices_are_one_based_per_kind() {
        let mut store = GeometryStore::default();
        assert_eq!(store.read_value(GeometryKind::Vertex, "1 2 3"), Ok(1));
        assert_eq!(store.read_value(GeometryKind::Vertex, "4 5 6"), Ok(2));
        assert_eq!(store.read_value(GeometryKind::Normal, "0 1 0"), Ok(1));
        assert_eq!(store.read_value(GeometryKind::Uv, "0.5 0.25"), Ok(1));
        assert_eq!(store.vertex(2), Some(V4(4.0, 5.0, 6.0, 1.0)));
        assert_eq!(store.vertex(0), None);
        assert_eq!(store.vertex(3), None);
    }

    #[test]
    fn vertex_weight() {
        let mut store = GeometryStore::default();
        store.read_value(GeometryKind::Vertex, "1 2 3 0.5").unwrap();
        assert_eq!(store.vertex(1), Some(V4(1.0, 2.0, 3.0, 0.5)));
        assert!(is_malformed(store.read_value(GeometryKind::Vertex, "1 2")));
        assert!(is_malformed(store.read_value(GeometryKind::Vertex, "1 2 3 4 5")));
    }

    #[test]
    fn uv_defaults() {
        let mut store = GeometryStore::default();
        store.read_value(GeometryKind::Uv, "0.75").unwrap();
        store.read_value(GeometryKind::Uv, "0.1 0.2 0.3").unwrap();
        assert_eq!(store.uv(1), Some(V3(0.75, 0.0, 0.0)));
        assert_eq!(store.uv(2), Some(V3(0.1, 0.2, 0.3)));
        assert!(is_malformed(store.read_value(GeometryKind::Uv, "")));
        assert!(is_malformed(store.read_value(GeometryKind::Uv, "1 2 3 4")));
    }

    #[test]
    fn parameters() {
        let mut store = GeometryStore::default();
        store.read_value(GeometryKind::Parameter, "0.5").unwrap();
        assert_eq!(store.parameter(1), Some(V3(0.5, 0.0, 1.0)));
    }

    #[test]
    fn error_cites_token() {
        let mut store = GeometryStore::default();
        let err = store.read_value(GeometryKind::Normal, "0 one 0").unwrap_err();
        assert_eq!(err, ParseErrorKind::MalformedGeometry("`one` is not a number".to_string()));
        assert!(store.is_empty());
    }
}
