use std::io::{ BufRead, BufReader, Read };

use log::{ debug, info };

use crate::document::{ is_statistics_comment, parse_declarations, Document, Object, ObjectKind, PrimitiveKind, VertexData };
use crate::geometry::GeometryKind;
use crate::record::{ classify, RecordType };
use crate::{ ObjError, ParseErrorKind };

const DEFAULT_OBJECT_NAME: &str = "default";

// Capacity the line buffer is trimmed back to after an unusually long line
const LINE_BUFFER_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Number of lines between releasing transient buffers
    /// when streaming from a reader.
    pub reclaim_interval: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            reclaim_interval: 1_000_000,
        }
    }
}

/// The state change a single classified line causes.
///
/// Computed by [ObjParser::plan] from the record type and the current
/// parse state, then applied. Planning never mutates the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<'a> {
    DocumentComment(&'a str),
    ObjectComment(&'a str),
    DropComment,
    MaterialLibrary(&'a str),
    Geometry(GeometryKind, &'a str),
    StartObject(ObjectKind, &'a str),
    /// Relabel the current object (if any) with a new material
    SetMaterial(&'a str),
    /// Start a sibling of the current object carrying the new material
    SplitObject(&'a str),
    Primitive { kind: PrimitiveKind, create_default: bool, declarations: &'a str },
    Smoothing(&'a str),
    Unsupported,
}

#[derive(Debug, Default)]
struct ParseState {
    current_object: Option<usize>,
    base_name: String,
    split_count: usize,
    material: String,
    pending_smoothing_group: Option<String>,
}

/// Streaming OBJ parser.
///
/// Lines are fed one at a time through [ObjParser::parse_line] (or read
/// from a [BufRead] with [ObjParser::parse_next]). Each line is applied
/// atomically, so a caller may stop between any two lines.
pub struct ObjParser {
    document: Document,
    state: ParseState,
    options: ParseOptions,
    line_number: usize,
}

impl Default for ObjParser {
    fn default() -> Self {
        ObjParser::with_options(ParseOptions::default())
    }
}

impl ObjParser {
    pub fn new() -> Self {
        ObjParser::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        ObjParser {
            document: Document::default(),
            state: ParseState::default(),
            options,
            line_number: 0,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn current_object(&self) -> Option<&Object> {
        self.state.current_object.map(|i| &self.document.objects[i])
    }

    /// Decides what a record does given the current state.
    pub fn plan<'a>(&self, record: RecordType, value: &'a str) -> Transition<'a> {
        match record {
            RecordType::Comment => {
                if self.document.objects.is_empty() && self.document.material_libraries.is_empty() {
                    Transition::DocumentComment(value)
                } else if self.current_object().is_some() && !is_statistics_comment(value) {
                    Transition::ObjectComment(value)
                } else {
                    Transition::DropComment
                }
            },
            RecordType::MaterialLibraryRef => Transition::MaterialLibrary(value),
            RecordType::MaterialUse => match self.current_object() {
                Some(obj) if obj.has_vertex_data() && obj.material != value => Transition::SplitObject(value),
                _ => Transition::SetMaterial(value),
            },
            RecordType::SmoothingGroup => Transition::Smoothing(value),
            RecordType::Unknown => Transition::Unsupported,
            other => {
                if let Some(kind) = other.geometry_kind() {
                    Transition::Geometry(kind, value)
                } else if let Some(kind) = other.object_kind() {
                    Transition::StartObject(kind, value)
                } else if let Some(kind) = other.primitive_kind() {
                    Transition::Primitive {
                        kind,
                        create_default: self.state.current_object.is_none(),
                        declarations: value,
                    }
                } else {
                    Transition::Unsupported
                }
            },
        }
    }

    /// Parses a single line. Blank lines are counted but otherwise ignored.
    pub fn parse_line(&mut self, line: &str) -> Result<(), ObjError> {
        self.line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let (record, value) = classify(line);
        let transition = self.plan(record, value);
        self.apply(transition, line)
            .map_err(|kind| ObjError::Parse { line: self.line_number, kind })
    }

    /// Reads and parses the next line from `reader`, using `buffer` as scratch space.
    /// Returns `false` once the reader is exhausted.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD, so they only
    /// fail the parse when they land in a record that has to be understood.
    pub fn parse_next(&mut self, reader: &mut impl BufRead, buffer: &mut Vec<u8>) -> Result<bool, ObjError> {
        buffer.clear();
        if reader.read_until(b'\n', buffer)? == 0 {
            return Ok(false);
        }
        self.parse_line(&String::from_utf8_lossy(buffer))?;
        if self.options.reclaim_interval > 0 && self.line_number % self.options.reclaim_interval == 0 {
            buffer.shrink_to(LINE_BUFFER_CAPACITY);
            debug!("Parsed {} lines, {} objects", self.line_number, self.document.objects.len());
        }
        Ok(true)
    }

    /// Completes the parse and returns the document.
    pub fn finish(mut self) -> Document {
        self.document.shrink_to_fit();
        info!("Parsed {} lines into {} objects", self.line_number, self.document.objects.len());
        self.document
    }

    fn apply(&mut self, transition: Transition, line: &str) -> Result<(), ParseErrorKind> {
        match transition {
            Transition::DocumentComment(comment) => {
                self.document.comments.push(comment.to_string());
            },
            Transition::ObjectComment(comment) => {
                if let Some(index) = self.state.current_object {
                    self.document.objects[index].comments.push(comment.to_string());
                }
            },
            Transition::DropComment => {},
            Transition::MaterialLibrary(name) => {
                self.document.material_libraries.push(name.to_string());
            },
            Transition::Geometry(kind, raw) => {
                self.document.geometry.read_value(kind, raw)?;
            },
            Transition::StartObject(kind, name) => {
                self.start_object(kind, name);
                self.document.object_or_group_count += 1;
            },
            Transition::SplitObject(material) => {
                self.split_object(material);
                self.set_material(material);
            },
            Transition::SetMaterial(material) => {
                self.set_material(material);
            },
            Transition::Primitive { kind, create_default, declarations } => {
                let declarations = parse_declarations(kind, declarations, &self.document.geometry)?;
                let index = match self.state.current_object.filter(|_| !create_default) {
                    Some(index) => index,
                    None => self.start_object(ObjectKind::Object, DEFAULT_OBJECT_NAME),
                };
                let smoothing_group = self.state.pending_smoothing_group.take();
                self.document.objects[index].vertex_data.push(VertexData {
                    kind,
                    declarations,
                    smoothing_group,
                    line: self.line_number,
                });
            },
            Transition::Smoothing(group) => {
                self.state.pending_smoothing_group = Some(group.to_string());
            },
            Transition::Unsupported => {
                return Err(ParseErrorKind::UnsupportedRecord(line.to_string()));
            },
        }
        Ok(())
    }

    fn start_object(&mut self, kind: ObjectKind, name: &str) -> usize {
        let index = self.document.create_object(kind, name, self.state.material.as_str());
        self.state.current_object = Some(index);
        self.state.base_name = name.to_string();
        self.state.split_count = 0;
        index
    }

    fn split_object(&mut self, material: &str) {
        let Some(current) = self.state.current_object else {
            return;
        };
        let kind = self.document.objects[current].kind;
        self.state.split_count += 1;
        let name = format!("{}_{}", self.state.base_name, self.state.split_count);
        debug!("Line {}: material {material} starts {name}", self.line_number);
        let index = self.document.create_object(kind, name, material);
        self.state.current_object = Some(index);
    }

    fn set_material(&mut self, material: &str) {
        self.state.material = material.to_string();
        if let Some(index) = self.state.current_object {
            self.document.objects[index].material = material.to_string();
        }
    }
}

pub fn parse_obj_file(source: impl Read) -> Result<Document, ObjError> {
    parse_obj_file_with_options(source, ParseOptions::default())
}

pub fn parse_obj_file_with_options(source: impl Read, options: ParseOptions) -> Result<Document, ObjError> {
    let mut reader = BufReader::new(source);
    let mut buffer = Vec::with_capacity(LINE_BUFFER_CAPACITY);
    let mut parser = ObjParser::with_options(options);
    while parser.parse_next(&mut reader, &mut buffer)? {}
    Ok(parser.finish())
}

pub fn parse_obj_str(source: &str) -> Result<Document, ObjError> {
    parse_obj_file(source.as_bytes())
}
