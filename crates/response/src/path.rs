use std::fmt;

/// One step from a record into one of its fields or sequence elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// A named field of an object, using the wire name.
    Field(&'static str),
    /// A position inside a sequence.
    Index(usize),
}

/// Location of a value inside a payload, rendered as `choices[0].message.role`.
///
/// The empty path points at the payload itself and renders as `<root>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The path of the payload itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this path points at the payload itself.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments from the root to the addressed value.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The last field name on the path, if the path ends in a field.
    pub fn field_name(&self) -> Option<&'static str> {
        match self.segments.last() {
            Some(Segment::Field(name)) => Some(name),
            _ => None,
        }
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }

        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if position == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }

        Ok(())
    }
}

impl PartialEq<str> for FieldPath {
    fn eq(&self, other: &str) -> bool {
        self.to_string() == other
    }
}

impl PartialEq<&str> for FieldPath {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}
