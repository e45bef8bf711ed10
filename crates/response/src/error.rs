use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::path::FieldPath;

/// Why a single value in a payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// A required field is absent from its object.
    MissingRequiredField,
    /// The value has the wrong JSON kind, or a number outside the target range.
    TypeMismatch {
        /// What the record declares for this field.
        expected: &'static str,
        /// What the payload actually contains.
        actual: &'static str,
    },
    /// A literal field holds a string outside its allowed set.
    InvalidLiteral {
        /// The exact strings accepted for the field.
        allowed: &'static [&'static str],
        /// The string found in the payload.
        received: String,
    },
    /// One or more elements of a sequence failed validation.
    ///
    /// The element violations are reported separately under their own paths.
    NestedValidationFailed {
        /// Positions of the failing elements, in input order.
        elements: Vec<usize>,
    },
}

impl Reason {
    /// Stable machine-readable name of the violation kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingRequiredField => "missing_required_field",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::NestedValidationFailed { .. } => "nested_validation_failed",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequiredField => f.write_str("missing required field"),
            Self::TypeMismatch { expected, actual } => write!(f, "expected {expected}, found {actual}"),
            Self::InvalidLiteral { allowed, received } => {
                write!(f, "invalid literal {received:?}, expected one of {allowed:?}")
            }
            Self::NestedValidationFailed { elements } => write!(f, "elements {elements:?} failed validation"),
        }
    }
}

/// A single schema violation, located by its field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Where in the payload the violation was found.
    pub path: FieldPath,
    /// What was wrong with the value at that path.
    pub reason: Reason,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Aggregate failure of one construction call.
///
/// Lists every violation found in the payload, not just the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {type_name}: {}", render_violations(.violations))]
pub struct ValidationError {
    type_name: &'static str,
    violations: Vec<Violation>,
}

impl ValidationError {
    pub(crate) fn new(type_name: &'static str, violations: Vec<Violation>) -> Self {
        Self { type_name, violations }
    }

    /// The record type that was being constructed.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All violations, in the order they were found.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Reasons reported at exactly the given rendered path, e.g. `choices[0].index`.
    pub fn reasons_at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Reason> + 'a {
        self.violations
            .iter()
            .filter(move |violation| violation.path == path)
            .map(|violation| &violation.reason)
    }
}

fn render_violations(violations: &[Violation]) -> String {
    let count = match violations.len() {
        1 => "1 violation".to_string(),
        n => format!("{n} violations"),
    };

    let lines = violations.iter().map(|violation| format!("  {violation}")).join("\n");

    if lines.is_empty() {
        count
    } else {
        format!("{count}\n{lines}")
    }
}

/// Failure to turn raw JSON text into a record.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The text is not well-formed JSON.
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The JSON is well-formed but does not match the record schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ParseError {
    /// The schema violations, if the text was well-formed JSON.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(error) => Some(error),
            Self::Syntax(_) => None,
        }
    }
}

/// Failure to interpret the untyped parameters of a function call.
#[derive(Debug, Error)]
pub enum ParametersError {
    /// The call carries no parameters at all.
    #[error("function `{name}` was called without parameters")]
    Missing {
        /// Name of the called function.
        name: String,
    },

    /// The parameters are a string that does not hold valid JSON.
    #[error("parameters of function `{name}` are not valid JSON: {source}")]
    Malformed {
        /// Name of the called function.
        name: String,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The parameters are JSON but do not fit the requested type.
    #[error("parameters of function `{name}` do not match the expected shape: {source}")]
    Shape {
        /// Name of the called function.
        name: String,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to fold streamed chunks into a single completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    /// The stream ended before any chunk arrived.
    #[error("no chunks were received")]
    Empty,

    /// A chunk does not belong to the response being assembled.
    #[error(
        "chunk `{found_id}` created at {found_created} does not belong to response `{expected_id}` created at {expected_created}"
    )]
    MismatchedChunk {
        /// Identifier fixed by the first chunk.
        expected_id: String,
        /// Creation time fixed by the first chunk.
        expected_created: u64,
        /// Identifier of the rejected chunk.
        found_id: String,
        /// Creation time of the rejected chunk.
        found_created: u64,
    },
}

/// Failure to decode the base64 payload of a generated image.
#[derive(Debug, Error)]
#[error("image {index} is not valid base64: {source}")]
pub struct ImageDecodeError {
    /// Position of the image in the response.
    pub index: u32,
    /// Underlying decoder error.
    #[source]
    pub source: base64::DecodeError,
}
