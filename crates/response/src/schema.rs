//! Eager, aggregating validation of untyped JSON into typed records.
//!
//! Every record reads all of its declared fields before deciding whether it
//! could be built, so a single pass reports every violation in the payload.
//! A reader returns `None` only after it has reported at least one violation.

use serde_json::{Map, Value};

use crate::{
    error::{ParseError, Reason, ValidationError, Violation},
    path::{FieldPath, Segment},
};

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// A record that can be constructed from an untyped JSON value.
///
/// Implemented for every record in this crate and for the primitives they are
/// built from. The trait is sealed:
///
/// ```compile_fail
/// use response::{Cursor, FromJson};
///
/// struct Custom;
///
/// impl FromJson for Custom {
///     const TYPE_NAME: &'static str = "custom";
///
///     fn read(_: &serde_json::Value, _: &mut Cursor) -> Option<Self> {
///         Some(Custom)
///     }
/// }
/// ```
pub trait FromJson: Sized + sealed::Sealed {
    /// Name of the type as it appears in error messages.
    const TYPE_NAME: &'static str;

    /// Reads the record at the cursor position, reporting violations to it.
    ///
    /// Returns `None` only after reporting at least one violation.
    fn read(value: &Value, cx: &mut Cursor) -> Option<Self>;

    /// Constructs the record, or returns every violation found in `value`.
    fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let mut cx = Cursor::default();
        let parsed = Self::read(value, &mut cx);
        let result = cx.finish(Self::TYPE_NAME, parsed);

        if let Err(ref error) = result {
            log::debug!(
                "Rejected {} payload with {} violation(s)",
                Self::TYPE_NAME,
                error.violations().len()
            );
        }

        result
    }

    /// Parses JSON text and constructs the record from it.
    ///
    /// Text nested deeper than 128 levels is rejected as a syntax error.
    fn from_json_str(text: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value)?)
    }

    /// Parses JSON bytes and constructs the record from them.
    fn from_json_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_value(&value)?)
    }
}

/// Validation state threaded through one construction call.
///
/// Tracks the path of the value being read and collects violations. Opaque
/// outside this crate; [`FromJson::from_value`] creates and consumes it.
#[derive(Debug, Default)]
pub struct Cursor {
    path: FieldPath,
    violations: Vec<Violation>,
}

impl Cursor {
    pub(crate) fn report(&mut self, reason: Reason) {
        self.violations.push(Violation {
            path: self.path.clone(),
            reason,
        });
    }

    pub(crate) fn mismatch(&mut self, expected: &'static str, value: &Value) {
        self.report(Reason::TypeMismatch {
            expected,
            actual: kind_of(value),
        });
    }

    fn nested<T>(&mut self, segment: Segment, read: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(segment);
        let result = read(self);
        self.path.pop();

        result
    }

    /// Reads `value` as a JSON object.
    pub(crate) fn object<'a>(&mut self, value: &'a Value) -> Option<&'a Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.mismatch("object", other);
                None
            }
        }
    }

    /// Reads a field that must be present.
    pub(crate) fn required<T: FromJson>(&mut self, map: &Map<String, Value>, name: &'static str) -> Option<T> {
        self.nested(Segment::Field(name), |cx| match map.get(name) {
            Some(value) => T::read(value, cx),
            None => {
                cx.report(Reason::MissingRequiredField);
                None
            }
        })
    }

    /// Reads a field that may be absent or `null`.
    ///
    /// The outer `Option` is `None` when the field is present but invalid.
    pub(crate) fn optional<T: FromJson>(&mut self, map: &Map<String, Value>, name: &'static str) -> Option<Option<T>> {
        match map.get(name) {
            None | Some(Value::Null) => Some(None),
            Some(value) => self.nested(Segment::Field(name), |cx| T::read(value, cx)).map(Some),
        }
    }

    /// Like [`Cursor::optional`], but also accepts the field under a second wire name.
    ///
    /// The alias is read only when `name` is absent or `null`.
    pub(crate) fn optional_aliased<T: FromJson>(
        &mut self,
        map: &Map<String, Value>,
        name: &'static str,
        alias: &'static str,
    ) -> Option<Option<T>> {
        match map.get(name) {
            None | Some(Value::Null) => self.optional(map, alias),
            Some(_) => self.optional(map, name),
        }
    }

    fn finish<T>(self, type_name: &'static str, parsed: Option<T>) -> Result<T, ValidationError> {
        match parsed {
            Some(value) if self.violations.is_empty() => Ok(value),
            _ => Err(ValidationError::new(type_name, self.violations)),
        }
    }
}

/// Human-readable JSON kind of a value, used in type mismatch reports.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "number",
        Value::Number(number) if number.is_i64() && number.as_i64().is_some_and(|n| n < 0) => "negative integer",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl FromJson for String {
    const TYPE_NAME: &'static str = "string";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                cx.mismatch(Self::TYPE_NAME, other);
                None
            }
        }
    }
}

impl FromJson for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            other => {
                cx.mismatch(Self::TYPE_NAME, other);
                None
            }
        }
    }
}

impl FromJson for u64 {
    const TYPE_NAME: &'static str = "unsigned 64-bit integer";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        match value.as_u64() {
            Some(n) => Some(n),
            None => {
                cx.mismatch(Self::TYPE_NAME, value);
                None
            }
        }
    }
}

impl FromJson for u32 {
    const TYPE_NAME: &'static str = "unsigned 32-bit integer";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        match value.as_u64().map(u32::try_from) {
            Some(Ok(n)) => Some(n),
            Some(Err(_)) => {
                cx.report(Reason::TypeMismatch {
                    expected: Self::TYPE_NAME,
                    actual: "integer out of range",
                });
                None
            }
            None => {
                cx.mismatch(Self::TYPE_NAME, value);
                None
            }
        }
    }
}

impl FromJson for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        match value {
            Value::Number(number) if number.is_i64() => number.as_i64(),
            Value::Number(number) if number.is_u64() => {
                cx.report(Reason::TypeMismatch {
                    expected: Self::TYPE_NAME,
                    actual: "integer out of range",
                });
                None
            }
            other => {
                cx.mismatch(Self::TYPE_NAME, other);
                None
            }
        }
    }
}

impl sealed::Sealed for String {}
impl sealed::Sealed for bool {}
impl sealed::Sealed for u64 {}
impl sealed::Sealed for u32 {}
impl sealed::Sealed for i64 {}
impl sealed::Sealed for Value {}
impl<T: FromJson> sealed::Sealed for Vec<T> {}

/// Untyped values pass through verbatim.
impl FromJson for Value {
    const TYPE_NAME: &'static str = "JSON value";

    fn read(value: &Value, _: &mut Cursor) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    const TYPE_NAME: &'static str = "array";

    fn read(value: &Value, cx: &mut Cursor) -> Option<Self> {
        let Value::Array(items) = value else {
            cx.mismatch(Self::TYPE_NAME, value);
            return None;
        };

        let mut elements = Vec::with_capacity(items.len());
        let mut failed = Vec::new();

        for (index, item) in items.iter().enumerate() {
            match cx.nested(Segment::Index(index), |cx| T::read(item, cx)) {
                Some(element) => elements.push(element),
                None => failed.push(index),
            }
        }

        if failed.is_empty() {
            Some(elements)
        } else {
            cx.report(Reason::NestedValidationFailed { elements: failed });
            None
        }
    }
}

/// Implements `serde::Deserialize` by routing through [`FromJson`], so serde
/// users get the same validation as direct callers. Also seals the record.
macro_rules! deserialize_via_schema {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::schema::sealed::Sealed for $ty {}

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                <$ty as $crate::schema::FromJson>::from_value(&value).map_err(serde::de::Error::custom)
            }
        }
    )+};
}

pub(crate) use deserialize_via_schema;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strings_reject_other_kinds() {
        let error = String::from_value(&json!(42)).unwrap_err();

        assert_eq!(error.violations().len(), 1);
        assert_eq!(
            error.violations()[0].reason,
            Reason::TypeMismatch {
                expected: "string",
                actual: "integer"
            }
        );
        assert!(error.violations()[0].path.is_root());
    }

    #[test]
    fn unsigned_integers_reject_negatives_floats_and_overflow() {
        let negative = u32::from_value(&json!(-1)).unwrap_err();
        assert_eq!(
            negative.violations()[0].reason,
            Reason::TypeMismatch {
                expected: "unsigned 32-bit integer",
                actual: "negative integer"
            }
        );

        let float = u64::from_value(&json!(1.5)).unwrap_err();
        assert_eq!(
            float.violations()[0].reason,
            Reason::TypeMismatch {
                expected: "unsigned 64-bit integer",
                actual: "number"
            }
        );

        let overflow = u32::from_value(&json!(u64::from(u32::MAX) + 1)).unwrap_err();
        assert_eq!(
            overflow.violations()[0].reason,
            Reason::TypeMismatch {
                expected: "unsigned 32-bit integer",
                actual: "integer out of range"
            }
        );

        assert_eq!(u32::from_value(&json!(7)).unwrap(), 7);
    }

    #[test]
    fn signed_integers() {
        assert_eq!(i64::from_value(&json!(-3)).unwrap(), -3);

        let overflow = i64::from_value(&json!(u64::MAX)).unwrap_err();
        assert_eq!(
            overflow.violations()[0].reason,
            Reason::TypeMismatch {
                expected: "integer",
                actual: "integer out of range"
            }
        );
    }

    #[test]
    fn untyped_values_pass_through() {
        let value = json!({"anything": [1, "two", null]});

        assert_eq!(Value::from_value(&value).unwrap(), value);
    }

    #[test]
    fn sequences_keep_order() {
        let parsed = Vec::<String>::from_value(&json!(["a", "b", "c"])).unwrap();

        assert_eq!(parsed, vec!["a", "b", "c"]);
    }

    #[test]
    fn sequences_report_every_failing_element() {
        let error = Vec::<u32>::from_value(&json!([1, "two", 3, null])).unwrap_err();
        let rendered: Vec<_> = error.violations().iter().map(ToString::to_string).collect();

        assert_eq!(
            rendered,
            vec![
                "[1]: expected unsigned 32-bit integer, found string",
                "[3]: expected unsigned 32-bit integer, found null",
                "<root>: elements [1, 3] failed validation",
            ]
        );
    }

    #[test]
    fn malformed_text_is_a_syntax_error() {
        let error = u64::from_json_str("{not json").unwrap_err();

        assert!(matches!(error, ParseError::Syntax(_)));
        assert!(error.validation().is_none());
    }

    #[test]
    fn text_goes_through_validation() {
        let error = u64::from_json_str("\"ten\"").unwrap_err();

        assert_eq!(error.validation().map(|e| e.violations().len()), Some(1));
        assert_eq!(u64::from_json_slice(b"10").unwrap(), 10);
    }
}
