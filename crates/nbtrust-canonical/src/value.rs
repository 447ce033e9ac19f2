use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::validation::ValidationError;

/// String-keyed mapping. Iteration order is irrelevant to hashing; the
/// serializer imposes its own ordering.
pub type Mapping = BTreeMap<String, Value>;

/// Error returned when a document cannot be brought into the value model.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// Input was not well-formed JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// A number lexeme could not be classified as integer or float.
    #[error("invalid number literal: {0}")]
    InvalidNumber(String),
}

/// A notebook document value.
///
/// Integers and floats are kept apart because the signing convention renders
/// `5` and `5.0` differently, and that distinction is gone once a number has
/// been squeezed through an `f64`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// JSON `true` / `false`.
    Bool(bool),
    /// Arbitrary-precision integer.
    Integer(Integer),
    /// IEEE-754 double.
    Float(f64),
    /// Unicode text.
    String(String),
    /// Ordered list.
    Sequence(Vec<Value>),
    /// String-keyed mapping.
    Mapping(Mapping),
    /// A slot that exists but carries no value. Skipped entirely by the
    /// serializer, unlike [`Value::Null`].
    Absent,
}

impl Value {
    /// Parses JSON text, keeping the integer/float distinction of every
    /// number lexeme.
    pub fn from_json_str(input: &str) -> Result<Self, CanonicalizationError> {
        let raw: serde_json::Value = serde_json::from_str(input)?;
        Self::try_from(raw)
    }

    /// Parses JSON bytes.
    pub fn from_json_slice(input: &[u8]) -> Result<Self, CanonicalizationError> {
        let raw: serde_json::Value = serde_json::from_slice(input)?;
        Self::try_from(raw)
    }

    /// Looks up a key when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns the mapping when this value is one.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the mapping mutably when this value is one.
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = CanonicalizationError;

    fn try_from(raw: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match raw {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => number_from_lexeme(&n.to_string())?,
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Value::try_from(v)?)))
                    .collect::<Result<_, CanonicalizationError>>()?,
            ),
        })
    }
}

/// Classifies a JSON number lexeme. Anything with a fraction or exponent is a
/// float, everything else an integer of unbounded size.
fn number_from_lexeme(lexeme: &str) -> Result<Value, CanonicalizationError> {
    if lexeme.contains(|c| matches!(c, '.' | 'e' | 'E')) {
        lexeme
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| CanonicalizationError::InvalidNumber(lexeme.to_string()))
    } else {
        Integer::parse(lexeme)
            .map(Value::Integer)
            .map_err(|_| CanonicalizationError::InvalidNumber(lexeme.to_string()))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(Integer::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Value::Integer(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Sequence(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::Mapping(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Arbitrary-precision integer in minimal base-10 form.
///
/// Stored as text: the signing convention only ever needs the decimal digits,
/// so there is no arithmetic to support.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Integer(String);

impl Integer {
    /// Parses a decimal integer. Leading zeros are rejected; `-0` is accepted
    /// and normalized to `0`.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let value = value.into();
        let re = PATTERN.get_or_init(|| Regex::new(r"^-?(0|[1-9][0-9]*)$").expect("invalid regex"));
        if !re.is_match(&value) {
            return Err(ValidationError::MalformedInteger(value));
        }
        if value == "-0" {
            return Ok(Self("0".to_string()));
        }
        Ok(Self(value))
    }

    /// Whether the integer is below zero.
    pub fn is_negative(&self) -> bool {
        self.0.starts_with('-')
    }

    /// Converts to `i64` when the value fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Decimal digits, with a leading `-` for negative values.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Integer {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
