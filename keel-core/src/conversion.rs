//! Conversion between wire DTOs and domain types
//!
//! A conversion has three outcomes: a value, nothing to convert (the source
//! record is semantically empty and should be skipped), or an error (the
//! source record is malformed). `Conversion` makes the first two explicit so
//! callers never confuse "skip" with "all fields are zero".

use thiserror::Error;

/// Successful outcome of a conversion
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion<T> {
    /// The source converted to a value
    Value(T),
    /// The source carried no data; callers skip it
    Empty,
}

impl<T> Conversion<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Conversion::Value(value) => Some(value),
            Conversion::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Conversion::Empty)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Conversion<U> {
        match self {
            Conversion::Value(value) => Conversion::Value(f(value)),
            Conversion::Empty => Conversion::Empty,
        }
    }
}

/// A record that could not be converted
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("{record}: missing required field `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("{record}: invalid `{field}`: {reason}")]
    InvalidValue {
        record: &'static str,
        field: &'static str,
        reason: String,
    },
}

impl ConversionError {
    pub fn missing(record: &'static str, field: &'static str) -> Self {
        Self::MissingField { record, field }
    }

    pub fn invalid(record: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            record,
            field,
            reason: reason.into(),
        }
    }
}

/// Fallible, skip-aware conversion into `T`
pub trait Convert<T> {
    fn convert(&self) -> Result<Conversion<T>, ConversionError>;
}

/// Converts every item, dropping empty ones
///
/// The first genuine error aborts the whole sequence; no partial output is
/// returned in that case.
pub fn convert_all<'a, S, T, I>(items: I) -> Result<Vec<T>, ConversionError>
where
    S: Convert<T> + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let mut converted = Vec::new();
    for item in items {
        if let Conversion::Value(value) = item.convert()? {
            converted.push(value);
        }
    }
    Ok(converted)
}
