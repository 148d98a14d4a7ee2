use std::fmt::{self, Display};

/// Declared semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Integer,
    Text,
}

impl FieldKind {
    pub const fn ty(self) -> &'static str {
        match self {
            FieldKind::Float => "f64",
            FieldKind::Integer => "i64",
            FieldKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValueError {
    NotAFloat(String),
    NotAnInteger(String),
}

impl Display for FieldValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValueError::NotAFloat(raw) => write!(f, "{raw:?} is not a decimal number"),
            FieldValueError::NotAnInteger(raw) => write!(f, "{raw:?} is not an integer"),
        }
    }
}

impl std::error::Error for FieldValueError {}

impl FieldValue {
    /// Converts already-trimmed wire text into a value of the declared kind.
    ///
    /// Text is kept verbatim, including an empty string.
    pub fn parse(kind: FieldKind, raw: &str) -> Result<Self, FieldValueError> {
        Ok(match kind {
            FieldKind::Float => FieldValue::Float(
                raw.parse()
                    .map_err(|_| FieldValueError::NotAFloat(raw.to_owned()))?,
            ),
            FieldKind::Integer => FieldValue::Integer(
                raw.parse()
                    .map_err(|_| FieldValueError::NotAnInteger(raw.to_owned()))?,
            ),
            FieldKind::Text => FieldValue::Text(raw.to_owned()),
        })
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }

    #[inline]
    pub fn ty(&self) -> &'static str {
        self.kind().ty()
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(value) => Display::fmt(value, f),
            FieldValue::Integer(value) => Display::fmt(value, f),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}
