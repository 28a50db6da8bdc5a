//! Scalar value variants produced by the driver layer.

use chrono::{DateTime, Utc};

/// One scalar value read from a result set column.
///
/// This is the closed set of native kinds the output encoding supports.
/// Drivers decode into these variants explicitly; a native type with no
/// matching variant is rejected with an encoding error instead of being
/// routed through an opaque "any" value.
///
/// `Null` doubles as the element-level null inside array columns. Row-level
/// SQL NULL is detected separately, before any value is fetched.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// SQL NULL (also used for null array elements).
    Null,

    /// Boolean.
    Boolean(bool),

    /// Any integer width, widened to 64 bits.
    Int(i64),

    /// Any floating point width, widened to 64 bits.
    Float(f64),

    /// Character data.
    Text(String),

    /// Point-in-time value, rendered as RFC 3339 text.
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Boolean(_) => "boolean",
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Text(_) => "text",
            Scalar::Timestamp(_) => "timestamp",
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Boolean(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Scalar::Null.kind(), "null");
        assert_eq!(Scalar::Int(1).kind(), "integer");
        assert_eq!(Scalar::from("a").kind(), "text");
    }
}
