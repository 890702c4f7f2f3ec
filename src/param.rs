//! Parameter value storage types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single concrete value of one search-space dimension.
///
/// `Float` belongs to continuous dimensions, `Int` to discrete ones and
/// `Categorical` carries the chosen label of a categorical dimension.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParamValue {
    /// A real-valued parameter.
    Float(f64),
    /// An integer parameter.
    Int(i64),
    /// A categorical parameter, stored as its label.
    Categorical(String),
}

impl ParamValue {
    /// Returns the contained float, if this is a `Float`.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the contained integer, if this is an `Int`.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the contained label, if this is a `Categorical`.
    #[must_use]
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Self::Categorical(v) => Some(v),
            _ => None,
        }
    }
}

impl core::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Categorical(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Categorical(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Categorical(v)
    }
}
