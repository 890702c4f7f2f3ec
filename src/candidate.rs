//! A concrete point in a [`SearchSpace`](crate::SearchSpace).

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::param::ParamValue;

/// One concrete assignment of a value to every dimension of a search space.
///
/// Values are positional and follow the dimension order of the space that
/// produced the candidate. Dimension names are shared with the space, so
/// the objective can look values up by name without any reflection:
///
/// ```
/// use smbo::SearchSpace;
///
/// let space = SearchSpace::builder()
///     .discrete("max_depth", 1, 5)
///     .continuous("learning_rate", 0.01, 1.0)
///     .build()
///     .unwrap();
///
/// let mut rng = fastrand::Rng::with_seed(7);
/// let candidate = space.sample_random(1, &mut rng).remove(0);
///
/// let depth = candidate.int("max_depth").unwrap();
/// assert!((1..=5).contains(&depth));
/// assert!(candidate.float("learning_rate").is_some());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "CandidateParts", into = "CandidateParts")
)]
pub struct Candidate {
    names: Arc<[String]>,
    values: Vec<ParamValue>,
}

impl Candidate {
    /// Only the search space builds candidates, so `names` and `values`
    /// always have the same length.
    pub(crate) fn from_parts(names: Arc<[String]>, values: Vec<ParamValue>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    /// Returns the values in dimension order.
    #[must_use]
    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    /// Returns the dimension names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the candidate has no dimensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value of the named dimension.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
    }

    /// Returns the named continuous value.
    ///
    /// Returns `None` if the dimension does not exist or is not continuous.
    #[must_use]
    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_float)
    }

    /// Returns the named discrete value.
    ///
    /// Returns `None` if the dimension does not exist or is not discrete.
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    /// Returns the named categorical label.
    ///
    /// Returns `None` if the dimension does not exist or is not categorical.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_category)
    }

    /// Iterates over `(name, value)` pairs in dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

/// Serialized form of a [`Candidate`]; checked on the way back in.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct CandidateParts {
    names: Vec<String>,
    values: Vec<ParamValue>,
}

impl TryFrom<CandidateParts> for Candidate {
    type Error = Error;

    fn try_from(parts: CandidateParts) -> Result<Self, Error> {
        if parts.names.len() != parts.values.len() {
            return Err(Error::DimensionMismatch {
                expected: parts.names.len(),
                got: parts.values.len(),
            });
        }
        Ok(Self {
            names: parts.names.into(),
            values: parts.values,
        })
    }
}

impl From<Candidate> for CandidateParts {
    fn from(candidate: Candidate) -> Self {
        Self {
            names: candidate.names.to_vec(),
            values: candidate.values,
        }
    }
}

impl core::fmt::Display for Candidate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}
