//! Search space definition: dimensions, random sampling and numeric encoding.
//!
//! A [`SearchSpace`] is an ordered list of named [`Dimension`]s. The order
//! is significant: [`Candidate`]s store their values positionally and the
//! numeric encoding used by the surrogate concatenates one block per
//! dimension in the same order.
//!
//! # Numeric encoding
//!
//! The surrogate works on vectors of `f64`. Each dimension contributes:
//!
//! | Dimension | Width | Encoding |
//! |-----------|-------|----------|
//! | `Continuous` (uniform) | 1 | `(v - low) / (high - low)` |
//! | `Continuous` (log-uniform) | 1 | `(ln v - ln low) / (ln high - ln low)` |
//! | `Discrete` | 1 | `(v - low) / (high - low)` in integer arithmetic, decoded by rounding the offset |
//! | `Categorical` | `values.len()` | one-hot, decoded by arg-max (first wins ties) |
//!
//! A degenerate bound (`low == high`) encodes as `0.5`. Decoding clamps
//! every coordinate into `[0, 1]` first, so any finite vector of the right
//! length decodes to a valid candidate.
//!
//! # Examples
//!
//! ```
//! use smbo::{ParamValue, SearchSpace};
//!
//! let space = SearchSpace::builder()
//!     .discrete("n_estimators", 10, 500)
//!     .log_uniform("learning_rate", 1e-3, 1.0)
//!     .categorical("loss", ["log_loss", "exponential"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(space.len(), 3);
//! assert_eq!(space.n_features(), 4);
//!
//! let c = space
//!     .candidate(vec![
//!         ParamValue::Int(100),
//!         ParamValue::Float(0.1),
//!         ParamValue::from("exponential"),
//!     ])
//!     .unwrap();
//! let x = space.to_numeric(&c).unwrap();
//! assert_eq!(&x[2..], &[0.0, 1.0]);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::rng_util;

/// Sampling prior of a continuous dimension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Prior {
    /// Uniform over `[low, high]`.
    #[default]
    Uniform,
    /// Uniform over `[ln low, ln high]`; requires `low > 0`.
    LogUniform,
}

/// One searchable axis of a [`SearchSpace`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dimension {
    /// A real-valued range, both bounds inclusive.
    Continuous {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
        /// How values are drawn during random sampling.
        prior: Prior,
    },
    /// An integer range, both bounds inclusive.
    Discrete {
        /// Lower bound.
        low: i64,
        /// Upper bound.
        high: i64,
    },
    /// A finite, unordered set of labels.
    Categorical {
        /// The admissible labels.
        values: Vec<String>,
    },
}

impl Dimension {
    /// A uniform continuous range.
    #[must_use]
    pub fn continuous(low: f64, high: f64) -> Self {
        Self::Continuous {
            low,
            high,
            prior: Prior::Uniform,
        }
    }

    /// A log-uniform continuous range.
    #[must_use]
    pub fn log_uniform(low: f64, high: f64) -> Self {
        Self::Continuous {
            low,
            high,
            prior: Prior::LogUniform,
        }
    }

    /// An inclusive integer range.
    #[must_use]
    pub fn discrete(low: i64, high: i64) -> Self {
        Self::Discrete { low, high }
    }

    /// A categorical set of labels.
    #[must_use]
    pub fn categorical<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Categorical {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of coordinates this dimension occupies in the numeric encoding.
    #[must_use]
    pub fn n_features(&self) -> usize {
        match self {
            Self::Continuous { .. } | Self::Discrete { .. } => 1,
            Self::Categorical { values } => values.len(),
        }
    }

    /// Checks the dimension's own invariants.
    fn check_definition(&self) -> core::result::Result<(), String> {
        match self {
            Self::Continuous { low, high, prior } => {
                if !low.is_finite() || !high.is_finite() {
                    return Err(format!("bounds must be finite, got [{low}, {high}]"));
                }
                if low > high {
                    return Err(format!("low ({low}) must be <= high ({high})"));
                }
                if !(high - low).is_finite() {
                    return Err(format!("range [{low}, {high}] is too wide to represent"));
                }
                if *prior == Prior::LogUniform && *low <= 0.0 {
                    return Err(format!("log-uniform prior requires low > 0, got {low}"));
                }
                Ok(())
            }
            Self::Discrete { low, high } => {
                if low > high {
                    return Err(format!("low ({low}) must be <= high ({high})"));
                }
                Ok(())
            }
            Self::Categorical { values } => {
                if values.is_empty() {
                    return Err("categorical values cannot be empty".to_owned());
                }
                let mut seen = HashSet::with_capacity(values.len());
                for v in values {
                    if !seen.insert(v.as_str()) {
                        return Err(format!("duplicate categorical value '{v}'"));
                    }
                }
                Ok(())
            }
        }
    }

    /// Checks that `value` lies inside this dimension's domain.
    fn check_value(&self, value: &ParamValue) -> core::result::Result<(), String> {
        match (self, value) {
            (Self::Continuous { low, high, .. }, ParamValue::Float(v)) => {
                if v.is_finite() && *low <= *v && *v <= *high {
                    Ok(())
                } else {
                    Err(format!("{v} is outside [{low}, {high}]"))
                }
            }
            (Self::Discrete { low, high }, ParamValue::Int(v)) => {
                if (*low..=*high).contains(v) {
                    Ok(())
                } else {
                    Err(format!("{v} is outside [{low}, {high}]"))
                }
            }
            (Self::Categorical { values }, ParamValue::Categorical(v)) => {
                if values.iter().any(|c| c == v) {
                    Ok(())
                } else {
                    Err(format!("'{v}' is not one of {values:?}"))
                }
            }
            (dim, value) => Err(format!(
                "{} value {value} given for a {} dimension",
                value_kind(value),
                dim.kind()
            )),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Continuous { .. } => "continuous",
            Self::Discrete { .. } => "discrete",
            Self::Categorical { .. } => "categorical",
        }
    }

    /// Draws one value according to the dimension's prior.
    fn sample(&self, rng: &mut fastrand::Rng) -> ParamValue {
        match self {
            Self::Continuous { low, high, prior } => {
                let v = match prior {
                    Prior::Uniform => rng_util::f64_range(rng, *low, *high),
                    Prior::LogUniform => {
                        rng_util::f64_range(rng, low.ln(), high.ln()).exp()
                    }
                };
                ParamValue::Float(v.clamp(*low, *high))
            }
            Self::Discrete { low, high } => ParamValue::Int(rng.i64(*low..=*high)),
            Self::Categorical { values } => {
                ParamValue::Categorical(values[rng.usize(0..values.len())].clone())
            }
        }
    }

    /// Appends the encoding of an already validated value to `out`.
    #[allow(clippy::cast_precision_loss)]
    fn encode(&self, value: &ParamValue, out: &mut Vec<f64>) {
        match (self, value) {
            (Self::Continuous { low, high, prior }, ParamValue::Float(v)) => {
                let (lo, hi, w) = match prior {
                    Prior::Uniform => (*low, *high, *v),
                    Prior::LogUniform => (low.ln(), high.ln(), v.ln()),
                };
                out.push(to_unit(w, lo, hi));
            }
            (Self::Discrete { low, high }, ParamValue::Int(v)) => {
                let span = i128::from(*high) - i128::from(*low);
                if span == 0 {
                    out.push(0.5);
                } else {
                    let offset = i128::from(*v) - i128::from(*low);
                    out.push(offset as f64 / span as f64);
                }
            }
            (Self::Categorical { values }, ParamValue::Categorical(v)) => {
                out.extend(values.iter().map(|c| if c == v { 1.0 } else { 0.0 }));
            }
            _ => unreachable!("encode is only called on validated candidates"),
        }
    }

    /// Decodes this dimension's block of a numeric vector.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn decode(&self, block: &[f64]) -> ParamValue {
        match self {
            Self::Continuous { low, high, prior } => {
                let t = block[0].clamp(0.0, 1.0);
                let v = match prior {
                    Prior::Uniform => from_unit(t, *low, *high),
                    Prior::LogUniform => from_unit(t, low.ln(), high.ln()).exp(),
                };
                ParamValue::Float(v.clamp(*low, *high))
            }
            Self::Discrete { low, high } => {
                let t = block[0].clamp(0.0, 1.0);
                let span = i128::from(*high) - i128::from(*low);
                let offset = ((t * span as f64).round() as i128).clamp(0, span);
                ParamValue::Int((i128::from(*low) + offset) as i64)
            }
            Self::Categorical { values } => {
                let mut best = 0;
                for (i, &x) in block.iter().enumerate() {
                    if x > block[best] {
                        best = i;
                    }
                }
                ParamValue::Categorical(values[best].clone())
            }
        }
    }

    /// Number of distinct values, or `None` for continuous dimensions.
    #[allow(clippy::cast_sign_loss)]
    fn cardinality(&self) -> Option<u128> {
        match self {
            Self::Continuous { low, high, .. } => (low == high).then_some(1),
            Self::Discrete { low, high } => Some((i128::from(*high) - i128::from(*low)) as u128 + 1),
            Self::Categorical { values } => Some(values.len() as u128),
        }
    }
}

fn value_kind(value: &ParamValue) -> &'static str {
    match value {
        ParamValue::Float(_) => "float",
        ParamValue::Int(_) => "integer",
        ParamValue::Categorical(_) => "categorical",
    }
}

/// Map a value in `[lo, hi]` to `[0, 1]`.
fn to_unit(value: f64, lo: f64, hi: f64) -> f64 {
    if (hi - lo).abs() < f64::EPSILON * lo.abs().max(1.0) {
        0.5
    } else {
        (value - lo) / (hi - lo)
    }
}

/// Map a value in `[0, 1]` back to `[lo, hi]`.
fn from_unit(t: f64, lo: f64, hi: f64) -> f64 {
    lo + t * (hi - lo)
}

/// An ordered sequence of uniquely named dimensions.
///
/// Construct with [`SearchSpace::builder`] or [`SearchSpace::new`]; both
/// validate every dimension and reject duplicate names, so a
/// `SearchSpace` value is always well formed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<(String, Dimension)>", into = "Vec<(String, Dimension)>")
)]
pub struct SearchSpace {
    names: Arc<[String]>,
    dimensions: Vec<Dimension>,
}

impl SearchSpace {
    /// Creates a search space from `(name, dimension)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSearchSpace`] if the list is empty, a name is
    /// empty or repeated, or a dimension is malformed.
    pub fn new(dimensions: Vec<(String, Dimension)>) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(Error::InvalidSearchSpace(
                "search space needs at least one dimension".to_owned(),
            ));
        }

        let mut seen = HashSet::with_capacity(dimensions.len());
        for (name, dim) in &dimensions {
            if name.is_empty() {
                return Err(Error::InvalidSearchSpace(
                    "dimension names cannot be empty".to_owned(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidSearchSpace(format!(
                    "duplicate dimension name '{name}'"
                )));
            }
            dim.check_definition()
                .map_err(|reason| Error::InvalidSearchSpace(format!("dimension '{name}': {reason}")))?;
        }

        let (names, dimensions): (Vec<String>, Vec<Dimension>) = dimensions.into_iter().unzip();
        Ok(Self {
            names: names.into(),
            dimensions,
        })
    }

    /// Returns a builder for declaring dimensions one at a time.
    #[must_use]
    pub fn builder() -> SearchSpaceBuilder {
        SearchSpaceBuilder::default()
    }

    /// Number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Always `false`; a valid search space has at least one dimension.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Dimension names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Dimensions in order.
    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Looks a dimension up by name.
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.dimensions[i])
    }

    /// Iterates over `(name, dimension)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dimension)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.dimensions.iter())
    }

    /// Width of the numeric encoding.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.dimensions.iter().map(Dimension::n_features).sum()
    }

    /// Number of distinct candidates, or `None` if the space contains a
    /// non-degenerate continuous dimension. Saturates at `u128::MAX`.
    #[must_use]
    pub fn cardinality(&self) -> Option<u128> {
        self.dimensions
            .iter()
            .try_fold(1u128, |acc, d| d.cardinality().map(|c| acc.saturating_mul(c)))
    }

    /// Draws `count` independent candidates, each dimension from its prior.
    ///
    /// The sequence is fully determined by the state of `rng`.
    pub fn sample_random(&self, count: usize, rng: &mut fastrand::Rng) -> Vec<Candidate> {
        (0..count).map(|_| self.sample_one(rng)).collect()
    }

    pub(crate) fn sample_one(&self, rng: &mut fastrand::Rng) -> Candidate {
        let values = self.dimensions.iter().map(|d| d.sample(rng)).collect();
        Candidate::from_parts(Arc::clone(&self.names), values)
    }

    /// Returns `true` if every value of `candidate` satisfies its dimension.
    #[must_use]
    pub fn contains(&self, candidate: &Candidate) -> bool {
        self.validate(candidate).is_ok()
    }

    /// Checks `candidate` against the space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the candidate has the wrong
    /// number of values, or [`Error::CandidateOutOfDomain`] naming the first
    /// dimension whose value is out of bounds, of the wrong type, not in the
    /// categorical set, or whose name does not match.
    pub fn validate(&self, candidate: &Candidate) -> Result<()> {
        self.check_values(candidate.values())?;
        if candidate.names().len() != self.names.len() {
            return Err(Error::DimensionMismatch {
                expected: self.names.len(),
                got: candidate.names().len(),
            });
        }
        for (expected, got) in self.names.iter().zip(candidate.names()) {
            if expected != got {
                return Err(Error::CandidateOutOfDomain {
                    dimension: expected.clone(),
                    reason: format!("candidate names this position '{got}'"),
                });
            }
        }
        Ok(())
    }

    fn check_values(&self, values: &[ParamValue]) -> Result<()> {
        if values.len() != self.dimensions.len() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions.len(),
                got: values.len(),
            });
        }
        for ((name, dim), value) in self.iter().zip(values) {
            dim.check_value(value)
                .map_err(|reason| Error::CandidateOutOfDomain {
                    dimension: name.to_owned(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Builds a candidate of this space from positional values.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn candidate(&self, values: Vec<ParamValue>) -> Result<Candidate> {
        self.check_values(&values)?;
        Ok(Candidate::from_parts(Arc::clone(&self.names), values))
    }

    /// Encodes a candidate into the numeric representation described in the
    /// [module documentation](self).
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn to_numeric(&self, candidate: &Candidate) -> Result<Vec<f64>> {
        self.validate(candidate)?;
        Ok(self.encode(candidate))
    }

    /// Encodes a candidate already known to belong to this space.
    pub(crate) fn encode(&self, candidate: &Candidate) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n_features());
        for (dim, value) in self.dimensions.iter().zip(candidate.values()) {
            dim.encode(value, &mut out);
        }
        out
    }

    /// Decodes a numeric vector into a candidate.
    ///
    /// Coordinates are clamped into `[0, 1]`, discrete values rounded and
    /// categorical blocks resolved by arg-max, so every finite input yields
    /// a candidate that [`contains`](Self::contains) accepts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `x` does not have
    /// [`n_features`](Self::n_features) entries, or
    /// [`Error::CandidateOutOfDomain`] if a coordinate is not finite.
    pub fn from_numeric(&self, x: &[f64]) -> Result<Candidate> {
        let width = self.n_features();
        if x.len() != width {
            return Err(Error::DimensionMismatch {
                expected: width,
                got: x.len(),
            });
        }

        let mut values = Vec::with_capacity(self.dimensions.len());
        let mut offset = 0;
        for (name, dim) in self.iter() {
            let block = &x[offset..offset + dim.n_features()];
            if let Some(bad) = block.iter().find(|v| !v.is_finite()) {
                return Err(Error::CandidateOutOfDomain {
                    dimension: name.to_owned(),
                    reason: format!("non-finite encoded value {bad}"),
                });
            }
            values.push(dim.decode(block));
            offset += dim.n_features();
        }
        Ok(Candidate::from_parts(Arc::clone(&self.names), values))
    }
}

impl TryFrom<Vec<(String, Dimension)>> for SearchSpace {
    type Error = Error;

    fn try_from(dimensions: Vec<(String, Dimension)>) -> Result<Self> {
        Self::new(dimensions)
    }
}

impl From<SearchSpace> for Vec<(String, Dimension)> {
    fn from(space: SearchSpace) -> Self {
        space.names.iter().cloned().zip(space.dimensions).collect()
    }
}

/// Fluent builder for [`SearchSpace`].
///
/// Dimensions keep the order in which they are declared. Validation is
/// deferred to [`build`](Self::build).
///
/// ```
/// use smbo::SearchSpace;
///
/// let space = SearchSpace::builder()
///     .continuous("subsample", 0.5, 1.0)
///     .discrete("max_depth", 1, 8)
///     .build()
///     .unwrap();
/// assert_eq!(space.names(), ["subsample", "max_depth"]);
///
/// assert!(SearchSpace::builder().build().is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct SearchSpaceBuilder {
    dimensions: Vec<(String, Dimension)>,
}

impl SearchSpaceBuilder {
    /// Adds an arbitrary dimension.
    #[must_use]
    pub fn dimension(mut self, name: impl Into<String>, dimension: Dimension) -> Self {
        self.dimensions.push((name.into(), dimension));
        self
    }

    /// Adds a uniform continuous dimension.
    #[must_use]
    pub fn continuous(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.dimension(name, Dimension::continuous(low, high))
    }

    /// Adds a log-uniform continuous dimension.
    #[must_use]
    pub fn log_uniform(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.dimension(name, Dimension::log_uniform(low, high))
    }

    /// Adds an inclusive integer dimension.
    #[must_use]
    pub fn discrete(self, name: impl Into<String>, low: i64, high: i64) -> Self {
        self.dimension(name, Dimension::discrete(low, high))
    }

    /// Adds a categorical dimension.
    #[must_use]
    pub fn categorical<I, S>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimension(name, Dimension::categorical(values))
    }

    /// Validates and builds the space.
    ///
    /// # Errors
    ///
    /// See [`SearchSpace::new`].
    pub fn build(self) -> Result<SearchSpace> {
        SearchSpace::new(self.dimensions)
    }
}
