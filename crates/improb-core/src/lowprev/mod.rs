//! Lower previsions.
//!
//! Every model implements [`LowPrev`]: lower and upper previsions of gambles,
//! optionally conditional on an event, plus the derived dominance test used
//! by the decision rules.
//!
//! - [`LowPoly`]: finitely many interval assessments, natural extension by
//!   linear programming and bisection
//! - [`LowProb`]: unconditional lower probabilities with their set function
//!   and Möbius views
//! - [`LinVac`], [`BelFunc`], [`Prob`]: closed forms that need no LP

pub mod belfunc;
pub mod linvac;
pub mod lowpoly;
pub mod lowprob;
pub mod monotone;
pub mod prob;

pub use belfunc::BelFunc;
pub use linvac::LinVac;
pub use lowpoly::{CredalSet, LowPoly};
pub use lowprob::{LowProb, OuterApprox};
pub use monotone::{MonotoneCache, MonotoneConstraint};
pub use prob::Prob;

use improb_common::{Error, Event, Gamble, GambleSource, Number, NumberKind, PossibilitySpace, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Capability shared by every lower prevision.
///
/// Queries take `&mut self` so that models can rebuild cached state lazily.
pub trait LowPrev {
    fn space(&self) -> &Arc<PossibilitySpace>;

    fn kind(&self) -> NumberKind;

    /// Absolute tolerance for sign tests (zero for fractions).
    fn tolerance(&self) -> f64;

    /// Lower prevision of `gamble`, conditional on `event` (the whole space
    /// when `None`).
    fn get_lower(&mut self, gamble: &Gamble, event: Option<&Event>) -> Result<Number>;

    /// Upper prevision by conjugacy.
    fn get_upper(&mut self, gamble: &Gamble, event: Option<&Event>) -> Result<Number> {
        let lower = self.get_lower(&-gamble, event)?;
        Ok(-lower)
    }

    /// Whether `a − b` has strictly positive lower prevision.
    fn dominates(&mut self, a: &Gamble, b: &Gamble, event: Option<&Event>) -> Result<bool> {
        let difference = a.try_sub(b)?;
        let lower = self.get_lower(&difference, event)?;
        Ok(lower.signum(self.tolerance()) == Ordering::Greater)
    }

    /// Normalize raw input into a gamble of this model's space and kind.
    fn make_gamble(&self, source: impl Into<GambleSource>) -> Result<Gamble>
    where
        Self: Sized,
    {
        Gamble::from_source(self.space(), self.kind(), source)
    }
}

/// Strategy for [`LowProb::get_lower_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Linear programming, with bisection for conditional queries.
    #[default]
    #[serde(rename = "natural", alias = "linprog")]
    NaturalExtension,
    /// Choquet integral against the assessed lower probabilities.
    Choquet,
    /// Linear-vacuous outer approximation.
    #[serde(rename = "linvac")]
    LinVac,
}

impl Algorithm {
    pub const ALL: &'static [Algorithm] = &[Algorithm::NaturalExtension, Algorithm::Choquet, Algorithm::LinVac];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::NaturalExtension => "natural",
            Algorithm::Choquet => "choquet",
            Algorithm::LinVac => "linvac",
        }
    }

    pub fn parse(s: &str) -> Option<Algorithm> {
        match s.to_lowercase().as_str() {
            "natural" | "linprog" | "lp" => Some(Algorithm::NaturalExtension),
            "choquet" => Some(Algorithm::Choquet),
            "linvac" => Some(Algorithm::LinVac),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Algorithm::parse(s).ok_or_else(|| format!("unknown algorithm: {}", s))
    }
}

/// A gamble together with its conditioning event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssessmentKey {
    pub gamble: Gamble,
    pub event: Event,
}

impl fmt::Display for AssessmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.event.is_full() {
            write!(f, "{}", self.gamble)
        } else {
            write!(f, "{} | {}", self.gamble, self.event)
        }
    }
}

/// Interval bounds; either side may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assessment {
    pub lower: Option<Number>,
    pub upper: Option<Number>,
}

impl Assessment {
    pub fn lower(value: Number) -> Self {
        Assessment {
            lower: Some(value),
            upper: None,
        }
    }

    pub fn upper(value: Number) -> Self {
        Assessment {
            lower: None,
            upper: Some(value),
        }
    }

    pub fn precise(value: Number) -> Self {
        Assessment {
            lower: Some(value.clone()),
            upper: Some(value),
        }
    }

    /// Both bounds present and equal.
    pub fn is_precise(&self) -> bool {
        matches!((&self.lower, &self.upper), (Some(l), Some(u)) if l == u)
    }

    /// Reject empty intervals and assessments without any bound.
    pub fn validate(&self, tolerance: f64) -> Result<()> {
        match (&self.lower, &self.upper) {
            (None, None) => Err(Error::InvalidAssessment(
                "assessment needs a lower or an upper bound".into(),
            )),
            (Some(l), Some(u)) if l.compare(u, tolerance)? == Ordering::Greater => Err(
                Error::InvalidAssessment(format!("lower bound {} exceeds upper bound {}", l, u)),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |bound: &Option<Number>| bound.as_ref().map(ToString::to_string).unwrap_or_default();
        write!(f, "[{}, {}]", show(&self.lower), show(&self.upper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: i64, d: i64) -> Number {
        Number::from_ratio(NumberKind::Fraction, n, d).unwrap()
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!(Algorithm::parse("linprog"), Some(Algorithm::NaturalExtension));
        assert_eq!("CHOQUET".parse::<Algorithm>().unwrap(), Algorithm::Choquet);
        assert!("simplex".parse::<Algorithm>().is_err());
        for algorithm in Algorithm::ALL {
            assert_eq!(Algorithm::parse(algorithm.as_str()), Some(*algorithm));
        }
    }

    #[test]
    fn test_assessment_validate() {
        assert!(Assessment::default().validate(0.0).is_err());
        assert!(Assessment::precise(frac(1, 2)).is_precise());
        let bad = Assessment {
            lower: Some(frac(3, 4)),
            upper: Some(frac(1, 2)),
        };
        assert!(matches!(bad.validate(0.0), Err(Error::InvalidAssessment(_))));
        assert_eq!(Assessment::lower(frac(1, 3)).to_string(), "[1/3, ]");
    }
}
