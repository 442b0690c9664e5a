//! Linear-vacuous mixtures.
//!
//! `(1 − ε) P + ε min`: a precise probability contaminated by the vacuous
//! lower prevision. Conditioning on `B` has the closed form
//!
//! ```text
//! ((1 − ε) Σ_{ω∈B} p(ω) g(ω) + ε min_B g) / ((1 − ε) P(B) + ε)
//! ```

use super::{LowPrev, Prob};
use improb_common::{Error, Event, Gamble, Number, NumberKind, PossibilitySpace, Result};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct LinVac {
    prob: Prob,
    epsilon: Number,
}

impl LinVac {
    /// Mix `prob` with weight `1 − epsilon`; `epsilon` must lie in `[0, 1]`.
    pub fn new(prob: Prob, epsilon: Number) -> Result<Self> {
        let kind = prob.kind();
        if epsilon.kind() != kind {
            return Err(Error::NumberKindMismatch {
                expected: kind,
                actual: epsilon.kind(),
            });
        }
        let tolerance = prob.tolerance();
        if epsilon.signum(tolerance) == Ordering::Less
            || epsilon.compare(&Number::one(kind), tolerance)? == Ordering::Greater
        {
            return Err(Error::InvalidAssessment(format!(
                "mixing weight {} outside [0, 1]",
                epsilon
            )));
        }
        Ok(LinVac { prob, epsilon })
    }

    pub fn from_probabilities(
        space: &Arc<PossibilitySpace>,
        kind: NumberKind,
        pmf: Vec<Number>,
        epsilon: Number,
    ) -> Result<Self> {
        LinVac::new(Prob::new(space, kind, pmf)?, epsilon)
    }

    pub fn prob(&self) -> &Prob {
        &self.prob
    }

    pub fn epsilon(&self) -> &Number {
        &self.epsilon
    }

    fn lower(&self, gamble: &Gamble, event: Option<&Event>) -> Result<Number> {
        let space = self.prob.space();
        gamble.check_domain(space, self.prob.kind())?;
        let event = match event {
            Some(event) => {
                event.check_space(space)?;
                if event.is_empty() {
                    return Err(Error::ZeroProbabilityConditioning {
                        event: event.to_string(),
                    });
                }
                event.clone()
            }
            None => space.full_event(),
        };
        let kind = self.prob.kind();
        let weight = Number::one(kind).try_sub(&self.epsilon)?;
        let expectation = gamble.mul_event(&event)?.dot(self.prob.pmf())?;
        let numerator = weight
            .try_mul(&expectation)?
            .try_add(&self.epsilon.try_mul(&gamble.min_on(&event)?)?)?;
        let denominator = weight
            .try_mul(&self.prob.probability(&event)?)?
            .try_add(&self.epsilon)?;
        if denominator.signum(self.prob.tolerance()) != Ordering::Greater {
            return Err(Error::ZeroProbabilityConditioning {
                event: event.to_string(),
            });
        }
        Ok(numerator.try_div(&denominator)?)
    }
}

impl LowPrev for LinVac {
    fn space(&self) -> &Arc<PossibilitySpace> {
        self.prob.space()
    }

    fn kind(&self) -> NumberKind {
        self.prob.kind()
    }

    fn tolerance(&self) -> f64 {
        self.prob.tolerance()
    }

    fn get_lower(&mut self, gamble: &Gamble, event: Option<&Event>) -> Result<Number> {
        self.lower(gamble, event)
    }
}

impl fmt::Display for LinVac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}epsilon : {}", self.prob, self.epsilon)
    }
}
