//! Precise probability measures.

use super::{LinVac, LowPrev};
use improb_common::{Error, Event, Gamble, Number, NumberKind, PossibilitySpace, Result};
use improb_config::EngineConfig;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A single probability mass function.
#[derive(Debug, Clone, PartialEq)]
pub struct Prob {
    space: Arc<PossibilitySpace>,
    kind: NumberKind,
    tolerance: f64,
    pmf: Vec<Number>,
}

impl Prob {
    /// Validate and wrap a mass function: one non-negative entry per
    /// outcome, summing to one within the kind's tolerance.
    pub fn new(space: &Arc<PossibilitySpace>, kind: NumberKind, pmf: Vec<Number>) -> Result<Self> {
        let tolerance = EngineConfig::with_kind(kind).tolerance();
        if pmf.len() != space.len() {
            return Err(Error::DomainMismatch(format!(
                "{} probabilities for a space of {} outcomes",
                pmf.len(),
                space.len()
            )));
        }
        let mut total = Number::zero(kind);
        for p in &pmf {
            if p.kind() != kind {
                return Err(Error::NumberKindMismatch {
                    expected: kind,
                    actual: p.kind(),
                });
            }
            if p.signum(tolerance) == Ordering::Less {
                return Err(Error::InvalidAssessment("probabilities must be non-negative".into()));
            }
            total = total.try_add(p)?;
        }
        if total.compare(&Number::one(kind), tolerance)? != Ordering::Equal {
            return Err(Error::InvalidAssessment(format!(
                "probabilities must sum to one, got {}",
                total
            )));
        }
        Ok(Prob {
            space: Arc::clone(space),
            kind,
            tolerance,
            pmf,
        })
    }

    pub fn from_i64_ratios(space: &Arc<PossibilitySpace>, kind: NumberKind, ratios: &[(i64, i64)]) -> Result<Self> {
        let pmf = ratios
            .iter()
            .map(|&(n, d)| Number::from_ratio(kind, n, d))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Prob::new(space, kind, pmf)
    }

    pub fn uniform(space: &Arc<PossibilitySpace>, kind: NumberKind) -> Result<Self> {
        let pmf = vec![Number::from_ratio(kind, 1, space.len() as i64)?; space.len()];
        Prob::new(space, kind, pmf)
    }

    pub fn pmf(&self) -> &[Number] {
        &self.pmf
    }

    pub fn probability(&self, event: &Event) -> Result<Number> {
        event.check_space(&self.space)?;
        self.sum_on(event)
    }

    fn sum_on(&self, event: &Event) -> Result<Number> {
        let mut total = Number::zero(self.kind);
        for i in event.indices() {
            total = total.try_add(&self.pmf[i])?;
        }
        Ok(total)
    }

    /// Expectation, conditional on `event` when given.
    pub fn get_prev(&self, gamble: &Gamble, event: Option<&Event>) -> Result<Number> {
        gamble.check_domain(&self.space, self.kind)?;
        match event {
            None => gamble.dot(&self.pmf),
            Some(event) if event.is_full() => gamble.dot(&self.pmf),
            Some(event) => {
                event.check_space(&self.space)?;
                let probability = self.sum_on(event)?;
                if probability.signum(self.tolerance) != Ordering::Greater {
                    return Err(Error::ZeroProbabilityConditioning {
                        event: event.to_string(),
                    });
                }
                Ok(gamble.mul_event(event)?.dot(&self.pmf)?.try_div(&probability)?)
            }
        }
    }

    /// Mixture `(1 − ε) P + ε min`.
    pub fn get_linvac(&self, epsilon: Number) -> Result<LinVac> {
        LinVac::new(self.clone(), epsilon)
    }
}

impl LowPrev for Prob {
    fn space(&self) -> &Arc<PossibilitySpace> {
        &self.space
    }

    fn kind(&self) -> NumberKind {
        self.kind
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn get_lower(&mut self, gamble: &Gamble, event: Option<&Event>) -> Result<Number> {
        self.get_prev(gamble, event)
    }
}

impl fmt::Display for Prob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, p) in self.space.outcomes().iter().zip(&self.pmf) {
            writeln!(f, "{} : {}", label, p)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: i64, d: i64) -> Number {
        Number::from_ratio(NumberKind::Fraction, n, d).unwrap()
    }

    fn five() -> Prob {
        let space = PossibilitySpace::range(5).unwrap();
        Prob::from_i64_ratios(
            &space,
            NumberKind::Fraction,
            &[(1, 10), (1, 5), (3, 10), (1, 20), (7, 20)],
        )
        .unwrap()
    }

    #[test]
    fn test_expectation() {
        let mut prob = five();
        let g = Gamble::from_i64s(prob.space(), NumberKind::Fraction, &[2, 4, 3, 8, 1]).unwrap();
        assert_eq!(prob.get_prev(&g, None).unwrap(), frac(53, 20));
        assert_eq!(prob.get_upper(&g, None).unwrap(), frac(53, 20));
    }

    #[test]
    fn test_rejects_gamble_of_other_kind() {
        let mut prob = five();
        let g = Gamble::from_f64s(prob.space(), NumberKind::Float, &[1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(
            prob.get_prev(&g, None),
            Err(Error::NumberKindMismatch {
                expected: NumberKind::Fraction,
                actual: NumberKind::Float,
            })
        );
        assert!(matches!(prob.get_lower(&g, None), Err(Error::NumberKindMismatch { .. })));
    }

    #[test]
    fn test_conditional_expectation() {
        let prob = five();
        let g = Gamble::from_i64s(prob.space(), NumberKind::Fraction, &[2, 4, 3, 8, 1]).unwrap();
        let event = prob.space().make_event(["0", "1"]).unwrap();
        assert_eq!(prob.get_prev(&g, Some(&event)).unwrap(), frac(10, 3));
    }

    #[test]
    fn test_zero_probability_event() {
        let space = PossibilitySpace::range(3).unwrap();
        let prob = Prob::from_i64_ratios(&space, NumberKind::Fraction, &[(1, 2), (1, 2), (0, 1)]).unwrap();
        let g = Gamble::from_i64s(&space, NumberKind::Fraction, &[1, 2, 3]).unwrap();
        let event = space.make_event(["2"]).unwrap();
        assert!(matches!(
            prob.get_prev(&g, Some(&event)),
            Err(Error::ZeroProbabilityConditioning { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_pmf() {
        let space = PossibilitySpace::range(2).unwrap();
        assert!(matches!(
            Prob::from_i64_ratios(&space, NumberKind::Fraction, &[(1, 2), (1, 3)]),
            Err(Error::InvalidAssessment(_))
        ));
        assert!(matches!(
            Prob::from_i64_ratios(&space, NumberKind::Fraction, &[(3, 2), (-1, 2)]),
            Err(Error::InvalidAssessment(_))
        ));
        assert!(matches!(
            Prob::from_i64_ratios(&space, NumberKind::Fraction, &[(1, 1)]),
            Err(Error::DomainMismatch(_))
        ));
    }

    #[test]
    fn test_uniform_and_display() {
        let space = PossibilitySpace::from_chars("ab").unwrap();
        let prob = Prob::uniform(&space, NumberKind::Fraction).unwrap();
        assert_eq!(prob.to_string(), "a : 1/2\nb : 1/2\n");
    }
}
