//! Lower previsions defined by finitely many interval assessments.
//!
//! Each assessment bounds the conditional prevision of a gamble `g` given a
//! non-empty event `B`. The credal set is the polytope of mass functions `p`
//! with
//!
//! ```text
//! Σ_ω p(ω) = 1,   p(ω) >= 0,
//! Σ_{ω∈B} (g(ω) − l) p(ω) >= 0   for a lower bound l,
//! Σ_{ω∈B} (u − g(ω)) p(ω) >= 0   for an upper bound u,
//! ```
//!
//! with a single equality row when both bounds coincide. The rows are cached
//! and rebuilt on the first read after any mutation.

use super::{Algorithm, Assessment, AssessmentKey, LowPrev};
use improb_common::{Error, Event, Gamble, GambleSource, Number, NumberKind, PossibilitySpace, Result};
use improb_config::EngineConfig;
use improb_math::{
    bisect_decreasing, snap_rational, BigRational, Field, HRep, LinearProgram, LpOutcome, Relation, Vertices,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct ConstraintRow {
    coefficients: Vec<Number>,
    relation: Relation,
    rhs: Number,
}

/// Rows beyond the implicit `p >= 0`.
#[derive(Debug, Clone, Default)]
struct ConstraintMatrix {
    rows: Vec<ConstraintRow>,
}

impl ConstraintMatrix {
    fn program<T: Field>(&self, num_vars: usize, max_iterations: usize) -> Result<LinearProgram<T>> {
        let mut lp = LinearProgram::new(num_vars).with_max_iterations(max_iterations);
        for row in &self.rows {
            let coefficients = row
                .coefficients
                .iter()
                .map(T::from_number)
                .collect::<std::result::Result<Vec<T>, _>>()?;
            lp.add_constraint(coefficients, row.relation, T::from_number(&row.rhs)?)?;
        }
        Ok(lp)
    }

    fn polytope<T: Field>(&self, num_vars: usize) -> Result<HRep<T>> {
        let mut hrep = HRep::new(num_vars);
        for i in 0..num_vars {
            let mut unit = vec![T::zero(); num_vars];
            unit[i] = T::one();
            hrep.add_inequality(T::zero(), unit)?;
        }
        for row in &self.rows {
            let coefficients = row
                .coefficients
                .iter()
                .map(T::from_number)
                .collect::<std::result::Result<Vec<T>, _>>()?;
            let constant = -T::from_number(&row.rhs)?;
            match row.relation {
                Relation::Equal => hrep.add_equality(constant, coefficients)?,
                Relation::GreaterEq => hrep.add_inequality(constant, coefficients)?,
            }
        }
        Ok(hrep)
    }
}

/// Extreme points of a credal set, one mass function per item.
#[derive(Debug)]
pub enum CredalSet {
    Exact(Vertices<BigRational>),
    Float(Vertices<f64>),
}

impl Iterator for CredalSet {
    type Item = Result<Vec<Number>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            CredalSet::Exact(vertices) => vertices
                .next()
                .map(|v| -> Result<Vec<Number>> { Ok(v?.into_iter().map(Field::into_number).collect()) }),
            CredalSet::Float(vertices) => vertices
                .next()
                .map(|v| -> Result<Vec<Number>> { Ok(v?.into_iter().map(Field::into_number).collect()) }),
        }
    }
}

/// Polyhedral lower prevision.
#[derive(Debug, Clone)]
pub struct LowPoly {
    space: Arc<PossibilitySpace>,
    config: EngineConfig,
    entries: Vec<(AssessmentKey, Assessment)>,
    index: HashMap<AssessmentKey, usize>,
    matrix: Option<ConstraintMatrix>,
}

impl LowPoly {
    /// Empty model (the vacuous lower prevision).
    pub fn new(space: &Arc<PossibilitySpace>, kind: NumberKind) -> Self {
        LowPoly::with_config(space, EngineConfig::with_kind(kind))
    }

    /// Empty model with explicit tolerances and solver limits.
    pub fn with_config(space: &Arc<PossibilitySpace>, config: EngineConfig) -> Self {
        LowPoly {
            space: Arc::clone(space),
            config,
            entries: Vec::new(),
            index: HashMap::new(),
            matrix: None,
        }
    }

    /// Unconditional lower probabilities of events.
    pub fn from_lower_probabilities<I>(space: &Arc<PossibilitySpace>, kind: NumberKind, lprob: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Event, Number)>,
    {
        let mut lpr = LowPoly::new(space, kind);
        for (event, value) in lprob {
            lpr.set_lower(&event, value, None)?;
        }
        Ok(lpr)
    }

    /// Precise probability mass function, one precise assessment per outcome.
    pub fn from_probabilities(space: &Arc<PossibilitySpace>, kind: NumberKind, pmf: &[Number]) -> Result<Self> {
        if pmf.len() != space.len() {
            return Err(Error::DomainMismatch(format!(
                "{} probabilities for a space of {} outcomes",
                pmf.len(),
                space.len()
            )));
        }
        let mut lpr = LowPoly::new(space, kind);
        for (i, value) in pmf.iter().enumerate() {
            let singleton = space.event_from_mask(1u64 << i)?;
            lpr.set_precise(&singleton, value.clone(), None)?;
        }
        Ok(lpr)
    }

    pub fn space(&self) -> &Arc<PossibilitySpace> {
        &self.space
    }

    pub fn kind(&self) -> NumberKind {
        self.config.number_kind
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assessments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&AssessmentKey, &Assessment)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Normalize a gamble and an optional conditioning event into a key.
    pub fn make_key(&self, gamble: impl Into<GambleSource>, event: Option<&Event>) -> Result<AssessmentKey> {
        let gamble = Gamble::from_source(&self.space, self.kind(), gamble)?;
        let event = self.conditioning_event(event)?;
        Ok(AssessmentKey { gamble, event })
    }

    fn conditioning_event(&self, event: Option<&Event>) -> Result<Event> {
        match event {
            None => Ok(self.space.full_event()),
            Some(event) => {
                event.check_space(&self.space)?;
                if event.is_empty() {
                    return Err(Error::InvalidAssessment(
                        "conditioning event must not be empty".into(),
                    ));
                }
                Ok(event.clone())
            }
        }
    }

    fn check_number(&self, value: &Number) -> Result<()> {
        if value.kind() != self.kind() {
            return Err(Error::NumberKindMismatch {
                expected: self.kind(),
                actual: value.kind(),
            });
        }
        Ok(())
    }

    fn check_gamble(&self, gamble: &Gamble) -> Result<()> {
        gamble.check_space(&self.space)?;
        if gamble.kind() != self.kind() {
            return Err(Error::NumberKindMismatch {
                expected: self.kind(),
                actual: gamble.kind(),
            });
        }
        Ok(())
    }

    pub fn get(&self, key: &AssessmentKey) -> Option<&Assessment> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Store an assessment, replacing any previous one for the key.
    pub fn insert(&mut self, key: AssessmentKey, assessment: Assessment) -> Result<()> {
        self.check_gamble(&key.gamble)?;
        key.event.check_space(&self.space)?;
        if key.event.is_empty() {
            return Err(Error::InvalidAssessment("conditioning event must not be empty".into()));
        }
        for bound in assessment.lower.iter().chain(assessment.upper.iter()) {
            self.check_number(bound)?;
        }
        assessment.validate(self.config.tolerance())?;
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = assessment,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, assessment));
            }
        }
        self.matrix = None;
        Ok(())
    }

    /// Remove the assessment for a key.
    pub fn remove(&mut self, key: &AssessmentKey) -> Option<Assessment> {
        let position = self.index.remove(key)?;
        let (_, assessment) = self.entries.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        self.matrix = None;
        Some(assessment)
    }

    /// Intersect the stored interval with `[lower, upper]`.
    fn tighten(&mut self, key: AssessmentKey, lower: Option<Number>, upper: Option<Number>) -> Result<()> {
        let mut assessment = self.get(&key).cloned().unwrap_or_default();
        if let Some(lower) = lower {
            self.check_number(&lower)?;
            assessment.lower = Some(match assessment.lower {
                Some(old) => old.try_max(&lower)?,
                None => lower,
            });
        }
        if let Some(upper) = upper {
            self.check_number(&upper)?;
            assessment.upper = Some(match assessment.upper {
                Some(old) => old.try_min(&upper)?,
                None => upper,
            });
        }
        self.insert(key, assessment)
    }

    /// Raise the lower bound; a weaker bound leaves the stored one in place.
    pub fn set_lower(&mut self, gamble: impl Into<GambleSource>, lower: Number, event: Option<&Event>) -> Result<()> {
        let key = self.make_key(gamble, event)?;
        self.tighten(key, Some(lower), None)
    }

    /// Lower the upper bound; a weaker bound leaves the stored one in place.
    pub fn set_upper(&mut self, gamble: impl Into<GambleSource>, upper: Number, event: Option<&Event>) -> Result<()> {
        let key = self.make_key(gamble, event)?;
        self.tighten(key, None, Some(upper))
    }

    /// Fix the prevision; fails when the value lies outside the stored interval.
    pub fn set_precise(&mut self, gamble: impl Into<GambleSource>, value: Number, event: Option<&Event>) -> Result<()> {
        let key = self.make_key(gamble, event)?;
        self.tighten(key, Some(value.clone()), Some(value))
    }

    fn build_matrix(&self) -> Result<ConstraintMatrix> {
        let n = self.space.len();
        let kind = self.kind();
        let zero = Number::zero(kind);
        let mut rows = vec![ConstraintRow {
            coefficients: vec![Number::one(kind); n],
            relation: Relation::Equal,
            rhs: Number::one(kind),
        }];
        let restricted = |key: &AssessmentKey, bound: &Number, negate: bool| -> Result<Vec<Number>> {
            let mut coefficients = Vec::with_capacity(n);
            for (i, value) in key.gamble.values().iter().enumerate() {
                if key.event.contains_index(i) {
                    let c = value.try_sub(bound)?;
                    coefficients.push(if negate { -c } else { c });
                } else {
                    coefficients.push(zero.clone());
                }
            }
            Ok(coefficients)
        };
        for (key, assessment) in &self.entries {
            match (&assessment.lower, &assessment.upper) {
                (Some(l), Some(u)) if l.compare(u, self.config.tolerance())? == Ordering::Equal => {
                    rows.push(ConstraintRow {
                        coefficients: restricted(key, l, false)?,
                        relation: Relation::Equal,
                        rhs: zero.clone(),
                    });
                }
                (lower, upper) => {
                    if let Some(l) = lower {
                        rows.push(ConstraintRow {
                            coefficients: restricted(key, l, false)?,
                            relation: Relation::GreaterEq,
                            rhs: zero.clone(),
                        });
                    }
                    if let Some(u) = upper {
                        rows.push(ConstraintRow {
                            coefficients: restricted(key, u, true)?,
                            relation: Relation::GreaterEq,
                            rhs: zero.clone(),
                        });
                    }
                }
            }
        }
        debug!(
            outcomes = n,
            assessments = self.entries.len(),
            rows = rows.len(),
            "constraint matrix rebuilt"
        );
        Ok(ConstraintMatrix { rows })
    }

    fn matrix(&mut self) -> Result<&ConstraintMatrix> {
        let matrix = match self.matrix.take() {
            Some(matrix) => matrix,
            None => self.build_matrix()?,
        };
        Ok(self.matrix.insert(matrix))
    }

    /// `min Σ g p` over the credal set, solved in field `T`.
    fn minimize_in<T: Field>(&mut self, objective: &[T]) -> Result<T> {
        let n = self.space.len();
        let max_iterations = self.config.lp_max_iterations;
        let lp = self.matrix()?.program::<T>(n, max_iterations)?;
        match lp.minimize(objective)? {
            LpOutcome::Optimal { value, .. } => Ok(value),
            LpOutcome::Infeasible => {
                warn!(assessments = self.entries.len(), "assessments incur sure loss");
                Err(Error::SureLoss)
            }
            LpOutcome::Unbounded => Err(Error::Invariant(
                "natural extension over the probability simplex is unbounded".into(),
            )),
        }
    }

    fn lower_unconditional(&mut self, values: &[Number]) -> Result<Number> {
        match self.kind() {
            NumberKind::Fraction => {
                let objective = values
                    .iter()
                    .map(<BigRational as Field>::from_number)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(self.minimize_in(&objective)?.into_number())
            }
            NumberKind::Float => {
                let objective: Vec<f64> = values.iter().map(Number::to_f64).collect();
                Ok(self.minimize_in(&objective)?.into_number())
            }
        }
    }

    fn lower_conditional(&mut self, gamble: &Gamble, event: &Event) -> Result<Number> {
        if !self.is_avoiding_sure_loss()? {
            return Err(Error::SureLoss);
        }
        if gamble.is_constant_on(event)? {
            return gamble.min_on(event);
        }
        let indicator = event.indicator(self.kind());
        let probability = self.lower_unconditional(indicator.values())?;
        if probability.signum(self.config.tolerance()) != Ordering::Greater {
            return Err(Error::ZeroProbabilityConditioning {
                event: event.to_string(),
            });
        }

        let lo = gamble.min_on(event)?.to_f64();
        let hi = gamble.max_on(event)?.to_f64();
        let values: Vec<f64> = gamble.values().iter().map(Number::to_f64).collect();
        let mask: Vec<bool> = (0..values.len()).map(|i| event.contains_index(i)).collect();
        let tolerance = self.config.bisection_tolerance;
        let max_iterations = self.config.bisection_max_iterations;
        let bisection = bisect_decreasing(
            |mu| {
                let shifted: Vec<f64> = values
                    .iter()
                    .zip(&mask)
                    .map(|(&v, &inside)| if inside { v - mu } else { 0.0 })
                    .collect();
                self.minimize_in::<f64>(&shifted)
            },
            lo,
            hi,
            tolerance,
            max_iterations,
        )?;
        debug!(
            root = bisection.root,
            iterations = bisection.iterations,
            converged = bisection.converged,
            "conditional lower prevision bisection"
        );

        match self.kind() {
            NumberKind::Float => Ok(Number::Float(bisection.root)),
            NumberKind::Fraction => {
                if let Some(candidate) = snap_rational(bisection.root, self.config.snap_max_denominator) {
                    let mu = Number::Fraction(candidate);
                    let shifted = gamble.sub_scalar(&mu)?.mul_event(event)?;
                    if self.lower_unconditional(shifted.values())?.is_exact_zero() {
                        return Ok(mu);
                    }
                }
                debug!(root = bisection.root, "no exact rational root found");
                Ok(Number::from_f64(NumberKind::Fraction, bisection.root)?)
            }
        }
    }

    /// Natural extension with an explicit strategy; only
    /// [`Algorithm::NaturalExtension`] applies to general assessments.
    pub fn get_lower_with(&mut self, gamble: &Gamble, event: Option<&Event>, algorithm: Algorithm) -> Result<Number> {
        match algorithm {
            Algorithm::NaturalExtension => self.get_lower(gamble, event),
            other => Err(Error::UnsupportedAlgorithm {
                algorithm: other.to_string(),
                target: "LowPoly".into(),
            }),
        }
    }

    pub fn get_upper_with(&mut self, gamble: &Gamble, event: Option<&Event>, algorithm: Algorithm) -> Result<Number> {
        let lower = self.get_lower_with(&-gamble, event, algorithm)?;
        Ok(-lower)
    }

    /// Extreme points of the credal set; computed on the first `next`.
    pub fn get_credal_set(&mut self) -> Result<CredalSet> {
        let n = self.space.len();
        let limit = self.config.vertex_enumeration_limit;
        let kind = self.kind();
        let matrix = self.matrix()?;
        Ok(match kind {
            NumberKind::Fraction => CredalSet::Exact(matrix.polytope::<BigRational>(n)?.vertices().with_ray_limit(limit)),
            NumberKind::Float => CredalSet::Float(matrix.polytope::<f64>(n)?.vertices().with_ray_limit(limit)),
        })
    }

    /// Whether the credal set is non-empty.
    pub fn is_avoiding_sure_loss(&mut self) -> Result<bool> {
        let zero = vec![Number::zero(self.kind()); self.space.len()];
        match self.lower_unconditional(&zero) {
            Ok(_) => Ok(true),
            Err(Error::SureLoss) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Whether every stored bound equals its natural extension.
    pub fn is_coherent(&mut self) -> Result<bool> {
        if !self.is_avoiding_sure_loss()? {
            return Ok(false);
        }
        let tolerance = self.config.tolerance();
        for (key, assessment) in self.entries.clone() {
            if let Some(lower) = &assessment.lower {
                let extended = self.get_lower(&key.gamble, Some(&key.event))?;
                if extended.compare(lower, tolerance)? != Ordering::Equal {
                    return Ok(false);
                }
            }
            if let Some(upper) = &assessment.upper {
                let extended = self.get_upper(&key.gamble, Some(&key.event))?;
                if extended.compare(upper, tolerance)? != Ordering::Equal {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Whether the credal set is a single mass function.
    pub fn is_linear(&mut self) -> Result<bool> {
        if !self.is_avoiding_sure_loss()? {
            return Ok(false);
        }
        let tolerance = self.config.tolerance();
        for omega in self.space.subsets_of_size(1).collect::<Vec<_>>() {
            let indicator = omega.indicator(self.kind());
            let lower = self.get_lower(&indicator, None)?;
            let upper = self.get_upper(&indicator, None)?;
            if lower.compare(&upper, tolerance)? != Ordering::Equal {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Copy with every stored bound replaced by its natural extension.
    pub fn get_coherent(&mut self) -> Result<LowPoly> {
        if !self.is_avoiding_sure_loss()? {
            return Err(Error::SureLoss);
        }
        let mut coherent = LowPoly::with_config(&self.space, self.config.clone());
        for (key, assessment) in self.entries.clone() {
            let lower = match assessment.lower {
                Some(_) => Some(self.get_lower(&key.gamble, Some(&key.event))?),
                None => None,
            };
            let upper = match assessment.upper {
                Some(_) => Some(self.get_upper(&key.gamble, Some(&key.event))?),
                None => None,
            };
            coherent.insert(key, Assessment { lower, upper })?;
        }
        Ok(coherent)
    }

    /// Store the natural extension for each key, on the requested sides.
    pub fn extend<I>(&mut self, keys: I, lower: bool, upper: bool) -> Result<()>
    where
        I: IntoIterator<Item = AssessmentKey>,
    {
        let mut extended = Vec::new();
        for key in keys {
            self.check_gamble(&key.gamble)?;
            let mut assessment = self.get(&key).cloned().unwrap_or_default();
            if lower {
                assessment.lower = Some(self.get_lower(&key.gamble, Some(&key.event))?);
            }
            if upper {
                assessment.upper = Some(self.get_upper(&key.gamble, Some(&key.event))?);
            }
            extended.push((key, assessment));
        }
        for (key, assessment) in extended {
            self.insert(key, assessment)?;
        }
        Ok(())
    }
}

impl LowPrev for LowPoly {
    fn space(&self) -> &Arc<PossibilitySpace> {
        &self.space
    }

    fn kind(&self) -> NumberKind {
        self.config.number_kind
    }

    fn tolerance(&self) -> f64 {
        self.config.tolerance()
    }

    fn get_lower(&mut self, gamble: &Gamble, event: Option<&Event>) -> Result<Number> {
        self.check_gamble(gamble)?;
        let event = self.conditioning_event(event)?;
        if event.is_full() {
            self.lower_unconditional(gamble.values())
        } else {
            self.lower_conditional(gamble, &event)
        }
    }
}

impl fmt::Display for LowPoly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, assessment) in &self.entries {
            writeln!(f, "{} : {}", key, assessment)?;
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

    fn space() -> Arc<PossibilitySpace> {
        PossibilitySpace::from_chars("abc").unwrap()
    }

    fn gamble(space: &Arc<PossibilitySpace>, values: &[i64]) -> Gamble {
        Gamble::from_i64s(space, NumberKind::Fraction, values).unwrap()
    }

    #[test]
    fn test_precise_probability_is_exact() {
        let space = PossibilitySpace::range(3).unwrap();
        let mut lpr =
            LowPoly::from_probabilities(&space, NumberKind::Fraction, &[frac(1, 10), frac(1, 5), frac(7, 10)])
                .unwrap();
        let g = gamble(&space, &[1, 0, 0]);
        assert_eq!(lpr.get_lower(&g, None).unwrap(), frac(1, 10));
        assert!(lpr.is_linear().unwrap());
    }

    #[test]
    fn test_vacuous_bounds() {
        let space = space();
        let mut lpr = LowPoly::new(&space, NumberKind::Fraction);
        let g = gamble(&space, &[4, -2, 7]);
        assert_eq!(lpr.get_lower(&g, None).unwrap(), frac(-2, 1));
        assert_eq!(lpr.get_upper(&g, None).unwrap(), frac(7, 1));
        assert!(lpr.is_coherent().unwrap());
        assert!(!lpr.is_linear().unwrap());
    }

    #[test]
    fn test_set_lower_only_tightens() {
        let space = space();
        let mut lpr = LowPoly::new(&space, NumberKind::Fraction);
        let g = gamble(&space, &[1, 2, 3]);
        lpr.set_lower(&g, frac(5, 2), None).unwrap();
        lpr.set_lower(&g, frac(3, 2), None).unwrap();
        let key = lpr.make_key(&g, None).unwrap();
        assert_eq!(lpr.get(&key).unwrap().lower, Some(frac(5, 2)));
        lpr.set_upper(&g, frac(11, 4), None).unwrap();
        lpr.set_upper(&g, frac(3, 1), None).unwrap();
        assert_eq!(lpr.get(&key).unwrap().upper, Some(frac(11, 4)));
        assert!(lpr.set_precise(&g, frac(2, 1), None).is_err());
        assert_eq!(lpr.len(), 1);
    }

    #[test]
    fn test_rejects_bad_input() {
        let space = space();
        let mut lpr = LowPoly::new(&space, NumberKind::Fraction);
        let g = gamble(&space, &[1, 0, 0]);
        let empty = space.empty_event();
        assert!(matches!(
            lpr.set_lower(&g, frac(1, 2), Some(&empty)),
            Err(Error::InvalidAssessment(_))
        ));
        assert!(matches!(
            lpr.set_lower(&g, Number::Float(0.5), None),
            Err(Error::NumberKindMismatch { .. })
        ));
        let other = PossibilitySpace::from_chars("xyz").unwrap();
        let foreign = Gamble::from_i64s(&other, NumberKind::Fraction, &[1, 0, 0]).unwrap();
        assert!(matches!(
            lpr.get_lower(&foreign, None),
            Err(Error::DomainMismatch(_))
        ));
    }

    #[test]
    fn test_sure_loss() {
        let space = space();
        let mut lpr = LowPoly::new(&space, NumberKind::Fraction);
        let a = space.make_event(["a"]).unwrap();
        let bc = space.make_event(["b", "c"]).unwrap();
        lpr.set_lower(&a, frac(3, 5), None).unwrap();
        lpr.set_lower(&bc, frac(3, 5), None).unwrap();
        assert!(!lpr.is_avoiding_sure_loss().unwrap());
        assert!(!lpr.is_coherent().unwrap());
        let g = gamble(&space, &[1, 1, 0]);
        assert_eq!(lpr.get_lower(&g, None).unwrap_err(), Error::SureLoss);
        assert_eq!(lpr.get_coherent().unwrap_err(), Error::SureLoss);
    }

    #[test]
    fn test_matrix_invalidated_on_mutation() {
        let space = space();
        let mut lpr = LowPoly::new(&space, NumberKind::Fraction);
        let a = space.make_event(["a"]).unwrap();
        let indicator = a.indicator(NumberKind::Fraction);
        assert_eq!(lpr.get_lower(&indicator, None).unwrap(), frac(0, 1));
        lpr.set_lower(&a, frac(1, 4), None).unwrap();
        assert!(lpr.matrix.is_none());
        assert_eq!(lpr.get_lower(&indicator, None).unwrap(), frac(1, 4));
        assert!(lpr.matrix.is_some());
        let key = lpr.make_key(&a, None).unwrap();
        assert_eq!(lpr.remove(&key), Some(Assessment::lower(frac(1, 4))));
        assert_eq!(lpr.get_lower(&indicator, None).unwrap(), frac(0, 1));
    }

    #[test]
    fn test_conditional_exact_root() {
        let space = space();
        let mut lpr =
            LowPoly::from_probabilities(&space, NumberKind::Fraction, &[frac(1, 10), frac(1, 5), frac(7, 10)])
                .unwrap();
        let ab = space.make_event(["a", "b"]).unwrap();
        let g = gamble(&space, &[3, 6, 100]);
        // (0.3 + 1.2) / 0.3
        assert_eq!(lpr.get_lower(&g, Some(&ab)).unwrap(), frac(5, 1));
    }

    #[test]
    fn test_conditional_constant_gamble() {
        let space = space();
        let mut lpr = LowPoly::new(&space, NumberKind::Fraction);
        let ab = space.make_event(["a", "b"]).unwrap();
        let g = gamble(&space, &[2, 2, 9]);
        assert_eq!(lpr.get_lower(&g, Some(&ab)).unwrap(), frac(2, 1));
    }

    #[test]
    fn test_zero_probability_conditioning() {
        let space = space();
        let mut lpr = LowPoly::new(&space, NumberKind::Fraction);
        let ab = space.make_event(["a", "b"]).unwrap();
        let g = gamble(&space, &[1, 0, 0]);
        assert!(matches!(
            lpr.get_lower(&g, Some(&ab)),
            Err(Error::ZeroProbabilityConditioning { .. })
        ));
    }

    #[test]
    fn test_credal_set_of_interval_model() {
        let space = PossibilitySpace::from_chars("ab").unwrap();
        let mut lpr = LowPoly::new(&space, NumberKind::Fraction);
        let a = space.make_event(["a"]).unwrap();
        lpr.set_lower(&a, frac(1, 4), None).unwrap();
        lpr.set_upper(&a, frac(1, 2), None).unwrap();
        let mut vertices: Vec<Vec<Number>> = lpr.get_credal_set().unwrap().collect::<Result<_>>().unwrap();
        vertices.sort_by(|x, y| x[0].compare(&y[0], 0.0).unwrap());
        assert_eq!(
            vertices,
            vec![vec![frac(1, 4), frac(3, 4)], vec![frac(1, 2), frac(1, 2)]]
        );
    }

    #[test]
    fn test_get_coherent_and_extend() {
        let space = space();
        let mut lpr = LowPoly::new(&space, NumberKind::Fraction);
        let a = space.make_event(["a"]).unwrap();
        let ab = space.make_event(["a", "b"]).unwrap();
        lpr.set_lower(&a, frac(1, 2), None).unwrap();
        lpr.set_lower(&ab, frac(1, 4), None).unwrap();
        assert!(!lpr.is_coherent().unwrap());
        let mut coherent = lpr.get_coherent().unwrap();
        assert!(coherent.is_coherent().unwrap());
        let key = coherent.make_key(&ab, None).unwrap();
        assert_eq!(coherent.get(&key).unwrap().lower, Some(frac(1, 2)));

        let c = lpr.make_key(&space.make_event(["c"]).unwrap(), None).unwrap();
        lpr.extend([c.clone()], false, true).unwrap();
        assert_eq!(lpr.get(&c).unwrap().upper, Some(frac(1, 2)));
    }

    #[test]
    fn test_float_kind() {
        let space = space();
        let mut lpr = LowPoly::new(&space, NumberKind::Float);
        let a = space.make_event(["a"]).unwrap();
        lpr.set_lower(&a, Number::Float(0.3), None).unwrap();
        let g = Gamble::from_f64s(&space, NumberKind::Float, &[2.0, 0.0, 1.0]).unwrap();
        let lower = lpr.get_lower(&g, None).unwrap();
        assert!((lower.to_f64() - 0.6).abs() < 1e-9);
        let conditional = lpr.get_lower(&g, Some(&space.make_event(["a", "b"]).unwrap())).unwrap();
        // worst case puts the remaining mass on b
        assert!((conditional.to_f64() - 0.6).abs() < 1e-6);
    }
}
