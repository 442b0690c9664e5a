//! Unconditional lower probabilities.
//!
//! A [`LowProb`] is a [`LowPoly`] restricted to lower bounds on event
//! indicators. It additionally exposes the assessed values as a
//! [`SetFunction`], their Möbius transform, the n-monotonicity checks and
//! the outer approximations by belief functions.

use super::monotone::{MonotoneCache, MonotoneConstraint};
use super::{Algorithm, Assessment, AssessmentKey, LinVac, LowPoly, LowPrev, Prob};
use crate::setfunction::SetFunction;
use improb_common::{Error, Event, Gamble, GambleSource, Number, NumberKind, PossibilitySpace, Result};
use improb_config::EngineConfig;
use improb_math::{subsets, BigRational, Field, HRep, LinearProgram, LpOutcome, Relation};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Outer approximation by a completely monotone lower probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OuterApprox {
    /// Keep the precise part and make the imprecise part vacuous.
    LinVac,
    /// Iterative rescaling of the masses below each negative Möbius value.
    Irm,
    /// Iterative rescaling that treats all negative masses of one size
    /// together and rescales only the smallest basin band.
    Imrm,
    /// Belief function with maximal total mass below the assessment, by LP.
    LpBelFunc,
}

impl OuterApprox {
    pub fn as_str(&self) -> &'static str {
        match self {
            OuterApprox::LinVac => "linvac",
            OuterApprox::Irm => "irm",
            OuterApprox::Imrm => "imrm",
            OuterApprox::LpBelFunc => "lpbelfunc",
        }
    }
}

impl fmt::Display for OuterApprox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OuterApprox {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linvac" => Ok(OuterApprox::LinVac),
            "irm" => Ok(OuterApprox::Irm),
            "imrm" => Ok(OuterApprox::Imrm),
            "lpbelfunc" => Ok(OuterApprox::LpBelFunc),
            other => Err(format!("unknown outer approximation: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LowProb {
    inner: LowPoly,
    set_function: Option<SetFunction>,
    mobius: Option<SetFunction>,
}

impl LowProb {
    pub fn new(space: &Arc<PossibilitySpace>, kind: NumberKind) -> Self {
        LowProb::with_config(space, EngineConfig::with_kind(kind))
    }

    pub fn with_config(space: &Arc<PossibilitySpace>, config: EngineConfig) -> Self {
        LowProb {
            inner: LowPoly::with_config(space, config),
            set_function: None,
            mobius: None,
        }
    }

    pub fn from_lower_probabilities<I>(space: &Arc<PossibilitySpace>, kind: NumberKind, lprob: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Event, Number)>,
    {
        let mut lpr = LowProb::new(space, kind);
        for (event, value) in lprob {
            lpr.set_lower(&event, value)?;
        }
        Ok(lpr)
    }

    /// Belief function of a basic belief assignment, assessed on every event.
    pub fn from_bba(mass: &SetFunction) -> Result<Self> {
        let space = Arc::clone(mass.space());
        let mut lpr = LowProb::new(&space, mass.kind());
        for event in space.subsets() {
            let value = mass.get_zeta(&event)?;
            lpr.set_lower(&event, value)?;
        }
        Ok(lpr)
    }

    fn from_inner(inner: LowPoly) -> Self {
        LowProb {
            inner,
            set_function: None,
            mobius: None,
        }
    }

    fn derived(&self, lprob: Vec<(Event, Number)>) -> Result<Self> {
        let mut lpr = LowProb::with_config(self.inner.space(), self.inner.config().clone());
        for (event, value) in lprob {
            lpr.set_lower(&event, value)?;
        }
        Ok(lpr)
    }

    pub fn space(&self) -> &Arc<PossibilitySpace> {
        self.inner.space()
    }

    pub fn kind(&self) -> NumberKind {
        self.inner.kind()
    }

    pub fn config(&self) -> &EngineConfig {
        self.inner.config()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The underlying assessments.
    pub fn as_lowpoly(&self) -> &LowPoly {
        &self.inner
    }

    /// Assessed events with their lower probabilities, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Event, Number)> + '_ {
        self.inner.iter().filter_map(|(key, assessment)| {
            Some((key.gamble.as_indicator()?, assessment.lower.clone()?))
        })
    }

    fn invalidate(&mut self) {
        self.set_function = None;
        self.mobius = None;
    }

    fn check_key(key: &AssessmentKey) -> Result<Event> {
        if !key.event.is_full() {
            return Err(Error::InvalidAssessment(
                "lower probabilities are unconditional".into(),
            ));
        }
        key.gamble
            .as_indicator()
            .ok_or_else(|| Error::InvalidAssessment(format!("{} is not an event indicator", key.gamble)))
    }

    /// Store an assessment; only unconditional lower bounds on indicators
    /// are accepted.
    pub fn insert(&mut self, key: AssessmentKey, assessment: Assessment) -> Result<()> {
        Self::check_key(&key)?;
        if assessment.upper.is_some() {
            return Err(Error::InvalidAssessment(
                "lower probabilities have no upper bound".into(),
            ));
        }
        self.inner.insert(key, assessment)?;
        self.invalidate();
        Ok(())
    }

    /// Raise the lower probability of an event (or indicator gamble).
    pub fn set_lower(&mut self, event: impl Into<GambleSource>, value: Number) -> Result<()> {
        let key = self.inner.make_key(event, None)?;
        Self::check_key(&key)?;
        self.inner.set_lower(&key.gamble, value, None)?;
        self.invalidate();
        Ok(())
    }

    /// Stored lower probability of an event.
    pub fn get(&self, event: &Event) -> Option<&Number> {
        let key = AssessmentKey {
            gamble: event.indicator(self.kind()),
            event: self.space().full_event(),
        };
        self.inner.get(&key)?.lower.as_ref()
    }

    pub fn remove(&mut self, event: &Event) -> Option<Number> {
        let key = AssessmentKey {
            gamble: event.indicator(self.kind()),
            event: self.space().full_event(),
        };
        let removed = self.inner.remove(&key)?;
        self.invalidate();
        removed.lower
    }

    /// The assessed lower probabilities as a set function.
    pub fn set_function(&mut self) -> Result<&SetFunction> {
        let function = match self.set_function.take() {
            Some(function) => function,
            None => SetFunction::from_values(self.space(), self.kind(), self.iter().collect::<Vec<_>>())?
                .with_tolerance(self.inner.config().tolerance()),
        };
        Ok(self.set_function.insert(function))
    }

    /// Möbius transform of the assessed lower probabilities; every event
    /// must be assessed.
    pub fn mobius(&mut self) -> Result<&SetFunction> {
        let mobius = match self.mobius.take() {
            Some(mobius) => mobius,
            None => self.set_function()?.mobius_transform()?,
        };
        Ok(self.mobius.insert(mobius))
    }

    /// Natural extension of every event, stored as its lower probability.
    pub fn extend(&mut self) -> Result<()> {
        let kind = self.kind();
        let full = self.space().full_event();
        let keys: Vec<AssessmentKey> = self
            .space()
            .subsets()
            .map(|event| AssessmentKey {
                gamble: event.indicator(kind),
                event: full.clone(),
            })
            .collect();
        self.inner.extend(keys, true, false)?;
        self.invalidate();
        Ok(())
    }

    pub fn is_avoiding_sure_loss(&mut self) -> Result<bool> {
        self.inner.is_avoiding_sure_loss()
    }

    pub fn is_coherent(&mut self) -> Result<bool> {
        self.inner.is_coherent()
    }

    pub fn get_coherent(&mut self) -> Result<LowProb> {
        Ok(LowProb::from_inner(self.inner.get_coherent()?))
    }

    /// Whether the Möbius transform is non-negative everywhere.
    pub fn is_completely_monotone(&mut self) -> Result<bool> {
        let tolerance = self.inner.config().tolerance();
        let mobius = self.mobius()?;
        Ok(mobius.iter().all(|(_, value)| value.signum(tolerance) != Ordering::Less))
    }

    /// Whether `P(∅) = 0`, `P(Ω) = 1` and every constraint of levels
    /// `1..=monotonicity` holds. Every event must be assessed.
    pub fn is_n_monotone(&mut self, monotonicity: usize) -> Result<bool> {
        let tolerance = self.inner.config().tolerance();
        let size = self.space().len();
        let kind = self.kind();
        let function = self.set_function()?;
        let empty = function.space().empty_event();
        let full = function.space().full_event();
        if function.get_defined(&empty)?.signum(tolerance) != Ordering::Equal {
            return Ok(false);
        }
        if function.get_defined(&full)?.compare(&Number::one(kind), tolerance)? != Ordering::Equal {
            return Ok(false);
        }
        for constraint in MonotoneCache::global().up_to(size, monotonicity) {
            let mut total = Number::zero(kind);
            for &(mask, coefficient) in constraint.terms() {
                let event = function.space().event_from_mask(mask)?;
                let value = function.get_defined(&event)?;
                total = total.try_add(&value.try_mul(&Number::from_i64(kind, coefficient))?)?;
            }
            if total.signum(tolerance) == Ordering::Less {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Constraints of exactly `monotonicity` on a space of `size` outcomes.
    pub fn get_constraints_n_monotone(size: usize, monotonicity: usize) -> Arc<[MonotoneConstraint]> {
        MonotoneCache::global().level(size, monotonicity)
    }

    /// Extreme points of the `k`-monotone lower probabilities, in fraction
    /// kind. The vertices are computed on the first call to `next`.
    pub fn make_extreme_n_monotone(
        space: &Arc<PossibilitySpace>,
        monotonicity: usize,
        vertex_limit: Option<usize>,
    ) -> Result<impl Iterator<Item = Result<LowProb>>> {
        if monotonicity == 0 {
            return Err(Error::InvalidMonotonicity(monotonicity));
        }
        let events = subsets::masks_by_size(space.len());
        let position: HashMap<u64, usize> = events.iter().enumerate().map(|(i, &m)| (m, i)).collect();
        let dim = events.len();
        let zero = <BigRational as Field>::zero;

        let mut empty = vec![zero(); dim];
        empty[position[&0]] = <BigRational as Field>::one();
        let mut full = vec![zero(); dim];
        full[position[&space.full_mask()]] = <BigRational as Field>::one();

        let mut hrep = HRep::new(dim);
        hrep.add_equality(zero(), empty)?;
        hrep.add_equality(<BigRational as Field>::from_i64(-1), full)?;
        for constraint in MonotoneCache::global().up_to(space.len(), monotonicity) {
            let mut row = vec![zero(); dim];
            for &(mask, coefficient) in constraint.terms() {
                row[position[&mask]] = <BigRational as Field>::from_i64(coefficient);
            }
            hrep.add_inequality(zero(), row)?;
        }
        debug!(
            size = space.len(),
            monotonicity,
            rows = hrep.rows().len(),
            "enumerating extreme lower probabilities"
        );

        let space = Arc::clone(space);
        Ok(hrep.vertices().with_ray_limit(vertex_limit).map(move |vertex| -> Result<LowProb> {
            let vertex = vertex?;
            let mut lpr = LowProb::new(&space, NumberKind::Fraction);
            for (&mask, value) in events.iter().zip(vertex) {
                lpr.set_lower(&space.event_from_mask(mask)?, value.into_number())?;
            }
            Ok(lpr)
        }))
    }

    /// Lower prevision with an explicit strategy.
    ///
    /// [`Algorithm::Choquet`] integrates against the assessed set function
    /// and needs every level set of the gamble assessed; it is unconditional
    /// only. [`Algorithm::LinVac`] evaluates the linear-vacuous outer
    /// approximation.
    pub fn get_lower_with(&mut self, gamble: &Gamble, event: Option<&Event>, algorithm: Algorithm) -> Result<Number> {
        match algorithm {
            Algorithm::NaturalExtension => self.inner.get_lower(gamble, event),
            Algorithm::Choquet => {
                if event.is_some_and(|e| !e.is_full()) {
                    return Err(Error::UnsupportedAlgorithm {
                        algorithm: algorithm.to_string(),
                        target: "conditional lower prevision".into(),
                    });
                }
                gamble.check_domain(self.space(), self.kind())?;
                self.set_function()?.get_choquet(gamble)
            }
            Algorithm::LinVac => self.get_linvac()?.get_lower(gamble, event),
        }
    }

    pub fn get_upper_with(&mut self, gamble: &Gamble, event: Option<&Event>, algorithm: Algorithm) -> Result<Number> {
        let lower = self.get_lower_with(&-gamble, event, algorithm)?;
        Ok(-lower)
    }

    /// Random coherent lower probability.
    ///
    /// Every proper non-empty event gets a random lower bound below
    /// `|A| / |Ω|`, drawn uniformly or, with `division`, on the grid
    /// `k / division` (excluding `0` unless `zero`). The first bound that
    /// incurs sure loss stops the sampling; the result is the coherent
    /// version of what was kept.
    pub fn make_random<R: Rng>(
        space: &Arc<PossibilitySpace>,
        division: Option<u64>,
        zero: bool,
        kind: NumberKind,
        rng: &mut R,
    ) -> Result<LowProb> {
        let n = space.len() as u64;
        let mut lpr = LowProb::new(space, kind);
        let events: Vec<Event> = space
            .subsets()
            .filter(|e| !e.is_empty() && !e.is_full())
            .collect();
        for event in events {
            let size = event.len() as u64;
            let value = match division {
                None => Number::from_f64(kind, rng.random::<f64>() * size as f64 / n as f64)?,
                Some(division) => {
                    let high = division * size / n;
                    let low = if zero { 0 } else { 1.min(high) };
                    let numerator = rng.random_range(low..=high);
                    Number::from_ratio(kind, numerator as i64, division as i64)?
                }
            };
            let mut candidate = lpr.clone();
            candidate.set_lower(&event, value)?;
            if !candidate.is_avoiding_sure_loss()? {
                debug!(event = %event, "random assessment incurs sure loss; stopping");
                break;
            }
            lpr = candidate;
        }
        lpr.get_coherent()
    }

    /// Additive part `P` and its weight `λ = Σ_ω P̲({ω})`.
    ///
    /// With `λ = 0` the uniform distribution is returned with weight zero.
    pub fn get_precise_part(&mut self) -> Result<(Prob, Number)> {
        let kind = self.kind();
        let space = Arc::clone(self.space());
        let mut singletons = Vec::with_capacity(space.len());
        let mut norm = Number::zero(kind);
        for omega in space.subsets_of_size(1) {
            let lower = self.inner.get_lower(&omega.indicator(kind), None)?;
            norm = norm.try_add(&lower)?;
            singletons.push(lower);
        }
        if norm.signum(self.inner.config().tolerance()) != Ordering::Greater {
            return Ok((Prob::uniform(&space, kind)?, Number::zero(kind)));
        }
        let pmf = singletons
            .iter()
            .map(|p| p.try_div(&norm))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok((Prob::new(&space, kind, pmf)?, norm))
    }

    /// Imprecise part `Q̲ = (P̲ − λ P) / (1 − λ)` on the assessed events, and
    /// its weight `1 − λ`.
    pub fn get_imprecise_part(&mut self) -> Result<(LowProb, Number)> {
        let (prob, weight) = self.get_precise_part()?;
        let kind = self.kind();
        let tolerance = self.inner.config().tolerance();
        let coweight = Number::one(kind).try_sub(&weight)?;
        if weight.is_exact_zero() {
            return Ok((self.clone(), coweight));
        }
        if coweight.signum(tolerance) != Ordering::Greater {
            return Err(Error::InvalidAssessment(
                "lower probability is precise; it has no imprecise part".into(),
            ));
        }
        let mut values = Vec::with_capacity(self.len());
        for (event, lower) in self.iter().collect::<Vec<_>>() {
            let precise = prob.probability(&event)?;
            let value = lower.try_sub(&weight.try_mul(&precise)?)?.try_div(&coweight)?;
            values.push((event, value));
        }
        Ok((self.derived(values)?, coweight))
    }

    /// Linear-vacuous mixture of the precise part.
    pub fn get_linvac(&mut self) -> Result<LinVac> {
        let (prob, weight) = self.get_precise_part()?;
        let epsilon = Number::one(self.kind()).try_sub(&weight)?;
        prob.get_linvac(epsilon)
    }

    /// Completely monotone lower probability dominated by this one.
    ///
    /// Every event must be assessed for [`OuterApprox::Irm`],
    /// [`OuterApprox::Imrm`] and [`OuterApprox::LpBelFunc`]. Neither
    /// rescaling algorithm is invariant under permutation of the outcomes.
    pub fn get_outer_approx(&mut self, algorithm: OuterApprox) -> Result<LowProb> {
        info!(algorithm = %algorithm, "computing outer approximation");
        match algorithm {
            OuterApprox::LinVac => {
                let mut linvac = self.get_linvac()?;
                let kind = self.kind();
                let mut values = Vec::new();
                for event in self.space().subsets() {
                    let lower = linvac.get_lower(&event.indicator(kind), None)?;
                    values.push((event, lower));
                }
                self.derived(values)
            }
            OuterApprox::Irm => {
                let bba = self.irm_masses()?;
                self.from_masses(&bba)
            }
            OuterApprox::Imrm => {
                let bba = self.imrm_masses()?;
                self.from_masses(&bba)
            }
            OuterApprox::LpBelFunc => {
                let bba = self.lp_belief_masses()?;
                self.from_masses(&bba)
            }
        }
    }

    fn from_masses(&self, bba: &SetFunction) -> Result<LowProb> {
        let mut values = Vec::new();
        for event in self.space().subsets() {
            let value = bba.get_zeta(&event)?;
            values.push((event, value));
        }
        self.derived(values)
    }

    /// Climb the events by size; whenever a mass turns negative, find the
    /// smallest band of sub-event sizes whose total mass compensates it and
    /// rescale that band proportionally.
    fn irm_masses(&mut self) -> Result<SetFunction> {
        let kind = self.kind();
        let tolerance = self.inner.config().tolerance();
        let lprob = self.set_function()?.clone();
        let space = Arc::clone(self.space());
        let mut bba = SetFunction::new(&space, kind);
        bba.set_value(&space.empty_event(), Number::zero(kind))?;

        for cardinality in 1..=space.len() {
            for event in space.subsets_of_size(cardinality).collect::<Vec<_>>() {
                let mass = lprob.get_defined(&event)?.try_sub(&mass_below(&space, &bba, &event)?)?;
                bba.set_value(&event, mass.clone())?;
                if mass.signum(tolerance) != Ordering::Less {
                    continue;
                }

                let (index, basin) = negative_mass_basin(&space, &bba, &event, &mass, tolerance)?;
                let scale = Number::one(kind).try_add(&mass.try_div(&basin)?)?;
                for size in index..cardinality {
                    for mask in subsets::submasks_of_size(event.mask(), size) {
                        let sub = space.event_from_mask(mask)?;
                        let scaled = bba.get_value(&sub)?.try_mul(&scale)?;
                        bba.set_value(&sub, scaled)?;
                    }
                }
                bba.set_value(&event, Number::zero(kind))?;
                debug!(event = %event, band = index, "rescaled negative mass");
            }
        }
        Ok(bba)
    }

    /// Climb the events by size. When some masses of the current size are
    /// negative, only the offenders with the smallest basin band are
    /// repaired: each proposes a rescaling of the sub-events in that band,
    /// every sub-event takes the largest proposal (at least zero), and the
    /// climb resumes just above the band.
    fn imrm_masses(&mut self) -> Result<SetFunction> {
        let kind = self.kind();
        let tolerance = self.inner.config().tolerance();
        let lprob = self.set_function()?.clone();
        let space = Arc::clone(self.space());
        let mut bba = SetFunction::new(&space, kind);
        bba.set_value(&space.empty_event(), Number::zero(kind))?;

        let mut cardinality = 1;
        while cardinality <= space.len() {
            let events: Vec<Event> = space.subsets_of_size(cardinality).collect();
            for event in &events {
                let mass = lprob.get_defined(event)?.try_sub(&mass_below(&space, &bba, event)?)?;
                bba.set_value(event, mass)?;
            }

            let mut offenders = Vec::new();
            for event in events {
                let mass = bba.get_value(&event)?;
                if mass.signum(tolerance) == Ordering::Less {
                    let (index, basin) = negative_mass_basin(&space, &bba, &event, &mass, tolerance)?;
                    offenders.push((event, mass, index, basin));
                }
            }
            let Some(min_index) = offenders.iter().map(|(_, _, index, _)| *index).min() else {
                cardinality += 1;
                continue;
            };

            let mut rescaled: HashMap<u64, Number> = HashMap::new();
            for (event, mass, _, basin) in offenders.iter().filter(|(_, _, index, _)| *index == min_index) {
                let band = band_mass(&space, &bba, event, min_index)?;
                let scale = basin.try_add(mass)?.try_div(&band)?;
                for mask in subsets::submasks_of_size(event.mask(), min_index) {
                    let proposed = bba.get_value(&space.event_from_mask(mask)?)?.try_mul(&scale)?;
                    let current = rescaled.entry(mask).or_insert_with(|| Number::zero(kind));
                    if proposed.compare(current, 0.0)? == Ordering::Greater {
                        *current = proposed;
                    }
                }
            }
            for (mask, value) in rescaled {
                bba.set_value(&space.event_from_mask(mask)?, value)?;
            }
            debug!(
                cardinality,
                band = min_index,
                offenders = offenders.len(),
                "rescaled negative masses"
            );
            cardinality = min_index + 1;
        }
        Ok(bba)
    }

    /// Maximize `Σ_B 2^{n−|B|} m(B)` subject to `m >= 0`, `Σ m = 1` and
    /// `Σ_{B⊆A} m(B) <= P̲(A)` for every event `A`.
    fn lp_belief_masses(&mut self) -> Result<SetFunction> {
        let kind = self.kind();
        let lprob = self.set_function()?.clone();
        let space = Arc::clone(self.space());
        let events = subsets::masks_by_size(space.len());
        let max_iterations = self.inner.config().lp_max_iterations;
        let masses = match kind {
            NumberKind::Fraction => lp_belief_solve::<BigRational>(&space, &lprob, &events, max_iterations)?,
            NumberKind::Float => lp_belief_solve::<f64>(&space, &lprob, &events, max_iterations)?,
        };
        let mut bba = SetFunction::new(&space, kind);
        for (&mask, value) in events.iter().zip(masses) {
            bba.set_value(&space.event_from_mask(mask)?, value)?;
        }
        Ok(bba)
    }
}

/// Total mass of the sub-events of `event` with exactly `size` outcomes.
fn band_mass(space: &Arc<PossibilitySpace>, bba: &SetFunction, event: &Event, size: usize) -> Result<Number> {
    let mut total = Number::zero(bba.kind());
    for mask in subsets::submasks_of_size(event.mask(), size) {
        total = total.try_add(&bba.get_value(&space.event_from_mask(mask)?)?)?;
    }
    Ok(total)
}

/// Total mass of the proper non-empty sub-events of `event`.
fn mass_below(space: &Arc<PossibilitySpace>, bba: &SetFunction, event: &Event) -> Result<Number> {
    let mut total = Number::zero(bba.kind());
    for size in 1..event.len() {
        total = total.try_add(&band_mass(space, bba, event, size)?)?;
    }
    Ok(total)
}

/// Smallest band index `i` such that the masses of the sub-events with
/// `i..|event|` outcomes compensate the negative `mass`, and their total.
fn negative_mass_basin(
    space: &Arc<PossibilitySpace>,
    bba: &SetFunction,
    event: &Event,
    mass: &Number,
    tolerance: f64,
) -> Result<(usize, Number)> {
    let mut index = event.len();
    let mut basin = Number::zero(bba.kind());
    while mass.try_add(&basin)?.signum(tolerance) == Ordering::Less {
        if index <= 1 {
            return Err(Error::Invariant(format!(
                "no sub-events of {} can absorb mass {}",
                event, mass
            )));
        }
        index -= 1;
        basin = basin.try_add(&band_mass(space, bba, event, index)?)?;
    }
    Ok((index, basin))
}

fn lp_belief_solve<T: Field>(
    space: &Arc<PossibilitySpace>,
    lprob: &SetFunction,
    events: &[u64],
    max_iterations: usize,
) -> Result<Vec<Number>> {
    let dim = events.len();
    let mut lp = LinearProgram::<T>::new(dim).with_max_iterations(max_iterations);
    lp.add_constraint(vec![T::one(); dim], Relation::Equal, T::one())?;
    for &event in events {
        let row: Vec<T> = events
            .iter()
            .map(|&sub| if sub & !event == 0 { -T::one() } else { T::zero() })
            .collect();
        let bound = lprob.get_defined(&space.event_from_mask(event)?)?;
        lp.add_constraint(row, Relation::GreaterEq, -T::from_number(&bound)?)?;
    }
    let n = space.len();
    let objective: Vec<T> = events
        .iter()
        .map(|&mask| T::from_i64(1i64 << (n - subsets::popcount(mask))))
        .collect();
    match lp.maximize(&objective)? {
        LpOutcome::Optimal { solution, .. } => Ok(solution.into_iter().map(Field::into_number).collect()),
        other => Err(Error::Invariant(format!(
            "belief function approximation has no optimal solution ({})",
            other.status()
        ))),
    }
}

impl LowPrev for LowProb {
    fn space(&self) -> &Arc<PossibilitySpace> {
        self.inner.space()
    }

    fn kind(&self) -> NumberKind {
        self.inner.kind()
    }

    fn tolerance(&self) -> f64 {
        self.inner.config().tolerance()
    }

    fn get_lower(&mut self, gamble: &Gamble, event: Option<&Event>) -> Result<Number> {
        self.inner.get_lower(gamble, event)
    }
}

impl fmt::Display for LowProb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (event, value) in self.iter() {
            writeln!(f, "{} : {}", event, value)?;
        }
        Ok(())
    }
}
