//! Optimality operators.

use super::filter_maximal;
use crate::lowprev::LowPrev;
use improb_common::{Error, Event, Gamble, Number, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// Selects the optimal gambles of a finite choice set.
pub trait Optimality {
    /// Maximal gambles, in input order, conditional on `event` when given.
    fn maximal(&mut self, gambles: &[Gamble], event: Option<&Event>) -> Result<Vec<Gamble>>;
}

/// Named operator, as accepted on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Pointwise,
    #[default]
    Maximality,
    Interval,
    Maximin,
    Maximax,
    Hurwicz,
}

impl Criterion {
    pub const ALL: &'static [Criterion] = &[
        Criterion::Pointwise,
        Criterion::Maximality,
        Criterion::Interval,
        Criterion::Maximin,
        Criterion::Maximax,
        Criterion::Hurwicz,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Pointwise => "pointwise",
            Criterion::Maximality => "maximality",
            Criterion::Interval => "interval",
            Criterion::Maximin => "maximin",
            Criterion::Maximax => "maximax",
            Criterion::Hurwicz => "hurwicz",
        }
    }

    pub fn parse(s: &str) -> Option<Criterion> {
        match s.to_lowercase().as_str() {
            "pointwise" | "admissible" => Some(Criterion::Pointwise),
            "maximality" | "maximal" => Some(Criterion::Maximality),
            "interval" | "interval-dominance" => Some(Criterion::Interval),
            "maximin" | "gamma-maximin" => Some(Criterion::Maximin),
            "maximax" | "gamma-maximax" => Some(Criterion::Maximax),
            "hurwicz" => Some(Criterion::Hurwicz),
            _ => None,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Criterion::parse(s).ok_or_else(|| format!("unknown criterion: {}", s))
    }
}

/// `a` dominates `b` when `a >= b` on the event and `a > b` somewhere,
/// comparing with an absolute tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointwiseDominance {
    tolerance: f64,
}

impl Default for PointwiseDominance {
    fn default() -> Self {
        PointwiseDominance { tolerance: 1e-6 }
    }
}

impl PointwiseDominance {
    pub fn new(tolerance: f64) -> Self {
        PointwiseDominance { tolerance }
    }

    pub fn dominates(&self, a: &Gamble, b: &Gamble, event: Option<&Event>) -> Result<bool> {
        b.check_space(a.space())?;
        let event = match event {
            Some(event) => {
                event.check_space(a.space())?;
                event.clone()
            }
            None => a.space().full_event(),
        };
        let mut strict = false;
        for i in event.indices() {
            match a.values()[i].compare(&b.values()[i], self.tolerance)? {
                Ordering::Less => return Ok(false),
                Ordering::Greater => strict = true,
                Ordering::Equal => {}
            }
        }
        Ok(strict)
    }
}

impl Optimality for PointwiseDominance {
    fn maximal(&mut self, gambles: &[Gamble], event: Option<&Event>) -> Result<Vec<Gamble>> {
        filter_maximal(gambles.iter().cloned(), |a, b| self.dominates(a, b, event))
    }
}

/// Maximality: `a` dominates `b` when the lower prevision of `a − b` is
/// strictly positive.
#[derive(Debug, Clone)]
pub struct LowPrevMaximality<P> {
    lowprev: P,
}

impl<P: LowPrev> LowPrevMaximality<P> {
    pub fn new(lowprev: P) -> Self {
        LowPrevMaximality { lowprev }
    }

    pub fn lowprev(&mut self) -> &mut P {
        &mut self.lowprev
    }

    pub fn into_inner(self) -> P {
        self.lowprev
    }
}

impl<P: LowPrev> Optimality for LowPrevMaximality<P> {
    fn maximal(&mut self, gambles: &[Gamble], event: Option<&Event>) -> Result<Vec<Gamble>> {
        let lowprev = &mut self.lowprev;
        filter_maximal(gambles.iter().cloned(), |a, b| lowprev.dominates(a, b, event))
    }
}

/// Interval dominance: `a` dominates `b` when the lower prevision of `a`
/// strictly exceeds the upper prevision of `b`.
#[derive(Debug, Clone)]
pub struct IntervalDominance<P> {
    lowprev: P,
}

impl<P: LowPrev> IntervalDominance<P> {
    pub fn new(lowprev: P) -> Self {
        IntervalDominance { lowprev }
    }
}

impl<P: LowPrev> Optimality for IntervalDominance<P> {
    fn maximal(&mut self, gambles: &[Gamble], event: Option<&Event>) -> Result<Vec<Gamble>> {
        let tolerance = self.lowprev.tolerance();
        let mut bounds = Vec::with_capacity(gambles.len());
        for gamble in gambles {
            let lower = self.lowprev.get_lower(gamble, event)?;
            let upper = self.lowprev.get_upper(gamble, event)?;
            bounds.push((gamble.clone(), lower, upper));
        }
        let maximal = filter_maximal(bounds, |(_, lower, _), (_, _, upper)| {
            Ok::<_, Error>(lower.compare(upper, tolerance)? == Ordering::Greater)
        })?;
        Ok(maximal.into_iter().map(|(gamble, _, _)| gamble).collect())
    }
}

/// Keep every gamble whose score ties with the best score.
fn keep_best(scored: Vec<(Gamble, Number)>, tolerance: f64) -> Result<Vec<Gamble>> {
    let mut best: Option<Number> = None;
    for (_, score) in &scored {
        best = Some(match best {
            Some(current) if current.compare(score, tolerance)? != Ordering::Less => current,
            _ => score.clone(),
        });
    }
    let Some(best) = best else {
        return Ok(Vec::new());
    };
    let mut maximal = Vec::new();
    for (gamble, score) in scored {
        if score.compare(&best, tolerance)? == Ordering::Equal {
            maximal.push(gamble);
        }
    }
    debug!(best = %best, kept = maximal.len(), "total preorder filter");
    Ok(maximal)
}

/// Γ-maximin: rank by lower prevision.
#[derive(Debug, Clone)]
pub struct GammaMaximin<P> {
    lowprev: P,
}

impl<P: LowPrev> GammaMaximin<P> {
    pub fn new(lowprev: P) -> Self {
        GammaMaximin { lowprev }
    }
}

impl<P: LowPrev> Optimality for GammaMaximin<P> {
    fn maximal(&mut self, gambles: &[Gamble], event: Option<&Event>) -> Result<Vec<Gamble>> {
        let mut scored = Vec::with_capacity(gambles.len());
        for gamble in gambles {
            scored.push((gamble.clone(), self.lowprev.get_lower(gamble, event)?));
        }
        keep_best(scored, self.lowprev.tolerance())
    }
}

/// Γ-maximax: rank by upper prevision.
#[derive(Debug, Clone)]
pub struct GammaMaximax<P> {
    lowprev: P,
}

impl<P: LowPrev> GammaMaximax<P> {
    pub fn new(lowprev: P) -> Self {
        GammaMaximax { lowprev }
    }
}

impl<P: LowPrev> Optimality for GammaMaximax<P> {
    fn maximal(&mut self, gambles: &[Gamble], event: Option<&Event>) -> Result<Vec<Gamble>> {
        let mut scored = Vec::with_capacity(gambles.len());
        for gamble in gambles {
            scored.push((gamble.clone(), self.lowprev.get_upper(gamble, event)?));
        }
        keep_best(scored, self.lowprev.tolerance())
    }
}

/// Hurwicz: rank by `α · upper + (1 − α) · lower`.
#[derive(Debug, Clone)]
pub struct Hurwicz<P> {
    lowprev: P,
    alpha: Number,
}

impl<P: LowPrev> Hurwicz<P> {
    /// `alpha` must lie in `[0, 1]` and share the model's number kind.
    pub fn new(lowprev: P, alpha: Number) -> Result<Self> {
        let kind = lowprev.kind();
        if alpha.kind() != kind {
            return Err(Error::NumberKindMismatch {
                expected: kind,
                actual: alpha.kind(),
            });
        }
        let tolerance = lowprev.tolerance();
        if alpha.signum(tolerance) == Ordering::Less
            || alpha.compare(&Number::one(kind), tolerance)? == Ordering::Greater
        {
            return Err(Error::InvalidAssessment(format!(
                "optimism index {} outside [0, 1]",
                alpha
            )));
        }
        Ok(Hurwicz { lowprev, alpha })
    }

    pub fn alpha(&self) -> &Number {
        &self.alpha
    }
}

impl<P: LowPrev> Optimality for Hurwicz<P> {
    fn maximal(&mut self, gambles: &[Gamble], event: Option<&Event>) -> Result<Vec<Gamble>> {
        let pessimism = Number::one(self.alpha.kind()).try_sub(&self.alpha)?;
        let mut scored = Vec::with_capacity(gambles.len());
        for gamble in gambles {
            let lower = self.lowprev.get_lower(gamble, event)?;
            let upper = self.lowprev.get_upper(gamble, event)?;
            let score = self.alpha.try_mul(&upper)?.try_add(&pessimism.try_mul(&lower)?)?;
            scored.push((gamble.clone(), score));
        }
        keep_best(scored, self.lowprev.tolerance())
    }
}
