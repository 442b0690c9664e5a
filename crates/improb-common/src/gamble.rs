//! Gambles: real-valued functions on a possibility space.
//!
//! Values are [`Number`]s of a single [`NumberKind`]. Arithmetic between
//! gambles requires the same space and the same kind.

use crate::error::{Error, Result};
use crate::event::Event;
use crate::space::PossibilitySpace;
use improb_math::{Number, NumberKind};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Immutable function from outcomes to numbers.
#[derive(Clone)]
pub struct Gamble {
    space: Arc<PossibilitySpace>,
    kind: NumberKind,
    values: Vec<Number>,
}

/// Raw inputs accepted when building a gamble for a given space and kind.
#[derive(Debug, Clone)]
pub enum GambleSource {
    Gamble(Gamble),
    /// Indicator of the event.
    Event(Event),
    Values(Vec<Number>),
    Integers(Vec<i64>),
    /// Label to value; missing labels map to zero.
    Map(Vec<(String, Number)>),
    /// Constant gamble.
    Scalar(Number),
}

impl From<Gamble> for GambleSource {
    fn from(g: Gamble) -> Self {
        GambleSource::Gamble(g)
    }
}

impl From<&Gamble> for GambleSource {
    fn from(g: &Gamble) -> Self {
        GambleSource::Gamble(g.clone())
    }
}

impl From<Event> for GambleSource {
    fn from(e: Event) -> Self {
        GambleSource::Event(e)
    }
}

impl From<&Event> for GambleSource {
    fn from(e: &Event) -> Self {
        GambleSource::Event(e.clone())
    }
}

impl From<Vec<Number>> for GambleSource {
    fn from(v: Vec<Number>) -> Self {
        GambleSource::Values(v)
    }
}

impl From<Vec<i64>> for GambleSource {
    fn from(v: Vec<i64>) -> Self {
        GambleSource::Integers(v)
    }
}

impl<const N: usize> From<[i64; N]> for GambleSource {
    fn from(v: [i64; N]) -> Self {
        GambleSource::Integers(v.to_vec())
    }
}

impl From<Number> for GambleSource {
    fn from(n: Number) -> Self {
        GambleSource::Scalar(n)
    }
}

impl Gamble {
    pub(crate) fn from_parts(space: Arc<PossibilitySpace>, kind: NumberKind, values: Vec<Number>) -> Self {
        Gamble { space, kind, values }
    }

    /// One value per outcome, all of `kind`.
    pub fn new(space: &Arc<PossibilitySpace>, kind: NumberKind, values: Vec<Number>) -> Result<Self> {
        if values.len() != space.len() {
            return Err(Error::DomainMismatch(format!(
                "gamble has {} values for a space of {} outcomes",
                values.len(),
                space.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| v.kind() != kind) {
            return Err(Error::NumberKindMismatch {
                expected: kind,
                actual: bad.kind(),
            });
        }
        Ok(Gamble::from_parts(Arc::clone(space), kind, values))
    }

    pub fn from_i64s(space: &Arc<PossibilitySpace>, kind: NumberKind, values: &[i64]) -> Result<Self> {
        Gamble::new(
            space,
            kind,
            values.iter().map(|&v| Number::from_i64(kind, v)).collect(),
        )
    }

    pub fn from_f64s(space: &Arc<PossibilitySpace>, kind: NumberKind, values: &[f64]) -> Result<Self> {
        let values = values
            .iter()
            .map(|&v| Number::from_f64(kind, v))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Gamble::new(space, kind, values)
    }

    /// Parse values such as `"1/2"` or `"0.3"`.
    pub fn parse<S: AsRef<str>>(space: &Arc<PossibilitySpace>, kind: NumberKind, values: &[S]) -> Result<Self> {
        let values = values
            .iter()
            .map(|v| Number::parse(kind, v.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Gamble::new(space, kind, values)
    }

    pub fn constant(space: &Arc<PossibilitySpace>, value: Number) -> Self {
        let kind = value.kind();
        Gamble::from_parts(Arc::clone(space), kind, vec![value; space.len()])
    }

    pub fn zero(space: &Arc<PossibilitySpace>, kind: NumberKind) -> Self {
        Gamble::constant(space, Number::zero(kind))
    }

    /// Normalize any [`GambleSource`] to a gamble of `kind` on `space`.
    pub fn from_source(
        space: &Arc<PossibilitySpace>,
        kind: NumberKind,
        source: impl Into<GambleSource>,
    ) -> Result<Self> {
        match source.into() {
            GambleSource::Gamble(g) => {
                g.check_domain(space, kind)?;
                Ok(g)
            }
            GambleSource::Event(e) => {
                e.check_space(space)?;
                Ok(e.indicator(kind))
            }
            GambleSource::Values(values) => {
                let values = values
                    .iter()
                    .map(|v| v.convert(kind))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Gamble::new(space, kind, values)
            }
            GambleSource::Integers(values) => Gamble::from_i64s(space, kind, &values),
            GambleSource::Map(entries) => {
                let mut values = vec![Number::zero(kind); space.len()];
                for (label, value) in entries {
                    values[space.index_of(&label)?] = value.convert(kind)?;
                }
                Ok(Gamble::from_parts(Arc::clone(space), kind, values))
            }
            GambleSource::Scalar(value) => Ok(Gamble::constant(space, value.convert(kind)?)),
        }
    }

    pub fn space(&self) -> &Arc<PossibilitySpace> {
        &self.space
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    pub fn values(&self) -> &[Number] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&Number> {
        self.values.get(index)
    }

    pub fn get(&self, label: &str) -> Result<&Number> {
        let idx = self.space.index_of(label)?;
        Ok(&self.values[idx])
    }

    pub fn check_space(&self, space: &PossibilitySpace) -> Result<()> {
        if std::ptr::eq(self.space.as_ref(), space) || *self.space == *space {
            Ok(())
        } else {
            Err(Error::DomainMismatch(format!(
                "gamble on {} used with space {}",
                self.space, space
            )))
        }
    }

    /// Fails unless the gamble lives on `space` with numbers of `kind`.
    pub fn check_domain(&self, space: &PossibilitySpace, kind: NumberKind) -> Result<()> {
        self.check_space(space)?;
        if self.kind != kind {
            return Err(Error::NumberKindMismatch {
                expected: kind,
                actual: self.kind,
            });
        }
        Ok(())
    }

    fn check_compatible(&self, other: &Gamble) -> Result<()> {
        other.check_space(&self.space)?;
        if self.kind != other.kind {
            return Err(Error::NumberKindMismatch {
                expected: self.kind,
                actual: other.kind,
            });
        }
        Ok(())
    }

    fn check_kind(&self, value: &Number) -> Result<()> {
        if value.kind() != self.kind {
            return Err(Error::NumberKindMismatch {
                expected: self.kind,
                actual: value.kind(),
            });
        }
        Ok(())
    }

    fn zip_with<F>(&self, other: &Gamble, op: F) -> Result<Gamble>
    where
        F: Fn(&Number, &Number) -> std::result::Result<Number, improb_math::NumberError>,
    {
        self.check_compatible(other)?;
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| op(a, b))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Gamble::from_parts(Arc::clone(&self.space), self.kind, values))
    }

    fn map_scalar<F>(&self, value: &Number, op: F) -> Result<Gamble>
    where
        F: Fn(&Number, &Number) -> std::result::Result<Number, improb_math::NumberError>,
    {
        self.check_kind(value)?;
        let values = self
            .values
            .iter()
            .map(|a| op(a, value))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Gamble::from_parts(Arc::clone(&self.space), self.kind, values))
    }

    pub fn try_add(&self, other: &Gamble) -> Result<Gamble> {
        self.zip_with(other, Number::try_add)
    }

    pub fn try_sub(&self, other: &Gamble) -> Result<Gamble> {
        self.zip_with(other, Number::try_sub)
    }

    pub fn try_mul(&self, other: &Gamble) -> Result<Gamble> {
        self.zip_with(other, Number::try_mul)
    }

    pub fn add_scalar(&self, value: &Number) -> Result<Gamble> {
        self.map_scalar(value, Number::try_add)
    }

    pub fn sub_scalar(&self, value: &Number) -> Result<Gamble> {
        self.map_scalar(value, Number::try_sub)
    }

    pub fn scale(&self, value: &Number) -> Result<Gamble> {
        self.map_scalar(value, Number::try_mul)
    }

    /// Zero outside `event`.
    pub fn mul_event(&self, event: &Event) -> Result<Gamble> {
        event.check_space(&self.space)?;
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if event.contains_index(i) {
                    v.clone()
                } else {
                    Number::zero(self.kind)
                }
            })
            .collect();
        Ok(Gamble::from_parts(Arc::clone(&self.space), self.kind, values))
    }

    fn extreme_on(&self, event: &Event, wanted: Ordering) -> Result<Number> {
        event.check_space(&self.space)?;
        let mut best: Option<&Number> = None;
        for i in event.indices() {
            let v = &self.values[i];
            best = match best {
                Some(b) if v.compare(b, 0.0)? != wanted => Some(b),
                _ => Some(v),
            };
        }
        best.cloned()
            .ok_or_else(|| Error::InvalidAssessment("empty event has no extreme value".into()))
    }

    /// Smallest value on a non-empty event.
    pub fn min_on(&self, event: &Event) -> Result<Number> {
        self.extreme_on(event, Ordering::Less)
    }

    /// Largest value on a non-empty event.
    pub fn max_on(&self, event: &Event) -> Result<Number> {
        self.extreme_on(event, Ordering::Greater)
    }

    pub fn min(&self) -> Result<Number> {
        self.min_on(&self.space.full_event())
    }

    pub fn max(&self) -> Result<Number> {
        self.max_on(&self.space.full_event())
    }

    pub fn is_constant_on(&self, event: &Event) -> Result<bool> {
        event.check_space(&self.space)?;
        let mut indices = event.indices();
        let Some(first) = indices.next() else {
            return Ok(true);
        };
        let first = &self.values[first];
        Ok(indices.all(|i| self.values[i] == *first))
    }

    /// The event this gamble indicates, if every value is exactly 0 or 1.
    pub fn as_indicator(&self) -> Option<Event> {
        let zero = Number::zero(self.kind);
        let one = Number::one(self.kind);
        let mut mask = 0u64;
        for (i, v) in self.values.iter().enumerate() {
            if *v == one {
                mask |= 1u64 << i;
            } else if *v != zero {
                return None;
            }
        }
        self.space.event_from_mask(mask).ok()
    }

    /// `Σ_ω g(ω) p(ω)` for a mass function in the same kind.
    pub fn dot(&self, pmf: &[Number]) -> Result<Number> {
        if pmf.len() != self.values.len() {
            return Err(Error::DomainMismatch(format!(
                "mass function has {} entries for a space of {} outcomes",
                pmf.len(),
                self.values.len()
            )));
        }
        let mut total = Number::zero(self.kind);
        for (g, p) in self.values.iter().zip(pmf) {
            total = total.try_add(&g.try_mul(p)?)?;
        }
        Ok(total)
    }
}

impl std::ops::Neg for &Gamble {
    type Output = Gamble;

    fn neg(self) -> Gamble {
        Gamble::from_parts(
            Arc::clone(&self.space),
            self.kind,
            self.values.iter().map(|v| -v).collect(),
        )
    }
}

impl PartialEq for Gamble {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
            && (Arc::ptr_eq(&self.space, &other.space) || *self.space == *other.space)
    }
}

impl Eq for Gamble {}

impl Hash for Gamble {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl fmt::Display for Gamble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl fmt::Debug for Gamble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gamble({} {})", self.kind, self)
    }
}
