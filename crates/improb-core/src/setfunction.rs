//! Set functions on the power set of a possibility space.
//!
//! A [`SetFunction`] stores only non-zero values, so unlisted events read as
//! zero through [`SetFunction::get_value`]. It also remembers which events
//! were explicitly assigned: the Möbius transform and the Choquet integral
//! refuse to treat an unassigned event as zero and fail with
//! [`Error::UndefinedSetFunctionValue`] instead.

use improb_common::{Error, Event, Gamble, Number, NumberKind, PossibilitySpace, Result};
use improb_config::EngineConfig;
use improb_math::{subsets, BigRational, Field, HRep};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Sparse real-valued function on events.
#[derive(Debug, Clone, PartialEq)]
pub struct SetFunction {
    space: Arc<PossibilitySpace>,
    kind: NumberKind,
    tolerance: f64,
    values: BTreeMap<u64, Number>,
    assigned: BTreeSet<u64>,
}

impl SetFunction {
    pub fn new(space: &Arc<PossibilitySpace>, kind: NumberKind) -> Self {
        SetFunction {
            space: Arc::clone(space),
            kind,
            tolerance: EngineConfig::with_kind(kind).tolerance(),
            values: BTreeMap::new(),
            assigned: BTreeSet::new(),
        }
    }

    /// Build from `(event, value)` pairs; every listed event counts as assigned.
    pub fn from_values<I>(space: &Arc<PossibilitySpace>, kind: NumberKind, data: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Event, Number)>,
    {
        let mut function = SetFunction::new(space, kind);
        for (event, value) in data {
            function.set_value(&event, value)?;
        }
        Ok(function)
    }

    /// Absolute tolerance used by the sign checks of the monotonicity tests.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn space(&self) -> &Arc<PossibilitySpace> {
        &self.space
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    /// Number of explicitly assigned events.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Assigned events with their values, in mask order.
    pub fn iter(&self) -> impl Iterator<Item = (Event, Number)> + '_ {
        self.assigned.iter().filter_map(move |&mask| {
            let event = self.space.event_from_mask(mask).ok()?;
            Some((event, self.value_at(mask)))
        })
    }

    fn value_at(&self, mask: u64) -> Number {
        self.values
            .get(&mask)
            .cloned()
            .unwrap_or_else(|| Number::zero(self.kind))
    }

    fn check_kind(&self, kind: NumberKind) -> Result<()> {
        if kind != self.kind {
            return Err(Error::NumberKindMismatch {
                expected: self.kind,
                actual: kind,
            });
        }
        Ok(())
    }

    fn undefined(&self, mask: u64) -> Error {
        let event = match self.space.event_from_mask(mask) {
            Ok(event) => event.to_string(),
            Err(_) => format!("{:#x}", mask),
        };
        Error::UndefinedSetFunctionValue { event }
    }

    /// Stored value, or zero when the event was never given a non-zero value.
    pub fn get_value(&self, event: &Event) -> Result<Number> {
        event.check_space(&self.space)?;
        Ok(self.value_at(event.mask()))
    }

    pub fn is_defined(&self, event: &Event) -> bool {
        self.assigned.contains(&event.mask())
    }

    /// Value of an explicitly assigned event.
    pub fn get_defined(&self, event: &Event) -> Result<Number> {
        event.check_space(&self.space)?;
        self.defined_at(event.mask())
    }

    fn defined_at(&self, mask: u64) -> Result<Number> {
        if self.assigned.contains(&mask) {
            Ok(self.value_at(mask))
        } else {
            Err(self.undefined(mask))
        }
    }

    /// Assign a value; exact zeros are not stored.
    pub fn set_value(&mut self, event: &Event, value: Number) -> Result<()> {
        event.check_space(&self.space)?;
        self.check_kind(value.kind())?;
        let mask = event.mask();
        self.assigned.insert(mask);
        if value.is_exact_zero() {
            self.values.remove(&mask);
        } else {
            self.values.insert(mask, value);
        }
        Ok(())
    }

    /// Möbius value `Σ_{B⊆A} (-1)^{|A∖B|} f(B)`; every subset must be assigned.
    pub fn get_mobius(&self, event: &Event) -> Result<Number> {
        event.check_space(&self.space)?;
        self.mobius_at(event.mask())
    }

    fn mobius_at(&self, mask: u64) -> Result<Number> {
        let mut total = Number::zero(self.kind);
        for sub in subsets::submasks(mask) {
            let value = self.defined_at(sub)?;
            if subsets::popcount(mask & !sub) % 2 == 0 {
                total = total.try_add(&value)?;
            } else {
                total = total.try_sub(&value)?;
            }
        }
        Ok(total)
    }

    /// Möbius transform of every event, as a fully assigned set function.
    pub fn mobius_transform(&self) -> Result<SetFunction> {
        let mut mobius = SetFunction::new(&self.space, self.kind).with_tolerance(self.tolerance);
        for mask in subsets::masks_by_size(self.space.len()) {
            let value = self.mobius_at(mask)?;
            mobius.assigned.insert(mask);
            if !value.is_exact_zero() {
                mobius.values.insert(mask, value);
            }
        }
        Ok(mobius)
    }

    /// Zeta value `Σ_{B⊆A} m(B)`, reading unlisted events as zero.
    pub fn get_zeta(&self, event: &Event) -> Result<Number> {
        event.check_space(&self.space)?;
        self.zeta_at(event.mask())
    }

    fn zeta_at(&self, mask: u64) -> Result<Number> {
        let mut total = Number::zero(self.kind);
        for (&sub, value) in &self.values {
            if sub & !mask == 0 {
                total = total.try_add(value)?;
            }
        }
        Ok(total)
    }

    /// Zeta transform of every event: the inverse of [`Self::mobius_transform`].
    pub fn get_mobius_inverse(&self) -> Result<SetFunction> {
        let mut zeta = SetFunction::new(&self.space, self.kind).with_tolerance(self.tolerance);
        for mask in subsets::masks_by_size(self.space.len()) {
            let value = self.zeta_at(mask)?;
            zeta.assigned.insert(mask);
            if !value.is_exact_zero() {
                zeta.values.insert(mask, value);
            }
        }
        Ok(zeta)
    }

    /// Choquet integral `v_0 f(Ω) + Σ_i (v_i − v_{i−1}) f({g ≥ v_i})`.
    ///
    /// Every super-level set of the gamble must be assigned.
    pub fn get_choquet(&self, gamble: &Gamble) -> Result<Number> {
        gamble.check_space(&self.space)?;
        self.check_kind(gamble.kind())?;
        let values = gamble.values();
        let mut levels: Vec<&Number> = values.iter().collect();
        levels.sort_by(|a, b| a.compare(b, 0.0).unwrap_or(Ordering::Equal));
        levels.dedup_by(|a, b| a == b);

        let mut total = Number::zero(self.kind);
        let mut previous: Option<&Number> = None;
        for level in levels {
            let mut mask = 0u64;
            for (i, v) in values.iter().enumerate() {
                if v.compare(level, 0.0)? != Ordering::Less {
                    mask |= 1u64 << i;
                }
            }
            let step = match previous {
                None => level.clone(),
                Some(prev) => level.try_sub(prev)?,
            };
            total = total.try_add(&step.try_mul(&self.defined_at(mask)?)?)?;
            previous = Some(level);
        }
        Ok(total)
    }

    /// Choquet integral against the belief function whose masses this
    /// function holds: `Σ_{A≠∅} m(A) min_A g`.
    pub fn get_bba_choquet(&self, gamble: &Gamble) -> Result<Number> {
        gamble.check_space(&self.space)?;
        self.check_kind(gamble.kind())?;
        let mut total = Number::zero(self.kind);
        for (&mask, mass) in &self.values {
            if mask == 0 {
                continue;
            }
            let event = self.space.event_from_mask(mask)?;
            total = total.try_add(&mass.try_mul(&gamble.min_on(&event)?)?)?;
        }
        Ok(total)
    }

    /// Level-`k` constraints on a basic belief assignment: for every
    /// `C ⊆ A` with `|C| = k`, the masses of `{B : C ⊆ B ⊆ A}` sum to a
    /// non-negative number. Level 0 has no constraints.
    pub fn get_constraints_bba_n_monotone(size: usize, monotonicity: usize) -> Vec<Vec<u64>> {
        let mut constraints = Vec::new();
        if monotonicity == 0 {
            return constraints;
        }
        for event_a in subsets::masks_by_size(size) {
            if subsets::popcount(event_a) < monotonicity {
                continue;
            }
            for event_c in subsets::submasks_of_size(event_a, monotonicity) {
                let free = event_a & !event_c;
                constraints.push(subsets::subsets_of(free).into_iter().map(|b| b | event_c).collect());
            }
        }
        constraints
    }

    /// Whether these masses form a `k`-monotone basic belief assignment.
    ///
    /// Checks `m(∅) = 0`, `Σ m = 1`, and the constraints of every level up to
    /// `monotonicity`. Unlisted events count as zero mass.
    pub fn is_bba_n_monotone(&self, monotonicity: usize) -> Result<bool> {
        if self.value_at(0).signum(self.tolerance) != Ordering::Equal {
            return Ok(false);
        }
        let mut total = Number::zero(self.kind);
        for value in self.values.values() {
            total = total.try_add(value)?;
        }
        if total.compare(&Number::one(self.kind), self.tolerance)? != Ordering::Equal {
            return Ok(false);
        }
        for level in 1..=monotonicity {
            for constraint in Self::get_constraints_bba_n_monotone(self.space.len(), level) {
                let mut sum = Number::zero(self.kind);
                for mask in constraint {
                    if let Some(value) = self.values.get(&mask) {
                        sum = sum.try_add(value)?;
                    }
                }
                if sum.signum(self.tolerance) == Ordering::Less {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Extreme `k`-monotone basic belief assignments, in fraction kind.
    ///
    /// The vertices are computed on the first call to `next`.
    pub fn make_extreme_bba_n_monotone(
        space: &Arc<PossibilitySpace>,
        monotonicity: usize,
        vertex_limit: Option<usize>,
    ) -> Result<impl Iterator<Item = Result<SetFunction>>> {
        if monotonicity == 0 {
            return Err(Error::InvalidMonotonicity(monotonicity));
        }
        let events = subsets::masks_by_size(space.len());
        let position: HashMap<u64, usize> = events.iter().enumerate().map(|(i, &m)| (m, i)).collect();
        let dim = events.len();
        let unit = |mask: u64| {
            let mut row = vec![<BigRational as Field>::zero(); dim];
            row[position[&mask]] = <BigRational as Field>::one();
            row
        };

        let mut hrep = HRep::new(dim);
        hrep.add_equality(<BigRational as Field>::zero(), unit(0))?;
        hrep.add_equality(
            <BigRational as Field>::from_i64(-1),
            vec![<BigRational as Field>::one(); dim],
        )?;
        for level in 1..=monotonicity {
            for constraint in Self::get_constraints_bba_n_monotone(space.len(), level) {
                let mut row = vec![<BigRational as Field>::zero(); dim];
                for mask in constraint {
                    row[position[&mask]] = <BigRational as Field>::one();
                }
                hrep.add_inequality(<BigRational as Field>::zero(), row)?;
            }
        }
        debug!(
            size = space.len(),
            monotonicity,
            rows = hrep.rows().len(),
            "enumerating extreme belief assignments"
        );

        let space = Arc::clone(space);
        Ok(hrep.vertices().with_ray_limit(vertex_limit).map(move |vertex| -> Result<SetFunction> {
            let vertex = vertex?;
            let mut bba = SetFunction::new(&space, NumberKind::Fraction);
            for (&mask, value) in events.iter().zip(vertex) {
                bba.assigned.insert(mask);
                let value = value.into_number();
                if !value.is_exact_zero() {
                    bba.values.insert(mask, value);
                }
            }
            Ok(bba)
        }))
    }
}

impl fmt::Display for SetFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (event, value) in self.iter() {
            writeln!(f, "{}: {}", event, value)?;
        }
        Ok(())
    }
}
