//! Events: subsets of a possibility space.

use crate::error::{Error, Result};
use crate::gamble::Gamble;
use crate::space::PossibilitySpace;
use improb_math::subsets;
use improb_math::{Number, NumberKind};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Immutable subset of a [`PossibilitySpace`], stored as a bitmask.
#[derive(Clone)]
pub struct Event {
    space: Arc<PossibilitySpace>,
    mask: u64,
}

impl Event {
    pub(crate) fn from_parts(space: Arc<PossibilitySpace>, mask: u64) -> Self {
        Event { space, mask }
    }

    pub fn space(&self) -> &Arc<PossibilitySpace> {
        &self.space
    }

    pub fn mask(&self) -> u64 {
        self.mask
    }

    pub fn len(&self) -> usize {
        subsets::popcount(self.mask)
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn is_full(&self) -> bool {
        self.mask == self.space.full_mask()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index < 64 && self.mask & (1u64 << index) != 0
    }

    pub fn contains(&self, label: &str) -> bool {
        self.space
            .index_of(label)
            .map(|i| self.contains_index(i))
            .unwrap_or(false)
    }

    /// Outcome indices in space order.
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        subsets::bits(self.mask)
    }

    /// Outcome labels in space order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.indices().filter_map(move |i| self.space.label(i))
    }

    /// Fail unless both events live on the same space.
    pub fn check_space(&self, space: &PossibilitySpace) -> Result<()> {
        if std::ptr::eq(self.space.as_ref(), space) || *self.space == *space {
            Ok(())
        } else {
            Err(Error::DomainMismatch(format!(
                "event on {} used with space {}",
                self.space, space
            )))
        }
    }

    fn with_mask(&self, mask: u64) -> Event {
        Event {
            space: Arc::clone(&self.space),
            mask,
        }
    }

    pub fn union(&self, other: &Event) -> Result<Event> {
        other.check_space(&self.space)?;
        Ok(self.with_mask(self.mask | other.mask))
    }

    pub fn intersection(&self, other: &Event) -> Result<Event> {
        other.check_space(&self.space)?;
        Ok(self.with_mask(self.mask & other.mask))
    }

    pub fn difference(&self, other: &Event) -> Result<Event> {
        other.check_space(&self.space)?;
        Ok(self.with_mask(self.mask & !other.mask))
    }

    pub fn complement(&self) -> Event {
        self.with_mask(!self.mask & self.space.full_mask())
    }

    pub fn is_subset_of(&self, other: &Event) -> Result<bool> {
        other.check_space(&self.space)?;
        Ok(self.mask & !other.mask == 0)
    }

    /// All subsets of this event, ordered by size and then by mask.
    pub fn subsets(&self) -> impl Iterator<Item = Event> + '_ {
        subsets::subsets_of(self.mask)
            .into_iter()
            .map(move |mask| self.with_mask(mask))
    }

    /// Indicator gamble: 1 on the event, 0 elsewhere.
    pub fn indicator(&self, kind: NumberKind) -> Gamble {
        let values = (0..self.space.len())
            .map(|i| {
                if self.contains_index(i) {
                    Number::one(kind)
                } else {
                    Number::zero(kind)
                }
            })
            .collect();
        Gamble::from_parts(Arc::clone(&self.space), kind, values)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.mask == other.mask
            && (Arc::ptr_eq(&self.space, &other.space) || *self.space == *other.space)
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mask.hash(state);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.labels().collect::<Vec<_>>().join(", "))
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({})", self)
    }
}
