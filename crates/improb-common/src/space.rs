//! Possibility spaces.
//!
//! A space is an ordered list of unique outcome labels. The order fixes the
//! column layout of every constraint matrix and the bit layout of every
//! [`Event`], so spaces are shared behind an `Arc` and compared by content.

use crate::error::{Error, Result};
use crate::event::Event;
use crate::gamble::{Gamble, GambleSource};
use improb_math::subsets::{self, MAX_ELEMENTS};
use improb_math::NumberKind;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Finite, ordered, non-empty set of outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PossibilitySpace {
    outcomes: Vec<String>,
}

impl PossibilitySpace {
    /// Build a space from labels, rejecting empty and duplicate input.
    pub fn new<I, S>(labels: I) -> Result<Arc<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let outcomes: Vec<String> = labels.into_iter().map(Into::into).collect();
        if outcomes.is_empty() {
            return Err(Error::EmptySpace);
        }
        if outcomes.len() > MAX_ELEMENTS {
            return Err(Error::SpaceTooLarge {
                size: outcomes.len(),
                max: MAX_ELEMENTS,
            });
        }
        let mut seen = HashSet::with_capacity(outcomes.len());
        for label in &outcomes {
            if !seen.insert(label.as_str()) {
                return Err(Error::DuplicateOutcome(label.clone()));
            }
        }
        Ok(Arc::new(PossibilitySpace { outcomes }))
    }

    /// Space with outcomes labelled `0..n`.
    pub fn range(n: usize) -> Result<Arc<Self>> {
        Self::new((0..n).map(|i| i.to_string()))
    }

    /// Space with one outcome per character, e.g. `"abc"`.
    pub fn from_chars(labels: &str) -> Result<Arc<Self>> {
        Self::new(labels.chars().map(String::from))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Always false; spaces cannot be empty.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.outcomes.get(index).map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Result<usize> {
        self.outcomes
            .iter()
            .position(|o| o == label)
            .ok_or_else(|| Error::UnknownOutcome(label.to_string()))
    }

    /// Bitmask with every outcome set.
    pub fn full_mask(&self) -> u64 {
        subsets::full_mask(self.len())
    }

    /// Event containing the given labels.
    pub fn make_event<I, S>(self: &Arc<Self>, labels: I) -> Result<Event>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mask = 0u64;
        for label in labels {
            mask |= 1u64 << self.index_of(label.as_ref())?;
        }
        Ok(Event::from_parts(Arc::clone(self), mask))
    }

    /// Event from a bitmask over outcome indices.
    pub fn event_from_mask(self: &Arc<Self>, mask: u64) -> Result<Event> {
        if mask & !self.full_mask() != 0 {
            return Err(Error::DomainMismatch(format!(
                "mask {:#x} has bits outside a space of {} outcomes",
                mask,
                self.len()
            )));
        }
        Ok(Event::from_parts(Arc::clone(self), mask))
    }

    pub fn empty_event(self: &Arc<Self>) -> Event {
        Event::from_parts(Arc::clone(self), 0)
    }

    pub fn full_event(self: &Arc<Self>) -> Event {
        Event::from_parts(Arc::clone(self), self.full_mask())
    }

    /// Every event, ordered by size and then by mask.
    pub fn subsets(self: &Arc<Self>) -> impl Iterator<Item = Event> + '_ {
        subsets::masks_by_size(self.len())
            .into_iter()
            .map(move |mask| Event::from_parts(Arc::clone(self), mask))
    }

    /// Every event of exactly `size` outcomes.
    pub fn subsets_of_size(self: &Arc<Self>, size: usize) -> impl Iterator<Item = Event> + '_ {
        subsets::submasks_of_size(self.full_mask(), size)
            .map(move |mask| Event::from_parts(Arc::clone(self), mask))
    }

    /// Every subset of `event`, ordered by size and then by mask.
    pub fn subsets_of(self: &Arc<Self>, event: &Event) -> Result<Vec<Event>> {
        event.check_space(self)?;
        Ok(subsets::subsets_of(event.mask())
            .into_iter()
            .map(|mask| Event::from_parts(Arc::clone(self), mask))
            .collect())
    }

    /// Normalize raw values, a label map, an event or a scalar into a gamble.
    pub fn make_gamble(self: &Arc<Self>, kind: NumberKind, source: impl Into<GambleSource>) -> Result<Gamble> {
        Gamble::from_source(self, kind, source)
    }
}

impl fmt::Display for PossibilitySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.outcomes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_rejects_bad_labels() {
        assert_eq!(
            PossibilitySpace::new(Vec::<String>::new()).unwrap_err(),
            Error::EmptySpace
        );
        assert_eq!(
            PossibilitySpace::new(["a", "b", "a"]).unwrap_err(),
            Error::DuplicateOutcome("a".into())
        );
        assert!(matches!(
            PossibilitySpace::range(65).unwrap_err(),
            Error::SpaceTooLarge { size: 65, max: 64 }
        ));
    }

    #[test]
    fn test_space_lookup() {
        let space = PossibilitySpace::from_chars("abc").unwrap();
        assert_eq!(space.len(), 3);
        assert_eq!(space.index_of("c").unwrap(), 2);
        assert_eq!(space.index_of("z").unwrap_err(), Error::UnknownOutcome("z".into()));
        assert_eq!(space.to_string(), "{a, b, c}");
    }

    #[test]
    fn test_subsets_order() {
        let space = PossibilitySpace::range(3).unwrap();
        let sizes: Vec<usize> = space.subsets().map(|e| e.len()).collect();
        assert_eq!(sizes, vec![0, 1, 1, 1, 2, 2, 2, 3]);
        assert_eq!(space.subsets_of_size(2).count(), 3);
        let ab = space.make_event(["0", "1"]).unwrap();
        let masks: Vec<u64> = space.subsets_of(&ab).unwrap().iter().map(|e| e.mask()).collect();
        assert_eq!(masks, vec![0b00, 0b01, 0b10, 0b11]);
    }

    #[test]
    fn test_make_gamble_from_map() {
        let space = PossibilitySpace::from_chars("abc").unwrap();
        let g = space
            .make_gamble(
                NumberKind::Fraction,
                GambleSource::Map(vec![("b".into(), improb_math::Number::from_i64(NumberKind::Fraction, 4))]),
            )
            .unwrap();
        assert_eq!(g.to_string(), "[0, 4, 0]");
    }

    #[test]
    fn test_event_from_mask_bounds() {
        let space = PossibilitySpace::range(2).unwrap();
        assert!(space.event_from_mask(0b11).is_ok());
        assert!(space.event_from_mask(0b100).is_err());
    }
}
