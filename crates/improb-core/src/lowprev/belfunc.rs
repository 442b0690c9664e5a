//! Belief functions given by a mass assignment.

use super::LowPrev;
use crate::setfunction::SetFunction;
use improb_common::{Error, Event, Gamble, Number, NumberKind, PossibilitySpace, Result};
use improb_config::EngineConfig;
use std::fmt;
use std::sync::Arc;

/// Lower prevision `Σ_{A≠∅} m(A) min_A g` of a basic belief assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct BelFunc {
    mass: SetFunction,
    tolerance: f64,
}

impl BelFunc {
    pub fn new(mass: SetFunction) -> Self {
        let tolerance = EngineConfig::with_kind(mass.kind()).tolerance();
        BelFunc { mass, tolerance }
    }

    pub fn mass(&self) -> &SetFunction {
        &self.mass
    }

    /// Replace the mass of one event.
    pub fn set_mass(&mut self, event: &Event, value: Number) -> Result<()> {
        self.mass.set_value(event, value)
    }

    /// Belief of an event, `Σ_{B⊆A} m(B)`.
    pub fn belief(&self, event: &Event) -> Result<Number> {
        self.mass.get_zeta(event)
    }
}

impl LowPrev for BelFunc {
    fn space(&self) -> &Arc<PossibilitySpace> {
        self.mass.space()
    }

    fn kind(&self) -> NumberKind {
        self.mass.kind()
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn get_lower(&mut self, gamble: &Gamble, event: Option<&Event>) -> Result<Number> {
        if let Some(event) = event {
            event.check_space(self.mass.space())?;
            if !event.is_full() {
                return Err(Error::UnsupportedAlgorithm {
                    algorithm: "belief function".into(),
                    target: "conditional lower prevision".into(),
                });
            }
        }
        gamble.check_domain(self.mass.space(), self.mass.kind())?;
        self.mass.get_bba_choquet(gamble)
    }
}

impl fmt::Display for BelFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mass)
    }
}
