//! improb core library.
//!
//! - Set functions: Möbius and zeta transforms, Choquet integrals,
//!   n-monotonicity constraints
//! - Lower previsions: natural extension by linear programming, conditional
//!   lower previsions by bisection, credal sets, closed forms
//! - Decision rules over finite sets of gambles
//! - JSON model files, logging and exit codes for the `improb` binary

pub mod decision;
pub mod exit_codes;
pub mod logging;
pub mod lowprev;
pub mod model;
pub mod setfunction;

pub use decision::{filter_maximal, Criterion, Optimality};
pub use lowprev::{Algorithm, Assessment, AssessmentKey, BelFunc, LinVac, LowPoly, LowPrev, LowProb, Prob};
pub use model::{Model, ModelError, ModelFile};
pub use setfunction::SetFunction;

pub use improb_common::{Error, Event, Gamble, Number, NumberKind, PossibilitySpace, Result};
pub use improb_config::EngineConfig;
