//! improb common types and errors.
//!
//! This crate provides the domain vocabulary shared by the engine:
//! - Possibility spaces with ordered, unique outcome labels
//! - Events as bitmask subsets of a space
//! - Gambles as tagged-number functions on a space
//! - The unified error taxonomy with stable codes

pub mod error;
pub mod event;
pub mod gamble;
pub mod space;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use event::Event;
pub use gamble::{Gamble, GambleSource};
pub use space::PossibilitySpace;

pub use improb_math::{Number, NumberKind};
