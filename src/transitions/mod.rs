//! Transition scheduling: effect choice, capped durations and chain offsets for every
//! cross-faded junction.

pub(crate) mod caps;
pub(crate) mod effect;
pub(crate) mod schedule;

pub use caps::{TRANSITION_QUANTUM, TransitionCaps};
pub use effect::{EffectKind, EffectSelector, SeededSelector, choose_effect};
pub use schedule::{Transition, TransitionPolicy, schedule_transitions, verify_transitions};

#[cfg(test)]
#[path = "../../tests/unit/transitions/effect.rs"]
mod tests;
