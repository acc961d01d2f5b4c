//! Online estimation of hand-total transition probabilities.
//!
//! [`TransitionLearner`] counts observed moves between discretised totals
//! and per-state wins and losses, and turns them into exact probabilities
//! on demand. [`OutcomeLearner`] keeps a decayed per-hand win weight for the
//! poker games, where hands are compared rather than accumulated.

pub mod fraction;
pub mod outcome;
pub mod state;
pub mod transition;

use core::fmt;

pub use fraction::Fraction;
pub use outcome::{NEUTRAL_WEIGHT, OutcomeLearner};
pub use state::{State, StateSpace};
pub use transition::{
    Assessment, NormalizedWeights, Reachable, TransitionLearner, WeightRow, WeightsRow,
    WinEstimate,
};

#[derive(Debug, Clone, PartialEq)]
pub enum LearnError {
    /// A state outside the learner's declared set.
    InvalidState { state: u8, states: usize },
    /// A learning rate outside `[0, 1]`.
    InvalidRate(f64),
}

impl fmt::Display for LearnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearnError::InvalidState { state, states } => write!(
                f,
                "state {state} is outside the declared set of {states} states"
            ),
            LearnError::InvalidRate(rate) => {
                write!(f, "learning rate {rate} is outside [0, 1]")
            }
        }
    }
}

impl std::error::Error for LearnError {}
