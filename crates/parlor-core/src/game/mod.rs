pub mod jack;
pub mod poker;

use crate::model::action::Move;
use crate::model::player::Seat;
use core::fmt;

pub use jack::{JackRound, JackRules, JackShowdown, JackVariant, Transition, TurnOrder};
pub use poker::{Exchange, PokerRound, PokerRules, PokerShowdown, PokerVariant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    OutOfTurn { seat: Seat, expected: Seat },
    Finished,
    InProgress,
    DeckExhausted,
    IllegalMove { seat: Seat, attempted: Move },
    /// A rigged starting hand already at or past the bust threshold.
    RiggedBust { seat: Seat },
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundError::OutOfTurn { seat, expected } => {
                write!(f, "{seat} seat acted out of turn; {expected} seat is to act")
            }
            RoundError::Finished => f.write_str("round is already finished"),
            RoundError::InProgress => f.write_str("round is still in progress"),
            RoundError::DeckExhausted => f.write_str("deck ran out of cards"),
            RoundError::IllegalMove { seat, attempted } => {
                write!(f, "{attempted} is not legal for the {seat} seat")
            }
            RoundError::RiggedBust { seat } => {
                write!(f, "rigged hand for the {seat} seat starts bust")
            }
        }
    }
}

impl std::error::Error for RoundError {}
