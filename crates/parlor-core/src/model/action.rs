use crate::model::card::Card;
use core::fmt;
use serde::{Deserialize, Serialize};

/// The two signals the learner and evaluator can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Stop,
    Draw,
}

impl Decision {
    pub const fn as_str(self) -> &'static str {
        match self {
            Decision::Stop => "stop",
            Decision::Draw => "draw",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A move applied by a game round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "move", content = "card")]
pub enum Move {
    Stand,
    Draw,
    Discard(Card),
}

impl From<Decision> for Move {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Stop => Move::Stand,
            Decision::Draw => Move::Draw,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Stand => f.write_str("stand"),
            Move::Draw => f.write_str("draw"),
            Move::Discard(card) => write!(f, "discard {card}"),
        }
    }
}
