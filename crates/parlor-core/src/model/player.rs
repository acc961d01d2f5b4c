use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Seat {
    First = 0,
    Second = 1,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::First, Seat::Second];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::First),
            1 => Some(Seat::Second),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Seat::First => "first",
            Seat::Second => "second",
        };
        f.write_str(label)
    }
}

/// Per-hand lifecycle: `Dealt → (Drawing)* → Stood | Bust`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandStatus {
    Dealt,
    Drawing,
    Stood,
    Bust,
}

impl HandStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, HandStatus::Stood | HandStatus::Bust)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatResult {
    Won,
    Lost,
    Drew,
}

impl SeatResult {
    /// Results for both seats given the winning seat, if any.
    pub const fn pair(winner: Option<Seat>) -> [SeatResult; 2] {
        match winner {
            Some(Seat::First) => [SeatResult::Won, SeatResult::Lost],
            Some(Seat::Second) => [SeatResult::Lost, SeatResult::Won],
            None => [SeatResult::Drew, SeatResult::Drew],
        }
    }

    pub const fn is_win(self) -> bool {
        matches!(self, SeatResult::Won)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SeatResult::Won => "won",
            SeatResult::Lost => "lost",
            SeatResult::Drew => "drew",
        }
    }
}

impl fmt::Display for SeatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{HandStatus, Seat, SeatResult};

    #[test]
    fn stood_and_bust_are_terminal() {
        assert!(HandStatus::Stood.is_terminal());
        assert!(HandStatus::Bust.is_terminal());
        assert!(!HandStatus::Dealt.is_terminal());
        assert!(!HandStatus::Drawing.is_terminal());
    }

    #[test]
    fn pair_assigns_mirrored_results() {
        assert_eq!(
            SeatResult::pair(Some(Seat::Second)),
            [SeatResult::Lost, SeatResult::Won]
        );
        assert_eq!(SeatResult::pair(None), [SeatResult::Drew, SeatResult::Drew]);
    }

    #[test]
    fn seats_mirror_each_other() {
        assert_eq!(Seat::First.other(), Seat::Second);
        assert_eq!(Seat::from_index(1), Some(Seat::Second));
        assert_eq!(Seat::from_index(2), None);
    }
}
