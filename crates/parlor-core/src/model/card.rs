use crate::model::points::Points;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Card {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Card {
    pub const WHITEJACK: [Card; 4] = [Card::One, Card::Two, Card::Three, Card::Four];

    pub const FULL: [Card; 12] = [
        Card::Two,
        Card::Three,
        Card::Four,
        Card::Five,
        Card::Six,
        Card::Seven,
        Card::Eight,
        Card::Nine,
        Card::King,
        Card::Queen,
        Card::Jack,
        Card::Ace,
    ];

    pub const PRESCHOOL: [Card; 3] = [Card::One, Card::Two, Card::Three];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Card::One),
            2 => Some(Card::Two),
            3 => Some(Card::Three),
            4 => Some(Card::Four),
            5 => Some(Card::Five),
            6 => Some(Card::Six),
            7 => Some(Card::Seven),
            8 => Some(Card::Eight),
            9 => Some(Card::Nine),
            _ => None,
        }
    }

    /// Face value with an Ace counted as one.
    pub const fn hard_value(self) -> u8 {
        match self {
            Card::Jack | Card::Queen | Card::King => 10,
            Card::Ace => 1,
            other => other as u8,
        }
    }

    /// Encoded value; an Ace is 11.5 so soft totals stay distinguishable.
    pub const fn points(self) -> Points {
        match self {
            Card::Ace => Points::soft(11),
            other => Points::whole(other.hard_value()),
        }
    }

    pub const fn is_ace(self) -> bool {
        matches!(self, Card::Ace)
    }

    pub const fn is_odd(self) -> bool {
        self.hard_value() % 2 == 1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Jack => f.write_str("J"),
            Card::Queen => f.write_str("Q"),
            Card::King => f.write_str("K"),
            Card::Ace => f.write_str("A"),
            other => write!(f, "{}", other.hard_value()),
        }
    }
}
