use crate::model::card::Card;
use crate::model::points::Points;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn remove(&mut self, card: Card) -> bool {
        if let Some(index) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn first(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    pub fn last(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    /// Blackjack-style total: one Ace is promoted to eleven while that keeps
    /// the hand under `bust`, and the result is marked soft.
    pub fn jack_total(&self, bust: u8) -> Points {
        jack_total(self.cards.iter().copied(), bust)
    }

    pub fn poker_rank(&self) -> PokerHand {
        let mut sorted = self.cards.clone();
        sorted.sort();
        let best_pair = sorted
            .windows(2)
            .filter(|pair| pair[0] == pair[1])
            .map(|pair| pair[0].hard_value())
            .max();
        match best_pair {
            Some(value) => PokerHand::Pair(value),
            None => PokerHand::High(self.cards.iter().map(|card| card.hard_value()).sum()),
        }
    }

    pub fn outcome_key(&self) -> HandKey {
        let mut values: Vec<u8> = self.cards.iter().map(|card| card.hard_value()).collect();
        values.sort_unstable();
        values.dedup();
        HandKey(values)
    }
}

pub fn jack_total(cards: impl Iterator<Item = Card>, bust: u8) -> Points {
    let mut hard: u16 = 0;
    let mut has_ace = false;
    for card in cards {
        hard += u16::from(card.hard_value());
        has_ace |= card.is_ace();
    }
    let hard = u8::try_from(hard).unwrap_or(u8::MAX);
    soft_total(hard, has_ace, bust)
}

pub(crate) fn soft_total(hard: u8, has_ace: bool, bust: u8) -> Points {
    match hard.checked_add(10) {
        Some(promoted) if has_ace && promoted < bust => Points::soft(promoted),
        _ => Points::whole(hard),
    }
}

/// Preschool poker ranking. Any pair beats every unpaired hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum PokerHand {
    High(u8),
    Pair(u8),
}

impl fmt::Display for PokerHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PokerHand::High(sum) => write!(f, "high {sum}"),
            PokerHand::Pair(value) => write!(f, "pair of {value}s"),
        }
    }
}

/// Distinct card values of a hand, ascending.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandKey(Vec<u8>);

impl HandKey {
    pub fn new(mut values: Vec<u8>) -> Self {
        values.sort_unstable();
        values.dedup();
        Self(values)
    }

    pub fn values(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for HandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}
