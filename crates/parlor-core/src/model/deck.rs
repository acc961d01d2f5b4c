use crate::model::card::Card;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Every draw is uniform over the full card list; the deck never runs out.
    Replacement,
    /// Cards leave the deck once drawn.
    Exhaustive,
}

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    mode: DrawMode,
}

impl Deck {
    pub fn from_cards(cards: Vec<Card>, mode: DrawMode) -> Self {
        Self { cards, mode }
    }

    pub fn whitejack() -> Self {
        Self::from_cards(Card::WHITEJACK.to_vec(), DrawMode::Replacement)
    }

    pub fn full() -> Self {
        Self::from_cards(Card::FULL.to_vec(), DrawMode::Replacement)
    }

    pub fn preschool() -> Self {
        let mut cards = Vec::with_capacity(9);
        for card in Card::PRESCHOOL.iter().copied() {
            cards.extend([card; 3]);
        }
        Self::from_cards(cards, DrawMode::Exhaustive)
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.shuffle_in_place(rng);
        self
    }

    pub fn shuffled_with_seed(self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        self.shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn draw<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Card> {
        match self.mode {
            DrawMode::Replacement => self.cards.choose(rng).copied(),
            DrawMode::Exhaustive => self.cards.pop(),
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn remaining(&self) -> Option<usize> {
        match self.mode {
            DrawMode::Replacement => None,
            DrawMode::Exhaustive => Some(self.cards.len()),
        }
    }

    /// Distinct cards in first-seen order.
    pub fn kinds(&self) -> Vec<Card> {
        let mut kinds = Vec::new();
        for card in self.cards.iter().copied() {
            if !kinds.contains(&card) {
                kinds.push(card);
            }
        }
        kinds
    }

    pub fn min_card(&self) -> Option<Card> {
        self.cards.iter().copied().min_by_key(|card| card.points())
    }

    /// Probability of each distinct card on the next draw.
    pub fn draw_distribution(&self) -> Vec<(Card, f64)> {
        let total = self.cards.len() as f64;
        self.kinds()
            .into_iter()
            .map(|kind| {
                let count = self.cards.iter().filter(|&&card| card == kind).count();
                (kind, count as f64 / total)
            })
            .collect()
    }
}
