use crate::learn::LearnError;
use crate::model::hand::HandKey;
use std::collections::BTreeMap;

/// Weight reported for a hand that has never been learned.
pub const NEUTRAL_WEIGHT: f64 = 0.5;

/// Decayed win estimate per hand key: `w ← w + rate · (target − w)`.
#[derive(Debug, Clone)]
pub struct OutcomeLearner {
    rate: f64,
    weights: BTreeMap<HandKey, f64>,
}

impl OutcomeLearner {
    pub fn new(rate: f64) -> Result<Self, LearnError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(LearnError::InvalidRate(rate));
        }
        Ok(Self {
            rate,
            weights: BTreeMap::new(),
        })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn learn(&mut self, key: HandKey, won: bool) {
        let target = if won { 1.0 } else { 0.0 };
        let weight = self.weights.entry(key).or_insert(NEUTRAL_WEIGHT);
        *weight += self.rate * (target - *weight);
    }

    pub fn weight(&self, key: &HandKey) -> Option<f64> {
        self.weights.get(key).copied()
    }

    /// Learned weight, or [`NEUTRAL_WEIGHT`] for an unseen hand.
    pub fn estimate(&self, key: &HandKey) -> f64 {
        self.weight(key).unwrap_or(NEUTRAL_WEIGHT)
    }

    pub fn weights(&self) -> impl Iterator<Item = (&HandKey, f64)> {
        self.weights.iter().map(|(key, weight)| (key, *weight))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn reset(&mut self) {
        self.weights.clear();
    }
}
