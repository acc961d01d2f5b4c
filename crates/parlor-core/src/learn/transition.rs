use crate::learn::LearnError;
use crate::learn::fraction::Fraction;
use crate::learn::state::{State, StateSpace};
use crate::model::action::Decision;
use serde::Serialize;

/// Trailing slots after the per-target counters: losses, then wins.
pub const OUTCOME_SLOTS: usize = 2;

/// Learned win probability for a state, or the neutral sentinel when the
/// state has no normalised row yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinEstimate {
    Observed(Fraction),
    Neutral,
}

impl WinEstimate {
    pub const fn value(self) -> Fraction {
        match self {
            WinEstimate::Observed(value) => value,
            WinEstimate::Neutral => Fraction::HALF,
        }
    }

    pub const fn is_neutral(self) -> bool {
        matches!(self, WinEstimate::Neutral)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reachable {
    pub state: State,
    pub estimate: WinEstimate,
}

/// Everything `decide` looked at, for callers that want to log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub current: State,
    pub current_estimate: WinEstimate,
    pub best: Option<Reachable>,
    pub decision: Decision,
}

impl Assessment {
    pub fn used_neutral(&self) -> bool {
        self.current_estimate.is_neutral()
            || self.best.is_some_and(|best| best.estimate.is_neutral())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightRow<'a> {
    Normalized(&'a [Fraction]),
    Raw(&'a [u64]),
}

/// Empirical Markov transition table over a [`StateSpace`].
///
/// Each state owns a row of `|states| + 2` counters: one per target state,
/// then losses, then wins. Counters only grow. `normalize` divides a row
/// by its total sample count into a cached view of exact fractions; every
/// query reads that view, so estimates move only when a row is normalised.
#[derive(Debug, Clone)]
pub struct TransitionLearner {
    space: StateSpace,
    counts: Vec<Vec<u64>>,
    normalized: Vec<Option<Vec<Fraction>>>,
}

impl TransitionLearner {
    pub fn new(space: StateSpace) -> Self {
        let width = space.len() + OUTCOME_SLOTS;
        Self {
            space,
            counts: vec![vec![0; width]; space.len()],
            normalized: vec![None; space.len()],
        }
    }

    pub fn space(&self) -> StateSpace {
        self.space
    }

    pub fn width(&self) -> usize {
        self.space.len() + OUTCOME_SLOTS
    }

    /// Drops all counters and cached rows, starting a fresh run.
    pub fn reset(&mut self) {
        *self = Self::new(self.space);
    }

    pub fn observe_transition(&mut self, from: State, to: State) -> Result<(), LearnError> {
        self.space.check(from)?;
        self.space.check(to)?;
        let slot = &mut self.counts[from.index()][to.index()];
        *slot = slot.saturating_add(1);
        Ok(())
    }

    pub fn observe_outcome(&mut self, state: State, won: bool) -> Result<(), LearnError> {
        self.space.check(state)?;
        let index = if won {
            self.win_slot()
        } else {
            self.loss_slot()
        };
        let slot = &mut self.counts[state.index()][index];
        *slot = slot.saturating_add(1);
        Ok(())
    }

    pub fn counts(&self, state: State) -> Result<&[u64], LearnError> {
        self.space.check(state)?;
        Ok(&self.counts[state.index()])
    }

    pub fn samples(&self, state: State) -> Result<u64, LearnError> {
        Ok(self.counts(state)?.iter().sum())
    }

    /// Normalises one state, or every state when `state` is `None`.
    /// Rows without samples stay raw.
    pub fn normalize(&mut self, state: Option<State>) -> Result<(), LearnError> {
        match state {
            Some(state) => {
                self.space.check(state)?;
                self.normalize_row(state.index());
            }
            None => {
                for index in 0..self.counts.len() {
                    self.normalize_row(index);
                }
            }
        }
        Ok(())
    }

    fn normalize_row(&mut self, index: usize) {
        let row = &self.counts[index];
        let samples: u64 = row.iter().sum();
        if samples == 0 {
            return;
        }
        let normalized = row
            .iter()
            .map(|&count| Fraction::new(count, samples).unwrap_or(Fraction::ZERO))
            .collect();
        self.normalized[index] = Some(normalized);
    }

    pub fn is_normalized(&self, state: State) -> Result<bool, LearnError> {
        self.space.check(state)?;
        Ok(self.normalized[state.index()].is_some())
    }

    pub fn row(&self, state: State) -> Result<WeightRow<'_>, LearnError> {
        self.space.check(state)?;
        Ok(match &self.normalized[state.index()] {
            Some(row) => WeightRow::Normalized(row),
            None => WeightRow::Raw(&self.counts[state.index()]),
        })
    }

    pub fn transition_probability(
        &self,
        from: State,
        to: State,
    ) -> Result<Option<Fraction>, LearnError> {
        self.space.check(from)?;
        self.space.check(to)?;
        Ok(self.normalized[from.index()]
            .as_ref()
            .map(|row| row[to.index()]))
    }

    pub fn win_probability(&self, state: State) -> Result<WinEstimate, LearnError> {
        self.space.check(state)?;
        Ok(match &self.normalized[state.index()] {
            Some(row) => WinEstimate::Observed(row[self.win_slot()]),
            None => WinEstimate::Neutral,
        })
    }

    pub fn loss_probability(&self, state: State) -> Result<Option<Fraction>, LearnError> {
        self.space.check(state)?;
        Ok(self.normalized[state.index()]
            .as_ref()
            .map(|row| row[self.loss_slot()]))
    }

    /// States strictly above `current` and strictly below BUST.
    pub fn accessible_states(&self, current: State) -> Result<Vec<State>, LearnError> {
        self.space.check(current)?;
        Ok(self
            .space
            .playable()
            .filter(|state| *state > current)
            .collect())
    }

    /// Accessible state with the highest learned win probability. Ties keep
    /// the later state in ascending order.
    pub fn best_reachable(&self, current: State) -> Result<Option<Reachable>, LearnError> {
        let mut best: Option<Reachable> = None;
        for state in self.accessible_states(current)? {
            let estimate = self.win_probability(state)?;
            let replace = match best {
                Some(ref held) => estimate.value() >= held.estimate.value(),
                None => true,
            };
            if replace {
                best = Some(Reachable { state, estimate });
            }
        }
        Ok(best)
    }

    pub fn assess(&self, current: State) -> Result<Assessment, LearnError> {
        let current_estimate = self.win_probability(current)?;
        let best = self.best_reachable(current)?;
        let decision = match best {
            Some(reachable) if reachable.estimate.value() > current_estimate.value() => {
                Decision::Draw
            }
            _ => Decision::Stop,
        };
        Ok(Assessment {
            current,
            current_estimate,
            best,
            decision,
        })
    }

    pub fn decide(&self, current: State) -> Result<Decision, LearnError> {
        Ok(self.assess(current)?.decision)
    }

    pub fn snapshot(&self) -> NormalizedWeights {
        let rows = self
            .space
            .states()
            .map(|state| {
                let counts = self.counts[state.index()].clone();
                WeightsRow {
                    state,
                    samples: counts.iter().sum(),
                    counts,
                    probabilities: self.normalized[state.index()].clone(),
                }
            })
            .collect();
        NormalizedWeights {
            bust_threshold: self.space.bust_threshold(),
            rows,
        }
    }

    fn loss_slot(&self) -> usize {
        self.space.len()
    }

    fn win_slot(&self) -> usize {
        self.space.len() + 1
    }
}

/// Point-in-time copy of a learner's table for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedWeights {
    pub bust_threshold: u8,
    pub rows: Vec<WeightsRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightsRow {
    pub state: State,
    pub samples: u64,
    pub counts: Vec<u64>,
    pub probabilities: Option<Vec<Fraction>>,
}

impl WeightsRow {
    pub fn win_probability(&self) -> Option<Fraction> {
        self.probabilities
            .as_ref()
            .and_then(|row| row.last().copied())
    }

    pub fn loss_probability(&self) -> Option<Fraction> {
        self.probabilities
            .as_ref()
            .and_then(|row| row.len().checked_sub(2).map(|index| row[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whitejack() -> TransitionLearner {
        TransitionLearner::new(StateSpace::new(5).unwrap())
    }

    fn s(learner: &TransitionLearner, value: u8) -> State {
        learner.space().state(value).unwrap()
    }

    #[test]
    fn rows_have_two_trailing_outcome_slots() {
        let learner = whitejack();
        assert_eq!(learner.width(), 8);
        assert_eq!(learner.counts(State::START).unwrap().len(), 8);
    }

    #[test]
    fn normalizing_start_gives_two_thirds_and_one_third() {
        let mut learner = whitejack();
        let (start, one, two) = (State::START, s(&learner, 1), s(&learner, 2));
        learner.observe_transition(start, one).unwrap();
        learner.observe_transition(start, one).unwrap();
        learner.observe_transition(start, two).unwrap();
        learner.normalize(Some(start)).unwrap();

        assert_eq!(
            learner.transition_probability(start, one).unwrap(),
            Fraction::new(2, 3)
        );
        assert_eq!(
            learner.transition_probability(start, two).unwrap(),
            Fraction::new(1, 3)
        );
    }

    #[test]
    fn unsampled_rows_stay_raw() {
        let mut learner = whitejack();
        learner.normalize(None).unwrap();
        let three = s(&learner, 3);
        assert!(matches!(learner.row(three).unwrap(), WeightRow::Raw(row) if row.iter().all(|&c| c == 0)));
        assert_eq!(learner.win_probability(three).unwrap(), WinEstimate::Neutral);
        assert_eq!(learner.win_probability(three).unwrap().value(), Fraction::HALF);
    }

    #[test]
    fn win_probability_is_last_column() {
        let mut learner = whitejack();
        let four = s(&learner, 4);
        learner.observe_outcome(four, true).unwrap();
        learner.observe_outcome(four, true).unwrap();
        learner.observe_outcome(four, false).unwrap();
        learner.observe_transition(four, learner.space().bust()).unwrap();
        learner.normalize(Some(four)).unwrap();

        assert_eq!(
            learner.win_probability(four).unwrap(),
            WinEstimate::Observed(Fraction::HALF)
        );
        assert_eq!(learner.loss_probability(four).unwrap(), Fraction::new(1, 4));
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut learner = whitejack();
        learner.observe_transition(State::START, s(&learner, 3)).unwrap();
        learner.observe_outcome(s(&learner, 3), true).unwrap();
        learner.normalize(None).unwrap();
        let once = learner.snapshot();
        learner.normalize(None).unwrap();
        assert_eq!(once, learner.snapshot());
    }

    #[test]
    fn estimates_only_move_on_normalize() {
        let mut learner = whitejack();
        let two = s(&learner, 2);
        learner.observe_outcome(two, true).unwrap();
        learner.normalize(Some(two)).unwrap();
        learner.observe_outcome(two, false).unwrap();
        assert_eq!(
            learner.win_probability(two).unwrap(),
            WinEstimate::Observed(Fraction::ONE)
        );
        learner.normalize(Some(two)).unwrap();
        assert_eq!(
            learner.win_probability(two).unwrap(),
            WinEstimate::Observed(Fraction::HALF)
        );
    }

    #[test]
    fn accessible_states_exclude_current_and_bust() {
        let learner = whitejack();
        let three = s(&learner, 3);
        assert_eq!(learner.accessible_states(three).unwrap(), vec![s(&learner, 4)]);
        assert!(learner.accessible_states(s(&learner, 4)).unwrap().is_empty());
        assert!(
            learner
                .accessible_states(learner.space().bust())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn best_reachable_prefers_later_state_on_tie() {
        let learner = whitejack();
        let best = learner.best_reachable(State::START).unwrap().unwrap();
        assert_eq!(best.state, s(&learner, 4));
        assert!(best.estimate.is_neutral());
    }

    #[test]
    fn decide_draws_only_on_strict_improvement() {
        let mut learner = whitejack();
        let (two, three) = (s(&learner, 2), s(&learner, 3));
        learner.observe_outcome(two, true).unwrap();
        learner.observe_outcome(two, false).unwrap();
        learner.observe_outcome(three, true).unwrap();
        learner.observe_outcome(three, false).unwrap();
        learner.normalize(None).unwrap();
        // 2 and 3 both 1/2, 4 neutral 1/2: no strict gain
        assert_eq!(learner.decide(two).unwrap(), Decision::Stop);

        learner.observe_outcome(three, true).unwrap();
        learner.normalize(Some(three)).unwrap();
        let assessment = learner.assess(two).unwrap();
        assert_eq!(assessment.decision, Decision::Draw);
        assert_eq!(assessment.best.map(|b| b.state), Some(three));
    }

    #[test]
    fn last_playable_state_always_stops() {
        let mut learner = whitejack();
        let four = s(&learner, 4);
        learner.observe_outcome(four, false).unwrap();
        learner.normalize(None).unwrap();
        assert_eq!(learner.decide(four).unwrap(), Decision::Stop);
    }

    #[test]
    fn foreign_state_fails_fast() {
        let mut learner = whitejack();
        let foreign = StateSpace::new(9).unwrap().state(7).unwrap();
        assert!(matches!(
            learner.observe_transition(State::START, foreign),
            Err(LearnError::InvalidState { state: 7, .. })
        ));
        assert!(learner.decide(foreign).is_err());
        assert_eq!(learner.samples(State::START).unwrap(), 0);
    }

    #[test]
    fn reset_clears_counts_and_cache() {
        let mut learner = whitejack();
        learner.observe_transition(State::START, s(&learner, 1)).unwrap();
        learner.normalize(None).unwrap();
        learner.reset();
        assert_eq!(learner.samples(State::START).unwrap(), 0);
        assert!(!learner.is_normalized(State::START).unwrap());
    }
}
