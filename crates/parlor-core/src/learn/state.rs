use crate::learn::LearnError;
use crate::model::points::Points;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A discretised hand total. `0` is START and the space's bust value is BUST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(u8);

impl State {
    pub const START: State = State(0);

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ordered state set `{START, 1, .., bust - 1, BUST}`.
///
/// Every total at or above the bust threshold collapses onto BUST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateSpace {
    bust: u8,
}

impl StateSpace {
    /// Returns `None` when `bust` leaves no playable state between START and BUST.
    pub const fn new(bust: u8) -> Option<Self> {
        if bust < 2 { None } else { Some(Self { bust }) }
    }

    pub const fn bust_threshold(self) -> u8 {
        self.bust
    }

    pub const fn len(self) -> usize {
        self.bust as usize + 1
    }

    pub const fn start(self) -> State {
        State::START
    }

    pub const fn bust(self) -> State {
        State(self.bust)
    }

    pub fn state(self, value: u8) -> Result<State, LearnError> {
        let state = State(value);
        self.check(state)?;
        Ok(state)
    }

    pub fn check(self, state: State) -> Result<(), LearnError> {
        if state.0 <= self.bust {
            Ok(())
        } else {
            Err(LearnError::InvalidState {
                state: state.0,
                states: self.len(),
            })
        }
    }

    /// Lossy map from a real total onto the state set.
    pub fn of_total(self, total: Points) -> State {
        State(total.floor().min(self.bust))
    }

    pub fn is_bust(self, state: State) -> bool {
        state.0 == self.bust
    }

    pub fn states(self) -> impl DoubleEndedIterator<Item = State> {
        (0..=self.bust).map(State)
    }

    /// Playable states, START and BUST excluded.
    pub fn playable(self) -> impl DoubleEndedIterator<Item = State> {
        (1..self.bust).map(State)
    }
}

#[cfg(test)]
mod tests {
    use super::{State, StateSpace};
    use crate::learn::LearnError;
    use crate::model::points::Points;

    #[test]
    fn whitejack_space_has_six_states() {
        let space = StateSpace::new(5).unwrap();
        assert_eq!(space.len(), 6);
        let values: Vec<u8> = space.states().map(State::value).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4, 5]);
        let playable: Vec<u8> = space.playable().map(State::value).collect();
        assert_eq!(playable, vec![1, 2, 3, 4]);
    }

    #[test]
    fn totals_at_or_above_threshold_collapse_to_bust() {
        let space = StateSpace::new(5).unwrap();
        assert_eq!(space.of_total(Points::whole(5)), space.bust());
        assert_eq!(space.of_total(Points::whole(8)), space.bust());
        assert_eq!(space.of_total(Points::whole(3)).value(), 3);
    }

    #[test]
    fn out_of_range_state_is_rejected() {
        let space = StateSpace::new(5).unwrap();
        assert_eq!(
            space.state(6),
            Err(LearnError::InvalidState {
                state: 6,
                states: 6
            })
        );
        assert!(space.state(5).is_ok());
    }

    #[test]
    fn degenerate_threshold_is_refused() {
        assert!(StateSpace::new(1).is_none());
    }
}
