use parlor_core::model::player::Seat;

/// Which configured agent sits in which seat for one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatOrder {
    agents: [usize; 2],
}

impl SeatOrder {
    pub const CONFIGURED: SeatOrder = SeatOrder { agents: [0, 1] };
    pub const SWAPPED: SeatOrder = SeatOrder { agents: [1, 0] };

    /// Alternates the two agents hand by hand, starting in config order.
    pub fn for_hand(hand_index: usize) -> Self {
        if hand_index % 2 == 0 {
            Self::CONFIGURED
        } else {
            Self::SWAPPED
        }
    }

    /// Puts `agent` in `seat` and the other agent opposite.
    pub fn placing(agent: usize, seat: Seat) -> Self {
        let first = match seat {
            Seat::First => agent,
            Seat::Second => 1 - agent,
        };
        if first == 0 {
            Self::CONFIGURED
        } else {
            Self::SWAPPED
        }
    }

    pub fn agent(&self, seat: Seat) -> usize {
        self.agents[seat.index()]
    }

    pub fn seat_of(&self, agent: usize) -> Seat {
        if self.agents[0] == agent {
            Seat::First
        } else {
            Seat::Second
        }
    }

    pub fn index(&self) -> usize {
        usize::from(*self == Self::SWAPPED)
    }
}
