use core::fmt;
use core::ops::Add;
use serde::{Deserialize, Serialize};

/// A hand or card value in half-point units.
///
/// Soft totals (an Ace still counted as eleven) carry a trailing half point,
/// so `Points::soft(12)` reads as 12.5. `floor` yields the real total and
/// `ceil` rounds the soft marker up.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Points(u16);

impl Points {
    pub const ZERO: Points = Points(0);

    pub const fn whole(value: u8) -> Self {
        Self(value as u16 * 2)
    }

    pub const fn soft(value: u8) -> Self {
        Self(value as u16 * 2 + 1)
    }

    pub const fn from_half_points(half: u16) -> Self {
        Self(half)
    }

    pub const fn half_points(self) -> u16 {
        self.0
    }

    pub const fn is_soft(self) -> bool {
        self.0 % 2 == 1
    }

    pub const fn floor(self) -> u8 {
        (self.0 / 2) as u8
    }

    pub const fn ceil(self) -> u8 {
        self.0.div_ceil(2) as u8
    }
}

impl Add for Points {
    type Output = Points;

    fn add(self, rhs: Points) -> Points {
        Points(self.0 + rhs.0)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_soft() {
            write!(f, "S{}", self.floor())
        } else {
            write!(f, "{}", self.floor())
        }
    }
}
