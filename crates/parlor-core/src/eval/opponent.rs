use crate::model::action::Decision;
use crate::model::points::Points;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Fixed stand rule: draw while the real total is below `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpponentPolicy {
    threshold: u8,
}

impl OpponentPolicy {
    pub const DRAW_BELOW_THREE: OpponentPolicy = OpponentPolicy::new(3);
    pub const DRAW_BELOW_FOUR: OpponentPolicy = OpponentPolicy::new(4);
    pub const DRAW_BELOW_SEVENTEEN: OpponentPolicy = OpponentPolicy::new(17);

    pub const REGISTRY: [(&'static str, OpponentPolicy); 3] = [
        ("draw_below_three", Self::DRAW_BELOW_THREE),
        ("draw_below_four", Self::DRAW_BELOW_FOUR),
        ("draw_below_seventeen", Self::DRAW_BELOW_SEVENTEEN),
    ];

    pub const fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn named(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        Self::REGISTRY
            .iter()
            .find(|(label, _)| *label == wanted)
            .map(|(_, policy)| *policy)
    }

    pub fn name(self) -> Option<&'static str> {
        Self::REGISTRY
            .iter()
            .find(|(_, policy)| *policy == self)
            .map(|(label, _)| *label)
    }

    pub const fn threshold(self) -> u8 {
        self.threshold
    }

    pub const fn must_draw(self, total: Points) -> bool {
        total.floor() < self.threshold
    }

    pub const fn decide(self, total: Points) -> Decision {
        if self.must_draw(total) {
            Decision::Draw
        } else {
            Decision::Stop
        }
    }
}

impl fmt::Display for OpponentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "draw_below_{}", self.threshold),
        }
    }
}
