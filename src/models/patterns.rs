use serde::{Deserialize, Serialize};

/// Today's session extremes compared against the previous session.
/// `failure` is the conjunction of "high not exceeded" and "low not exceeded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BreakoutStatus {
    pub bullish: bool,
    pub bearish: bool,
    pub failure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TopPatterns {
    pub double_top: bool,
    pub descending_top: bool,
    pub top_failure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BottomPatterns {
    pub double_bottom: bool,
    pub ascending_bottom: bool,
    pub bottom_failure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Divergence {
    pub bullish: bool,
    pub bearish: bool,
}

impl Divergence {
    pub fn any(&self) -> bool {
        self.bullish || self.bearish
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngulfingStatus {
    pub bullish: bool,
    pub bearish: bool,
}
