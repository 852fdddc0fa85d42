//! Shared primitive types used across the entire engine.

use serde::{Deserialize, Serialize};

/// Stable identifier of a reward pool (one per activity / banner).
pub type PoolId = String;

/// Stable identifier of a reward item inside a pool.
pub type ItemId = String;

/// Lifetime draw counter for a pool. Sequence numbers are derived from it.
pub type DrawCount = u64;

/// Rarity tier of a reward item. Ordered from least to most valuable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Self::Common, Self::Rare, Self::Epic, Self::Legendary];

    /// Epic and Legendary results get sequence numbers, rare history rows,
    /// window retention and (in large batches) a reveal pause.
    pub fn is_highlight(&self) -> bool {
        matches!(self, Self::Epic | Self::Legendary)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Common    => "common",
            Self::Rare      => "rare",
            Self::Epic      => "epic",
            Self::Legendary => "legendary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "common"    => Some(Self::Common),
            "rare"      => Some(Self::Rare),
            "epic"      => Some(Self::Epic),
            "legendary" => Some(Self::Legendary),
            _           => None,
        }
    }
}

/// The draw actions a player can take. Each maps to a fixed batch size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DrawType {
    Single,
    Ten,
    Hundred,
    FiveHundred,
}

impl DrawType {
    pub fn count(&self) -> u32 {
        match self {
            Self::Single      => 1,
            Self::Ten         => 10,
            Self::Hundred     => 100,
            Self::FiveHundred => 500,
        }
    }

    /// Large batches pause on rare reveals, window the displayed set
    /// and allow fast-forward. Single and ten-draws do none of that.
    pub fn is_large_batch(&self) -> bool {
        matches!(self, Self::Hundred | Self::FiveHundred)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Single      => "single",
            Self::Ten         => "ten",
            Self::Hundred     => "hundred",
            Self::FiveHundred => "five_hundred",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" | "1"             => Some(Self::Single),
            "ten" | "10"               => Some(Self::Ten),
            "hundred" | "100"          => Some(Self::Hundred),
            "five_hundred" | "500"     => Some(Self::FiveHundred),
            _                          => None,
        }
    }
}
