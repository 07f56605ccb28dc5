//! Stat key module.
//!
//! Provides the `StatKey` enumeration, the closed set of box-score stats
//! tracked for both teams and players.

use serde::{Deserialize, Serialize};

/// A box-score stat tracked per team and per player.
///
/// # Examples
///
/// ```rust
/// use hoopsim::StatKey;
///
/// assert_eq!(StatKey::Points.as_str(), "points");
/// assert_eq!(StatKey::ALL.len(), 16);
/// assert_eq!(StatKey::ThreeMade.point_value(), Some(3));
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Points,
    TwoMade,
    TwoAttempted,
    ThreeMade,
    ThreeAttempted,
    FreeThrowMade,
    FreeThrowAttempted,
    Assists,
    Steals,
    Blocks,
    DefensiveRebounds,
    OffensiveRebounds,
    Turnovers,
    Fouls,
    /// Seconds spent on court. Always zero for teams.
    SecondsPlayed,
    /// Top-level possessions resolved (garbage time excluded). Teams only.
    Possessions,
}

impl StatKey {
    /// Every stat key, in box-score order.
    pub const ALL: [StatKey; 16] = [
        StatKey::Points,
        StatKey::TwoMade,
        StatKey::TwoAttempted,
        StatKey::ThreeMade,
        StatKey::ThreeAttempted,
        StatKey::FreeThrowMade,
        StatKey::FreeThrowAttempted,
        StatKey::Assists,
        StatKey::Steals,
        StatKey::Blocks,
        StatKey::DefensiveRebounds,
        StatKey::OffensiveRebounds,
        StatKey::Turnovers,
        StatKey::Fouls,
        StatKey::SecondsPlayed,
        StatKey::Possessions,
    ];

    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::Points => "points",
            StatKey::TwoMade => "two_made",
            StatKey::TwoAttempted => "two_attempted",
            StatKey::ThreeMade => "three_made",
            StatKey::ThreeAttempted => "three_attempted",
            StatKey::FreeThrowMade => "free_throw_made",
            StatKey::FreeThrowAttempted => "free_throw_attempted",
            StatKey::Assists => "assists",
            StatKey::Steals => "steals",
            StatKey::Blocks => "blocks",
            StatKey::DefensiveRebounds => "defensive_rebounds",
            StatKey::OffensiveRebounds => "offensive_rebounds",
            StatKey::Turnovers => "turnovers",
            StatKey::Fouls => "fouls",
            StatKey::SecondsPlayed => "seconds_played",
            StatKey::Possessions => "possessions",
        }
    }

    /// Points scored per unit of a "made" key, `None` for every other key.
    pub fn point_value(self) -> Option<u32> {
        match self {
            StatKey::TwoMade => Some(2),
            StatKey::ThreeMade => Some(3),
            StatKey::FreeThrowMade => Some(1),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
