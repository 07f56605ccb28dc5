//! Error types for game simulation.
//!
//! All errors that can occur while building rosters, configuring or running
//! a game are represented by the `SimError` enum.

use crate::participant::{PlayerId, TeamId};
use crate::rating::RatingId;
use crate::stat_key::StatKey;
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[RatingId]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors that can occur during simulation.
///
/// # Examples
///
/// ```rust
/// use hoopsim::{SimError, TeamId};
///
/// let err = SimError::UnknownTeam(TeamId(7));
/// assert_eq!(err.to_string(), "Team 7 is not part of this game");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A query referenced a team that is not part of the game or league.
    #[error("Team {0} is not part of this game")]
    UnknownTeam(TeamId),

    /// A query referenced a player that is not part of the game or league.
    #[error("Player {0} is not part of this game")]
    UnknownPlayer(PlayerId),

    /// A team cannot field five eligible players.
    ///
    /// This is fatal: the game is aborted instead of producing a
    /// silently-wrong box score.
    #[error("Team {team} has only {eligible} eligible players, 5 are required")]
    NotEnoughPlayers { team: TeamId, eligible: usize },

    /// The on-court set of a team does not hold exactly five players.
    #[error("Team {team} has {count} players on court, expected 5")]
    OnCourtViolation { team: TeamId, count: usize },

    /// A terminal query was made before the game ended.
    #[error("Game {0} is not over yet")]
    GameNotOver(u64),

    /// Stats can only grow during a game.
    #[error("Negative increment {delta} for stat {key}")]
    NegativeIncrement { key: StatKey, delta: f64 },

    /// An attribute value is outside `[0, 1]`.
    #[error("Attribute {name} = {value} is outside [0, 1]")]
    AttributeOutOfRange { name: &'static str, value: f64 },

    /// The game configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A rating formula references a rating that is not defined.
    #[error("Unknown rating: {0}")]
    UnknownRating(RatingId),

    /// A dependency cycle was detected between rating formulas.
    ///
    /// Contains the path of ratings involved in the cycle, closed on
    /// the first element (`[A, B, C, A]`).
    #[error("Cycle detected: {}", format_cycle_path(.path))]
    Cycle { path: Vec<RatingId> },

    /// The same team appears in more than one game of a slate.
    #[error("Team {0} is booked in more than one game")]
    DoubleBooked(TeamId),

    /// The worker pool for a slate could not be built.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::UnknownPlayer(PlayerId(12));
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_cycle_error_display() {
        let a = RatingId::from_str("A");
        let b = RatingId::from_str("B");
        let c = RatingId::from_str("C");
        let err = SimError::Cycle {
            path: vec![a.clone(), b.clone(), c.clone(), a.clone()],
        };
        let display = err.to_string();
        assert!(display.contains("Cycle detected"));
        assert!(display.contains("A -> B -> C -> A"));
    }

    #[test]
    fn test_not_enough_players_display() {
        let err = SimError::NotEnoughPlayers {
            team: TeamId(3),
            eligible: 4,
        };
        assert_eq!(
            err.to_string(),
            "Team 3 has only 4 eligible players, 5 are required"
        );
    }

    #[test]
    fn test_from_json_error() {
        let err: SimError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, SimError::Serialization(_)));
    }
}
