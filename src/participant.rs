//! Identity types.
//!
//! Teams, players and games are addressed by stable integer ids. A
//! `Participant` names either kind of stat owner, and `Side` names the two
//! slots of a game.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u32);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner of a stat line.
///
/// # Examples
///
/// ```rust
/// use hoopsim::{Participant, PlayerId, TeamId};
///
/// let who = Participant::Player(PlayerId(4));
/// assert_eq!(who.to_string(), "player 4");
/// assert_ne!(who, Participant::Team(TeamId(4)));
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Participant {
    Team(TeamId),
    Player(PlayerId),
}

impl From<TeamId> for Participant {
    fn from(id: TeamId) -> Self {
        Participant::Team(id)
    }
}

impl From<PlayerId> for Participant {
    fn from(id: PlayerId) -> Self {
        Participant::Player(id)
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Team(id) => write!(f, "team {}", id),
            Participant::Player(id) => write!(f, "player {}", id),
        }
    }
}

/// One of the two slots in a game.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    pub fn other(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Home => 0,
            Side::Away => 1,
        }
    }
}
