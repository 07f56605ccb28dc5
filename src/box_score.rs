//! Box score: the serializable summary of one game.

use crate::error::SimError;
use crate::game::GameSimulation;
use crate::participant::{GameId, PlayerId, Side, TeamId};
use crate::stat_key::StatKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One player's line for a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLine {
    pub player: PlayerId,
    pub name: String,
    pub stats: BTreeMap<StatKey, u32>,
}

/// One team's totals and the lines of every player who appeared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamBox {
    pub team: TeamId,
    pub name: String,
    pub stats: BTreeMap<StatKey, u32>,
    /// Players who took the court, in roster order.
    pub players: Vec<PlayerLine>,
}

impl TeamBox {
    /// Team total for `key`, 0 if it was never recorded.
    pub fn stat(&self, key: StatKey) -> u32 {
        self.stats.get(&key).copied().unwrap_or(0)
    }

    /// Points scored by the team.
    pub fn points(&self) -> u32 {
        self.stat(StatKey::Points)
    }
}

/// Snapshot of a game's stats.
///
/// Can be taken at any point; `winner` is only set once the game is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub game: GameId,
    pub home: TeamBox,
    pub away: TeamBox,
    /// Points per period, `[home, away]`.
    pub line_score: Vec<[u32; 2]>,
    pub overtime_periods: u32,
    pub winner: Option<TeamId>,
}

impl BoxScore {
    /// Snapshot `game` as it stands now.
    pub fn from_game(game: &GameSimulation) -> Self {
        Self {
            game: game.id(),
            home: team_box(game, Side::Home),
            away: team_box(game, Side::Away),
            line_score: game.line_score().to_vec(),
            overtime_periods: game.clock().overtime_periods(),
            winner: game.winner().ok(),
        }
    }

    /// Serialize to pretty-printed JSON, stat keys in snake case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hoopsim::*;
    ///
    /// let mut league = League::new();
    /// let home = league.add_team("Home");
    /// let away = league.add_team("Away");
    /// for team in [home, away] {
    ///     for i in 0..10 {
    ///         league.add_player(team, format!("P{i}"), Attributes::uniform(0.5).unwrap()).unwrap();
    ///     }
    /// }
    /// let mut game =
    ///     GameSimulation::start(&mut league, GameId(1), home, away, GameConfig::default(), 7)
    ///         .unwrap();
    /// game.simulate().unwrap();
    ///
    /// let json = game.box_score().to_json().unwrap();
    /// assert_eq!(BoxScore::from_json(&json).unwrap(), game.box_score());
    /// ```
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a box score written by [`BoxScore::to_json`].
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Box of the team on `side`.
    pub fn team(&self, side: Side) -> &TeamBox {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

fn team_box(game: &GameSimulation, side: Side) -> TeamBox {
    let roster = game.roster(side);
    let id = game.id();
    let stats = StatKey::ALL
        .iter()
        .map(|key| (*key, roster.team.game_stat(id, *key) as u32))
        .collect();
    let players = roster
        .team
        .roster()
        .iter()
        .filter_map(|player| roster.player(*player))
        .filter(|player| player.stats().has_game(id))
        .map(|player| PlayerLine {
            player: player.id,
            name: player.name.clone(),
            stats: StatKey::ALL
                .iter()
                .filter(|key| **key != StatKey::Possessions)
                .map(|key| (*key, player.game_stat(id, *key) as u32))
                .collect(),
        })
        .collect();
    TeamBox {
        team: roster.team.id,
        name: roster.team.name.clone(),
        stats,
        players,
    }
}
