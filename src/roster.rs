//! Players, teams and the league arena.
//!
//! The `League` owns every `Team` and `Player`, addressed by id. A game never
//! borrows from the league: it checks a team out as a `TeamRoster` (the team
//! plus all of its players, moved out of the arena) and hands it back when the
//! game ends. A checked-out team is absent from the league, so it cannot be
//! scheduled into a second game at the same time.

use crate::attributes::Attributes;
use crate::container::StatRecord;
use crate::error::SimError;
use crate::participant::{GameId, PlayerId, TeamId};
use crate::rating::RatingModel;
use crate::stat_key::StatKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full energy.
pub const FULL_ENERGY: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: TeamId,
    attributes: Attributes,
    energy: f64,
    stats: StatRecord,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, team: TeamId, attributes: Attributes) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            attributes,
            energy: FULL_ENERGY,
            stats: StatRecord::new(),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn is_rested(&self) -> bool {
        self.energy >= FULL_ENERGY
    }

    pub fn reset_energy(&mut self) {
        self.energy = FULL_ENERGY;
    }

    /// Lose `amount` energy, never below 0.
    pub fn tire(&mut self, amount: f64) {
        self.energy = (self.energy - amount).clamp(0.0, FULL_ENERGY);
    }

    /// Regain `amount` energy, never above full.
    pub fn rest(&mut self, amount: f64) {
        self.energy = (self.energy + amount).clamp(0.0, FULL_ENERGY);
    }

    pub fn stats(&self) -> &StatRecord {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut StatRecord {
        &mut self.stats
    }

    /// Value of `key` in `game`, 0 when the player did not appear.
    pub fn game_stat(&self, game: GameId, key: StatKey) -> f64 {
        self.stats.game_value(game, key).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Player ids, best first.
    roster: Vec<PlayerId>,
    stats: StatRecord,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            roster: Vec::new(),
            stats: StatRecord::new(),
        }
    }

    /// Ranked roster, best player first.
    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    pub fn stats(&self) -> &StatRecord {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut StatRecord {
        &mut self.stats
    }

    pub fn game_stat(&self, game: GameId, key: StatKey) -> f64 {
        self.stats.game_value(game, key).unwrap_or(0.0)
    }
}

/// A team and all of its players, moved out of the league for one game.
#[derive(Debug, Clone)]
pub struct TeamRoster {
    pub team: Team,
    pub players: BTreeMap<PlayerId, Player>,
}

impl TeamRoster {
    pub fn id(&self) -> TeamId {
        self.team.id
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }
}

/// Arena of teams and players.
///
/// # Examples
///
/// ```rust
/// use hoopsim::{Attributes, League};
///
/// let mut league = League::new();
/// let team = league.add_team("Harbor City");
/// for i in 0..12 {
///     league
///         .add_player(team, format!("Player {i}"), Attributes::uniform(0.5).unwrap())
///         .unwrap();
/// }
/// let roster = league.check_out(team).unwrap();
/// assert!(league.team(team).is_none());
/// league.check_in(roster);
/// assert_eq!(league.team(team).unwrap().roster().len(), 12);
/// ```
#[derive(Debug, Default)]
pub struct League {
    teams: BTreeMap<TeamId, Team>,
    players: BTreeMap<PlayerId, Player>,
    next_team: u32,
    next_player: u32,
}

impl League {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_team(&mut self, name: impl Into<String>) -> TeamId {
        let id = TeamId(self.next_team);
        self.next_team += 1;
        self.teams.insert(id, Team::new(id, name));
        id
    }

    /// Add a player to the end of a team's roster.
    ///
    /// Call `rank_rosters` afterwards to restore rating order.
    pub fn add_player(
        &mut self,
        team: TeamId,
        name: impl Into<String>,
        attributes: Attributes,
    ) -> Result<PlayerId, SimError> {
        let owner = self.teams.get_mut(&team).ok_or(SimError::UnknownTeam(team))?;
        let id = PlayerId(self.next_player);
        self.next_player += 1;
        owner.roster.push(id);
        self.players.insert(id, Player::new(id, name, team, attributes));
        Ok(id)
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    /// Sort every roster by overall rating, best first (ties by id).
    pub fn rank_rosters(&mut self, model: &RatingModel) -> Result<(), SimError> {
        let mut overall: BTreeMap<PlayerId, f64> = BTreeMap::new();
        for (id, player) in &self.players {
            overall.insert(*id, model.overall(player.attributes())?);
        }
        for team in self.teams.values_mut() {
            team.roster.sort_by(|a, b| {
                let ra = overall.get(a).copied().unwrap_or(0.0);
                let rb = overall.get(b).copied().unwrap_or(0.0);
                rb.total_cmp(&ra).then(a.cmp(b))
            });
        }
        Ok(())
    }

    /// Mean overall rating of a team's players.
    pub fn team_rating(&self, team: TeamId, model: &RatingModel) -> Result<f64, SimError> {
        let team = self.teams.get(&team).ok_or(SimError::UnknownTeam(team))?;
        if team.roster.is_empty() {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for id in &team.roster {
            let player = self.players.get(id).ok_or(SimError::UnknownPlayer(*id))?;
            total += model.overall(player.attributes())?;
        }
        Ok(total / team.roster.len() as f64)
    }

    /// Move a team and its players out of the arena.
    pub fn check_out(&mut self, id: TeamId) -> Result<TeamRoster, SimError> {
        let team = self.teams.remove(&id).ok_or(SimError::UnknownTeam(id))?;
        let mut players = BTreeMap::new();
        for player_id in &team.roster {
            if let Some(player) = self.players.remove(player_id) {
                players.insert(*player_id, player);
            }
        }
        Ok(TeamRoster { team, players })
    }

    /// Return a checked-out team to the arena.
    pub fn check_in(&mut self, roster: TeamRoster) {
        self.players.extend(roster.players);
        self.teams.insert(roster.team.id, roster.team);
    }
}
