//! Game simulation module.
//!
//! Provides the `GameSimulation` type, the entry point for simulating one
//! game. A game owns both checked-out rosters, the clock, the on-court
//! assignment and the play log for its whole lifetime:
//!
//! ```text
//! NotStarted --tip_off--> InProgress --(clock reaches end, not tied)--> Over
//!                              ^                  |
//!                              +---- overtime ----+  (tied)
//! ```
//!
//! Each `step` resolves one possession, advances the clock by its length,
//! moves energy and runs substitutions, then hands the ball to the other
//! team. Possession resolution lives in `possession.rs`; energy and
//! substitutions in `energy.rs`.

use crate::box_score::BoxScore;
use crate::clock::{GameClock, GamePhase, PlayLog};
use crate::config::GameConfig;
use crate::error::SimError;
use crate::participant::{GameId, Participant, PlayerId, Side, TeamId};
use crate::roster::{League, Player, TeamRoster};
use crate::stat_key::StatKey;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// Number of players each team keeps on court.
pub const ON_COURT: usize = 5;

/// Per-team state held by a running game.
#[derive(Debug)]
pub(crate) struct SideState {
    pub(crate) roster: TeamRoster,
    pub(crate) on_court: Vec<PlayerId>,
    /// Turnovers per minute, fixed at tip-off.
    pub(crate) turnover_rate: f64,
}

/// One basketball game between two checked-out rosters.
///
/// # Examples
///
/// ```rust
/// use hoopsim::{Attributes, GameConfig, GameId, GameSimulation, League, RatingModel};
///
/// let mut league = League::new();
/// let home = league.add_team("Home");
/// let away = league.add_team("Away");
/// for team in [home, away] {
///     for i in 0..12 {
///         league.add_player(team, format!("P{i}"), Attributes::uniform(0.5).unwrap()).unwrap();
///     }
/// }
/// league.rank_rosters(&RatingModel::standard()).unwrap();
///
/// let mut game =
///     GameSimulation::start(&mut league, GameId(1), home, away, GameConfig::default(), 42)
///         .unwrap();
/// assert!(league.team(home).is_none());
/// game.simulate().unwrap();
///
/// assert!(game.is_over());
/// let winner = game.winner().unwrap();
/// assert_eq!(game.winner().unwrap(), winner);
///
/// game.release(&mut league);
/// assert!(league.team(home).is_some());
/// ```
#[derive(Debug)]
pub struct GameSimulation {
    pub(crate) id: GameId,
    pub(crate) config: GameConfig,
    pub(crate) sides: [SideState; 2],
    pub(crate) clock: GameClock,
    phase: GamePhase,
    pub(crate) offense: Side,
    pub(crate) log: PlayLog,
    pub(crate) rng: ChaCha8Rng,
    /// Points per period, `[home, away]`.
    line_score: Vec<[u32; 2]>,
    tiebreak: Option<Side>,
}

impl GameSimulation {
    /// Check both teams out of `league` and tip the game off.
    ///
    /// If either team cannot be checked out or the game cannot tip off, every
    /// roster already taken is checked back in before the error is returned.
    pub fn start(
        league: &mut League,
        id: GameId,
        home: TeamId,
        away: TeamId,
        config: GameConfig,
        seed: u64,
    ) -> Result<Self, SimError> {
        let home_roster = league.check_out(home)?;
        let away_roster = match league.check_out(away) {
            Ok(roster) => roster,
            Err(e) => {
                league.check_in(home_roster);
                return Err(e);
            }
        };
        let mut game = Self::prepare(id, home_roster, away_roster, config, seed);
        if let Err(e) = game.tip_off() {
            game.release(league);
            return Err(e);
        }
        Ok(game)
    }

    /// Build a game in the `NotStarted` phase from rosters already checked
    /// out. The game owns them until [`GameSimulation::release`] or
    /// [`GameSimulation::into_rosters`], whether or not it tips off.
    pub fn prepare(
        id: GameId,
        home: TeamRoster,
        away: TeamRoster,
        config: GameConfig,
        seed: u64,
    ) -> Self {
        let clock = GameClock::new(&config);
        let side = |roster| SideState {
            roster,
            on_court: Vec::with_capacity(ON_COURT),
            turnover_rate: config.default_turnover_rate,
        };
        let sides = [side(home), side(away)];
        Self {
            id,
            sides,
            clock,
            phase: GamePhase::NotStarted,
            offense: Side::Home,
            log: PlayLog::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            line_score: vec![[0, 0]],
            tiebreak: None,
            config,
        }
    }

    /// Validate rosters, reset energy, pick starters and flip for the ball.
    pub fn tip_off(&mut self) -> Result<(), SimError> {
        if self.phase != GamePhase::NotStarted {
            return Ok(());
        }
        self.config.validate()?;

        let game = self.id;
        let minutes = f64::from(self.config.regulation_seconds()) / 60.0;
        let default_rate = self.config.default_turnover_rate;
        for state in &mut self.sides {
            let team_id = state.roster.team.id;
            let starters: Vec<PlayerId> = state
                .roster
                .team
                .roster()
                .iter()
                .copied()
                .filter(|id| state.roster.players.contains_key(id))
                .take(ON_COURT)
                .collect();
            if starters.len() < ON_COURT {
                return Err(SimError::NotEnoughPlayers {
                    team: team_id,
                    eligible: starters.len(),
                });
            }

            state.turnover_rate = state
                .roster
                .team
                .stats()
                .average_excluding(StatKey::Turnovers, game)
                .map(|per_game| (per_game / minutes).clamp(0.0, 1.0))
                .unwrap_or(default_rate);
            state.roster.team.stats_mut().open_game(game);

            for player in state.roster.players.values_mut() {
                player.reset_energy();
            }
            for id in &starters {
                if let Some(player) = state.roster.players.get_mut(id) {
                    player.stats_mut().open_game(game);
                }
            }
            state.on_court = starters;
        }

        self.offense = if self.rng.gen_bool(0.5) {
            Side::Home
        } else {
            Side::Away
        };
        self.phase = GamePhase::InProgress;
        let text = format!("{} win the tip-off", self.team_name(self.offense));
        self.log.push(&self.clock, text);
        info!(
            game = self.id.0,
            home = %self.sides[0].roster.team.name,
            away = %self.sides[1].roster.team.name,
            "tip-off"
        );
        Ok(())
    }

    /// Resolve one possession.
    ///
    /// Returns the seconds charged to the clock, or `None` once the game is
    /// over (nothing is mutated in that case).
    pub fn step(&mut self) -> Result<Option<u32>, SimError> {
        match self.phase {
            GamePhase::NotStarted => self.tip_off()?,
            GamePhase::Over => return Ok(None),
            GamePhase::InProgress => {}
        }

        let period = self.clock.period();
        let before = [self.score(Side::Home), self.score(Side::Away)];
        let seconds = self.resolve_possession()?;
        self.clock.advance(seconds);
        self.apply_energy(seconds)?;

        let slot = period as usize - 1;
        if self.line_score.len() <= slot {
            self.line_score.resize(slot + 1, [0, 0]);
        }
        for side in Side::BOTH {
            let gained = self.score(side) - before[side.index()];
            self.line_score[slot][side.index()] += gained;
        }

        self.offense = self.offense.other();
        self.check_end();
        Ok(Some(seconds))
    }

    /// Run possessions until the game is over.
    pub fn simulate(&mut self) -> Result<(), SimError> {
        while self.step()?.is_some() {}
        Ok(())
    }

    fn check_end(&mut self) {
        if !self.clock.at_end() {
            return;
        }
        let home = self.score(Side::Home);
        let away = self.score(Side::Away);
        if home == away {
            if self.clock.overtime_periods() < self.config.max_overtime_periods {
                self.clock.add_overtime();
                let text = format!("Tied at {}-{}, heading to overtime", home, away);
                self.log.push(&self.clock, text);
                debug!(game = self.id.0, periods = self.clock.overtime_periods(), "overtime");
                return;
            }
            self.tiebreak = Some(Side::Home);
            warn!(
                game = self.id.0,
                score = home,
                "still tied after overtime limit, home team wins the tiebreak"
            );
            let text = format!(
                "Still tied after {} overtime periods, {} win on the home-court tiebreak",
                self.clock.overtime_periods(),
                self.team_name(Side::Home)
            );
            self.log.push(&self.clock, text);
        }

        self.phase = GamePhase::Over;
        let text = format!(
            "Final: {} {}, {} {}",
            self.team_name(Side::Home),
            home,
            self.team_name(Side::Away),
            away
        );
        self.log.push(&self.clock, text);
        info!(game = self.id.0, home, away, "final");
    }

    // === Stat accumulation surface ===

    /// Add `delta` to a team's or player's stat for this game.
    ///
    /// Increments are the only mutation path; negative deltas are rejected.
    pub fn increment(
        &mut self,
        who: Participant,
        key: StatKey,
        delta: f64,
    ) -> Result<(), SimError> {
        let game = self.id;
        match who {
            Participant::Team(team) => {
                let side = self.side_of_team(team)?;
                self.sides[side.index()]
                    .roster
                    .team
                    .stats_mut()
                    .increment(game, key, delta)
            }
            Participant::Player(player) => {
                let side = self.side_of_player(player)?;
                self.player_mut(side, player)?
                    .stats_mut()
                    .increment(game, key, delta)
            }
        }
    }

    /// Credit `key` to both a player and their team.
    pub(crate) fn credit(
        &mut self,
        side: Side,
        player: PlayerId,
        key: StatKey,
        delta: f64,
    ) -> Result<(), SimError> {
        let game = self.id;
        self.player_mut(side, player)?
            .stats_mut()
            .increment(game, key, delta)?;
        self.sides[side.index()]
            .roster
            .team
            .stats_mut()
            .increment(game, key, delta)
    }

    pub(crate) fn credit_team(&mut self, side: Side, key: StatKey, delta: f64) -> Result<(), SimError> {
        let game = self.id;
        self.sides[side.index()]
            .roster
            .team
            .stats_mut()
            .increment(game, key, delta)
    }

    pub(crate) fn player_mut(&mut self, side: Side, id: PlayerId) -> Result<&mut Player, SimError> {
        self.sides[side.index()]
            .roster
            .players
            .get_mut(&id)
            .ok_or(SimError::UnknownPlayer(id))
    }

    // === Queries ===

    /// Id this game records its stats under.
    pub fn id(&self) -> GameId {
        self.id
    }

    /// Tuning this game runs with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Whether the final horn has sounded.
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// Side with the ball for the next possession.
    pub fn offense(&self) -> Side {
        self.offense
    }

    /// Team playing on `side`.
    pub fn team_id(&self, side: Side) -> TeamId {
        self.sides[side.index()].roster.team.id
    }

    pub fn team_name(&self, side: Side) -> &str {
        &self.sides[side.index()].roster.team.name
    }

    pub fn roster(&self, side: Side) -> &TeamRoster {
        &self.sides[side.index()].roster
    }

    /// Points scored by `side` so far.
    pub fn score(&self, side: Side) -> u32 {
        self.sides[side.index()]
            .roster
            .team
            .game_stat(self.id, StatKey::Points) as u32
    }

    pub fn side_of_team(&self, team: TeamId) -> Result<Side, SimError> {
        Side::BOTH
            .into_iter()
            .find(|side| self.team_id(*side) == team)
            .ok_or(SimError::UnknownTeam(team))
    }

    pub fn side_of_player(&self, player: PlayerId) -> Result<Side, SimError> {
        Side::BOTH
            .into_iter()
            .find(|side| self.sides[side.index()].roster.players.contains_key(&player))
            .ok_or(SimError::UnknownPlayer(player))
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, SimError> {
        let side = self.side_of_player(id)?;
        self.sides[side.index()]
            .roster
            .players
            .get(&id)
            .ok_or(SimError::UnknownPlayer(id))
    }

    /// Players currently on court for `team`.
    pub fn on_court(&self, team: TeamId) -> Result<&[PlayerId], SimError> {
        let side = self.side_of_team(team)?;
        Ok(&self.sides[side.index()].on_court)
    }

    /// Turnovers per minute `team` plays with in this game.
    ///
    /// Taken from the team's completed games at tip-off, or the configured
    /// default when it has none.
    pub fn turnover_rate(&self, team: TeamId) -> Result<f64, SimError> {
        let side = self.side_of_team(team)?;
        Ok(self.sides[side.index()].turnover_rate)
    }

    /// Value of `key` for `team` in this game.
    pub fn team_stat(&self, team: TeamId, key: StatKey) -> Result<f64, SimError> {
        let side = self.side_of_team(team)?;
        Ok(self.sides[side.index()].roster.team.game_stat(self.id, key))
    }

    /// Sum of `key` over every game `team` has played, this one included.
    pub fn team_stat_total(&self, team: TeamId, key: StatKey) -> Result<f64, SimError> {
        let side = self.side_of_team(team)?;
        Ok(self.sides[side.index()].roster.team.stats().container().sum(key))
    }

    /// Per-game average of `key` for `team`, this game included.
    pub fn team_stat_average(&self, team: TeamId, key: StatKey) -> Result<Option<f64>, SimError> {
        let side = self.side_of_team(team)?;
        Ok(self.sides[side.index()]
            .roster
            .team
            .stats()
            .container()
            .average(key))
    }

    /// Value of `key` for `player` in this game (0 if they have not played).
    pub fn player_stat(&self, player: PlayerId, key: StatKey) -> Result<f64, SimError> {
        Ok(self.player(player)?.game_stat(self.id, key))
    }

    /// Sum of `key` over every game `player` has appeared in.
    pub fn player_stat_total(&self, player: PlayerId, key: StatKey) -> Result<f64, SimError> {
        Ok(self.player(player)?.stats().container().sum(key))
    }

    /// Per-game average of `key` for `player` over the games they appeared in.
    pub fn player_stat_average(
        &self,
        player: PlayerId,
        key: StatKey,
    ) -> Result<Option<f64>, SimError> {
        Ok(self.player(player)?.stats().container().average(key))
    }

    /// Whether `player` has taken the court in this game.
    pub fn appeared(&self, player: PlayerId) -> Result<bool, SimError> {
        Ok(self.player(player)?.stats().has_game(self.id))
    }

    fn winning_side(&self) -> Result<Side, SimError> {
        if !self.is_over() {
            return Err(SimError::GameNotOver(self.id.0));
        }
        let home = self.score(Side::Home);
        let away = self.score(Side::Away);
        Ok(if home > away {
            Side::Home
        } else if away > home {
            Side::Away
        } else {
            self.tiebreak.unwrap_or(Side::Home)
        })
    }

    /// Team that won.
    ///
    /// Returns [`SimError::GameNotOver`] until the game is over. A game still
    /// tied after the overtime limit goes to the home team.
    pub fn winner(&self) -> Result<TeamId, SimError> {
        Ok(self.team_id(self.winning_side()?))
    }

    /// Team that lost; same rules as [`GameSimulation::winner`].
    pub fn loser(&self) -> Result<TeamId, SimError> {
        Ok(self.team_id(self.winning_side()?.other()))
    }

    /// Whether the result was decided by the tiebreak rule.
    pub fn decided_by_tiebreak(&self) -> bool {
        self.tiebreak.is_some()
    }

    /// Points per period, `[home, away]`; overtime periods follow the fourth.
    ///
    /// A possession's points count toward the period it started in, the same
    /// period its play-log entries are stamped with, even when its length
    /// runs past the end of that period.
    pub fn line_score(&self) -> &[[u32; 2]] {
        &self.line_score
    }

    /// Play-by-play so far, each entry prefixed with its game-clock time.
    pub fn play_log(&self) -> &[String] {
        self.log.entries()
    }

    pub fn box_score(&self) -> BoxScore {
        BoxScore::from_game(self)
    }

    /// Check both rosters back into `league` and return the play log.
    pub fn release(self, league: &mut League) -> Vec<String> {
        let (log, home, away) = self.finish();
        league.check_in(home);
        league.check_in(away);
        log
    }

    /// Give the rosters back for check-in, `(home, away)`.
    pub fn into_rosters(self) -> (TeamRoster, TeamRoster) {
        let [home, away] = self.sides;
        (home.roster, away.roster)
    }

    /// Give the play log and rosters back.
    pub fn finish(self) -> (Vec<String>, TeamRoster, TeamRoster) {
        let [home, away] = self.sides;
        (self.log.into_entries(), home.roster, away.roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;

    fn league(level: f64) -> (League, TeamId, TeamId) {
        let mut league = League::new();
        let home = league.add_team("Home");
        let away = league.add_team("Away");
        for team in [home, away] {
            for i in 0..12 {
                league
                    .add_player(team, format!("P{i}"), Attributes::uniform(level).unwrap())
                    .unwrap();
            }
        }
        (league, home, away)
    }

    /// No fouls, turnovers or steals; shots go in at the shooter's rating.
    fn clean_config() -> GameConfig {
        let mut config = GameConfig {
            default_turnover_rate: 0.0,
            non_shooting_foul: 0.0,
            steal: 0.0,
            ..GameConfig::default()
        };
        for profile in [
            &mut config.shots.three,
            &mut config.shots.mid_range,
            &mut config.shots.layup,
            &mut config.shots.dunk,
        ] {
            profile.foul = 0.0;
            profile.block = 0.0;
            profile.and_one = 0.0;
            profile.make_scale = 1.0;
        }
        config
    }

    #[test]
    fn test_scoreless_game_goes_to_home_tiebreak() {
        let (mut league, home, away) = league(0.0);
        let mut game = GameSimulation::start(&mut league, GameId(1), home, away, clean_config(), 6)
            .unwrap();
        game.simulate().unwrap();

        assert_eq!(game.score(Side::Home), 0);
        assert_eq!(game.score(Side::Away), 0);
        assert_eq!(game.clock().overtime_periods(), 4);
        assert!(game.decided_by_tiebreak());
        assert_eq!(game.winner().unwrap(), home);
        assert_eq!(game.loser().unwrap(), away);
        assert_eq!(game.line_score().len(), 8);

        let overtimes = game
            .play_log()
            .iter()
            .filter(|line| line.contains("heading to overtime"))
            .count();
        assert_eq!(overtimes, 4);
        assert!(game.play_log().iter().any(|line| line.contains("home-court tiebreak")));
        assert!(game.clock().elapsed() >= game.clock().regulation() + 4 * 300);
    }

    #[test]
    fn test_no_overtime_allowed() {
        let (mut league, home, away) = league(0.0);
        let config = GameConfig {
            max_overtime_periods: 0,
            ..clean_config()
        };
        let mut game = GameSimulation::start(&mut league, GameId(1), home, away, config, 6).unwrap();
        game.simulate().unwrap();

        assert_eq!(game.clock().overtime_periods(), 0);
        assert!(game.decided_by_tiebreak());
        assert_eq!(game.winner().unwrap(), home);
        assert_eq!(game.line_score().len(), 4);
    }

    #[test]
    fn test_possession_points_stay_in_starting_period() {
        let (mut league, home, away) = league(1.0);
        let config = GameConfig {
            min_possession: 24,
            assist: 0.0,
            ..clean_config()
        };
        let mut game = GameSimulation::start(&mut league, GameId(1), home, away, config, 3).unwrap();
        game.offense = Side::Home;
        game.clock.advance(710);

        assert_eq!(game.step().unwrap(), Some(24));
        assert_eq!(game.clock().period(), 2);
        assert_eq!(game.line_score(), &[[3, 0]]);
        assert!(game
            .play_log()
            .iter()
            .any(|line| line.starts_with("[Q1 00:10]") && line.contains("makes a three-pointer")));

        // The reply is charged to the second quarter.
        game.step().unwrap();
        assert_eq!(game.line_score(), &[[3, 0], [0, 3]]);
    }
}
