//! Parallel slate runner.
//!
//! A slate is a set of games played at the same time. Every team may appear
//! in at most one game of a slate; the runner checks each pair of rosters
//! out of the league, plays the games on a rayon pool and checks every
//! roster back in, whether or not its game succeeded.
//!
//! Each game gets its own seed derived from the slate seed and the game id,
//! so results do not depend on thread count or scheduling.

use crate::box_score::BoxScore;
use crate::config::GameConfig;
use crate::error::SimError;
use crate::game::GameSimulation;
use crate::participant::{GameId, TeamId};
use crate::roster::{League, TeamRoster};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// One scheduled game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matchup {
    pub game: GameId,
    pub home: TeamId,
    pub away: TeamId,
}

impl Matchup {
    pub fn new(game: GameId, home: TeamId, away: TeamId) -> Self {
        Self { game, home, away }
    }
}

/// Result of one game in a slate.
#[derive(Debug, Clone)]
pub struct GameReport {
    pub game: GameId,
    pub box_score: BoxScore,
    pub play_log: Vec<String>,
    pub winner: TeamId,
    pub loser: TeamId,
    /// Index of the pool thread that played the game.
    pub worker: Option<usize>,
    pub elapsed: Duration,
}

/// Seed for one game of a slate.
pub fn game_seed(slate_seed: u64, game: GameId) -> u64 {
    slate_seed ^ game.0.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Runs slates of games on a dedicated thread pool.
///
/// # Examples
///
/// ```rust
/// use hoopsim::{Attributes, GameConfig, GameId, League, Matchup, SlateRunner};
///
/// let mut league = League::new();
/// let teams: Vec<_> = (0..4).map(|i| league.add_team(format!("Team {i}"))).collect();
/// for team in &teams {
///     for i in 0..10 {
///         league.add_player(*team, format!("P{i}"), Attributes::uniform(0.5).unwrap()).unwrap();
///     }
/// }
///
/// let runner = SlateRunner::new(2, GameConfig::default()).unwrap();
/// let slate = [
///     Matchup::new(GameId(1), teams[0], teams[1]),
///     Matchup::new(GameId(2), teams[2], teams[3]),
/// ];
/// let reports = runner.run(&mut league, &slate, 7).unwrap();
/// assert_eq!(reports.len(), 2);
/// assert!(league.team(teams[0]).is_some());
/// ```
pub struct SlateRunner {
    pool: rayon::ThreadPool,
    config: GameConfig,
}

impl SlateRunner {
    /// Build a runner with `threads` workers (0 lets rayon decide).
    pub fn new(threads: usize, config: GameConfig) -> Result<Self, SimError> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hoopsim-{i}"))
            .build()
            .map_err(|e| SimError::WorkerPool(e.to_string()))?;
        Ok(Self { pool, config })
    }

    /// Tuning every game on the slate runs with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Worker threads in the pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Play every matchup and return the reports in slate order.
    ///
    /// Fails before any game starts if a team is booked twice or unknown.
    /// If a game fails, the other games still finish and all rosters are
    /// checked back in before the first error is returned.
    pub fn run(
        &self,
        league: &mut League,
        matchups: &[Matchup],
        seed: u64,
    ) -> Result<Vec<GameReport>, SimError> {
        let mut booked = BTreeSet::new();
        for matchup in matchups {
            for team in [matchup.home, matchup.away] {
                if !booked.insert(team) {
                    return Err(SimError::DoubleBooked(team));
                }
            }
        }

        let started = Instant::now();
        let mut checked_out: Vec<(Matchup, TeamRoster, TeamRoster)> =
            Vec::with_capacity(matchups.len());
        for matchup in matchups {
            let pair = league.check_out(matchup.home).and_then(|home| {
                match league.check_out(matchup.away) {
                    Ok(away) => Ok((home, away)),
                    Err(e) => {
                        league.check_in(home);
                        Err(e)
                    }
                }
            });
            match pair {
                Ok((home, away)) => checked_out.push((*matchup, home, away)),
                Err(e) => {
                    for (_, home, away) in checked_out {
                        league.check_in(home);
                        league.check_in(away);
                    }
                    return Err(e);
                }
            }
        }

        let config = &self.config;
        let results: Vec<_> = self.pool.install(|| {
            checked_out
                .into_par_iter()
                .map(|(matchup, home, away)| play(matchup, home, away, config.clone(), seed))
                .collect()
        });

        let mut reports = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (result, home, away) in results {
            league.check_in(home);
            league.check_in(away);
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        info!(
            games = reports.len(),
            threads = self.threads(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "slate complete"
        );
        Ok(reports)
    }
}

fn play(
    matchup: Matchup,
    home: TeamRoster,
    away: TeamRoster,
    config: GameConfig,
    slate_seed: u64,
) -> (Result<GameReport, SimError>, TeamRoster, TeamRoster) {
    let started = Instant::now();
    let worker = rayon::current_thread_index();
    let seed = game_seed(slate_seed, matchup.game);
    let mut game = GameSimulation::prepare(matchup.game, home, away, config, seed);

    let outcome = run_game(&mut game);
    let (play_log, home, away) = game.finish();
    let report = outcome.map(|(box_score, winner, loser)| {
        let elapsed = started.elapsed();
        debug!(
            game = matchup.game.0,
            worker = ?worker,
            elapsed_us = elapsed.as_micros() as u64,
            "game played"
        );
        GameReport {
            game: matchup.game,
            box_score,
            play_log,
            winner,
            loser,
            worker,
            elapsed,
        }
    });
    (report, home, away)
}

fn run_game(game: &mut GameSimulation) -> Result<(BoxScore, TeamId, TeamId), SimError> {
    game.tip_off()?;
    game.simulate()?;
    Ok((game.box_score(), game.winner()?, game.loser()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_seeds_differ() {
        assert_ne!(game_seed(1, GameId(1)), game_seed(1, GameId(2)));
        assert_eq!(game_seed(5, GameId(0)), 5);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            quarter_minutes: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            SlateRunner::new(1, config),
            Err(SimError::InvalidConfig(_))
        ));
    }
}
