//! # hoopsim - Deterministic Basketball Game Simulation Engine
//!
//! A possession-by-possession basketball simulator that provides:
//! - **Deterministic** games (same rosters, config and seed → same game)
//! - **Attribute-driven** outcomes (every probability flows from player ratings)
//! - **Historical** stat tracking (per-game history with O(1) sum, average and max)
//! - **Parallel** slates (independent games on a rayon pool)
//!
//! ## Core Concepts
//!
//! ### Game Pipeline
//!
//! A game is a loop of possessions:
//!
//! ```text
//! [possession] → [clock] → [energy + substitutions] → [swap offense]
//! ```
//!
//! 1. **Possessions** resolve a turnover, a foul or a shot (with rebounds)
//! 2. **The clock** advances by the possession's length
//! 3. **Energy** drains on court, recovers on the bench, and drives substitutions
//! 4. The game ends when the clock runs out without a tie
//!
//! ### Key Features
//!
//! - **Arena Ownership**: the `League` owns every team and player; a game
//!   checks rosters out and hands them back
//! - **Rating Graph**: composite ratings are formulas over attributes and
//!   other ratings, evaluated in dependency order with cycle detection
//! - **Play Log**: every event is recorded with its game-clock timestamp
//! - **Box Scores**: serializable to JSON via serde
//!
//! ## Example
//!
//! ```rust
//! use hoopsim::*;
//!
//! let mut league = League::new();
//! let home = league.add_team("Harbor City");
//! let away = league.add_team("Lakeshore");
//! for (team, level) in [(home, 0.7), (away, 0.4)] {
//!     for i in 0..12 {
//!         league
//!             .add_player(team, format!("P{i}"), Attributes::uniform(level).unwrap())
//!             .unwrap();
//!     }
//! }
//! league.rank_rosters(&RatingModel::standard()).unwrap();
//!
//! let mut game =
//!     GameSimulation::start(&mut league, GameId(1), home, away, GameConfig::default(), 2024)
//!         .unwrap();
//! game.simulate().unwrap();
//!
//! let box_score = game.box_score();
//! assert_eq!(box_score.home.points(), game.score(Side::Home));
//!
//! let play_log = game.release(&mut league);
//! assert!(play_log.last().unwrap().contains("Final"));
//! ```
//!
//! ## Modules
//!
//! - [`game`] - Game simulation (lifecycle, stat surface, queries)
//! - [`possession`] - Possession resolution
//! - [`energy`] - Energy and substitutions
//! - [`container`] - Stat histories and per-game records
//! - [`rating`] - Composite rating graph
//! - [`roster`] - Players, teams and the league arena
//! - [`slate`] - Parallel slate runner
//! - [`error`] - Error types

pub mod attributes;
pub mod box_score;
pub mod clock;
pub mod config;
pub mod container;
pub mod draw;
pub mod energy;
pub mod error;
pub mod game;
pub mod participant;
pub mod possession;
pub mod rating;
pub mod roster;
pub mod slate;
pub mod stat_key;

// Re-export main types for convenience
pub use attributes::{Attribute, Attributes};
pub use box_score::{BoxScore, PlayerLine, TeamBox};
pub use clock::{GameClock, GamePhase, PlayLog};
pub use config::{GameConfig, ShotProfile, ShotProfiles};
pub use container::{StatContainer, StatHistory, StatRecord};
pub use error::SimError;
pub use game::{GameSimulation, ON_COURT};
pub use participant::{GameId, Participant, PlayerId, Side, TeamId};
pub use possession::ShotKind;
pub use rating::{Formula, RatingId, RatingModel, RatingTerm};
pub use roster::{League, Player, Team, TeamRoster, FULL_ENERGY};
pub use slate::{GameReport, Matchup, SlateRunner};
pub use stat_key::StatKey;
