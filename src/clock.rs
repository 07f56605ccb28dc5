//! Game clock.
//!
//! Tracks elapsed seconds, the period structure (four quarters plus any
//! overtime periods) and the lifecycle phase of a game.

use crate::config::GameConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    NotStarted,
    InProgress,
    Over,
}

/// Elapsed time and period boundaries.
///
/// # Examples
///
/// ```rust
/// use hoopsim::{GameClock, GameConfig};
///
/// let mut clock = GameClock::new(&GameConfig::default());
/// clock.advance(30);
/// assert_eq!(clock.period(), 1);
/// assert_eq!(clock.to_string(), "Q1 11:30");
/// clock.advance(2850);
/// assert!(clock.at_end());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    elapsed: u32,
    quarter: u32,
    overtime: u32,
    /// Game length including any overtime periods added so far.
    end: u32,
    /// Second at which each overtime period started.
    overtime_starts: Vec<u32>,
}

impl GameClock {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            elapsed: 0,
            quarter: config.quarter_seconds(),
            overtime: config.overtime_seconds(),
            end: config.regulation_seconds(),
            overtime_starts: Vec::new(),
        }
    }

    /// Seconds played so far.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Second at which the game currently ends.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Length of regulation in seconds.
    pub fn regulation(&self) -> u32 {
        4 * self.quarter
    }

    /// Overtime periods added so far.
    pub fn overtime_periods(&self) -> u32 {
        self.overtime_starts.len() as u32
    }

    /// Move the clock forward by `seconds`.
    pub fn advance(&mut self, seconds: u32) {
        self.elapsed += seconds;
    }

    /// Whether the current game length has been played.
    pub fn at_end(&self) -> bool {
        self.elapsed >= self.end
    }

    /// Whether a possession of `seconds` starting now reaches the end.
    pub fn reaches_end(&self, seconds: u32) -> bool {
        self.elapsed + seconds >= self.end
    }

    /// Extend the game by one full overtime period.
    ///
    /// The period starts where the previous one actually ended, so time a
    /// possession ran past the horn is not taken out of overtime.
    pub fn add_overtime(&mut self) {
        let start = self.end.max(self.elapsed);
        self.overtime_starts.push(start);
        self.end = start + self.overtime;
    }

    /// 1-based period containing the current second.
    pub fn period(&self) -> u32 {
        self.period_at(self.elapsed)
    }

    /// 1-based period containing `second`.
    ///
    /// Time a possession runs past the end of the fourth quarter still
    /// counts as the fourth quarter.
    pub fn period_at(&self, second: u32) -> u32 {
        if second < self.regulation() {
            return second / self.quarter + 1;
        }
        let started = self
            .overtime_starts
            .iter()
            .filter(|start| **start <= second)
            .count() as u32;
        4 + started
    }

    /// Seconds left in the current period.
    pub fn remaining_in_period(&self) -> u32 {
        let period = self.period();
        let period_end = match period.checked_sub(5) {
            None => period * self.quarter,
            Some(index) => self
                .overtime_starts
                .get(index as usize)
                .map_or(self.end, |start| start + self.overtime),
        };
        period_end.saturating_sub(self.elapsed)
    }
}

impl fmt::Display for GameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let period = self.period();
        let remaining = self.remaining_in_period();
        let label = if period <= 4 {
            format!("Q{}", period)
        } else {
            format!("OT{}", period - 4)
        };
        write!(f, "{} {:02}:{:02}", label, remaining / 60, remaining % 60)
    }
}

/// Ordered, append-only play-by-play log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayLog {
    entries: Vec<String>,
}

impl PlayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` stamped with the current period and time left.
    pub fn push(&mut self, clock: &GameClock, text: impl AsRef<str>) {
        self.entries.push(format!("[{}] {}", clock, text.as_ref()));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}
