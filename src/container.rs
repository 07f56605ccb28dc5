//! Stat container module.
//!
//! A `StatContainer` keeps, for every `StatKey`, the full ordered history of
//! values together with a running sum, average and max. Every write updates
//! the aggregates in O(1); the average is never recomputed from the history.
//!
//! A `StatRecord` layers a game-id index on top: each game opens one history
//! entry per key, and in-game increments add to that entry.

use crate::error::SimError;
use crate::participant::GameId;
use crate::stat_key::StatKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Running aggregate over the history of one stat key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatHistory {
    values: Vec<f64>,
    sum: f64,
    average: f64,
    max: Option<f64>,
}

impl StatHistory {
    /// Append a new value to the history.
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
        self.sum += value;
        let n = self.values.len() as f64;
        self.average += (value - self.average) / n;
        self.bump_max(value);
    }

    /// Add `delta` to the entry at `index`.
    ///
    /// Only non-negative deltas are accepted by `StatContainer`, so the
    /// running max stays exact without a rescan.
    fn add_at(&mut self, index: usize, delta: f64) {
        let Some(slot) = self.values.get_mut(index) else {
            return;
        };
        *slot += delta;
        let updated = *slot;
        self.sum += delta;
        self.average += delta / self.values.len() as f64;
        self.bump_max(updated);
    }

    fn bump_max(&mut self, value: f64) {
        self.max = Some(match self.max {
            Some(current) if current >= value => current,
            _ => value,
        });
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Mean of all values, `None` while the history is empty.
    pub fn average(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.average)
        }
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

/// Histories for every stat key.
///
/// # Examples
///
/// ```rust
/// use hoopsim::{StatContainer, StatKey};
///
/// let mut stats = StatContainer::new();
/// stats.push(StatKey::Points, 98.0);
/// stats.push(StatKey::Points, 110.0);
///
/// assert_eq!(stats.count(StatKey::Points), 2);
/// assert_eq!(stats.average(StatKey::Points), Some(104.0));
/// assert_eq!(stats.max(StatKey::Points), Some(110.0));
/// assert_eq!(stats.average(StatKey::Assists), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatContainer {
    histories: HashMap<StatKey, StatHistory>,
}

impl StatContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new value to the history of `key`.
    pub fn push(&mut self, key: StatKey, value: f64) {
        self.histories.entry(key).or_default().push(value);
    }

    /// Add a non-negative `delta` to entry `index` of `key`.
    ///
    /// Out-of-range indices are ignored; negative deltas are rejected.
    pub fn add_at(&mut self, key: StatKey, index: usize, delta: f64) -> Result<(), SimError> {
        if delta < 0.0 || delta.is_nan() {
            return Err(SimError::NegativeIncrement { key, delta });
        }
        if let Some(history) = self.histories.get_mut(&key) {
            history.add_at(index, delta);
        }
        Ok(())
    }

    pub fn history(&self, key: StatKey) -> Option<&StatHistory> {
        self.histories.get(&key)
    }

    pub fn latest(&self, key: StatKey) -> Option<f64> {
        self.histories.get(&key).and_then(StatHistory::latest)
    }

    pub fn count(&self, key: StatKey) -> usize {
        self.histories.get(&key).map_or(0, StatHistory::count)
    }

    pub fn sum(&self, key: StatKey) -> f64 {
        self.histories.get(&key).map_or(0.0, StatHistory::sum)
    }

    pub fn average(&self, key: StatKey) -> Option<f64> {
        self.histories.get(&key).and_then(StatHistory::average)
    }

    pub fn max(&self, key: StatKey) -> Option<f64> {
        self.histories.get(&key).and_then(StatHistory::max)
    }
}

/// Per-game stat record of a team or player.
///
/// Each game the owner takes part in gets one entry in every key's history;
/// `games` maps the game id to that entry's index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    container: StatContainer,
    games: HashMap<GameId, usize>,
    order: Vec<GameId>,
}

impl StatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a zeroed entry for `game`. Opening the same game twice is a no-op.
    pub fn open_game(&mut self, game: GameId) {
        if self.games.contains_key(&game) {
            return;
        }
        self.games.insert(game, self.order.len());
        self.order.push(game);
        for key in StatKey::ALL {
            self.container.push(key, 0.0);
        }
    }

    pub fn has_game(&self, game: GameId) -> bool {
        self.games.contains_key(&game)
    }

    /// Add `delta` to `key` for `game`, opening the game entry if needed.
    pub fn increment(&mut self, game: GameId, key: StatKey, delta: f64) -> Result<(), SimError> {
        self.open_game(game);
        let index = self.games[&game];
        self.container.add_at(key, index, delta)
    }

    /// Value of `key` in `game`, or `None` when the game has no entry.
    pub fn game_value(&self, game: GameId, key: StatKey) -> Option<f64> {
        let index = *self.games.get(&game)?;
        self.container.history(key).and_then(|h| h.get(index))
    }

    /// Mean of `key` over every game except `excluding`.
    ///
    /// Used for per-game rates derived from history before a game starts.
    pub fn average_excluding(&self, key: StatKey, excluding: GameId) -> Option<f64> {
        let history = self.container.history(key)?;
        match self.games.get(&excluding) {
            None => history.average(),
            Some(&index) => {
                let count = history.count().saturating_sub(1);
                if count == 0 {
                    return None;
                }
                let own = history.get(index).unwrap_or(0.0);
                Some((history.sum() - own) / count as f64)
            }
        }
    }

    /// Games in the order they were opened.
    pub fn games(&self) -> &[GameId] {
        &self.order
    }

    pub fn container(&self) -> &StatContainer {
        &self.container
    }
}
