//! Game configuration.
//!
//! Every tuning constant of the engine lives in `GameConfig`, which is
//! handed to a game at construction and never changes afterwards. Missing
//! fields fall back to their defaults when loading from JSON.

use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Tuning for one shot type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotProfile {
    /// Chance of a shooting foul, checked before the shot is contested.
    pub foul: f64,
    /// Chance a defender contests for a block.
    pub block: f64,
    /// Multiplier applied to the shooter's attribute to get the make chance.
    pub make_scale: f64,
    /// Chance a made shot is also fouled.
    pub and_one: f64,
}

impl ShotProfile {
    const fn new(foul: f64, block: f64, make_scale: f64, and_one: f64) -> Self {
        Self {
            foul,
            block,
            make_scale,
            and_one,
        }
    }
}

/// Per-shot-type profiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotProfiles {
    pub three: ShotProfile,
    pub mid_range: ShotProfile,
    pub layup: ShotProfile,
    pub dunk: ShotProfile,
}

impl Default for ShotProfiles {
    fn default() -> Self {
        Self {
            three: ShotProfile::new(0.02, 0.03, 0.45, 0.01),
            mid_range: ShotProfile::new(0.05, 0.04, 0.55, 0.02),
            layup: ShotProfile::new(0.10, 0.08, 0.70, 0.05),
            dunk: ShotProfile::new(0.08, 0.06, 0.95, 0.06),
        }
    }
}

/// Immutable engine configuration.
///
/// # Examples
///
/// ```rust
/// use hoopsim::GameConfig;
///
/// let config = GameConfig::from_json(r#"{ "quarter_minutes": 10, "foul_limit": 5 }"#).unwrap();
/// assert_eq!(config.regulation_seconds(), 2400);
/// assert_eq!(config.foul_limit, 5);
/// assert_eq!(config.shot_clock, 24);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Clock ===
    pub quarter_minutes: u32,
    /// Longest possession in seconds.
    pub shot_clock: u32,
    /// Shortest possession in seconds.
    pub min_possession: u32,
    pub overtime_minutes: u32,
    /// Overtime periods played before the home-court tiebreak decides.
    pub max_overtime_periods: u32,
    /// Score margin at which the last possession of the game is skipped.
    pub blowout_margin: u32,

    // === Possession ===
    /// Turnovers per minute used when a team has no turnover history. A
    /// possession's turnover chance is this rate times its length in minutes.
    pub default_turnover_rate: f64,
    pub non_shooting_foul: f64,
    /// Share of non-shooting fouls committed by the defense.
    pub defensive_foul_share: f64,
    pub steal: f64,
    /// Three-point attribute above which a shooter attempts a three.
    pub three_point_cutoff: f64,
    pub shots: ShotProfiles,
    pub assist: f64,
    pub defensive_rebound: f64,
    /// Offensive rebounds allowed to restart a shot within one possession.
    pub max_rebound_chain: u32,

    // === Fouls and energy ===
    pub foul_limit: u32,
    /// Energy at or below which a player is subbed out.
    pub fatigue_threshold: f64,
    /// Energy moved per possession is `seconds / energy_divisor`.
    pub energy_divisor: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            quarter_minutes: 12,
            shot_clock: 24,
            min_possession: 4,
            overtime_minutes: 5,
            max_overtime_periods: 4,
            blowout_margin: 20,

            default_turnover_rate: 0.3,
            non_shooting_foul: 0.05,
            defensive_foul_share: 0.75,
            steal: 0.08,
            three_point_cutoff: 0.6,
            shots: ShotProfiles::default(),
            assist: 0.57,
            defensive_rebound: 0.75,
            max_rebound_chain: 4,

            foul_limit: 6,
            fatigue_threshold: 0.6,
            energy_divisor: 1000.0,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn regulation_seconds(&self) -> u32 {
        4 * 60 * self.quarter_minutes
    }

    pub fn quarter_seconds(&self) -> u32 {
        60 * self.quarter_minutes
    }

    pub fn overtime_seconds(&self) -> u32 {
        60 * self.overtime_minutes
    }

    /// Check ranges of every field.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.quarter_minutes == 0 {
            return Err(SimError::InvalidConfig("quarter_minutes must be > 0".into()));
        }
        if self.overtime_minutes == 0 {
            return Err(SimError::InvalidConfig("overtime_minutes must be > 0".into()));
        }
        if self.min_possession == 0 || self.min_possession > self.shot_clock {
            return Err(SimError::InvalidConfig(format!(
                "min_possession must be in 1..={}, got {}",
                self.shot_clock, self.min_possession
            )));
        }
        if self.foul_limit == 0 {
            return Err(SimError::InvalidConfig("foul_limit must be > 0".into()));
        }
        if self.energy_divisor.is_nan() || self.energy_divisor <= 0.0 {
            return Err(SimError::InvalidConfig("energy_divisor must be > 0".into()));
        }

        let mut probabilities = vec![
            ("default_turnover_rate", self.default_turnover_rate),
            ("non_shooting_foul", self.non_shooting_foul),
            ("defensive_foul_share", self.defensive_foul_share),
            ("steal", self.steal),
            ("three_point_cutoff", self.three_point_cutoff),
            ("assist", self.assist),
            ("defensive_rebound", self.defensive_rebound),
            ("fatigue_threshold", self.fatigue_threshold),
        ];
        for (name, profile) in [
            ("three", self.shots.three),
            ("mid_range", self.shots.mid_range),
            ("layup", self.shots.layup),
            ("dunk", self.shots.dunk),
        ] {
            probabilities.push((name, profile.foul));
            probabilities.push((name, profile.block));
            probabilities.push((name, profile.and_one));
            if profile.make_scale.is_nan() || profile.make_scale < 0.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{name}.make_scale must be >= 0"
                )));
            }
        }
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}
