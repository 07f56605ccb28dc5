//! Player attributes.
//!
//! Every player carries the same fixed set of named attributes, each a real
//! number in `[0, 1]`. Attributes are immutable for the duration of a game.

use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// A named player attribute.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Height,
    Strength,
    Speed,
    InsideScoring,
    MidRange,
    ThreePoint,
    Dunk,
    FreeThrow,
    OffensiveRebound,
    DefensiveRebound,
    InsideDefense,
    PerimeterDefense,
    Assist,
    /// Ball security: higher is fewer giveaways.
    Turnover,
}

impl Attribute {
    pub const COUNT: usize = 14;

    pub const ALL: [Attribute; Attribute::COUNT] = [
        Attribute::Height,
        Attribute::Strength,
        Attribute::Speed,
        Attribute::InsideScoring,
        Attribute::MidRange,
        Attribute::ThreePoint,
        Attribute::Dunk,
        Attribute::FreeThrow,
        Attribute::OffensiveRebound,
        Attribute::DefensiveRebound,
        Attribute::InsideDefense,
        Attribute::PerimeterDefense,
        Attribute::Assist,
        Attribute::Turnover,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Height => "height",
            Attribute::Strength => "strength",
            Attribute::Speed => "speed",
            Attribute::InsideScoring => "inside_scoring",
            Attribute::MidRange => "mid_range",
            Attribute::ThreePoint => "three_point",
            Attribute::Dunk => "dunk",
            Attribute::FreeThrow => "free_throw",
            Attribute::OffensiveRebound => "offensive_rebound",
            Attribute::DefensiveRebound => "defensive_rebound",
            Attribute::InsideDefense => "inside_defense",
            Attribute::PerimeterDefense => "perimeter_defense",
            Attribute::Assist => "assist",
            Attribute::Turnover => "turnover",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The full attribute set of one player.
///
/// # Examples
///
/// ```rust
/// use hoopsim::{Attribute, Attributes};
///
/// let attrs = Attributes::uniform(0.5)
///     .unwrap()
///     .with(Attribute::ThreePoint, 0.9)
///     .unwrap();
///
/// assert_eq!(attrs.get(Attribute::ThreePoint), 0.9);
/// assert_eq!(attrs.get(Attribute::Height), 0.5);
/// assert!(Attributes::uniform(1.2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    values: [f64; Attribute::COUNT],
}

impl Attributes {
    /// Every attribute set to `value`.
    pub fn uniform(value: f64) -> Result<Self, SimError> {
        check_range(Attribute::Height, value)?;
        Ok(Self {
            values: [value; Attribute::COUNT],
        })
    }

    /// Build from `(attribute, value)` pairs; attributes not listed are 0.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (Attribute, f64)>,
    ) -> Result<Self, SimError> {
        let mut attrs = Self {
            values: [0.0; Attribute::COUNT],
        };
        for (attribute, value) in pairs {
            attrs = attrs.with(attribute, value)?;
        }
        Ok(attrs)
    }

    /// Return a copy with one attribute replaced.
    pub fn with(mut self, attribute: Attribute, value: f64) -> Result<Self, SimError> {
        check_range(attribute, value)?;
        self.values[attribute.index()] = value;
        Ok(self)
    }

    pub fn get(&self, attribute: Attribute) -> f64 {
        self.values[attribute.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        Attribute::ALL.iter().map(move |&a| (a, self.get(a)))
    }
}

fn check_range(attribute: Attribute, value: f64) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::AttributeOutOfRange {
            name: attribute.as_str(),
            value,
        })
    }
}
