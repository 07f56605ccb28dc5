//! Possession resolution.
//!
//! One possession is resolved top-down, first applicable branch wins:
//!
//! 1. draw the possession length in `[min_possession, shot_clock]`
//! 2. garbage time: last possession of the game in a blowout, time only
//! 3. turnover, at the offense's per-minute turnover rate scaled to the
//!    possession's length
//! 4. non-shooting foul (defense: two free throws; offense: offensive foul)
//! 5. shot: steal check, shot selection, shooting foul, block, make,
//!    assist and and-one; a miss goes to the rebound, and an offensive
//!    rebound restarts the shot without charging the clock again
//!
//! Every resolved event is credited to the stat surface and appended to the
//! play log immediately, in the order it happens.

use crate::attributes::Attribute;
use crate::config::{ShotProfile, ShotProfiles};
use crate::draw::{chance, pick, rank_weighted};
use crate::error::SimError;
use crate::game::GameSimulation;
use crate::participant::{PlayerId, Side};
use crate::stat_key::StatKey;
use rand::Rng;
use tracing::debug;

/// The shot a player attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotKind {
    Three,
    MidRange,
    Layup,
    Dunk,
}

impl ShotKind {
    pub fn points(self) -> u32 {
        match self {
            ShotKind::Three => 3,
            _ => 2,
        }
    }

    /// Shooter attribute driving the make chance.
    pub fn attribute(self) -> Attribute {
        match self {
            ShotKind::Three => Attribute::ThreePoint,
            ShotKind::MidRange => Attribute::MidRange,
            ShotKind::Layup => Attribute::InsideScoring,
            ShotKind::Dunk => Attribute::Dunk,
        }
    }

    /// Defender attribute contesting a block.
    pub fn defense_attribute(self) -> Attribute {
        if self.is_perimeter() {
            Attribute::PerimeterDefense
        } else {
            Attribute::InsideDefense
        }
    }

    pub fn is_perimeter(self) -> bool {
        matches!(self, ShotKind::Three | ShotKind::MidRange)
    }

    pub fn profile(self, shots: &ShotProfiles) -> ShotProfile {
        match self {
            ShotKind::Three => shots.three,
            ShotKind::MidRange => shots.mid_range,
            ShotKind::Layup => shots.layup,
            ShotKind::Dunk => shots.dunk,
        }
    }

    fn made_key(self) -> StatKey {
        match self {
            ShotKind::Three => StatKey::ThreeMade,
            _ => StatKey::TwoMade,
        }
    }

    fn attempted_key(self) -> StatKey {
        match self {
            ShotKind::Three => StatKey::ThreeAttempted,
            _ => StatKey::TwoAttempted,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ShotKind::Three => "three-pointer",
            ShotKind::MidRange => "mid-range jumper",
            ShotKind::Layup => "layup",
            ShotKind::Dunk => "dunk",
        }
    }

    /// Pick the shot a shooter takes from their attributes.
    ///
    /// A three-point attribute above `cutoff` means a three; otherwise the
    /// strongest of mid-range, inside scoring and dunk decides, with ties
    /// going to the mid-range jumper, then the layup.
    pub fn choose(three: f64, mid: f64, inside: f64, dunk: f64, cutoff: f64) -> ShotKind {
        if three > cutoff {
            ShotKind::Three
        } else if dunk > mid && dunk > inside {
            ShotKind::Dunk
        } else if mid >= inside {
            ShotKind::MidRange
        } else {
            ShotKind::Layup
        }
    }
}

/// Chance of a turnover in a possession of `seconds`, given a per-minute rate.
pub fn turnover_chance(per_minute: f64, seconds: u32) -> f64 {
    (per_minute * f64::from(seconds) / 60.0).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShotResult {
    /// Possession over: made, fouled or stolen.
    Done,
    /// Missed or blocked; the ball is loose.
    Missed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rebound {
    Offensive,
    Defensive,
}

impl GameSimulation {
    /// Resolve one possession for the current offense and return its length.
    pub(crate) fn resolve_possession(&mut self) -> Result<u32, SimError> {
        let length = self
            .rng
            .gen_range(self.config.min_possession..=self.config.shot_clock);
        let offense = self.offense;

        let margin = self.score(offense).abs_diff(self.score(offense.other()));
        if self.clock.reaches_end(length) && margin >= self.config.blowout_margin {
            let text = format!("{} let the clock run out", self.team_name(offense));
            self.log.push(&self.clock, text);
            debug!(game = self.id.0, length, margin, "garbage time");
            return Ok(length);
        }

        self.credit_team(offense, StatKey::Possessions, 1.0)?;
        debug!(game = self.id.0, ?offense, length, "possession");

        let per_minute = self.sides[offense.index()].turnover_rate;
        if chance(&mut self.rng, turnover_chance(per_minute, length)) {
            self.turnover(offense)?;
            return Ok(length);
        }

        if chance(&mut self.rng, self.config.non_shooting_foul) {
            self.non_shooting_foul(offense)?;
            return Ok(length);
        }

        let mut second_chances = 0;
        while self.shot(offense)? == ShotResult::Missed {
            let allow_offensive = second_chances < self.config.max_rebound_chain;
            match self.rebound(offense, allow_offensive)? {
                Rebound::Offensive => second_chances += 1,
                Rebound::Defensive => break,
            }
        }
        Ok(length)
    }

    fn turnover(&mut self, offense: Side) -> Result<(), SimError> {
        let player = self.random_on_court(offense)?;
        self.credit(offense, player, StatKey::Turnovers, 1.0)?;
        let text = format!("{} turns the ball over", self.name(offense, player));
        self.log.push(&self.clock, text);
        Ok(())
    }

    fn non_shooting_foul(&mut self, offense: Side) -> Result<(), SimError> {
        if chance(&mut self.rng, self.config.defensive_foul_share) {
            let shooter = self.random_on_court(offense)?;
            self.free_throws(offense.other(), Some(shooter), 2)
        } else {
            self.free_throws(offense, None, 0)
        }
    }

    /// Charge a foul to a random on-court player of `fouling` and, when a
    /// shooter is given, shoot `attempts` free throws for the other side.
    fn free_throws(
        &mut self,
        fouling: Side,
        shooter: Option<PlayerId>,
        attempts: u32,
    ) -> Result<(), SimError> {
        let fouler = self.random_on_court(fouling)?;
        self.credit(fouling, fouler, StatKey::Fouls, 1.0)?;

        let text = match shooter {
            Some(shooter) => format!(
                "Foul on {} against {}",
                self.name(fouling, fouler),
                self.name(fouling.other(), shooter)
            ),
            None if fouling == self.offense => {
                format!("Offensive foul on {}", self.name(fouling, fouler))
            }
            None => format!("Foul on {}", self.name(fouling, fouler)),
        };
        self.log.push(&self.clock, text);

        let fouls = self.player(fouler)?.game_stat(self.id, StatKey::Fouls);
        if fouls >= f64::from(self.config.foul_limit) {
            let text = format!("{} has fouled out", self.name(fouling, fouler));
            self.log.push(&self.clock, text);
        }

        let Some(shooter) = shooter else {
            return Ok(());
        };
        let shooting = fouling.other();
        let accuracy = self.attribute(shooting, shooter, Attribute::FreeThrow);
        for attempt in 1..=attempts {
            self.credit(shooting, shooter, StatKey::FreeThrowAttempted, 1.0)?;
            let made = chance(&mut self.rng, accuracy);
            if made {
                self.credit(shooting, shooter, StatKey::FreeThrowMade, 1.0)?;
                self.credit(shooting, shooter, StatKey::Points, 1.0)?;
            }
            let text = format!(
                "{} {} free throw {} of {}",
                self.name(shooting, shooter),
                if made { "makes" } else { "misses" },
                attempt,
                attempts
            );
            self.log.push(&self.clock, text);
        }
        Ok(())
    }

    fn shot(&mut self, offense: Side) -> Result<ShotResult, SimError> {
        let defense = offense.other();
        let shooter = self.random_on_court(offense)?;

        if chance(&mut self.rng, self.config.steal) {
            let defender = self.random_on_court(defense)?;
            let skill = self.attribute(defense, defender, Attribute::PerimeterDefense);
            if skill >= self.rng.gen::<f64>() {
                self.credit(defense, defender, StatKey::Steals, 1.0)?;
                self.credit(offense, shooter, StatKey::Turnovers, 1.0)?;
                let text = format!(
                    "{} steals the ball from {}",
                    self.name(defense, defender),
                    self.name(offense, shooter)
                );
                self.log.push(&self.clock, text);
                return Ok(ShotResult::Done);
            }
        }

        let kind = ShotKind::choose(
            self.attribute(offense, shooter, Attribute::ThreePoint),
            self.attribute(offense, shooter, Attribute::MidRange),
            self.attribute(offense, shooter, Attribute::InsideScoring),
            self.attribute(offense, shooter, Attribute::Dunk),
            self.config.three_point_cutoff,
        );
        let profile = kind.profile(&self.config.shots);

        if chance(&mut self.rng, profile.foul) {
            let text = format!(
                "{} is fouled on a {}",
                self.name(offense, shooter),
                kind.label()
            );
            self.log.push(&self.clock, text);
            self.free_throws(defense, Some(shooter), kind.points())?;
            return Ok(ShotResult::Done);
        }

        self.credit(offense, shooter, kind.attempted_key(), 1.0)?;

        if chance(&mut self.rng, profile.block) {
            let defender = self.random_on_court(defense)?;
            let skill = self.attribute(defense, defender, kind.defense_attribute());
            if skill >= self.rng.gen::<f64>() {
                self.credit(defense, defender, StatKey::Blocks, 1.0)?;
                let text = format!(
                    "{} blocks {}'s {}",
                    self.name(defense, defender),
                    self.name(offense, shooter),
                    kind.label()
                );
                self.log.push(&self.clock, text);
                return Ok(ShotResult::Missed);
            }
        }

        let make = self.attribute(offense, shooter, kind.attribute()) * profile.make_scale;
        if !chance(&mut self.rng, make) {
            let text = format!("{} misses a {}", self.name(offense, shooter), kind.label());
            self.log.push(&self.clock, text);
            return Ok(ShotResult::Missed);
        }

        self.credit(offense, shooter, kind.made_key(), 1.0)?;
        self.credit(offense, shooter, StatKey::Points, f64::from(kind.points()))?;
        let text = format!("{} makes a {}", self.name(offense, shooter), kind.label());
        self.log.push(&self.clock, text);

        self.assist(offense, shooter)?;

        if chance(&mut self.rng, profile.and_one) {
            self.free_throws(defense, Some(shooter), 1)?;
        }
        Ok(ShotResult::Done)
    }

    /// Credit an assist on a made basket, drawn by rank of assist skill.
    ///
    /// A draw landing on the shooter means the basket was unassisted.
    fn assist(&mut self, offense: Side, shooter: PlayerId) -> Result<(), SimError> {
        if !chance(&mut self.rng, self.config.assist) {
            return Ok(());
        }
        let passer = self.rank_draw(offense, Attribute::Assist)?;
        if passer == shooter {
            return Ok(());
        }
        self.credit(offense, passer, StatKey::Assists, 1.0)?;
        let text = format!("Assist: {}", self.name(offense, passer));
        self.log.push(&self.clock, text);
        Ok(())
    }

    /// Resolve a loose ball after a miss; the rebounder is drawn by height rank.
    fn rebound(&mut self, offense: Side, allow_offensive: bool) -> Result<Rebound, SimError> {
        let defensive = !allow_offensive || chance(&mut self.rng, self.config.defensive_rebound);
        let (side, kind, key) = if defensive {
            (offense.other(), Rebound::Defensive, StatKey::DefensiveRebounds)
        } else {
            (offense, Rebound::Offensive, StatKey::OffensiveRebounds)
        };
        let rebounder = self.rank_draw(side, Attribute::Height)?;
        self.credit(side, rebounder, key, 1.0)?;
        let text = format!(
            "{} grabs the {} rebound",
            self.name(side, rebounder),
            if defensive { "defensive" } else { "offensive" }
        );
        self.log.push(&self.clock, text);
        Ok(kind)
    }

    fn random_on_court(&mut self, side: Side) -> Result<PlayerId, SimError> {
        let state = &self.sides[side.index()];
        pick(&mut self.rng, &state.on_court)
            .copied()
            .ok_or(SimError::OnCourtViolation {
                team: state.roster.team.id,
                count: 0,
            })
    }

    fn rank_draw(&mut self, side: Side, attribute: Attribute) -> Result<PlayerId, SimError> {
        let state = &self.sides[side.index()];
        let players = &state.roster.players;
        rank_weighted(&mut self.rng, &state.on_court, |id| {
            players
                .get(id)
                .map_or(0.0, |p| p.attributes().get(attribute))
        })
        .copied()
        .ok_or(SimError::OnCourtViolation {
            team: state.roster.team.id,
            count: 0,
        })
    }

    fn attribute(&self, side: Side, player: PlayerId, attribute: Attribute) -> f64 {
        self.sides[side.index()]
            .roster
            .players
            .get(&player)
            .map_or(0.0, |p| p.attributes().get(attribute))
    }

    fn name(&self, side: Side, player: PlayerId) -> String {
        self.sides[side.index()]
            .roster
            .players
            .get(&player)
            .map_or_else(|| format!("#{}", player), |p| p.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use crate::config::GameConfig;
    use crate::participant::{GameId, Participant};
    use crate::roster::League;

    /// Game with the home team on offense and every player at `home` or
    /// `away` for all attributes.
    fn game(home: f64, away: f64, config: GameConfig) -> GameSimulation {
        let mut league = League::new();
        let home_id = league.add_team("Home");
        let away_id = league.add_team("Away");
        for (team, level) in [(home_id, home), (away_id, away)] {
            for i in 0..10 {
                league
                    .add_player(team, format!("P{i}"), Attributes::uniform(level).unwrap())
                    .unwrap();
            }
        }
        let mut game =
            GameSimulation::start(&mut league, GameId(1), home_id, away_id, config, 21).unwrap();
        game.offense = Side::Home;
        game
    }

    /// Every optional branch switched off and shots made at the shooter's
    /// attribute.
    fn quiet() -> GameConfig {
        let profile = ShotProfile {
            foul: 0.0,
            block: 0.0,
            make_scale: 1.0,
            and_one: 0.0,
        };
        GameConfig {
            default_turnover_rate: 0.0,
            non_shooting_foul: 0.0,
            steal: 0.0,
            assist: 0.0,
            shots: ShotProfiles {
                three: profile,
                mid_range: profile,
                layup: profile,
                dunk: profile,
            },
            ..GameConfig::default()
        }
    }

    fn with_shots(config: GameConfig, edit: impl Fn(&mut ShotProfile)) -> GameConfig {
        let mut config = config;
        for profile in [
            &mut config.shots.three,
            &mut config.shots.mid_range,
            &mut config.shots.layup,
            &mut config.shots.dunk,
        ] {
            edit(profile);
        }
        config
    }

    fn stat(game: &GameSimulation, side: Side, key: StatKey) -> f64 {
        game.team_stat(game.team_id(side), key).unwrap()
    }

    #[test]
    fn test_three_above_cutoff() {
        assert_eq!(ShotKind::choose(0.7, 0.9, 0.9, 0.9, 0.6), ShotKind::Three);
        assert_eq!(ShotKind::choose(0.6, 0.1, 0.1, 0.1, 0.6), ShotKind::MidRange);
    }

    #[test]
    fn test_two_point_selection() {
        assert_eq!(ShotKind::choose(0.2, 0.8, 0.5, 0.4, 0.6), ShotKind::MidRange);
        assert_eq!(ShotKind::choose(0.2, 0.3, 0.8, 0.4, 0.6), ShotKind::Layup);
        assert_eq!(ShotKind::choose(0.2, 0.3, 0.5, 0.9, 0.6), ShotKind::Dunk);
    }

    #[test]
    fn test_block_attribute_by_shot_class() {
        assert_eq!(ShotKind::Three.defense_attribute(), Attribute::PerimeterDefense);
        assert_eq!(ShotKind::Dunk.defense_attribute(), Attribute::InsideDefense);
        assert_eq!(ShotKind::Layup.points(), 2);
    }

    #[test]
    fn test_turnover_chance_scales_with_length() {
        assert!((turnover_chance(0.3, 20) - 0.1).abs() < 1e-12);
        assert!((turnover_chance(0.3, 4) - 0.02).abs() < 1e-12);
        assert_eq!(turnover_chance(10.0, 24), 1.0);
        assert_eq!(turnover_chance(0.0, 24), 0.0);
    }

    #[test]
    fn test_garbage_time_charges_time_only() {
        let config = GameConfig {
            min_possession: 24,
            ..quiet()
        };
        let mut blowout = game(1.0, 1.0, config.clone());
        let home = blowout.team_id(Side::Home);
        blowout
            .increment(Participant::Team(home), StatKey::Points, 30.0)
            .unwrap();
        blowout.clock.advance(2870);

        assert_eq!(blowout.resolve_possession().unwrap(), 24);
        assert_eq!(stat(&blowout, Side::Home, StatKey::Possessions), 0.0);
        assert_eq!(stat(&blowout, Side::Home, StatKey::ThreeAttempted), 0.0);
        assert_eq!(blowout.score(Side::Home), 30);
        assert!(blowout.play_log().last().unwrap().contains("let the clock run out"));

        // Same moment in a close game is played out.
        let mut close = game(1.0, 1.0, config);
        close.clock.advance(2870);
        close.resolve_possession().unwrap();
        assert_eq!(stat(&close, Side::Home, StatKey::Possessions), 1.0);
        assert_eq!(close.score(Side::Home), 3);
    }

    #[test]
    fn test_turnover_at_full_rate() {
        let mut game = game(0.5, 0.5, quiet());
        // One turnover a second makes every possession a turnover.
        game.sides[Side::Home.index()].turnover_rate = 60.0;
        game.resolve_possession().unwrap();
        assert_eq!(stat(&game, Side::Home, StatKey::Turnovers), 1.0);
        assert_eq!(stat(&game, Side::Home, StatKey::TwoAttempted), 0.0);
        assert!(game.play_log().last().unwrap().contains("turns the ball over"));
    }

    #[test]
    fn test_offensive_foul_has_no_free_throws() {
        let mut game = game(1.0, 1.0, GameConfig {
            non_shooting_foul: 1.0,
            defensive_foul_share: 0.0,
            ..quiet()
        });
        game.resolve_possession().unwrap();

        assert_eq!(stat(&game, Side::Home, StatKey::Fouls), 1.0);
        assert_eq!(stat(&game, Side::Away, StatKey::Fouls), 0.0);
        for side in Side::BOTH {
            assert_eq!(stat(&game, side, StatKey::FreeThrowAttempted), 0.0);
            assert_eq!(stat(&game, side, StatKey::Turnovers), 0.0);
        }
        assert_eq!(stat(&game, Side::Home, StatKey::ThreeAttempted), 0.0);
        assert!(game.play_log().last().unwrap().starts_with("[Q1 12:00] Offensive foul on"));
    }

    #[test]
    fn test_defensive_foul_awards_two_shots() {
        let mut game = game(1.0, 0.5, GameConfig {
            non_shooting_foul: 1.0,
            defensive_foul_share: 1.0,
            ..quiet()
        });
        game.resolve_possession().unwrap();

        assert_eq!(stat(&game, Side::Away, StatKey::Fouls), 1.0);
        assert_eq!(stat(&game, Side::Home, StatKey::FreeThrowAttempted), 2.0);
        assert_eq!(stat(&game, Side::Home, StatKey::FreeThrowMade), 2.0);
        assert_eq!(game.score(Side::Home), 2);
    }

    #[test]
    fn test_steal_voids_the_shot() {
        let mut game = game(0.5, 1.0, GameConfig {
            steal: 1.0,
            ..quiet()
        });
        game.resolve_possession().unwrap();

        assert_eq!(stat(&game, Side::Away, StatKey::Steals), 1.0);
        assert_eq!(stat(&game, Side::Home, StatKey::Turnovers), 1.0);
        assert_eq!(stat(&game, Side::Home, StatKey::TwoAttempted), 0.0);
        assert_eq!(stat(&game, Side::Home, StatKey::ThreeAttempted), 0.0);
        assert_eq!(game.score(Side::Home), 0);
    }

    #[test]
    fn test_shooting_foul_shoots_point_value() {
        let config = with_shots(quiet(), |p| p.foul = 1.0);
        let mut game = game(1.0, 0.5, config);
        game.resolve_possession().unwrap();

        assert_eq!(stat(&game, Side::Away, StatKey::Fouls), 1.0);
        assert_eq!(stat(&game, Side::Home, StatKey::ThreeAttempted), 0.0);
        assert_eq!(stat(&game, Side::Home, StatKey::FreeThrowAttempted), 3.0);
        assert_eq!(game.score(Side::Home), 3);
    }

    #[test]
    fn test_blocks_follow_rebound_chain_to_cap() {
        let config = GameConfig {
            defensive_rebound: 0.0,
            max_rebound_chain: 3,
            ..with_shots(quiet(), |p| p.block = 1.0)
        };
        let mut game = game(0.5, 1.0, config);
        game.resolve_possession().unwrap();

        assert_eq!(stat(&game, Side::Away, StatKey::Blocks), 4.0);
        assert_eq!(stat(&game, Side::Home, StatKey::TwoAttempted), 4.0);
        assert_eq!(stat(&game, Side::Home, StatKey::TwoMade), 0.0);
        assert_eq!(stat(&game, Side::Home, StatKey::OffensiveRebounds), 3.0);
        assert_eq!(stat(&game, Side::Away, StatKey::DefensiveRebounds), 1.0);
        assert_eq!(stat(&game, Side::Home, StatKey::Possessions), 1.0);
        assert!(game.play_log().last().unwrap().contains("defensive rebound"));
    }

    #[test]
    fn test_and_one_awards_one_shot() {
        let config = with_shots(quiet(), |p| p.and_one = 1.0);
        let mut game = game(1.0, 0.5, config);
        game.resolve_possession().unwrap();

        assert_eq!(stat(&game, Side::Home, StatKey::ThreeMade), 1.0);
        assert_eq!(stat(&game, Side::Home, StatKey::ThreeAttempted), 1.0);
        assert_eq!(stat(&game, Side::Home, StatKey::FreeThrowAttempted), 1.0);
        assert_eq!(stat(&game, Side::Away, StatKey::Fouls), 1.0);
        assert_eq!(game.score(Side::Home), 4);
    }

    #[test]
    fn test_shooter_never_assists_own_basket() {
        let mut game = game(1.0, 0.5, GameConfig {
            assist: 1.0,
            ..quiet()
        });
        let roster = game.roster(Side::Home).team.roster().to_vec();
        let line = |game: &GameSimulation, key| -> Vec<f64> {
            roster.iter().map(|p| game.player_stat(*p, key).unwrap()).collect()
        };
        for _ in 0..20 {
            game.offense = Side::Home;
            let made = line(&game, StatKey::ThreeMade);
            let assists = line(&game, StatKey::Assists);
            game.resolve_possession().unwrap();

            let shooter = line(&game, StatKey::ThreeMade)
                .iter()
                .zip(&made)
                .position(|(after, before)| after > before)
                .unwrap();
            assert_eq!(line(&game, StatKey::Assists)[shooter], assists[shooter]);
        }
        assert_eq!(stat(&game, Side::Home, StatKey::ThreeMade), 20.0);
        assert!(stat(&game, Side::Home, StatKey::Assists) <= 20.0);
    }
}
