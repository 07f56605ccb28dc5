//! Energy and substitutions.
//!
//! After every possession the players on court lose `seconds /
//! energy_divisor` energy and everyone on the bench regains the same amount.
//! Then each side runs a substitution pass over its five slots:
//!
//! - a fouled-out player is always replaced, by the most rested eligible
//!   bench player; with nobody left the game cannot continue
//! - a player at or below the fatigue threshold is replaced by the
//!   best-ranked fully rested bench player, or stays on if there is none

use crate::error::SimError;
use crate::game::{GameSimulation, ON_COURT};
use crate::participant::{PlayerId, Side};
use crate::roster::Player;
use crate::stat_key::StatKey;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Substitution {
    outgoing: PlayerId,
    incoming: PlayerId,
    fouled_out: bool,
}

impl GameSimulation {
    /// Charge `seconds` of play to energy and minutes, then substitute.
    pub(crate) fn apply_energy(&mut self, seconds: u32) -> Result<(), SimError> {
        let game = self.id;
        let amount = f64::from(seconds) / self.config.energy_divisor;
        for side in Side::BOTH {
            let state = &mut self.sides[side.index()];
            for player in state.roster.players.values_mut() {
                if state.on_court.contains(&player.id) {
                    player
                        .stats_mut()
                        .increment(game, StatKey::SecondsPlayed, f64::from(seconds))?;
                    player.tire(amount);
                } else {
                    player.rest(amount);
                }
            }
            self.substitute(side)?;
        }
        Ok(())
    }

    fn substitute(&mut self, side: Side) -> Result<(), SimError> {
        let game = self.id;
        let foul_limit = f64::from(self.config.foul_limit);
        let threshold = self.config.fatigue_threshold;
        let fouled_out = |p: &Player| p.game_stat(game, StatKey::Fouls) >= foul_limit;

        let state = &mut self.sides[side.index()];
        let team = state.roster.team.id;
        let mut changes = Vec::new();

        for slot in 0..state.on_court.len() {
            let current = state.on_court[slot];
            let player = state
                .roster
                .players
                .get(&current)
                .ok_or(SimError::UnknownPlayer(current))?;
            let out = fouled_out(player);
            if !out && player.energy() > threshold {
                continue;
            }

            let on_court = &state.on_court;
            let mut bench = state
                .roster
                .team
                .roster()
                .iter()
                .filter(|id| !on_court.contains(*id))
                .filter_map(|id| state.roster.players.get(id))
                .filter(|p| !fouled_out(*p));
            let replacement = if out {
                bench
                    .fold(None::<&Player>, |best, p| match best {
                        Some(b) if b.energy() >= p.energy() => Some(b),
                        _ => Some(p),
                    })
                    .map(|p| p.id)
            } else {
                bench.find(|p| p.is_rested()).map(|p| p.id)
            };

            match replacement {
                Some(incoming) => {
                    state.on_court[slot] = incoming;
                    changes.push(Substitution {
                        outgoing: current,
                        incoming,
                        fouled_out: out,
                    });
                }
                None if out => {
                    let eligible = state
                        .roster
                        .players
                        .values()
                        .filter(|p| !fouled_out(*p))
                        .count();
                    return Err(SimError::NotEnoughPlayers { team, eligible });
                }
                None => {
                    debug!(game = game.0, player = current.0, "no rested substitute, staying on");
                }
            }
        }

        if state.on_court.len() != ON_COURT {
            return Err(SimError::OnCourtViolation {
                team,
                count: state.on_court.len(),
            });
        }

        for change in changes {
            let (outgoing, incoming) = {
                let state = &mut self.sides[side.index()];
                let incoming = state
                    .roster
                    .players
                    .get_mut(&change.incoming)
                    .ok_or(SimError::UnknownPlayer(change.incoming))?;
                incoming.stats_mut().open_game(game);
                let incoming = incoming.name.clone();
                let outgoing = state
                    .roster
                    .players
                    .get(&change.outgoing)
                    .map_or_else(String::new, |p| p.name.clone());
                (outgoing, incoming)
            };
            let text = if change.fouled_out {
                format!("{} checks in for {} (fouled out)", incoming, outgoing)
            } else {
                format!("{} checks in for {}", incoming, outgoing)
            };
            self.log.push(&self.clock, text);
            debug!(
                game = game.0,
                outgoing = change.outgoing.0,
                incoming = change.incoming.0,
                "substitution"
            );
        }
        Ok(())
    }
}
