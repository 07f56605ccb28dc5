//! Slate Example
//!
//! This example runs one night of games:
//! - A league of eight teams with randomly generated players
//! - Rosters ranked by the standard rating model
//! - Four games played in parallel on a slate runner
//! - Box scores printed as JSON, plus the first lines of one play log
//!
//! Set `RUST_LOG=hoopsim=debug` to watch possessions as they resolve.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;
use hoopsim::*;

// ============================================================================
// League Setup
// ============================================================================

const CITIES: [&str; 8] = [
    "Harbor City",
    "Lakeshore",
    "Red Mesa",
    "Northgate",
    "Pine Hollow",
    "Ironbridge",
    "Saltmarsh",
    "Highview",
];

/// Random attributes around a team's talent level.
fn random_attributes(rng: &mut ChaCha8Rng, level: f64) -> Result<Attributes, SimError> {
    let mut attributes = Attributes::uniform(level)?;
    for attribute in Attribute::ALL {
        let value = (level + rng.gen_range(-0.2..0.2)).clamp(0.05, 0.99);
        attributes = attributes.with(attribute, value)?;
    }
    Ok(attributes)
}

fn build_league(seed: u64) -> Result<(League, Vec<TeamId>), SimError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut league = League::new();
    let mut teams = Vec::new();
    for city in CITIES {
        let team = league.add_team(city);
        let level = rng.gen_range(0.35..0.7);
        for i in 0..13 {
            let attributes = random_attributes(&mut rng, level)?;
            league.add_player(team, format!("{city} #{i}"), attributes)?;
        }
        teams.push(team);
    }
    league.rank_rosters(&RatingModel::standard())?;
    Ok((league, teams))
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (mut league, teams) = build_league(17)?;
    let model = RatingModel::standard();
    for team in &teams {
        let name = league.team(*team).map(|t| t.name.clone()).unwrap_or_default();
        println!("{:<12} rating {:.3}", name, league.team_rating(*team, &model)?);
    }

    let slate: Vec<Matchup> = teams
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| Matchup::new(GameId(i as u64 + 1), pair[0], pair[1]))
        .collect();

    let runner = SlateRunner::new(4, GameConfig::default())?;
    let reports = runner.run(&mut league, &slate, 2024)?;

    for report in &reports {
        let home = &report.box_score.home;
        let away = &report.box_score.away;
        println!(
            "\nGame {}: {} {} - {} {} (worker {:?}, {:?})",
            report.game,
            home.name,
            home.points(),
            away.points(),
            away.name,
            report.worker,
            report.elapsed
        );
    }

    if let Some(report) = reports.first() {
        println!("\n{}", report.box_score.to_json()?);
        println!("\nFirst plays of game {}:", report.game);
        for line in report.play_log.iter().take(15) {
            println!("  {}", line);
        }
    }

    Ok(())
}
