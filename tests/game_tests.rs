use hoopsim::*;

fn league_with(levels: &[(f64, usize)]) -> (League, Vec<TeamId>) {
    let mut league = League::new();
    let mut teams = Vec::new();
    for (t, (level, players)) in levels.iter().enumerate() {
        let team = league.add_team(format!("Team {t}"));
        for i in 0..*players {
            league
                .add_player(team, format!("T{t} P{i}"), Attributes::uniform(*level).unwrap())
                .unwrap();
        }
        teams.push(team);
    }
    league.rank_rosters(&RatingModel::standard()).unwrap();
    (league, teams)
}

fn start(league: &mut League, home: TeamId, away: TeamId, config: GameConfig, seed: u64) -> GameSimulation {
    GameSimulation::start(league, GameId(1), home, away, config, seed).unwrap()
}

fn even_game(seed: u64) -> GameSimulation {
    let (mut league, teams) = league_with(&[(0.55, 12), (0.55, 12)]);
    start(&mut league, teams[0], teams[1], GameConfig::default(), seed)
}

/// Every counted point, attempt and minute adds up across players and team.
#[test]
fn test_stat_accounting() {
    for seed in 0..5 {
        let mut game = even_game(seed);
        game.simulate().unwrap();

        for side in Side::BOTH {
            let team = game.team_id(side);
            let stat = |key| game.team_stat(team, key).unwrap();

            let from_makes = 2.0 * stat(StatKey::TwoMade)
                + 3.0 * stat(StatKey::ThreeMade)
                + stat(StatKey::FreeThrowMade);
            assert_eq!(stat(StatKey::Points), from_makes);
            assert_eq!(stat(StatKey::Points) as u32, game.score(side));
            assert!(stat(StatKey::TwoMade) <= stat(StatKey::TwoAttempted));
            assert!(stat(StatKey::ThreeMade) <= stat(StatKey::ThreeAttempted));
            assert!(stat(StatKey::FreeThrowMade) <= stat(StatKey::FreeThrowAttempted));

            let roster = game.roster(side).team.roster().to_vec();
            for key in StatKey::ALL {
                if matches!(key, StatKey::Possessions | StatKey::SecondsPlayed) {
                    continue;
                }
                let players: f64 = roster
                    .iter()
                    .map(|p| game.player_stat(*p, key).unwrap())
                    .sum();
                assert_eq!(players, stat(key), "{key} for {team}");
            }

            let seconds: f64 = roster
                .iter()
                .map(|p| game.player_stat(*p, StatKey::SecondsPlayed).unwrap())
                .sum();
            assert_eq!(seconds, 5.0 * f64::from(game.clock().elapsed()));
        }
    }
}

#[test]
fn test_clock_and_court_invariants() {
    let mut game = even_game(77);
    let config = game.config().clone();
    let mut last = game.clock().elapsed();

    while let Some(seconds) = game.step().unwrap() {
        assert!(seconds >= config.min_possession && seconds <= config.shot_clock);
        assert_eq!(game.clock().elapsed(), last + seconds);
        last = game.clock().elapsed();

        for side in Side::BOTH {
            let team = game.team_id(side);
            let on_court = game.on_court(team).unwrap().to_vec();
            assert_eq!(on_court.len(), ON_COURT);
            for player in &on_court {
                let fouls = game.player_stat(*player, StatKey::Fouls).unwrap();
                assert!(fouls < f64::from(config.foul_limit));
                assert!(game.appeared(*player).unwrap());
            }
            for player in game.roster(side).players.values() {
                assert!((0.0..=1.0).contains(&player.energy()));
            }
        }
    }

    assert!(game.is_over());
    assert!(game.clock().at_end());
    assert!(game.clock().elapsed() < game.clock().end() + config.shot_clock);
    assert_ne!(game.score(Side::Home), game.score(Side::Away));
    assert_eq!(game.step().unwrap(), None);
}

#[test]
fn test_result_only_after_final() {
    let mut game = even_game(3);
    assert_eq!(game.winner().unwrap_err(), SimError::GameNotOver(1));
    assert!(game.box_score().winner.is_none());

    game.simulate().unwrap();
    let winner = game.winner().unwrap();
    let loser = game.loser().unwrap();
    assert_ne!(winner, loser);
    assert_eq!(game.winner().unwrap(), winner);
    assert_eq!(game.loser().unwrap(), loser);

    let winning_side = game.side_of_team(winner).unwrap();
    assert!(game.score(winning_side) > game.score(winning_side.other()));
}

#[test]
fn test_stronger_team_wins_big() {
    for seed in [1, 2, 3] {
        let (mut league, teams) = league_with(&[(0.9, 12), (0.1, 12)]);
        let mut game = start(&mut league, teams[0], teams[1], GameConfig::default(), seed);
        game.simulate().unwrap();
        assert_eq!(game.winner().unwrap(), teams[0]);
        let margin = game.score(Side::Home) - game.score(Side::Away);
        assert!(margin > 30, "margin {margin} with seed {seed}");
    }
}

#[test]
fn test_same_seed_same_game() {
    let mut a = even_game(2024);
    let mut b = even_game(2024);
    a.simulate().unwrap();
    b.simulate().unwrap();
    assert_eq!(a.play_log(), b.play_log());
    assert_eq!(a.box_score(), b.box_score());
}

#[test]
fn test_play_log_brackets_game() {
    let mut game = even_game(8);
    game.simulate().unwrap();
    let log = game.play_log();
    assert!(log[0].starts_with("[Q1 12:00]"));
    assert!(log[0].contains("tip-off"));
    assert!(log.last().unwrap().contains("Final"));
}

#[test]
fn test_default_turnover_rate_for_new_teams() {
    let game = even_game(1);
    let team = game.team_id(Side::Home);
    assert_eq!(
        game.turnover_rate(team).unwrap(),
        GameConfig::default().default_turnover_rate
    );
}

#[test]
fn test_turnover_rate_from_history() {
    let (mut league, teams) = league_with(&[(0.5, 12), (0.5, 12)]);
    let mut first = start(&mut league, teams[0], teams[1], GameConfig::default(), 4);
    first.simulate().unwrap();
    first.release(&mut league);

    let turnovers = league
        .team(teams[0])
        .unwrap()
        .stats()
        .game_value(GameId(1), StatKey::Turnovers)
        .unwrap();

    let second =
        GameSimulation::start(&mut league, GameId(2), teams[0], teams[1], GameConfig::default(), 5)
            .unwrap();
    let expected = (turnovers / 48.0).clamp(0.0, 1.0);
    assert!((second.turnover_rate(teams[0]).unwrap() - expected).abs() < 1e-12);
}

/// With steals off, turnovers come only from the turnover roll, whose chance
/// is the per-minute rate times the possession length. Lengths are uniform in
/// 4..=24 seconds, so the mean chance is `rate * 14 / 60`.
#[test]
fn test_turnover_frequency_converges() {
    let config = GameConfig {
        steal: 0.0,
        ..GameConfig::default()
    };
    let mut turnovers = 0.0;
    let mut possessions = 0.0;
    for seed in 0..20 {
        let (mut league, teams) = league_with(&[(0.5, 12), (0.5, 12)]);
        let mut game = start(&mut league, teams[0], teams[1], config.clone(), seed);
        game.simulate().unwrap();
        for team in &teams {
            turnovers += game.team_stat(*team, StatKey::Turnovers).unwrap();
            possessions += game.team_stat(*team, StatKey::Possessions).unwrap();
        }
    }
    let observed = turnovers / possessions;
    let expected = config.default_turnover_rate * 14.0 / 60.0;
    assert!((observed - expected).abs() < 0.015, "observed {observed}, expected {expected}");
}

/// The rate a team brings into a game comes from its own turnovers, so a
/// long run of games between the same teams must settle instead of running
/// away.
#[test]
fn test_turnover_rate_stays_bounded_over_a_season() {
    let (mut league, teams) = league_with(&[(0.5, 12), (0.5, 12)]);
    for game_id in 1..=12 {
        let mut game = GameSimulation::start(
            &mut league,
            GameId(game_id),
            teams[0],
            teams[1],
            GameConfig::default(),
            game_id,
        )
        .unwrap();
        for team in &teams {
            let rate = game.turnover_rate(*team).unwrap();
            assert!(rate < 0.6, "game {game_id}: rate {rate}");
        }
        game.simulate().unwrap();
        assert!(game.score(Side::Home) > 30, "game {game_id}");
        assert!(game.score(Side::Away) > 30, "game {game_id}");
        assert!(!game.decided_by_tiebreak());
        game.release(&mut league);
    }
}

#[test]
fn test_fixed_length_possessions() {
    let config = GameConfig {
        shot_clock: 4,
        min_possession: 4,
        ..GameConfig::default()
    };
    let (mut league, teams) = league_with(&[(0.5, 12), (0.5, 12)]);
    let mut game = start(&mut league, teams[0], teams[1], config, 12);
    for _ in 0..720 {
        assert_eq!(game.step().unwrap(), Some(4));
    }
    assert_eq!(game.clock().elapsed(), 2880);
}

#[test]
fn test_short_roster_rejected() {
    let (mut league, teams) = league_with(&[(0.5, 12), (0.5, 4)]);
    let err = GameSimulation::start(&mut league, GameId(1), teams[0], teams[1], GameConfig::default(), 1)
        .unwrap_err();
    assert_eq!(
        err,
        SimError::NotEnoughPlayers {
            team: teams[1],
            eligible: 4
        }
    );

    // Both rosters are back in the league, players included.
    assert_eq!(league.team(teams[0]).unwrap().roster().len(), 12);
    assert_eq!(league.team(teams[1]).unwrap().roster().len(), 4);
    for team in &teams {
        for player in league.team(*team).unwrap().roster() {
            assert!(league.player(*player).is_some());
        }
    }
}

#[test]
fn test_unknown_away_team_returns_home() {
    let (mut league, teams) = league_with(&[(0.5, 12)]);
    let err = GameSimulation::start(&mut league, GameId(1), teams[0], TeamId(7), GameConfig::default(), 1)
        .unwrap_err();
    assert_eq!(err, SimError::UnknownTeam(TeamId(7)));
    assert!(league.team(teams[0]).is_some());
}

#[test]
fn test_unknown_participants() {
    let mut game = even_game(1);
    assert_eq!(
        game.team_stat(TeamId(99), StatKey::Points).unwrap_err(),
        SimError::UnknownTeam(TeamId(99))
    );
    assert_eq!(
        game.increment(Participant::Player(PlayerId(999)), StatKey::Points, 1.0)
            .unwrap_err(),
        SimError::UnknownPlayer(PlayerId(999))
    );
}

#[test]
fn test_increment_rejects_negative() {
    let mut game = even_game(1);
    let team = game.team_id(Side::Away);
    let err = game
        .increment(Participant::Team(team), StatKey::Points, -2.0)
        .unwrap_err();
    assert!(matches!(err, SimError::NegativeIncrement { .. }));

    game.increment(Participant::Team(team), StatKey::Points, 2.0)
        .unwrap();
    assert_eq!(game.score(Side::Away), 2);
}

#[test]
fn test_history_accumulates_across_games() {
    let (mut league, teams) = league_with(&[(0.5, 12), (0.5, 12)]);
    let mut points = 0.0;
    for game_id in 1..=3 {
        let mut game = GameSimulation::start(
            &mut league,
            GameId(game_id),
            teams[0],
            teams[1],
            GameConfig::default(),
            game_id,
        )
        .unwrap();
        game.simulate().unwrap();
        points += game.team_stat(teams[0], StatKey::Points).unwrap();
        assert_eq!(game.team_stat_total(teams[0], StatKey::Points).unwrap(), points);
        let (home, away) = game.into_rosters();
        league.check_in(home);
        league.check_in(away);
    }

    let stats = league.team(teams[0]).unwrap().stats();
    assert_eq!(stats.games().len(), 3);
    let average = stats.container().average(StatKey::Points).unwrap();
    assert!((average - points / 3.0).abs() < 1e-9);
}
