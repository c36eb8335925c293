//! Integration tests for the match runner and batch simulator through the
//! crate's public API.

use hkmj_core::game_loop::{ActionSelector, FirstActionSelector, GameRunner, MatchConfig};
use hkmj_core::seeding::SessionRng;
use hkmj_core::simulator::{run_batch_simple, BatchConfig, BatchSummary, Policy};
use hkmj_engine::{Action, ActionType, GameOutcome, GameRule};

/// Never claims anything except wins; otherwise behaves like the first-action policy.
struct WinOnlySelector;

impl ActionSelector for WinOnlySelector {
    fn select_action(&mut self, _seat: u8, legal_actions: &[Action]) -> Action {
        let preferred = legal_actions.iter().find(|a| {
            matches!(
                a.action_type,
                ActionType::Win | ActionType::SelfWin | ActionType::Pass | ActionType::Draw
            )
        });
        preferred.unwrap_or(&legal_actions[0]).clone()
    }
}

#[test]
fn game_runner_accessible_and_completes() {
    let mut runner = GameRunner::new(Some(42), MatchConfig::default()).unwrap();
    let mut selector = FirstActionSelector;
    runner.run_to_completion(&mut selector).unwrap();
    assert!(runner.is_done());
    assert!(runner.total_actions() > 20);
    assert!(runner.rounds_played() > 0);
}

#[test]
fn custom_selector_plays_a_match() {
    let config = MatchConfig {
        max_rounds: 3,
        ..MatchConfig::default()
    };
    let mut runner = GameRunner::new(Some(17), config).unwrap();
    runner.run_to_completion(&mut WinOnlySelector).unwrap();
    assert!(runner.is_done());
    for round in runner.history() {
        // Without pung/kong/chow claims, nobody shows an exposed meld.
        if let Some(GameOutcome::Win(w)) = &round.outcome {
            assert!(w.hand.melds.iter().all(|m| !m.is_exposed()));
        }
    }
}

#[test]
fn full_wind_cycle_is_bounded_by_max_rounds() {
    let config = MatchConfig {
        winds: 4,
        max_rounds: 8,
        ..MatchConfig::default()
    };
    let mut runner = GameRunner::new(Some(2024), config).unwrap();
    runner.run_to_completion(&mut FirstActionSelector).unwrap();
    assert!(runner.rounds_played() <= 8);
    let sum: i32 = runner.scores().iter().sum();
    assert_eq!(sum, 4 * GameRule::default_hk().starting_score);
}

#[test]
fn event_log_exports_json() {
    let config = MatchConfig {
        max_rounds: 1,
        ..MatchConfig::default()
    };
    let mut runner = GameRunner::new(Some(5), config).unwrap();
    runner.enable_event_log();
    for _ in 0..10 {
        if !runner.step_once(&mut FirstActionSelector).unwrap() {
            break;
        }
    }
    let json = runner.state().events_json().unwrap();
    assert!(json.contains("\"type\":\"discard\""));
}

#[test]
fn session_batches_are_reproducible() {
    let mut a = SessionRng::from_u64(77);
    let mut b = SessionRng::from_u64(77);
    let config = MatchConfig {
        max_rounds: 2,
        ..MatchConfig::default()
    };
    let mut ra = GameRunner::new_with_session(&mut a, config.clone()).unwrap();
    let mut rb = GameRunner::new_with_session(&mut b, config).unwrap();
    ra.run_to_completion(&mut FirstActionSelector).unwrap();
    rb.run_to_completion(&mut FirstActionSelector).unwrap();
    assert_eq!(ra.history(), rb.history());
}

#[test]
fn batch_summary_through_public_api() {
    let config = BatchConfig {
        num_games: 4,
        base_seed: Some(3),
        policy: Policy::Random,
        match_config: MatchConfig {
            max_rounds: 2,
            ..MatchConfig::default()
        },
        ..Default::default()
    };
    let results = run_batch_simple(&config).unwrap();
    let summary = BatchSummary::from_results(&results);
    assert_eq!(summary.games, 4);
    assert_eq!(
        summary.discard_wins + summary.self_draw_wins + summary.exhaustive_draws,
        summary.rounds
    );
    let json = serde_json::to_string(&results[0]).unwrap();
    assert!(json.contains("rounds_played"));
}
