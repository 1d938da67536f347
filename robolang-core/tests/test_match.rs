//! Match runtime tests: full matches from source, outcomes and determinism

use robolang_core::{build_match, run_match, MatchConfig, Outcome, RuntimeError, Side};

fn quiet_config() -> MatchConfig {
    MatchConfig {
        barrel_spawn_chance: 0.0,
        initial_barrels: 0,
        ..MatchConfig::default()
    }
}

#[test]
fn test_match_runs_until_an_agent_dies() {
    let result = run_match(Some("loop { move; }"), Some("loop { wait; }"), quiet_config())
        .expect("match failed");

    assert_eq!(result.outcome, Outcome::BlueWins);
    assert_eq!(result.ticks, 23);
    assert_eq!(result.trace.len(), 23);

    let last = result.trace.last().unwrap();
    assert!(last.red.fuel <= 0);
    assert_eq!(last.blue.fuel, 31);
}

#[test]
fn test_match_times_out() {
    let config = MatchConfig {
        max_ticks: 5,
        ..quiet_config()
    };
    let result = run_match(Some("loop { wait; }"), Some("loop { wait; }"), config).unwrap();
    assert_eq!(result.outcome, Outcome::Timeout);
    assert_eq!(result.ticks, 5);
    assert_eq!(result.trace.len(), 5);
}

#[test]
fn test_step_returns_none_after_the_end() {
    let config = MatchConfig {
        max_ticks: 2,
        ..quiet_config()
    };
    let mut game = build_match(Some("wait;"), Some("wait;"), config).unwrap();
    assert!(game.step().unwrap().is_some());
    assert!(game.step().unwrap().is_some());
    assert_eq!(game.outcome(), Some(Outcome::Timeout));
    assert!(game.step().unwrap().is_none());
    assert_eq!(game.arena().tick(), 2);
}

#[test]
fn test_missing_source_uses_default_program() {
    let config = MatchConfig {
        max_ticks: 50,
        seed: 3,
        ..MatchConfig::default()
    };
    let result = run_match(None, None, config).unwrap();
    assert!(result.ticks <= 50);
    assert_eq!(result.trace.len() as u64, result.ticks);
    assert!(result.trace.iter().all(|r| r.red.fault.is_none() && r.blue.fault.is_none()));
}

#[test]
fn test_syntax_error_names_the_side() {
    let err = run_match(None, Some("move"), quiet_config()).unwrap_err();
    match &err {
        RuntimeError::Parse { side, .. } => assert_eq!(*side, Side::Blue),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(
        err.to_string(),
        "blue program: syntax error at 1:5: Unexpected token [END OF INPUT] Expected [;]"
    );
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = MatchConfig {
        grid_size: 1,
        ..MatchConfig::default()
    };
    let err = run_match(None, None, config).unwrap_err();
    assert!(matches!(err, RuntimeError::Config(_)));
}

#[test]
fn test_oversized_costs_and_grid_are_rejected() {
    let costly = MatchConfig {
        wait_cost: i32::MAX,
        move_cost: 1,
        ..MatchConfig::default()
    };
    let err = run_match(None, None, costly).unwrap_err();
    assert!(matches!(err, RuntimeError::Config(_)));

    let huge = MatchConfig {
        grid_size: 1_000_000,
        ..MatchConfig::default()
    };
    let err = run_match(None, None, huge).unwrap_err();
    assert!(matches!(err, RuntimeError::Config(_)));
}

#[test]
fn test_costs_equal_to_capacity_end_in_one_tick() {
    let config = MatchConfig {
        max_fuel: 5,
        wait_cost: 5,
        move_cost: 5,
        turn_cost: 5,
        shield_cost: 5,
        barrel_spawn_chance: 0.0,
        initial_barrels: 0,
        ..MatchConfig::default()
    };
    let result = run_match(Some("move;"), Some("wait;"), config).unwrap();
    assert_eq!(result.outcome, Outcome::Draw);
    assert_eq!(result.ticks, 1);
}

#[test]
fn test_faulted_agent_idles_until_it_dies() {
    let result = run_match(Some("wait(div(1, 0));"), Some("loop { wait; }"), quiet_config()).unwrap();
    assert!(result.trace[0].red.fault.is_some());
    assert!(result.trace[1..].iter().all(|r| r.red.action.is_none()));
    assert_eq!(result.outcome, Outcome::Draw);
    assert_eq!(result.ticks, 34);
}

// ── Determinism ────────────────────────────────────────

#[test]
fn test_same_seed_same_match() {
    let config = MatchConfig {
        seed: 1234,
        barrel_spawn_chance: 0.3,
        max_ticks: 200,
        ..MatchConfig::default()
    };
    let first = run_match(None, None, config.clone()).expect("first run failed");
    let second = run_match(None, None, config).expect("second run failed");

    assert_eq!(first.outcome, second.outcome);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap(),
        "Running the same match twice should produce identical traces"
    );
}

#[test]
fn test_same_seed_same_barrels() {
    let config = MatchConfig {
        seed: 99,
        initial_barrels: 6,
        ..MatchConfig::default()
    };
    let first = build_match(None, None, config.clone()).unwrap();
    let second = build_match(None, None, config).unwrap();
    assert_eq!(first.arena().barrels(), second.arena().barrels());
}

#[test]
fn test_match_result_serializes() {
    let config = MatchConfig {
        max_ticks: 1,
        ..quiet_config()
    };
    let result = run_match(Some("move;"), Some("shieldOn; turnL;"), config).unwrap();
    let json: serde_json::Value = serde_json::to_value(&result).unwrap();

    assert_eq!(json["outcome"], "timeout");
    assert_eq!(json["ticks"], 1);
    assert_eq!(json["trace"][0]["red"]["action"], "move");
    assert_eq!(json["trace"][0]["blue"]["action"], "turnL");
    assert_eq!(json["trace"][0]["blue"]["shield"], true);
}
