//! Interpreter tests: every action and sensor read is logged by a mock
//! capability, and the log is compared with the expected sequence

use robolang_core::tests::test_helpers::{execution_log, run_ticks, MockWorld};
use robolang_core::{parse_program, ExecError, MAX_STEPS_PER_TICK};

fn assert_log(expected: &[&str], outputs: &[i32], source: &str) {
    let log = execution_log(source, outputs, expected);
    assert_eq!(log, expected, "execution log of {:?}", source);
}

/// Same as `assert_log`, but interleaves a second agent that writes the same
/// variable names on its own world. The logs must not be affected.
fn assert_log_with_neighbour(expected: &[&str], outputs: &[i32], source: &str) {
    let ticks = expected.iter().filter(|e| e.starts_with("do")).count();
    let mut program = parse_program(source).unwrap();
    let mut neighbour = parse_program("loop{ $a = 100; $b = 100; $abcd = 100; $c = 100; wait; }").unwrap();
    let mut world = MockWorld::new(outputs.iter().copied());
    let mut neighbour_world = MockWorld::default();

    for _ in 0..ticks.max(1) {
        program = program.execute(&mut world).unwrap();
        neighbour = neighbour.execute(&mut neighbour_world).unwrap();
        world.reset_used();
        neighbour_world.reset_used();
    }
    assert_eq!(world.entries(), expected, "execution log of {:?}", source);
    assert_eq!(neighbour_world.var("a"), Some(100));
}

// ── Actions and loops ──────────────────────────────────

#[test]
fn test_single_actions() {
    assert_log(&["doMove"], &[], "move;");
    assert_log(&["doTurnR"], &[], "turnR;");
    assert_log(&["doWait"], &[], "wait;");
    assert_log(&["doTurnAround"], &[], "turnAround;");
    assert_log(&["doTakeFuel"], &[], "takeFuel;");
}

#[test]
fn test_wait_then_loop() {
    let mut expected = vec!["doWait"];
    for _ in 0..9 {
        expected.extend(["doMove", "doTurnL"]);
    }
    expected.push("doMove");
    assert_log(&expected, &[], "wait; loop { move; turnL;}");
}

#[test]
fn test_inner_loop_never_exits() {
    let mut expected = vec!["doWait", "doTurnR"];
    expected.extend(std::iter::repeat("doMove").take(23));
    assert_log(&expected, &[], "wait; loop { turnR; loop { move; } turnL;}");
}

#[test]
fn test_shield_does_not_use_the_action_slot() {
    assert_log(&["setShield: true"], &[], "shieldOn;");
    assert_log(
        &["setShield: true", "doMove", "setShield: false", "doWait"],
        &[],
        "shieldOn; move; shieldOff; wait;",
    );
}

// ── Sensors in conditions ──────────────────────────────

#[test]
fn test_if_reads_sensor_after_previous_action() {
    assert_log(
        &["doWait", "readOppLR|output= 0", "doTurnL", "doMove"],
        &[0],
        "wait; if (lt(oppLR, 4)) { turnL; } move;",
    );
    assert_log(
        &["doWait", "readOppLR|output= 1", "doTurnL", "doMove"],
        &[1],
        "wait; if (lt(oppLR, 2)) { turnL; } move;",
    );
}

#[test]
fn test_if_false_skips_body() {
    assert_log(
        &["doWait", "readOppLR|output= 1", "doMove"],
        &[1],
        "wait; if (eq(oppLR, 4)) { turnL; } move;",
    );
    assert_log(
        &["doWait", "readOppLR|output= 3", "doMove"],
        &[3],
        "wait; if (eq(oppLR, 4)) { turnL; } move;",
    );
    assert_log(
        &["doTurnL", "readBarrelLR: 0|output= 3", "doMove"],
        &[3],
        "turnL; if (eq(barrelLR, 4)) { turnL; } move;",
    );
}

#[test]
fn test_loop_reevaluates_if_each_iteration() {
    assert_log(
        &[
            "doTurnR",
            "readBarrelFB: 0|output= 4",
            "doTurnL",
            "doMove",
            "doTurnR",
            "readBarrelFB: 0|output= 5",
            "doMove",
            "doTurnR",
            "readBarrelFB: 0|output= 6",
            "doMove",
            "doTurnR",
        ],
        &[4, 5, 6],
        "loop { turnR; if (eq(barrelFB, 4)) { turnL; } move; }",
    );
    assert_log(
        &[
            "doTurnR",
            "readBarrelFB: 0|output= 2",
            "doMove",
            "doTurnR",
            "readBarrelFB: 0|output= 3",
            "doMove",
            "doTurnR",
            "readBarrelFB: 0|output= 4",
            "doTurnL",
            "doMove",
            "doTurnR",
        ],
        &[2, 3, 4],
        "loop { turnR; if (eq(barrelFB, 4)) { turnL; } move; }",
    );
}

#[test]
fn test_while_reevaluates_condition() {
    assert_log(
        &[
            "doWait",
            "readWallDist|output= 0",
            "doTurnL",
            "readWallDist|output= 1",
            "doTurnL",
            "readWallDist|output= 2",
            "doTurnL",
            "readWallDist|output= 3",
            "doMove",
        ],
        &[0, 1, 2, 3],
        "wait; while (lt(wallDist, 3)) { turnL; } move;",
    );
    assert_log(
        &[
            "doTurnL",
            "readWallDist|output= 6",
            "doWait",
            "readWallDist|output= 5",
            "doWait",
            "readWallDist|output= 4",
            "doWait",
            "readWallDist|output= 3",
            "doMove",
        ],
        &[6, 5, 4, 3],
        "turnL; while (gt(wallDist, 3)) { wait; } move;",
    );
}

// ── Arguments and arithmetic ───────────────────────────

#[test]
fn test_if_else() {
    assert_log(
        &["doMove", "doTurnR", "doMove"],
        &[],
        "move; if (eq(4, 3)) { turnL; } else {turnR;} move;",
    );
    assert_log(&["doWait"], &[], "if (lt(add(3,4), sub(10,2))) { wait; } else {move;}");
    assert_log(&["doMove"], &[], "if (lt(add(3,4), sub(10,5))) { wait; } else {move;}");
    assert_log(&["doTurnL"], &[], "if  (not(lt(4,3))) { turnL; } else {turnR;}");
    assert_log(&["doTurnR"], &[], "if  (not(lt(3,4))) { turnL; } else {turnR;}");
    assert_log(
        &["readOppLR|output= 1", "doTurnR"],
        &[1],
        "if (eq(oppLR,2)) { turnL; } else {turnR;}",
    );
    assert_log(
        &["readOppLR|output= 2", "doTurnL"],
        &[2],
        "if (eq(oppLR,2)) { turnL; } else {turnR;}",
    );
}

#[test]
fn test_move_with_count() {
    assert_log(&["doMove", "doMove", "doMove"], &[], "move(3);");
}

#[test]
fn test_move_with_non_positive_count_moves_once() {
    assert_log(&["doMove"], &[], "move(0);");
    assert_log(&["doMove"], &[], "move(-10);");
}

#[test]
fn test_count_is_evaluated_once() {
    let mut expected = vec!["readFuelLeft|output= 5"];
    expected.extend(std::iter::repeat("doMove").take(7));
    assert_log(&expected, &[5], "move(add(fuelLeft,2));");
}

#[test]
fn test_elif_chain() {
    assert_log(
        &["doMove"],
        &[],
        "if (lt(4,3)) {wait;} elif(gt(10,2)) {move;} elif(eq(4,3)) { turnL; } else {turnR;}",
    );
    assert_log(
        &["doTurnL"],
        &[],
        "if (lt(4,3)) {wait;} elif(gt(2,10)) {move;} elif(eq(4,4)) { turnL; } else {turnR;}",
    );
}

#[test]
fn test_barrel_sensor_as_argument() {
    assert_log(
        &["readBarrelLR: 0|output= 4", "doWait", "doWait", "doWait", "doWait"],
        &[4],
        "wait(barrelLR);",
    );
    let mut expected = vec!["readBarrelLR: 3|output= 7"];
    expected.extend(std::iter::repeat("doWait").take(7));
    assert_log(&expected, &[7], "wait(barrelLR(3));");
    assert_log(
        &["readBarrelFB: 0|output= 4", "doWait", "doWait", "doWait", "doWait"],
        &[4],
        "wait(barrelFB);",
    );
}

#[test]
fn test_negative_barrel_index_reads_closest() {
    assert_log(
        &["readBarrelLR: 0|output= 1", "doWait"],
        &[1],
        "wait(barrelLR(sub(0, 5)));",
    );
}

#[test]
fn test_conditions_evaluate_both_operands() {
    assert_log(
        &["readOppLR|output= 9", "readOppFB|output= 0", "doTurnR"],
        &[9, 0],
        "if (and(lt(oppLR, 0), eq(oppFB, 0))) { turnL; } else { turnR; }",
    );
}

// ── Variables ──────────────────────────────────────────

#[test]
fn test_assigned_count_is_used() {
    assert_log_with_neighbour(
        &[
            "doMove", "doMove", "doMove", "doTurnL", "doMove", "doMove", "doMove", "doMove",
            "doMove", "doTurnR",
        ],
        &[],
        "$a = 3; move($a);turnL;$a = 5; move($a);turnR;",
    );
    assert_log_with_neighbour(
        &["doMove", "doMove", "doTurnR"],
        &[],
        "$a = 3; $abcd = 2; move($abcd);turnR;",
    );
}

#[test]
fn test_variable_in_while_condition() {
    assert_log_with_neighbour(
        &[
            "readFuelLeft|output= 5",
            "doMove",
            "readFuelLeft|output= 5",
            "doMove",
            "readFuelLeft|output= 5",
            "doMove",
            "readFuelLeft|output= 5",
            "doTurnL",
        ],
        &[5, 5, 5, 5],
        "$a = 2; while(lt($a, fuelLeft)){$a = add($a,1); move;} turnL;",
    );
}

#[test]
fn test_variables_in_nested_if() {
    let source = "$a = 3; $b = 4; if(eq($a, mul($b,3))){if (lt(0,barrelLR(mul($a, $b)))) {move($b); turnL;}} else {turnR;}";
    assert_log_with_neighbour(&["doTurnR"], &[], source);

    let source = "$a = 12; $b = 4; if(eq($a, mul($b,3))){if (lt(0,barrelLR(mul($a, $b)))) {move($b); turnL;}} else {turnR;}";
    assert_log_with_neighbour(
        &["readBarrelLR: 48|output= 2", "doMove", "doMove", "doMove", "doMove", "doTurnL"],
        &[2],
        source,
    );
}

#[test]
fn test_unassigned_variable_reads_zero() {
    assert_log_with_neighbour(
        &[
            "doMove",
            "doMove",
            "doTurnL",
            "doWait",
            "doWait",
            "doWait",
            "doTurnR",
            "doMove",
            "doMove",
            "doMove",
            "doMove",
            "doMove",
            "doTakeFuel",
        ],
        &[2, 3],
        "$a = add($a, 2); move($a);turnL;$a = add($a,1); wait($a);turnR;$a = add($a,2); move($a);takeFuel;",
    );
}

#[test]
fn test_variables_persist_after_program_ends() {
    let program = parse_program("$x = 4; $y = mul($x, $x); wait;").unwrap();
    let mut world = MockWorld::default();
    let rest = run_ticks(&program, &mut world, 1);
    assert!(rest.is_finished());
    assert_eq!(world.var("x"), Some(4));
    assert_eq!(world.var("y"), Some(16));
}

#[test]
fn test_arithmetic_wraps() {
    let program = parse_program("$big = add(2147483647, 1); $neg = mul(-2147483648, -1);").unwrap();
    let mut world = MockWorld::default();
    run_ticks(&program, &mut world, 1);
    assert_eq!(world.var("big"), Some(i32::MIN));
    assert_eq!(world.var("neg"), Some(i32::MIN));
}

// ── Residual programs and faults ───────────────────────

#[test]
fn test_residual_program_keeps_remaining_count() {
    let program = parse_program("move(3); turnL;").unwrap();
    let mut world = MockWorld::default();
    let rest = run_ticks(&program, &mut world, 1);
    assert_eq!(rest.to_string(), "Program[Move[Num[2]], TurnL]");

    let rest = run_ticks(&rest, &mut world, 2);
    assert_eq!(rest.to_string(), "Program[TurnL]");
}

#[test]
fn test_finished_program_performs_nothing() {
    let program = parse_program("wait;").unwrap();
    let mut world = MockWorld::default();
    let rest = run_ticks(&program, &mut world, 3);
    assert!(rest.is_finished());
    assert_eq!(world.entries(), vec!["doWait"]);
}

#[test]
fn test_division_by_zero_faults() {
    let program = parse_program("move(div(4, 0));").unwrap();
    let mut world = MockWorld::default();
    let err = program.execute(&mut world).unwrap_err();
    assert!(matches!(err, ExecError::Eval(_)));
    assert!(world.entries().is_empty());
}

#[test]
fn test_division_truncates_toward_zero() {
    let program = parse_program("$q = div(-7, 2); $r = div(7, 2);").unwrap();
    let mut world = MockWorld::default();
    run_ticks(&program, &mut world, 1);
    assert_eq!(world.var("q"), Some(-3));
    assert_eq!(world.var("r"), Some(3));
}

#[test]
fn test_loop_without_action_hits_step_limit() {
    let program = parse_program("loop { $a = add($a, 1); }").unwrap();
    let mut world = MockWorld::default();
    let err = program.execute(&mut world).unwrap_err();
    assert_eq!(
        err,
        ExecError::StepLimitExceeded {
            limit: MAX_STEPS_PER_TICK
        }
    );
}

// ── Loop residuals ─────────────────────────────────────

#[test]
fn test_loop_residual_stays_bounded() {
    let mut program = parse_program("loop { move; }").unwrap();
    let mut world = MockWorld::default();
    for tick in 1..=1000 {
        program = run_ticks(&program, &mut world, 1);
        assert_eq!(program.to_string(), "Program[Loop[Move]]", "residual after tick {}", tick);
    }
    assert_eq!(world.entries().len(), 1000);
}

#[test]
fn test_nested_loop_residual_stays_bounded() {
    let program = parse_program("loop { turnR; loop { move; } turnL; }").unwrap();
    let mut world = MockWorld::default();
    let expected = "Program[Loop[Move], TurnL, Loop[TurnR, Loop[Move], TurnL]]";

    let mut rest = run_ticks(&program, &mut world, 1);
    assert_eq!(rest.to_string(), expected);
    for _ in 0..1000 {
        rest = run_ticks(&rest, &mut world, 1);
    }
    assert_eq!(rest.to_string(), expected);
}

#[test]
fn test_while_residual_stays_bounded() {
    let program = parse_program("$i = 0; while (lt($i, 1000000)) { $i = add($i, 1); move; }").unwrap();
    let mut world = MockWorld::default();
    let rest = run_ticks(&program, &mut world, 1000);
    assert_eq!(
        rest.to_string(),
        "Program[While[Lt[Var[$i], Num[1000000]], [Ass[$i= Add[Var[$i], Num[1]]], Move]]]"
    );
    assert_eq!(world.var("i"), Some(1000));
}

#[test]
fn test_loop_body_repeats_in_order() {
    let program = parse_program("loop { move; turnL; wait; }").unwrap();
    let mut world = MockWorld::default();
    let mut rest = program.clone();
    for _ in 0..50 {
        rest = run_ticks(&rest, &mut world, 3);
        assert_eq!(rest, program);
    }

    let expected: Vec<&str> = ["doMove", "doTurnL", "doWait"]
        .iter()
        .copied()
        .cycle()
        .take(150)
        .collect();
    assert_eq!(world.entries(), expected);
}

#[test]
fn test_bare_block_residual_is_flattened() {
    let program = parse_program("{ move(2); turnL; } wait;").unwrap();
    let mut world = MockWorld::default();
    let rest = run_ticks(&program, &mut world, 1);
    assert_eq!(rest.to_string(), "Program[Move[Num[1]], TurnL, Wait]");
}
