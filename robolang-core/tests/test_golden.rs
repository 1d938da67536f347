//! Golden tests - compare canonical renderings to expected snapshots

use robolang_core::tests::test_helpers::{golden_path, load_expected};
use robolang_core::{parse_program, trace_program, SensorReadings};

fn check_golden(name: &str) {
    let source = load_expected(&golden_path(&format!("{}.prog", name)))
        .unwrap_or_else(|e| panic!("Failed to read {}.prog: {}", name, e));
    let expected = load_expected(&golden_path(&format!("{}.expected", name)))
        .unwrap_or_else(|e| panic!("Failed to read {}.expected: {}", name, e));

    let program = parse_program(&source).unwrap_or_else(|e| panic!("Failed to parse {}: {}", name, e));
    assert_eq!(
        program.to_string(),
        expected.trim_end(),
        "Output does not match expected snapshot. If this is intentional, update {}.expected.",
        name
    );

    let reparsed = parse_program(&program.to_source()).expect("formatted source should parse");
    assert_eq!(reparsed, program);
}

#[test]
fn test_barrel_hunter_golden() {
    check_golden("barrel_hunter");
}

#[test]
fn test_arithmetic_golden() {
    check_golden("arithmetic");
}

#[test]
fn test_nested_blocks_golden() {
    check_golden("nested_blocks");
}

#[test]
fn test_arithmetic_trace() {
    let source = load_expected(&golden_path("arithmetic.prog")).unwrap();
    let program = parse_program(&source).unwrap();
    let trace = trace_program(&program, 8, SensorReadings::default()).unwrap();
    assert_eq!(trace.to_string(), "move, move, move, move, move, wait, wait, wait");
}
