//! Test helper utilities for robot program tests

use crate::ast::Program;
use crate::capability::{Action, Capability, SlotError};
use crate::parser::parse_program;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// Capability that logs every action and sensor read. Sensor reads are
/// answered from a queue of scripted values, one value per read.
#[derive(Debug, Default)]
pub struct MockWorld {
    pub log: RefCell<Vec<String>>,
    outputs: RefCell<VecDeque<i32>>,
    vars: HashMap<String, i32>,
    used: Option<Action>,
}

impl MockWorld {
    pub fn new(outputs: impl IntoIterator<Item = i32>) -> Self {
        Self {
            outputs: RefCell::new(outputs.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Start a new tick
    pub fn reset_used(&mut self) {
        self.used = None;
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn var(&self, name: &str) -> Option<i32> {
        self.vars.get(name).copied()
    }

    fn read(&self, entry: String) -> i32 {
        let value = self
            .outputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("MockWorld ran out of scripted outputs at {entry}"));
        self.log.borrow_mut().push(format!("{entry}|output= {value}"));
        value
    }
}

/// Log entry for an action, e.g. `doTurnL`
pub fn action_entry(action: Action) -> String {
    let keyword = action.keyword();
    let mut chars = keyword.chars();
    match chars.next() {
        Some(first) => format!("do{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => String::from("do"),
    }
}

impl Capability for MockWorld {
    fn used(&self) -> bool {
        self.used.is_some()
    }

    fn read_var(&self, name: &str) -> Option<i32> {
        self.vars.get(name).copied()
    }

    fn write_var(&mut self, name: &str, value: i32) {
        self.vars.insert(name.to_string(), value);
    }

    fn perform(&mut self, action: Action) -> Result<(), SlotError> {
        if let Some(performed) = self.used {
            return Err(SlotError {
                attempted: action,
                performed,
            });
        }
        self.used = Some(action);
        self.log.get_mut().push(action_entry(action));
        Ok(())
    }

    fn set_shield(&mut self, on: bool) {
        self.log.get_mut().push(format!("setShield: {on}"));
    }

    fn fuel_left(&self) -> i32 {
        self.read("readFuelLeft".to_string())
    }

    fn opp_lr(&self) -> i32 {
        self.read("readOppLR".to_string())
    }

    fn opp_fb(&self) -> i32 {
        self.read("readOppFB".to_string())
    }

    fn num_barrels(&self) -> i32 {
        self.read("readNumBarrels".to_string())
    }

    fn barrel_lr(&self, index: usize) -> i32 {
        self.read(format!("readBarrelLR: {index}"))
    }

    fn barrel_fb(&self, index: usize) -> i32 {
        self.read(format!("readBarrelFB: {index}"))
    }

    fn wall_dist(&self) -> i32 {
        self.read("readWallDist".to_string())
    }
}

/// Run `program` for `ticks` ticks against `world`, freeing the action slot
/// between ticks. Zero ticks still runs one execution pass.
pub fn run_ticks(program: &Program, world: &mut MockWorld, ticks: usize) -> Program {
    let mut program = program.clone();
    for _ in 0..ticks.max(1) {
        program = program
            .execute(world)
            .unwrap_or_else(|e| panic!("execution failed: {e}"));
        world.reset_used();
    }
    program
}

/// Parse `source`, run it with scripted sensor `outputs` for as many ticks as
/// `expected` has actions, and return the log
pub fn execution_log(source: &str, outputs: &[i32], expected: &[&str]) -> Vec<String> {
    let program = parse_program(source).unwrap_or_else(|e| panic!("parse failed: {e}"));
    let ticks = expected.iter().filter(|e| e.starts_with("do")).count();
    let mut world = MockWorld::new(outputs.iter().copied());
    run_ticks(&program, &mut world, ticks);
    world.entries()
}

/// Path of a golden fixture under `tests/golden`
pub fn golden_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("golden");
    path.push(filename);
    path
}

/// Load expected output from a file
pub fn load_expected(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    Ok(fs::read_to_string(path)?)
}
