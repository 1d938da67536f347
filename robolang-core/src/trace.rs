//! Action traces
//!
//! [`TickReport`] records what each agent did in one arena tick.
//! [`trace_program`] runs a lone program against fixed sensor readings and
//! returns the flat sequence of actions it performs.

use crate::ast::Program;
use crate::capability::{Action, Capability, SlotError, NO_BARREL};
use crate::grid::{Cell, Direction};
use crate::interpreter::ExecError;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// One agent's part of a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentTick {
    pub action: Option<Action>,
    pub shield: bool,
    pub from: Cell,
    pub to: Cell,
    pub facing: Direction,
    /// Fuel the agent starts the next tick with
    pub fuel: i32,
    /// Wanted to move but the opponent was in the way
    pub blocked: bool,
    pub fault: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub red: AgentTick,
    pub blue: AgentTick,
    pub barrels: usize,
}

impl fmt::Display for AgentTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            Some(action) => write!(f, "{:<10}", action.keyword())?,
            None => write!(f, "{:<10}", "-")?,
        }
        write!(f, " {} -> {} {} fuel {:>3}", self.from, self.to, self.facing, self.fuel)?;
        if self.shield {
            f.write_str(" shield")?;
        }
        if self.blocked {
            f.write_str(" blocked")?;
        }
        if let Some(fault) = &self.fault {
            write!(f, " fault: {}", fault)?;
        }
        Ok(())
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {:>4} | red {} | blue {} | barrels {}",
            self.tick, self.red, self.blue, self.barrels
        )
    }
}

/// Flat sequence of performed actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionTrace(pub Vec<Action>);

impl ActionTrace {
    pub fn actions(&self) -> &[Action] {
        &self.0
    }
}

impl fmt::Display for ActionTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, action) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", action)?;
        }
        Ok(())
    }
}

/// Sensor values served by a [`TraceWorld`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorReadings {
    pub fuel: i32,
    pub opp_lr: i32,
    pub opp_fb: i32,
    /// (left-right, front-back), closest first
    pub barrels: Vec<(i32, i32)>,
    pub wall_dist: i32,
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self {
            fuel: 100,
            opp_lr: 0,
            opp_fb: 0,
            barrels: Vec::new(),
            wall_dist: 0,
        }
    }
}

/// Capability with constant sensors that remembers the action of the current tick
#[derive(Debug, Default)]
pub struct TraceWorld {
    readings: SensorReadings,
    vars: HashMap<String, i32>,
    performed: Option<Action>,
    shield: bool,
}

impl TraceWorld {
    pub fn new(readings: SensorReadings) -> Self {
        Self {
            readings,
            ..Self::default()
        }
    }

    /// Free the action slot, returning the action of the tick that ended
    pub fn end_tick(&mut self) -> Option<Action> {
        self.performed.take()
    }

    pub fn shield(&self) -> bool {
        self.shield
    }

    pub fn vars(&self) -> &HashMap<String, i32> {
        &self.vars
    }
}

impl Capability for TraceWorld {
    fn used(&self) -> bool {
        self.performed.is_some()
    }

    fn read_var(&self, name: &str) -> Option<i32> {
        self.vars.get(name).copied()
    }

    fn write_var(&mut self, name: &str, value: i32) {
        self.vars.insert(name.to_string(), value);
    }

    fn perform(&mut self, action: Action) -> Result<(), SlotError> {
        if let Some(performed) = self.performed {
            return Err(SlotError {
                attempted: action,
                performed,
            });
        }
        self.performed = Some(action);
        Ok(())
    }

    fn set_shield(&mut self, on: bool) {
        self.shield = on;
    }

    fn fuel_left(&self) -> i32 {
        self.readings.fuel
    }

    fn opp_lr(&self) -> i32 {
        self.readings.opp_lr
    }

    fn opp_fb(&self) -> i32 {
        self.readings.opp_fb
    }

    fn num_barrels(&self) -> i32 {
        self.readings.barrels.len() as i32
    }

    fn barrel_lr(&self, index: usize) -> i32 {
        self.readings.barrels.get(index).map_or(NO_BARREL, |b| b.0)
    }

    fn barrel_fb(&self, index: usize) -> i32 {
        self.readings.barrels.get(index).map_or(NO_BARREL, |b| b.1)
    }

    fn wall_dist(&self) -> i32 {
        self.readings.wall_dist
    }
}

/// Run `program` for up to `ticks` ticks and collect the actions it performs.
/// Stops early once the program has nothing left to run.
pub fn trace_program(
    program: &Program,
    ticks: usize,
    readings: SensorReadings,
) -> Result<ActionTrace, ExecError> {
    let mut world = TraceWorld::new(readings);
    let mut program = program.clone();
    let mut actions = Vec::new();

    for _ in 0..ticks {
        if program.is_finished() {
            break;
        }
        program = program.execute(&mut world)?;
        actions.extend(world.end_tick());
    }

    Ok(ActionTrace(actions))
}
