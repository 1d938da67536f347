//! Per-tick capability handed to an agent's program by the arena
//!
//! Sensor readings are captured before either agent thinks, so both agents
//! query the same settled world. The view only records the chosen action and
//! shield change; the arena applies them once the program has run.

use crate::capability::{Action, Capability, SlotError, NO_BARREL};
use crate::engine::RobotBody;
use crate::grid::{Cell, Grid};
use glam::IVec2;
use std::collections::{BTreeSet, HashMap};

/// What an agent can sense at the start of its think phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Perception {
    pub fuel: i32,
    /// Opponent as (left-right, front-back)
    pub opponent: IVec2,
    /// Barrels as (left-right, front-back), closest first
    pub barrels: Vec<IVec2>,
    pub wall_distance: i32,
}

impl Perception {
    pub fn capture(grid: &Grid, barrels: &BTreeSet<Cell>, me: &RobotBody, other: &RobotBody) -> Self {
        let here = me.current.pos;
        let facing = me.current.dir;

        let mut relative: Vec<IVec2> = barrels
            .iter()
            .map(|barrel| facing.relative(barrel.0 - here.0))
            .collect();
        // stable, so equal distances keep row-major order
        relative.sort_by_key(|offset| offset.x.abs() + offset.y.abs());

        Self {
            fuel: me.current.fuel,
            opponent: facing.relative(other.current.pos.0 - here.0),
            barrels: relative,
            wall_distance: grid.wall_distance(here, facing),
        }
    }
}

/// The decisions a program made during one think phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decision {
    pub action: Option<Action>,
    pub shield: Option<bool>,
}

pub struct AgentView<'a> {
    perception: &'a Perception,
    vars: &'a mut HashMap<String, i32>,
    decision: Decision,
}

impl<'a> AgentView<'a> {
    pub fn new(perception: &'a Perception, vars: &'a mut HashMap<String, i32>) -> Self {
        Self {
            perception,
            vars,
            decision: Decision::default(),
        }
    }

    pub fn finish(self) -> Decision {
        self.decision
    }

    fn barrel(&self, index: usize) -> Option<IVec2> {
        self.perception.barrels.get(index).copied()
    }
}

impl Capability for AgentView<'_> {
    fn used(&self) -> bool {
        self.decision.action.is_some()
    }

    fn read_var(&self, name: &str) -> Option<i32> {
        self.vars.get(name).copied()
    }

    fn write_var(&mut self, name: &str, value: i32) {
        self.vars.insert(name.to_string(), value);
    }

    fn perform(&mut self, action: Action) -> Result<(), SlotError> {
        if let Some(performed) = self.decision.action {
            return Err(SlotError {
                attempted: action,
                performed,
            });
        }
        self.decision.action = Some(action);
        Ok(())
    }

    fn set_shield(&mut self, on: bool) {
        self.decision.shield = Some(on);
    }

    fn fuel_left(&self) -> i32 {
        self.perception.fuel
    }

    fn opp_lr(&self) -> i32 {
        self.perception.opponent.x
    }

    fn opp_fb(&self) -> i32 {
        self.perception.opponent.y
    }

    fn num_barrels(&self) -> i32 {
        self.perception.barrels.len() as i32
    }

    fn barrel_lr(&self, index: usize) -> i32 {
        self.barrel(index).map_or(NO_BARREL, |b| b.x)
    }

    fn barrel_fb(&self, index: usize) -> i32 {
        self.barrel(index).map_or(NO_BARREL, |b| b.y)
    }

    fn wall_dist(&self) -> i32 {
        self.perception.wall_distance
    }
}
