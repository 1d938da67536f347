//! The interface a running program uses to observe and affect its world
//!
//! A capability lives for one agent's think phase in one tick. It offers a
//! single action slot: the first trigger consumes it and any further trigger
//! is a [`SlotError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Sensor reading for a barrel index past the end of the barrel list
pub const NO_BARREL: i32 = i32::MAX;

/// World-affecting actions that consume the per-tick action slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Move,
    TurnL,
    TurnR,
    TurnAround,
    TakeFuel,
    Wait,
}

impl Action {
    pub fn keyword(self) -> &'static str {
        match self {
            Action::Move => "move",
            Action::TurnL => "turnL",
            Action::TurnR => "turnR",
            Action::TurnAround => "turnAround",
            Action::TakeFuel => "takeFuel",
            Action::Wait => "wait",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A second action was triggered on a capability whose slot is already used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("action slot already used this tick (attempted {attempted}, already performed {performed})")]
pub struct SlotError {
    pub attempted: Action,
    pub performed: Action,
}

pub trait Capability {
    /// Whether this tick's action has been performed
    fn used(&self) -> bool;

    fn read_var(&self, name: &str) -> Option<i32>;

    fn write_var(&mut self, name: &str, value: i32);

    /// Trigger an action, consuming the slot
    fn perform(&mut self, action: Action) -> Result<(), SlotError>;

    /// Set the pending shield state. Does not consume the slot.
    fn set_shield(&mut self, on: bool);

    // ── Sensors ──

    fn fuel_left(&self) -> i32;

    /// Opponent offset across the facing direction, positive to the right
    fn opp_lr(&self) -> i32;

    /// Opponent offset along the facing direction, positive ahead
    fn opp_fb(&self) -> i32;

    fn num_barrels(&self) -> i32;

    /// Left-right offset of the `index`-th closest barrel, or [`NO_BARREL`]
    fn barrel_lr(&self, index: usize) -> i32;

    fn barrel_fb(&self, index: usize) -> i32;

    /// Cells between the agent and the wall it faces
    fn wall_dist(&self) -> i32;

    fn do_move(&mut self) -> Result<(), SlotError> {
        self.perform(Action::Move)
    }

    fn turn_left(&mut self) -> Result<(), SlotError> {
        self.perform(Action::TurnL)
    }

    fn turn_right(&mut self) -> Result<(), SlotError> {
        self.perform(Action::TurnR)
    }

    fn turn_around(&mut self) -> Result<(), SlotError> {
        self.perform(Action::TurnAround)
    }

    fn take_fuel(&mut self) -> Result<(), SlotError> {
        self.perform(Action::TakeFuel)
    }

    fn do_wait(&mut self) -> Result<(), SlotError> {
        self.perform(Action::Wait)
    }
}
