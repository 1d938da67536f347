//! Turn engine for two agents sharing one arena
//!
//! Each tick runs the same phases:
//! 1. commit last tick's targets into the current state,
//! 2. let red and then blue think against views captured before either ran,
//! 3. keep an agent in place if its desired cell is taken,
//! 4. charge fuel for the tick,
//! 5. maybe spawn a barrel.
//!
//! Agents only ever write their target state while thinking, so whatever one
//! agent does cannot change what the other one senses in the same tick. The
//! exception is the shared barrel set: red's `takeFuel` is applied before blue
//! acts, so blue cannot collect a barrel red has just taken.

use crate::ast::Program;
use crate::capability::{Action, SlotError};
use crate::config::{ConfigError, MatchConfig};
use crate::grid::{Cell, Direction, Grid};
use crate::interpreter::ExecError;
use crate::rng::SplitMix64;
use crate::trace::{AgentTick, TickReport};
use crate::view::{AgentView, Decision, Perception};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    Blue,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => f.write_str("red"),
            Side::Blue => f.write_str("blue"),
        }
    }
}

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    RedWins,
    BlueWins,
    /// Both agents ran out of fuel in the same tick
    Draw,
    /// Tick limit reached with both agents alive
    Timeout,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::RedWins => f.write_str("Robot 2 (blue) ran out of fuel!"),
            Outcome::BlueWins => f.write_str("Robot 1 (red) ran out of fuel!"),
            Outcome::Draw => f.write_str("Both robots ran out of fuel!"),
            Outcome::Timeout => f.write_str("Tick limit reached, both robots still running"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{side} agent triggered a second action in one tick: {source}")]
    ActionSlotReused { side: Side, source: SlotError },

    #[error("match already finished: {0}")]
    MatchFinished(Outcome),
}

// ============================================================================
// Agents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BodyState {
    pub pos: Cell,
    pub dir: Direction,
    pub fuel: i32,
    pub shield: bool,
}

/// Physical state of an agent. `current` is what sensors see; `target` is
/// written while thinking and becomes current at the next commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotBody {
    pub current: BodyState,
    pub target: BodyState,
    /// Where the agent will actually stand next tick
    pub next_pos: Cell,
    /// Fuel siphoned by the opponent this tick
    pub stolen_fuel: i32,
}

impl RobotBody {
    pub fn new(pos: Cell, dir: Direction, fuel: i32) -> Self {
        let state = BodyState {
            pos,
            dir,
            fuel,
            shield: false,
        };
        Self {
            current: state,
            target: state,
            next_pos: pos,
            stolen_fuel: 0,
        }
    }

    pub fn commit(&mut self) {
        self.current = BodyState {
            pos: self.next_pos,
            dir: self.target.dir,
            fuel: self.settled_fuel(),
            shield: self.target.shield,
        };
        self.target = self.current;
        self.stolen_fuel = 0;
    }

    pub fn is_moving(&self) -> bool {
        self.current.pos != self.target.pos
    }

    pub fn is_turning(&self) -> bool {
        self.current.dir != self.target.dir
    }

    /// Fuel the next commit will install
    pub fn settled_fuel(&self) -> i32 {
        self.target.fuel - self.stolen_fuel
    }

    pub fn is_dead(&self) -> bool {
        self.settled_fuel() <= 0
    }

    /// At most a quarter tank, and never more than half of what is left
    pub fn extractable_fuel(&self, max_fuel: i32) -> i32 {
        (max_fuel / 4).min(self.current.fuel / 2).max(0)
    }

    fn tick_cost(&self, config: &MatchConfig) -> i32 {
        let mut cost = config.wait_cost;
        if self.current.shield {
            cost += config.shield_cost;
        }
        if self.is_moving() {
            cost += config.move_cost;
        }
        if self.is_turning() {
            cost += config.turn_cost;
        }
        cost
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AgentStatus {
    Running,
    /// The program hit a runtime fault and was discarded
    Faulted { reason: String },
}

/// An agent: its body, its remaining program and its variable store
#[derive(Debug, Clone)]
pub struct Agent {
    pub body: RobotBody,
    pub program: Program,
    pub vars: HashMap<String, i32>,
    pub status: AgentStatus,
}

impl Agent {
    pub fn new(body: RobotBody, program: Program) -> Self {
        Self {
            body,
            program,
            vars: HashMap::new(),
            status: AgentStatus::Running,
        }
    }
}

struct Thought {
    decision: Decision,
    fault: Option<String>,
}

// ============================================================================
// Arena
// ============================================================================

pub struct Arena {
    config: MatchConfig,
    grid: Grid,
    barrels: BTreeSet<Cell>,
    rng: SplitMix64,
    red: Agent,
    blue: Agent,
    tick: u64,
}

impl Arena {
    /// Red starts in the north-west corner facing south, blue in the
    /// south-east corner facing north
    pub fn new(config: MatchConfig, red: Program, blue: Program) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.grid_size);
        let far = config.grid_size - 1;

        let mut arena = Self {
            grid,
            barrels: BTreeSet::new(),
            rng: SplitMix64::new(config.seed),
            red: Agent::new(
                RobotBody::new(Cell::new(0, 0), Direction::South, config.max_fuel),
                red,
            ),
            blue: Agent::new(
                RobotBody::new(Cell::new(far, far), Direction::North, config.max_fuel),
                blue,
            ),
            tick: 0,
            config,
        };
        for _ in 0..arena.config.initial_barrels {
            arena.spawn_barrel();
        }
        Ok(arena)
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn barrels(&self) -> &BTreeSet<Cell> {
        &self.barrels
    }

    /// Place a barrel by hand; false if the cell is outside or already has one
    pub fn place_barrel(&mut self, cell: Cell) -> bool {
        self.grid.contains(cell) && self.barrels.insert(cell)
    }

    pub fn clear_barrels(&mut self) {
        self.barrels.clear();
    }

    pub fn agent(&self, side: Side) -> &Agent {
        match side {
            Side::Red => &self.red,
            Side::Blue => &self.blue,
        }
    }

    pub fn agent_mut(&mut self, side: Side) -> &mut Agent {
        match side {
            Side::Red => &mut self.red,
            Side::Blue => &mut self.blue,
        }
    }

    /// Decided once either agent is out of fuel
    pub fn outcome(&self) -> Option<Outcome> {
        match (self.red.body.is_dead(), self.blue.body.is_dead()) {
            (false, false) => None,
            (true, true) => Some(Outcome::Draw),
            (false, true) => Some(Outcome::RedWins),
            (true, false) => Some(Outcome::BlueWins),
        }
    }

    pub fn next_turn(&mut self) -> Result<TickReport, EngineError> {
        if let Some(outcome) = self.outcome() {
            return Err(EngineError::MatchFinished(outcome));
        }

        self.red.body.commit();
        self.blue.body.commit();

        let red_view = Perception::capture(&self.grid, &self.barrels, &self.red.body, &self.blue.body);
        let blue_view = Perception::capture(&self.grid, &self.barrels, &self.blue.body, &self.red.body);

        let red_thought = think(&mut self.red, &red_view, Side::Red)?;
        apply_decision(
            &self.grid,
            &self.config,
            &mut self.barrels,
            &mut self.red.body,
            &mut self.blue.body,
            red_thought.decision,
        );
        let blue_thought = think(&mut self.blue, &blue_view, Side::Blue)?;
        apply_decision(
            &self.grid,
            &self.config,
            &mut self.barrels,
            &mut self.blue.body,
            &mut self.red.body,
            blue_thought.decision,
        );

        let red_blocked = resolve_move(&mut self.red.body, &self.blue.body);
        let blue_blocked = resolve_move(&mut self.blue.body, &self.red.body);

        let red_cost = self.red.body.tick_cost(&self.config);
        let blue_cost = self.blue.body.tick_cost(&self.config);
        self.red.body.target.fuel -= red_cost;
        self.blue.body.target.fuel -= blue_cost;

        if self.rng.chance(self.config.barrel_spawn_chance) {
            self.spawn_barrel();
        }

        self.tick += 1;
        let report = TickReport {
            tick: self.tick,
            red: agent_tick(&self.red.body, red_thought, red_blocked),
            blue: agent_tick(&self.blue.body, blue_thought, blue_blocked),
            barrels: self.barrels.len(),
        };
        tracing::debug!(
            tick = report.tick,
            red = ?report.red.action,
            blue = ?report.blue.action,
            red_fuel = report.red.fuel,
            blue_fuel = report.blue.fuel,
            "tick resolved"
        );
        Ok(report)
    }

    /// Put a barrel on a uniformly chosen cell holding neither a barrel nor an agent
    fn spawn_barrel(&mut self) {
        let occupied = [
            self.red.body.current.pos,
            self.red.body.next_pos,
            self.blue.body.current.pos,
            self.blue.body.next_pos,
        ];
        let free: Vec<Cell> = self
            .grid
            .cells()
            .filter(|cell| !self.barrels.contains(cell) && !occupied.contains(cell))
            .collect();
        if free.is_empty() {
            return;
        }
        let cell = free[self.rng.below(free.len())];
        tracing::trace!(%cell, "barrel spawned");
        self.barrels.insert(cell);
    }
}

/// Run one think phase. Runtime faults discard the program; a reused action
/// slot means a broken capability and aborts the tick.
fn think(agent: &mut Agent, perception: &Perception, side: Side) -> Result<Thought, EngineError> {
    let mut view = AgentView::new(perception, &mut agent.vars);
    match agent.program.execute(&mut view) {
        Ok(rest) => {
            let decision = view.finish();
            agent.program = rest;
            Ok(Thought {
                decision,
                fault: None,
            })
        }
        Err(ExecError::Slot(source)) => Err(EngineError::ActionSlotReused { side, source }),
        Err(err) => {
            tracing::warn!(%side, error = %err, "program faulted, agent halted");
            agent.program = Program::default();
            agent.status = AgentStatus::Faulted {
                reason: err.to_string(),
            };
            Ok(Thought {
                decision: Decision::default(),
                fault: Some(err.to_string()),
            })
        }
    }
}

fn apply_decision(
    grid: &Grid,
    config: &MatchConfig,
    barrels: &mut BTreeSet<Cell>,
    me: &mut RobotBody,
    other: &mut RobotBody,
    decision: Decision,
) {
    if let Some(on) = decision.shield {
        me.target.shield = on;
    }
    let Some(action) = decision.action else {
        return;
    };
    match action {
        Action::Move => me.target.pos = grid.step(me.current.pos, me.current.dir),
        Action::TurnL => me.target.dir = me.current.dir.turn_left(),
        Action::TurnR => me.target.dir = me.current.dir.turn_right(),
        Action::TurnAround => me.target.dir = me.current.dir.reverse(),
        Action::Wait => {}
        Action::TakeFuel => {
            if barrels.remove(&me.current.pos) {
                me.target.fuel = config.max_fuel;
            }
            let ahead = grid.step(me.current.pos, me.current.dir);
            if !other.current.shield && ahead == other.current.pos {
                let took = other.extractable_fuel(config.max_fuel);
                other.stolen_fuel = took;
                me.target.fuel = (me.target.fuel + took).min(config.max_fuel);
            }
        }
    }
}

/// Returns true if the agent wanted to move but stays put
fn resolve_move(me: &mut RobotBody, other: &RobotBody) -> bool {
    if !me.is_moving() {
        return false;
    }
    let occupied = me.target.pos == other.target.pos || me.target.pos == other.current.pos;
    if occupied {
        tracing::trace!(cell = %me.target.pos, "move blocked");
    } else {
        me.next_pos = me.target.pos;
    }
    occupied
}

fn agent_tick(body: &RobotBody, thought: Thought, blocked: bool) -> AgentTick {
    AgentTick {
        action: thought.decision.action,
        shield: body.target.shield,
        from: body.current.pos,
        to: body.next_pos,
        facing: body.target.dir,
        fuel: body.settled_fuel(),
        blocked,
        fault: thought.fault,
    }
}
