pub mod ast;
pub mod capability;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod eval;
pub mod grid;
pub mod interpreter;
pub mod parser;
pub mod programs;
pub mod rng;
pub mod runtime;
pub mod tokenizer;
pub mod trace;
pub mod view;

pub use ast::{Block, Cond, Expr, Program, Sensor, Stmt};
pub use capability::{Action, Capability, SlotError, NO_BARREL};
pub use config::{ConfigError, MatchConfig};
pub use diagnostics::{format_syntax_error, SourceLocation};
pub use engine::{Agent, AgentStatus, Arena, EngineError, Outcome, RobotBody, Side};
pub use eval::EvalError;
pub use interpreter::{ExecError, MAX_STEPS_PER_TICK};
pub use parser::{parse_program, ParseError};
pub use runtime::{build_match, load_program, run_match, Match, MatchResult, RuntimeError};
pub use trace::{trace_program, ActionTrace, SensorReadings, TickReport, TraceWorld};

// Test helpers module (public for integration tests)
// Always compiled - integration tests are separate crates and need access
pub mod tests;
