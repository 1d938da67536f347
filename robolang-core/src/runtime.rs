//! Match runtime
//!
//! Builds an arena from two program sources and a configuration, then steps
//! it until an outcome is reached, collecting one report per tick.

use crate::ast::Program;
use crate::config::{ConfigError, MatchConfig};
use crate::engine::{Arena, EngineError, Outcome, Side};
use crate::parser::{parse_program, ParseError};
use crate::programs::default_program;
use crate::trace::TickReport;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{side} program: syntax error at {}: {source}", .source.location())]
    Parse { side: Side, source: ParseError },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Final result of running a match
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub outcome: Outcome,
    pub ticks: u64,
    pub trace: Vec<TickReport>,
}

/// A match in progress
pub struct Match {
    arena: Arena,
}

/// Parse one side's program; a missing source means the default program
pub fn load_program(side: Side, source: Option<&str>) -> Result<Program, RuntimeError> {
    match source {
        Some(text) => parse_program(text).map_err(|source| RuntimeError::Parse { side, source }),
        None => Ok(default_program()),
    }
}

/// Build a match from the sources of both sides
pub fn build_match(
    red_source: Option<&str>,
    blue_source: Option<&str>,
    config: MatchConfig,
) -> Result<Match, RuntimeError> {
    let red = load_program(Side::Red, red_source)?;
    let blue = load_program(Side::Blue, blue_source)?;
    Match::new(config, red, blue)
}

/// Main entry point: parse both programs and play until the match ends
pub fn run_match(
    red_source: Option<&str>,
    blue_source: Option<&str>,
    config: MatchConfig,
) -> Result<MatchResult, RuntimeError> {
    build_match(red_source, blue_source, config)?.run()
}

impl Match {
    pub fn new(config: MatchConfig, red: Program, blue: Program) -> Result<Self, RuntimeError> {
        Ok(Self {
            arena: Arena::new(config, red, blue)?,
        })
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Death takes precedence over the tick limit
    pub fn outcome(&self) -> Option<Outcome> {
        self.arena.outcome().or_else(|| {
            (self.arena.tick() >= self.arena.config().max_ticks).then_some(Outcome::Timeout)
        })
    }

    /// Play one tick; `None` once the match is over
    pub fn step(&mut self) -> Result<Option<TickReport>, RuntimeError> {
        if self.outcome().is_some() {
            return Ok(None);
        }
        Ok(Some(self.arena.next_turn()?))
    }

    pub fn run(mut self) -> Result<MatchResult, RuntimeError> {
        let mut trace = Vec::new();
        while let Some(report) = self.step()? {
            trace.push(report);
        }
        let outcome = self.outcome().unwrap_or(Outcome::Timeout);
        tracing::info!(%outcome, ticks = self.arena.tick(), "match finished");

        Ok(MatchResult {
            outcome,
            ticks: self.arena.tick(),
            trace,
        })
    }
}
