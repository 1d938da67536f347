//! Resumable statement execution
//!
//! Executing a statement performs at most one action on the capability and
//! returns the statement that remains to run, or `None` once it is finished.
//! Loops are unrolled by rewriting: a `loop` or a `while` whose condition holds
//! becomes a block of its body followed by the loop itself, and that block is
//! spliced into the enclosing sequence. Nothing is mutated; every residual is
//! a new tree sharing the unchanged parts.

use crate::ast::{Block, Expr, Program, Stmt};
use crate::capability::{Capability, SlotError};
use crate::eval::{eval_cond, eval_expr, EvalError};
use std::sync::Arc;
use thiserror::Error;

/// Statements a program may run in one tick without performing an action
pub const MAX_STEPS_PER_TICK: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error("no action performed after {limit} steps")]
    StepLimitExceeded { limit: usize },
}

impl Stmt {
    pub fn execute<W: Capability + ?Sized>(&self, world: &mut W) -> Result<Option<Stmt>, ExecError> {
        match self {
            Stmt::TurnL => act(world.turn_left()),
            Stmt::TurnR => act(world.turn_right()),
            Stmt::TurnAround => act(world.turn_around()),
            Stmt::TakeFuel => act(world.take_fuel()),
            Stmt::ShieldOn => {
                world.set_shield(true);
                Ok(None)
            }
            Stmt::ShieldOff => {
                world.set_shield(false);
                Ok(None)
            }
            Stmt::Move(count) => repeat(world, W::do_move, count.as_deref())
                .map(|rest| rest.map(|n| Stmt::Move(Some(n)))),
            Stmt::Wait(count) => repeat(world, W::do_wait, count.as_deref())
                .map(|rest| rest.map(|n| Stmt::Wait(Some(n)))),
            Stmt::Assign { name, value } => {
                let value = eval_expr(value, &*world)?;
                world.write_var(name, value);
                Ok(None)
            }
            Stmt::Loop(body) => Ok(Some(Stmt::Block(body.followed_by(self.clone())))),
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                if eval_cond(cond, &*world)? {
                    Ok(Some(Stmt::Block(then.clone())))
                } else {
                    Ok(otherwise.clone().map(Stmt::Block))
                }
            }
            Stmt::While { cond, body } => {
                if eval_cond(cond, &*world)? {
                    Ok(Some(Stmt::Block(body.followed_by(self.clone()))))
                } else {
                    Ok(None)
                }
            }
            Stmt::Block(block) => Ok(block.execute(world)?.map(Stmt::Block)),
        }
    }
}

fn act(triggered: Result<(), SlotError>) -> Result<Option<Stmt>, ExecError> {
    triggered?;
    Ok(None)
}

/// One step of a counted action. Returns the remaining count, if any.
fn repeat<W: Capability + ?Sized>(
    world: &mut W,
    trigger: fn(&mut W) -> Result<(), SlotError>,
    count: Option<&Expr>,
) -> Result<Option<Arc<Expr>>, ExecError> {
    let remaining = match count {
        Some(expr) => eval_expr(expr, &*world)?,
        None => 1,
    };
    trigger(world)?;
    if remaining > 1 {
        Ok(Some(Arc::new(Expr::Num(remaining - 1))))
    } else {
        Ok(None)
    }
}

impl Block {
    pub fn execute<W: Capability + ?Sized>(&self, world: &mut W) -> Result<Option<Block>, ExecError> {
        match self.first().execute(world)? {
            None => Ok(self.without_first()),
            Some(residual) => Ok(Some(self.with_first(residual))),
        }
    }
}

impl Program {
    /// Run until the capability's action slot is used or the program is empty,
    /// returning the program that remains for the next tick
    pub fn execute<W: Capability + ?Sized>(&self, world: &mut W) -> Result<Program, ExecError> {
        let mut stmts = self.stmts.clone();
        let mut steps = 0;
        while !world.used() && !stmts.is_empty() {
            if steps == MAX_STEPS_PER_TICK {
                return Err(ExecError::StepLimitExceeded {
                    limit: MAX_STEPS_PER_TICK,
                });
            }
            steps += 1;
            match stmts[0].execute(world)? {
                Some(Stmt::Block(inner)) => {
                    stmts.splice(0..1, inner.stmts().iter().cloned());
                }
                Some(residual) => stmts[0] = residual,
                None => {
                    stmts.remove(0);
                }
            }
        }
        Ok(Program::new(stmts))
    }
}
