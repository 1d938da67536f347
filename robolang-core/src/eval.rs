//! Expression and condition evaluation
//!
//! Evaluation reads sensors and variables through a [`Capability`] and never
//! changes it. Arithmetic is 32-bit and wraps on overflow.

use crate::ast::{BinaryOp, CompareOp, Cond, Expr, Sensor};
use crate::capability::Capability;
use thiserror::Error;

/// Evaluation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluate an expression. Undefined variables read as 0.
pub fn eval_expr<W: Capability + ?Sized>(expr: &Expr, world: &W) -> Result<i32, EvalError> {
    match expr {
        Expr::Num(n) => Ok(*n),
        Expr::Var(name) => Ok(world.read_var(name).unwrap_or(0)),
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, world)?;
            let r = eval_expr(right, world)?;
            match op {
                BinaryOp::Add => Ok(l.wrapping_add(r)),
                BinaryOp::Sub => Ok(l.wrapping_sub(r)),
                BinaryOp::Mul => Ok(l.wrapping_mul(r)),
                BinaryOp::Div => {
                    if r == 0 {
                        Err(EvalError::DivisionByZero)
                    } else {
                        Ok(l.wrapping_div(r))
                    }
                }
            }
        }
        Expr::Sensor(sensor) => eval_sensor(sensor, world),
    }
}

fn eval_sensor<W: Capability + ?Sized>(sensor: &Sensor, world: &W) -> Result<i32, EvalError> {
    match sensor {
        Sensor::FuelLeft => Ok(world.fuel_left()),
        Sensor::OppLR => Ok(world.opp_lr()),
        Sensor::OppFB => Ok(world.opp_fb()),
        Sensor::NumBarrels => Ok(world.num_barrels()),
        Sensor::BarrelLR(index) => Ok(world.barrel_lr(eval_index(index.as_deref(), world)?)),
        Sensor::BarrelFB(index) => Ok(world.barrel_fb(eval_index(index.as_deref(), world)?)),
        Sensor::WallDist => Ok(world.wall_dist()),
    }
}

/// Missing indices mean the closest barrel; negative ones clamp to it
fn eval_index<W: Capability + ?Sized>(index: Option<&Expr>, world: &W) -> Result<usize, EvalError> {
    match index {
        None => Ok(0),
        Some(expr) => Ok(eval_expr(expr, world)?.max(0) as usize),
    }
}

/// Evaluate a condition. Both operands of `and`/`or` are always evaluated.
pub fn eval_cond<W: Capability + ?Sized>(cond: &Cond, world: &W) -> Result<bool, EvalError> {
    match cond {
        Cond::Compare { op, left, right } => {
            let l = eval_expr(left, world)?;
            let r = eval_expr(right, world)?;
            Ok(match op {
                CompareOp::Lt => l < r,
                CompareOp::Gt => l > r,
                CompareOp::Eq => l == r,
            })
        }
        Cond::And(left, right) => {
            let l = eval_cond(left, world)?;
            let r = eval_cond(right, world)?;
            Ok(l && r)
        }
        Cond::Or(left, right) => {
            let l = eval_cond(left, world)?;
            let r = eval_cond(right, world)?;
            Ok(l || r)
        }
        Cond::Not(inner) => Ok(!eval_cond(inner, world)?),
    }
}
