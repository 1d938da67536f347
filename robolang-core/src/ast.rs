//! Abstract syntax tree for robot programs
//!
//! Statements share their children through `Arc`, so the residual trees built
//! by the interpreter reuse every subtree they do not change. `Display`
//! renders the canonical `Variant[field, field]` form used by golden tests;
//! [`Program::to_source`] renders parseable program text.

use std::fmt::{self, Write};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Expressions
// ============================================================================

/// Integer expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Num(i32),
    /// Variable name without the leading `$`
    Var(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Sensor(Sensor),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Sensor reads. The barrel sensors take an optional index into the
/// distance-ordered barrel list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sensor {
    FuelLeft,
    OppLR,
    OppFB,
    NumBarrels,
    BarrelLR(Option<Box<Expr>>),
    BarrelFB(Option<Box<Expr>>),
    WallDist,
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn add(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Add, left, right)
    }

    pub fn sub(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Sub, left, right)
    }

    pub fn mul(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Mul, left, right)
    }

    pub fn div(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Div, left, right)
    }
}

impl BinaryOp {
    /// Keyword used in program text
    pub fn keyword(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
        }
    }

    fn variant_name(self) -> &'static str {
        match self {
            BinaryOp::Add => "Add",
            BinaryOp::Sub => "Sub",
            BinaryOp::Mul => "Mul",
            BinaryOp::Div => "Div",
        }
    }
}

impl Sensor {
    pub fn keyword(&self) -> &'static str {
        match self {
            Sensor::FuelLeft => "fuelLeft",
            Sensor::OppLR => "oppLR",
            Sensor::OppFB => "oppFB",
            Sensor::NumBarrels => "numBarrels",
            Sensor::BarrelLR(_) => "barrelLR",
            Sensor::BarrelFB(_) => "barrelFB",
            Sensor::WallDist => "wallDist",
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Sensor::FuelLeft => "FuelLeft",
            Sensor::OppLR => "OppLR",
            Sensor::OppFB => "OppFB",
            Sensor::NumBarrels => "NumBarrels",
            Sensor::BarrelLR(_) => "BarrelLR",
            Sensor::BarrelFB(_) => "BarrelFB",
            Sensor::WallDist => "WallDist",
        }
    }

    fn index(&self) -> Option<&Expr> {
        match self {
            Sensor::BarrelLR(index) | Sensor::BarrelFB(index) => index.as_deref(),
            _ => None,
        }
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// Boolean condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cond {
    Compare {
        op: CompareOp,
        left: Expr,
        right: Expr,
    },
    And(Box<Cond>, Box<Cond>),
    Or(Box<Cond>, Box<Cond>),
    Not(Box<Cond>),
}

/// Relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Eq,
}

impl Cond {
    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Cond::Compare { op, left, right }
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Lt, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Gt, left, right)
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::compare(CompareOp::Eq, left, right)
    }

    pub fn and(left: Cond, right: Cond) -> Self {
        Cond::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Cond, right: Cond) -> Self {
        Cond::Or(Box::new(left), Box::new(right))
    }

    pub fn not(inner: Cond) -> Self {
        Cond::Not(Box::new(inner))
    }
}

impl CompareOp {
    pub fn keyword(self) -> &'static str {
        match self {
            CompareOp::Lt => "lt",
            CompareOp::Gt => "gt",
            CompareOp::Eq => "eq",
        }
    }

    fn variant_name(self) -> &'static str {
        match self {
            CompareOp::Lt => "Lt",
            CompareOp::Gt => "Gt",
            CompareOp::Eq => "Eq",
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// Statement. Besides nested `{ ... }` blocks, `Block` is the residual the
/// interpreter produces for compound statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    TurnL,
    TurnR,
    TurnAround,
    TakeFuel,
    ShieldOn,
    ShieldOff,
    /// Move forward, optionally repeated over several ticks
    Move(Option<Arc<Expr>>),
    Wait(Option<Arc<Expr>>),
    Assign {
        /// Variable name without the leading `$`
        name: String,
        value: Arc<Expr>,
    },
    Loop(Block),
    If {
        cond: Arc<Cond>,
        then: Block,
        otherwise: Option<Block>,
    },
    While {
        cond: Arc<Cond>,
        body: Block,
    },
    Block(Block),
}

impl Stmt {
    pub fn move_by(steps: Expr) -> Self {
        Stmt::Move(Some(Arc::new(steps)))
    }

    pub fn wait_for(ticks: Expr) -> Self {
        Stmt::Wait(Some(Arc::new(ticks)))
    }

    pub fn assign(name: &str, value: Expr) -> Self {
        Stmt::Assign {
            name: name.to_string(),
            value: Arc::new(value),
        }
    }

    pub fn if_then(cond: Cond, then: Block, otherwise: Option<Block>) -> Self {
        Stmt::If {
            cond: Arc::new(cond),
            then,
            otherwise,
        }
    }

    pub fn while_do(cond: Cond, body: Block) -> Self {
        Stmt::While {
            cond: Arc::new(cond),
            body,
        }
    }
}

/// Raised when a block would be built from zero statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("block needs a non empty list of statements")]
pub struct EmptyBlock;

/// Non-empty sequence of statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    stmts: Arc<[Stmt]>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Result<Self, EmptyBlock> {
        if stmts.is_empty() {
            return Err(EmptyBlock);
        }
        Ok(Self {
            stmts: stmts.into(),
        })
    }

    /// Build a block from a first statement and any number of followers
    pub fn of(first: Stmt, rest: impl IntoIterator<Item = Stmt>) -> Self {
        let stmts: Vec<Stmt> = std::iter::once(first).chain(rest).collect();
        Self {
            stmts: stmts.into(),
        }
    }

    pub fn single(stmt: Stmt) -> Self {
        Self::of(stmt, [])
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn first(&self) -> &Stmt {
        &self.stmts[0]
    }

    /// The block without its first statement, if anything remains
    pub(crate) fn without_first(&self) -> Option<Block> {
        if self.stmts.len() == 1 {
            return None;
        }
        Some(Self {
            stmts: self.stmts[1..].into(),
        })
    }

    /// The block with its first statement swapped for `first`. A block
    /// residual is spliced in place so loops never nest deeper per iteration.
    pub(crate) fn with_first(&self, first: Stmt) -> Block {
        let rest = self.stmts[1..].iter().cloned();
        match first {
            Stmt::Block(inner) => {
                let stmts: Vec<Stmt> = inner.stmts.iter().cloned().chain(rest).collect();
                Self {
                    stmts: stmts.into(),
                }
            }
            first => Self::of(first, rest),
        }
    }

    /// The block followed by `last`
    pub(crate) fn followed_by(&self, last: Stmt) -> Block {
        let stmts: Vec<Stmt> = self.stmts.iter().cloned().chain([last]).collect();
        Self {
            stmts: stmts.into(),
        }
    }
}

/// Top-level statement sequence; may be empty once fully executed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Program {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn is_finished(&self) -> bool {
        self.stmts.is_empty()
    }
}

// ============================================================================
// Canonical rendering
// ============================================================================

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(n) => write!(f, "Num[{}]", n),
            Expr::Var(name) => write!(f, "Var[${}]", name),
            Expr::Binary { op, left, right } => {
                write!(f, "{}[{}, {}]", op.variant_name(), left, right)
            }
            Expr::Sensor(sensor) => write!(f, "{}", sensor),
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variant_name())?;
        if let Some(index) = self.index() {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cond::Compare { op, left, right } => {
                write!(f, "{}[{}, {}]", op.variant_name(), left, right)
            }
            Cond::And(left, right) => write!(f, "And[{}, {}]", left, right),
            Cond::Or(left, right) => write!(f, "Or[{}, {}]", left, right),
            Cond::Not(inner) => write!(f, "Not[{}]", inner),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('[')?;
        write_list(f, &self.stmts)?;
        f.write_char(']')
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::TurnL => f.write_str("TurnL"),
            Stmt::TurnR => f.write_str("TurnR"),
            Stmt::TurnAround => f.write_str("TurnAround"),
            Stmt::TakeFuel => f.write_str("TakeFuel"),
            Stmt::ShieldOn => f.write_str("ShieldOn"),
            Stmt::ShieldOff => f.write_str("ShieldOff"),
            Stmt::Move(None) => f.write_str("Move"),
            Stmt::Move(Some(steps)) => write!(f, "Move[{}]", steps),
            Stmt::Wait(None) => f.write_str("Wait"),
            Stmt::Wait(Some(ticks)) => write!(f, "Wait[{}]", ticks),
            Stmt::Assign { name, value } => write!(f, "Ass[${}= {}]", name, value),
            Stmt::Loop(body) => write!(f, "Loop{}", body),
            Stmt::If {
                cond,
                then,
                otherwise: None,
            } => write!(f, "If[{}, {}]", cond, then),
            Stmt::If {
                cond,
                then,
                otherwise: Some(otherwise),
            } => write!(f, "If[{}, {}, {}]", cond, then, otherwise),
            Stmt::While { cond, body } => write!(f, "While[{}, {}]", cond, body),
            Stmt::Block(block) => write!(f, "{}", block),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Program[")?;
        write_list(f, &self.stmts)?;
        f.write_char(']')
    }
}

// ============================================================================
// Source rendering
// ============================================================================

const INDENT: &str = "    ";

impl Program {
    /// Render the program as parseable source text, one statement per line
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for stmt in &self.stmts {
            write_stmt_source(&mut out, stmt, 0);
        }
        out
    }
}

fn write_stmt_source(out: &mut String, stmt: &Stmt, depth: usize) {
    let pad = INDENT.repeat(depth);
    match stmt {
        Stmt::TurnL => out.push_str(&format!("{pad}turnL;\n")),
        Stmt::TurnR => out.push_str(&format!("{pad}turnR;\n")),
        Stmt::TurnAround => out.push_str(&format!("{pad}turnAround;\n")),
        Stmt::TakeFuel => out.push_str(&format!("{pad}takeFuel;\n")),
        Stmt::ShieldOn => out.push_str(&format!("{pad}shieldOn;\n")),
        Stmt::ShieldOff => out.push_str(&format!("{pad}shieldOff;\n")),
        Stmt::Move(None) => out.push_str(&format!("{pad}move;\n")),
        Stmt::Move(Some(steps)) => out.push_str(&format!("{pad}move({});\n", expr_source(steps))),
        Stmt::Wait(None) => out.push_str(&format!("{pad}wait;\n")),
        Stmt::Wait(Some(ticks)) => out.push_str(&format!("{pad}wait({});\n", expr_source(ticks))),
        Stmt::Assign { name, value } => {
            out.push_str(&format!("{pad}${} = {};\n", name, expr_source(value)))
        }
        Stmt::Loop(body) => {
            out.push_str(&format!("{pad}loop "));
            write_block_source(out, body, depth);
            out.push('\n');
        }
        Stmt::If {
            cond,
            then,
            otherwise,
        } => {
            out.push_str(&format!("{pad}if ({}) ", cond_source(cond)));
            write_block_source(out, then, depth);
            if let Some(otherwise) = otherwise {
                out.push_str(" else ");
                write_block_source(out, otherwise, depth);
            }
            out.push('\n');
        }
        Stmt::While { cond, body } => {
            out.push_str(&format!("{pad}while ({}) ", cond_source(cond)));
            write_block_source(out, body, depth);
            out.push('\n');
        }
        Stmt::Block(block) => {
            out.push_str(&pad);
            write_block_source(out, block, depth);
            out.push('\n');
        }
    }
}

fn write_block_source(out: &mut String, block: &Block, depth: usize) {
    out.push_str("{\n");
    for stmt in block.stmts() {
        write_stmt_source(out, stmt, depth + 1);
    }
    out.push_str(&INDENT.repeat(depth));
    out.push('}');
}

fn expr_source(expr: &Expr) -> String {
    match expr {
        Expr::Num(n) => n.to_string(),
        Expr::Var(name) => format!("${}", name),
        Expr::Binary { op, left, right } => format!(
            "{}({}, {})",
            op.keyword(),
            expr_source(left),
            expr_source(right)
        ),
        Expr::Sensor(sensor) => match sensor.index() {
            Some(index) => format!("{}({})", sensor.keyword(), expr_source(index)),
            None => sensor.keyword().to_string(),
        },
    }
}

fn cond_source(cond: &Cond) -> String {
    match cond {
        Cond::Compare { op, left, right } => format!(
            "{}({}, {})",
            op.keyword(),
            expr_source(left),
            expr_source(right)
        ),
        Cond::And(left, right) => format!("and({}, {})", cond_source(left), cond_source(right)),
        Cond::Or(left, right) => format!("or({}, {})", cond_source(left), cond_source(right)),
        Cond::Not(inner) => format!("not({})", cond_source(inner)),
    }
}
