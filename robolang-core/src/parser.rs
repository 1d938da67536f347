//! Recursive-descent parser for robot programs
//!
//! Every alternative is chosen by its leading keyword or token class, so the
//! parser never backtracks. Each `parse_*` method consumes exactly the tokens
//! of its construct and leaves the tokenizer on the first token after it.

use crate::ast::{BinaryOp, Block, CompareOp, Cond, Expr, Program, Sensor, Stmt};
use crate::diagnostics::SourceLocation;
use crate::tokenizer::{TokenKind, Tokenizer};
use std::sync::Arc;
use thiserror::Error;

/// Leading tokens accepted at statement position
pub const STATEMENT_STARTS: &[&str] = &[
    "variable name",
    "loop",
    "if",
    "while",
    "move",
    "turnL",
    "turnR",
    "turnAround",
    "shieldOn",
    "shieldOff",
    "takeFuel",
    "wait",
    "{",
];

pub const CONDITION_STARTS: &[&str] = &["lt", "gt", "eq", "and", "or", "not"];

pub const EXPRESSION_STARTS: &[&str] = &[
    "number",
    "variable name",
    "fuelLeft",
    "oppLR",
    "oppFB",
    "numBarrels",
    "barrelLR",
    "barrelFB",
    "wallDist",
    "add",
    "sub",
    "mul",
    "div",
];

/// Syntax error with the 1-based position where it was detected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected token [{found}] Expected [{expected}]")]
    UnexpectedToken {
        found: String,
        expected: String,
        location: SourceLocation,
    },

    /// No alternative of `construct` starts with `found`
    #[error("Unexpected token [{found}] Expected {construct}, one of [{}]", .options.join(", "))]
    Unrecognized {
        found: String,
        construct: &'static str,
        options: &'static [&'static str],
        location: SourceLocation,
    },

    #[error("Unexpected token [END OF INPUT] Expected [{expected}]")]
    UnexpectedEnd {
        expected: String,
        location: SourceLocation,
    },

    #[error("Block needs a non empty list of statements")]
    EmptyBlock { location: SourceLocation },

    #[error("Invalid number format: {literal}")]
    InvalidNumber {
        literal: String,
        location: SourceLocation,
    },
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::UnexpectedToken { location, .. }
            | Self::Unrecognized { location, .. }
            | Self::UnexpectedEnd { location, .. }
            | Self::EmptyBlock { location }
            | Self::InvalidNumber { location, .. } => *location,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Parse a complete program
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    Parser::new(source).parse()
}

pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            tokens: Tokenizer::new(source),
        }
    }

    /// Parse statements until the input is exhausted
    pub fn parse(mut self) -> Result<Program, ParseError> {
        let mut stmts = Vec::new();
        while self.tokens.has_next() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(Program::new(stmts))
    }

    // ── Statements ─────────────────────────────────────

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        if self.tokens.next_is_kind(TokenKind::Variable) {
            return self.parse_assign();
        }
        let Some(token) = self.tokens.peek() else {
            return Err(self.tokens.end_of_input("statement"));
        };

        let keyword = token.text.clone();
        match keyword.as_str() {
            "move" => {
                let steps = self.parse_action_args("move")?;
                Ok(Stmt::Move(steps))
            }
            "wait" => {
                let ticks = self.parse_action_args("wait")?;
                Ok(Stmt::Wait(ticks))
            }
            "turnL" => self.parse_bare_action("turnL", Stmt::TurnL),
            "turnR" => self.parse_bare_action("turnR", Stmt::TurnR),
            "turnAround" => self.parse_bare_action("turnAround", Stmt::TurnAround),
            "takeFuel" => self.parse_bare_action("takeFuel", Stmt::TakeFuel),
            "shieldOn" => self.parse_bare_action("shieldOn", Stmt::ShieldOn),
            "shieldOff" => self.parse_bare_action("shieldOff", Stmt::ShieldOff),
            "loop" => {
                self.tokens.expect("loop")?;
                Ok(Stmt::Loop(self.parse_block()?))
            }
            "if" => self.parse_if(),
            "while" => self.parse_while(),
            "{" => Ok(Stmt::Block(self.parse_block()?)),
            _ => Err(self.unrecognized("statement", STATEMENT_STARTS)),
        }
    }

    fn parse_bare_action(&mut self, keyword: &str, stmt: Stmt) -> Result<Stmt, ParseError> {
        self.tokens.expect(keyword)?;
        self.tokens.expect(";")?;
        Ok(stmt)
    }

    /// `keyword ('(' Expr ')')? ';'`
    fn parse_action_args(&mut self, keyword: &str) -> Result<Option<Arc<Expr>>, ParseError> {
        self.tokens.expect(keyword)?;
        let arg = if self.tokens.next_is("(") {
            Some(Arc::new(self.parse_parenthesized_expr()?))
        } else {
            None
        };
        self.tokens.expect(";")?;
        Ok(arg)
    }

    fn parse_assign(&mut self) -> Result<Stmt, ParseError> {
        let var = self.tokens.expect_kind(TokenKind::Variable, "variable name")?;
        self.tokens.expect("=")?;
        let value = self.parse_expr()?;
        self.tokens.expect(";")?;
        Ok(Stmt::assign(&var.text[1..], value))
    }

    pub fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.tokens.expect("{")?;
        if !self.tokens.has_next() {
            return Err(self.tokens.end_of_input("statement or '}'"));
        }
        if self.tokens.next_is("}") {
            return Err(ParseError::EmptyBlock {
                location: self.tokens.location(),
            });
        }

        let mut stmts = Vec::new();
        loop {
            stmts.push(self.parse_stmt()?);
            if !self.tokens.has_next() || self.tokens.next_is("}") {
                break;
            }
        }
        self.tokens.expect("}")?;

        Ok(Block::of(stmts.remove(0), stmts))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.tokens.expect("if")?;
        let cond = self.parse_parenthesized_cond()?;
        let then = self.parse_block()?;
        let otherwise = self.parse_if_tail()?;
        Ok(Stmt::if_then(cond, then, otherwise))
    }

    /// `elif` chains become an otherwise-block holding a single nested `If`
    fn parse_if_tail(&mut self) -> Result<Option<Block>, ParseError> {
        if self.tokens.next_is("elif") {
            self.tokens.expect("elif")?;
            let cond = self.parse_parenthesized_cond()?;
            let then = self.parse_block()?;
            let otherwise = self.parse_if_tail()?;
            return Ok(Some(Block::single(Stmt::if_then(cond, then, otherwise))));
        }
        if self.tokens.next_is("else") {
            self.tokens.expect("else")?;
            return Ok(Some(self.parse_block()?));
        }
        Ok(None)
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.tokens.expect("while")?;
        let cond = self.parse_parenthesized_cond()?;
        let body = self.parse_block()?;
        Ok(Stmt::while_do(cond, body))
    }

    // ── Conditions ─────────────────────────────────────

    fn parse_parenthesized_cond(&mut self) -> Result<Cond, ParseError> {
        self.tokens.expect("(")?;
        let cond = self.parse_cond()?;
        self.tokens.expect(")")?;
        Ok(cond)
    }

    pub fn parse_cond(&mut self) -> Result<Cond, ParseError> {
        let Some(token) = self.tokens.peek() else {
            return Err(self.tokens.end_of_input("condition"));
        };

        let keyword = token.text.clone();
        match keyword.as_str() {
            "lt" => self.parse_compare("lt", CompareOp::Lt),
            "gt" => self.parse_compare("gt", CompareOp::Gt),
            "eq" => self.parse_compare("eq", CompareOp::Eq),
            "and" => {
                let (left, right) = self.parse_cond_pair("and")?;
                Ok(Cond::And(Box::new(left), Box::new(right)))
            }
            "or" => {
                let (left, right) = self.parse_cond_pair("or")?;
                Ok(Cond::Or(Box::new(left), Box::new(right)))
            }
            "not" => {
                self.tokens.expect("not")?;
                let inner = self.parse_parenthesized_cond()?;
                Ok(Cond::Not(Box::new(inner)))
            }
            _ => Err(self.unrecognized("condition", CONDITION_STARTS)),
        }
    }

    fn parse_compare(&mut self, keyword: &str, op: CompareOp) -> Result<Cond, ParseError> {
        let (left, right) = self.parse_expr_pair(keyword)?;
        Ok(Cond::Compare { op, left, right })
    }

    fn parse_cond_pair(&mut self, keyword: &str) -> Result<(Cond, Cond), ParseError> {
        self.tokens.expect(keyword)?;
        self.tokens.expect("(")?;
        let left = self.parse_cond()?;
        self.tokens.expect(",")?;
        let right = self.parse_cond()?;
        self.tokens.expect(")")?;
        Ok((left, right))
    }

    // ── Expressions ────────────────────────────────────

    fn parse_parenthesized_expr(&mut self) -> Result<Expr, ParseError> {
        self.tokens.expect("(")?;
        let expr = self.parse_expr()?;
        self.tokens.expect(")")?;
        Ok(expr)
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.tokens.peek() else {
            return Err(self.tokens.end_of_input("expression"));
        };

        let keyword = token.text.clone();
        match token.kind {
            TokenKind::Number => return self.parse_number(),
            TokenKind::Variable => {
                let var = self.tokens.expect_kind(TokenKind::Variable, "variable name")?;
                return Ok(Expr::Var(var.text[1..].to_string()));
            }
            TokenKind::Punct | TokenKind::Word => {}
        }

        match keyword.as_str() {
            "add" => self.parse_binary("add", BinaryOp::Add),
            "sub" => self.parse_binary("sub", BinaryOp::Sub),
            "mul" => self.parse_binary("mul", BinaryOp::Mul),
            "div" => self.parse_binary("div", BinaryOp::Div),
            "fuelLeft" => self.parse_plain_sensor("fuelLeft", Sensor::FuelLeft),
            "oppLR" => self.parse_plain_sensor("oppLR", Sensor::OppLR),
            "oppFB" => self.parse_plain_sensor("oppFB", Sensor::OppFB),
            "numBarrels" => self.parse_plain_sensor("numBarrels", Sensor::NumBarrels),
            "wallDist" => self.parse_plain_sensor("wallDist", Sensor::WallDist),
            "barrelLR" => {
                let index = self.parse_sensor_index("barrelLR")?;
                Ok(Expr::Sensor(Sensor::BarrelLR(index)))
            }
            "barrelFB" => {
                let index = self.parse_sensor_index("barrelFB")?;
                Ok(Expr::Sensor(Sensor::BarrelFB(index)))
            }
            _ => Err(self.unrecognized("expression", EXPRESSION_STARTS)),
        }
    }

    fn parse_number(&mut self) -> Result<Expr, ParseError> {
        let location = self.tokens.location();
        let literal = self.tokens.expect_kind(TokenKind::Number, "number")?;
        literal
            .text
            .parse::<i32>()
            .map(Expr::Num)
            .map_err(|_| ParseError::InvalidNumber {
                literal: literal.text,
                location,
            })
    }

    fn parse_binary(&mut self, keyword: &str, op: BinaryOp) -> Result<Expr, ParseError> {
        let (left, right) = self.parse_expr_pair(keyword)?;
        Ok(Expr::binary(op, left, right))
    }

    /// `keyword '(' Expr ',' Expr ')'`
    fn parse_expr_pair(&mut self, keyword: &str) -> Result<(Expr, Expr), ParseError> {
        self.tokens.expect(keyword)?;
        self.tokens.expect("(")?;
        let left = self.parse_expr()?;
        self.tokens.expect(",")?;
        let right = self.parse_expr()?;
        self.tokens.expect(")")?;
        Ok((left, right))
    }

    fn parse_plain_sensor(&mut self, keyword: &str, sensor: Sensor) -> Result<Expr, ParseError> {
        self.tokens.expect(keyword)?;
        Ok(Expr::Sensor(sensor))
    }

    fn parse_sensor_index(&mut self, keyword: &str) -> Result<Option<Box<Expr>>, ParseError> {
        self.tokens.expect(keyword)?;
        if self.tokens.next_is("(") {
            return Ok(Some(Box::new(self.parse_parenthesized_expr()?)));
        }
        Ok(None)
    }

    fn unrecognized(&self, construct: &'static str, options: &'static [&'static str]) -> ParseError {
        match self.tokens.peek() {
            Some(token) => ParseError::Unrecognized {
                found: token.text.clone(),
                construct,
                options,
                location: self.tokens.location(),
            },
            None => self.tokens.end_of_input(construct),
        }
    }
}
