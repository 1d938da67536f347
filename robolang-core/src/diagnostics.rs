//! Diagnostics and error reporting for robot programs
//!
//! Source locations are 1-based and derived from how much of the source text
//! has been consumed when an error is raised.

use crate::parser::ParseError;
use serde::Serialize;
use std::fmt;

/// A 1-based line/column position in program source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location of the first character after `source[..offset]`
    pub fn at_offset(source: &str, offset: usize) -> Self {
        let consumed = &source[..offset.min(source.len())];
        let line = consumed.matches('\n').count() + 1;
        let column = match consumed.rfind('\n') {
            Some(newline) => consumed[newline + 1..].chars().count() + 1,
            None => consumed.chars().count() + 1,
        };
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Format a parse error with the offending source line and a caret
pub fn format_syntax_error(error: &ParseError, source: &str) -> String {
    let location = error.location();
    let mut msg = format!("Syntax error at {}: {}", location, error.message());

    if let Some(text) = source.lines().nth(location.line - 1) {
        let gutter = location.line.to_string();
        msg.push_str(&format!("\n {} | {}", gutter, text));
        msg.push_str(&format!(
            "\n {} | {}^",
            " ".repeat(gutter.len()),
            " ".repeat(location.column.saturating_sub(1))
        ));
    }

    msg
}

/// Format a runtime error with context
pub fn format_runtime_error(error: &dyn std::error::Error) -> String {
    format!("Runtime error: {}", error)
}
