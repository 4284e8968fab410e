//! Error types for scans and program text.

use thiserror::Error;

use crate::rule::display_byte;

fn show(b: &u8) -> String {
    display_byte(*b)
}

/// Why a scan rejected its input line.
///
/// `rule` is the zero-based index of the rule that failed. Every variant
/// collapses to `false` in [`TokenParser::parse_string`](crate::TokenParser::parse_string).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("rule {rule}: input ended at byte {pos}")]
    UnexpectedEnd { rule: usize, pos: usize },

    #[error("rule {rule}: expected {} at byte {pos}, found {}", show(.expected), show(.found))]
    LiteralMismatch {
        rule: usize,
        pos: usize,
        expected: u8,
        found: u8,
    },

    #[error("rule {rule}: delimiter {} not found after byte {pos}", show(.delimiter))]
    DelimiterNotFound {
        rule: usize,
        pos: usize,
        delimiter: u8,
    },

    #[error("rule {rule}: \"{literal}\" not found after byte {pos}")]
    LiteralNotFound {
        rule: usize,
        pos: usize,
        literal: String,
    },

    #[error("strict scan stopped at byte {pos} of {len}")]
    TrailingInput { pos: usize, len: usize },

    #[error("strict scan overran the input: cursor {pos}, length {len}")]
    Overrun { pos: usize, len: usize },
}

impl ScanError {
    /// Index of the failing rule, or `None` for end-of-line strict failures.
    pub fn rule_index(&self) -> Option<usize> {
        match self {
            ScanError::UnexpectedEnd { rule, .. }
            | ScanError::LiteralMismatch { rule, .. }
            | ScanError::DelimiterNotFound { rule, .. }
            | ScanError::LiteralNotFound { rule, .. } => Some(*rule),
            ScanError::TrailingInput { .. } | ScanError::Overrun { .. } => None,
        }
    }
}

/// A malformed line in program text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Line {line}: {kind}")]
pub struct ProgramError {
    pub line: usize,
    pub kind: ProgramErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramErrorKind {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0} requires a byte operand")]
    MissingByte(&'static str),

    #[error("Invalid byte operand: {0}")]
    InvalidByte(String),

    #[error("SKIPN requires a number")]
    InvalidCount,

    #[error("UPTO requires a field name")]
    MissingField,

    #[error("Expected delimited string")]
    MissingLiteral,

    #[error("Invalid hex literal: {0}")]
    InvalidLiteral(String),

    #[error("Invalid escape: \\{0}")]
    InvalidEscape(char),

    #[error("Unclosed delimiter '{0}'")]
    UnclosedDelimiter(char),

    #[error("Unexpected trailing text: {0}")]
    TrailingText(String),
}
