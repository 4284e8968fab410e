//! Text format for scan programs.
//!
//! One rule per line, keywords are case-insensitive:
//! ```text
//! # access log: [date time] vhost
//! SKIP '['
//! UPTO ' ' date
//! SKIP ' '
//! UPTO ']' time
//! SKIPN 2
//! UPTO ' ' vhost
//! STRICT
//! ```
//!
//! - `SKIP b` - expect byte `b` and consume it
//! - `SKIPN n` - advance `n` bytes
//! - `SKIPTO b` - advance until the cursor rests on `b`
//! - `UPTO b field` - like SKIPTO, capturing the passed bytes into `field`
//! - `ANY` - consume any single byte
//! - `SEARCH "text"` - advance until the cursor rests on `text`
//! - `STRICT`, `STRICT ON`, `STRICT OFF` - set the strict end-of-line flag
//! - Lines starting with `#` are comments
//!
//! A byte operand is a quoted character (`'['`, `' '`, `'\n'`, `'\''`) or a
//! hex literal (`0x09`). The SEARCH operand is a delimited string: the first
//! non-blank character is the delimiter, so `SEARCH /a "b"/` searches for
//! `a "b"`. Arbitrary bytes can be searched with a hex string such as
//! `SEARCH 0x0A2D2D`. A field name holding whitespace is written in double
//! quotes with the same escapes as byte operands: `UPTO ' ' "my field"`.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::TokenParser;
use crate::error::{ProgramError, ProgramErrorKind};
use crate::rule::Rule;

/// One parsed program line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    Rule(Rule),
    Strict(bool),
}

/// Parse program text into a parser.
pub fn parse_program(text: &str) -> Result<TokenParser, ProgramError> {
    let mut parser = TokenParser::new();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let directive = parse_directive(line).map_err(|kind| ProgramError {
            line: line_num + 1,
            kind,
        })?;
        match directive {
            Directive::Rule(rule) => {
                parser.push(rule);
            }
            Directive::Strict(strict) => {
                parser.set_strict(strict);
            }
        }
    }

    debug!(
        "loaded program with {} rules (strict: {})",
        parser.len(),
        parser.is_strict()
    );
    Ok(parser)
}

/// Parse a single program line.
fn parse_directive(line: &str) -> Result<Directive, ProgramErrorKind> {
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    let rule = match keyword.to_ascii_uppercase().as_str() {
        "SKIP" => {
            let (b, rest) = parse_byte("SKIP", rest)?;
            expect_end(rest)?;
            Rule::SkipLiteral(b)
        }
        "SKIPN" => {
            if !rest.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ProgramErrorKind::InvalidCount);
            }
            let n = rest.parse().map_err(|_| ProgramErrorKind::InvalidCount)?;
            Rule::SkipN(n)
        }
        "SKIPTO" => {
            let (b, rest) = parse_byte("SKIPTO", rest)?;
            expect_end(rest)?;
            Rule::SkipUntilLiteral(b)
        }
        "UPTO" => {
            let (delimiter, rest) = parse_byte("UPTO", rest)?;
            let rest = rest.trim_start();
            if rest.starts_with('"') {
                let (field, rest) = parse_quoted(rest)?;
                expect_end(rest)?;
                return Ok(Directive::Rule(Rule::CaptureUntilLiteral { delimiter, field }));
            }
            let mut words = rest.split_whitespace();
            let field = words.next().ok_or(ProgramErrorKind::MissingField)?;
            if let Some(extra) = words.next() {
                return Err(ProgramErrorKind::TrailingText(extra.to_string()));
            }
            Rule::CaptureUntilLiteral {
                delimiter,
                field: field.to_string(),
            }
        }
        "ANY" => {
            expect_end(rest)?;
            Rule::SkipAnyByte
        }
        "SEARCH" => {
            if rest.starts_with("0x") || rest.starts_with("0X") {
                let mut words = rest.split_whitespace();
                let literal = parse_hex_literal(words.next().unwrap_or(rest))?;
                if let Some(extra) = words.next() {
                    return Err(ProgramErrorKind::TrailingText(extra.to_string()));
                }
                Rule::SearchLiteral(literal)
            } else {
                let (literal, rest) = parse_delimited_string(rest)?;
                expect_end(rest)?;
                Rule::SearchLiteral(literal.into_bytes())
            }
        }
        "STRICT" => {
            let strict = match rest.to_ascii_uppercase().as_str() {
                "" | "ON" => true,
                "OFF" => false,
                _ => return Err(ProgramErrorKind::TrailingText(rest.to_string())),
            };
            return Ok(Directive::Strict(strict));
        }
        _ => return Err(ProgramErrorKind::UnknownCommand(keyword.to_string())),
    };
    Ok(Directive::Rule(rule))
}

fn expect_end(rest: &str) -> Result<(), ProgramErrorKind> {
    let rest = rest.trim();
    if rest.is_empty() {
        Ok(())
    } else {
        Err(ProgramErrorKind::TrailingText(rest.to_string()))
    }
}

/// Parse a byte operand, returning it and the rest of the line.
fn parse_byte<'a>(command: &'static str, s: &'a str) -> Result<(u8, &'a str), ProgramErrorKind> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let token = s.split_whitespace().next().unwrap_or(s);
    let invalid = || ProgramErrorKind::InvalidByte(token.to_string());

    match bytes.first() {
        None => Err(ProgramErrorKind::MissingByte(command)),
        Some(b'\'') => {
            let (value, len) = match bytes.get(1) {
                Some(b'\\') => (unescape(bytes.get(2).copied()).ok_or_else(invalid)?, 4),
                Some(&b) if b.is_ascii() => (b, 3),
                _ => return Err(invalid()),
            };
            if bytes.get(len - 1) != Some(&b'\'') {
                return Err(invalid());
            }
            Ok((value, &s[len..]))
        }
        Some(_) => {
            let hex = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .ok_or_else(invalid)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let value = u8::from_str_radix(hex, 16).map_err(|_| invalid())?;
            Ok((value, &s[token.len()..]))
        }
    }
}

fn unescape(b: Option<u8>) -> Option<u8> {
    match b? {
        b'n' => Some(b'\n'),
        b'r' => Some(b'\r'),
        b't' => Some(b'\t'),
        b'0' => Some(0),
        b @ (b'\\' | b'\'' | b'"') => Some(b),
        _ => None,
    }
}

/// Parse a `0x`-prefixed string of hex byte pairs.
fn parse_hex_literal(token: &str) -> Result<Vec<u8>, ProgramErrorKind> {
    let invalid = || ProgramErrorKind::InvalidLiteral(token.to_string());
    let hex = &token[2..];
    if hex.is_empty() || hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid()))
        .collect()
}

/// Parse a double-quoted string with backslash escapes.
/// Returns (unescaped_string, rest_of_input).
fn parse_quoted(s: &str) -> Result<(String, &str), ProgramErrorKind> {
    let body = s.strip_prefix('"').ok_or(ProgramErrorKind::MissingField)?;
    let mut out = String::new();
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, &body[i + 1..])),
            '\\' => {
                let escaped = match chars.next().map(|(_, e)| e) {
                    Some('n') => '\n',
                    Some('r') => '\r',
                    Some('t') => '\t',
                    Some('0') => '\0',
                    Some(e @ ('\\' | '\'' | '"')) => e,
                    Some(e) => return Err(ProgramErrorKind::InvalidEscape(e)),
                    None => break,
                };
                out.push(escaped);
            }
            _ => out.push(c),
        }
    }
    Err(ProgramErrorKind::UnclosedDelimiter('"'))
}

/// Parse a delimited string. The first non-blank character is the
/// delimiter, and the string continues until the next occurrence of it.
/// Returns (extracted_string, rest_of_input).
fn parse_delimited_string(s: &str) -> Result<(String, &str), ProgramErrorKind> {
    let s = s.trim_start();
    let delim = s.chars().next().ok_or(ProgramErrorKind::MissingLiteral)?;
    let after_delim = &s[delim.len_utf8()..];

    match after_delim.find(delim) {
        Some(end) => {
            let extracted = after_delim[..end].to_string();
            let rest = &after_delim[end + delim.len_utf8()..];
            Ok((extracted, rest))
        }
        None => Err(ProgramErrorKind::UnclosedDelimiter(delim)),
    }
}

impl FromStr for TokenParser {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_program(s)
    }
}

/// Renders the program back into text that [`parse_program`] accepts.
impl fmt::Display for TokenParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in self.rules() {
            writeln!(f, "{rule}")?;
        }
        if self.is_strict() {
            writeln!(f, "STRICT")?;
        }
        Ok(())
    }
}
