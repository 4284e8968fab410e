//! Rule builder and scan entry points.

use crate::Captures;
use crate::debug_trace::ScanTrace;
use crate::error::ScanError;
use crate::executor;
use crate::rule::Rule;

/// A scan program: an ordered rule list plus the strict end-of-line flag.
///
/// Build it once, then scan any number of lines with it. Scanning takes
/// `&self` and keeps all cursor state local to the call, so one parser can
/// be shared across threads as long as each call gets its own output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenParser {
    rules: Vec<Rule>,
    strict: bool,
}

impl TokenParser {
    /// An empty, non-strict program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already-built rule.
    pub fn push(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Expect exactly `symbol` at the cursor and consume it.
    pub fn skip(&mut self, symbol: u8) -> &mut Self {
        self.push(Rule::SkipLiteral(symbol))
    }

    /// Advance the cursor by `n` bytes without inspecting them.
    ///
    /// This rule never fails on its own, even when it moves the cursor past
    /// the end of the line. The overrun is reported by the next rule that
    /// looks at the input, or by the strict check once the program ends.
    pub fn skip_n(&mut self, n: usize) -> &mut Self {
        self.push(Rule::SkipN(n))
    }

    /// Advance until the cursor rests on `symbol`, without consuming it.
    pub fn skip_to(&mut self, symbol: u8) -> &mut Self {
        self.push(Rule::SkipUntilLiteral(symbol))
    }

    /// Like [`skip_to`](Self::skip_to), storing the passed bytes in `field`.
    ///
    /// The delimiter itself is not part of the value. A delimiter right at
    /// the cursor yields an empty value.
    pub fn up_to(&mut self, symbol: u8, field: impl Into<String>) -> &mut Self {
        self.push(Rule::CaptureUntilLiteral {
            delimiter: symbol,
            field: field.into(),
        })
    }

    /// Consume any single byte.
    pub fn skip_any(&mut self) -> &mut Self {
        self.push(Rule::SkipAnyByte)
    }

    /// Advance until the cursor rests on the first byte of `literal`.
    ///
    /// The match is not consumed; follow with `skip_n(literal.len())` to step
    /// over it.
    pub fn search(&mut self, literal: impl AsRef<[u8]>) -> &mut Self {
        self.push(Rule::SearchLiteral(literal.as_ref().to_vec()))
    }

    /// In strict mode a scan only succeeds if it ends exactly at the end of
    /// the line.
    pub fn set_strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Scan `line`, writing captured fields into `out`.
    ///
    /// Returns whether the whole program matched. On failure, fields captured
    /// by rules before the failing one stay in `out`; nothing is rolled back.
    pub fn parse_string(&self, line: impl AsRef<[u8]>, out: &mut Captures) -> bool {
        executor::run(&self.rules, self.strict, line.as_ref(), out, None).is_ok()
    }

    /// Scan `line` into fresh captures, keeping the failure cause.
    pub fn parse(&self, line: impl AsRef<[u8]>) -> Scan {
        let mut captures = Captures::new();
        let result = executor::run(&self.rules, self.strict, line.as_ref(), &mut captures, None);
        Scan { captures, result }
    }

    /// Like [`parse`](Self::parse), also recording every executed rule.
    pub fn parse_traced(&self, line: impl AsRef<[u8]>) -> (Scan, ScanTrace) {
        let mut captures = Captures::new();
        let mut trace = ScanTrace::default();
        let result = executor::run(
            &self.rules,
            self.strict,
            line.as_ref(),
            &mut captures,
            Some(&mut trace),
        );
        (Scan { captures, result }, trace)
    }
}

/// Outcome of one scan.
///
/// `captures` may be partially filled even when the scan failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    captures: Captures,
    result: Result<usize, ScanError>,
}

impl Scan {
    pub fn is_match(&self) -> bool {
        self.result.is_ok()
    }

    /// Captured value of `field`, if it is valid UTF-8.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.captures.get(field)
    }

    /// Raw captured bytes of `field`.
    pub fn get_bytes(&self, field: &str) -> Option<&[u8]> {
        self.captures.get_bytes(field)
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn into_captures(self) -> Captures {
        self.captures
    }

    /// Cursor position after the last rule, for a successful scan.
    pub fn cursor(&self) -> Option<usize> {
        self.result.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&ScanError> {
        self.result.as_ref().err()
    }

    /// Captures of a successful scan, or why it failed.
    pub fn into_result(self) -> Result<Captures, ScanError> {
        self.result.map(|_| self.captures)
    }
}
