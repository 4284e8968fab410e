//! Scan interpreter.
//!
//! Executes a rule program over one input line with a single forward-only
//! byte cursor. Rules run strictly in order and the first failing rule ends
//! the scan; captures written by earlier rules are left in place.

use log::{debug, trace};

use crate::Captures;
use crate::TokenParser;
use crate::debug_trace::{RuleTrace, ScanTrace};
use crate::error::ScanError;
use crate::rule::Rule;

/// Execute `rules` against `input`, writing captures into `captures`.
///
/// Returns the final cursor on success.
pub(crate) fn run(
    rules: &[Rule],
    strict: bool,
    input: &[u8],
    captures: &mut Captures,
    mut tracer: Option<&mut ScanTrace>,
) -> Result<usize, ScanError> {
    if let Some(t) = tracer.as_deref_mut() {
        t.input_len = input.len();
    }

    let mut cursor = 0;
    for (index, rule) in rules.iter().enumerate() {
        trace!("rule {} {} at byte {}", index, rule.name(), cursor);
        let result = step(index, rule, input, cursor, captures);

        if let Some(t) = tracer.as_deref_mut() {
            t.steps.push(RuleTrace {
                rule_index: index,
                rule_name: rule.name(),
                cursor_before: cursor,
                cursor_after: result.as_ref().ok().copied(),
            });
        }

        cursor = result.inspect_err(|e| debug!("scan failed: {e}"))?;
    }

    if !strict {
        return Ok(cursor);
    }

    let len = input.len();
    if cursor == len {
        Ok(cursor)
    } else {
        let err = if cursor < len {
            ScanError::TrailingInput { pos: cursor, len }
        } else {
            ScanError::Overrun { pos: cursor, len }
        };
        debug!("scan failed: {err}");
        Err(err)
    }
}

/// Apply a single rule at `cursor`, returning the new cursor.
fn step(
    index: usize,
    rule: &Rule,
    input: &[u8],
    cursor: usize,
    captures: &mut Captures,
) -> Result<usize, ScanError> {
    match rule {
        Rule::SkipLiteral(expected) => match input.get(cursor) {
            None => Err(ScanError::UnexpectedEnd {
                rule: index,
                pos: cursor,
            }),
            Some(&found) if found == *expected => Ok(cursor + 1),
            Some(&found) => Err(ScanError::LiteralMismatch {
                rule: index,
                pos: cursor,
                expected: *expected,
                found,
            }),
        },
        Rule::SkipAnyByte => {
            if cursor < input.len() {
                Ok(cursor + 1)
            } else {
                Err(ScanError::UnexpectedEnd {
                    rule: index,
                    pos: cursor,
                })
            }
        }
        // Overrunning the input is only caught by a later rule or the strict check.
        Rule::SkipN(n) => Ok(cursor.saturating_add(*n)),
        Rule::SkipUntilLiteral(delimiter) => find_byte(index, input, cursor, *delimiter),
        Rule::CaptureUntilLiteral { delimiter, field } => {
            let end = find_byte(index, input, cursor, *delimiter)?;
            captures.insert(field, &input[cursor..end]);
            Ok(end)
        }
        Rule::SearchLiteral(literal) => input
            .get(cursor..)
            .and_then(|rest| memchr::memmem::find(rest, literal))
            .map(|offset| cursor + offset)
            .ok_or_else(|| ScanError::LiteralNotFound {
                rule: index,
                pos: cursor,
                literal: String::from_utf8_lossy(literal).into_owned(),
            }),
    }
}

/// Position of the first `delimiter` at or after `cursor`.
fn find_byte(index: usize, input: &[u8], cursor: usize, delimiter: u8) -> Result<usize, ScanError> {
    input
        .get(cursor..)
        .and_then(|rest| memchr::memchr(delimiter, rest))
        .map(|offset| cursor + offset)
        .ok_or(ScanError::DelimiterNotFound {
            rule: index,
            pos: cursor,
            delimiter,
        })
}

/// Result of scanning every line of a text block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineReport {
    /// Captures of each matching line, in input order.
    pub captures: Vec<Captures>,
    pub input_count: usize,
    pub matched_count: usize,
    /// 1-based line numbers of lines the program rejected.
    pub failed_lines: Vec<usize>,
}

/// Scan each non-empty line of `text` with `parser`.
///
/// Every line is an independent scan; line terminators are not part of the
/// scanned input.
pub fn scan_lines(parser: &TokenParser, text: &str) -> LineReport {
    let mut report = LineReport::default();

    for (line_num, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        report.input_count += 1;

        let scan = parser.parse(line);
        if scan.is_match() {
            report.matched_count += 1;
            report.captures.push(scan.into_captures());
        } else {
            report.failed_lines.push(line_num + 1);
        }
    }

    debug!(
        "scanned {} lines, {} matched",
        report.input_count, report.matched_count
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(rules: &[Rule], strict: bool, input: &str) -> (Result<usize, ScanError>, Captures) {
        let mut caps = Captures::new();
        let result = run(rules, strict, input.as_bytes(), &mut caps, None);
        (result, caps)
    }

    fn upto(delimiter: u8, field: &str) -> Rule {
        Rule::CaptureUntilLiteral {
            delimiter,
            field: field.to_string(),
        }
    }

    #[test]
    fn test_empty_program_non_strict() {
        let (result, _) = exec(&[], false, "anything");
        assert_eq!(result, Ok(0));
    }

    #[test]
    fn test_empty_program_strict() {
        assert_eq!(exec(&[], true, "").0, Ok(0));
        assert_eq!(
            exec(&[], true, "x").0,
            Err(ScanError::TrailingInput { pos: 0, len: 1 })
        );
    }

    #[test]
    fn test_skip_literal_mismatch() {
        let (result, caps) = exec(&[Rule::SkipLiteral(b'X')], false, "abc");
        assert_eq!(
            result,
            Err(ScanError::LiteralMismatch {
                rule: 0,
                pos: 0,
                expected: b'X',
                found: b'a'
            })
        );
        assert!(caps.is_empty());
    }

    #[test]
    fn test_skip_literal_at_end() {
        let rules = [Rule::SkipLiteral(b'a'), Rule::SkipLiteral(b'b')];
        assert_eq!(
            exec(&rules, false, "a").0,
            Err(ScanError::UnexpectedEnd { rule: 1, pos: 1 })
        );
    }

    #[test]
    fn test_skip_any_byte() {
        let rules = [Rule::SkipAnyByte, Rule::SkipAnyByte];
        assert_eq!(exec(&rules, true, "ab").0, Ok(2));
        assert_eq!(
            exec(&rules, false, "a").0,
            Err(ScanError::UnexpectedEnd { rule: 1, pos: 1 })
        );
    }

    #[test]
    fn test_skip_until_rests_on_delimiter() {
        let rules = [Rule::SkipUntilLiteral(b':'), Rule::SkipLiteral(b':')];
        assert_eq!(exec(&rules, true, "key:").0, Ok(4));
    }

    #[test]
    fn test_skip_until_exhausted() {
        let rules = [Rule::SkipUntilLiteral(b':')];
        assert!(matches!(
            exec(&rules, false, "no colon").0,
            Err(ScanError::DelimiterNotFound { rule: 0, .. })
        ));
    }

    #[test]
    fn test_capture_excludes_delimiter() {
        let rules = [upto(b'=', "key"), Rule::SkipLiteral(b'=')];
        let (result, caps) = exec(&rules, false, "name=value");
        assert_eq!(result, Ok(5));
        assert_eq!(caps.get("key"), Some("name"));
    }

    #[test]
    fn test_empty_capture() {
        let (result, caps) = exec(&[upto(b' ', "x")], false, " rest");
        assert_eq!(result, Ok(0));
        assert_eq!(caps.get("x"), Some(""));
    }

    #[test]
    fn test_capture_splits_multibyte_char() {
        // 0xA9 is the trailing byte of the UTF-8 encoding of 'é'
        let mut caps = Captures::new();
        let result = run(&[upto(0xA9, "x")], false, "café".as_bytes(), &mut caps, None);
        assert_eq!(result, Ok(4));
        assert_eq!(caps.get_bytes("x"), Some(&[0x63, 0x61, 0x66, 0xC3][..]));
        assert_eq!(caps.get("x"), None);
    }

    #[test]
    fn test_capture_non_utf8_input() {
        let mut caps = Captures::new();
        let input = [0xff, 0xfe, b'|', b'o', b'k'];
        let rules = [upto(b'|', "bom"), Rule::SkipLiteral(b'|'), upto(b'\n', "rest")];
        assert!(run(&rules, false, &input, &mut caps, None).is_err());
        assert_eq!(caps.get_bytes("bom"), Some(&[0xff, 0xfe][..]));
    }

    #[test]
    fn test_capture_exhausted_writes_nothing() {
        let (result, caps) = exec(&[upto(b';', "x")], false, "no semicolon here");
        assert!(result.is_err());
        assert!(!caps.contains("x"));
    }

    #[test]
    fn test_partial_captures_survive_failure() {
        let rules = [
            upto(b' ', "first"),
            Rule::SkipLiteral(b' '),
            upto(b';', "second"),
        ];
        let (result, caps) = exec(&rules, false, "alpha beta");
        assert!(result.is_err());
        assert_eq!(caps.get("first"), Some("alpha"));
        assert!(!caps.contains("second"));
    }

    #[test]
    fn test_skip_n_overrun_deferred() {
        // SKIPN itself succeeds past the end
        assert_eq!(exec(&[Rule::SkipN(10)], false, "abc").0, Ok(10));
        assert_eq!(
            exec(&[Rule::SkipN(10)], true, "abc").0,
            Err(ScanError::Overrun { pos: 10, len: 3 })
        );
        assert_eq!(
            exec(&[Rule::SkipN(10), Rule::SkipAnyByte], false, "abc").0,
            Err(ScanError::UnexpectedEnd { rule: 1, pos: 10 })
        );
        assert!(exec(&[Rule::SkipN(4), upto(b'c', "x")], false, "abc").0.is_err());
    }

    #[test]
    fn test_skip_n_saturates() {
        let rules = [Rule::SkipN(usize::MAX), Rule::SkipN(usize::MAX)];
        assert_eq!(exec(&rules, false, "").0, Ok(usize::MAX));
    }

    #[test]
    fn test_search_rests_on_match() {
        let rules = [Rule::SearchLiteral(b"needle".to_vec())];
        assert_eq!(exec(&rules, false, "hay needle hay").0, Ok(4));
    }

    #[test]
    fn test_search_partial_match_then_full() {
        let rules = [Rule::SearchLiteral(b"aab".to_vec())];
        assert_eq!(exec(&rules, false, "aaab").0, Ok(1));
    }

    #[test]
    fn test_search_not_found() {
        let rules = [Rule::SearchLiteral(b"needle".to_vec())];
        assert!(matches!(
            exec(&rules, false, "hay needl").0,
            Err(ScanError::LiteralNotFound { rule: 0, pos: 0, .. })
        ));
    }

    #[test]
    fn test_search_empty_literal() {
        let rules = [Rule::SkipN(3), Rule::SearchLiteral(Vec::new())];
        assert_eq!(exec(&rules, true, "abc").0, Ok(3));
        let rules = [Rule::SkipN(4), Rule::SearchLiteral(Vec::new())];
        assert!(exec(&rules, false, "abc").0.is_err());
    }

    #[test]
    fn test_trace_records_steps() {
        let rules = [Rule::SkipLiteral(b'a'), Rule::SkipLiteral(b'x')];
        let mut caps = Captures::new();
        let mut trace = ScanTrace::default();
        let result = run(&rules, false, b"abc", &mut caps, Some(&mut trace));
        assert!(result.is_err());
        assert_eq!(trace.input_len, 3);
        assert_eq!(trace.steps.len(), 2);
        assert_eq!(trace.steps[0].cursor_after, Some(1));
        assert_eq!(trace.failed_step().map(|s| s.rule_name), Some("SKIP"));
    }

    #[test]
    fn test_scan_lines_counts() {
        let mut parser = TokenParser::new();
        parser.up_to(b'=', "key").skip(b'=');
        let text = "a=1\n\nnope\nb=2\n";
        let report = scan_lines(&parser, text);
        assert_eq!(report.input_count, 3);
        assert_eq!(report.matched_count, 2);
        assert_eq!(report.failed_lines, vec![3]);
        assert_eq!(report.captures[1].get("key"), Some("b"));
    }
}
