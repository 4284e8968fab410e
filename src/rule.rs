//! Rule model for scan programs.
//!
//! A program is an ordered list of [`Rule`]s. Each rule moves a single
//! forward-only byte cursor over the input line, optionally capturing the
//! bytes it passes into a named field.

use std::fmt;

/// One instruction in a scan program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// SKIP 'b' - expect exactly this byte at the cursor and consume it
    SkipLiteral(u8),
    /// SKIPN n - advance the cursor by n bytes without looking at them
    SkipN(usize),
    /// SKIPTO 'b' - advance until the cursor rests on this byte
    SkipUntilLiteral(u8),
    /// UPTO 'b' field - like SKIPTO, storing the passed bytes in `field`
    CaptureUntilLiteral { delimiter: u8, field: String },
    /// ANY - consume any single byte
    SkipAnyByte,
    /// SEARCH "text" - advance until the cursor rests on the first byte of `text`
    SearchLiteral(Vec<u8>),
}

impl Rule {
    /// Get the DSL keyword for this rule.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::SkipLiteral(_) => "SKIP",
            Rule::SkipN(_) => "SKIPN",
            Rule::SkipUntilLiteral(_) => "SKIPTO",
            Rule::CaptureUntilLiteral { .. } => "UPTO",
            Rule::SkipAnyByte => "ANY",
            Rule::SearchLiteral(_) => "SEARCH",
        }
    }

    /// Name of the field this rule writes, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Rule::CaptureUntilLiteral { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Renders a byte the way the DSL accepts it back.
pub(crate) fn display_byte(b: u8) -> String {
    match b {
        b'\n' => "'\\n'".to_string(),
        b'\r' => "'\\r'".to_string(),
        b'\t' => "'\\t'".to_string(),
        0 => "'\\0'".to_string(),
        b'\\' => "'\\\\'".to_string(),
        b'\'' => "'\\''".to_string(),
        0x20..=0x7e => format!("'{}'", b as char),
        _ => format!("0x{b:02X}"),
    }
}

/// Renders a field name, quoting it when a bare word would not parse back.
fn display_field(field: &str) -> String {
    let bare = !field.is_empty()
        && !field.starts_with('"')
        && !field.contains(|c: char| c.is_whitespace() || c.is_control());
    if bare {
        return field.to_string();
    }

    let mut out = String::from("\"");
    for c in field.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::SkipLiteral(b) | Rule::SkipUntilLiteral(b) => {
                write!(f, "{} {}", self.name(), display_byte(*b))
            }
            Rule::SkipN(n) => write!(f, "SKIPN {n}"),
            Rule::CaptureUntilLiteral { delimiter, field } => {
                write!(f, "UPTO {} {}", display_byte(*delimiter), display_field(field))
            }
            Rule::SkipAnyByte => f.write_str("ANY"),
            Rule::SearchLiteral(literal) => {
                let text = std::str::from_utf8(literal)
                    .ok()
                    .filter(|text| !text.contains(char::is_control));
                let delim = text.and_then(|text| {
                    ['"', '/', '|', '%', '\'']
                        .into_iter()
                        .find(|d| !text.contains(*d))
                });
                match (text, delim) {
                    (Some(text), Some(delim)) => write!(f, "SEARCH {delim}{text}{delim}"),
                    _ => {
                        f.write_str("SEARCH 0x")?;
                        literal.iter().try_for_each(|b| write!(f, "{b:02X}"))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_names() {
        assert_eq!(Rule::SkipLiteral(b'[').name(), "SKIP");
        assert_eq!(Rule::SkipN(2).name(), "SKIPN");
        assert_eq!(Rule::SkipUntilLiteral(b' ').name(), "SKIPTO");
        assert_eq!(Rule::SkipAnyByte.name(), "ANY");
        assert_eq!(Rule::SearchLiteral(b"postfix".to_vec()).name(), "SEARCH");
    }

    #[test]
    fn test_field_only_on_capture() {
        let rule = Rule::CaptureUntilLiteral {
            delimiter: b' ',
            field: "date".to_string(),
        };
        assert_eq!(rule.field(), Some("date"));
        assert_eq!(Rule::SkipLiteral(b' ').field(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rule::SkipLiteral(b'[').to_string(), "SKIP '['");
        assert_eq!(Rule::SkipUntilLiteral(b'\n').to_string(), "SKIPTO '\\n'");
        assert_eq!(Rule::SkipN(8).to_string(), "SKIPN 8");
        assert_eq!(Rule::SkipLiteral(0xff).to_string(), "SKIP 0xFF");
        assert_eq!(
            Rule::SearchLiteral(b"postfix".to_vec()).to_string(),
            "SEARCH \"postfix\""
        );
        assert_eq!(
            Rule::SearchLiteral(b"say \"hi\"".to_vec()).to_string(),
            "SEARCH /say \"hi\"/"
        );
        assert_eq!(
            Rule::SearchLiteral(b"a\nb".to_vec()).to_string(),
            "SEARCH 0x610A62"
        );
        assert_eq!(
            Rule::SearchLiteral(vec![0xff, 0x00]).to_string(),
            "SEARCH 0xFF00"
        );
    }

    #[test]
    fn test_display_quoted_fields() {
        let upto = |field: &str| Rule::CaptureUntilLiteral {
            delimiter: b' ',
            field: field.to_string(),
        };
        assert_eq!(upto("vhost").to_string(), "UPTO ' ' vhost");
        assert_eq!(upto("my field").to_string(), "UPTO ' ' \"my field\"");
        assert_eq!(upto("").to_string(), "UPTO ' ' \"\"");
        assert_eq!(upto("\"q\\").to_string(), r#"UPTO ' ' "\"q\\""#);
    }
}
