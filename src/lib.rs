//! # tokenparser-rs
//!
//! A declarative scanner for fixed-format text lines.
//!
//! Instead of a grammar or a regular expression, a line's shape is described
//! as an ordered list of byte-level rules: skip this byte, skip N bytes, skip
//! to a delimiter, capture up to a delimiter into a named field, search for a
//! literal. The program is then run once per line with a single forward-only
//! cursor. There is no backtracking; the first rule that cannot match ends
//! the scan.
//!
//! ## Example
//!
//! ```
//! use tokenparser_rs::TokenParser;
//!
//! let mut parser = TokenParser::new();
//! parser
//!     .skip(b'[')
//!     .up_to(b' ', "date")
//!     .skip(b' ')
//!     .up_to(b']', "time")
//!     .skip_n(2)
//!     .up_to(b' ', "vhost");
//!
//! let scan = parser.parse(r#"[28/Jun/2013 12:54:48] example.com "GET /""#);
//! assert!(scan.is_match());
//! assert_eq!(scan.get("date"), Some("28/Jun/2013"));
//! assert_eq!(scan.get("vhost"), Some("example.com"));
//! ```
//!
//! Programs can also be written as text, see [`dsl`]:
//!
//! ```
//! use tokenparser_rs::parse_program;
//!
//! let parser = parse_program("SEARCH \"postfix/\"\nSKIPN 8\nUPTO '[' proc").unwrap();
//! let scan = parser.parse("[23/Apr/2014 00:00:48] postfix/cleanup[29385] ...");
//! assert_eq!(scan.get("proc"), Some("cleanup"));
//! ```
//!
//! ## Partial captures
//!
//! A failed scan does not undo the captures of rules that matched before the
//! failing one. Callers that only want complete results should check
//! [`Scan::is_match`] or use [`Scan::into_result`].

pub mod captures;
pub mod debug_trace;
pub mod dsl;
pub mod error;
pub mod executor;
pub mod parser;
pub mod rule;

pub use captures::Captures;
pub use debug_trace::{RuleTrace, ScanTrace};
pub use dsl::parse_program;
pub use error::{ProgramError, ProgramErrorKind, ScanError};
pub use executor::{LineReport, scan_lines};
pub use parser::{Scan, TokenParser};
pub use rule::Rule;
