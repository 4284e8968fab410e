//! Debug trace types for the scan interpreter.
//!
//! These types record the cursor movement of each executed rule, so a
//! rejected line can be inspected rule by rule.

/// One executed rule and where it left the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTrace {
    /// Position of the rule in the program.
    pub rule_index: usize,
    /// DSL keyword of the rule.
    pub rule_name: &'static str,
    pub cursor_before: usize,
    /// `None` when the rule failed.
    pub cursor_after: Option<usize>,
}

impl RuleTrace {
    pub fn matched(&self) -> bool {
        self.cursor_after.is_some()
    }
}

/// Complete trace of one scan.
///
/// `steps` stops at the failing rule; rules after it were never executed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanTrace {
    pub steps: Vec<RuleTrace>,
    /// Length of the scanned input in bytes.
    pub input_len: usize,
}

impl ScanTrace {
    /// Cursor after the last successful step.
    pub fn final_cursor(&self) -> usize {
        self.steps
            .iter()
            .rev()
            .find_map(|s| s.cursor_after)
            .unwrap_or(0)
    }

    /// The step that failed, if the scan stopped inside the program.
    pub fn failed_step(&self) -> Option<&RuleTrace> {
        self.steps.last().filter(|s| !s.matched())
    }
}
