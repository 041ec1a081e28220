//! Common Types and Constants
//!
//! Options that select between the statement policies found in deployed
//! scripts, and the output of a splitting pass.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Delimiter used when the caller has nothing better
pub const DEFAULT_DELIMITER: &str = ";";

/// Keyword of the in-band directive, matched case-insensitively
pub const DIRECTIVE_KEYWORD: &str = "DELIMITER";

// ==================== Policies ====================

/// What two adjacent delimiter occurrences mean
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoubledDelimiter {
    /// Each occurrence terminates a statement; the empty one in between is dropped.
    #[default]
    Terminate,
    /// The pair stands for one literal delimiter inside the statement body.
    Escape,
}

/// What happens to text after the last delimiter occurrence
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingFragment {
    /// The fragment becomes the final statement.
    #[default]
    Implicit,
    /// The fragment fails the whole pass with `MalformedScript`.
    Reject,
}

/// Splitting options
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitOptions {
    /// Append the delimiter that terminated each statement to its text
    pub retain_delimiter: bool,
    pub doubled_delimiter: DoubledDelimiter,
    pub trailing: TrailingFragment,
    /// Replace every line break inside a statement with one space
    pub collapse_newlines: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            retain_delimiter: false,
            doubled_delimiter: DoubledDelimiter::Terminate,
            trailing: TrailingFragment::Implicit,
            collapse_newlines: true,
        }
    }
}

// ==================== Output ====================

/// Result of one splitting pass
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Statements in document order, never empty strings
    pub statements: Vec<String>,
    /// Delimiter in effect when the scan finished
    pub delimiter: String,
}

impl Split {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn into_statements(self) -> Vec<String> {
        self.statements
    }
}
