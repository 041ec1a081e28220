//! # scriptrun-splitter - delimited statement splitter
//!
//! Turns one multi-statement script into an ordered list of statements that
//! can be executed one by one. The delimiter is mutable in-band through the
//! classic interactive-client directive:
//!
//! ```text
//! DELIMITER $$
//! CREATE PROCEDURE p() BEGIN SELECT 1; END$$
//! DELIMITER ;
//! ```
//!
//! This is not a SQL parser. Quotes and comments mean nothing here; only the
//! literal delimiter token and the `DELIMITER` keyword are recognised.
//!
//! ## Modules
//!
//! - [`splitter`] - the scanner ([`Splitter`], [`split`])
//! - [`types`] - options, output and constants
//! - [`error`] - [`SplitError`]
//!
//! ## Example
//!
//! ```rust
//! use scriptrun_splitter::split;
//!
//! let result = split("SELECT 1;SELECT 2;", ";").unwrap();
//! assert_eq!(result.statements, vec!["SELECT 1", "SELECT 2"]);
//! assert_eq!(result.delimiter, ";");
//! ```

pub mod error;
pub mod splitter;
pub mod types;

pub use error::SplitError;
pub use splitter::{split, Splitter};
pub use types::{
    DoubledDelimiter, Split, SplitOptions, TrailingFragment, DEFAULT_DELIMITER, DIRECTIVE_KEYWORD,
};
