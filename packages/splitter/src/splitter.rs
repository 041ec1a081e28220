//! Statement Splitter
//!
//! Single left-to-right scan over the script. At each position the scanner
//! skips whitespace, then either consumes a `DELIMITER <token>` directive or
//! cuts one statement at the next occurrence of the delimiter in effect.

use std::borrow::Cow;

use crate::error::SplitError;
use crate::types::{DoubledDelimiter, Split, SplitOptions, TrailingFragment, DIRECTIVE_KEYWORD};

/// Split `script` with the default [`SplitOptions`].
pub fn split(script: &str, initial_delimiter: &str) -> Result<Split, SplitError> {
    Splitter::default().split(script, initial_delimiter)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Splitter {
    options: SplitOptions,
}

/// A parsed `DELIMITER <token>` directive
struct Directive<'a> {
    delimiter: &'a str,
    /// Bytes consumed, from the keyword through the end of the token
    len: usize,
}

/// Where a terminated unit ends, relative to the unit start
struct Terminator {
    body_end: usize,
    unit_end: usize,
}

impl Splitter {
    pub const fn new(options: SplitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Split `script` into statements, starting with `initial_delimiter`.
    ///
    /// The caller applies any default delimiter; an empty one is rejected
    /// before scanning starts so no partial output is ever produced.
    pub fn split(&self, script: &str, initial_delimiter: &str) -> Result<Split, SplitError> {
        if initial_delimiter.is_empty() {
            return Err(SplitError::EmptyDelimiter);
        }

        let mut delimiter = initial_delimiter.to_string();
        let mut statements = Vec::new();
        let mut cursor = 0;

        loop {
            cursor = skip_whitespace(script, cursor);
            if cursor >= script.len() {
                break;
            }
            let rest = &script[cursor..];

            if let Some(directive) = parse_directive(rest)? {
                delimiter.clear();
                delimiter.push_str(directive.delimiter);
                cursor += directive.len;
                continue;
            }

            match self.find_terminator(rest, &delimiter) {
                Some(end) => {
                    self.push_statement(&mut statements, &rest[..end.body_end], &delimiter, true);
                    cursor += end.unit_end;
                }
                None => {
                    if self.options.trailing == TrailingFragment::Reject {
                        return Err(SplitError::MalformedScript {
                            offset: cursor,
                            fragment: rest.trim_end().to_string(),
                        });
                    }
                    self.push_statement(&mut statements, rest, &delimiter, false);
                    break;
                }
            }
        }

        Ok(Split {
            statements,
            delimiter,
        })
    }

    fn find_terminator(&self, rest: &str, delimiter: &str) -> Option<Terminator> {
        let step = delimiter.len();
        let mut from = 0;

        while let Some(found) = rest[from..].find(delimiter) {
            let at = from + found;
            let after = &rest[at + step..];
            if self.options.doubled_delimiter == DoubledDelimiter::Escape
                && after.starts_with(delimiter)
            {
                from = at + 2 * step;
                continue;
            }
            return Some(Terminator {
                body_end: at,
                unit_end: at + step,
            });
        }

        None
    }

    fn push_statement(
        &self,
        statements: &mut Vec<String>,
        body: &str,
        delimiter: &str,
        terminated: bool,
    ) {
        let mut text = Cow::Borrowed(body);

        if self.options.doubled_delimiter == DoubledDelimiter::Escape {
            let doubled = delimiter.repeat(2);
            if text.contains(doubled.as_str()) {
                text = Cow::Owned(text.replace(doubled.as_str(), delimiter));
            }
        }

        if self.options.collapse_newlines && text.contains(['\n', '\r']) {
            text = Cow::Owned(text.replace("\r\n", " ").replace(['\n', '\r'], " "));
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        let mut statement = trimmed.to_string();
        if self.options.retain_delimiter && terminated {
            statement.push_str(delimiter);
        }
        statements.push(statement);
    }
}

fn skip_whitespace(script: &str, cursor: usize) -> usize {
    let rest = &script[cursor..];
    cursor + (rest.len() - rest.trim_start().len())
}

/// Recognise a directive at the start of `rest`.
///
/// The keyword must be followed by whitespace or the end of input, so
/// identifiers such as `DELIMITERS` stay ordinary statement text.
fn parse_directive(rest: &str) -> Result<Option<Directive<'_>>, SplitError> {
    let keyword_len = DIRECTIVE_KEYWORD.len();
    let Some(head) = rest.get(..keyword_len) else {
        return Ok(None);
    };
    if !head.eq_ignore_ascii_case(DIRECTIVE_KEYWORD) {
        return Ok(None);
    }

    let after = &rest[keyword_len..];
    if !after.is_empty() && !after.starts_with(char::is_whitespace) {
        return Ok(None);
    }

    let token_start = keyword_len + (after.len() - after.trim_start().len());
    let token = &rest[token_start..];
    let token_len = token.find(char::is_whitespace).unwrap_or(token.len());
    if token_len == 0 {
        return Err(SplitError::EmptyDelimiter);
    }

    Ok(Some(Directive {
        delimiter: &token[..token_len],
        len: token_start + token_len,
    }))
}
