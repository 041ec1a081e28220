use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// The delimiter in effect would be the empty string, either because the
    /// caller passed one or because a `DELIMITER` directive has no token.
    #[error("delimiter must not be empty")]
    EmptyDelimiter,
    /// A non-empty fragment is not terminated by the current delimiter and the
    /// splitter runs with [`TrailingFragment::Reject`](crate::TrailingFragment::Reject).
    #[error("unterminated statement at byte {offset}: {fragment}")]
    MalformedScript { offset: usize, fragment: String },
}
