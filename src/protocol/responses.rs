//! Wire sentinels and replies
//!
//! Reserved literal lines used as protocol markers rather than payload
//! content, and the prefix applied to validation-error replies.

use crate::error::RequestError;

/// Marks the end of a data response.
pub const DONE: &str = "\\done";
/// Acknowledges a valid request; also announces a readable file on the
/// data connection.
pub const GOOD: &str = "\\good";
/// Precedes the error payload for a failed file request.
pub const BAD: &str = "\\bad";
/// Client-sent token that aborts a file transfer.
pub const CANCEL: &str = "\\cancel";

/// Prefix applied to validation-error replies on the control connection.
pub const ERROR_PREFIX: &str = "Error: ";

/// Render a validation error as the control-connection reply line.
pub fn error_reply(error: &RequestError) -> String {
    format!("{}{}", ERROR_PREFIX, error)
}
