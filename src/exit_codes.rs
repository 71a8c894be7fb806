//! Exit code constants for the langfuse-prompt CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad config, missing credentials)
//! - 2: Vars could not be parsed as JSON
//! - 3: Prompt fetch failure (transport, status, response shape)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable input, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// A vars string was not valid JSON.
pub const VARS_PARSE_FAILURE: i32 = 2;

/// Fetching a prompt from Langfuse failed.
pub const FETCH_FAILURE: i32 = 3;
