//! Process exit codes returned by [`crate::run`].

pub const SUCCESS: i32 = 0;

/// Bad arguments, bad config, unreadable input or an engine failure.
pub const ERROR: i32 = 2;

/// The human quit a `play` session before it finished.
pub const INTERRUPTED: i32 = 130;
