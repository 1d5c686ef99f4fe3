//! Process exit codes

/// Any failure
pub const ERROR: i32 = 1;

/// Interrupted by Ctrl+C (128 + SIGINT)
pub const INTERRUPTED: i32 = 130;
