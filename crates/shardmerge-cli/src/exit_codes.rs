//! Process exit codes.
//!
//! After argument parsing the exit code is the task launcher's own exit code,
//! passed through verbatim, or `shardmerge_core::LAUNCH_FAILURE` when it could
//! not be started. Only the codes below are produced here.

pub const SUCCESS: i32 = 0;
pub const USAGE_ERROR: i32 = 2; // invalid command line
