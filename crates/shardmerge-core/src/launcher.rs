//! The external distributed task launcher.

use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::errors::{CollectError, CollectResult};
use crate::model::SUMMARY_FILE;

/// Exit code reported when a process could not be judged at all.
const GENERIC_FAILURE: i32 = 1;

/// Runs the sharded task and leaves `summary.json` plus one directory per
/// shard in `output_dir`. Blocks until every shard finished or timed out.
pub trait TaskLauncher {
    /// Returns the launcher's own exit code. `Err` only when it could not be
    /// started.
    fn launch(&self, output_dir: &Path) -> CollectResult<i32>;
}

/// Launches `<program> <args..> -output-dir <dir> -task-summary-json <dir>/summary.json`.
#[derive(Debug, Clone)]
pub struct SwarmingLauncher {
    program: String,
    args: Vec<String>,
}

impl SwarmingLauncher {
    pub const DEFAULT_PROGRAM: &'static str = "swarming";

    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Full argument vector after the program name.
    pub fn command_args(&self, output_dir: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "-output-dir".to_string(),
            output_dir.display().to_string(),
            "-task-summary-json".to_string(),
            output_dir.join(SUMMARY_FILE).display().to_string(),
        ]);
        args
    }
}

impl TaskLauncher for SwarmingLauncher {
    fn launch(&self, output_dir: &Path) -> CollectResult<i32> {
        let args = self.command_args(output_dir);
        tracing::info!(program = %self.program, ?args, "launching task");

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|source| CollectError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let code = exit_code_from_status(status);
        if code != 0 {
            tracing::warn!(exit_code = code, "task launcher had non-zero return code");
        }
        Ok(code)
    }
}

/// Map an exit status to a process exit code. Signal deaths follow the shell
/// convention `128 + signal`.
pub fn exit_code_from_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    GENERIC_FAILURE
}
