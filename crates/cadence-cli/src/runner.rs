use std::process::Command;

use cadence_core::jobs::JobRunner;
use tracing::{info, warn};

/// Runs the configured `jobs.test_command` through `sh -c`, exporting the
/// job name as `CADENCE_JOB`. Without a command the run only gets logged.
pub struct ShellRunner {
    command: Option<String>,
}

impl ShellRunner {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl JobRunner for ShellRunner {
    fn run(&self, job_name: &str) -> Result<(), String> {
        let Some(ref command) = self.command else {
            info!(job_name = %job_name, "no test_command configured; run recorded only");
            return Ok(());
        };

        info!(job_name = %job_name, %command, "running test command");
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .env("CADENCE_JOB", job_name)
            .output()
            .map_err(|e| format!("could not start test command: {e}"))?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(job_name = %job_name, status = %output.status, "test command failed");
        Err(match stderr.trim() {
            "" => format!("test command exited with {}", output.status),
            detail => format!("test command exited with {}: {detail}", output.status),
        })
    }
}
