//! Contract of the job-scheduling service that activates a publishing
//! schedule. The schedule expression string is the only schedule data that
//! crosses this boundary.

use serde::{Deserialize, Serialize};

/// Result of an `enable` / `disable` / `test` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub success: bool,
    pub message: String,
}

impl JobOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// One named job and the expression it currently runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_name: String,
    pub expression: String,
    pub active: bool,
}

/// Outcome of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "succeeded" => Ok(RunStatus::Succeeded),
            "failed" => Ok(RunStatus::Failed),
            other => Err(format!("unknown run status: {other}")),
        }
    }
}

/// Entry in the bounded recent-runs history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub job_name: String,
    pub status: RunStatus,
    /// RFC 3339 timestamp.
    pub start_time: String,
    /// RFC 3339 timestamp.
    pub end_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusReport {
    pub jobs: Vec<JobRecord>,
    /// Newest first.
    pub recent_runs: Vec<RunRecord>,
}

/// Activates, deactivates and test-fires named recurring jobs.
///
/// Failures of `enable` / `disable` / `test` are reported through
/// [`JobOutcome::success`] rather than an `Err`, so a caller can always show
/// the message inline.
pub trait JobService {
    fn enable(&self, job_name: &str, expression: &str) -> JobOutcome;
    fn disable(&self, job_name: &str) -> JobOutcome;
    /// Trigger one ad-hoc run outside the schedule.
    fn test(&self, job_name: &str) -> JobOutcome;
    fn status(&self) -> crate::error::Result<JobStatusReport>;
}

/// Executes one run of a named job. Implemented by whatever actually
/// publishes content; the schedule engine never does.
pub trait JobRunner {
    fn run(&self, job_name: &str) -> std::result::Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_report_uses_camel_case_keys() {
        let report = JobStatusReport {
            jobs: vec![JobRecord {
                job_name: "blog-autopublish".into(),
                expression: "0 13 * * 1".into(),
                active: true,
            }],
            recent_runs: vec![RunRecord {
                job_name: "blog-autopublish".into(),
                status: RunStatus::Succeeded,
                start_time: "2026-10-19T13:00:00+00:00".into(),
                end_time: "2026-10-19T13:00:02+00:00".into(),
            }],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""jobName":"blog-autopublish""#));
        assert!(json.contains(r#""recentRuns""#));
        assert!(json.contains(r#""startTime""#));
        assert!(json.contains(r#""status":"succeeded""#));
    }

    #[test]
    fn run_status_text_round_trips() {
        for status in [RunStatus::Succeeded, RunStatus::Failed] {
            assert_eq!(status.to_string().parse::<RunStatus>().unwrap(), status);
        }
        assert!("running".parse::<RunStatus>().is_err());
    }
}
