use cadence_core::{
    error::CadenceError,
    jobs::{JobOutcome, JobRecord, JobRunner, JobService, JobStatusReport, RunRecord, RunStatus},
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    db::init_db,
    error::{Result, ScheduleError},
    describe::describe_expression,
    expression::Expression,
};

/// SQLite-backed [`JobService`]: stores one expression and an active flag
/// per named job plus a bounded history of runs.
///
/// Running a job is delegated to the [`JobRunner`]; the registry only
/// records the outcome.
pub struct JobRegistry<R> {
    conn: Connection,
    runner: R,
    history_limit: usize,
}

impl<R: JobRunner> JobRegistry<R> {
    /// Wrap `conn`, initialising the schema if needed.
    pub fn new(conn: Connection, runner: R, history_limit: usize) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn,
            runner,
            history_limit,
        })
    }

    /// Look up a single job by name.
    pub fn get_job(&self, job_name: &str) -> Result<Option<JobRecord>> {
        let job = self
            .conn
            .query_row(
                "SELECT job_name, expression, active FROM scheduled_jobs WHERE job_name = ?1",
                [job_name],
                |row| {
                    Ok(JobRecord {
                        job_name: row.get(0)?,
                        expression: row.get(1)?,
                        active: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(job)
    }

    fn upsert_active(&self, job_name: &str, expression: &Expression) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO scheduled_jobs (job_name, expression, active, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, ?3)
             ON CONFLICT(job_name) DO UPDATE
             SET expression = excluded.expression, active = 1, updated_at = excluded.updated_at",
            params![job_name, expression.to_string(), now],
        )?;
        Ok(())
    }

    fn deactivate(&self, job_name: &str) -> Result<()> {
        let n = self.conn.execute(
            "UPDATE scheduled_jobs SET active = 0, updated_at = ?1 WHERE job_name = ?2",
            params![Utc::now().to_rfc3339(), job_name],
        )?;
        if n == 0 {
            return Err(ScheduleError::JobNotFound {
                name: job_name.to_string(),
            });
        }
        Ok(())
    }

    fn run_once(&self, job_name: &str) -> Result<(RunStatus, String)> {
        if self.get_job(job_name)?.is_none() {
            return Err(ScheduleError::JobNotFound {
                name: job_name.to_string(),
            });
        }

        let start = Utc::now();
        let outcome = self.runner.run(job_name);
        let end = Utc::now();

        let (status, message) = match outcome {
            Ok(()) => (RunStatus::Succeeded, format!("Test run of '{job_name}' succeeded")),
            Err(reason) => (
                RunStatus::Failed,
                format!("Test run of '{job_name}' failed: {reason}"),
            ),
        };

        self.conn.execute(
            "INSERT INTO job_runs (id, job_name, status, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Uuid::new_v4().to_string(),
                job_name,
                status.to_string(),
                start.to_rfc3339(),
                end.to_rfc3339()
            ],
        )?;
        self.prune_history()?;
        Ok((status, message))
    }

    /// Keep only the newest `history_limit` run records.
    fn prune_history(&self) -> Result<()> {
        let limit = i64::try_from(self.history_limit).unwrap_or(i64::MAX);
        let n = self.conn.execute(
            "DELETE FROM job_runs WHERE rowid NOT IN
             (SELECT rowid FROM job_runs ORDER BY rowid DESC LIMIT ?1)",
            [limit],
        )?;
        if n > 0 {
            info!(count = n, "pruned run history");
        }
        Ok(())
    }

    fn load_status(&self) -> Result<JobStatusReport> {
        let jobs = {
            let mut stmt = self.conn.prepare(
                "SELECT job_name, expression, active FROM scheduled_jobs ORDER BY job_name",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(JobRecord {
                    job_name: row.get(0)?,
                    expression: row.get(1)?,
                    active: row.get(2)?,
                })
            })?;
            let jobs = rows.collect::<std::result::Result<Vec<_>, _>>()?;
            jobs
        };

        let recent_runs = {
            let mut stmt = self.conn.prepare(
                "SELECT job_name, status, start_time, end_time
                 FROM job_runs ORDER BY rowid DESC",
            )?;
            let rows: Vec<RunRecord> = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?, // job_name
                        row.get::<_, String>(1)?, // status
                        row.get::<_, String>(2)?, // start_time
                        row.get::<_, String>(3)?, // end_time
                    ))
                })?
                .filter_map(|r| {
                    let (job_name, status, start_time, end_time) = r.ok()?;
                    Some(RunRecord {
                        job_name,
                        status: status.parse().ok()?,
                        start_time,
                        end_time,
                    })
                })
                .collect();
            rows
        };

        Ok(JobStatusReport { jobs, recent_runs })
    }
}

impl<R: JobRunner> JobService for JobRegistry<R> {
    fn enable(&self, job_name: &str, expression: &str) -> JobOutcome {
        if job_name.trim().is_empty() {
            return JobOutcome::failed("Job name must not be empty");
        }
        let parsed = match Expression::parse(expression) {
            Ok(expr) => expr,
            Err(e) => {
                warn!(job_name = %job_name, error = %e, "refusing to enable job");
                return JobOutcome::failed(e.to_string());
            }
        };

        match self.upsert_active(job_name, &parsed) {
            Ok(()) => {
                info!(job_name = %job_name, expression = %parsed, "job enabled");
                JobOutcome::ok(format!(
                    "Job '{job_name}' enabled: {}",
                    describe_expression(&parsed)
                ))
            }
            Err(e) => {
                error!(job_name = %job_name, "enable failed: {e}");
                JobOutcome::failed(e.to_string())
            }
        }
    }

    fn disable(&self, job_name: &str) -> JobOutcome {
        match self.deactivate(job_name) {
            Ok(()) => {
                info!(job_name = %job_name, "job disabled");
                JobOutcome::ok(format!("Job '{job_name}' disabled"))
            }
            Err(e) => {
                warn!(job_name = %job_name, "disable failed: {e}");
                JobOutcome::failed(e.to_string())
            }
        }
    }

    fn test(&self, job_name: &str) -> JobOutcome {
        match self.run_once(job_name) {
            Ok((RunStatus::Succeeded, message)) => {
                info!(job_name = %job_name, "test run succeeded");
                JobOutcome::ok(message)
            }
            Ok((RunStatus::Failed, message)) => {
                warn!(job_name = %job_name, "test run failed");
                JobOutcome::failed(message)
            }
            Err(e) => {
                warn!(job_name = %job_name, "test run not started: {e}");
                JobOutcome::failed(e.to_string())
            }
        }
    }

    fn status(&self) -> cadence_core::Result<JobStatusReport> {
        self.load_status()
            .map_err(|e| CadenceError::Database(e.to_string()))
    }
}
