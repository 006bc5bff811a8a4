use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use cadence_core::{config::CadenceConfig, jobs::JobService};
use cadence_schedule::{
    codec, describe, next_occurrences, next_occurrences_for_expression, validate::validate_in,
    Expression, JobRegistry, ScheduleDescription, ScheduleModel, Zone,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

mod runner;

/// Publishing schedule tools: encode, validate, describe and preview
/// schedule expressions, and manage the jobs that run on them.
#[derive(Debug, Parser)]
#[command(name = "cadence", version)]
struct Cli {
    /// Config file (default: $CADENCE_CONFIG or ~/.cadence/cadence.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode a visual schedule (JSON file, or `-` for stdin).
    Encode { schedule: String },
    /// Decode an expression into a visual schedule.
    Decode {
        expression: String,
        /// Zone for the decoded time of day.
        #[arg(long)]
        zone: Option<String>,
    },
    /// Validate an expression; exits with status 1 when invalid.
    Validate { expression: String },
    /// Describe an expression in plain English.
    Describe { expression: String },
    /// Preview the next run times.
    Next {
        #[arg(required_unless_present = "schedule", conflicts_with = "schedule")]
        expression: Option<String>,
        /// Visual schedule JSON file instead of an expression.
        #[arg(long)]
        schedule: Option<String>,
        #[arg(long)]
        count: Option<usize>,
        /// Reference time (RFC 3339); defaults to the current time.
        #[arg(long)]
        now: Option<String>,
    },
    /// Manage scheduled jobs.
    Jobs {
        #[command(subcommand)]
        action: JobsAction,
    },
}

#[derive(Debug, Subcommand)]
enum JobsAction {
    /// Activate a job on an expression.
    Enable {
        expression: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Deactivate a job.
    Disable {
        #[arg(long)]
        name: Option<String>,
    },
    /// Trigger one ad-hoc run outside the schedule.
    Test {
        #[arg(long)]
        name: Option<String>,
    },
    /// List jobs and recent runs.
    Status,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence=info,cadence_schedule=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // load config: --config > CADENCE_CONFIG env > ~/.cadence/cadence.toml
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CADENCE_CONFIG").ok());
    let config = CadenceConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        CadenceConfig::default()
    });

    Ok(if run(cli.command, &config)? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Execute one command. `Ok(false)` means it ran but reported a failure
/// (invalid expression, unsuccessful job call).
fn run(command: Command, config: &CadenceConfig) -> anyhow::Result<bool> {
    let display_zone: Zone = config
        .schedule
        .display_zone
        .parse()
        .context("schedule.display_zone")?;

    match command {
        Command::Encode { schedule } => {
            let model = read_schedule(&schedule)?;
            print_json(&ScheduleDescription::for_schedule(&model)?)?;
        }
        Command::Decode { expression, zone } => {
            let zone = match zone {
                Some(z) => z.parse()?,
                None => display_zone,
            };
            let expr = Expression::parse(&expression)?;
            print_json(&codec::decode_in(&expr, zone))?;
        }
        Command::Validate { expression } => {
            let result = validate_in(&expression, display_zone);
            print_json(&result)?;
            return Ok(result.is_valid);
        }
        Command::Describe { expression } => {
            println!("{}", describe::describe_in(&expression, display_zone));
        }
        Command::Next {
            expression,
            schedule,
            count,
            now,
        } => {
            let count = count.unwrap_or(config.schedule.preview_count);
            let now = parse_now(now.as_deref())?;
            let times = match (expression, schedule) {
                (_, Some(path)) => next_occurrences(&read_schedule(&path)?, count, now),
                (Some(raw), None) => {
                    next_occurrences_for_expression(&Expression::parse(&raw)?, count, now)
                }
                (None, None) => anyhow::bail!("an expression or --schedule is required"),
            };
            let times: Vec<String> = times.iter().map(|t| t.to_rfc3339()).collect();
            print_json(&times)?;
        }
        Command::Jobs { action } => return run_jobs(action, config),
    }
    Ok(true)
}

fn run_jobs(action: JobsAction, config: &CadenceConfig) -> anyhow::Result<bool> {
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");
    let conn = rusqlite::Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    let registry = JobRegistry::new(
        conn,
        runner::ShellRunner::new(config.jobs.test_command.clone()),
        config.jobs.history_limit,
    )?;
    let default_name = || config.jobs.default_job_name.clone();

    let outcome = match action {
        JobsAction::Enable { expression, name } => {
            registry.enable(&name.unwrap_or_else(default_name), &expression)
        }
        JobsAction::Disable { name } => registry.disable(&name.unwrap_or_else(default_name)),
        JobsAction::Test { name } => registry.test(&name.unwrap_or_else(default_name)),
        JobsAction::Status => {
            print_json(&registry.status()?)?;
            return Ok(true);
        }
    };

    print_json(&outcome)?;
    Ok(outcome.success)
}

fn read_schedule(path: &str) -> anyhow::Result<ScheduleModel> {
    let json = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?
    };
    serde_json::from_str(&json).with_context(|| format!("parsing schedule from {path}"))
}

fn parse_now(raw: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match raw {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("invalid --now value: {s}"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), "could not create database directory: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_next_with_expression() {
        let cli = Cli::try_parse_from(["cadence", "next", "0 13 * * 1", "--count", "3"]).unwrap();
        match cli.command {
            Command::Next {
                expression, count, ..
            } => {
                assert_eq!(expression.as_deref(), Some("0 13 * * 1"));
                assert_eq!(count, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn next_needs_expression_or_schedule() {
        assert!(Cli::try_parse_from(["cadence", "next"]).is_err());
        assert!(Cli::try_parse_from(["cadence", "next", "--schedule", "s.json"]).is_ok());
        assert!(
            Cli::try_parse_from(["cadence", "next", "0 13 * * 1", "--schedule", "s.json"])
                .is_err()
        );
    }

    #[test]
    fn parses_jobs_enable_with_global_config() {
        let cli = Cli::try_parse_from([
            "cadence",
            "jobs",
            "enable",
            "0 13 * * 1",
            "--name",
            "blog",
            "--config",
            "/tmp/cadence.toml",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("/tmp/cadence.toml"));
        assert!(matches!(
            cli.command,
            Command::Jobs {
                action: JobsAction::Enable { .. }
            }
        ));
    }

    #[test]
    fn now_accepts_offsets() {
        let now = parse_now(Some("2026-10-19T08:00:00-05:00")).unwrap();
        assert_eq!(now.to_rfc3339(), "2026-10-19T13:00:00+00:00");
        assert!(parse_now(Some("yesterday")).is_err());
    }

    #[test]
    fn validate_reports_failure_status() {
        let config = CadenceConfig::default();
        let ok = run(
            Command::Validate {
                expression: "0 24 * * *".to_string(),
            },
            &config,
        )
        .unwrap();
        assert!(!ok);
    }

    #[test]
    fn describe_never_fails_on_bad_input() {
        let config = CadenceConfig::default();
        let ok = run(
            Command::Describe {
                expression: "every monday".to_string(),
            },
            &config,
        )
        .unwrap();
        assert!(ok);
    }

    #[test]
    fn bad_display_zone_is_an_error() {
        let mut config = CadenceConfig::default();
        config.schedule.display_zone = "CET".to_string();
        let result = run(
            Command::Describe {
                expression: "0 13 * * 1".to_string(),
            },
            &config,
        );
        assert!(result.is_err());
    }
}
