use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_DISPLAY_ZONE: &str = "EST";
pub const DEFAULT_PREVIEW_COUNT: usize = 5;
pub const DEFAULT_JOB_NAME: &str = "blog-autopublish";
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Top-level config (cadence.toml + CADENCE_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CadenceConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// Settings for the schedule editor preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Zone expressions are decoded into and shown alongside UTC in
    /// descriptions. One of EST, CST, MST, PST, UTC.
    #[serde(default = "default_display_zone")]
    pub display_zone: String,
    /// How many upcoming runs to preview when the caller does not say.
    #[serde(default = "default_preview_count")]
    pub preview_count: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            display_zone: default_display_zone(),
            preview_count: DEFAULT_PREVIEW_COUNT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Job registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Job name used when a command does not name one explicitly.
    #[serde(default = "default_job_name")]
    pub default_job_name: String,
    /// Number of run records kept in the recent-runs history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Shell command run by `jobs test`, with the job name in `$CADENCE_JOB`.
    /// When unset a test run only records that it was requested.
    #[serde(default)]
    pub test_command: Option<String>,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            default_job_name: default_job_name(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            test_command: None,
        }
    }
}

fn default_display_zone() -> String {
    DEFAULT_DISPLAY_ZONE.to_string()
}
fn default_preview_count() -> usize {
    DEFAULT_PREVIEW_COUNT
}
fn default_job_name() -> String {
    DEFAULT_JOB_NAME.to_string()
}
fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cadence/cadence.db", home)
}

impl CadenceConfig {
    /// Load config from a TOML file with CADENCE_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.cadence/cadence.toml
    ///
    /// Nested keys use a double underscore, e.g.
    /// `CADENCE_SCHEDULE__DISPLAY_ZONE=PST`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        if std::path::Path::new(&path).exists() {
            debug!(path = %path, "loading config file");
        } else {
            debug!(path = %path, "no config file, using defaults and environment");
        }

        Self::extract(
            Figment::new()
                .merge(Toml::file(&path))
                .merge(Env::prefixed("CADENCE_").split("__")),
        )
    }

    fn extract(figment: Figment) -> crate::error::Result<Self> {
        figment
            .extract()
            .map_err(|e| crate::error::CadenceError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.cadence/cadence.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CadenceConfig::extract(Figment::from(Toml::string(""))).unwrap();
        assert_eq!(config.schedule.display_zone, "EST");
        assert_eq!(config.schedule.preview_count, 5);
        assert_eq!(config.jobs.default_job_name, "blog-autopublish");
        assert_eq!(config.jobs.history_limit, 50);
        assert!(config.database.path.ends_with(".cadence/cadence.db"));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let toml = r#"
            [schedule]
            display_zone = "PST"

            [jobs]
            history_limit = 10
            test_command = "./publish.sh --dry-run"
        "#;
        let config = CadenceConfig::extract(Figment::from(Toml::string(toml))).unwrap();
        assert_eq!(config.schedule.display_zone, "PST");
        assert_eq!(config.schedule.preview_count, 5);
        assert_eq!(config.jobs.history_limit, 10);
        assert_eq!(config.jobs.default_job_name, "blog-autopublish");
        assert_eq!(
            config.jobs.test_command.as_deref(),
            Some("./publish.sh --dry-run")
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = CadenceConfig::load(Some("/nonexistent/cadence/cadence.toml")).unwrap();
        assert_eq!(config.jobs.default_job_name, "blog-autopublish");
        assert_eq!(config.schedule.preview_count, 5);
    }

    #[test]
    fn wrong_type_is_a_config_error() {
        let toml = r#"
            [schedule]
            preview_count = "many"
        "#;
        let err = CadenceConfig::extract(Figment::from(Toml::string(toml))).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
