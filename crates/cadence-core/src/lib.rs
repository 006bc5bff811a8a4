//! `cadence-core` — configuration, errors and the job-scheduling service
//! contract shared by the schedule engine and the `cadence` CLI.

pub mod config;
pub mod error;
pub mod jobs;

pub use error::{CadenceError, Result};
