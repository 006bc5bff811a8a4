//! `cadence-schedule` — the automated-publishing schedule engine.
//!
//! # Overview
//!
//! The content-admin panel edits a [`ScheduleModel`] (the "visual
//! schedule"). The engine turns it into a five-field expression stored in
//! UTC, validates hand-typed expressions, describes either form in plain
//! English and previews upcoming runs. Everything here is pure and
//! synchronous except [`registry::JobRegistry`], which records named jobs
//! and their run history in SQLite.
//!
//! | Module       | Role                                                   |
//! |--------------|--------------------------------------------------------|
//! | `timezone`   | fixed-offset hour conversion (EST/CST/MST/PST/UTC)     |
//! | `model`      | visual schedule value object and its invariants        |
//! | `expression` | field grammar, bounds and parse errors                 |
//! | `codec`      | visual schedule ⇄ expression                           |
//! | `validate`   | editor-facing validation result                        |
//! | `describe`   | natural-language sentences                             |
//! | `predict`    | next N run times                                       |
//! | `registry`   | SQLite job registry implementing `JobService`          |

pub mod codec;
pub mod db;
pub mod describe;
pub mod error;
pub mod expression;
pub mod model;
pub mod predict;
pub mod registry;
pub mod timezone;
pub mod validate;

pub use codec::{decode, decode_in, decode_str, encode, DISPLAY_ZONE};
pub use describe::{describe, describe_expression, describe_schedule, ScheduleDescription};
pub use error::{Result, ScheduleError};
pub use expression::{Expression, ExpressionError, Field, FieldKind};
pub use model::{Frequency, IntervalUnit, Period, ScheduleModel, TimeOfDay};
pub use predict::{next_occurrences, next_occurrences_for_expression};
pub use registry::JobRegistry;
pub use timezone::{convert, Zone, REFERENCE_ZONE};
pub use validate::{validate, ValidationResult};
