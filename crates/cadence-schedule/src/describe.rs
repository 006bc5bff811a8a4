//! Human-readable sentences for schedule expressions and visual schedules.
//!
//! Describing never fails. Field shapes without a dedicated phrasing fall
//! back to a generic wording that still reads as a sentence.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    codec::{self, DISPLAY_ZONE},
    error::Result,
    expression::{Expression, Field, FieldKind},
    model::{Frequency, IntervalUnit, ScheduleModel, TimeOfDay},
    timezone::{self, Zone, REFERENCE_ZONE},
};

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Curated phrasing for the presets offered in the editor, keyed by
/// canonical expression. Times in parentheses are Eastern.
const PRESETS: &[(&str, &str)] = &[
    ("0 13 * * 1", "Every Monday at 1:00 PM UTC (8:00 AM EST)"),
    ("0 14 * * 1", "Every Monday at 2:00 PM UTC (9:00 AM EST)"),
    ("0 15 * * 1", "Every Monday at 3:00 PM UTC (10:00 AM EST)"),
    ("0 13 * * *", "Every day at 1:00 PM UTC (8:00 AM EST)"),
    ("0 0 * * *", "Every day at midnight UTC (7:00 PM EST)"),
    ("0 13 * * 1-5", "Every weekday at 1:00 PM UTC (8:00 AM EST)"),
    ("0 */6 * * *", "Every 6 hours"),
    ("*/30 * * * *", "Every 30 minutes"),
    ("0 * * * *", "Every hour"),
];

/// A sentence together with the canonical expression it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDescription {
    pub sentence: String,
    pub expression: String,
}

impl ScheduleDescription {
    /// Encode `schedule` and describe it from the visual fields.
    pub fn for_schedule(schedule: &ScheduleModel) -> Result<Self> {
        let expression = codec::encode(schedule)?;
        Ok(Self {
            sentence: describe_schedule(schedule),
            expression: expression.to_string(),
        })
    }

    pub fn for_expression(expr: &Expression) -> Self {
        Self {
            sentence: describe_expression(expr),
            expression: expr.to_string(),
        }
    }
}

/// Describe a raw expression string. Unparseable input is echoed back.
pub fn describe(raw: &str) -> String {
    describe_in(raw, DISPLAY_ZONE)
}

pub fn describe_in(raw: &str, zone: Zone) -> String {
    match Expression::parse(raw) {
        Ok(expr) => describe_expression_in(&expr, zone),
        Err(_) => format!("Custom schedule ({})", raw.trim()),
    }
}

pub fn describe_expression(expr: &Expression) -> String {
    describe_expression_in(expr, DISPLAY_ZONE)
}

/// Describe `expr`, adding the time in `zone` next to the UTC time.
///
/// The curated presets are written for Eastern time and only apply when
/// `zone` is [`Zone::Est`].
pub fn describe_expression_in(expr: &Expression, zone: Zone) -> String {
    let canonical = expr.to_string();
    if zone == Zone::Est {
        if let Some((_, sentence)) = PRESETS.iter().find(|(e, _)| *e == canonical) {
            return (*sentence).to_string();
        }
    }

    let mut days = day_clause(expr);
    if let Some(months) = month_clause(&expr.month) {
        days = format!("{days} in {months}");
    }

    match (days.as_str(), time_clause(expr, zone)) {
        (EVERY_DAY, TimeClause::Periodic(every)) => capitalize(&every),
        (_, TimeClause::Periodic(every)) => format!("{days}, {every}"),
        (_, TimeClause::At(time)) => format!("{days} at {time}"),
    }
}

/// Describe a visual schedule directly from its fields, in its own zone.
///
/// Weekdays are the ones stored in the expression, which fires on UTC
/// weekdays. When the zone's time falls on the previous UTC day (6:30 PM PST
/// is 02:30 UTC the next day), the job runs on the local day before the one
/// named here; see [`crate::predict::next_occurrences`].
pub fn describe_schedule(schedule: &ScheduleModel) -> String {
    let time = format!("{} {}", schedule.time_of_day, schedule.timezone);
    match schedule.frequency {
        Frequency::Daily => format!("Every day at {time}"),
        Frequency::Weekly => format!("{} at {time}", weekly_days(&schedule.days_of_week)),
        Frequency::Monthly => {
            format!("On day {} of every month at {time}", schedule.day_of_month)
        }
        Frequency::Custom => {
            let every = every_n(schedule.interval, schedule.interval_unit.singular());
            match schedule.interval_unit {
                IntervalUnit::Minutes => every,
                IntervalUnit::Hours => match schedule.time_of_day.minute {
                    0 => every,
                    m => format!("{every} at {m} minutes past the hour"),
                },
                IntervalUnit::Days => format!("{every} at {time}"),
                IntervalUnit::Weeks => {
                    let day = schedule.days_of_week.first().copied().unwrap_or(0);
                    format!("{every} on {} at {time}", day_name(u32::from(day)))
                }
            }
        }
    }
}

const EVERY_DAY: &str = "Every day";

enum TimeClause {
    /// "1:00 PM UTC (8:00 AM EST)"
    At(String),
    /// "every 6 hours"
    Periodic(String),
}

fn day_clause(expr: &Expression) -> String {
    match &expr.day_of_week {
        Field::Any => month_day_clause(&expr.day_of_month),
        // Either field matching fires the job.
        _ if expr.day_of_month != Field::Any => "On selected days".to_string(),
        Field::Value(d) => format!("Every {}", day_name(*d)),
        dow @ Field::List(_) => {
            let days: BTreeSet<u8> = dow
                .expand(FieldKind::DayOfWeek)
                .into_iter()
                .map(|d| d as u8)
                .collect();
            weekly_days(&days)
        }
        Field::Range { start, end } => match (*start, *end) {
            (1, 5) => "Every weekday".to_string(),
            (0, 6) | (0, 7) | (1, 7) => EVERY_DAY.to_string(),
            (s, e) => format!("Every {} through {}", day_name(s), day_name(e)),
        },
        Field::Step {
            base: Some(d),
            step,
        } if step % 7 == 0 => format!("{} on {}", every_n(step / 7, "week"), day_name(*d)),
        Field::Step { .. } => "On selected days of the week".to_string(),
    }
}

fn month_day_clause(dom: &Field) -> String {
    match dom {
        Field::Any => EVERY_DAY.to_string(),
        Field::Value(d) => format!("On day {d} of every month"),
        Field::List(ds) => format!("On days {} of every month", join_words(ds)),
        Field::Range { start, end } => {
            format!("On days {start} through {end} of every month")
        }
        Field::Step { base: None, step } => every_n(*step, "day"),
        Field::Step {
            base: Some(b),
            step,
        } => format!("{} starting on day {b}", every_n(*step, "day")),
    }
}

fn month_clause(month: &Field) -> Option<String> {
    match month {
        Field::Any => None,
        Field::Value(m) => Some(month_name(*m).to_string()),
        Field::List(ms) => Some(join_words(
            &ms.iter().map(|m| month_name(*m)).collect::<Vec<_>>(),
        )),
        Field::Range { start, end } => Some(format!(
            "{} through {}",
            month_name(*start),
            month_name(*end)
        )),
        Field::Step { .. } => Some("selected months".to_string()),
    }
}

fn time_clause(expr: &Expression, zone: Zone) -> TimeClause {
    match (&expr.minute, &expr.hour) {
        (Field::Value(m), Field::Value(h)) => TimeClause::At(dual_time(*h, *m, zone)),
        (Field::Value(m), Field::Step { base: None, step }) => {
            let every = every_n(*step, "hour").to_lowercase();
            TimeClause::Periodic(past_the_hour(every, *m))
        }
        (Field::Value(m), Field::Step { base: Some(b), step }) => {
            let every = every_n(*step, "hour").to_lowercase();
            TimeClause::Periodic(format!("{every} starting at {}", dual_time(*b, *m, zone)))
        }
        (Field::Value(m), Field::Any) => TimeClause::Periodic(past_the_hour("every hour".into(), *m)),
        (minute @ (Field::Step { .. } | Field::Any), Field::Any) => {
            TimeClause::Periodic(minute_clause(minute))
        }
        (minute @ (Field::Step { .. } | Field::Any), Field::Value(h)) => TimeClause::Periodic(
            format!("{} during the hour starting {}", minute_clause(minute), dual_time(*h, 0, zone)),
        ),
        _ => TimeClause::At("scheduled times".to_string()),
    }
}

/// "every minute", "every 15 minutes", "every 15 minutes from minute 5".
fn minute_clause(minute: &Field) -> String {
    match minute {
        Field::Step { base: None, step } => every_n(*step, "minute").to_lowercase(),
        Field::Step {
            base: Some(b),
            step,
        } => format!("{} from minute {b}", every_n(*step, "minute").to_lowercase()),
        _ => "every minute".to_string(),
    }
}

fn past_the_hour(every: String, minute: u32) -> String {
    match minute {
        0 => every,
        m => format!("{every} at {m} minutes past the hour"),
    }
}

/// "1:00 PM UTC (8:00 AM EST)", or just the UTC time when `zone` is UTC.
fn dual_time(hour: u32, minute: u32, zone: Zone) -> String {
    let utc = format_clock(hour, minute);
    if zone == REFERENCE_ZONE {
        return format!("{utc} {REFERENCE_ZONE}");
    }
    let local = timezone::from_reference(hour as u8, zone);
    format!(
        "{utc} {REFERENCE_ZONE} ({} {zone})",
        format_clock(u32::from(local), minute)
    )
}

fn format_clock(hour: u32, minute: u32) -> String {
    TimeOfDay {
        minute: minute as u8,
        ..TimeOfDay::from_24h(hour as u8, 0)
    }
    .to_string()
}

fn weekly_days(days: &BTreeSet<u8>) -> String {
    let weekdays: BTreeSet<u8> = (1..=5).collect();
    if *days == weekdays {
        return "Every weekday".to_string();
    }
    if days.len() == 7 {
        return EVERY_DAY.to_string();
    }
    if days.is_empty() {
        return "Every week".to_string();
    }
    let names: Vec<&str> = days.iter().map(|d| day_name(u32::from(*d))).collect();
    format!("Every {}", join_words(&names))
}

fn every_n(n: u32, unit: &str) -> String {
    match n {
        1 => format!("Every {unit}"),
        n => format!("Every {n} {unit}s"),
    }
}

fn day_name(day: u32) -> &'static str {
    DAY_NAMES[(day % 7) as usize]
}

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[((month + 11) % 12) as usize]
}

/// "a", "a and b", "a, b and c".
fn join_words<T: std::fmt::Display>(items: &[T]) -> String {
    let words: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    match words.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
