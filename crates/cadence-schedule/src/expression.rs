//! Five-field schedule expressions: `minute hour day-of-month month day-of-week`.
//!
//! Each field is one of
//!
//! | Form        | Example  | Meaning                              |
//! |-------------|----------|--------------------------------------|
//! | `*`         | `*`      | every value                          |
//! | integer     | `13`     | exactly that value                   |
//! | list        | `1,3,5`  | each listed value                    |
//! | range       | `1-5`    | `start` through `end`, `start < end` |
//! | step        | `*/30`   | every `step` values from `base`      |
//!
//! Lists hold plain integers only and a step's base is `*` or a single
//! integer. Combinations such as `1-5/2` or `1-3,7` are rejected.

use std::collections::BTreeSet;

use thiserror::Error;

pub const FIELD_COUNT: usize = 5;

/// Position of a field within an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl FieldKind {
    pub const ALL: [FieldKind; FIELD_COUNT] = [
        FieldKind::Minute,
        FieldKind::Hour,
        FieldKind::DayOfMonth,
        FieldKind::Month,
        FieldKind::DayOfWeek,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Minute => "minute",
            FieldKind::Hour => "hour",
            FieldKind::DayOfMonth => "day of month",
            FieldKind::Month => "month",
            FieldKind::DayOfWeek => "day of week",
        }
    }

    /// Inclusive bounds. Day of week accepts both 0 and 7 for Sunday.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            FieldKind::Minute => (0, 59),
            FieldKind::Hour => (0, 23),
            FieldKind::DayOfMonth => (1, 31),
            FieldKind::Month => (1, 12),
            FieldKind::DayOfWeek => (0, 7),
        }
    }

    pub fn min(self) -> u32 {
        self.bounds().0
    }

    pub fn max(self) -> u32 {
        self.bounds().1
    }

    fn contains(self, value: u32) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a raw expression was rejected. `FieldCount` and `Empty` are
/// structural; every other variant names the offending field and its bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("Schedule expression is empty")]
    Empty,

    #[error(
        "Expected 5 fields (minute hour day-of-month month day-of-week), found {found}"
    )]
    FieldCount { found: usize },

    #[error("Invalid {field} value {value}: must be between {min} and {max}")]
    OutOfRange {
        field: FieldKind,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Invalid {field} step '{step}': must be a positive integer")]
    InvalidStep { field: FieldKind, step: String },

    #[error(
        "Invalid {field} range {start}-{end}: start must be less than end (allowed {min}-{max})"
    )]
    InvalidRange {
        field: FieldKind,
        start: u32,
        end: u32,
        min: u32,
        max: u32,
    },

    #[error(
        "Invalid {field} field '{value}': expected *, a number, a list, a range or a step within {min}-{max}"
    )]
    Malformed {
        field: FieldKind,
        value: String,
        min: u32,
        max: u32,
    },
}

impl ExpressionError {
    /// True for errors about the overall shape rather than one field.
    pub fn is_structural(&self) -> bool {
        matches!(self, ExpressionError::Empty | ExpressionError::FieldCount { .. })
    }

    /// The field the error is about, if any.
    pub fn field(&self) -> Option<FieldKind> {
        match self {
            ExpressionError::Empty | ExpressionError::FieldCount { .. } => None,
            ExpressionError::OutOfRange { field, .. }
            | ExpressionError::InvalidStep { field, .. }
            | ExpressionError::InvalidRange { field, .. }
            | ExpressionError::Malformed { field, .. } => Some(*field),
        }
    }
}

/// One parsed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Any,
    Value(u32),
    List(Vec<u32>),
    Range { start: u32, end: u32 },
    /// `base/step`; `base` is `None` for `*`.
    Step { base: Option<u32>, step: u32 },
}

impl Field {
    pub fn parse(kind: FieldKind, raw: &str) -> Result<Self, ExpressionError> {
        let (min, max) = kind.bounds();
        let malformed = || ExpressionError::Malformed {
            field: kind,
            value: raw.to_string(),
            min,
            max,
        };
        let bounded = |value: u32| {
            if kind.contains(value) {
                Ok(value)
            } else {
                Err(ExpressionError::OutOfRange {
                    field: kind,
                    value,
                    min,
                    max,
                })
            }
        };

        if raw == "*" {
            return Ok(Field::Any);
        }

        if let Some((base, step)) = raw.split_once('/') {
            let step = parse_number(step)
                .filter(|s| *s > 0)
                .ok_or_else(|| ExpressionError::InvalidStep {
                    field: kind,
                    step: step.to_string(),
                })?;
            let base = match base {
                "*" => None,
                other => Some(bounded(parse_number(other).ok_or_else(malformed)?)?),
            };
            return Ok(Field::Step { base, step });
        }

        if let Some((start, end)) = raw.split_once('-') {
            let start = bounded(parse_number(start).ok_or_else(malformed)?)?;
            let end = bounded(parse_number(end).ok_or_else(malformed)?)?;
            if start >= end {
                return Err(ExpressionError::InvalidRange {
                    field: kind,
                    start,
                    end,
                    min,
                    max,
                });
            }
            return Ok(Field::Range { start, end });
        }

        if raw.contains(',') {
            let values = raw
                .split(',')
                .map(|item| bounded(parse_number(item).ok_or_else(malformed)?))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Field::List(values));
        }

        Ok(Field::Value(bounded(
            parse_number(raw).ok_or_else(malformed)?,
        )?))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Field::Any)
    }

    /// The single value of a plain-integer field.
    pub fn as_value(&self) -> Option<u32> {
        match self {
            Field::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Every value the field selects, with day-of-week 7 folded onto 0.
    pub fn expand(&self, kind: FieldKind) -> BTreeSet<u32> {
        let (min, max) = kind.bounds();
        let values: BTreeSet<u32> = match self {
            Field::Any => (min..=max).collect(),
            Field::Value(v) => BTreeSet::from([*v]),
            Field::List(vs) => vs.iter().copied().collect(),
            Field::Range { start, end } => (*start..=*end).collect(),
            Field::Step { base, step } => (base.unwrap_or(min)..=max)
                .step_by((*step).max(1) as usize)
                .collect(),
        };
        match kind {
            FieldKind::DayOfWeek => values.into_iter().map(|d| d % 7).collect(),
            _ => values,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Any => f.write_str("*"),
            Field::Value(v) => write!(f, "{v}"),
            Field::List(vs) => {
                let joined = vs
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                f.write_str(&joined)
            }
            Field::Range { start, end } => write!(f, "{start}-{end}"),
            Field::Step { base: None, step } => write!(f, "*/{step}"),
            Field::Step {
                base: Some(base),
                step,
            } => write!(f, "{base}/{step}"),
        }
    }
}

/// Digits only: rejects signs, blanks and anything `u32::from_str` would
/// otherwise accept.
fn parse_number(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// A well-formed schedule expression. `Display` renders the canonical text:
/// the five fields separated by single spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub minute: Field,
    pub hour: Field,
    pub day_of_month: Field,
    pub month: Field,
    pub day_of_week: Field,
}

impl Expression {
    /// Parse and validate `raw`, stopping at the first invalid field.
    pub fn parse(raw: &str) -> Result<Self, ExpressionError> {
        let parts: Vec<&str> = raw.split_whitespace().collect();
        if parts.is_empty() {
            return Err(ExpressionError::Empty);
        }
        if parts.len() != FIELD_COUNT {
            return Err(ExpressionError::FieldCount { found: parts.len() });
        }

        Ok(Self {
            minute: Field::parse(FieldKind::Minute, parts[0])?,
            hour: Field::parse(FieldKind::Hour, parts[1])?,
            day_of_month: Field::parse(FieldKind::DayOfMonth, parts[2])?,
            month: Field::parse(FieldKind::Month, parts[3])?,
            day_of_week: Field::parse(FieldKind::DayOfWeek, parts[4])?,
        })
    }

    pub fn field(&self, kind: FieldKind) -> &Field {
        match kind {
            FieldKind::Minute => &self.minute,
            FieldKind::Hour => &self.hour,
            FieldKind::DayOfMonth => &self.day_of_month,
            FieldKind::Month => &self.month,
            FieldKind::DayOfWeek => &self.day_of_week,
        }
    }

    /// True when both expressions select the same values in every field,
    /// e.g. `0 13 * * 1-5` and `0 13 * * 1,2,3,4,5`.
    pub fn is_equivalent(&self, other: &Expression) -> bool {
        FieldKind::ALL.into_iter().all(|kind| {
            let (a, b) = (self.field(kind), other.field(kind));
            a == b || a.expand(kind) == b.expand(kind)
        })
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month, self.day_of_week
        )
    }
}

impl std::str::FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::parse(s)
    }
}
