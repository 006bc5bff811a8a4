use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, ScheduleError},
    timezone::{self, Zone},
};

/// How often the publishing job repeats. Selects which of the
/// frequency-specific fields of [`ScheduleModel`] is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Custom => "custom",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Frequency {
    type Err = ScheduleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "custom" => Ok(Frequency::Custom),
            other => Err(ScheduleError::UnknownFrequency(other.to_string())),
        }
    }
}

/// Unit of a `custom` frequency's interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl IntervalUnit {
    /// Singular noun, e.g. "hour".
    pub fn singular(self) -> &'static str {
        match self {
            IntervalUnit::Minutes => "minute",
            IntervalUnit::Hours => "hour",
            IntervalUnit::Days => "day",
            IntervalUnit::Weeks => "week",
        }
    }
}

impl std::fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.singular())
    }
}

impl std::str::FromStr for IntervalUnit {
    type Err = ScheduleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "minutes" => Ok(IntervalUnit::Minutes),
            "hours" => Ok(IntervalUnit::Hours),
            "days" => Ok(IntervalUnit::Days),
            "weeks" => Ok(IntervalUnit::Weeks),
            other => Err(ScheduleError::UnknownIntervalUnit(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Am => f.write_str("AM"),
            Period::Pm => f.write_str("PM"),
        }
    }
}

/// Twelve-hour clock time as picked in the editor. Minutes come in
/// quarter-hour steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOfDay {
    pub hour12: u8,
    pub minute: u8,
    pub period: Period,
}

impl TimeOfDay {
    pub const MINUTES: [u8; 4] = [0, 15, 30, 45];

    pub fn new(hour12: u8, minute: u8, period: Period) -> Result<Self> {
        let time = Self {
            hour12,
            minute,
            period,
        };
        time.validate()?;
        Ok(time)
    }

    /// Build from a 24-hour clock value. The minute is snapped down to the
    /// nearest quarter hour.
    pub fn from_24h(hour: u8, minute: u8) -> Self {
        let hour = hour % 24;
        let period = if hour >= 12 { Period::Pm } else { Period::Am };
        let hour12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        Self {
            hour12,
            minute: (minute % 60) / 15 * 15,
            period,
        }
    }

    /// Hour on the 24-hour clock (0-23).
    pub fn hour24(&self) -> u8 {
        match (self.period, self.hour12) {
            (Period::Am, 12) => 0,
            (Period::Am, h) => h,
            (Period::Pm, 12) => 12,
            (Period::Pm, h) => h + 12,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.hour12) {
            return Err(ScheduleError::InvalidTime(format!(
                "hour {} is outside 1-12",
                self.hour12
            )));
        }
        if !Self::MINUTES.contains(&self.minute) {
            return Err(ScheduleError::InvalidTime(format!(
                "minute {} must be one of 0, 15, 30, 45",
                self.minute
            )));
        }
        Ok(())
    }
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self {
            hour12: 9,
            minute: 0,
            period: Period::Am,
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02} {}", self.hour12, self.minute, self.period)
    }
}

/// The "visual schedule" edited in the content-admin panel.
///
/// Only the fields belonging to the current `frequency` are read by the
/// codec; the rest are kept so that switching frequency back and forth does
/// not lose what was entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleModel {
    pub frequency: Frequency,
    pub time_of_day: TimeOfDay,
    pub timezone: Zone,
    /// 0 = Sunday … 6 = Saturday. Authoritative for `weekly`; its first day
    /// anchors `custom` week intervals.
    pub days_of_week: BTreeSet<u8>,
    /// 1-31, authoritative for `monthly`.
    pub day_of_month: u8,
    /// Positive, authoritative for `custom`.
    pub interval: u32,
    pub interval_unit: IntervalUnit,
}

impl Default for ScheduleModel {
    fn default() -> Self {
        Self {
            frequency: Frequency::Weekly,
            time_of_day: TimeOfDay::default(),
            timezone: Zone::Est,
            days_of_week: BTreeSet::from([1]),
            day_of_month: 1,
            interval: 1,
            interval_unit: IntervalUnit::Days,
        }
    }
}

impl ScheduleModel {
    pub fn daily(time_of_day: TimeOfDay, timezone: Zone) -> Self {
        Self {
            frequency: Frequency::Daily,
            time_of_day,
            timezone,
            ..Self::default()
        }
    }

    pub fn weekly(
        time_of_day: TimeOfDay,
        timezone: Zone,
        days: impl IntoIterator<Item = u8>,
    ) -> Self {
        Self {
            frequency: Frequency::Weekly,
            time_of_day,
            timezone,
            days_of_week: days.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn monthly(time_of_day: TimeOfDay, timezone: Zone, day_of_month: u8) -> Self {
        Self {
            frequency: Frequency::Monthly,
            time_of_day,
            timezone,
            day_of_month,
            ..Self::default()
        }
    }

    pub fn custom(
        time_of_day: TimeOfDay,
        timezone: Zone,
        interval: u32,
        interval_unit: IntervalUnit,
    ) -> Self {
        Self {
            frequency: Frequency::Custom,
            time_of_day,
            timezone,
            interval,
            interval_unit,
            ..Self::default()
        }
    }

    /// Hour of day in the reference zone (UTC).
    pub fn reference_hour(&self) -> u8 {
        timezone::to_reference(self.time_of_day.hour24(), self.timezone)
    }

    /// Check the time of day and the fields authoritative for the current
    /// frequency. Fields belonging to other frequencies are not inspected.
    pub fn validate(&self) -> Result<()> {
        self.time_of_day.validate()?;
        match self.frequency {
            Frequency::Daily => {}
            Frequency::Weekly => {
                if self.days_of_week.is_empty() {
                    return Err(ScheduleError::InvalidSchedule(
                        "a weekly schedule needs at least one day".to_string(),
                    ));
                }
                self.check_days_of_week()?;
            }
            Frequency::Monthly => {
                if !(1..=31).contains(&self.day_of_month) {
                    return Err(ScheduleError::InvalidSchedule(format!(
                        "day of month {} is outside 1-31",
                        self.day_of_month
                    )));
                }
            }
            Frequency::Custom => {
                if self.interval == 0 {
                    return Err(ScheduleError::InvalidSchedule(
                        "interval must be a positive number".to_string(),
                    ));
                }
                if self.interval_unit == IntervalUnit::Weeks {
                    self.check_days_of_week()?;
                }
            }
        }
        Ok(())
    }

    fn check_days_of_week(&self) -> Result<()> {
        match self.days_of_week.iter().find(|d| **d > 6) {
            Some(day) => Err(ScheduleError::InvalidSchedule(format!(
                "day of week {day} is outside 0-6"
            ))),
            None => Ok(()),
        }
    }
}
