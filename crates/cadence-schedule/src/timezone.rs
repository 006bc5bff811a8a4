//! Fixed-offset conversion of an hour of day between the handful of zones the
//! schedule editor offers and the reference zone (UTC).
//!
//! Offsets are standard-time approximations. There is no daylight-saving
//! handling: 8 AM EST is always 13:00 UTC.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Zone every stored expression is written in.
pub const REFERENCE_ZONE: Zone = Zone::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Zone {
    Est,
    Cst,
    Mst,
    Pst,
    Utc,
}

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::Est, Zone::Cst, Zone::Mst, Zone::Pst, Zone::Utc];

    /// Signed hour offset from UTC.
    pub fn offset_hours(self) -> i32 {
        match self {
            Zone::Est => -5,
            Zone::Cst => -6,
            Zone::Mst => -7,
            Zone::Pst => -8,
            Zone::Utc => 0,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Zone::Est => "EST",
            Zone::Cst => "CST",
            Zone::Mst => "MST",
            Zone::Pst => "PST",
            Zone::Utc => "UTC",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl std::str::FromStr for Zone {
    type Err = ScheduleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Zone::ALL
            .into_iter()
            .find(|zone| zone.abbreviation().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScheduleError::UnknownZone(s.to_string()))
    }
}

/// Convert `hour` (0-23) observed in `from` into the same instant's hour in
/// `to`, wrapping across midnight in either direction.
pub fn convert(hour: u8, from: Zone, to: Zone) -> u8 {
    let shifted = i32::from(hour) - from.offset_hours() + to.offset_hours();
    // rem_euclid keeps the result in 0..24 for negative values too.
    shifted.rem_euclid(24) as u8
}

/// Shorthand for `convert(hour, from, REFERENCE_ZONE)`.
pub fn to_reference(hour: u8, from: Zone) -> u8 {
    convert(hour, from, REFERENCE_ZONE)
}

/// Shorthand for `convert(hour, REFERENCE_ZONE, to)`.
pub fn from_reference(hour: u8, to: Zone) -> u8 {
    convert(hour, REFERENCE_ZONE, to)
}
