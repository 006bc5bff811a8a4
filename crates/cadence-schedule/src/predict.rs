use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use tracing::debug;

use crate::{
    codec,
    expression::Expression,
    model::{Frequency, ScheduleModel},
};

/// Shortest weekly scan window, in days.
const MIN_WEEKLY_WINDOW_DAYS: i64 = 14;

/// Upper bound on the number of occurrences returned by one call.
pub const MAX_OCCURRENCES: usize = 366;

/// Upcoming run times for `schedule` strictly after `now`, in ascending
/// order, at most `count` of them.
///
/// Times are computed in UTC, the zone expressions are stored in, so weekly
/// days are matched against the UTC calendar exactly as an evaluator of the
/// encoded expression would.
///
/// Custom frequencies are not predicted and yield an empty list. Monthly
/// schedules skip months that lack the chosen day. A short or empty result
/// is an expected outcome, not an error. `count` is capped at
/// [`MAX_OCCURRENCES`].
pub fn next_occurrences(
    schedule: &ScheduleModel,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    if count == 0 || schedule.validate().is_err() {
        return Vec::new();
    }

    let count = count.min(MAX_OCCURRENCES);
    let hour = u32::from(schedule.reference_hour());
    let minute = u32::from(schedule.time_of_day.minute);
    let today = now.date_naive();
    let at = |date: NaiveDate| {
        Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), hour, minute, 0)
            .single()
    };
    let horizon = count as i64;

    match schedule.frequency {
        Frequency::Daily => (0..=horizon)
            .filter_map(|i| today.checked_add_signed(Duration::days(i)))
            .filter_map(at)
            .filter(|candidate| *candidate > now)
            .take(count)
            .collect(),

        Frequency::Weekly => {
            let window = MIN_WEEKLY_WINDOW_DAYS.max((horizon + 1) * 7);
            (0..window)
                .filter_map(|i| today.checked_add_signed(Duration::days(i)))
                .filter(|date| {
                    let weekday = date.weekday().num_days_from_sunday() as u8;
                    schedule.days_of_week.contains(&weekday)
                })
                .filter_map(at)
                .filter(|candidate| *candidate > now)
                .take(count)
                .collect()
        }

        Frequency::Monthly => {
            let day = u32::from(schedule.day_of_month);
            let first_of_month = today.with_day(1).unwrap_or(today);
            // Any two consecutive months hold at least one 31st.
            let window = (count as u32) * 2 + 2;
            (0..window)
                .filter_map(|i| first_of_month.checked_add_months(Months::new(i)))
                .filter_map(|month| month.with_day(day))
                .filter_map(at)
                .filter(|candidate| *candidate > now)
                .take(count)
                .collect()
        }

        Frequency::Custom => {
            debug!(unit = %schedule.interval_unit, "no occurrence preview for custom schedules");
            Vec::new()
        }
    }
}

/// Upcoming run times for a raw expression.
///
/// Only expressions the visual schedule reproduces exactly are predicted;
/// anything else yields an empty list rather than approximate times.
pub fn next_occurrences_for_expression(
    expr: &Expression,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    match codec::decode_exact(expr) {
        Some(model) => next_occurrences(&model, count, now),
        None => {
            debug!(expression = %expr, "expression has no exact visual schedule; skipping preview");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{IntervalUnit, Period, TimeOfDay},
        timezone::Zone,
    };

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn eight_am_utc() -> TimeOfDay {
        TimeOfDay::new(8, 0, Period::Am).unwrap()
    }

    fn assert_well_formed(times: &[DateTime<Utc>], count: usize, now: DateTime<Utc>) {
        assert!(times.len() <= count);
        assert!(times.iter().all(|t| *t > now));
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn daily_after_todays_slot_starts_tomorrow() {
        let model = ScheduleModel::daily(eight_am_utc(), Zone::Utc);
        let now = utc(2026, 10, 19, 9, 0);
        let times = next_occurrences(&model, 3, now);
        assert_eq!(
            times,
            vec![
                utc(2026, 10, 20, 8, 0),
                utc(2026, 10, 21, 8, 0),
                utc(2026, 10, 22, 8, 0)
            ]
        );
    }

    #[test]
    fn daily_before_todays_slot_includes_today() {
        let model = ScheduleModel::daily(eight_am_utc(), Zone::Utc);
        let now = utc(2026, 10, 19, 7, 59);
        let times = next_occurrences(&model, 2, now);
        assert_eq!(times, vec![utc(2026, 10, 19, 8, 0), utc(2026, 10, 20, 8, 0)]);
    }

    #[test]
    fn daily_slot_equal_to_now_is_excluded() {
        let model = ScheduleModel::daily(eight_am_utc(), Zone::Utc);
        let now = utc(2026, 10, 19, 8, 0);
        assert_eq!(next_occurrences(&model, 1, now), vec![utc(2026, 10, 20, 8, 0)]);
    }

    #[test]
    fn daily_in_eastern_lands_on_utc_hour() {
        let model = ScheduleModel::daily(eight_am_utc(), Zone::Est);
        let now = utc(2026, 10, 19, 0, 0);
        assert_eq!(next_occurrences(&model, 1, now), vec![utc(2026, 10, 19, 13, 0)]);
    }

    #[test]
    fn weekly_collects_selected_days_in_order() {
        // 2026-10-19 is a Monday.
        let model = ScheduleModel::weekly(eight_am_utc(), Zone::Utc, [1, 3]);
        let now = utc(2026, 10, 19, 12, 0);
        let times = next_occurrences(&model, 4, now);
        assert_eq!(
            times,
            vec![
                utc(2026, 10, 21, 8, 0),
                utc(2026, 10, 26, 8, 0),
                utc(2026, 10, 28, 8, 0),
                utc(2026, 11, 2, 8, 0)
            ]
        );
    }

    #[test]
    fn weekly_evening_in_a_western_zone_fires_on_the_utc_weekday() {
        let evening = TimeOfDay::new(6, 30, Period::Pm).unwrap();
        let model = ScheduleModel::weekly(evening, Zone::Pst, [1]);
        let now = utc(2026, 10, 12, 12, 0);
        let times = next_occurrences(&model, 2, now);
        assert_eq!(
            times,
            vec![utc(2026, 10, 19, 2, 30), utc(2026, 10, 26, 2, 30)]
        );
        assert!(times.iter().all(|t| t.weekday() == chrono::Weekday::Mon));
        let local = times[0] - chrono::Duration::hours(8);
        assert_eq!(local.weekday(), chrono::Weekday::Sun);
    }

    #[test]
    fn weekly_single_day_fills_larger_counts() {
        let model = ScheduleModel::weekly(eight_am_utc(), Zone::Utc, [0]);
        let now = utc(2026, 10, 19, 12, 0);
        let times = next_occurrences(&model, 5, now);
        assert_eq!(times.len(), 5);
        assert_eq!(times[0], utc(2026, 10, 25, 8, 0));
        assert_eq!(times[4], utc(2026, 11, 22, 8, 0));
        assert_well_formed(&times, 5, now);
    }

    #[test]
    fn monthly_skips_short_months() {
        let model = ScheduleModel::monthly(eight_am_utc(), Zone::Utc, 31);
        let now = utc(2026, 10, 19, 12, 0);
        let times = next_occurrences(&model, 3, now);
        assert_eq!(
            times,
            vec![
                utc(2026, 10, 31, 8, 0),
                utc(2026, 12, 31, 8, 0),
                utc(2027, 1, 31, 8, 0)
            ]
        );
    }

    #[test]
    fn monthly_crosses_year_end() {
        let model = ScheduleModel::monthly(eight_am_utc(), Zone::Utc, 1);
        let now = utc(2026, 12, 1, 9, 0);
        assert_eq!(
            next_occurrences(&model, 2, now),
            vec![utc(2027, 1, 1, 8, 0), utc(2027, 2, 1, 8, 0)]
        );
    }

    #[test]
    fn custom_predicts_nothing() {
        let model = ScheduleModel::custom(eight_am_utc(), Zone::Utc, 30, IntervalUnit::Minutes);
        assert!(next_occurrences(&model, 5, utc(2026, 10, 19, 0, 0)).is_empty());
    }

    #[test]
    fn zero_count_or_broken_model_is_empty() {
        let model = ScheduleModel::daily(eight_am_utc(), Zone::Utc);
        assert!(next_occurrences(&model, 0, utc(2026, 10, 19, 0, 0)).is_empty());

        let broken = ScheduleModel::weekly(eight_am_utc(), Zone::Utc, []);
        assert!(next_occurrences(&broken, 3, utc(2026, 10, 19, 0, 0)).is_empty());
    }

    #[test]
    fn expression_preview_requires_exact_decode() {
        let now = utc(2026, 10, 19, 12, 0);
        let weekdays = Expression::parse("0 13 * * 1-5").unwrap();
        let times = next_occurrences_for_expression(&weekdays, 2, now);
        assert_eq!(times, vec![utc(2026, 10, 19, 13, 0), utc(2026, 10, 20, 13, 0)]);

        let odd_minute = Expression::parse("7 13 * * *").unwrap();
        assert!(next_occurrences_for_expression(&odd_minute, 2, now).is_empty());
    }

    #[test]
    fn many_shapes_stay_monotonic() {
        let now = utc(2026, 2, 28, 23, 30);
        for raw in ["0 0 * * *", "45 23 * * 0,6", "15 6 29 * *", "30 12 * * 1-5"] {
            let expr = Expression::parse(raw).unwrap();
            let times = next_occurrences_for_expression(&expr, 6, now);
            assert!(!times.is_empty(), "{raw}");
            assert_well_formed(&times, 6, now);
        }
    }
}
