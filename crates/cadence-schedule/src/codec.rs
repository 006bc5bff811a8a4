//! Translation between [`ScheduleModel`] and schedule expressions.
//!
//! Encoding is exact for every frequency except `custom` weeks (see
//! [`encode`]). Decoding is best effort: any well-formed expression decodes
//! to the nearest daily / weekly / monthly / custom model, so callers that
//! need the exact schedule must keep the expression string.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    error::Result,
    expression::{Expression, ExpressionError, Field, FieldKind},
    model::{Frequency, IntervalUnit, ScheduleModel, TimeOfDay},
    timezone::{self, Zone},
};

/// Zone decoded models are expressed in unless the caller picks another.
pub const DISPLAY_ZONE: Zone = Zone::Est;

/// Encode a visual schedule as an expression in the reference zone.
///
/// | Frequency       | Expression                           |
/// |-----------------|--------------------------------------|
/// | daily           | `m h * * *`                          |
/// | weekly          | `m h * * d0,d1,…`                    |
/// | monthly         | `m h dom * *`                        |
/// | custom minutes  | `*/n * * * *`                        |
/// | custom hours    | `m */n * * *`                        |
/// | custom days     | `m h */n * *`                        |
/// | custom weeks    | `m h * * d/(n*7)`                    |
///
/// The custom-weeks form is an approximation: a step on the day-of-week
/// field is valid syntax but an evaluator will not read it as "every n
/// weeks". It exists so the editor can round-trip its own value.
///
/// Fails when the fields authoritative for the frequency are invalid.
pub fn encode(schedule: &ScheduleModel) -> Result<Expression> {
    schedule.validate()?;

    let minute = u32::from(schedule.time_of_day.minute);
    let hour = u32::from(schedule.reference_hour());

    let expr = match schedule.frequency {
        Frequency::Daily => at(minute, hour, Field::Any, Field::Any),
        Frequency::Weekly => at(
            minute,
            hour,
            Field::Any,
            days_field(&schedule.days_of_week),
        ),
        Frequency::Monthly => at(
            minute,
            hour,
            Field::Value(u32::from(schedule.day_of_month)),
            Field::Any,
        ),
        Frequency::Custom => encode_custom(schedule, minute, hour),
    };
    Ok(expr)
}

fn encode_custom(schedule: &ScheduleModel, minute: u32, hour: u32) -> Expression {
    let every = |step: u32| Field::Step { base: None, step };
    let interval = schedule.interval;

    match schedule.interval_unit {
        IntervalUnit::Minutes => Expression {
            minute: every(interval),
            hour: Field::Any,
            day_of_month: Field::Any,
            month: Field::Any,
            day_of_week: Field::Any,
        },
        IntervalUnit::Hours => Expression {
            minute: Field::Value(minute),
            hour: every(interval),
            day_of_month: Field::Any,
            month: Field::Any,
            day_of_week: Field::Any,
        },
        IntervalUnit::Days => at(minute, hour, every(interval), Field::Any),
        IntervalUnit::Weeks => {
            let first_day = schedule.days_of_week.first().copied().unwrap_or(0);
            at(
                minute,
                hour,
                Field::Any,
                Field::Step {
                    base: Some(u32::from(first_day)),
                    step: interval.saturating_mul(7),
                },
            )
        }
    }
}

fn at(minute: u32, hour: u32, day_of_month: Field, day_of_week: Field) -> Expression {
    Expression {
        minute: Field::Value(minute),
        hour: Field::Value(hour),
        day_of_month,
        month: Field::Any,
        day_of_week,
    }
}

fn days_field(days: &BTreeSet<u8>) -> Field {
    let mut values: Vec<u32> = days.iter().map(|d| u32::from(*d)).collect();
    if values.len() == 1 {
        Field::Value(values.remove(0))
    } else {
        Field::List(values)
    }
}

/// Parse `raw` and decode it into [`DISPLAY_ZONE`].
pub fn decode_str(raw: &str) -> std::result::Result<ScheduleModel, ExpressionError> {
    Ok(decode(&Expression::parse(raw)?))
}

/// Decode into [`DISPLAY_ZONE`].
pub fn decode(expr: &Expression) -> ScheduleModel {
    decode_in(expr, DISPLAY_ZONE)
}

/// Decode `expr` into a visual schedule shown in `zone`.
///
/// The codec's own custom encodings are recognised first. After that the
/// frequency is inferred in this order:
///
/// 1. day of week is a list or range → weekly with those days
/// 2. day of month is set → monthly
/// 3. day of week is `*` → daily
/// 4. otherwise → weekly on the single day given
///
/// Minutes are snapped down to the nearest quarter hour.
pub fn decode_in(expr: &Expression, zone: Zone) -> ScheduleModel {
    let mut model = ScheduleModel {
        timezone: zone,
        ..ScheduleModel::default()
    };
    model.time_of_day = decode_time(expr, zone, model.time_of_day);

    if let Some((interval, unit, anchor)) = custom_interval(expr) {
        model.frequency = Frequency::Custom;
        model.interval = interval;
        model.interval_unit = unit;
        if let Some(day) = anchor {
            model.days_of_week = BTreeSet::from([day]);
        }
    } else {
        match &expr.day_of_week {
            dow @ (Field::List(_) | Field::Range { .. }) => {
                model.frequency = Frequency::Weekly;
                model.days_of_week = dow
                    .expand(FieldKind::DayOfWeek)
                    .into_iter()
                    .map(|d| d as u8)
                    .collect();
            }
            _ if !expr.day_of_month.is_any() => {
                model.frequency = Frequency::Monthly;
                if let Some(day) = first_value(&expr.day_of_month) {
                    model.day_of_month = day as u8;
                }
            }
            Field::Any => model.frequency = Frequency::Daily,
            single => {
                model.frequency = Frequency::Weekly;
                if let Some(day) = first_value(single) {
                    model.days_of_week = BTreeSet::from([(day % 7) as u8]);
                }
            }
        }
    }

    if !round_trips(expr, &model) {
        debug!(expression = %expr, frequency = %model.frequency, "expression decoded approximately");
    }
    model
}

/// Decode only when the resulting model encodes back to an equivalent
/// expression; `None` means the visual schedule would not reproduce `expr`.
pub fn decode_exact(expr: &Expression) -> Option<ScheduleModel> {
    let model = decode(expr);
    round_trips(expr, &model).then_some(model)
}

fn round_trips(expr: &Expression, model: &ScheduleModel) -> bool {
    encode(model).is_ok_and(|encoded| encoded.is_equivalent(expr))
}

fn decode_time(expr: &Expression, zone: Zone, fallback: TimeOfDay) -> TimeOfDay {
    match (expr.minute.as_value(), expr.hour.as_value()) {
        (Some(minute), Some(hour)) => TimeOfDay::from_24h(
            timezone::from_reference(hour as u8, zone),
            minute as u8,
        ),
        (Some(minute), None) => TimeOfDay::from_24h(fallback.hour24(), minute as u8),
        _ => fallback,
    }
}

/// Recognise the step patterns [`encode`] emits for `custom` schedules.
/// Returns the interval, its unit and, for weeks, the anchor weekday.
fn custom_interval(expr: &Expression) -> Option<(u32, IntervalUnit, Option<u8>)> {
    match (
        &expr.minute,
        &expr.hour,
        &expr.day_of_month,
        &expr.day_of_week,
    ) {
        (Field::Step { base: None, step }, Field::Any, Field::Any, Field::Any) => {
            Some((*step, IntervalUnit::Minutes, None))
        }
        (_, Field::Step { base: None, step }, Field::Any, Field::Any) => {
            Some((*step, IntervalUnit::Hours, None))
        }
        (_, _, Field::Step { base: None, step }, Field::Any) => {
            Some((*step, IntervalUnit::Days, None))
        }
        (
            _,
            _,
            Field::Any,
            Field::Step {
                base: Some(day),
                step,
            },
        ) if step % 7 == 0 => Some((step / 7, IntervalUnit::Weeks, Some((day % 7) as u8))),
        _ => None,
    }
}

fn first_value(field: &Field) -> Option<u32> {
    match field {
        Field::Value(v) => Some(*v),
        Field::List(vs) => vs.first().copied(),
        Field::Range { start, .. } => Some(*start),
        Field::Step { base, .. } => *base,
        Field::Any => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Period;

    fn time(hour12: u8, minute: u8, period: Period) -> TimeOfDay {
        TimeOfDay::new(hour12, minute, period).unwrap()
    }

    fn encoded(model: &ScheduleModel) -> String {
        encode(model).unwrap().to_string()
    }

    #[test]
    fn weekly_monday_eight_am_eastern() {
        let model = ScheduleModel::weekly(time(8, 0, Period::Am), Zone::Est, [1]);
        assert_eq!(encoded(&model), "0 13 * * 1");
    }

    #[test]
    fn weekly_days_are_sorted_and_joined() {
        let model = ScheduleModel::weekly(time(6, 30, Period::Pm), Zone::Pst, [5, 1, 3]);
        // 18:30 PST = 02:30 UTC
        assert_eq!(encoded(&model), "30 2 * * 1,3,5");
    }

    #[test]
    fn daily_and_monthly_forms() {
        let t = time(12, 15, Period::Am);
        assert_eq!(encoded(&ScheduleModel::daily(t, Zone::Utc)), "15 0 * * *");
        assert_eq!(
            encoded(&ScheduleModel::monthly(t, Zone::Cst, 28)),
            "15 6 28 * *"
        );
    }

    #[test]
    fn custom_forms() {
        let t = time(9, 45, Period::Am);
        let custom = |n, unit| encoded(&ScheduleModel::custom(t, Zone::Est, n, unit));
        assert_eq!(custom(30, IntervalUnit::Minutes), "*/30 * * * *");
        assert_eq!(custom(6, IntervalUnit::Hours), "45 */6 * * *");
        assert_eq!(custom(3, IntervalUnit::Days), "45 14 */3 * *");
    }

    #[test]
    fn custom_weeks_anchor_on_first_selected_day() {
        let mut model = ScheduleModel::custom(time(8, 0, Period::Am), Zone::Est, 2, IntervalUnit::Weeks);
        model.days_of_week = BTreeSet::from([4, 2]);
        assert_eq!(encoded(&model), "0 13 * * 2/14");

        model.days_of_week.clear();
        assert_eq!(encoded(&model), "0 13 * * 0/14");
    }

    #[test]
    fn frequency_switch_keeps_other_fields() {
        let mut model = ScheduleModel::weekly(time(8, 0, Period::Am), Zone::Est, [2, 4]);
        model.day_of_month = 20;
        model.frequency = Frequency::Monthly;
        assert_eq!(encoded(&model), "0 13 20 * *");
        model.frequency = Frequency::Weekly;
        assert_eq!(encoded(&model), "0 13 * * 2,4");
    }

    #[test]
    fn encode_rejects_broken_models() {
        let model = ScheduleModel::weekly(time(8, 0, Period::Am), Zone::Est, []);
        assert!(encode(&model).is_err());
    }

    #[test]
    fn decode_weekly_single_day_into_eastern() {
        let model = decode_str("0 13 * * 1").unwrap();
        assert_eq!(model.frequency, Frequency::Weekly);
        assert_eq!(model.days_of_week, BTreeSet::from([1]));
        assert_eq!(model.time_of_day, time(8, 0, Period::Am));
        assert_eq!(model.timezone, Zone::Est);
    }

    #[test]
    fn decode_daily_wraps_into_previous_evening() {
        let model = decode_str("30 2 * * *").unwrap();
        assert_eq!(model.frequency, Frequency::Daily);
        assert_eq!(model.time_of_day, time(9, 30, Period::Pm));
    }

    #[test]
    fn decode_range_and_list_to_weekly_sets() {
        let model = decode_str("0 13 * * 1-5").unwrap();
        assert_eq!(model.days_of_week, BTreeSet::from([1, 2, 3, 4, 5]));
        let model = decode_str("0 13 * * 0,6,7").unwrap();
        assert_eq!(model.frequency, Frequency::Weekly);
        assert_eq!(model.days_of_week, BTreeSet::from([0, 6]));
    }

    #[test]
    fn decode_monthly_even_with_weekday_present() {
        let model = decode_str("0 13 15 * *").unwrap();
        assert_eq!(model.frequency, Frequency::Monthly);
        assert_eq!(model.day_of_month, 15);

        let model = decode_str("0 13 1 * 1").unwrap();
        assert_eq!(model.frequency, Frequency::Monthly);
        assert_eq!(model.day_of_month, 1);
    }

    #[test]
    fn decode_sunday_as_seven() {
        let model = decode_str("0 13 * * 7").unwrap();
        assert_eq!(model.days_of_week, BTreeSet::from([0]));
    }

    #[test]
    fn decode_recognises_custom_encodings() {
        let model = decode_str("*/30 * * * *").unwrap();
        assert_eq!(model.frequency, Frequency::Custom);
        assert_eq!((model.interval, model.interval_unit), (30, IntervalUnit::Minutes));

        let model = decode_str("45 */6 * * *").unwrap();
        assert_eq!((model.interval, model.interval_unit), (6, IntervalUnit::Hours));
        assert_eq!(model.time_of_day.minute, 45);

        let model = decode_str("0 13 */3 * *").unwrap();
        assert_eq!((model.interval, model.interval_unit), (3, IntervalUnit::Days));

        let model = decode_str("0 13 * * 2/14").unwrap();
        assert_eq!((model.interval, model.interval_unit), (2, IntervalUnit::Weeks));
        assert_eq!(model.days_of_week, BTreeSet::from([2]));
    }

    #[test]
    fn decode_into_another_zone() {
        let expr = Expression::parse("0 13 * * *").unwrap();
        let model = decode_in(&expr, Zone::Pst);
        assert_eq!(model.timezone, Zone::Pst);
        assert_eq!(model.time_of_day, time(5, 0, Period::Am));
    }

    #[test]
    fn decode_exact_refuses_lossy_results() {
        let exact = Expression::parse("0 13 * * 1-5").unwrap();
        assert!(decode_exact(&exact).is_some());

        // 13:07 snaps to 13:00
        let lossy = Expression::parse("7 13 * * *").unwrap();
        assert!(decode_exact(&lossy).is_none());
        assert_eq!(decode(&lossy).frequency, Frequency::Daily);

        // both day fields restricted: one is dropped
        let lossy = Expression::parse("0 13 1 * 1").unwrap();
        assert!(decode_exact(&lossy).is_none());
    }

    #[test]
    fn decode_str_propagates_parse_errors() {
        assert_eq!(
            decode_str("0 0 * *").unwrap_err(),
            ExpressionError::FieldCount { found: 4 }
        );
    }
}
