//! Calendar arithmetic on date, time and duration values

use crate::semantic::{DateValue, DurationUnit, DurationValue, ErrorValue, TimeValue};
use crate::units::{DimensionVector, Quantity};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use rust_decimal::prelude::*;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Add every part of `duration` to `date`, largest unit first.
///
/// Months, quarters and years move along the calendar (Jan 31 + 1 month is
/// the last day of February). Business days skip Saturdays and Sundays. Units
/// shorter than a day need a date that carries a time.
pub fn add_duration(date: &DateValue, duration: &DurationValue) -> Result<DateValue, ErrorValue> {
    let mut datetime = date.datetime;
    let mut has_time = date.has_time;

    for part in duration.parts() {
        let amount = part.amount;
        match part.unit {
            DurationUnit::Year | DurationUnit::Quarter | DurationUnit::Month => {
                let per_unit = match part.unit {
                    DurationUnit::Year => 12,
                    DurationUnit::Quarter => 3,
                    _ => 1,
                };
                let months = whole(amount * Decimal::from(per_unit), part.unit)?;
                datetime = shift_months(datetime, months)?;
            }
            DurationUnit::BusinessDay => {
                let days = whole(amount, part.unit)?;
                let date = add_business_days(datetime.date(), days)
                    .ok_or_else(|| ErrorValue::runtime("Date out of range"))?;
                datetime = date.and_time(datetime.time());
            }
            DurationUnit::Week | DurationUnit::Day => {
                let days = amount * if part.unit == DurationUnit::Week { Decimal::from(7) } else { Decimal::ONE };
                if days.fract().is_zero() {
                    let days = whole(days, part.unit)?;
                    datetime = datetime
                        .checked_add_signed(Duration::days(days))
                        .ok_or_else(|| ErrorValue::runtime("Date out of range"))?;
                } else if has_time {
                    datetime = add_millis(datetime, days * Decimal::from(MILLIS_PER_DAY))?;
                } else {
                    return Err(sub_day_error(part.unit));
                }
            }
            unit => {
                if !has_time {
                    // Whole days expressed in hours still land on midnight
                    let millis = amount * unit.seconds() * Decimal::from(1000);
                    if (millis % Decimal::from(MILLIS_PER_DAY)).is_zero() {
                        datetime = add_millis(datetime, millis)?;
                        continue;
                    }
                    return Err(sub_day_error(unit));
                }
                datetime = add_millis(datetime, amount * unit.seconds() * Decimal::from(1000))?;
                has_time = true;
            }
        }
    }

    Ok(DateValue {
        datetime,
        has_time,
        zone: date.zone,
    })
}

fn sub_day_error(unit: DurationUnit) -> ErrorValue {
    ErrorValue::semantic(format!("Cannot add {} to a date without a time", unit.plural()))
        .with_suggestion("Use a date with a time, e.g. now + 3 hours")
}

fn whole(amount: Decimal, unit: DurationUnit) -> Result<i64, ErrorValue> {
    if !amount.fract().is_zero() {
        return Err(ErrorValue::semantic(format!(
            "Cannot add a fractional number of {}",
            unit.plural()
        )));
    }
    amount
        .to_i64()
        .ok_or_else(|| ErrorValue::runtime("Duration out of range"))
}

fn shift_months(datetime: NaiveDateTime, months: i64) -> Result<NaiveDateTime, ErrorValue> {
    let magnitude = u32::try_from(months.unsigned_abs())
        .map_err(|_| ErrorValue::runtime("Date out of range"))?;
    let shifted = if months >= 0 {
        datetime.checked_add_months(Months::new(magnitude))
    } else {
        datetime.checked_sub_months(Months::new(magnitude))
    };
    shifted.ok_or_else(|| ErrorValue::runtime("Date out of range"))
}

fn add_millis(datetime: NaiveDateTime, millis: Decimal) -> Result<NaiveDateTime, ErrorValue> {
    let millis = millis
        .round()
        .to_i64()
        .ok_or_else(|| ErrorValue::runtime("Duration out of range"))?;
    datetime
        .checked_add_signed(Duration::milliseconds(millis))
        .ok_or_else(|| ErrorValue::runtime("Date out of range"))
}

/// Step `days` working days from `date`, skipping weekends
pub fn add_business_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let step = if days >= 0 { 1 } else { -1 };
    let mut current = date;
    let mut remaining = days.abs();
    while remaining > 0 {
        current = current.checked_add_signed(Duration::days(step))?;
        if !is_weekend(current) {
            remaining -= 1;
        }
    }
    Some(current)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// `left - right`. Two plain dates differ by whole days; anything with a
/// time differs by days, hours, minutes and seconds.
pub fn date_difference(left: &DateValue, right: &DateValue) -> Result<DurationValue, ErrorValue> {
    let (a, b) = match (left.zone, right.zone) {
        (Some(_), Some(_)) => {
            let utc = chrono::FixedOffset::east_opt(0)
                .ok_or_else(|| ErrorValue::runtime("Invalid offset"))?;
            (left.to_utc(utc), right.to_utc(utc))
        }
        _ => (left.datetime, right.datetime),
    };
    let delta = a - b;
    if !left.has_time && !right.has_time {
        return Ok(DurationValue::single(Decimal::from(delta.num_days()), DurationUnit::Day));
    }
    Ok(DurationValue::from_seconds(
        Decimal::new(delta.num_milliseconds(), 3),
    ))
}

/// Time of day plus a duration, counting crossed midnights
pub fn time_add(time: &TimeValue, duration: &DurationValue) -> Result<TimeValue, ErrorValue> {
    if duration.parts().iter().any(|p| p.unit.is_calendar() || p.unit == DurationUnit::BusinessDay) {
        return Err(ErrorValue::semantic(
            "Cannot add months, years or business days to a time of day",
        ));
    }
    let offset = duration.total_seconds()? * Decimal::from(1000);
    let offset = offset
        .round()
        .to_i64()
        .ok_or_else(|| ErrorValue::runtime("Duration out of range"))?;
    let start = time.total_seconds() * 1000 + i64::from(time.time.nanosecond() / 1_000_000);
    let total = start
        .checked_add(offset)
        .ok_or_else(|| ErrorValue::runtime("Duration out of range"))?;

    let day_offset = total.div_euclid(MILLIS_PER_DAY);
    let millis = total.rem_euclid(MILLIS_PER_DAY);
    let clock = NaiveTime::from_num_seconds_from_midnight_opt(
        (millis / 1000) as u32,
        ((millis % 1000) * 1_000_000) as u32,
    )
    .ok_or_else(|| ErrorValue::runtime("Invalid time of day"))?;

    Ok(TimeValue {
        time: clock,
        day_offset,
        zone: time.zone,
    })
}

/// `left - right` between two times of day
pub fn time_difference(left: &TimeValue, right: &TimeValue) -> DurationValue {
    let zone_seconds = |t: &TimeValue| t.zone.map_or(0, |z| i64::from(z.local_minus_utc()));
    let shift = match (left.zone, right.zone) {
        (Some(_), Some(_)) => zone_seconds(right) - zone_seconds(left),
        _ => 0,
    };
    let seconds = left.total_seconds() - right.total_seconds() + shift;
    DurationValue::from_seconds(Decimal::from(seconds))
}

/// Put a time of day on a date
pub fn combine_date_time(date: &DateValue, time: &TimeValue) -> DateValue {
    let day = date
        .date()
        .checked_add_signed(Duration::days(time.day_offset))
        .unwrap_or_else(|| date.date());
    DateValue::with_time(day.and_time(time.time), time.zone.or(date.zone))
}

/// A time-dimension quantity as a duration (`3 h` → 3 hours)
pub fn duration_from_quantity(quantity: &Quantity) -> Result<DurationValue, ErrorValue> {
    if quantity.dimension() != DimensionVector::TIME {
        return Err(ErrorValue::type_mismatch(
            format!("'{}' is not a duration", quantity.unit.label()),
            "duration",
            "unit",
        ));
    }
    if let [factor] = quantity.unit.factors() {
        if factor.exponent == 1 {
            if let Some(unit) = DurationUnit::from_unit_symbol(&factor.unit.symbol()) {
                return Ok(DurationValue::single(quantity.value, unit));
            }
        }
    }
    let seconds = quantity
        .base_value()
        .map_err(super::operations::unit_error)?;
    Ok(DurationValue::from_seconds(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn business_days_skip_weekends() {
        // 2024-03-15 is a Friday
        assert_eq!(add_business_days(date(2024, 3, 15), 3), Some(date(2024, 3, 20)));
        assert_eq!(add_business_days(date(2024, 3, 18), -1), Some(date(2024, 3, 15)));
        assert_eq!(add_business_days(date(2024, 3, 16), 1), Some(date(2024, 3, 18)));
    }

    #[test]
    fn month_addition_clamps_to_month_end() {
        let start = DateValue::date_only(date(2024, 1, 31));
        let result = add_duration(&start, &DurationValue::single(Decimal::ONE, DurationUnit::Month)).unwrap();
        assert_eq!(result.date(), date(2024, 2, 29));
    }

    #[test]
    fn hours_on_plain_date_are_rejected() {
        let start = DateValue::date_only(date(2024, 1, 1));
        let result = add_duration(&start, &DurationValue::single(Decimal::from(3), DurationUnit::Hour));
        assert!(result.is_err());
        let whole_day = add_duration(&start, &DurationValue::single(Decimal::from(48), DurationUnit::Hour)).unwrap();
        assert_eq!(whole_day.date(), date(2024, 1, 3));
    }

    #[test]
    fn time_wraps_past_midnight() {
        let start = TimeValue::new(NaiveTime::from_hms_opt(23, 0, 0).unwrap());
        let result = time_add(&start, &DurationValue::single(Decimal::from(2), DurationUnit::Hour)).unwrap();
        assert_eq!(result.time, NaiveTime::from_hms_opt(1, 0, 0).unwrap());
        assert_eq!(result.day_offset, 1);
    }

    #[test]
    fn plain_date_difference_in_days() {
        let a = DateValue::date_only(date(2024, 3, 1));
        let b = DateValue::date_only(date(2024, 2, 1));
        let diff = date_difference(&a, &b).unwrap();
        assert_eq!(diff, DurationValue::single(Decimal::from(29), DurationUnit::Day));
    }
}
