//! Date, time-of-day and duration values

use super::error::ErrorValue;
use super::format::{format_decimal, DateFormat, FormatOptions};
use crate::units::{self, CompositeUnit, Quantity};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// A calendar date, optionally with a time of day and an explicit zone.
/// Without a zone the value is in the host's local time.
#[derive(Debug, Clone, PartialEq)]
pub struct DateValue {
    pub datetime: NaiveDateTime,
    pub has_time: bool,
    pub zone: Option<FixedOffset>,
}

impl DateValue {
    pub fn date_only(date: NaiveDate) -> Self {
        Self {
            datetime: date.and_time(NaiveTime::default()),
            has_time: false,
            zone: None,
        }
    }

    pub fn with_time(datetime: NaiveDateTime, zone: Option<FixedOffset>) -> Self {
        Self {
            datetime,
            has_time: true,
            zone,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.datetime.date()
    }

    /// The same instant expressed in UTC, treating a zone-less value as `local`
    pub fn to_utc(&self, local: FixedOffset) -> NaiveDateTime {
        let offset = self.zone.unwrap_or(local);
        self.datetime - chrono::Duration::seconds(i64::from(offset.local_minus_utc()))
    }

    pub fn format(&self, options: &FormatOptions) -> String {
        let date = self.datetime.date();
        let mut text = match options.date_format {
            DateFormat::Iso => date.format("%Y-%m-%d").to_string(),
            DateFormat::Us => date.format("%m/%d/%Y").to_string(),
            DateFormat::Eu => date.format("%d/%m/%Y").to_string(),
            DateFormat::Long => date.format("%-d %B %Y").to_string(),
        };
        if self.has_time {
            text.push(' ');
            text.push_str(&format_clock(self.datetime.time()));
        }
        if let Some(zone) = self.zone {
            text.push(' ');
            text.push_str(&format_zone(zone));
        }
        text
    }
}

/// A time of day. `day_offset` counts midnights crossed by arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeValue {
    pub time: NaiveTime,
    pub day_offset: i64,
    pub zone: Option<FixedOffset>,
}

impl TimeValue {
    pub fn new(time: NaiveTime) -> Self {
        Self {
            time,
            day_offset: 0,
            zone: None,
        }
    }

    /// Seconds since the midnight of day zero
    pub fn total_seconds(&self) -> i64 {
        self.day_offset * 86_400 + i64::from(self.time.num_seconds_from_midnight())
    }

    pub fn format(&self, _options: &FormatOptions) -> String {
        let mut text = format_clock(self.time);
        match self.day_offset {
            0 => {}
            1 => text.push_str(" (+1 day)"),
            -1 => text.push_str(" (-1 day)"),
            n if n > 0 => text.push_str(&format!(" (+{} days)", n)),
            n => text.push_str(&format!(" ({} days)", n)),
        }
        if let Some(zone) = self.zone {
            text.push(' ');
            text.push_str(&format_zone(zone));
        }
        text
    }
}

fn format_clock(time: NaiveTime) -> String {
    if time.second() == 0 && time.nanosecond() == 0 {
        time.format("%H:%M").to_string()
    } else if time.nanosecond() == 0 {
        time.format("%H:%M:%S").to_string()
    } else {
        time.format("%H:%M:%S%.3f").to_string()
    }
}

pub fn format_zone(zone: FixedOffset) -> String {
    let seconds = zone.local_minus_utc();
    if seconds == 0 {
        return "UTC".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DurationUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    BusinessDay,
    Week,
    Month,
    Quarter,
    Year,
}

impl DurationUnit {
    /// Length in seconds; calendar units use Gregorian averages
    pub fn seconds(&self) -> Decimal {
        match self {
            DurationUnit::Millisecond => dec!(0.001),
            DurationUnit::Second => dec!(1),
            DurationUnit::Minute => dec!(60),
            DurationUnit::Hour => dec!(3600),
            DurationUnit::Day | DurationUnit::BusinessDay => dec!(86400),
            DurationUnit::Week => dec!(604800),
            DurationUnit::Month => dec!(2629746),
            DurationUnit::Quarter => dec!(7889238),
            DurationUnit::Year => dec!(31556952),
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            DurationUnit::Millisecond => "millisecond",
            DurationUnit::Second => "second",
            DurationUnit::Minute => "minute",
            DurationUnit::Hour => "hour",
            DurationUnit::Day => "day",
            DurationUnit::BusinessDay => "business day",
            DurationUnit::Week => "week",
            DurationUnit::Month => "month",
            DurationUnit::Quarter => "quarter",
            DurationUnit::Year => "year",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            DurationUnit::Millisecond => "milliseconds",
            DurationUnit::Second => "seconds",
            DurationUnit::Minute => "minutes",
            DurationUnit::Hour => "hours",
            DurationUnit::Day => "days",
            DurationUnit::BusinessDay => "business days",
            DurationUnit::Week => "weeks",
            DurationUnit::Month => "months",
            DurationUnit::Quarter => "quarters",
            DurationUnit::Year => "years",
        }
    }

    pub fn parse(text: &str) -> Option<DurationUnit> {
        let lower = text.trim().to_lowercase();
        let collapsed = lower.split_whitespace().collect::<Vec<_>>().join(" ");
        let unit = match collapsed.as_str() {
            "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => DurationUnit::Millisecond,
            "s" | "sec" | "secs" | "second" | "seconds" => DurationUnit::Second,
            "min" | "mins" | "minute" | "minutes" => DurationUnit::Minute,
            "h" | "hr" | "hrs" | "hour" | "hours" => DurationUnit::Hour,
            "d" | "day" | "days" => DurationUnit::Day,
            "business day" | "business days" | "businessday" | "businessdays" | "workday"
            | "workdays" | "working day" | "working days" => DurationUnit::BusinessDay,
            "w" | "wk" | "wks" | "week" | "weeks" => DurationUnit::Week,
            "mo" | "mos" | "month" | "months" => DurationUnit::Month,
            "quarter" | "quarters" => DurationUnit::Quarter,
            "y" | "yr" | "yrs" | "year" | "years" => DurationUnit::Year,
            _ => return None,
        };
        Some(unit)
    }

    /// Calendar units cannot be added as a fixed number of days
    pub fn is_calendar(&self) -> bool {
        matches!(
            self,
            DurationUnit::Month | DurationUnit::Quarter | DurationUnit::Year
        )
    }

    pub fn is_sub_day(&self) -> bool {
        matches!(
            self,
            DurationUnit::Millisecond
                | DurationUnit::Second
                | DurationUnit::Minute
                | DurationUnit::Hour
        )
    }

    /// Symbol of the matching entry in the unit table
    fn unit_symbol(&self) -> Option<&'static str> {
        match self {
            DurationUnit::Millisecond => Some("ms"),
            DurationUnit::Second => Some("s"),
            DurationUnit::Minute => Some("min"),
            DurationUnit::Hour => Some("h"),
            DurationUnit::Day => Some("d"),
            DurationUnit::Week => Some("wk"),
            DurationUnit::Month => Some("mo"),
            DurationUnit::Year => Some("yr"),
            DurationUnit::BusinessDay | DurationUnit::Quarter => None,
        }
    }

    /// The duration unit matching a time-dimension table unit
    pub fn from_unit_symbol(symbol: &str) -> Option<DurationUnit> {
        [
            DurationUnit::Millisecond,
            DurationUnit::Second,
            DurationUnit::Minute,
            DurationUnit::Hour,
            DurationUnit::Day,
            DurationUnit::Week,
            DurationUnit::Month,
            DurationUnit::Year,
        ]
        .into_iter()
        .find(|u| u.unit_symbol() == Some(symbol))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationPart {
    pub amount: Decimal,
    pub unit: DurationUnit,
}

/// A duration as the parts it was written with ("1 year 2 months"), largest first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DurationValue {
    parts: Vec<DurationPart>,
}

impl DurationValue {
    pub fn single(amount: Decimal, unit: DurationUnit) -> Self {
        Self::from_parts(vec![DurationPart { amount, unit }])
    }

    /// Merge equal units and order largest first
    pub fn from_parts(parts: Vec<DurationPart>) -> Self {
        let mut merged: Vec<DurationPart> = Vec::new();
        for part in parts {
            match merged.iter_mut().find(|p| p.unit == part.unit) {
                Some(existing) => existing.amount += part.amount,
                None => merged.push(part),
            }
        }
        if merged.len() > 1 {
            merged.retain(|p| !p.amount.is_zero());
        }
        merged.sort_by(|a, b| b.unit.cmp(&a.unit));
        Self { parts: merged }
    }

    /// Days, hours, minutes and seconds making up `seconds`
    pub fn from_seconds(seconds: Decimal) -> Self {
        let negative = seconds.is_sign_negative();
        let mut rest = seconds.abs();
        let mut parts = Vec::new();
        for unit in [DurationUnit::Day, DurationUnit::Hour, DurationUnit::Minute] {
            let size = unit.seconds();
            let whole = (rest / size).trunc();
            if !whole.is_zero() {
                parts.push(DurationPart { amount: whole, unit });
                rest -= whole * size;
            }
        }
        if !rest.is_zero() || parts.is_empty() {
            parts.push(DurationPart {
                amount: rest,
                unit: DurationUnit::Second,
            });
        }
        if negative {
            for part in &mut parts {
                part.amount = -part.amount;
            }
        }
        Self::from_parts(parts)
    }

    pub fn parts(&self) -> &[DurationPart] {
        &self.parts
    }

    pub fn is_zero(&self) -> bool {
        self.parts.iter().all(|p| p.amount.is_zero())
    }

    pub fn has_business_days(&self) -> bool {
        self.parts.iter().any(|p| p.unit == DurationUnit::BusinessDay)
    }

    pub fn total_seconds(&self) -> Result<Decimal, ErrorValue> {
        if self.has_business_days() {
            return Err(ErrorValue::conversion(
                "Business days depend on the calendar and have no fixed length",
            ));
        }
        self.parts.iter().try_fold(Decimal::ZERO, |acc, p| {
            p.amount
                .checked_mul(p.unit.seconds())
                .and_then(|s| acc.checked_add(s))
                .ok_or_else(|| ErrorValue::runtime("Duration overflow"))
        })
    }

    pub fn add(&self, other: &DurationValue) -> DurationValue {
        let mut parts = self.parts.clone();
        parts.extend(other.parts.iter().copied());
        Self::from_parts(parts)
    }

    pub fn negate(&self) -> DurationValue {
        self.scale(Decimal::NEGATIVE_ONE)
    }

    pub fn scale(&self, factor: Decimal) -> DurationValue {
        Self {
            parts: self
                .parts
                .iter()
                .map(|p| DurationPart {
                    amount: p.amount * factor,
                    unit: p.unit,
                })
                .collect(),
        }
    }

    /// Express in a single unit
    pub fn to_unit(&self, unit: DurationUnit) -> Result<DurationValue, ErrorValue> {
        if let [part] = self.parts.as_slice() {
            if part.unit == unit {
                return Ok(self.clone());
            }
        }
        if unit == DurationUnit::BusinessDay {
            return Err(ErrorValue::conversion(
                "Cannot convert a duration to business days",
            ));
        }
        let seconds = self.total_seconds()?;
        let amount = seconds
            .checked_div(unit.seconds())
            .ok_or_else(|| ErrorValue::runtime("Duration overflow"))?;
        Ok(Self::single(amount, unit))
    }

    /// As a time quantity; single-part durations keep their unit
    pub fn to_quantity(&self) -> Result<Quantity, ErrorValue> {
        if let [part] = self.parts.as_slice() {
            if let Some(unit) = part.unit.unit_symbol().and_then(units::lookup) {
                return Ok(Quantity::new(part.amount, CompositeUnit::single(unit)));
            }
        }
        let seconds = self.total_seconds()?;
        let unit = units::lookup("s").ok_or_else(|| ErrorValue::runtime("Missing unit 's'"))?;
        Ok(Quantity::new(seconds, CompositeUnit::single(unit)))
    }

    pub fn format(&self, options: &FormatOptions) -> String {
        if self.parts.is_empty() {
            return "0 seconds".to_string();
        }
        self.parts
            .iter()
            .map(|p| {
                let name = if p.amount.abs() == Decimal::ONE {
                    p.unit.singular()
                } else {
                    p.unit.plural()
                };
                format!("{} {}", format_decimal(p.amount, options), name)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
