//! Date and time anchors: the value a date chain starts from
//!
//! Literal forms (`2024-03-15 14:30 UTC`, `15 March 2024`, `March 15, 2024`,
//! `03/15/2024`, `14:30`, `3pm`) are shared with the literal parser; keywords
//! (`today`, `next friday`) and date-valued variables only make sense with an
//! evaluation context.

use super::zones;
use crate::evaluator::context::EvaluationContext;
use crate::semantic::{DateLocale, DateValue, SemanticValue, TimeValue};
use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("anchor regex must compile")
}

static ISO_DATE: Lazy<Regex> = Lazy::new(|| regex(r"^(\d{4})-(\d{1,2})-(\d{1,2})"));
static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)^(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?,?\s+(\d{4})"));
static MONTH_DAY_YEAR: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)^([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})"));
static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| regex(r"^(\d{1,2})[/.](\d{1,2})[/.](\d{4})"));
static CLOCK: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)^(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,3}))?)?(?:\s?([ap])\.?m\.?)?")
});
static HOUR_MERIDIEM: Lazy<Regex> = Lazy::new(|| regex(r"(?i)^(\d{1,2})\s?([ap])\.?m\.?"));
static DATE_TIME_SEPARATOR: Lazy<Regex> = Lazy::new(|| regex(r"^(?:T|\s+(?:at\s+)?)"));
static DAY_OFFSET: Lazy<Regex> = Lazy::new(|| regex(r"^\s*\(([+-]\d+) days?\)"));
static ZONE: Lazy<Regex> = Lazy::new(|| regex(&format!(r"^\s*({})", zones::ZONE_PATTERN)));
static KEYWORD: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)^(today|tomorrow|yesterday|now|(next|last|this)\s+([a-z]+))"));

/// A parsed anchor and the number of bytes of input it used
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub value: SemanticValue,
    pub consumed: usize,
}

pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let months = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    months
        .iter()
        .position(|m| *m == lower || (lower.len() >= 3 && m.starts_with(lower.as_str())))
        .and_then(|i| u32::try_from(i + 1).ok())
}

pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match name.to_lowercase().as_str() {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// The input continues with something that cannot end a word
fn at_boundary(text: &str, index: usize) -> bool {
    text[index..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric() && c != '_' && c != ':')
}

fn number<T: std::str::FromStr>(caps: &regex::Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

/// A calendar date at the start of `text`, with optional time and zone
pub fn parse_date_prefix(text: &str, locale: DateLocale) -> Option<(DateValue, usize)> {
    let (date, mut used) = parse_calendar_date(text, locale)?;
    let mut value = DateValue::date_only(date);

    if let Some(sep) = DATE_TIME_SEPARATOR.find(&text[used..]) {
        let start = used + sep.end();
        if let Some((time, len)) = parse_clock(&text[start..]) {
            value = DateValue::with_time(date.and_time(time), None);
            used = start + len;
        }
    }
    if let Some((zone, len)) = parse_zone_suffix(&text[used..]) {
        value.zone = Some(zone);
        used += len;
    }
    at_boundary(text, used).then_some((value, used))
}

fn parse_calendar_date(text: &str, locale: DateLocale) -> Option<(NaiveDate, usize)> {
    if let Some(caps) = ISO_DATE.captures(text) {
        let date = NaiveDate::from_ymd_opt(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?)?;
        return Some((date, caps.get(0)?.end()));
    }
    if let Some(caps) = DAY_MONTH_YEAR.captures(text) {
        if let Some(month) = month_from_name(caps.get(2)?.as_str()) {
            let date = NaiveDate::from_ymd_opt(number(&caps, 3)?, month, number(&caps, 1)?)?;
            return Some((date, caps.get(0)?.end()));
        }
    }
    if let Some(caps) = MONTH_DAY_YEAR.captures(text) {
        if let Some(month) = month_from_name(caps.get(1)?.as_str()) {
            let date = NaiveDate::from_ymd_opt(number(&caps, 3)?, month, number(&caps, 2)?)?;
            return Some((date, caps.get(0)?.end()));
        }
    }
    if let Some(caps) = NUMERIC_DATE.captures(text) {
        let first: u32 = number(&caps, 1)?;
        let second: u32 = number(&caps, 2)?;
        let year: i32 = number(&caps, 3)?;
        // An unambiguous field wins over the locale
        let (month, day) = if first > 12 {
            (second, first)
        } else if second > 12 {
            (first, second)
        } else {
            match locale {
                DateLocale::Us => (first, second),
                DateLocale::Eu => (second, first),
            }
        };
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some((date, caps.get(0)?.end()));
    }
    None
}

/// `14:30`, `2:30:15 pm`, `9am`
pub fn parse_clock(text: &str) -> Option<(NaiveTime, usize)> {
    let (hour, minute, second, millis, meridiem, used) = if let Some(caps) = CLOCK.captures(text) {
        (
            number::<u32>(&caps, 1)?,
            number::<u32>(&caps, 2)?,
            caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?,
            caps.get(4)
                .map_or(Some(0), |m| format!("{:0<3}", m.as_str()).parse::<u32>().ok())?,
            caps.get(5).map(|m| m.as_str().to_lowercase()),
            caps.get(0)?.end(),
        )
    } else {
        let caps = HOUR_MERIDIEM.captures(text)?;
        (
            number::<u32>(&caps, 1)?,
            0,
            0,
            0,
            caps.get(2).map(|m| m.as_str().to_lowercase()),
            caps.get(0)?.end(),
        )
    };
    if !at_boundary(text, used) {
        return None;
    }
    let hour = match meridiem.as_deref() {
        Some(_) if hour == 0 || hour > 12 => return None,
        Some("a") => hour % 12,
        Some(_) => hour % 12 + 12,
        None => hour,
    };
    let time = NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;
    Some((time, used))
}

/// A time of day at the start of `text`, with optional `(+1 day)` and zone
pub fn parse_time_prefix(text: &str) -> Option<(TimeValue, usize)> {
    let (time, mut used) = parse_clock(text)?;
    let mut value = TimeValue::new(time);
    if let Some(caps) = DAY_OFFSET.captures(&text[used..]) {
        value.day_offset = number(&caps, 1)?;
        used += caps.get(0)?.end();
    }
    if let Some((zone, len)) = parse_zone_suffix(&text[used..]) {
        value.zone = Some(zone);
        used += len;
    }
    Some((value, used))
}

fn parse_zone_suffix(text: &str) -> Option<(FixedOffset, usize)> {
    let caps = ZONE.captures(text)?;
    let matched = caps.get(1)?;
    if !at_boundary(text, matched.end()) {
        return None;
    }
    let zone = zones::parse_zone(matched.as_str())?;
    Some((zone, matched.end()))
}

/// Any anchor at the start of `text`: keyword, literal or date-valued variable
pub fn parse_anchor(text: &str, ctx: &EvaluationContext<'_>) -> Option<Anchor> {
    let text_start = text.len() - text.trim_start().len();
    let trimmed = text.trim_start();

    let found = parse_keyword(trimmed, ctx)
        .or_else(|| {
            parse_date_prefix(trimmed, ctx.format.date_locale)
                .map(|(date, used)| (SemanticValue::Date(date), used))
        })
        .or_else(|| parse_time_prefix(trimmed).map(|(time, used)| (SemanticValue::Time(time), used)))
        .or_else(|| parse_variable(trimmed, ctx));

    found.map(|(value, used)| Anchor {
        value,
        consumed: text_start + used,
    })
}

fn parse_keyword(text: &str, ctx: &EvaluationContext<'_>) -> Option<(SemanticValue, usize)> {
    let caps = KEYWORD.captures(text)?;
    let used = caps.get(0)?.end();
    if !at_boundary(text, used) {
        return None;
    }
    let today = ctx.now.date_naive();
    let keyword = caps.get(1)?.as_str().to_lowercase();
    let date = match keyword.as_str() {
        "today" => today,
        "tomorrow" => today.checked_add_signed(Duration::days(1))?,
        "yesterday" => today.checked_sub_signed(Duration::days(1))?,
        "now" => {
            return Some((
                SemanticValue::Date(DateValue::with_time(ctx.now.naive_local(), None)),
                used,
            ))
        }
        _ => {
            let target = weekday_from_name(caps.get(3)?.as_str())?;
            let direction = caps.get(2)?.as_str().to_lowercase();
            relative_weekday(today, target, &direction)?
        }
    };
    Some((SemanticValue::Date(DateValue::date_only(date)), used))
}

/// `next friday` is strictly after today, `last friday` strictly before,
/// `this friday` is today or later in the week
pub fn relative_weekday(today: NaiveDate, target: Weekday, direction: &str) -> Option<NaiveDate> {
    let current = i64::from(today.weekday().num_days_from_monday());
    let wanted = i64::from(target.num_days_from_monday());
    let days = match direction {
        "last" => {
            let back = (current - wanted).rem_euclid(7);
            -(if back == 0 { 7 } else { back })
        }
        "this" => (wanted - current).rem_euclid(7),
        _ => {
            let ahead = (wanted - current).rem_euclid(7);
            if ahead == 0 {
                7
            } else {
                ahead
            }
        }
    };
    today.checked_add_signed(Duration::days(days))
}

/// Longest run of words naming a date, time or duration variable
fn parse_variable(text: &str, ctx: &EvaluationContext<'_>) -> Option<(SemanticValue, usize)> {
    let mut ends = Vec::new();
    let mut in_word = false;
    for (i, c) in text.char_indices() {
        let word_char = c.is_alphanumeric() || c == '_';
        if !word_char && !c.is_whitespace() {
            if in_word {
                ends.push(i);
            }
            break;
        }
        if in_word && c.is_whitespace() {
            ends.push(i);
        }
        if i == 0 && !(c.is_alphabetic() || c == '_') {
            return None;
        }
        in_word = word_char;
    }
    if in_word {
        ends.push(text.len());
    }
    ends.into_iter().rev().find_map(|end| {
        let value = ctx.lookup(&text[..end])?;
        matches!(
            value,
            SemanticValue::Date(_) | SemanticValue::Time(_) | SemanticValue::Duration(_)
        )
        .then_some((value, end))
    })
}
