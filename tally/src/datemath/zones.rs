//! Fixed-offset time zones
//!
//! Abbreviations map to one offset each; daylight saving is not followed.

use chrono::FixedOffset;
use once_cell::sync::Lazy;
use regex::Regex;

/// (abbreviation, offset in minutes east of UTC)
static ABBREVIATIONS: &[(&str, i32)] = &[
    ("utc", 0),
    ("gmt", 0),
    ("z", 0),
    ("wet", 0),
    ("bst", 60),
    ("cet", 60),
    ("cest", 120),
    ("eet", 120),
    ("eest", 180),
    ("msk", 180),
    ("ist", 330),
    ("sgt", 480),
    ("hkt", 480),
    ("awst", 480),
    ("jst", 540),
    ("kst", 540),
    ("aest", 600),
    ("nzst", 720),
    ("hst", -600),
    ("akst", -540),
    ("pst", -480),
    ("pdt", -420),
    ("mst", -420),
    ("mdt", -360),
    ("cst", -360),
    ("cdt", -300),
    ("est", -300),
    ("edt", -240),
];

static OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:utc|gmt)?\s*([+-])(\d{1,2})(?::?(\d{2}))?$")
        .expect("zone offset regex must compile")
});

/// Parse `UTC`, `Z`, `+05:30`, `-0800`, `UTC+2`, `GMT-3:30` or an abbreviation
pub fn parse_zone(text: &str) -> Option<FixedOffset> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if let Some((_, minutes)) = ABBREVIATIONS.iter().find(|(name, _)| *name == lower) {
        return FixedOffset::east_opt(minutes * 60);
    }
    let caps = OFFSET.captures(trimmed)?;
    let hours: i32 = caps.get(2)?.as_str().parse().ok()?;
    let minutes: i32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    let total = (hours * 60 + minutes) * 60;
    let total = if caps.get(1)?.as_str() == "-" { -total } else { total };
    FixedOffset::east_opt(total)
}

/// Regex fragment for zone suffixes on date and time literals
/// Bare offsets need four digits so `date -2 days` is not read as a zone
pub const ZONE_PATTERN: &str = r"(?:[A-Za-z]{1,4}(?:\s*[+-]\d{1,2}(?::?\d{2})?)?|[+-]\d{2}:?\d{2})";
