//! Post-processing of parsed job postings.
//!
//! The external parse service frequently echoes relative posting dates such
//! as "3 days ago" verbatim. These are normalized against an injected `today`
//! so the functions stay clock-free and deterministic.

use chrono::{Duration, Months, NaiveDate};
use serde_json::{Map, Value};

/// Validation message for an empty job description, surfaced before any
/// network call is made.
pub const EMPTY_DESCRIPTION_MSG: &str = "Job description text cannot be empty.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgoUnit {
    Day,
    Week,
    Month,
}

/// Interprets a posting-date phrase relative to `today`.
///
/// Returns `None` when the phrase is not recognized as relative; callers then
/// pass the original text through unchanged. An absolute `YYYY-MM-DD` never
/// matches, which makes the whole normalization idempotent.
pub fn normalize_post_date(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let phrase = phrase.trim().to_lowercase();
    if phrase.is_empty() {
        return None;
    }

    if phrase.contains("today") || phrase.contains("just now") || phrase.contains("hour") {
        return Some(today);
    }
    if phrase.contains("yesterday") {
        return Some(today - Duration::days(1));
    }

    let (quantity, unit) = parse_ago(&phrase)?;
    match unit {
        AgoUnit::Day => Some(today - Duration::days(i64::from(quantity))),
        AgoUnit::Week => Some(today - Duration::days(7 * i64::from(quantity))),
        AgoUnit::Month => today.checked_sub_months(Months::new(quantity)),
    }
}

/// Scans for a `<quantity> <unit> ago` window anywhere in the phrase.
/// Quantity "a" means 1; the unit is matched by prefix so both singular and
/// plural forms are covered.
fn parse_ago(phrase: &str) -> Option<(u32, AgoUnit)> {
    let tokens: Vec<&str> = phrase.split_whitespace().collect();
    for window in tokens.windows(3) {
        let [qty, unit, ago] = window else {
            continue;
        };
        if *ago != "ago" {
            continue;
        }
        let quantity = if *qty == "a" { Some(1) } else { qty.parse().ok() };
        let Some(quantity) = quantity else { continue };
        let unit = if unit.starts_with("day") {
            AgoUnit::Day
        } else if unit.starts_with("week") {
            AgoUnit::Week
        } else if unit.starts_with("month") {
            AgoUnit::Month
        } else {
            continue;
        };
        return Some((quantity, unit));
    }
    None
}

/// Serializes a computed date as zero-padded `YYYY-MM-DD`.
pub fn format_post_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Applies the full post-parse contract to a job details object:
///
/// - relative `post_date` phrases are rewritten as absolute dates;
/// - a missing `referral` field defaults to `false`;
/// - a missing or empty `link` is backfilled from the source URL;
/// - `description` is moved to the last key position.
///
/// Non-object values pass through untouched.
pub fn finalize_job_details(details: Value, source_url: &str, today: NaiveDate) -> Value {
    let Value::Object(mut map) = details else {
        return details;
    };

    if let Some(Value::String(phrase)) = map.get("post_date") {
        if let Some(date) = normalize_post_date(phrase, today) {
            map.insert("post_date".to_string(), Value::String(format_post_date(date)));
        }
    }

    if !map.contains_key("referral") {
        map.insert("referral".to_string(), Value::Bool(false));
    }

    let link_missing = match map.get("link") {
        None | Some(Value::Null) => true,
        Some(Value::String(link)) => link.is_empty(),
        Some(_) => false,
    };
    if link_missing && !source_url.is_empty() {
        map.insert("link".to_string(), Value::String(source_url.to_string()));
    }

    move_description_last(&mut map);
    Value::Object(map)
}

/// Moves the `description` entry to the end of the object so that serialized
/// output always closes with it. Relies on insertion-order-preserving maps.
pub fn move_description_last(map: &mut Map<String, Value>) {
    if let Some(description) = map.remove("description") {
        map.insert("description".to_string(), description);
    }
}
