use chrono::NaiveDate;
use curator_core::{finalize_job_details, format_post_date, normalize_post_date};
use serde_json::json;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn relative_phrases_resolve_against_today() {
    let today = day(2025, 3, 15);
    assert_eq!(normalize_post_date("Posted today", today), Some(today));
    assert_eq!(normalize_post_date("just now", today), Some(today));
    assert_eq!(normalize_post_date("3 hours ago", today), Some(today));
    assert_eq!(normalize_post_date("Yesterday", today), Some(day(2025, 3, 14)));
    assert_eq!(normalize_post_date("3 days ago", today), Some(day(2025, 3, 12)));
    assert_eq!(normalize_post_date("a week ago", today), Some(day(2025, 3, 8)));
    assert_eq!(normalize_post_date("2 weeks ago", today), Some(day(2025, 3, 1)));
    assert_eq!(normalize_post_date("a month ago", today), Some(day(2025, 2, 15)));
}

#[test]
fn month_subtraction_clamps_to_calendar() {
    // March 31 minus one month lands on the end of February.
    let today = day(2025, 3, 31);
    assert_eq!(normalize_post_date("1 month ago", today), Some(day(2025, 2, 28)));
}

#[test]
fn absolute_dates_pass_through() {
    let today = day(2025, 3, 15);
    assert_eq!(normalize_post_date("2024-11-02", today), None);
    assert_eq!(normalize_post_date("November 2nd", today), None);
    assert_eq!(normalize_post_date("", today), None);
}

#[test]
fn normalization_is_idempotent() {
    let today = day(2025, 3, 15);
    let computed = normalize_post_date("2 days ago", today).unwrap();
    let formatted = format_post_date(computed);
    // Re-running the normalizer on the formatted output is a no-op.
    assert_eq!(normalize_post_date(&formatted, today), None);
}

#[test]
fn formatted_dates_are_zero_padded() {
    assert_eq!(format_post_date(day(2025, 1, 5)), "2025-01-05");
}

#[test]
fn finalize_defaults_referral_and_reorders_description() {
    let today = day(2025, 3, 15);
    let details = json!({
        "title": "Rust Engineer",
        "description": "Build things.",
        "company": "Acme",
        "post_date": "2 days ago"
    });

    let result = finalize_job_details(details, "", today);
    let map = result.as_object().unwrap();

    assert_eq!(map["post_date"], json!("2025-03-13"));
    assert_eq!(map["referral"], json!(false));
    // description must serialize last.
    let last_key = map.keys().last().unwrap();
    assert_eq!(last_key, "description");
}

#[test]
fn finalize_keeps_explicit_referral() {
    let today = day(2025, 3, 15);
    let details = json!({ "referral": true, "description": "d" });
    let result = finalize_job_details(details, "", today);
    assert_eq!(result["referral"], json!(true));
}

#[test]
fn finalize_backfills_missing_link_from_source_url() {
    let today = day(2025, 3, 15);
    let details = json!({ "title": "T", "link": "", "description": "d" });
    let result = finalize_job_details(details, "https://jobs.example.com/42", today);
    assert_eq!(result["link"], json!("https://jobs.example.com/42"));

    let kept = json!({ "link": "https://original.example.com", "description": "d" });
    let result = finalize_job_details(kept, "https://jobs.example.com/42", today);
    assert_eq!(result["link"], json!("https://original.example.com"));
}

#[test]
fn finalize_passes_non_objects_through() {
    let today = day(2025, 3, 15);
    assert_eq!(finalize_job_details(json!("oops"), "", today), json!("oops"));
}
