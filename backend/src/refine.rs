//! Client-side result refinement.
//!
//! `refine` turns a raw listing plus the user's current criteria into the list
//! the page shows. It is pure: the input slice is never touched, nothing is
//! logged, and every input, however malformed, has a defined output.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{CourseRecord, FilterCriteria, SortDirection};

/// Filter `raw` by every active predicate in `criteria`, then order the
/// survivors by start date if a direction is set.
///
/// The sort is stable, so records with equal start dates keep their listing
/// order. Records whose start date does not parse come first when ascending
/// and last when descending.
pub fn refine(raw: &[CourseRecord], criteria: &FilterCriteria) -> Vec<CourseRecord> {
    if criteria.is_empty() {
        return raw.to_vec();
    }

    let filtered: Vec<CourseRecord> = raw
        .iter()
        .filter(|record| matches(record, criteria))
        .cloned()
        .collect();

    sort_by_start_date(filtered, criteria.date_sort)
}

fn matches(record: &CourseRecord, criteria: &FilterCriteria) -> bool {
    title_matches(record, &criteria.title_substring)
        && price_within(record, criteria.max_price)
        && duration_matches(record, criteria.exact_duration.as_deref())
        && region_matches(record, criteria.region.as_deref())
}

fn title_matches(record: &CourseRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record
        .title_or_empty()
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

fn price_within(record: &CourseRecord, max_price: Option<f64>) -> bool {
    match max_price {
        None => true,
        Some(bound) => record.price_amount.is_some_and(|price| price <= bound),
    }
}

fn duration_matches(record: &CourseRecord, wanted: Option<&str>) -> bool {
    match wanted {
        None | Some("") => true,
        Some(label) => record.duration_label.as_deref() == Some(label),
    }
}

fn region_matches(record: &CourseRecord, wanted: Option<&str>) -> bool {
    match wanted {
        None | Some("") => true,
        Some(region) => record
            .region
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(region)),
    }
}

/// Comparable start date of a record.
///
/// Accepts a plain `YYYY-MM-DD` date (read as midnight), an RFC 3339
/// timestamp, or a local ISO 8601 date-time with a `T` or space separator.
/// Anything else is `None`, which orders before every real date.
pub fn start_date_key(record: &CourseRecord) -> Option<NaiveDateTime> {
    let raw = record.start_date.as_deref()?.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    LOCAL_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

const LOCAL_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Stable sort by start date. `Unsorted` returns the records as given.
pub fn sort_by_start_date(
    records: Vec<CourseRecord>,
    direction: SortDirection,
) -> Vec<CourseRecord> {
    if direction == SortDirection::Unsorted {
        return records;
    }

    let mut keyed: Vec<(Option<NaiveDateTime>, CourseRecord)> = records
        .into_iter()
        .map(|record| (start_date_key(&record), record))
        .collect();

    match direction {
        SortDirection::Ascending => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
        SortDirection::Descending => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
        SortDirection::Unsorted => {}
    }

    keyed.into_iter().map(|(_, record)| record).collect()
}

/// Keep the first record for each distinct title, preserving order.
/// Untitled records count as one shared empty title.
pub fn unique_by_title(records: Vec<CourseRecord>) -> Vec<CourseRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.title_or_empty().to_string()))
        .collect()
}
