use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Ordering applied to refined results by start date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(rename = "none")]
    Unsorted,
    #[serde(alias = "asc", alias = "oldest")]
    Ascending,
    #[serde(alias = "desc", alias = "newest")]
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SortDirection::Unsorted),
            "asc" | "ascending" | "oldest" => Ok(SortDirection::Ascending),
            "desc" | "descending" | "newest" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

/// User-selected filter and sort choices for one refine call.
///
/// The default value has every predicate inactive and no sort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Case-insensitive containment match against the title. Empty means inactive.
    pub title_substring: String,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Literal, case-sensitive duration label match.
    pub exact_duration: Option<String>,
    /// Case-insensitive region match.
    pub region: Option<String>,
    pub date_sort: SortDirection,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.title_substring.is_empty()
            && self.max_price.is_none()
            && self.exact_duration.as_deref().is_none_or(str::is_empty)
            && self.region.as_deref().is_none_or(str::is_empty)
            && self.date_sort == SortDirection::Unsorted
    }
}

/// Search form submission forwarded to the catalog's search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub brandname: String,
    #[serde(alias = "courseid")]
    pub course_id: String,
    pub start_date: String,
    pub region: String,
}

impl SearchParams {
    /// Check that every field is filled in and return the parsed start date.
    pub fn validate(&self) -> Result<NaiveDate, AppError> {
        let missing: Vec<&str> = [
            ("brandname", &self.brandname),
            ("course_id", &self.course_id),
            ("start_date", &self.start_date),
            ("region", &self.region),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Required query parameters are missing: {}",
                missing.join(", ")
            )));
        }

        NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d").map_err(|e| {
            AppError::BadRequest(format!("Invalid start_date {:?}: {}", self.start_date, e))
        })
    }
}
