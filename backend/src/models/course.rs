use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of one offering. The listing endpoint sends either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseId::Number(n) => write!(f, "{}", n),
            CourseId::Text(s) => f.write_str(s),
        }
    }
}

/// One course offering as returned by the catalog backend.
///
/// Every attribute is optional: records are rendered even when the backend
/// leaves fields out, and the refine predicates are defined for absent values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub identifier: Option<CourseId>,
    pub title: Option<String>,
    pub provider_brand: Option<String>,
    pub price_amount: Option<f64>,
    pub duration_label: Option<String>,
    /// ISO 8601 date as sent by the backend, kept verbatim.
    pub start_date: Option<String>,
    pub region: Option<String>,
    pub enroll_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_image: Option<String>,
}

const ID_KEYS: &[&str] = &["identifier", "course_id", "courseid", "id"];
const TITLE_KEYS: &[&str] = &["title", "coursename"];
const BRAND_KEYS: &[&str] = &["provider_brand", "providerBrand", "brandname"];
const PRICE_KEYS: &[&str] = &["price_amount", "priceAmount", "price"];
const DURATION_KEYS: &[&str] = &["duration_label", "durationLabel", "duration"];
const START_DATE_KEYS: &[&str] = &["start_date", "startDate"];
const REGION_KEYS: &[&str] = &["region"];
const URL_KEYS: &[&str] = &["enroll_url", "enrollUrl", "url"];
const IMAGE_KEYS: &[&str] = &["brand_image", "brandImage"];

impl CourseRecord {
    /// Build a record from one element of a listing response.
    ///
    /// Never fails: a key that is missing or holds the wrong JSON type leaves
    /// the attribute empty. Both the backend's column names (`coursename`,
    /// `brandname`, `price`, ...) and the record's own names are accepted.
    pub fn from_json(value: &Value) -> Self {
        Self {
            identifier: get_id(value, ID_KEYS),
            title: get_text(value, TITLE_KEYS),
            provider_brand: get_text(value, BRAND_KEYS),
            price_amount: get_price(value, PRICE_KEYS),
            duration_label: get_text(value, DURATION_KEYS),
            start_date: get_text(value, START_DATE_KEYS),
            region: get_text(value, REGION_KEYS),
            enroll_url: get_text(value, URL_KEYS),
            brand_image: get_text(value, IMAGE_KEYS),
        }
    }

    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Card heading for the top courses section: the title cut after its first `)`.
    /// Titles without a `)` are returned whole.
    pub fn short_title(&self) -> &str {
        let title = self.title_or_empty();
        match title.find(')') {
            Some(idx) => &title[..=idx],
            None => title,
        }
    }
}

fn get_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn get_id(value: &Value, keys: &[&str]) -> Option<CourseId> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::Number(n) => n.as_i64().map(CourseId::Number),
        Value::String(s) if !s.is_empty() => Some(CourseId::Text(s.clone())),
        _ => None,
    })
}

fn get_price(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| match value.get(*key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|price| price.is_finite() && *price >= 0.0)
}
