use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::AppError;
use crate::models::CourseRecord;

#[derive(Debug, Deserialize)]
pub struct BrandNameRow {
    #[serde(default)]
    pub brandname: Option<String>,
}

/// Decode a listing body into records.
///
/// The body must be a JSON array. Elements that are not objects are skipped;
/// object fields are read leniently by [`CourseRecord::from_json`].
pub fn decode_records(body: &str) -> Result<Vec<CourseRecord>, AppError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AppError::Upstream(format!("Failed to parse catalog response: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(AppError::Upstream(
            "Catalog response is not a JSON array".to_string(),
        ));
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if item.is_object() {
            records.push(CourseRecord::from_json(item));
        } else {
            warn!("Skipping non-object course entry at index {}", index);
        }
    }
    Ok(records)
}

pub fn decode_brand_names(body: &str) -> Result<Vec<String>, AppError> {
    let rows: Vec<BrandNameRow> = serde_json::from_str(body)
        .map_err(|e| AppError::Upstream(format!("Failed to parse brand names: {}", e)))?;

    Ok(rows.into_iter().filter_map(|row| row.brandname).collect())
}
