use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::models::*;
use crate::refine::refine;
use crate::services::{CatalogService, DEFAULT_TOP_COURSES};
use crate::state::AppState;

/// Refine controls as they arrive in a query string. Empty values are inactive.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CriteriaQuery {
    pub title: Option<String>,
    pub max_price: Option<String>,
    pub duration: Option<String>,
    pub region_filter: Option<String>,
    pub date_sort: Option<String>,
}

impl CriteriaQuery {
    pub fn into_criteria(self) -> Result<FilterCriteria, AppError> {
        let max_price = match non_empty(self.max_price) {
            None => None,
            Some(raw) => {
                let price = raw.trim().parse::<f64>().map_err(|_| {
                    AppError::BadRequest(format!("max_price {:?} is not a number", raw))
                })?;
                Some(checked_max_price(price)?)
            }
        };

        Ok(FilterCriteria {
            title_substring: self.title.unwrap_or_default(),
            max_price,
            exact_duration: non_empty(self.duration),
            region: non_empty(self.region_filter),
            date_sort: parse_date_sort(self.date_sort)?,
        })
    }
}

/// Refine controls as they arrive in a JSON body. Checked by the same rules
/// as [`CriteriaQuery`]; prices may be numbers or numeric strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CriteriaBody {
    pub title_substring: Option<String>,
    pub max_price: Option<Value>,
    pub exact_duration: Option<String>,
    pub region: Option<String>,
    pub date_sort: Option<String>,
}

impl CriteriaBody {
    pub fn into_criteria(self) -> Result<FilterCriteria, AppError> {
        let max_price = match self.max_price {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) if raw.is_empty() => None,
            Some(Value::String(raw)) => Some(raw.trim().parse::<f64>().map_err(|_| {
                AppError::BadRequest(format!("max_price {:?} is not a number", raw))
            })?),
            Some(Value::Number(n)) => n.as_f64(),
            Some(other) => {
                return Err(AppError::BadRequest(format!(
                    "max_price must be a number, got {}",
                    other
                )));
            }
        };

        Ok(FilterCriteria {
            title_substring: self.title_substring.unwrap_or_default(),
            max_price: max_price.map(checked_max_price).transpose()?,
            exact_duration: non_empty(self.exact_duration),
            region: non_empty(self.region),
            date_sort: parse_date_sort(self.date_sort)?,
        })
    }
}

fn checked_max_price(price: f64) -> Result<f64, AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::BadRequest(format!(
            "max_price must be a non-negative number, got {}",
            price
        )));
    }
    Ok(price)
}

fn parse_date_sort(raw: Option<String>) -> Result<SortDirection, AppError> {
    match non_empty(raw) {
        None => Ok(SortDirection::Unsorted),
        Some(raw) => raw.parse::<SortDirection>().map_err(AppError::BadRequest),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
struct TopCoursesParams {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TopCourse {
    #[serde(flatten)]
    pub course: CourseRecord,
    pub short_title: String,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    #[serde(default)]
    pub records: Vec<Value>,
    #[serde(default)]
    pub criteria: CriteriaBody,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/brandnames", get(list_brand_names))
        .route("/brands/{brand}/courses", get(list_course_options))
        .route("/search", get(search_courses))
        .route("/topcourses", get(list_top_courses))
        .route("/refine", post(refine_records))
        .fallback(not_found)
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> AppError {
    AppError::NotFound
}

async fn list_brand_names(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let service = CatalogService::new(state.catalog.clone());
    let names = service.brand_names().await?;
    Ok(Json(names))
}

async fn list_course_options(
    State(state): State<AppState>,
    Path(brand): Path<String>
) -> Result<Json<Vec<CourseRecord>>, AppError> {
    let service = CatalogService::new(state.catalog.clone());
    let options = service.course_options(&brand).await?;
    Ok(Json(options))
}

async fn search_courses(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    Query(criteria): Query<CriteriaQuery>
) -> Result<Json<Vec<CourseRecord>>, AppError> {
    let criteria = criteria.into_criteria()?;
    let service = CatalogService::new(state.catalog.clone());
    let courses = service.search(&params, &criteria).await?;
    Ok(Json(courses))
}

async fn list_top_courses(
    State(state): State<AppState>,
    Query(params): Query<TopCoursesParams>
) -> Result<Json<Vec<TopCourse>>, AppError> {
    let service = CatalogService::new(state.catalog.clone());
    let courses = service
        .top_courses(params.limit.unwrap_or(DEFAULT_TOP_COURSES))
        .await?;

    let cards = courses
        .into_iter()
        .map(|course| TopCourse {
            short_title: course.short_title().to_string(),
            course,
        })
        .collect();
    Ok(Json(cards))
}

async fn refine_records(
    Json(req): Json<RefineRequest>
) -> Result<Json<Vec<CourseRecord>>, AppError> {
    let criteria = req.criteria.into_criteria()?;
    let records: Vec<CourseRecord> = req.records.iter().map(CourseRecord::from_json).collect();
    Ok(Json(refine(&records, &criteria)))
}
