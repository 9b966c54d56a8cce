use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::CatalogClient;
use crate::error::AppError;
use crate::models::{CourseRecord, FilterCriteria, SearchParams, SortDirection};
use crate::refine::{refine, sort_by_start_date, unique_by_title};

/// Number of cards shown in the top upcoming courses section.
pub const DEFAULT_TOP_COURSES: usize = 6;

/// Catalog operations backing the search and landing pages.
pub struct CatalogService {
    catalog: Arc<dyn CatalogClient>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    /// Brand names for the brand picker, blanks and repeats removed.
    pub async fn brand_names(&self) -> Result<Vec<String>, AppError> {
        let mut seen = HashSet::new();
        let names: Vec<String> = self
            .catalog
            .fetch_brand_names()
            .await?
            .into_iter()
            .filter(|name| !name.trim().is_empty())
            .filter(|name| seen.insert(name.clone()))
            .collect();

        debug!("Loaded {} brand names", names.len());
        Ok(names)
    }

    /// Course picker options for a brand: one entry per title, earliest start first.
    pub async fn course_options(&self, brand: &str) -> Result<Vec<CourseRecord>, AppError> {
        if brand.trim().is_empty() {
            return Ok(Vec::new());
        }

        let courses = self.catalog.fetch_courses_for_brand(brand).await?;
        let options = sort_by_start_date(unique_by_title(courses), SortDirection::Ascending);
        debug!("Brand {} has {} course options", brand, options.len());
        Ok(options)
    }

    /// Run a catalog search and refine the results for display.
    pub async fn search(
        &self,
        params: &SearchParams,
        criteria: &FilterCriteria,
    ) -> Result<Vec<CourseRecord>, AppError> {
        params.validate()?;

        let raw = self.catalog.search(params).await?;
        let refined = refine(&raw, criteria);
        info!(
            "Search {}/{} in {}: {} results, {} after refine",
            params.brandname,
            params.course_id,
            params.region,
            raw.len(),
            refined.len()
        );
        Ok(refined)
    }

    /// Earliest-starting courses for the landing page.
    pub async fn top_courses(&self, limit: usize) -> Result<Vec<CourseRecord>, AppError> {
        let courses = self.catalog.fetch_top_courses().await?;
        let mut sorted = sort_by_start_date(courses, SortDirection::Ascending);
        sorted.truncate(limit);
        Ok(sorted)
    }
}
