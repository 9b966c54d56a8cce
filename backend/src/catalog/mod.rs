pub mod dto;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::{CourseRecord, SearchParams};
use crate::refine::start_date_key;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl CatalogConfig {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid catalog URL {:?}: {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "Catalog URL must be http or https, got {}",
                base_url.scheme()
            )));
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url =
            env::var("COURSE_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        if let Ok(raw) = env::var("COURSE_API_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("COURSE_API_TIMEOUT_SECS {:?} is not a number", raw))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Read access to the external course catalog backend.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_brand_names(&self) -> Result<Vec<String>, AppError>;
    async fn fetch_courses_for_brand(&self, brand: &str) -> Result<Vec<CourseRecord>, AppError>;
    async fn search(&self, params: &SearchParams) -> Result<Vec<CourseRecord>, AppError>;
    async fn fetch_top_courses(&self) -> Result<Vec<CourseRecord>, AppError>;
}

pub struct CatalogHttpClient {
    client: Client,
    config: CatalogConfig,
}

impl CatalogHttpClient {
    pub fn new(config: CatalogConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Config(format!(
                    "Catalog URL {} cannot have a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_body(&self, url: Url) -> Result<String, AppError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Catalog API error {}: {}", status, body)));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl CatalogClient for CatalogHttpClient {
    async fn fetch_brand_names(&self) -> Result<Vec<String>, AppError> {
        let body = self.get_body(self.endpoint(&["brandnames"])?).await?;
        dto::decode_brand_names(&body)
    }

    async fn fetch_courses_for_brand(&self, brand: &str) -> Result<Vec<CourseRecord>, AppError> {
        let body = self.get_body(self.endpoint(&["coursename", brand])?).await?;
        dto::decode_records(&body)
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<CourseRecord>, AppError> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("brandname", &params.brandname)
            .append_pair("course_id", &params.course_id)
            .append_pair("start_date", &params.start_date)
            .append_pair("region", &params.region);

        let body = self.get_body(url).await?;
        let records = dto::decode_records(&body)?;
        info!("Catalog search returned {} courses", records.len());
        Ok(records)
    }

    async fn fetch_top_courses(&self) -> Result<Vec<CourseRecord>, AppError> {
        let body = self.get_body(self.endpoint(&["topcourses"])?).await?;
        dto::decode_records(&body)
    }
}

pub struct NoopCatalogClient;

#[async_trait]
impl CatalogClient for NoopCatalogClient {
    async fn fetch_brand_names(&self) -> Result<Vec<String>, AppError> {
        Ok(Vec::new())
    }

    async fn fetch_courses_for_brand(&self, _brand: &str) -> Result<Vec<CourseRecord>, AppError> {
        Ok(Vec::new())
    }

    async fn search(&self, _params: &SearchParams) -> Result<Vec<CourseRecord>, AppError> {
        Ok(Vec::new())
    }

    async fn fetch_top_courses(&self) -> Result<Vec<CourseRecord>, AppError> {
        Ok(Vec::new())
    }
}

/// Catalog backed by a fixed record set.
///
/// `search` keeps records of the requested brand, course id and region that
/// start on or after the requested date.
pub struct InMemoryCatalogClient {
    records: Vec<CourseRecord>,
}

impl InMemoryCatalogClient {
    pub fn new(records: Vec<CourseRecord>) -> Self {
        Self { records }
    }

    fn of_brand<'a>(&'a self, brand: &'a str) -> impl Iterator<Item = &'a CourseRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.provider_brand.as_deref() == Some(brand))
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalogClient {
    async fn fetch_brand_names(&self) -> Result<Vec<String>, AppError> {
        Ok(self
            .records
            .iter()
            .filter_map(|r| r.provider_brand.clone())
            .collect())
    }

    async fn fetch_courses_for_brand(&self, brand: &str) -> Result<Vec<CourseRecord>, AppError> {
        Ok(self.of_brand(brand).cloned().collect())
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<CourseRecord>, AppError> {
        // Re-checked here: callers may hold the client without going through CatalogService.
        let earliest = params.validate()?.and_time(NaiveTime::MIN);

        Ok(self
            .of_brand(&params.brandname)
            .filter(|r| {
                r.identifier
                    .as_ref()
                    .is_some_and(|id| id.to_string() == params.course_id)
            })
            .filter(|r| {
                r.region
                    .as_deref()
                    .is_some_and(|region| region.eq_ignore_ascii_case(&params.region))
            })
            .filter(|r| start_date_key(r).is_some_and(|start| start >= earliest))
            .cloned()
            .collect())
    }

    async fn fetch_top_courses(&self) -> Result<Vec<CourseRecord>, AppError> {
        Ok(self.records.clone())
    }
}
