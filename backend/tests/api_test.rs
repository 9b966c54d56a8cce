use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use course_scanner::api::router;
use course_scanner::catalog::{CatalogClient, InMemoryCatalogClient, NoopCatalogClient};
use course_scanner::error::AppError;
use course_scanner::models::{CourseRecord, SearchParams};
use course_scanner::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

fn catalog_records() -> Vec<CourseRecord> {
    [
        json!({"course_id": 1, "coursename": "Java SE 17 Developer (1Z0-829) Bootcamp", "brandname": "Java",
               "price": 1200, "duration": "5 days", "start_date": "2024-07-01", "region": "UK",
               "url": "https://example.com/java-1"}),
        json!({"course_id": 1, "coursename": "Java SE 17 Developer (1Z0-829) Bootcamp", "brandname": "Java",
               "price": 950, "duration": "5 days", "start_date": "2024-05-13", "region": "UK",
               "url": "https://example.com/java-2"}),
        json!({"course_id": 1, "coursename": "Java SE 17 Developer (1Z0-829) Bootcamp", "brandname": "Java",
               "price": 1100, "duration": "3 days", "start_date": "2024-06-03", "region": "uk",
               "url": "https://example.com/java-3"}),
        json!({"course_id": 1, "coursename": "Java SE 17 Developer (1Z0-829) Bootcamp", "brandname": "Java",
               "price": 800, "duration": "5 days", "start_date": "2024-06-03", "region": "USA",
               "url": "https://example.com/java-4"}),
        json!({"course_id": 2, "coursename": "Spring Boot Fundamentals", "brandname": "Java",
               "price": 600, "duration": "2 days", "start_date": "2024-04-22", "region": "UK",
               "url": "https://example.com/spring"}),
        json!({"course_id": 7, "coursename": "Azure Administrator", "brandname": "Microsoft",
               "price": "700", "duration": "4 days", "start_date": "2024-03-11", "region": "USA",
               "url": "https://example.com/azure"}),
    ]
    .iter()
    .map(CourseRecord::from_json)
    .collect()
}

fn app() -> axum::Router {
    router(AppState {
        catalog: Arc::new(InMemoryCatalogClient::new(catalog_records())),
    })
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn field<'a>(body: &'a Value, key: &str) -> Vec<&'a str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item[key].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn health_is_ok() {
    let (status, _) = get_json(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn brand_names_are_unique() {
    let (status, body) = get_json(app(), "/brandnames").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["Java", "Microsoft"]));
}

#[tokio::test]
async fn course_options_are_deduplicated_and_sorted() {
    let (status, body) = get_json(app(), "/brands/Java/courses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        field(&body, "title"),
        ["Spring Boot Fundamentals", "Java SE 17 Developer (1Z0-829) Bootcamp"]
    );
}

#[tokio::test]
async fn search_applies_catalog_query_then_refine() {
    let uri = "/search?brandname=Java&course_id=1&start_date=2024-05-20&region=UK\
               &max_price=1150&date_sort=asc";
    let (status, body) = get_json(app(), uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        field(&body, "enroll_url"),
        ["https://example.com/java-3"]
    );
}

#[tokio::test]
async fn search_sorts_newest_first() {
    let uri = "/search?brandname=Java&course_id=1&start_date=2024-01-01&region=UK&date_sort=newest";
    let (status, body) = get_json(app(), uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        field(&body, "start_date"),
        ["2024-07-01", "2024-06-03", "2024-05-13"]
    );
}

#[tokio::test]
async fn search_with_empty_controls_does_not_filter() {
    let uri = "/search?brandname=Java&course_id=1&start_date=2024-01-01&region=UK\
               &title=&max_price=&duration=&date_sort=";
    let (status, body) = get_json(app(), uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn search_requires_all_form_fields() {
    let (status, body) = get_json(app(), "/search?brandname=Java&course_id=1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("start_date"));
    assert!(message.contains("region"));
}

#[tokio::test]
async fn search_rejects_bad_price_and_sort() {
    let base = "/search?brandname=Java&course_id=1&start_date=2024-01-01&region=UK";

    let (status, _) = get_json(app(), &format!("{}&max_price=cheap", base)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(app(), &format!("{}&max_price=-5", base)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(app(), &format!("{}&date_sort=sideways", base)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn top_courses_are_earliest_first_with_short_titles() {
    let (status, body) = get_json(app(), "/topcourses?limit=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        field(&body, "start_date"),
        ["2024-03-11", "2024-04-22", "2024-05-13"]
    );
    assert_eq!(
        field(&body, "short_title"),
        [
            "Azure Administrator",
            "Spring Boot Fundamentals",
            "Java SE 17 Developer (1Z0-829)"
        ]
    );
    assert_eq!(body[0]["price_amount"], json!(700.0));
}

#[tokio::test]
async fn refine_endpoint_accepts_backend_shaped_records() {
    let payload = json!({
        "records": [
            {"coursename": "Intro to WEB Dev", "price": 50, "start_date": "2024-05-01"},
            {"coursename": "Data Structures", "price": 99.99, "start_date": "not-a-date"},
            {"coursename": "Web Accessibility", "price": 150, "start_date": "2024-01-01"},
            {"coursename": null}
        ],
        "criteria": {"title_substring": "web", "date_sort": "ascending"}
    });

    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refine")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(field(&body, "title"), ["Web Accessibility", "Intro to WEB Dev"]);
}

async fn post_refine(payload: Value) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/refine")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn refine_endpoint_rejects_negative_max_price() {
    let (status, body) = post_refine(json!({
        "records": [{"coursename": "Rust", "price": 10}],
        "criteria": {"max_price": -5}
    }))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("max_price"));

    let (status, _) = post_refine(json!({"criteria": {"max_price": "cheap"}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_refine(json!({"criteria": {"max_price": true}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refine_endpoint_reads_sort_like_the_query_string() {
    let (status, body) = post_refine(json!({
        "records": [
            {"coursename": "May", "start_date": "2024-05-01"},
            {"coursename": "Jan", "start_date": "2024-01-01T09:00:00"}
        ],
        "criteria": {"date_sort": "ASC", "max_price": ""}
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&body, "title"), ["Jan", "May"]);

    let (status, body) = post_refine(json!({"criteria": {"date_sort": "sideways"}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("sideways"));
}

#[tokio::test]
async fn refine_endpoint_accepts_price_strings_at_the_bound() {
    let (status, body) = post_refine(json!({
        "records": [
            {"coursename": "A", "price": 50},
            {"coursename": "B", "price": "99.99"},
            {"coursename": "C", "price": 150}
        ],
        "criteria": {"max_price": "99.99"}
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&body, "title"), ["A", "B"]);
}

#[tokio::test]
async fn in_memory_catalog_checks_search_params_itself() {
    let catalog = InMemoryCatalogClient::new(catalog_records());
    let params = SearchParams {
        brandname: "Java".to_string(),
        course_id: "1".to_string(),
        ..Default::default()
    };

    let result = catalog.search(&params).await;
    assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("start_date")));

    let params = SearchParams {
        start_date: "2024-06-01".to_string(),
        region: "UK".to_string(),
        ..params
    };
    let found = catalog.search(&params).await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn empty_catalog_returns_empty_lists() {
    let app = router(AppState {
        catalog: Arc::new(NoopCatalogClient),
    });

    let (status, body) = get_json(app.clone(), "/brandnames").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = get_json(
        app,
        "/search?brandname=Java&course_id=1&start_date=2024-01-01&region=UK",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let (status, body) = get_json(app(), "/courses/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
}
