#![cfg(feature = "http_api")]

mod common;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use common::sample_catalog;
use section_scheduler::{Catalog, Course, SearchLimits, http_api};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    http_api::router(http_api::AppState::new(sample_catalog()))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn browse_catalog_via_http_api() {
    let app = new_router();

    let (status, health) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["courses"], 3);
    assert_eq!(health["term"], "Fall 2013");

    let (status, departments) = send(&app, get("/departments")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(departments, json!(["CIS", "MATH", "WRIT"]));

    let (status, courses) = send(&app, get("/departments/math/courses")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(courses[0]["code"], "104");
    assert_eq!(courses[0]["groups"], 2);
    assert_eq!(courses[0]["sections"], 3);

    let (status, course) = send(&app, get("/departments/CIS/courses/120")).await;
    assert_eq!(status, StatusCode::OK);
    let course: Course = serde_json::from_value(course).unwrap();
    assert_eq!(course.label(), "CIS-120");
    assert_eq!(course.sections().count(), 4);

    let (status, error) = send(&app, get("/departments/CIS/courses/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn schedules_are_ranked_and_limited() {
    let app = new_router();
    let payload = json!({
        "courses": ["CIS-120", "MATH-104"],
        "primary": "minDays",
        "secondary": "early",
        "limit": 2
    });
    let (status, body) = send(&app, json_request("POST", "/schedules", &payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["truncated"], false);
    assert_eq!(body["primary"], "minDays");
    assert_eq!(body["secondary"], "early");

    let schedules = body["schedules"].as_array().unwrap();
    assert_eq!(schedules.len(), 2);
    let first: Vec<&str> = schedules[0]["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|section| section["section"].as_str().unwrap())
        .collect();
    assert_eq!(first, vec!["001", "201", "002"]);
    assert_eq!(schedules[0]["statistics"]["days_of_class"], 4);
    assert_eq!(schedules[0]["credits"], 2.0);
}

#[tokio::test]
async fn default_ranking_is_early_then_min_days() {
    let app = new_router();
    let payload = json!({ "courses": ["writ 039"] });
    let (status, body) = send(&app, json_request("POST", "/schedules", &payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["primary"], "early");
    assert_eq!(body["secondary"], "minDays");
    assert_eq!(body["schedules"][0]["sections"][0]["tba"], true);
}

#[tokio::test]
async fn max_results_truncates_search() {
    let app = new_router();
    let payload = json!({ "courses": ["CIS-120", "MATH-104"], "max_results": 3 });
    let (status, body) = send(&app, json_request("POST", "/schedules", &payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["truncated"], true);
}

#[tokio::test]
async fn server_limits_apply_by_default() {
    let state = http_api::AppState::new(sample_catalog())
        .with_limits(SearchLimits::unbounded().with_max_results(1));
    let app = http_api::router(state);
    let payload = json!({ "courses": ["CIS-120", "MATH-104"] });
    let (_, body) = send(&app, json_request("POST", "/schedules", &payload)).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["truncated"], true);
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let app = new_router();

    let payload = json!({ "courses": ["CIS-120"], "primary": "shortest" });
    let (status, body) = send(&app, json_request("POST", "/schedules", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let payload = json!({ "courses": ["CIS-120", "PHYS-150", "CIS-999"] });
    let (status, body) = send(&app, json_request("POST", "/schedules", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_courses");
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn catalog_can_be_replaced() {
    let app = new_router();
    let replacement = Catalog::new().with_term("Spring", "2014");
    let payload = serde_json::to_value(&replacement).unwrap();
    let (status, _) = send(&app, json_request("PUT", "/catalog", &payload)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, health) = send(&app, get("/health")).await;
    assert_eq!(health["courses"], 0);
    assert_eq!(health["term"], "Spring 2014");

    let (status, _) = send(&app, get("/departments/CIS/courses")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
