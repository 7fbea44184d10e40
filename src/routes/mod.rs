use axum::http::{HeaderValue, StatusCode};
use axum::{routing::get, Json, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::serializers::{to_record, Record, Resource};
use crate::state::AppState;

pub mod addresses;
pub mod appointments;
pub mod caregivers;
pub mod health;
pub mod job_applications;
pub mod jobs;
pub mod members;
pub mod users;

pub fn create_router(state: AppState) -> Router<()> {
    let allow_origin = match state.config.cors_allowed_origin.as_deref() {
        Some(origins) => AllowOrigin::list(parse_origins(origins)),
        None => AllowOrigin::mirror_request(),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/users/", get(users::list_users).post(users::create_user))
        .route(
            "/users/:user_id/",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/caregivers/",
            get(caregivers::list_caregivers).post(caregivers::create_caregiver),
        )
        .route(
            "/caregivers/:caregiver_user_id/",
            get(caregivers::get_caregiver)
                .put(caregivers::update_caregiver)
                .delete(caregivers::delete_caregiver),
        )
        .route(
            "/members/",
            get(members::list_members).post(members::create_member),
        )
        .route(
            "/members/:member_user_id/",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        .route(
            "/addresses/",
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route(
            "/addresses/:member_user_id/",
            get(addresses::get_address)
                .put(addresses::update_address)
                .delete(addresses::delete_address),
        )
        .route("/jobs/", get(jobs::list_jobs).post(jobs::create_job))
        .route(
            "/jobs/:job_id/",
            get(jobs::get_job)
                .put(jobs::update_job)
                .delete(jobs::delete_job),
        )
        .route(
            "/job-applications/",
            get(job_applications::list_job_applications)
                .post(job_applications::create_job_application),
        )
        .route(
            "/job-applications/:caregiver_user_id/:job_id/",
            get(job_applications::get_job_application)
                .put(job_applications::update_job_application)
                .delete(job_applications::delete_job_application),
        )
        .route(
            "/appointments/",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/appointments/:appointment_id/",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route("/health/", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .filter_map(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(err) => {
                    warn!(origin = trimmed, error = %err, "ignoring invalid CORS origin");
                    None
                }
            }
        })
        .collect()
}

/// Turns a primary-key lookup miss into the entity's 404.
pub(crate) fn found<T: Resource>(row: Option<T>) -> AppResult<T> {
    row.ok_or_else(|| AppError::not_found(T::LABEL))
}

/// Keys are INTEGER columns, so ids beyond `i32` name no row.
pub(crate) fn row_id<T: Resource>(raw: i64) -> AppResult<i32> {
    i32::try_from(raw).map_err(|_| AppError::not_found(T::LABEL))
}

pub(crate) fn created<T: Resource>(row: &T) -> AppResult<(StatusCode, Json<Record>)> {
    Ok((StatusCode::CREATED, Json(to_record(row)?)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use diesel::pg::PgConnection;
    use diesel::r2d2::{ConnectionManager, Pool};
    use serde_json::Value;
    use tower::util::ServiceExt;

    use super::{create_router, parse_origins};
    use crate::config::AppConfig;
    use crate::state::AppState;

    // Requests in this module are rejected during extraction, so the pool
    // never has to hand out a connection.
    fn offline_router() -> Router {
        let config = AppConfig {
            database_url: "postgres://carelink@127.0.0.1:1/unused".to_string(),
            database_max_pool_size: 1,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            cors_allowed_origin: None,
            run_migrations: false,
        };
        let manager = ConnectionManager::<PgConnection>::new(config.database_url.clone());
        let pool = Pool::builder()
            .max_size(1)
            .min_idle(Some(0))
            .build_unchecked(manager);
        create_router(AppState::new(pool, config))
    }

    async fn send(method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(raw) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(raw.to_string())
            }
            None => Body::empty(),
        };
        let response = offline_router()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn error_message(body: &Value) -> &str {
        body.get("error").and_then(Value::as_str).unwrap_or_default()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(Method::GET, "/health/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["pool"]["max_size"], 1);
    }

    #[tokio::test]
    async fn create_requires_mandatory_fields() {
        let (status, body) = send(
            Method::POST,
            "/users/",
            Some(r#"{"email": "ada@example.com"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_message(&body).contains("password"));
    }

    #[tokio::test]
    async fn create_rejects_unknown_fields() {
        let (status, body) = send(
            Method::POST,
            "/members/",
            Some(r#"{"member_user_id": 1, "pets": "two cats"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_message(&body).contains("unknown field"));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (status, body) = send(Method::POST, "/jobs/", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!error_message(&body).is_empty());
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/addresses/")
            .body(Body::from(r#"{"member_user_id": 1}"#))
            .unwrap();
        let response = offline_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_rejects_primary_key_change() {
        let (status, body) = send(Method::PUT, "/users/1/", Some(r#"{"user_id": 5}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_message(&body).contains("unknown field"));
    }

    #[tokio::test]
    async fn update_rejects_unknown_status() {
        let (status, body) = send(
            Method::PUT,
            "/appointments/1/",
            Some(r#"{"status": "Maybe"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_message(&body).contains("unknown variant"));
    }

    #[tokio::test]
    async fn create_rejects_unknown_caregiving_type() {
        let (status, _) = send(
            Method::POST,
            "/caregivers/",
            Some(r#"{"caregiver_user_id": 1, "caregiving_type": "nanny"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_rejects_null_for_required_column() {
        let (status, body) = send(Method::PUT, "/jobs/3/", Some(r#"{"member_user_id": null}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_message(&body).contains("null"));
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let (status, body) = send(Method::GET, "/users/abc/", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("error").is_some());

        let (status, _) = send(Method::DELETE, "/job-applications/1/x/", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn out_of_range_id_is_not_found() {
        let (status, body) = send(Method::GET, "/users/3000000000/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_message(&body), "User not found");

        let (status, body) = send(Method::DELETE, "/appointments/-2147483649/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_message(&body), "Appointment not found");

        let (status, body) = send(
            Method::PUT,
            "/job-applications/1/3000000000/",
            Some(r#"{"date_applied": "2024-01-10"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_message(&body), "Job application not found");
    }

    #[tokio::test]
    async fn extreme_decimal_is_rejected_before_the_database() {
        let (status, body) = send(
            Method::POST,
            "/caregivers/",
            Some(r#"{"caregiver_user_id": 1, "caregiving_type": "babysitter", "hourly_rate": "1e-100000"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error_message(&body).contains("decimal out of range"));

        let (status, _) = send(
            Method::PUT,
            "/appointments/1/",
            Some(r#"{"work_hours": "1e200000"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_cors_origins_are_skipped() {
        let origins = parse_origins("https://care.example, ,bad\norigin,http://localhost:5173");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://care.example");
    }
}
