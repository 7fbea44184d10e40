#![allow(dead_code)]

use std::env;

use anyhow::{anyhow, ensure, Context, Result};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use carelink::config::AppConfig;
use carelink::db::{self, PgPool};
use carelink::routes;
use carelink::state::AppState;
use diesel::connection::SimpleConnection;
use diesel::PgConnection;
use http_body_util::BodyExt;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::util::ServiceExt;

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// Builds the app against `TEST_DATABASE_URL`, or returns `None` when it
    /// is unset so database-backed suites can skip themselves.
    pub async fn spawn() -> Result<Option<Self>> {
        let Ok(database_url) = env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set; skipping database-backed test");
            return Ok(None);
        };

        let config = AppConfig {
            database_url,
            database_max_pool_size: db::DEFAULT_MAX_POOL_SIZE,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            cors_allowed_origin: None,
            run_migrations: true,
        };

        let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
        prepare_database(&pool).await?;

        let state = AppState::new(pool, config);
        let router = routes::create_router(state.clone());

        Ok(Some(Self { state, router }))
    }

    pub async fn cleanup(&self) -> Result<()> {
        let pool = self.state.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = pool
                .get()
                .map_err(|err| anyhow!("failed to get cleanup connection: {err}"))?;
            truncate_all(&mut conn)?;
            Ok(())
        })
        .await
        .context("cleanup task panicked")?
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::POST, path, payload).await
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PUT, path, payload).await
    }

    pub async fn get(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())?;
        self.dispatch(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(path)
            .body(Body::empty())?;
        self.dispatch(request).await
    }

    /// POSTs `payload` and returns the created record, failing unless the
    /// server answers 201.
    pub async fn create(&self, path: &str, payload: Value) -> Result<Value> {
        let response = self.post_json(path, &payload).await?;
        let status = response.status();
        let body = body_json(response).await?;
        ensure!(
            status == StatusCode::CREATED,
            "POST {path} returned {status}: {body}"
        );
        Ok(body)
    }

    pub async fn create_user(&self, email: &str) -> Result<i64> {
        let user = self
            .create(
                "/users/",
                json!({ "email": email, "password": "hunter2", "city": "Astana" }),
            )
            .await?;
        id_field(&user, "user_id")
    }

    pub async fn create_caregiver(&self, email: &str) -> Result<i64> {
        let user_id = self.create_user(email).await?;
        self.create(
            "/caregivers/",
            json!({
                "caregiver_user_id": user_id,
                "caregiving_type": "babysitter",
                "hourly_rate": "12.50",
            }),
        )
        .await?;
        Ok(user_id)
    }

    pub async fn create_member(&self, email: &str) -> Result<i64> {
        let user_id = self.create_user(email).await?;
        self.create(
            "/members/",
            json!({ "member_user_id": user_id, "house_rules": "No pets." }),
        )
        .await?;
        Ok(user_id)
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<hyper::Response<Body>> {
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

pub async fn acquire_db_lock() -> tokio::sync::MutexGuard<'static, ()> {
    DB_LOCK.lock().await
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

pub async fn body_json(response: hyper::Response<Body>) -> Result<Value> {
    let bytes = body_to_vec(response.into_body()).await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).context("response body is not JSON")
}

pub fn id_field(record: &Value, field: &str) -> Result<i64> {
    record
        .get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow!("record has no integer `{field}`: {record}"))
}

/// Reads a decimal column, which the API renders as a fixed-point string.
pub fn decimal_field(record: &Value, field: &str) -> Result<f64> {
    let raw = record
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("record has no decimal string `{field}`: {record}"))?;
    raw.parse()
        .with_context(|| format!("`{field}` is not numeric: {raw}"))
}

async fn prepare_database(pool: &PgPool) -> Result<()> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        db::run_migrations(&pool)?;
        let mut conn = pool
            .get()
            .map_err(|err| anyhow!("failed to acquire connection: {err}"))?;
        truncate_all(&mut conn)?;
        Ok(())
    })
    .await
    .context("migration task panicked")?
}

fn truncate_all(conn: &mut PgConnection) -> Result<()> {
    conn.batch_execute(
        "TRUNCATE TABLE appointments, job_applications, jobs, addresses, members, caregivers, users RESTART IDENTITY CASCADE;",
    )
    .context("failed to truncate tables")?;
    Ok(())
}
