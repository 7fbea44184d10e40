use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub pool: PoolStatus,
}

#[derive(Serialize)]
pub struct PoolStatus {
    pub max_size: u32,
    pub connections: u32,
    pub idle_connections: u32,
}

/// Liveness probe. Reports pool occupancy without checking out a connection.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pool_state = state.pool.state();
    Json(HealthResponse {
        status: "ok",
        pool: PoolStatus {
            max_size: state.pool.max_size(),
            connections: pool_state.connections,
            idle_connections: pool_state.idle_connections,
        },
    })
}
