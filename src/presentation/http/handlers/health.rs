//! Health Handlers
//!
//! - `GET /health` - process is up, with the build version
//! - `GET /health/live` - liveness, never touches the database
//! - `GET /health/ready` - the store answers and the forum tables exist

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::startup::AppState;

static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);

/// Pin the uptime origin. Called once during startup.
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
}

/// `true` only when all three forum tables are visible to the pool's role.
const SCHEMA_CHECK: &str = "SELECT to_regclass('member') IS NOT NULL \
     AND to_regclass('post') IS NOT NULL \
     AND to_regclass('user_likes') IS NOT NULL";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Ready,
    Unavailable,
}

/// Outcome of the readiness query against the store.
#[derive(Debug, Serialize)]
pub struct DatabaseCheck {
    pub reachable: bool,
    pub schema_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DatabaseCheck {
    fn readiness(&self) -> Readiness {
        if self.reachable && self.schema_present {
            Readiness::Ready
        } else {
            Readiness::Unavailable
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: Readiness,
    pub uptime_seconds: u64,
    pub database: DatabaseCheck,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// 200 when the forum can serve requests, 503 otherwise.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let database = check_database(&state).await;
    let status = database.readiness();

    if status == Readiness::Unavailable {
        tracing::warn!(?database, "Readiness check failed");
    }

    let code = match status {
        Readiness::Ready => StatusCode::OK,
        Readiness::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(ReadinessResponse {
            status,
            uptime_seconds: SERVER_START.elapsed().as_secs(),
            database,
        }),
    )
}

async fn check_database(state: &AppState) -> DatabaseCheck {
    match sqlx::query_scalar::<_, bool>(SCHEMA_CHECK)
        .fetch_one(&state.db)
        .await
    {
        Ok(schema_present) => DatabaseCheck {
            reachable: true,
            schema_present,
            error: (!schema_present).then(|| "forum tables are missing".to_string()),
        },
        Err(e) => DatabaseCheck {
            reachable: false,
            schema_present: false,
            error: Some(e.to_string()),
        },
    }
}
