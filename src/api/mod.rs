use std::sync::Arc;

use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::catalog::FeaturedCatalog;
use crate::planner::PlannerService;

pub mod error;
pub mod featured;
pub mod planner;

pub use error::ApiError;

/// Shared handler state. Cloned per request, so every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<PlannerService>,
    /// `None` when no catalog backend is configured
    pub catalog: Option<Arc<FeaturedCatalog>>,
}

impl AppState {
    pub fn new(planner: PlannerService, catalog: Option<FeaturedCatalog>) -> Self {
        Self {
            planner: Arc::new(planner),
            catalog: catalog.map(Arc::new),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/trip-planner", post(planner::plan_trip))
        .route("/featured/treks", get(featured::featured_treks))
        .route("/featured/blogs", get(featured::featured_blogs))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}
