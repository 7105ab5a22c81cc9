use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::models::{FeaturedItems, ListingKind};

#[derive(Debug, Default, Deserialize)]
pub struct FeaturedQuery {
    pub seed: Option<u64>,
    pub limit: Option<usize>,
}

pub async fn featured_treks(
    State(state): State<AppState>,
    query: Result<Query<FeaturedQuery>, QueryRejection>,
) -> Result<Json<FeaturedItems>, ApiError> {
    featured(&state, ListingKind::Treks, query).await
}

pub async fn featured_blogs(
    State(state): State<AppState>,
    query: Result<Query<FeaturedQuery>, QueryRejection>,
) -> Result<Json<FeaturedItems>, ApiError> {
    featured(&state, ListingKind::Blogs, query).await
}

async fn featured(
    state: &AppState,
    kind: ListingKind,
    query: Result<Query<FeaturedQuery>, QueryRejection>,
) -> Result<Json<FeaturedItems>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::bad_request("Invalid query").with_details(rejection.body_text())
    })?;

    let Some(catalog) = &state.catalog else {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Featured listings are not configured",
        ));
    };

    catalog
        .featured(kind, query.seed, query.limit)
        .await
        .map(Json)
        .map_err(ApiError::from_catalog_error)
}
