use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{error::AppError, state::AppState};

use super::table::FoodReference;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct FoodQuery {
    pub name: Option<String>,
}

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/food", get(get_food))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<FoodReference>>, AppError> {
    let results = state.foods()?.search(&query.q);
    debug!(results = results.len(), "food search");
    Ok(Json(results))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    Query(query): Query<FoodQuery>,
) -> Result<Json<FoodReference>, AppError> {
    let name = query.name.unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::BadRequest("Food name query is required".into()));
    }

    match state.foods()?.get_by_exact_name(&name) {
        Ok(food) => Ok(Json(food.clone())),
        Err(e) => {
            warn!(%name, "food lookup miss");
            Err(e.into())
        }
    }
}
