pub mod handlers;
pub mod table;

use crate::state::AppState;
use axum::Router;

pub use table::{FoodReference, FoodTable};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::read_routes())
}
