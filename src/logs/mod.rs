pub mod aggregate;
pub mod builder;
pub mod day;
pub mod dto;
pub mod handlers;
pub mod memory;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub use dto::{LogEntry, LogEntryInput, MealType};
pub use memory::MemoryLogStore;
pub use repo::{LogStore, PgLogStore};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
