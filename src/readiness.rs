use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{error::AppError, state::AppState};

/// Startup conditions that must both hold before API traffic is served.
///
/// The listener is bound before either is met, so early requests see 503.
#[derive(Debug, Default)]
pub struct Readiness {
    reference_loaded: AtomicBool,
    store_connected: AtomicBool,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready() -> Self {
        let r = Self::new();
        r.mark_reference_loaded();
        r.mark_store_connected();
        r
    }

    pub fn mark_reference_loaded(&self) {
        self.reference_loaded.store(true, Ordering::Release);
    }

    pub fn mark_store_connected(&self) {
        self.store_connected.store(true, Ordering::Release);
    }

    pub fn reference_loaded(&self) -> bool {
        self.reference_loaded.load(Ordering::Acquire)
    }

    pub fn store_connected(&self) -> bool {
        self.store_connected.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        self.reference_loaded() && self.store_connected()
    }
}

/// Answers 503 until both readiness flags are set.
pub async fn require_ready(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.readiness.is_ready() {
        debug!(uri = %req.uri(), "request before ready");
        return AppError::NotReady.into_response();
    }
    next.run(req).await
}
