pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod foods;
pub mod logs;
pub mod readiness;
pub mod state;
