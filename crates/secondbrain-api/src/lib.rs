//! secondbrain-api: HTTP surface over the [`secondbrain_agents::RootAgent`].

pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, ServerError};
pub use server::{build_router, serve, AppState};
