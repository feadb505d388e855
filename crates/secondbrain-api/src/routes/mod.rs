mod health;
mod ingest;
mod query;
mod sources;

pub use health::health_routes;
pub use ingest::{ingest_routes, MISSING_INPUT};
pub use query::query_routes;
pub use sources::source_routes;
