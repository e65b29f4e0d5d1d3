//! HTTP surface for the filter analytics log.

pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
