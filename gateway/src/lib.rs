//! The `bridge-gateway` binary's routing and process state, split out of
//! `main.rs` so the router can be exercised directly in tests.

pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
