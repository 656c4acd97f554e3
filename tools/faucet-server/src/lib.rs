//! HTTP front end for the faucet claim attestor.

pub mod config;
pub mod donations;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Settings;
pub use routes::router;
pub use state::AppState;
