//! # Warden Server
//!
//! HTTP surface of the authentication engine: the authentication gate,
//! credential rotation, logout and the provider callback.

pub mod cookies;
pub mod error;
pub mod gate;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use gate::{Authenticated, Caller};
pub use routes::router;
pub use state::AppState;
