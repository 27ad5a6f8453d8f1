//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the authentication engine and the
//! stores and providers it depends on. Each port is a trait implemented by
//! adapters in the infrastructure layer.

mod clock;
mod event_sink;
mod key_value;
mod provider_gateway;
mod session_store;
mod store_error;
mod user_repository;

pub use clock::Clock;
pub use event_sink::SecurityEventSink;
pub use key_value::KeyValueStore;
pub use provider_gateway::{ProviderError, ProviderGateway};
pub use session_store::SessionStore;
pub use store_error::StoreError;
pub use user_repository::UserRepository;
