//! Process-local store adapters.
//!
//! Suitable for a single instance and for tests. All of them share the
//! engine's [`Clock`](warden_application::ports::Clock) so expiry follows
//! the same time source as credential issuance.

mod key_value;
mod session_store;
mod sweeper;
mod user_repository;

pub use key_value::InMemoryKeyValueStore;
pub use session_store::InMemorySessionStore;
pub use sweeper::{Expiring, spawn_sweeper};
pub use user_repository::InMemoryUserRepository;
