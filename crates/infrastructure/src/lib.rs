//! Warden Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus the configuration loader.

pub mod adapters;
pub mod audit;
pub mod settings;
pub mod memory;
pub mod provider;

pub use adapters::{ManualClock, SystemClock};
pub use audit::{AUDIT_TARGET, MemoryEventSink, TracingEventSink};
pub use settings::{
    CookieSettings, ProviderSettings, ProvidersSettings, ServerSettings, Settings, SettingsError,
    StoreSettings,
};
pub use memory::{
    Expiring, InMemoryKeyValueStore, InMemorySessionStore, InMemoryUserRepository, spawn_sweeper,
};
pub use provider::ReqwestProviderGateway;
