//! Warden Application - Authentication engine and ports
//!
//! This crate holds the session/token lifecycle of the Warden
//! authentication engine and the ports it needs from the outside world.
//! Adapters live in `warden-infrastructure`.

pub mod auth;
pub mod error;
pub mod ports;
pub mod settings;
mod timeout;

#[cfg(test)]
mod testing;

pub use auth::{
    AuthOrchestrator, AuthPorts, IdentityResolver, RateLimiter, RequestContext,
    RevocationRegistry, SecurityAudit, SigningKeyError, TokenCodec,
};
pub use error::{ApplicationError, ApplicationResult};
pub use settings::{AuthSettings, LimitedOperation, RateLimitPolicy, RateLimitSettings};
