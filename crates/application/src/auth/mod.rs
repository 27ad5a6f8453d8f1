//! Authentication engine.
//!
//! This module provides:
//! - Credential issuance and verification
//! - Fixed-window rate limiting and early revocation
//! - Identity resolution for provider logins
//! - The session lifecycle orchestrator and its audit trail

mod audit;
mod context;
mod identity_resolver;
mod orchestrator;
mod rate_limiter;
mod revocation;
mod token_codec;

pub use audit::SecurityAudit;
pub use context::RequestContext;
pub use identity_resolver::IdentityResolver;
pub use orchestrator::{AuthOrchestrator, AuthPorts};
pub use rate_limiter::RateLimiter;
pub use revocation::RevocationRegistry;
pub use token_codec::{MIN_SECRET_LEN, SigningKeyError, TokenCodec};
