//! Warden Domain - Core authentication types
//!
//! This crate defines the domain model of the Warden authentication engine:
//! identities, credentials, sessions, provider profiles and the error
//! taxonomy. All types here are pure Rust with no I/O dependencies.

pub mod audit;
pub mod credential;
pub mod error;
pub mod id;
pub mod identity;
pub mod profile;
pub mod session;

pub use audit::{AuditLevel, AuditOperation, SecurityEvent, format_origin};
pub use credential::{Claims, TokenKind, TokenPair};
pub use error::{AuthError, DomainResult, ErrorCode};
pub use id::generate_token_id;
pub use identity::{Provider, User, UserId};
pub use profile::{ProviderCallback, ProviderProfile};
pub use session::Session;
