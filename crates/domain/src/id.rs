//! ID generation utilities.

use uuid::Uuid;

/// Generates a new credential identifier (`jti` claim).
///
/// UUID v7 embeds a millisecond timestamp and random bits, so two
/// credentials minted in the same second never collide.
#[must_use]
pub fn generate_token_id() -> String {
    Uuid::now_v7().simple().to_string()
}
