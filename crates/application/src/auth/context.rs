//! Per-call execution context.

use std::net::IpAddr;

use warden_domain::UserId;

/// Who is calling and from where.
///
/// The request gate fills in the actor once a bearer credential has been
/// accepted; the audit trail reads both fields from here rather than from
/// operation arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    actor: Option<UserId>,
    origin: Option<IpAddr>,
}

impl RequestContext {
    /// Context of an unauthenticated caller with unknown origin.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            actor: None,
            origin: None,
        }
    }

    /// Context for a caller at `origin`.
    #[must_use]
    pub const fn new(origin: Option<IpAddr>) -> Self {
        Self {
            actor: None,
            origin,
        }
    }

    /// The same context, attributed to `actor`.
    #[must_use]
    pub fn with_actor(&self, actor: UserId) -> Self {
        Self {
            actor: Some(actor),
            origin: self.origin,
        }
    }

    /// Authenticated caller, if any.
    #[must_use]
    pub const fn actor(&self) -> Option<&UserId> {
        self.actor.as_ref()
    }

    /// Caller network origin, if known.
    #[must_use]
    pub const fn origin(&self) -> Option<IpAddr> {
        self.origin
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use warden_domain::Provider;

    #[test]
    fn test_with_actor_keeps_origin() {
        let ctx = RequestContext::new(Some("10.1.2.3".parse().unwrap()));
        let id = UserId::new("a@x.com", Provider::Google);

        let attributed = ctx.with_actor(id.clone());

        assert_eq!(attributed.actor(), Some(&id));
        assert_eq!(attributed.origin(), ctx.origin());
        assert!(ctx.actor().is_none());
    }
}
