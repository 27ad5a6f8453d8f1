//! Authentication gate.
//!
//! Runs before every route. A request without a bearer credential passes
//! through anonymously; a request with one is admitted only if the engine
//! authorizes it, otherwise the gate answers with the error envelope.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use warden_application::RequestContext;
use warden_domain::{AuthError, UserId};

use crate::error::ApiError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity established by the gate.
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// The caller.
    pub user_id: UserId,
    /// The bearer credential the caller presented.
    pub access_token: String,
}

/// Request context of the current call, anonymous unless the gate admitted a bearer.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

/// Gate middleware, installed with `axum::middleware::from_fn_with_state`.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let ctx = RequestContext::new(client_origin(&request));

    let Some(credential) = bearer(request.headers()) else {
        request.extensions_mut().insert(Caller(ctx));
        return next.run(request).await;
    };

    match state.engine.is_authorized(&ctx, &credential).await {
        Ok(user_id) => {
            let extensions = request.extensions_mut();
            extensions.insert(Caller(ctx.with_actor(user_id.clone())));
            extensions.insert(Authenticated {
                user_id,
                access_token: credential,
            });
            next.run(request).await
        }
        Err(err) => ApiError(err).into_response(),
    }
}

/// Credential from `Authorization: Bearer <token>`. Other schemes count as absent.
fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(|token| token.trim().to_string())
}

/// First `X-Forwarded-For` hop, else the peer address.
fn client_origin(request: &Request) -> Option<IpAddr> {
    let forwarded = request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AuthError::Unauthenticated.into())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_else(|| Self(RequestContext::anonymous())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer(&headers).as_deref(), Some(""));
    }

    #[test]
    fn test_origin_prefers_forwarded_hop() {
        let mut request = axum::http::Request::builder()
            .header(FORWARDED_FOR, "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 2], 4000))));

        assert_eq!(client_origin(&request), Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn test_origin_falls_back_to_peer() {
        let mut request = axum::http::Request::builder()
            .header(FORWARDED_FOR, "garbage")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_origin(&request), None);

        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 2], 4000))));
        assert_eq!(client_origin(&request), Some("10.0.0.2".parse().unwrap()));
    }
}
