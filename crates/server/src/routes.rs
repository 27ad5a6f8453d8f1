//! Authentication routes.

use axum::extract::{Path, Query, State};
use axum::http::HeaderName;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use url::Url;
use warden_application::{ApplicationError, RequestContext};
use warden_domain::{AuthError, Provider, ProviderCallback, TokenPair};

use crate::cookies;
use crate::error::{ApiError, ApiResponse};
use crate::gate::{self, Authenticated, Caller};
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";
const CALLBACK_PATH: &str = "/login/callback";

/// Builds the application router with the gate and tracing layers.
pub fn router(state: AppState) -> Router {
    let auth = Router::new()
        .route("/reissue", post(reissue))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/callback/{provider}", get(callback));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .nest("/api/v1/auth", auth)
        .layer(middleware::from_fn_with_state(state.clone(), gate::authenticate))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenBody {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct IdentityBody {
    email: String,
    provider: String,
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

/// `POST /api/v1/auth/reissue`: rotates the refresh cookie.
async fn reissue(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<AccessTokenBody>>), ApiError> {
    let settings = &state.server.cookie;
    let refresh = cookies::refresh_value(&jar, settings).ok_or(AuthError::EmptyCredential)?;

    let pair = state.engine.reissue(&ctx, &refresh).await?;

    let jar = jar.add(cookies::refresh_cookie(
        settings,
        &pair.refresh_token,
        pair.refresh_max_age_secs,
    ));
    Ok((
        jar,
        ApiResponse::ok(AccessTokenBody {
            access_token: pair.access_token,
        }),
    ))
}

/// `POST /api/v1/auth/logout`: ends the session and expires the cookie.
async fn logout(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    caller: Authenticated,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>), ApiError> {
    state
        .engine
        .logout(&ctx, Some(&caller.access_token))
        .await?;

    let jar = jar.add(cookies::clear_refresh_cookie(&state.server.cookie));
    Ok((jar, ApiResponse::ok(())))
}

/// `GET /api/v1/auth/me`: the identity the gate established.
async fn me(caller: Authenticated) -> Json<ApiResponse<IdentityBody>> {
    ApiResponse::ok(IdentityBody {
        email: caller.user_id.email,
        provider: caller.user_id.provider.to_string(),
    })
}

/// `GET /api/v1/auth/callback/{provider}`: authorization-code landing.
///
/// Success and failure both redirect back to the front end; a failure
/// carries its public code instead of a credential.
async fn callback(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Response {
    let target = callback_url(&state.server.allowed_origin);

    match provider_login(&state, &ctx, &provider, params).await {
        Ok(pair) => {
            let jar = jar.add(cookies::refresh_cookie(
                &state.server.cookie,
                &pair.refresh_token,
                pair.refresh_max_age_secs,
            ));
            let target = with_query(target, "accessToken", &pair.access_token);
            (jar, Redirect::to(target.as_str())).into_response()
        }
        Err(err) => {
            if err.is_expected() {
                tracing::info!(%provider, error = %err, "Provider login rejected");
            } else {
                tracing::error!(%provider, error = %err, "Provider login failed");
            }
            let target = with_query(target, "error", err.code().code);
            Redirect::to(target.as_str()).into_response()
        }
    }
}

async fn provider_login(
    state: &AppState,
    ctx: &RequestContext,
    provider: &str,
    params: CallbackParams,
) -> Result<TokenPair, ApplicationError> {
    let provider: Provider = provider.parse()?;
    if let Some(reason) = params.error {
        tracing::info!(%provider, %reason, "Provider denied authorization");
        return Err(AuthError::Unauthenticated.into());
    }
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AuthError::EmptyCredential)?;

    let raw_profile = state.gateway.fetch_userinfo(provider, &code).await?;
    let callback = ProviderCallback::from_userinfo(provider, raw_profile)?;
    let (_, pair) = state.engine.complete_provider_login(ctx, &callback).await?;
    Ok(pair)
}

fn callback_url(origin: &Url) -> Url {
    let mut url = origin.clone();
    url.set_path(CALLBACK_PATH);
    url.set_query(None);
    url
}

fn with_query(mut url: Url, key: &str, value: &str) -> Url {
    url.query_pairs_mut().append_pair(key, value);
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_url_replaces_path() {
        let origin = Url::parse("https://app.example.com/some/page?x=1").unwrap();
        let url = with_query(callback_url(&origin), "accessToken", "a.b.c");

        assert_eq!(url.as_str(), "https://app.example.com/login/callback?accessToken=a.b.c");
    }
}
