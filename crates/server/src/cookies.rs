//! Refresh credential cookie.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;
use warden_infrastructure::CookieSettings;

/// Builds the refresh cookie. `Max-Age` follows the credential lifetime.
pub fn refresh_cookie(settings: &CookieSettings, value: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((settings.name.clone(), value.to_string()))
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .path(settings.path.clone())
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// Builds the removal cookie.
pub fn clear_refresh_cookie(settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((settings.name.clone(), ""))
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .path(settings.path.clone())
        .max_age(Duration::ZERO)
        .build()
}

/// Reads the refresh credential from the jar.
pub fn refresh_value(jar: &CookieJar, settings: &CookieSettings) -> Option<String> {
    jar.get(&settings.name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
