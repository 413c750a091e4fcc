use axum_extra::extract::cookie::Cookie;
use time::{Duration, OffsetDateTime};

pub const SESSION_COOKIE: &str = "ghareebstar";

/// httpOnly session cookie living as long as the token inside it.
pub fn session_cookie(token: String, ttl: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .max_age(ttl)
        .build()
}

/// Overwrites the session cookie with an already expired, empty value.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .path("/")
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::now_utc())
        .build()
}
