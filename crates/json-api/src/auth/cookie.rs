//! Session cookie.

use jiff::Timestamp;
use salvo::{
    Request,
    http::{
        cookie::{Cookie, SameSite, time::Duration},
        header::AUTHORIZATION,
    },
};

pub(crate) const SESSION_COOKIE: &str = "scholarlink_session";

/// HTTP-only cookie carrying a session token until it expires.
pub(crate) fn session_cookie(
    token: String,
    expires_at: Timestamp,
    now: Timestamp,
    secure: bool,
) -> Cookie<'static> {
    let max_age = expires_at.duration_since(now).as_secs().max(0);

    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age))
        .build()
}

/// Empty, already expired cookie that makes the browser forget the session.
pub(crate) fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .build()
}

/// Session token from the cookie, falling back to an `Authorization: Bearer` header.
pub(crate) fn session_token(req: &Request) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE)
        && !cookie.value().trim().is_empty()
    {
        return Some(cookie.value().trim().to_owned());
    }

    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token.to_owned())
}
