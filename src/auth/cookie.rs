//! Defines functions for storing the session ID in an encrypted cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::session::SessionId;

/// The name of the cookie that holds the session ID.
pub(crate) const COOKIE_SESSION: &str = "session";
/// The default duration for which sessions and their cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Add the session cookie to the cookie jar, indicating that a user is logged in.
///
/// The cookie expires at `expiry`, which should match the expiry of the server-side session.
pub(crate) fn set_session_cookie(
    jar: PrivateCookieJar,
    session_id: &SessionId,
    expiry: OffsetDateTime,
) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, session_id.as_str().to_owned()))
            .path("/")
            .expires(expiry)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Set the session cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the session ID from the cookie jar.
///
/// Returns `None` if the cookie is missing, could not be decrypted, or has been invalidated.
pub(crate) fn get_session_id_from_cookies(jar: &PrivateCookieJar) -> Option<SessionId> {
    jar.get(COOKIE_SESSION)
        .map(|cookie| cookie.value_trimmed().to_owned())
        .filter(|value| !value.is_empty() && value != "deleted")
        .map(|value| SessionId::new_unchecked(&value))
}
