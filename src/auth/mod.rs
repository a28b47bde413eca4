//! Authentication: session cookies, starting and ending sessions, and the middleware guarding
//! routes that need a logged-in user.

mod cookie;
mod middleware;

use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    Error, UserID,
    session::{create_session, delete_session},
};

pub use cookie::DEFAULT_COOKIE_DURATION;
pub use middleware::{AuthState, auth_guard};

pub(crate) use cookie::{
    COOKIE_SESSION, get_session_id_from_cookies, invalidate_session_cookie, set_session_cookie,
};

/// Create a server-side session for `user_id` valid for `duration` and store its ID in `jar`.
///
/// # Errors
/// Returns an error if the session could not be saved.
pub fn start_session(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
    connection: &Connection,
) -> Result<PrivateCookieJar, Error> {
    let expiry = OffsetDateTime::now_utc() + duration;
    let session_id = create_session(user_id, expiry, connection)?;

    tracing::debug!("Started session for user {user_id}");

    Ok(set_session_cookie(jar, &session_id, expiry))
}

/// Delete the server-side session referenced by `jar`, if any, and invalidate the session cookie.
///
/// # Errors
/// Returns an error if the session could not be deleted.
pub fn end_session(
    jar: PrivateCookieJar,
    connection: &Connection,
) -> Result<PrivateCookieJar, Error> {
    match get_session_id_from_cookies(&jar) {
        Some(session_id) => {
            delete_session(&session_id, connection)?;
            Ok(invalidate_session_cookie(jar))
        }
        None => Ok(jar),
    }
}
