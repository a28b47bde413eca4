//! Authentication middleware that resolves the session cookie, extends sessions, and handles redirects.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState,
    auth::{get_session_id_from_cookies, invalidate_session_cookie, set_session_cookie},
    db::lock_connection,
    endpoints,
    session::{extend_session, get_session_user},
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which sessions are extended on each request.
    pub cookie_duration: Duration,
    /// The database connection holding the session records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

fn redirect_to_log_in(jar: PrivateCookieJar) -> Response {
    (invalidate_session_cookie(jar), Redirect::to(endpoints::LOG_IN)).into_response()
}

/// Middleware function that checks for a valid session cookie.
///
/// If the cookie refers to a live session, the user ID is placed into the request, the request
/// is executed normally, and the session is extended by the configured duration.
/// Otherwise a redirect to the log-in page is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return Redirect::to(endpoints::LOG_IN).into_response();
        }
    };

    let session_id = match get_session_id_from_cookies(&jar) {
        Some(session_id) => session_id,
        None => return redirect_to_log_in(jar),
    };

    let now = OffsetDateTime::now_utc();
    let expiry = now + state.cookie_duration;

    let user_id = {
        let connection = match lock_connection(&state.db_connection) {
            Ok(connection) => connection,
            Err(error) => return error.into_response(),
        };

        match get_session_user(&session_id, now, &connection) {
            Ok(Some(user_id)) => {
                if let Err(error) = extend_session(&session_id, expiry, &connection) {
                    tracing::error!("Error extending session: {error}");
                }

                user_id
            }
            Ok(None) => {
                tracing::debug!("Session missing or expired. Redirecting to log in page.");
                return redirect_to_log_in(jar);
            }
            Err(error) => return error.into_response(),
        }
    };

    parts.extensions.insert(user_id);
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = set_session_cookie(jar, &session_id, expiry);
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{Extension, Router, middleware, response::Html, routing::get};
    use axum_extra::extract::cookie::{Cookie, SameSite};
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use crate::{
        AppState, QuoteClient, UserID,
        auth::{AuthState, COOKIE_SESSION, auth_guard},
        endpoints,
        test_utils::{log_in_test_user, test_state},
    };

    async fn test_handler(Extension(user_id): Extension<UserID>) -> Html<String> {
        Html(format!("<h1>Hello, user {user_id}!</h1>"))
    }

    const TEST_PROTECTED_ROUTE: &str = "/protected";

    fn get_test_server(state: AppState) -> TestServer {
        let auth_state = AuthState {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        };
        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(auth_state, auth_guard))
            .merge(crate::build_router(state));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(2),
            "got date time {:?}, want {:?}",
            left,
            right
        );
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_cookie() {
        let state = test_state(QuoteClient::demo());
        let server = get_test_server(state.clone());
        let (user_id, session_cookie) = log_in_test_user(&server, &state).await;

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(session_cookie)
            .await;

        response.assert_status_ok();
        assert!(response.text().contains(&format!("Hello, user {user_id}!")));
    }

    #[tokio::test]
    async fn auth_guard_refreshes_session_cookie() {
        let state = test_state(QuoteClient::demo());
        let server = get_test_server(state.clone());
        let (_, session_cookie) = log_in_test_user(&server, &state).await;

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(session_cookie)
            .await;

        let cookie = response.cookie(COOKIE_SESSION);
        assert_date_time_close(
            cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + state.cookie_duration,
        );
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn get_protected_route_with_no_cookie_redirects_to_log_in() {
        let server = get_test_server(test_state(QuoteClient::demo()));

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN);
    }

    #[tokio::test]
    async fn get_protected_route_with_invalid_cookie_redirects_to_log_in() {
        let server = get_test_server(test_state(QuoteClient::demo()));

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_SESSION, "FOOBAR")).build())
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN);
    }

    #[tokio::test]
    async fn get_protected_route_after_log_out_redirects_to_log_in() {
        let state = test_state(QuoteClient::demo());
        let server = get_test_server(state.clone());
        let (_, session_cookie) = log_in_test_user(&server, &state).await;

        server
            .get(endpoints::LOG_OUT)
            .add_cookie(session_cookie.clone())
            .await
            .assert_status_see_other();
        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(session_cookie)
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN);
    }
}
