#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState, PasswordHash, QuoteClient, UserID, ValidatedPassword, auth::COOKIE_SESSION,
    build_router, create_user, db::lock_connection, endpoints,
};

pub(crate) use form::{assert_form_action, assert_form_input, assert_form_submit_button, must_get_form};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_response_document};
pub(crate) use http::{assert_redirect, get_flash_cookie};

pub(crate) const TEST_USERNAME: &str = "alice";
pub(crate) const TEST_PASSWORD: &str = "asomewhatlongpassword1";

/// An app state backed by a fresh in-memory database.
pub(crate) fn test_state(quotes: QuoteClient) -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "foobar", "Etc/UTC", quotes).expect("Could not create app state")
}

/// A test server for the full app, cookies are not saved between requests.
pub(crate) fn test_server(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

/// Insert a user with a cheap password hash.
pub(crate) fn insert_test_user(state: &AppState, username: &str, password: &str) -> UserID {
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(password), 4)
        .expect("Could not hash password");
    let connection = lock_connection(&state.db_connection).expect("Could not lock database");

    create_user(username, password_hash, &connection)
        .expect("Could not create test user")
        .id
}

/// Create the test user and log in through the log-in endpoint.
///
/// Returns the ID of the new user and their session cookie.
pub(crate) async fn log_in_test_user(
    server: &TestServer,
    state: &AppState,
) -> (UserID, Cookie<'static>) {
    let user_id = insert_test_user(state, TEST_USERNAME, TEST_PASSWORD);

    let response = server
        .post(endpoints::LOG_IN)
        .form(&[("username", TEST_USERNAME), ("password", TEST_PASSWORD)])
        .await;
    assert_redirect(&response, endpoints::ROOT);

    (user_id, response.cookie(COOKIE_SESSION))
}
