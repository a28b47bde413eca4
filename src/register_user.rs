//! This file defines the routes for the registration page and for creating new users.

use std::sync::Mutex;

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error, PasswordHash, ValidatedPassword,
    auth::{AuthState, end_session, start_session},
    db::lock_connection,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, link, log_in_register, password_input, text_input},
    user::{User, create_user},
};

fn register_form() -> Markup {
    html! {
        form method="post" action=(endpoints::REGISTER) class="form"
        {
            (text_input("username", "Username", "text", "Username", true))
            (password_input("password", "Password"))
            (password_input("confirmation", "Confirm Password"))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Register" }

            p class="form-footer"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN, "Log in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let jar = {
        let connection = lock_connection(&state.db_connection)?;
        end_session(jar, &connection)?
    };

    let content = log_in_register("Create an account", &register_form());

    Ok((jar, base("Register", &content)).into_response())
}

/// The data submitted by the registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirmation: String,
}

/// Check the submitted fields and return the trimmed username and the validated password.
fn validate_registration(form: &RegisterForm) -> Result<(&str, ValidatedPassword), Error> {
    let username = form.username.trim();

    if username.is_empty() {
        return Err(Error::MissingField("username"));
    }

    if form.password.is_empty() {
        return Err(Error::MissingField("password"));
    }

    if form.confirmation.is_empty() {
        return Err(Error::MissingField("confirmation"));
    }

    if form.password != form.confirmation {
        return Err(Error::PasswordMismatch);
    }

    let password = ValidatedPassword::new(&form.password, &[username])?;

    Ok((username, password))
}

/// Hash the password and store the new user.
fn register_user(
    form: &RegisterForm,
    db_connection: &Mutex<Connection>,
) -> Result<User, Error> {
    let (username, password) = validate_registration(form)?;
    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)?;

    let connection = lock_connection(db_connection)?;
    let user = create_user(username, password_hash, &connection)?;
    tracing::info!("Registered user {} ({})", user.id, user.username);

    Ok(user)
}

/// Create a new user, log them in and redirect to the portfolio page.
///
/// Any existing session is ended first, including when registration fails.
///
/// # Errors
///
/// Returns a validation error if a field is missing, the passwords differ, the password is too
/// weak, or the username is taken.
pub async fn post_register(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, Error> {
    let jar = {
        let connection = lock_connection(&state.db_connection)?;
        end_session(jar, &connection)?
    };

    let user = match register_user(&form, &state.db_connection) {
        Ok(user) => user,
        Err(error) => return Ok((jar, error).into_response()),
    };

    let jar = {
        let connection = lock_connection(&state.db_connection)?;
        start_session(jar, user.id, state.cookie_duration, &connection)?
    };

    Ok((jar, Redirect::to(endpoints::ROOT)).into_response())
}

#[cfg(test)]
mod register_tests {
    use axum::http::StatusCode;
    use time::Duration;

    use crate::{
        Error, QuoteClient, STARTING_CASH,
        auth::COOKIE_SESSION,
        db::lock_connection,
        endpoints,
        test_utils::{
            TEST_PASSWORD, TEST_USERNAME, assert_form_action, assert_form_input,
            assert_form_submit_button, assert_redirect, assert_valid_html, log_in_test_user,
            must_get_form, parse_response_document, test_server, test_state,
        },
        user::{get_cash, get_user_by_username},
    };

    use super::{RegisterForm, validate_registration};

    fn form(username: &str, password: &str, confirmation: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_owned(),
            password: password.to_owned(),
            confirmation: confirmation.to_owned(),
        }
    }

    #[test]
    fn validation_checks_fields_in_order() {
        let cases = [
            (form("  ", "", ""), Error::MissingField("username")),
            (form("bob", "", ""), Error::MissingField("password")),
            (form("bob", TEST_PASSWORD, ""), Error::MissingField("confirmation")),
            (form("bob", TEST_PASSWORD, "different"), Error::PasswordMismatch),
        ];

        for (form, want) in cases {
            assert_eq!(validate_registration(&form).map(|_| ()), Err(want));
        }
    }

    #[test]
    fn validation_rejects_weak_password() {
        let form = form("bob", "password", "password");

        let result = validate_registration(&form);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn validation_trims_username() {
        let form = form("  bob ", TEST_PASSWORD, TEST_PASSWORD);

        let (username, _) = validate_registration(&form).unwrap();

        assert_eq!(username, "bob");
    }

    #[tokio::test]
    async fn register_page_has_form() {
        let server = test_server(test_state(QuoteClient::demo()));

        let response = server.get(endpoints::REGISTER).await;

        response.assert_status_ok();
        let document = parse_response_document(&response);
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_form_action(&form, endpoints::REGISTER);
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirmation", "password");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn register_creates_user_and_logs_in() {
        let state = test_state(QuoteClient::demo());
        let server = test_server(state.clone());

        let response = server
            .post(endpoints::REGISTER)
            .form(&[
                ("username", TEST_USERNAME),
                ("password", TEST_PASSWORD),
                ("confirmation", TEST_PASSWORD),
            ])
            .await;

        assert_redirect(&response, endpoints::ROOT);
        {
            let connection = lock_connection(&state.db_connection).unwrap();
            let user = get_user_by_username(TEST_USERNAME, &connection).unwrap();
            assert_eq!(get_cash(user.id, &connection).unwrap(), STARTING_CASH);
        }
        let cookie = response.cookie(COOKIE_SESSION);
        server
            .get(endpoints::ROOT)
            .add_cookie(cookie)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let server = test_server(test_state(QuoteClient::demo()));
        let fields = [
            ("username", TEST_USERNAME),
            ("password", TEST_PASSWORD),
            ("confirmation", TEST_PASSWORD),
        ];

        server
            .post(endpoints::REGISTER)
            .form(&fields)
            .await
            .assert_status(StatusCode::SEE_OTHER);
        let response = server.post(endpoints::REGISTER).form(&fields).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("already exists"));
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords() {
        let state = test_state(QuoteClient::demo());
        let server = test_server(state.clone());

        let response = server
            .post(endpoints::REGISTER)
            .form(&[
                ("username", TEST_USERNAME),
                ("password", TEST_PASSWORD),
                ("confirmation", "anotherlongpassword2"),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("passwords do not match"));
        let connection = lock_connection(&state.db_connection).unwrap();
        assert_eq!(
            get_user_by_username(TEST_USERNAME, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn failed_register_ends_existing_session() {
        let state = test_state(QuoteClient::demo());
        let server = test_server(state.clone());
        let (_, cookie) = log_in_test_user(&server, &state).await;

        let response = server
            .post(endpoints::REGISTER)
            .add_cookie(cookie.clone())
            .form(&[
                ("username", "bob"),
                ("password", TEST_PASSWORD),
                ("confirmation", "anotherlongpassword2"),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.cookie(COOKIE_SESSION).max_age(), Some(Duration::ZERO));
        let response = server.get(endpoints::ROOT).add_cookie(cookie).await;
        assert_redirect(&response, endpoints::LOG_IN);
    }

    #[tokio::test]
    async fn register_rejects_missing_username() {
        let server = test_server(test_state(QuoteClient::demo()));

        let response = server
            .post(endpoints::REGISTER)
            .form(&[("password", TEST_PASSWORD), ("confirmation", TEST_PASSWORD)])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("must provide username"));
    }
}
