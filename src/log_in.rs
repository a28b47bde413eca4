//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level session and cookie logic.

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
    Error,
    auth::{AuthState, end_session, start_session},
    db::lock_connection,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, link, log_in_register, password_input, text_input},
    user::{User, get_user_by_username},
};

fn log_in_form() -> Markup {
    html! {
        form method="post" action=(endpoints::LOG_IN) class="form"
        {
            (text_input("username", "Username", "text", "Username", true))
            (password_input("password", "Password"))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log In" }

            p class="form-footer"
            {
                "Don't have an account? "
                (link(endpoints::REGISTER, "Register here"))
            }
        }
    }
}

/// Display the log-in page.
///
/// Any existing session is ended first.
pub async fn get_log_in_page(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let jar = {
        let connection = lock_connection(&state.db_connection)?;
        end_session(jar, &connection)?
    };

    let content = log_in_register("Log in to your account", &log_in_form());

    Ok((jar, base("Log In", &content)).into_response())
}

/// The credentials a user logs in with.
#[derive(Debug, Deserialize)]
pub struct LogInForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Find the user named in `form` and check their password.
fn check_credentials(form: &LogInForm, connection: &Connection) -> Result<User, Error> {
    if form.username.is_empty() {
        return Err(Error::MissingCredential("username"));
    }

    if form.password.is_empty() {
        return Err(Error::MissingCredential("password"));
    }

    let user = get_user_by_username(&form.username, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCredentials,
        error => error,
    })?;

    let is_password_valid = user
        .password_hash
        .verify(&form.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        tracing::debug!("Wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    Ok(user)
}

/// Check the user's credentials and start a new session.
///
/// Any existing session is ended first. On success the session cookie is set and the client
/// is redirected to the portfolio page.
///
/// # Errors
///
/// Returns an [Error::MissingCredential] if either field is empty, and an
/// [Error::InvalidCredentials] if the user does not exist or the password is wrong.
pub async fn post_log_in(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInForm>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let jar = end_session(jar, &connection)?;

    let user = match check_credentials(&form, &connection) {
        Ok(user) => user,
        Err(error) => return Ok((jar, error).into_response()),
    };

    let jar = start_session(jar, user.id, state.cookie_duration, &connection)?;

    tracing::info!("User {} logged in", user.id);

    Ok((jar, Redirect::to(endpoints::ROOT)).into_response())
}
