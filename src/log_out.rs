//! Log-out route handler that ends the session and redirects users.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    Error,
    auth::{AuthState, end_session},
    db::lock_connection,
    endpoints,
};

/// Delete the session and its cookie and redirect the client to the home page, which in turn
/// sends them to the log-in page.
pub async fn get_log_out(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let jar = {
        let connection = lock_connection(&state.db_connection)?;
        end_session(jar, &connection)?
    };

    Ok((jar, Redirect::to(endpoints::ROOT)).into_response())
}
