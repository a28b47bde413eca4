//! Defines the app level error type and its conversion to rendered HTML pages.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    html::error_view, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// The errors that may occur in the application.
///
/// Validation errors carry the message shown to the user, internal errors are
/// logged and replaced with a generic error page.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required field was left empty in a form that does not require
    /// authentication, e.g. the registration form.
    #[error("must provide {0}")]
    MissingField(&'static str),

    /// A required field was left empty in the log-in form.
    #[error("must provide {0}")]
    MissingCredential(&'static str),

    /// The username does not exist or the password does not match.
    #[error("invalid username and/or password")]
    InvalidCredentials,

    /// The password and its confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The username is already taken by another user.
    #[error("the username \"{0}\" already exists")]
    DuplicateUsername(String),

    /// The number of shares was not a positive whole number.
    #[error("shares must be a positive integer")]
    InvalidShares,

    /// No stock was selected in the sell form.
    #[error("must select a stock to sell")]
    NoStockSelected,

    /// The price lookup for the symbol failed.
    #[error("invalid symbol \"{0}\"")]
    InvalidSymbol(String),

    /// The user does not have enough cash to pay for a purchase.
    #[error("you can't afford this purchase")]
    InsufficientFunds,

    /// A purchase would take the holding of a stock past the largest number of shares a user may hold.
    #[error("you can hold at most {max} shares of {symbol}, you already hold {held}")]
    TooManyShares {
        /// The symbol of the stock being bought.
        symbol: String,
        /// The number of shares currently held.
        held: i64,
        /// The largest holding allowed.
        max: i64,
    },

    /// The user tried to sell more shares than they hold.
    #[error("not enough shares of {symbol}: you hold {held}, tried to sell {requested}")]
    InsufficientShares {
        /// The symbol of the stock being sold.
        symbol: String,
        /// The number of shares currently held.
        held: i64,
        /// The number of shares the user tried to sell.
        requested: i64,
    },

    /// The deposit amount was missing, not a number, or not positive.
    #[error("invalid amount")]
    InvalidAmount,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingCredential(_) | Error::InvalidCredentials | Error::InvalidAmount => {
                StatusCode::FORBIDDEN
            }
            Error::MissingField(_)
            | Error::PasswordMismatch
            | Error::TooWeak(_)
            | Error::DuplicateUsername(_)
            | Error::InvalidShares
            | Error::NoStockSelected
            | Error::InvalidSymbol(_)
            | Error::InsufficientFunds
            | Error::TooManyShares { .. }
            | Error::InsufficientShares { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_) | Error::SqlError(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code == StatusCode::NOT_FOUND {
            return get_404_not_found_response();
        }

        if status_code.is_server_error() {
            // Any errors that are not handled above are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            return InternalServerError::default().into_response();
        }

        let description = self.to_string();
        let page = error_view(
            "Sorry",
            status_code.as_str(),
            &description,
            "Go back and try again.",
        );

        (status_code, Html(page.into_string())).into_response()
    }
}
