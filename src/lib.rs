//! Paper Trader is a web app for practising stock trading with simulated money.
//!
//! Users register, look up share prices, buy and sell simulated shares and
//! top up their simulated cash. Every trade is appended to a ledger from which
//! holdings and the transaction history are derived.
//!
//! This library provides the HTTP server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod add_cash;
mod alert;
mod app_state;
mod auth;
mod db;
mod endpoints;
mod error;
mod history;
mod html;
mod internal_server_error;
mod ledger;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod password;
mod portfolio;
mod quote;
mod register_user;
mod routing;
mod session;
mod timezone;
mod trade;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use quote::{DEFAULT_QUOTE_API_URL, Quote, QuoteClient};
pub use routing::build_router;
pub use session::delete_expired_sessions;
pub use timezone::get_local_offset;
pub use user::{STARTING_CASH, User, UserID, create_user, get_user_by_id};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
