//! Buying and selling shares: the order execution and the pages for placing orders.

mod buy;
mod order;
mod sell;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, QuoteClient};

pub use buy::{get_buy_page, post_buy};
pub use order::{buy_shares, parse_shares, sell_shares};
pub use sell::{get_sell_page, post_sell};

/// The state needed for placing orders.
#[derive(Debug, Clone)]
pub struct TradeState {
    /// The client used to look up share prices.
    pub quotes: QuoteClient,
    /// The database connection for managing cash and the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TradeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            quotes: state.quotes.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}
