//! The page listing every trade a user has made.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error, UserID,
    db::lock_connection,
    endpoints,
    html::{
        TABLE_CELL_NUMBER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, format_currency, link, page,
    },
    ledger::{LedgerEntry, get_history},
    timezone::to_local_time,
};

const DATE_TIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The state needed for the history page.
#[derive(Debug, Clone)]
pub struct HistoryState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the user's trades, most recent first.
pub async fn get_history_page(
    State(state): State<HistoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let entries = {
        let connection = lock_connection(&state.db_connection)?;
        get_history(user_id, &connection)?
    };

    let content = history_view(&entries, &state.local_timezone);

    Ok(page("History", endpoints::HISTORY, &content).into_response())
}

fn format_date(date: OffsetDateTime, local_timezone: &str) -> String {
    let local = to_local_time(date, local_timezone);

    local.format(DATE_TIME_FORMAT).unwrap_or_else(|error| {
        tracing::error!("Could not format date {local}: {error}");
        local.to_string()
    })
}

fn history_view(entries: &[LedgerEntry], local_timezone: &str) -> Markup {
    html! {
        @if entries.is_empty() {
            p { "No transactions yet. " (link(endpoints::BUY, "Buy your first shares")) "." }
        } @else {
            table class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th class=(TABLE_CELL_STYLE) { "Symbol" }
                        th class=(TABLE_CELL_NUMBER_STYLE) { "Shares" }
                        th class=(TABLE_CELL_NUMBER_STYLE) { "Price" }
                        th class=(TABLE_CELL_STYLE) { "Transacted" }
                    }
                }

                tbody
                {
                    @for entry in entries {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (entry.symbol) }
                            td class=(TABLE_CELL_NUMBER_STYLE) { (entry.shares) }
                            td class=(TABLE_CELL_NUMBER_STYLE) { (format_currency(entry.price)) }
                            td class=(TABLE_CELL_STYLE) { (format_date(entry.date, local_timezone)) }
                        }
                    }
                }
            }
        }
    }
}
