//! The portfolio page: the stocks a user owns valued at their current prices, plus their cash.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, Quote, QuoteClient, UserID,
    alert::{Alert, take_flash},
    db::lock_connection,
    endpoints,
    html::{
        TABLE_CELL_NUMBER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, format_currency, page,
    },
    ledger::{Holding, get_holdings},
    user::get_cash,
};

/// The state needed for the portfolio page.
#[derive(Debug, Clone)]
pub struct PortfolioState {
    /// The client used to value holdings at their current price.
    pub quotes: QuoteClient,
    /// The database connection for reading holdings and cash.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PortfolioState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            quotes: state.quotes.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A holding valued at the current price of the stock.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioRow {
    pub symbol: String,
    pub name: String,
    pub shares: i64,
    /// The current price, or the last traded price if the current price is unavailable.
    pub price: f64,
    pub total: f64,
    /// Whether `price` is the last traded price because no quote could be fetched.
    pub is_stale: bool,
}

/// A user's holdings and cash.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub rows: Vec<PortfolioRow>,
    pub cash: f64,
    /// The value of all holdings plus cash.
    pub grand_total: f64,
}

/// Value `holdings` with the quote at the same index in `quotes`.
///
/// A holding without a quote is valued at its last traded price and marked as stale.
pub fn build_portfolio(holdings: Vec<Holding>, quotes: Vec<Option<Quote>>, cash: f64) -> Portfolio {
    let rows: Vec<PortfolioRow> = holdings
        .into_iter()
        .zip(quotes)
        .map(|(holding, quote)| {
            let (name, price, is_stale) = match quote {
                Some(quote) => (quote.name, quote.price, false),
                None => (holding.symbol.clone(), holding.last_price, true),
            };

            PortfolioRow {
                total: price * holding.shares as f64,
                symbol: holding.symbol,
                name,
                shares: holding.shares,
                price,
                is_stale,
            }
        })
        .collect();

    let grand_total = rows.iter().map(|row| row.total).sum::<f64>() + cash;

    Portfolio {
        rows,
        cash,
        grand_total,
    }
}

/// Display the user's portfolio and any message left by the previous request.
pub async fn get_portfolio_page(
    State(state): State<PortfolioState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let (holdings, cash) = {
        let connection = lock_connection(&state.db_connection)?;
        (
            get_holdings(user_id, &connection)?,
            get_cash(user_id, &connection)?,
        )
    };

    let mut quotes = Vec::with_capacity(holdings.len());
    for holding in &holdings {
        quotes.push(state.quotes.lookup(&holding.symbol).await);
    }

    let portfolio = build_portfolio(holdings, quotes, cash);
    let (jar, flash) = take_flash(jar);

    let content = portfolio_view(&portfolio, flash);

    Ok((jar, page("Portfolio", endpoints::ROOT, &content)).into_response())
}

fn portfolio_view(portfolio: &Portfolio, flash: Option<Alert>) -> Markup {
    let has_stale_prices = portfolio.rows.iter().any(|row| row.is_stale);

    html! {
        @if let Some(alert) = flash {
            (alert.into_html())
        }

        @if has_stale_prices {
            (Alert::Error("Some prices could not be updated, those stocks are valued at their last traded price.".to_owned()).into_html())
        }

        table class=(TABLE_STYLE)
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th class=(TABLE_CELL_STYLE) { "Symbol" }
                    th class=(TABLE_CELL_STYLE) { "Name" }
                    th class=(TABLE_CELL_NUMBER_STYLE) { "Shares" }
                    th class=(TABLE_CELL_NUMBER_STYLE) { "Price" }
                    th class=(TABLE_CELL_NUMBER_STYLE) { "TOTAL" }
                }
            }

            tbody
            {
                @for row in &portfolio.rows {
                    tr class=(TABLE_ROW_STYLE) data-symbol=(row.symbol)
                    {
                        td class=(TABLE_CELL_STYLE) { (row.symbol) }
                        td class=(TABLE_CELL_STYLE) { (row.name) }
                        td class=(TABLE_CELL_NUMBER_STYLE) { (row.shares) }
                        td class=(TABLE_CELL_NUMBER_STYLE)
                        {
                            (format_currency(row.price))
                            @if row.is_stale {
                                " " span class="stale" title="Last traded price" { "(stale)" }
                            }
                        }
                        td class=(TABLE_CELL_NUMBER_STYLE) { (format_currency(row.total)) }
                    }
                }
            }

            tfoot
            {
                tr id="cash"
                {
                    td class=(TABLE_CELL_STYLE) colspan="4" { "CASH" }
                    td class=(TABLE_CELL_NUMBER_STYLE) { (format_currency(portfolio.cash)) }
                }

                tr id="grand-total"
                {
                    td class=(TABLE_CELL_STYLE) colspan="4" { "TOTAL" }
                    td class=(TABLE_CELL_NUMBER_STYLE) { (format_currency(portfolio.grand_total)) }
                }
            }
        }
    }
}
