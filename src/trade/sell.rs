//! The page and form handler for selling shares.

use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error, UserID,
    alert::set_flash,
    db::lock_connection,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        format_currency, link, page, shares_input,
    },
    ledger::get_held_symbols,
    quote::normalize_symbol,
    trade::{TradeState, parse_shares, sell_shares},
};

fn sell_form(symbols: &[String]) -> Markup {
    html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            @if symbols.is_empty() {
                p { "You don't own any shares yet. " (link(endpoints::BUY, "Buy some")) "." }
            } @else {
                form method="post" action=(endpoints::SELL) class="form"
                {
                    div
                    {
                        label for="symbol" class=(FORM_LABEL_STYLE) { "Symbol" }

                        select name="symbol" id="symbol" class=(FORM_TEXT_INPUT_STYLE) required
                        {
                            option value="" disabled selected { "Symbol" }

                            @for symbol in symbols {
                                option value=(symbol) { (symbol) }
                            }
                        }
                    }

                    (shares_input())

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Sell" }
                }
            }
        }
    }
}

/// Display the form for selling shares of the stocks the user owns.
pub async fn get_sell_page(
    State(state): State<TradeState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let symbols = {
        let connection = lock_connection(&state.db_connection)?;
        get_held_symbols(user_id, &connection)?
    };

    Ok(page("Sell", endpoints::SELL, &sell_form(&symbols)).into_response())
}

/// The form data for a sell order.
#[derive(Debug, Deserialize)]
pub struct SellForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub shares: String,
}

/// Sell shares at the current price and redirect to the portfolio.
pub async fn post_sell(
    State(state): State<TradeState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<SellForm>,
) -> Result<Response, Error> {
    let symbol = normalize_symbol(&form.symbol);

    if symbol.is_empty() {
        return Err(Error::NoStockSelected);
    }

    let shares = parse_shares(&form.shares)?;

    let quote = state
        .quotes
        .lookup(&symbol)
        .await
        .ok_or(Error::InvalidSymbol(symbol))?;

    let proceeds = {
        let mut connection = lock_connection(&state.db_connection)?;
        sell_shares(user_id, &quote, shares, &mut connection)?
    };

    let message = format!(
        "Sold {shares} shares of {} for {}!",
        quote.symbol,
        format_currency(proceeds)
    );

    Ok((set_flash(jar, &message), Redirect::to(endpoints::ROOT)).into_response())
}
