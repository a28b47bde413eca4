//! The page and form handler for buying shares.

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
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, format_currency, page, shares_input,
        text_input,
    },
    quote::normalize_symbol,
    trade::{TradeState, buy_shares, parse_shares},
};

fn buy_form() -> Markup {
    html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            form method="post" action=(endpoints::BUY) class="form"
            {
                (text_input("symbol", "Symbol", "text", "Symbol", true))
                (shares_input())

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Buy" }
            }
        }
    }
}

/// Display the form for buying shares.
pub async fn get_buy_page() -> Response {
    page("Buy", endpoints::BUY, &buy_form()).into_response()
}

/// The form data for a buy order.
#[derive(Debug, Deserialize)]
pub struct BuyForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub shares: String,
}

/// Buy shares at the current price and redirect to the portfolio.
pub async fn post_buy(
    State(state): State<TradeState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<BuyForm>,
) -> Result<Response, Error> {
    let symbol = normalize_symbol(&form.symbol);

    if symbol.is_empty() {
        return Err(Error::MissingField("symbol"));
    }

    let shares = parse_shares(&form.shares)?;

    let quote = state
        .quotes
        .lookup(&symbol)
        .await
        .ok_or(Error::InvalidSymbol(symbol))?;

    let cost = {
        let mut connection = lock_connection(&state.db_connection)?;
        buy_shares(user_id, &quote, shares, &mut connection)?
    };

    let message = format!(
        "Bought {shares} shares of {} for {}!",
        quote.symbol,
        format_currency(cost)
    );

    Ok((set_flash(jar, &message), Redirect::to(endpoints::ROOT)).into_response())
}
