//! The page for looking up the current price of a stock.

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, format_currency, page, text_input},
    quote::{Quote, QuoteClient, normalize_symbol},
};

impl FromRef<AppState> for QuoteClient {
    fn from_ref(state: &AppState) -> Self {
        state.quotes.clone()
    }
}

fn quote_form() -> Markup {
    html! {
        form method="post" action=(endpoints::QUOTE) class="form"
        {
            (text_input("symbol", "Symbol", "text", "Symbol", true))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Quote" }
        }
    }
}

/// Display the form for requesting a quote.
pub async fn get_quote_page() -> Response {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE) { (quote_form()) }
    };

    page("Quote", endpoints::QUOTE, &content).into_response()
}

/// The form data for requesting a quote.
#[derive(Debug, Deserialize)]
pub struct QuoteForm {
    #[serde(default)]
    pub symbol: String,
}

/// Look up the price of the requested stock and display it.
pub async fn post_quote(
    State(quotes): State<QuoteClient>,
    Form(form): Form<QuoteForm>,
) -> Result<Response, Error> {
    let symbol = normalize_symbol(&form.symbol);

    if symbol.is_empty() {
        return Err(Error::MissingField("symbol"));
    }

    let quote = quotes
        .lookup(&symbol)
        .await
        .ok_or(Error::InvalidSymbol(symbol))?;

    tracing::debug!("Quoted {} at {}", quote.symbol, quote.price);

    Ok(page("Quoted", endpoints::QUOTE, &quoted_view(&quote)).into_response())
}

fn quoted_view(quote: &Quote) -> Markup {
    html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            p class="quote"
            {
                "A share of " (quote.name) " (" span class="symbol" { (quote.symbol) } ") costs "
                span class="price" { (format_currency(quote.price)) } "."
            }

            (quote_form())
        }
    }
}
