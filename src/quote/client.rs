//! Clients for looking up the current price of a stock.

use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::Deserialize;

use crate::quote::{Quote, normalize_symbol};

/// The base URL of the Yahoo Finance API.
pub const DEFAULT_QUOTE_API_URL: &str = "https://query1.finance.yahoo.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Looks up share prices.
///
/// Every failure to get a usable price, whether the symbol does not exist, the
/// service is unreachable or the response cannot be understood, is logged and
/// reported as `None`.
#[derive(Debug, Clone)]
pub enum QuoteClient {
    /// Fetches live prices from a Yahoo Finance compatible chart API.
    Http {
        /// The HTTP client, shared between requests.
        client: reqwest::Client,
        /// The base URL of the API without a trailing slash.
        base_url: String,
    },
    /// Serves prices from a fixed table, keyed by canonical symbol.
    Fixed(Arc<HashMap<String, Quote>>),
}

impl QuoteClient {
    /// Create a client for the chart API at `base_url`, e.g. [DEFAULT_QUOTE_API_URL].
    ///
    /// # Errors
    /// Returns an error if the HTTP client could not be initialised.
    pub fn http(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::Http {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Create a client that only knows the prices in `quotes`.
    pub fn fixed(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let quotes = quotes
            .into_iter()
            .map(|quote| (normalize_symbol(&quote.symbol), quote))
            .collect();

        Self::Fixed(Arc::new(quotes))
    }

    /// A fixed price table with a handful of well known stocks for running the app offline.
    pub fn demo() -> Self {
        Self::fixed(
            [
                ("AAPL", "Apple Inc.", 150.0),
                ("AMZN", "Amazon.com, Inc.", 130.0),
                ("GOOG", "Alphabet Inc.", 125.0),
                ("MSFT", "Microsoft Corporation", 300.0),
                ("NFLX", "Netflix, Inc.", 400.0),
                ("TSLA", "Tesla, Inc.", 250.0),
            ]
            .map(|(symbol, name, price)| Quote {
                symbol: symbol.to_owned(),
                name: name.to_owned(),
                price,
            }),
        )
    }

    /// Get the current price of `symbol`.
    ///
    /// The symbol is normalized before the lookup.
    pub async fn lookup(&self, symbol: &str) -> Option<Quote> {
        let symbol = normalize_symbol(symbol);

        if !is_valid_symbol(&symbol) {
            tracing::debug!("Rejected malformed symbol {symbol:?}");
            return None;
        }

        match self {
            QuoteClient::Http { client, base_url } => {
                fetch_quote(client, base_url, &symbol).await
            }
            QuoteClient::Fixed(quotes) => quotes.get(&symbol).cloned(),
        }
    }
}

/// Whether `symbol` only contains characters that appear in ticker symbols, such as "BRK-B" or "^GSPC".
fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol.len() <= 16
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
}

async fn fetch_quote(client: &reqwest::Client, base_url: &str, symbol: &str) -> Option<Quote> {
    let url = format!("{base_url}/v8/finance/chart/{symbol}");

    let response = client
        .get(&url)
        .query(&[("range", "1d"), ("interval", "1d")])
        .send()
        .await
        .and_then(|response| response.error_for_status());

    let response = match response {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!("Could not get quote for {symbol}: {error}");
            return None;
        }
    };

    match response.json::<ChartResponse>().await {
        Ok(chart) => quote_from_chart(chart, symbol),
        Err(error) => {
            tracing::warn!("Could not parse quote for {symbol}: {error}");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
}

fn quote_from_chart(chart: ChartResponse, requested_symbol: &str) -> Option<Quote> {
    let meta = chart.chart.result?.into_iter().next()?.meta;

    let price = match meta.regular_market_price {
        Some(price) if price.is_finite() && price > 0.0 => price,
        price => {
            tracing::warn!("No usable price for {requested_symbol}: {price:?}");
            return None;
        }
    };

    let symbol = meta
        .symbol
        .map(|symbol| normalize_symbol(&symbol))
        .unwrap_or_else(|| requested_symbol.to_owned());
    let name = meta
        .long_name
        .or(meta.short_name)
        .unwrap_or_else(|| symbol.clone());

    Some(Quote {
        symbol,
        name,
        price,
    })
}
