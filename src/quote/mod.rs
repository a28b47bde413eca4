//! Share price lookups and the page for getting a quote.

mod client;
mod page;

use serde::{Deserialize, Serialize};

pub use client::{DEFAULT_QUOTE_API_URL, QuoteClient};
pub use page::{get_quote_page, post_quote};

/// The current price of a stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// The canonical ticker symbol, e.g. "AAPL".
    pub symbol: String,
    /// The company name, e.g. "Apple Inc.".
    pub name: String,
    /// The price of a single share in dollars, always positive.
    pub price: f64,
}

/// Convert a user supplied ticker symbol into its canonical form.
///
/// Surrounding whitespace is removed and letters are converted to uppercase, so " aapl" and
/// "AAPL" refer to the same stock. An empty symbol stays empty.
pub fn normalize_symbol(raw_symbol: &str) -> String {
    raw_symbol.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::normalize_symbol;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_symbol(" aapl\t"), "AAPL");
        assert_eq!(normalize_symbol("Brk.B"), "BRK.B");
    }

    #[test]
    fn empty_symbol_stays_empty() {
        assert_eq!(normalize_symbol("   "), "");
    }
}
