//! Executes buy and sell orders against a user's cash balance and the ledger.

use rusqlite::{Connection, TransactionBehavior};
use time::OffsetDateTime;

use crate::{
    Error, Quote, UserID,
    ledger::{NewLedgerEntry, get_holding, insert_ledger_entry},
    user::{adjust_cash, get_cash},
};

/// The largest number of shares of one stock a user may hold.
///
/// Keeps every per-symbol sum of ledger shares well inside `i64`.
pub const MAX_HOLDING: i64 = 1_000_000_000_000;

/// Parse the number of shares in an order.
///
/// # Errors
/// Returns [Error::InvalidShares] unless `raw_shares` is a whole number greater than zero
/// written with digits only, e.g. "3" but not "-3", "1.5" or "1e3".
pub fn parse_shares(raw_shares: &str) -> Result<i64, Error> {
    let raw_shares = raw_shares.trim();

    if raw_shares.is_empty() || !raw_shares.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidShares);
    }

    match raw_shares.parse::<i64>() {
        Ok(shares) if shares > 0 => Ok(shares),
        _ => Err(Error::InvalidShares),
    }
}

/// Buy `shares` shares at the quoted price and return the total cost.
///
/// The balance check, the cash debit and the ledger entry happen in one `IMMEDIATE`
/// transaction, so either all of them take effect or none do.
///
/// # Errors
/// Returns [Error::TooManyShares] if the new holding would exceed [MAX_HOLDING], and
/// [Error::InsufficientFunds] if the user cannot afford the purchase.
pub fn buy_shares(
    user_id: UserID,
    quote: &Quote,
    shares: i64,
    connection: &mut Connection,
) -> Result<f64, Error> {
    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let held = get_holding(user_id, &quote.symbol, &transaction)?;

    if held.checked_add(shares).is_none_or(|total| total > MAX_HOLDING) {
        return Err(Error::TooManyShares {
            symbol: quote.symbol.clone(),
            held,
            max: MAX_HOLDING,
        });
    }

    let cost = quote.price * shares as f64;
    let cash = get_cash(user_id, &transaction)?;

    if !cost.is_finite() || cost > cash {
        return Err(Error::InsufficientFunds);
    }

    adjust_cash(user_id, -cost, &transaction)?;
    insert_ledger_entry(
        NewLedgerEntry {
            user_id,
            symbol: &quote.symbol,
            shares,
            price: quote.price,
            date: OffsetDateTime::now_utc(),
        },
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!(
        "User {user_id} bought {shares} shares of {} for {cost}",
        quote.symbol
    );

    Ok(cost)
}

/// Sell `shares` shares at the quoted price and return the proceeds.
///
/// The holding check, the cash credit and the ledger entry happen in one `IMMEDIATE`
/// transaction. The ledger records the per share price and a negative number of shares.
///
/// # Errors
/// Returns [Error::InsufficientShares] if the user holds fewer than `shares` shares.
pub fn sell_shares(
    user_id: UserID,
    quote: &Quote,
    shares: i64,
    connection: &mut Connection,
) -> Result<f64, Error> {
    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let held = get_holding(user_id, &quote.symbol, &transaction)?;

    if shares > held {
        return Err(Error::InsufficientShares {
            symbol: quote.symbol.clone(),
            held,
            requested: shares,
        });
    }

    let proceeds = quote.price * shares as f64;

    adjust_cash(user_id, proceeds, &transaction)?;
    insert_ledger_entry(
        NewLedgerEntry {
            user_id,
            symbol: &quote.symbol,
            shares: -shares,
            price: quote.price,
            date: OffsetDateTime::now_utc(),
        },
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!(
        "User {user_id} sold {shares} shares of {} for {proceeds}",
        quote.symbol
    );

    Ok(proceeds)
}
