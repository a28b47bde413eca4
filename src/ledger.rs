//! The append-only ledger of trades from which holdings and history are derived.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{Error, UserID};

/// A trade recorded in the ledger.
///
/// Entries are never updated or deleted once inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// The ID of the entry.
    pub id: i64,
    /// The user who made the trade.
    pub user_id: UserID,
    /// The canonical ticker symbol of the stock.
    pub symbol: String,
    /// The number of shares, positive for a purchase and negative for a sale.
    pub shares: i64,
    /// The price of a single share at the time of the trade.
    pub price: f64,
    /// When the trade was executed.
    pub date: OffsetDateTime,
}

/// The data for a new ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLedgerEntry<'a> {
    /// The user making the trade.
    pub user_id: UserID,
    /// The canonical ticker symbol of the stock.
    pub symbol: &'a str,
    /// Positive for a purchase, negative for a sale.
    pub shares: i64,
    /// The per share price.
    pub price: f64,
    /// When the trade was executed.
    pub date: OffsetDateTime,
}

/// The net number of shares of one stock owned by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    /// The canonical ticker symbol of the stock.
    pub symbol: String,
    /// The sum of all traded shares, always positive.
    pub shares: i64,
    /// The per share price of the most recent trade of this stock.
    pub last_price: f64,
}

/// Create the transactions table.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                symbol TEXT NOT NULL,
                shares INTEGER NOT NULL,
                price REAL NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE
                );
        CREATE INDEX IF NOT EXISTS idx_transactions_user_symbol
            ON transactions(user_id, symbol);",
    )
}

/// Append a trade to the ledger.
///
/// # Errors
/// Returns an [Error::SqlError] if the user does not exist or there is some other SQL error.
pub fn insert_ledger_entry(
    entry: NewLedgerEntry,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    let entry = connection
        .prepare(
            "INSERT INTO transactions (user_id, symbol, shares, price, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, symbol, shares, price, date",
        )?
        .query_row(
            (
                entry.user_id.as_i64(),
                entry.symbol,
                entry.shares,
                entry.price,
                entry.date,
            ),
            map_ledger_row,
        )?;

    Ok(entry)
}

fn map_ledger_row(row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        symbol: row.get(2)?,
        shares: row.get(3)?,
        price: row.get(4)?,
        date: row.get(5)?,
    })
}

/// Get all stocks a user currently owns shares of, ordered by symbol.
///
/// Stocks that have been sold off completely are not included.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn get_holdings(user_id: UserID, connection: &Connection) -> Result<Vec<Holding>, Error> {
    connection
        .prepare(
            "SELECT t.symbol, SUM(t.shares) AS total_shares,
                (SELECT latest.price FROM transactions latest
                 WHERE latest.user_id = ?1 AND latest.symbol = t.symbol
                 ORDER BY latest.id DESC LIMIT 1)
             FROM transactions t
             WHERE t.user_id = ?1
             GROUP BY t.symbol
             HAVING total_shares > 0
             ORDER BY t.symbol",
        )?
        .query_map((user_id.as_i64(),), |row| {
            Ok(Holding {
                symbol: row.get(0)?,
                shares: row.get(1)?,
                last_price: row.get(2)?,
            })
        })?
        .map(|maybe_holding| maybe_holding.map_err(Error::from))
        .collect()
}

/// Get the number of shares of `symbol` a user currently owns, zero if none.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn get_holding(user_id: UserID, symbol: &str, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(shares), 0) FROM transactions WHERE user_id = ?1 AND symbol = ?2",
            (user_id.as_i64(), symbol),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Get the symbols of all stocks a user currently owns shares of, ordered by symbol.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn get_held_symbols(user_id: UserID, connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare(
            "SELECT symbol FROM transactions
             WHERE user_id = ?1
             GROUP BY symbol
             HAVING SUM(shares) > 0
             ORDER BY symbol",
        )?
        .query_map((user_id.as_i64(),), |row| row.get(0))?
        .map(|maybe_symbol| maybe_symbol.map_err(Error::from))
        .collect()
}

/// Get every trade a user has made, most recent first.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn get_history(user_id: UserID, connection: &Connection) -> Result<Vec<LedgerEntry>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, symbol, shares, price, date FROM transactions
             WHERE user_id = ?1
             ORDER BY id DESC",
        )?
        .query_map((user_id.as_i64(),), map_ledger_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}
