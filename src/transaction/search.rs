//! Listing and searching transactions for the admin page.

use rusqlite::Connection;

use crate::{
    Error,
    transaction::core::{TransactionRow, map_transaction_row},
};

/// Get the transactions whose agent name, address or date contains `query`,
/// newest first.
///
/// Matching is case-insensitive and `%` or `_` in `query` match literally.
/// A blank `query` matches every transaction. Transactions whose agent no
/// longer exists are never returned.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn search_transactions(query: &str, connection: &Connection) -> Result<Vec<TransactionRow>, Error> {
    let pattern = format!("%{}%", escape_like_pattern(query.trim()));

    let mut statement = connection.prepare(
        "SELECT t.id, t.agent_id, a.name, t.volume, t.date, t.address
        FROM transactions t
        INNER JOIN agents a ON t.agent_id = a.id
        WHERE a.name LIKE ?1 ESCAPE '\\'
            OR t.address LIKE ?1 ESCAPE '\\'
            OR t.date LIKE ?1 ESCAPE '\\'
        ORDER BY t.date DESC, t.id DESC",
    )?;

    statement
        .query_map([pattern], map_transaction_row)?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

fn escape_like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for character in text.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }

    escaped
}
