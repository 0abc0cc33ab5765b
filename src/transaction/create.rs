use rusqlite::{Connection, params};

use crate::{Error, database_id::TransactionId, transaction::core::NewTransaction};

/// Insert `transaction` and return its ID.
///
/// The agent ID is stored as given, without checking that the agent exists.
/// A blank address is stored as NULL.
///
/// # Errors
/// Returns:
/// - [Error::NegativeVolume] if the volume is below zero,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<TransactionId, Error> {
    if transaction.volume < 0.0 {
        return Err(Error::NegativeVolume(transaction.volume));
    }

    let address = transaction
        .address
        .as_deref()
        .map(str::trim)
        .filter(|address| !address.is_empty());

    connection.execute(
        "INSERT INTO transactions (agent_id, volume, date, address) VALUES (?1, ?2, ?3, ?4)",
        params![
            transaction.agent_id,
            transaction.volume,
            transaction.date,
            address
        ],
    )?;

    Ok(connection.last_insert_rowid())
}
