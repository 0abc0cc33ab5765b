use rusqlite::Connection;

use crate::{Error, database_id::TransactionId};

type RowsAffected = usize;

/// Delete the transaction `id`. Deleting a missing transaction is not an error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM transactions WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}
