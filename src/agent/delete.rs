//! Removing agents together with their transactions.

use rusqlite::Connection;

use crate::{Error, database_id::AgentId};

/// The number of rows removed by [delete_agent].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedAgent {
    pub agents: usize,
    pub transactions: usize,
}

/// Delete the agent `id` and then every transaction that references it.
///
/// The two deletes are separate statements. If the second one fails the
/// agent is gone but its transactions remain; those orphans are excluded
/// from listings and reports since both join through the agent table.
///
/// Deleting an agent that does not exist still removes any transactions
/// left behind with its ID.
///
/// # Errors
/// Returns an [Error::SqlError] if either statement fails.
pub fn delete_agent(id: AgentId, connection: &Connection) -> Result<DeletedAgent, Error> {
    let agents = connection.execute("DELETE FROM agents WHERE id = ?1", [id])?;
    let transactions = connection.execute("DELETE FROM transactions WHERE agent_id = ?1", [id])?;

    Ok(DeletedAgent {
        agents,
        transactions,
    })
}
