//! Defines the core data models and table schema for transactions.

use rusqlite::{Connection, Row};
use time::Date;

use crate::database_id::{AgentId, TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// A sale attributed to one agent, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The agent the transaction is attributed to.
    ///
    /// This is not checked against the agent table.
    pub agent_id: AgentId,
    /// The dollar volume of the sale, never negative.
    pub volume: f64,
    /// When the sale happened.
    pub date: Date,
    /// The address of the property, if any.
    pub address: Option<String>,
}

/// A stored transaction joined with the name of its agent.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub id: TransactionId,
    pub agent_id: AgentId,
    pub agent_name: String,
    pub volume: f64,
    pub date: Date,
    pub address: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table if it does not exist.
///
/// Databases created before addresses were recorded are migrated by adding
/// the `address` column.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY,
            agent_id INTEGER,
            volume REAL NOT NULL,
            date TEXT NOT NULL,
            address TEXT
        )",
        (),
    )?;

    let has_address: bool = connection.query_one(
        "SELECT COUNT(*) > 0 FROM pragma_table_info('transactions') WHERE name = 'address'",
        [],
        |row| row.get(0),
    )?;

    if !has_address {
        connection.execute("ALTER TABLE transactions ADD COLUMN address TEXT", ())?;
    }

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_agent_date
            ON transactions(agent_id, date)",
        (),
    )?;

    Ok(())
}

/// Map a row selected as `id, agent_id, agent_name, volume, date, address`.
pub fn map_transaction_row(row: &Row) -> Result<TransactionRow, rusqlite::Error> {
    Ok(TransactionRow {
        id: row.get(0)?,
        agent_id: row.get(1)?,
        agent_name: row.get(2)?,
        volume: row.get(3)?,
        date: row.get(4)?,
        address: row.get(5)?,
    })
}
