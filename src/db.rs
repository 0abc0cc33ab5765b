//! Creates the application's tables and seeds the demo agents.

use rusqlite::Connection;

use crate::{Error, agent::create_agent_table, transaction::create_transaction_table};

/// The agents inserted into a new database so the charts have something to show.
pub const DEMO_AGENT_NAMES: [&str; 3] = ["Alice", "Bob", "Charlie"];

/// Create the tables for the domain models if they do not exist.
///
/// Calling this on an existing database is safe, it will also add columns
/// that older databases are missing.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    create_agent_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Insert the agents in [DEMO_AGENT_NAMES], skipping any name that already exists.
///
/// Returns the number of agents that were inserted.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn seed_demo_agents(connection: &Connection) -> Result<usize, Error> {
    let mut statement = connection.prepare("INSERT OR IGNORE INTO agents (name) VALUES (?1)")?;

    let mut inserted = 0;
    for name in DEMO_AGENT_NAMES {
        inserted += statement.execute([name])?;
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::report::{AggregateRow, Period, ReportKind, get_report_rows};

    use super::{DEMO_AGENT_NAMES, initialize, seed_demo_agents};

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert_eq!(initialize(&connection), Ok(()));
    }

    #[test]
    fn seeds_demo_agents_once() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let first = seed_demo_agents(&connection).unwrap();
        let second = seed_demo_agents(&connection).unwrap();

        assert_eq!(first, DEMO_AGENT_NAMES.len());
        assert_eq!(second, 0);
        let count: i64 = connection
            .query_one("SELECT COUNT(*) FROM agents", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, DEMO_AGENT_NAMES.len() as i64);
    }

    #[test]
    fn upgrades_database_without_addresses() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute_batch(
                "CREATE TABLE agents (
                    id INTEGER PRIMARY KEY,
                    name TEXT UNIQUE NOT NULL
                );
                CREATE TABLE transactions (
                    id INTEGER PRIMARY KEY,
                    agent_id INTEGER,
                    volume REAL,
                    date TEXT,
                    FOREIGN KEY (agent_id) REFERENCES agents(id)
                );
                INSERT INTO agents (name) VALUES ('Alice');
                INSERT INTO transactions (agent_id, volume, date) VALUES (1, 250.0, '2024-12-03');",
            )
            .unwrap();

        initialize(&connection).unwrap();

        let address: Option<String> = connection
            .query_one("SELECT address FROM transactions WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(address, None);
        let period: Period = "2024-12".parse().unwrap();
        assert_eq!(
            get_report_rows(ReportKind::MonthlyVolume, &period, &connection).unwrap(),
            vec![AggregateRow {
                agent_name: "Alice".to_owned(),
                value: 250.0,
            }]
        );
    }
}
