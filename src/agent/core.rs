use rusqlite::{Connection, OptionalExtension, Row};

use crate::{Error, database_id::AgentId};

/// The one agent name that may be shared by any number of agents.
///
/// Compared case-insensitively.
pub const SHARED_AGENT_NAME: &str = "other";

/// Someone whose transactions are aggregated and charted.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// The ID of the agent.
    pub id: AgentId,
    /// The display name of the agent.
    pub name: String,
}

/// Whether `name` is exempt from the unique agent name rule.
pub fn is_shared_agent_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(SHARED_AGENT_NAME)
}

pub fn create_agent_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS agents (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
        (),
    )?;

    // Names are unique, except for the shared name which any agent may use.
    connection.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_agents_name
            ON agents(name) WHERE lower(name) <> 'other'",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_agent(row: &Row) -> Result<Agent, rusqlite::Error> {
    let id = row.get(0)?;
    let name = row.get(1)?;

    Ok(Agent { id, name })
}

/// Get every agent, oldest first.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_all_agents(connection: &Connection) -> Result<Vec<Agent>, Error> {
    connection
        .prepare("SELECT id, name FROM agents ORDER BY id ASC")?
        .query_map([], map_row_to_agent)?
        .map(|maybe_agent| maybe_agent.map_err(Error::from))
        .collect()
}

/// Get the agent with `id`.
///
/// # Errors
/// Returns [Error::AgentNotFound] if no agent has the ID `id`.
pub fn get_agent(id: AgentId, connection: &Connection) -> Result<Agent, Error> {
    connection
        .query_one(
            "SELECT id, name FROM agents WHERE id = ?1",
            [id],
            map_row_to_agent,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::AgentNotFound,
            error => error.into(),
        })
}

/// Find the ID of an agent named exactly `name`, ignoring the agent `except`.
pub(super) fn find_agent_id_by_name(
    name: &str,
    except: Option<AgentId>,
    connection: &Connection,
) -> Result<Option<AgentId>, Error> {
    connection
        .query_row(
            "SELECT id FROM agents WHERE name = ?1 AND id IS NOT ?2 LIMIT 1",
            (name, except),
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
}

/// Maps a UNIQUE constraint violation on the agent name to [Error::DuplicateAgentName].
pub(super) fn map_duplicate_name_error(error: rusqlite::Error, name: &str) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
            if sql_error.extended_code == 2067 && desc.contains("agents.name") =>
        {
            Error::DuplicateAgentName(name.to_owned())
        }
        error => error.into(),
    }
}
