//! Adding new agents.

use rusqlite::Connection;

use crate::{
    Error,
    agent::core::{Agent, find_agent_id_by_name, is_shared_agent_name, map_duplicate_name_error},
};

/// Insert a new agent called `name` (trimmed).
///
/// Any number of agents may be called "other".
///
/// # Errors
/// Returns:
/// - [Error::EmptyAgentName] if `name` is blank,
/// - [Error::DuplicateAgentName] if an agent with the same name exists,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_agent(name: &str, connection: &Connection) -> Result<Agent, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyAgentName);
    }

    if !is_shared_agent_name(name) && find_agent_id_by_name(name, None, connection)?.is_some() {
        return Err(Error::DuplicateAgentName(name.to_owned()));
    }

    connection
        .execute("INSERT INTO agents (name) VALUES (?1)", [name])
        .map_err(|error| map_duplicate_name_error(error, name))?;

    Ok(Agent {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
    })
}
