//! Renaming agents.

use rusqlite::Connection;

use crate::{
    Error,
    agent::core::{
        Agent, find_agent_id_by_name, get_agent, is_shared_agent_name, map_duplicate_name_error,
    },
    database_id::AgentId,
};

/// The agent before and after a rename.
#[derive(Debug, Clone, PartialEq)]
pub struct RenamedAgent {
    /// The name the agent had before the rename.
    pub old_name: String,
    /// The agent with its new name.
    pub agent: Agent,
}

/// Change the name of the agent `id` to `new_name` (trimmed).
///
/// The name must not be used by any other agent, unless it is the shared
/// name "other" which is always allowed.
///
/// # Errors
/// Returns:
/// - [Error::EmptyAgentName] if `new_name` is blank,
/// - [Error::AgentNotFound] if `id` does not refer to an agent,
/// - [Error::DuplicateAgentName] if another agent already has `new_name`,
/// - [Error::SqlError] if there is some other SQL error.
pub fn rename_agent(
    id: AgentId,
    new_name: &str,
    connection: &Connection,
) -> Result<RenamedAgent, Error> {
    let new_name = new_name.trim();

    if new_name.is_empty() {
        return Err(Error::EmptyAgentName);
    }

    let agent = get_agent(id, connection)?;

    if !is_shared_agent_name(new_name)
        && find_agent_id_by_name(new_name, Some(id), connection)?.is_some()
    {
        return Err(Error::DuplicateAgentName(new_name.to_owned()));
    }

    connection
        .execute(
            "UPDATE agents SET name = ?1 WHERE id = ?2",
            (new_name, id),
        )
        .map_err(|error| map_duplicate_name_error(error, new_name))?;

    Ok(RenamedAgent {
        old_name: agent.name,
        agent: Agent {
            id,
            name: new_name.to_owned(),
        },
    })
}
