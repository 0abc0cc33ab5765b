//! Agents: the people whose transactions are charted.

mod core;
mod create;
mod delete;
mod rename;

pub use self::core::{Agent, create_agent_table, get_all_agents};
pub use create::create_agent;
pub use delete::delete_agent;
pub use rename::rename_agent;
