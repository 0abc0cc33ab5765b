//! The admin page: adding, renaming and removing agents, and adding,
//! removing and searching transactions.

mod action;
mod endpoints;
mod page;

pub use endpoints::{post_admin, post_change_agent_name};
pub use page::get_admin_page;
