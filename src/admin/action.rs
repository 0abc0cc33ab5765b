//! Turns submitted admin forms into actions and applies them.

use std::str::FromStr;

use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{
    Error,
    agent::{create_agent, delete_agent, rename_agent},
    alert::Alert,
    database_id::{AgentId, TransactionId},
    transaction::{NewTransaction, create_transaction, delete_transaction},
};

/// The fields of every form on the admin page that posts to `/admin`.
///
/// Exactly one of the action markers `add_agent`, `add_transaction`,
/// `remove_agent` or `remove_transaction` is expected. Every field is read
/// as text so that bad input becomes an error message instead of a rejected
/// request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AdminForm {
    pub add_agent: Option<String>,
    pub agent_name: Option<String>,

    pub add_transaction: Option<String>,
    pub transaction_agent_id: Option<String>,
    pub transaction_volume: Option<String>,
    pub transaction_date: Option<String>,
    pub transaction_address: Option<String>,

    pub remove_agent: Option<String>,
    pub agent_id: Option<String>,

    pub remove_transaction: Option<String>,
    pub transaction_id: Option<String>,

    /// The search on the admin page when the form was submitted.
    pub search_query: Option<String>,
}

/// The fields of the rename form that posts to `/change_agent_name`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RenameAgentForm {
    pub agent_id: Option<String>,
    pub new_name: Option<String>,
    /// The search on the admin page when the form was submitted.
    pub search_query: Option<String>,
}

/// A change requested from the admin page.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminAction {
    AddAgent { name: String },
    AddTransaction(NewTransaction),
    RemoveAgent { id: AgentId },
    RemoveTransaction { id: TransactionId },
    RenameAgent { id: AgentId, new_name: String },
}

impl TryFrom<&AdminForm> for AdminAction {
    type Error = Error;

    fn try_from(form: &AdminForm) -> Result<Self, Self::Error> {
        if form.add_agent.is_some() {
            Ok(AdminAction::AddAgent {
                name: form.agent_name.clone().unwrap_or_default(),
            })
        } else if form.add_transaction.is_some() {
            let address = form
                .transaction_address
                .as_deref()
                .map(str::trim)
                .filter(|address| !address.is_empty())
                .map(str::to_owned);

            Ok(AdminAction::AddTransaction(NewTransaction {
                agent_id: parse_field("agent", form.transaction_agent_id.as_deref())?,
                volume: parse_volume(form.transaction_volume.as_deref())?,
                date: parse_date(form.transaction_date.as_deref())?,
                address,
            }))
        } else if form.remove_agent.is_some() {
            Ok(AdminAction::RemoveAgent {
                id: parse_field("agent", form.agent_id.as_deref())?,
            })
        } else if form.remove_transaction.is_some() {
            Ok(AdminAction::RemoveTransaction {
                id: parse_field("transaction", form.transaction_id.as_deref())?,
            })
        } else {
            Err(Error::MissingAdminAction)
        }
    }
}

impl TryFrom<&RenameAgentForm> for AdminAction {
    type Error = Error;

    fn try_from(form: &RenameAgentForm) -> Result<Self, Self::Error> {
        Ok(AdminAction::RenameAgent {
            id: parse_field("agent", form.agent_id.as_deref())?,
            new_name: form.new_name.clone().unwrap_or_default(),
        })
    }
}

impl AdminAction {
    /// Apply the action to the database and describe what was done.
    ///
    /// # Errors
    /// Returns the error of the underlying agent or transaction operation.
    pub fn apply(self, connection: &Connection) -> Result<Alert, Error> {
        match self {
            AdminAction::AddAgent { name } => {
                let agent = create_agent(&name, connection)?;
                Ok(Alert::success(format!(
                    "Agent '{}' added successfully!",
                    agent.name
                )))
            }
            AdminAction::AddTransaction(transaction) => {
                create_transaction(&transaction, connection)?;
                Ok(Alert::success("Transaction added successfully!"))
            }
            AdminAction::RemoveAgent { id } => {
                let deleted = delete_agent(id, connection)?;
                tracing::info!(
                    "Removed agent {id} with {} transactions",
                    deleted.transactions
                );
                Ok(Alert::success("Agent removed successfully!"))
            }
            AdminAction::RemoveTransaction { id } => {
                delete_transaction(id, connection)?;
                Ok(Alert::success("Transaction removed successfully!"))
            }
            AdminAction::RenameAgent { id, new_name } => {
                let renamed = rename_agent(id, &new_name, connection)?;
                Ok(Alert::success(format!(
                    "Agent '{}' has been renamed to '{}'.",
                    renamed.old_name, renamed.agent.name
                )))
            }
        }
    }
}

fn parse_field<T: FromStr>(field: &'static str, value: Option<&str>) -> Result<T, Error> {
    let value = value.unwrap_or_default().trim();

    value.parse().map_err(|_| Error::InvalidFormField {
        field,
        value: value.to_owned(),
    })
}

fn parse_volume(value: Option<&str>) -> Result<f64, Error> {
    let volume: f64 = parse_field("volume", value)?;

    if volume.is_finite() {
        Ok(volume)
    } else {
        Err(Error::InvalidFormField {
            field: "volume",
            value: value.unwrap_or_default().trim().to_owned(),
        })
    }
}

fn parse_date(value: Option<&str>) -> Result<Date, Error> {
    let value = value.unwrap_or_default().trim();

    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|_| {
        Error::InvalidFormField {
            field: "date",
            value: value.to_owned(),
        }
    })
}
