//! Transactions: dated sales attributed to an agent.

mod core;
mod create;
mod delete;
mod search;

pub use self::core::{NewTransaction, TransactionRow, create_transaction_table};
pub use create::create_transaction;
pub use delete::delete_transaction;
pub use search::search_transactions;
