//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a row in the agent table.
pub type AgentId = DatabaseId;
/// The ID of a row in the transaction table.
pub type TransactionId = DatabaseId;
