//! The aggregate queries behind each report.

use rusqlite::Connection;

use crate::{
    Error,
    report::kind::{Period, ReportKind},
};

/// One agent's total for a report period.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    /// The agent's name.
    pub agent_name: String,
    /// The summed volume or the transaction count, zero if the agent had no
    /// transactions in the period.
    pub value: f64,
}

/// Get the total for every agent over `period`, largest first.
///
/// Every agent appears exactly once. Agents with equal totals are ordered by
/// their ID.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_report_rows(
    kind: ReportKind,
    period: &Period,
    connection: &Connection,
) -> Result<Vec<AggregateRow>, Error> {
    let aggregate = if kind.is_volume() {
        "COALESCE(SUM(t.volume), 0.0)"
    } else {
        "CAST(COUNT(t.id) AS REAL)"
    };

    let query = format!(
        "SELECT a.name, {aggregate} AS value
        FROM agents a
        LEFT JOIN transactions t
            ON t.agent_id = a.id AND strftime(?1, t.date) = ?2
        GROUP BY a.id
        ORDER BY value DESC, a.id ASC"
    );

    let mut statement = connection.prepare(&query)?;

    statement
        .query_map((period.strftime_format(), period.to_string()), |row| {
            Ok(AggregateRow {
                agent_name: row.get(0)?,
                value: row.get(1)?,
            })
        })?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}
