//! Agent Dashboard is a small internal web app for tracking the sales volume
//! of agents.
//!
//! This library serves HTML pages for managing agents and their transactions,
//! and PNG bar charts that rank agents by monthly and year-to-date volume and
//! transaction counts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod admin;
mod agent;
mod alert;
mod app_state;
mod database_id;
mod db;
mod endpoints;
mod html;
mod index_page;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod report;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::{DEMO_AGENT_NAMES, initialize as initialize_db, seed_demo_agents};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use report::{
    AggregateRow, BarChart, CACHE_TTL, CacheEntry, CacheStore, ChartBar, ChartRenderer,
    DirectoryCacheStore, EChartsRenderer, MemoryCacheStore, Period, ReportCache, ReportKind,
    cache_key, get_report_rows, is_fresh,
};
pub use routing::build_router;
pub use timezone::get_local_offset;

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The agent name is already used by another agent.
    #[error("the agent \"{0}\" already exists in the database")]
    DuplicateAgentName(String),

    /// The agent ID does not refer to an agent in the database.
    #[error("the agent could not be found")]
    AgentNotFound,

    /// An empty string (after trimming) was used as an agent name.
    #[error("agent name cannot be empty")]
    EmptyAgentName,

    /// A transaction was submitted with a volume below zero.
    #[error("{0} is a negative volume, which is not allowed")]
    NegativeVolume(f64),

    /// A form field could not be parsed into the expected type.
    #[error("invalid value {value:?} for the field {field}")]
    InvalidFormField {
        /// The name of the form field.
        field: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },

    /// An admin form was submitted without any recognised action.
    #[error("the form did not specify an admin action")]
    MissingAdminAction,

    /// The report kind is not one of the four supported charts.
    #[error("unsupported report kind \"{0}\"")]
    UnsupportedReportKind(String),

    /// The period string could not be parsed as a calendar month `YYYY-MM`.
    #[error("invalid period \"{0}\", expected a month in the format YYYY-MM")]
    InvalidPeriod(String),

    /// The chart could not be rendered as an image.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not render chart: {0}")]
    ChartRenderError(String),

    /// Reading or writing the report cache failed.
    #[error("report cache I/O failed: {0}")]
    CacheIo(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::CacheIo(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::UnsupportedReportKind(kind) => {
                tracing::debug!("rejected request for unsupported report kind {kind:?}");
                (StatusCode::BAD_REQUEST, "Invalid graph type").into_response()
            }
            Error::InvalidPeriod(period) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid month \"{period}\", expected the format YYYY-MM"),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}
