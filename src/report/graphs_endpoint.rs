//! Serves report charts as PNG images.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, PRAGMA},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    report::{
        cache::ReportCache,
        kind::{Period, ReportKind},
    },
    timezone::current_local_date,
};

/// The state needed to serve report charts.
#[derive(Debug, Clone)]
pub struct GraphState {
    /// The canonical name of the timezone used to work out the current month.
    pub local_timezone: String,
    /// The cache of rendered charts.
    pub report_cache: Arc<ReportCache>,
    /// The database connection for querying report totals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GraphState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            report_cache: state.report_cache.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for a chart request.
#[derive(Debug, Default, Deserialize)]
pub struct GraphQuery {
    /// The report kind, defaults to monthly volume.
    pub graph: Option<String>,
    /// The month as `YYYY-MM`, defaults to the current month.
    pub month: Option<String>,
}

/// A route handler that responds with a report chart as a PNG image.
///
/// The response tells the browser not to cache the image so that it always
/// asks for the latest chart. Charts are drawn on a blocking thread.
pub async fn get_graph(
    State(state): State<GraphState>,
    Query(query): Query<GraphQuery>,
) -> Result<Response, Error> {
    let kind = match query.graph.as_deref() {
        Some(name) => name.parse()?,
        None => ReportKind::DEFAULT,
    };

    let today = current_local_date(&state.local_timezone)?;
    let month = query
        .month
        .filter(|month| !month.trim().is_empty())
        .unwrap_or_else(|| Period::month_of(today).to_string());
    let period = kind.period(&month, today)?;

    let GraphState {
        report_cache,
        db_connection,
        ..
    } = state;

    let image = tokio::task::spawn_blocking(move || {
        report_cache.get_or_render(kind, &period, &db_connection)
    })
    .await
    .map_err(|error| {
        tracing::error!("Rendering report {kind} for {period} did not finish: {error}");
        Error::ChartRenderError(error.to_string())
    })?
    .inspect_err(|error| tracing::error!("Could not get report {kind} for {period}: {error}"))?;

    Ok((
        [
            (CONTENT_TYPE, "image/png"),
            (CACHE_CONTROL, "no-store, no-cache, must-revalidate, max-age=0"),
            (PRAGMA, "no-cache"),
            (EXPIRES, "0"),
        ],
        image,
    )
        .into_response())
}
