//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    admin::{get_admin_page, post_admin, post_change_agent_name},
    endpoints,
    index_page::get_index_page,
    internal_server_error::get_internal_server_error_page,
    logging::logging_middleware,
    not_found::get_404_not_found,
    report::get_graph,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::GRAPHS, get(get_graph))
        .route(endpoints::ADMIN_VIEW, get(get_admin_page).post(post_admin))
        .route(endpoints::CHANGE_AGENT_NAME, post(post_change_agent_name))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
