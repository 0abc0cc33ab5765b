//! The API endpoints URIs.

/// The landing page with the month picker and the report charts.
pub const ROOT: &str = "/";
/// The route for report chart images.
pub const GRAPHS: &str = "/graphs";
/// The page for managing agents and transactions, and the route its forms post to.
pub const ADMIN_VIEW: &str = "/admin";
/// The route for renaming an agent.
pub const CHANGE_AGENT_NAME: &str = "/change_agent_name";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::GRAPHS);
        assert_endpoint_is_valid_uri(endpoints::ADMIN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CHANGE_AGENT_NAME);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
    }
}
