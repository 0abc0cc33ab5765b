//! Success and error messages shown after an admin action.
//!
//! Admin forms redirect back to the admin page, so the outcome of an action
//! travels in the redirect URL as `status`, `kind` and `message` query
//! parameters and is rendered as a banner above the page content.
//!
//! Anyone can write these parameters into a link, so the message is only
//! ever rendered as escaped text.

use std::fmt::Display;

use maud::{Markup, html};
use serde::Deserialize;

use crate::Error;

/// Why an admin action failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was well formed but broke a rule, e.g. a duplicate name.
    Validation,
    /// The database could not complete the action.
    Persistence,
    /// A form field could not be parsed.
    InvalidInput,
}

impl ErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Persistence => "persistence",
            ErrorKind::InvalidInput => "invalid_input",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        [
            ErrorKind::Validation,
            ErrorKind::Persistence,
            ErrorKind::InvalidInput,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == name)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of an admin action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action succeeded.
    Success {
        /// What was done.
        message: String,
    },
    /// The action failed and nothing was changed.
    Error {
        /// Why the action failed.
        kind: ErrorKind,
        /// What went wrong, in words for the user.
        message: String,
    },
}

/// The query parameters that carry an [Alert] through a redirect.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct AlertQuery {
    /// Either "success" or "error".
    pub status: Option<String>,
    /// The [ErrorKind] of an error alert.
    pub kind: Option<String>,
    /// The alert message.
    pub message: Option<String>,
}

impl Alert {
    /// Create a success alert.
    pub fn success(message: impl Into<String>) -> Self {
        Alert::Success {
            message: message.into(),
        }
    }

    /// The message shown to the user.
    pub fn message(&self) -> &str {
        match self {
            Alert::Success { message } | Alert::Error { message, .. } => message,
        }
    }

    /// The query parameters that encode this alert, in order.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        match self {
            Alert::Success { message } => vec![("status", "success"), ("message", message)],
            Alert::Error { kind, message } => vec![
                ("status", "error"),
                ("kind", kind.as_str()),
                ("message", message),
            ],
        }
    }

    /// Read an alert back from its query parameters.
    ///
    /// Returns `None` if there is no message or the status is not recognised.
    /// An error alert with a missing or unknown kind is treated as a
    /// validation error.
    pub fn from_query(query: &AlertQuery) -> Option<Self> {
        let message = query.message.as_deref()?.trim();
        if message.is_empty() {
            return None;
        }

        match query.status.as_deref()? {
            "success" => Some(Alert::success(message)),
            "error" => Some(Alert::Error {
                kind: query
                    .kind
                    .as_deref()
                    .and_then(ErrorKind::from_name)
                    .unwrap_or(ErrorKind::Validation),
                message: message.to_owned(),
            }),
            _ => None,
        }
    }

    /// Render the alert as a banner.
    pub fn into_html(&self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/alerts/
        let (status, style) = match self {
            Alert::Success { .. } => (
                "success",
                "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
                dark:bg-gray-800 dark:text-green-400",
            ),
            Alert::Error { .. } => (
                "error",
                "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400",
            ),
        };

        html!(
            div
                id="alert"
                role="alert"
                data-status=(status)
                class=(style)
            {
                (self.message())
            }
        )
    }
}

impl From<Error> for Alert {
    fn from(error: Error) -> Self {
        let (kind, message) = match error {
            Error::DuplicateAgentName(name) => (
                ErrorKind::Validation,
                format!("Agent '{name}' already exists. Please choose a different name."),
            ),
            Error::AgentNotFound => (ErrorKind::Validation, "Agent not found.".to_owned()),
            Error::EmptyAgentName => (
                ErrorKind::Validation,
                "Agent name cannot be empty.".to_owned(),
            ),
            Error::NegativeVolume(_) => (
                ErrorKind::Validation,
                "Volume cannot be negative.".to_owned(),
            ),
            Error::InvalidFormField { field, value } => (
                ErrorKind::InvalidInput,
                format!("Invalid value \"{value}\" for {field}."),
            ),
            Error::MissingAdminAction => (
                ErrorKind::InvalidInput,
                "The form did not say what to do.".to_owned(),
            ),
            error => {
                tracing::error!("Admin action failed: {error}");
                (
                    ErrorKind::Persistence,
                    "Could not save your changes. Try again later or check the server logs."
                        .to_owned(),
                )
            }
        };

        Alert::Error { kind, message }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::Error;

    use super::{Alert, AlertQuery, ErrorKind};

    fn query(pairs: &[(&'static str, &str)]) -> AlertQuery {
        let encoded = serde_urlencoded::to_string(pairs).unwrap();
        serde_urlencoded::from_str(&encoded).unwrap()
    }

    #[test]
    fn success_survives_query_string() {
        let alert = Alert::success("Agent 'Bob & Co' added successfully!");

        let decoded = Alert::from_query(&query(&alert.query_pairs()));

        assert_eq!(decoded, Some(alert));
    }

    #[test]
    fn error_keeps_kind() {
        let alert = Alert::Error {
            kind: ErrorKind::InvalidInput,
            message: "Invalid value \"abc\" for volume.".to_owned(),
        };

        let decoded = Alert::from_query(&query(&alert.query_pairs()));

        assert_eq!(decoded, Some(alert));
    }

    #[test]
    fn missing_or_unknown_status_has_no_alert() {
        assert_eq!(Alert::from_query(&AlertQuery::default()), None);
        assert_eq!(
            Alert::from_query(&query(&[("status", "maybe"), ("message", "hello")])),
            None
        );
        assert_eq!(Alert::from_query(&query(&[("status", "success")])), None);
    }

    #[test]
    fn unknown_error_kind_defaults_to_validation() {
        assert_eq!(
            Alert::from_query(&query(&[("status", "error"), ("message", "nope")])),
            Some(Alert::Error {
                kind: ErrorKind::Validation,
                message: "nope".to_owned()
            })
        );
    }

    #[test]
    fn duplicate_name_message() {
        assert_eq!(
            Alert::from(Error::DuplicateAgentName("Bob".to_owned())),
            Alert::Error {
                kind: ErrorKind::Validation,
                message: "Agent 'Bob' already exists. Please choose a different name.".to_owned()
            }
        );
    }

    #[test]
    fn agent_not_found_message() {
        assert_eq!(Alert::from(Error::AgentNotFound).message(), "Agent not found.");
    }

    #[test]
    fn lock_error_is_persistence() {
        assert!(matches!(
            Alert::from(Error::DatabaseLockError),
            Alert::Error {
                kind: ErrorKind::Persistence,
                ..
            }
        ));
    }

    #[test]
    fn renders_banner_with_status() {
        let markup = Alert::success("Agent removed successfully!")
            .into_html()
            .into_string();
        let fragment = Html::parse_fragment(&markup);

        let banner = fragment
            .select(&Selector::parse("#alert").unwrap())
            .next()
            .unwrap();
        assert_eq!(banner.value().attr("data-status"), Some("success"));
        assert_eq!(
            banner.text().collect::<String>().trim(),
            "Agent removed successfully!"
        );
    }
}
