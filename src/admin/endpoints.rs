//! The form handlers of the admin page.
//!
//! Every handler redirects back to the admin page with the outcome in the
//! query string, so reloading the page never repeats the change.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::Redirect,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    admin::action::{AdminAction, AdminForm, RenameAgentForm},
    alert::Alert,
    endpoints,
};

/// The state needed to change agents and transactions.
#[derive(Debug, Clone)]
pub struct AdminActionState {
    /// The database connection for managing agents and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdminActionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for the add and remove forms on the admin page.
pub async fn post_admin(
    State(state): State<AdminActionState>,
    Form(form): Form<AdminForm>,
) -> Redirect {
    let alert = run_action(AdminAction::try_from(&form), &state.db_connection);

    admin_redirect(form.search_query.as_deref(), &alert)
}

/// A route handler for the rename form on the admin page.
pub async fn post_change_agent_name(
    State(state): State<AdminActionState>,
    Form(form): Form<RenameAgentForm>,
) -> Redirect {
    let alert = run_action(AdminAction::try_from(&form), &state.db_connection);

    admin_redirect(form.search_query.as_deref(), &alert)
}

fn run_action(action: Result<AdminAction, Error>, db_connection: &Mutex<Connection>) -> Alert {
    let action = match action {
        Ok(action) => action,
        Err(error) => {
            tracing::debug!("Rejected admin form: {error}");
            return error.into();
        }
    };

    let connection = match db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into();
        }
    };

    match action.apply(&connection) {
        Ok(alert) => {
            tracing::info!("{}", alert.message());
            alert
        }
        Err(error) => {
            tracing::debug!("Admin action failed: {error}");
            error.into()
        }
    }
}

/// Get the redirect back to the admin page showing `alert`, keeping the
/// search the user had open.
pub(crate) fn admin_redirect(search_query: Option<&str>, alert: &Alert) -> Redirect {
    Redirect::to(&admin_redirect_url(search_query, alert))
}

fn admin_redirect_url(search_query: Option<&str>, alert: &Alert) -> String {
    let mut pairs = Vec::new();

    if let Some(search_query) = search_query.filter(|query| !query.trim().is_empty()) {
        pairs.push(("search_query", search_query));
    }
    pairs.extend(alert.query_pairs());

    match serde_urlencoded::to_string(&pairs) {
        Ok(query) => format!("{}?{query}", endpoints::ADMIN_VIEW),
        Err(error) => {
            tracing::error!("Could not encode the admin redirect query: {error}");
            endpoints::ADMIN_VIEW.to_owned()
        }
    }
}


#[cfg(test)]
mod handler_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{
        admin::action::{AdminForm, RenameAgentForm},
        agent::get_all_agents,
        db::initialize,
        test_utils::get_header,
    };

    use super::{AdminActionState, post_admin, post_change_agent_name};

    fn get_test_state() -> AdminActionState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
            .execute("INSERT INTO agents (name) VALUES ('Alice'), ('Bob')", ())
            .unwrap();

        AdminActionState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn add_duplicate_agent_redirects_with_error() {
        let state = get_test_state();

        let response = post_admin(
            State(state.clone()),
            Form(AdminForm {
                add_agent: Some("1".to_owned()),
                agent_name: Some("Bob".to_owned()),
                ..Default::default()
            }),
        )
        .await
        .into_response();

        let location = get_header(&response, "location");
        assert!(location.starts_with("/admin?status=error&kind=validation&message="));
        assert!(location.contains("already+exists"), "{location}");
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_agents(&connection).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_action_redirects_with_error() {
        let response = post_admin(
            State(get_test_state()),
            Form(AdminForm {
                search_query: Some("Bob".to_owned()),
                ..Default::default()
            }),
        )
        .await
        .into_response();

        let location = get_header(&response, "location");
        assert!(
            location.starts_with("/admin?search_query=Bob&status=error&kind=invalid_input"),
            "{location}"
        );
    }

    #[tokio::test]
    async fn rename_redirects_with_success() {
        let state = get_test_state();

        let response = post_change_agent_name(
            State(state.clone()),
            Form(RenameAgentForm {
                agent_id: Some("1".to_owned()),
                new_name: Some("Alicia".to_owned()),
                search_query: None,
            }),
        )
        .await
        .into_response();

        assert_eq!(
            get_header(&response, "location"),
            "/admin?status=success&message=Agent+%27Alice%27+has+been+renamed+to+%27Alicia%27."
        );
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_all_agents(&connection).unwrap()[0].name, "Alicia");
    }
}
