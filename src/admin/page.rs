//! The admin page for managing agents and their transactions.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    agent::{Agent, get_all_agents},
    alert::{Alert, AlertQuery},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, SECTION_HEADER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles,
    },
    report::format_currency,
    timezone::current_local_date,
    transaction::{TransactionRow, search_transactions},
};

/// The max number of graphemes to display in the address column before
/// truncating and displaying ellipses.
const MAX_ADDRESS_GRAPHEMES: usize = 32;

/// The state needed to display the admin page.
#[derive(Debug, Clone)]
pub struct AdminPageState {
    /// The canonical name of the timezone used to pre-fill the transaction date.
    pub local_timezone: String,
    /// The database connection for listing agents and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdminPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters of the admin page.
#[derive(Debug, Default, Deserialize)]
pub struct AdminPageQuery {
    /// Only list transactions matching this text.
    pub search_query: Option<String>,
    /// The status of the last admin action.
    pub status: Option<String>,
    /// The kind of error of the last admin action.
    pub kind: Option<String>,
    /// The outcome of the last admin action.
    pub message: Option<String>,
}

/// Renders the admin page with the agents, the matching transactions and the
/// outcome of the last change.
pub async fn get_admin_page(
    State(state): State<AdminPageState>,
    Query(query): Query<AdminPageQuery>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;
    let search_query = query.search_query.unwrap_or_default();
    let alert = Alert::from_query(&AlertQuery {
        status: query.status,
        kind: query.kind,
        message: query.message,
    });

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let agents = get_all_agents(&connection)
        .inspect_err(|error| tracing::error!("Could not get agents: {error}"))?;
    let transactions = search_transactions(&search_query, &connection).inspect_err(|error| {
        tracing::error!("Could not search transactions for {search_query:?}: {error}")
    })?;

    Ok(Html(
        admin_view(
            &agents,
            &transactions,
            &search_query,
            alert.as_ref(),
            today,
        )
        .into_string(),
    )
    .into_response())
}

fn admin_view(
    agents: &[Agent],
    transactions: &[TransactionRow],
    search_query: &str,
    alert: Option<&Alert>,
    today: Date,
) -> Markup {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold" { "Admin" }

            @if let Some(alert) = alert {
                div class="w-full" { (alert.into_html()) }
            }

            (search_form(search_query))

            div class="grid w-full grid-cols-1 gap-6 lg:grid-cols-2"
            {
                (agents_section(agents, search_query))
                (new_transaction_form(agents, search_query, today))
            }

            (transactions_section(transactions, search_query))
        }
    );

    base("Admin", endpoints::ADMIN_VIEW, &[dollar_input_styles()], &content)
}

fn search_query_input(search_query: &str) -> Markup {
    html!(input type="hidden" name="search_query" value=(search_query);)
}

fn search_form(search_query: &str) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::ADMIN_VIEW)
            class="flex w-full items-end gap-4"
        {
            div class="grow"
            {
                label for="search_query" class=(FORM_LABEL_STYLE) { "Search transactions" }
                input
                    type="search"
                    id="search_query"
                    name="search_query"
                    placeholder="Agent, address or date"
                    value=(search_query)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Search" }
        }
    )
}

fn agents_section(agents: &[Agent], search_query: &str) -> Markup {
    html!(
        section class=(CARD_STYLE)
        {
            h2 class=(SECTION_HEADER_STYLE) { "Agents" }

            form
                method="post"
                action=(endpoints::ADMIN_VIEW)
                class="flex items-end gap-4 mb-4"
            {
                (search_query_input(search_query))

                div class="grow"
                {
                    label for="agent_name" class=(FORM_LABEL_STYLE) { "Name" }
                    input
                        type="text"
                        id="agent_name"
                        name="agent_name"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" name="add_agent" value="1" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Add Agent"
                }
            }

            @if agents.is_empty() {
                p { "No agents yet." }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for agent in agents {
                            (agent_row(agent, search_query))
                        }
                    }
                }
            }
        }
    )
}

fn agent_row(agent: &Agent, search_query: &str) -> Markup {
    html!(
        tr class=(TABLE_ROW_STYLE) data-agent-id=(agent.id)
        {
            td class=(TABLE_CELL_STYLE) { (agent.id) }
            td class=(TABLE_CELL_STYLE) { (agent.name) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex items-center gap-4"
                {
                    form
                        method="post"
                        action=(endpoints::CHANGE_AGENT_NAME)
                        class="flex items-center gap-2"
                    {
                        (search_query_input(search_query))
                        input type="hidden" name="agent_id" value=(agent.id);
                        input
                            type="text"
                            name="new_name"
                            aria-label={ "New name for " (agent.name) }
                            placeholder="New name"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                        button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Rename" }
                    }

                    form method="post" action=(endpoints::ADMIN_VIEW)
                    {
                        (search_query_input(search_query))
                        input type="hidden" name="agent_id" value=(agent.id);
                        button
                            type="submit"
                            name="remove_agent"
                            value="1"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Remove"
                        }
                    }
                }
            }
        }
    )
}

fn new_transaction_form(agents: &[Agent], search_query: &str, today: Date) -> Markup {
    html!(
        section class=(CARD_STYLE)
        {
            h2 class=(SECTION_HEADER_STYLE) { "New Transaction" }

            form
                method="post"
                action=(endpoints::ADMIN_VIEW)
                class="flex flex-col gap-4"
            {
                (search_query_input(search_query))

                div
                {
                    label for="transaction_agent_id" class=(FORM_LABEL_STYLE) { "Agent" }
                    select
                        id="transaction_agent_id"
                        name="transaction_agent_id"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for agent in agents {
                            option value=(agent.id) { (agent.name) }
                        }
                    }
                }

                div
                {
                    label for="transaction_volume" class=(FORM_LABEL_STYLE) { "Volume" }
                    div class="input-wrapper"
                    {
                        input
                            type="number"
                            id="transaction_volume"
                            name="transaction_volume"
                            min="0"
                            step="0.01"
                            placeholder="0.00"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="transaction_date" class=(FORM_LABEL_STYLE) { "Date" }
                    input
                        type="date"
                        id="transaction_date"
                        name="transaction_date"
                        value=(today)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="transaction_address" class=(FORM_LABEL_STYLE) { "Address" }
                    input
                        type="text"
                        id="transaction_address"
                        name="transaction_address"
                        placeholder="Optional"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button
                    type="submit"
                    name="add_transaction"
                    value="1"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    "Add Transaction"
                }
            }
        }
    )
}

fn transactions_section(transactions: &[TransactionRow], search_query: &str) -> Markup {
    html!(
        section class=(CARD_STYLE)
        {
            h2 class=(SECTION_HEADER_STYLE) { "Transactions" }

            @if transactions.is_empty() {
                p { "No transactions found." }
            } @else {
                table
                    id="transactions"
                    class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Agent" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Volume" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Address" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            (transaction_row(transaction, search_query))
                        }
                    }
                }
            }
        }
    )
}

fn transaction_row(transaction: &TransactionRow, search_query: &str) -> Markup {
    let address = transaction.address.as_deref().unwrap_or_default();
    let (display_address, full_address) = format_address(address);

    html!(
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE) { (transaction.agent_name) }
            td class=(TABLE_CELL_STYLE) { (format_currency(transaction.volume)) }
            td class=(TABLE_CELL_STYLE) title=[full_address] { (display_address) }
            td class=(TABLE_CELL_STYLE)
            {
                form method="post" action=(endpoints::ADMIN_VIEW)
                {
                    (search_query_input(search_query))
                    input type="hidden" name="transaction_id" value=(transaction.id);
                    button
                        type="submit"
                        name="remove_transaction"
                        value="1"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Remove"
                    }
                }
            }
        }
    )
}

fn format_address(address: &str) -> (String, Option<&str>) {
    let address_length = address.graphemes(true).count();

    if address_length <= MAX_ADDRESS_GRAPHEMES {
        (address.to_owned(), None)
    } else {
        let truncated: String = address
            .graphemes(true)
            .take(MAX_ADDRESS_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(address))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        db::initialize,
        test_utils::{
            assert_form_action, assert_form_input, assert_status_ok,
            assert_form_submit_button_with_text, assert_valid_html, must_get_form_with_field,
            parse_html_document,
        },
        transaction::{NewTransaction, create_transaction},
    };

    use super::{
        AdminPageQuery, AdminPageState, MAX_ADDRESS_GRAPHEMES, format_address, get_admin_page,
    };

    fn get_test_state() -> AdminPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
            .execute("INSERT INTO agents (name) VALUES ('Alice'), ('Bob')", ())
            .unwrap();
        for (agent_id, volume, date, address) in [
            (1, 1000.50, date!(2024 - 12 - 15), Some("1 Spring Road")),
            (2, 250.0, date!(2024 - 11 - 02), None),
        ] {
            create_transaction(
                &NewTransaction {
                    agent_id,
                    volume,
                    date,
                    address: address.map(str::to_owned),
                },
                &connection,
            )
            .unwrap();
        }

        AdminPageState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn get_page(query: AdminPageQuery) -> Html {
        let response = get_admin_page(State(get_test_state()), Query(query))
            .await
            .into_response();
        assert_status_ok(&response);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        document
    }

    fn transaction_rows(document: &Html) -> Vec<String> {
        document
            .select(&Selector::parse("#transactions tbody tr").unwrap())
            .map(|row| row.text().collect::<String>())
            .collect()
    }

    #[tokio::test]
    async fn lists_agents_and_transactions() {
        let document = get_page(AdminPageQuery::default()).await;

        let agents: Vec<_> = document
            .select(&Selector::parse("tr[data-agent-id]").unwrap())
            .collect();
        assert_eq!(agents.len(), 2);

        let rows = transaction_rows(&document);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("2024-12-15"), "{}", rows[0]);
        assert!(rows[0].contains("$1,000.50"), "{}", rows[0]);
        assert!(rows[0].contains("1 Spring Road"), "{}", rows[0]);
        assert!(rows[1].contains("Bob"), "{}", rows[1]);
    }

    #[tokio::test]
    async fn filters_transactions_by_search_query() {
        let document = get_page(AdminPageQuery {
            search_query: Some("spring".to_owned()),
            ..Default::default()
        })
        .await;

        let rows = transaction_rows(&document);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("Alice"));

        let search_input = document
            .select(&Selector::parse("input#search_query").unwrap())
            .next()
            .unwrap();
        assert_eq!(search_input.value().attr("value"), Some("spring"));
    }

    #[tokio::test]
    async fn forms_carry_search_query() {
        let document = get_page(AdminPageQuery {
            search_query: Some("Bob".to_owned()),
            ..Default::default()
        })
        .await;

        for marker in ["add_agent", "add_transaction", "remove_agent", "remove_transaction"] {
            let form = must_get_form_with_field(&document, marker);
            let hidden = form
                .select(&Selector::parse("input[name=search_query]").unwrap())
                .next()
                .unwrap_or_else(|| panic!("form {marker} has no search_query"));
            assert_eq!(hidden.value().attr("value"), Some("Bob"));
        }
    }

    #[tokio::test]
    async fn has_add_agent_form() {
        let document = get_page(AdminPageQuery::default()).await;

        let form = must_get_form_with_field(&document, "add_agent");
        assert_form_action(&form, "post", "/admin");
        assert_form_input(&form, "agent_name", "text");
        assert_form_submit_button_with_text(&form, "Add Agent");
    }

    #[tokio::test]
    async fn has_add_transaction_form() {
        let document = get_page(AdminPageQuery::default()).await;

        let form = must_get_form_with_field(&document, "add_transaction");
        assert_form_action(&form, "post", "/admin");
        assert_form_input(&form, "transaction_volume", "number");
        assert_form_input(&form, "transaction_date", "date");

        let options: Vec<_> = form
            .select(&Selector::parse("select[name=transaction_agent_id] option").unwrap())
            .map(|option| option.text().collect::<String>())
            .collect();
        assert_eq!(options, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn has_rename_form() {
        let document = get_page(AdminPageQuery::default()).await;

        let form = must_get_form_with_field(&document, "new_name");
        assert_form_action(&form, "post", "/change_agent_name");
        assert_form_input(&form, "new_name", "text");
    }

    #[tokio::test]
    async fn shows_alert_from_query() {
        let document = get_page(AdminPageQuery {
            status: Some("error".to_owned()),
            kind: Some("validation".to_owned()),
            message: Some("Agent not found.".to_owned()),
            ..Default::default()
        })
        .await;

        let alert = document
            .select(&Selector::parse("#alert").unwrap())
            .next()
            .expect("no alert");
        assert_eq!(alert.value().attr("data-status"), Some("error"));
        assert_eq!(alert.text().collect::<String>().trim(), "Agent not found.");
    }

    #[tokio::test]
    async fn alert_message_is_shown_as_text() {
        let document = get_page(AdminPageQuery {
            status: Some("success".to_owned()),
            message: Some("<script>alert(1)</script><b>Saved</b>".to_owned()),
            ..Default::default()
        })
        .await;

        let alert = document
            .select(&Selector::parse("#alert").unwrap())
            .next()
            .expect("no alert");
        assert_eq!(
            alert.text().collect::<String>().trim(),
            "<script>alert(1)</script><b>Saved</b>"
        );
        assert!(alert.select(&Selector::parse("script, b").unwrap()).next().is_none());
    }

    #[tokio::test]
    async fn no_alert_without_status() {
        let document = get_page(AdminPageQuery::default()).await;

        assert!(
            document
                .select(&Selector::parse("#alert").unwrap())
                .next()
                .is_none()
        );
    }

    #[test]
    fn long_addresses_are_truncated() {
        let address = "1234 Extremely Long Boulevard Name, Springfield";

        let (display, full) = format_address(address);

        assert_eq!(display.chars().count(), MAX_ADDRESS_GRAPHEMES);
        assert!(display.ends_with("..."));
        assert_eq!(full, Some(address));
    }

    #[test]
    fn short_addresses_are_kept() {
        assert_eq!(format_address("1 Main St"), ("1 Main St".to_owned(), None));
    }
}
