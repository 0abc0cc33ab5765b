//! The landing page with a month picker and the four report charts.

use axum::{
    extract::{FromRef, Query, State},
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base,
    },
    report::{Period, ReportKind},
    timezone::current_local_date,
};

/// The state needed to display the landing page.
#[derive(Debug, Clone)]
pub struct IndexPageState {
    /// The canonical name of the timezone used to work out the current month.
    pub local_timezone: String,
}

impl FromRef<AppState> for IndexPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters of the landing page.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// The month to chart as `YYYY-MM`, defaults to the current month.
    pub month: Option<String>,
}

/// Renders the landing page.
///
/// A month that cannot be parsed is replaced with the current month.
pub async fn get_index_page(
    State(state): State<IndexPageState>,
    Query(query): Query<IndexQuery>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;

    let month = query
        .month
        .and_then(|month| month.parse::<Period>().ok())
        .unwrap_or_else(|| Period::month_of(today));

    Ok(Html(index_view(&month, today.year()).into_string()).into_response())
}

fn graph_url(kind: ReportKind, month: &Period) -> String {
    let month = month.to_string();

    match serde_urlencoded::to_string([("graph", kind.as_str()), ("month", month.as_str())]) {
        Ok(query) => format!("{}?{query}", endpoints::GRAPHS),
        Err(error) => {
            tracing::error!("Could not encode the graph query for {kind}: {error}");
            endpoints::GRAPHS.to_owned()
        }
    }
}

fn index_view(month: &Period, current_year: i32) -> Markup {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold" { "Agent Performance" }

            form
                method="get"
                action=(endpoints::ROOT)
                class="flex items-end gap-4"
            {
                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                    input
                        type="month"
                        id="month"
                        name="month"
                        value=(month)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Show" }
            }

            div class="grid w-full grid-cols-1 gap-6 xl:grid-cols-2"
            {
                @for kind in ReportKind::ALL {
                    div class=(CARD_STYLE)
                    {
                        img
                            src=(graph_url(kind, month))
                            alt=(kind.title(&chart_period(kind, month, current_year)))
                            class="w-full h-auto";
                    }
                }
            }
        }
    );

    base("Dashboard", endpoints::ROOT, &[], &content)
}

fn chart_period(kind: ReportKind, month: &Period, current_year: i32) -> Period {
    if kind.is_year_to_date() {
        Period::Year(current_year)
    } else {
        *month
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Query, State},
        response::IntoResponse,
    };
    use scraper::Selector;

    use crate::{
        report::{Period, ReportKind},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        timezone::current_local_date,
    };

    use super::{IndexPageState, IndexQuery, get_index_page, graph_url};

    fn state() -> State<IndexPageState> {
        State(IndexPageState {
            local_timezone: "Etc/UTC".to_owned(),
        })
    }

    async fn image_sources(month: Option<&str>) -> (String, Vec<String>) {
        let response = get_index_page(
            state(),
            Query(IndexQuery {
                month: month.map(str::to_owned),
            }),
        )
        .await
        .into_response();
        assert_status_ok(&response);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let month_value = document
            .select(&Selector::parse("input[name=month]").unwrap())
            .next()
            .and_then(|input| input.value().attr("value"))
            .unwrap_or_default()
            .to_owned();
        let sources = document
            .select(&Selector::parse("img").unwrap())
            .filter_map(|img| img.value().attr("src"))
            .map(str::to_owned)
            .collect();

        (month_value, sources)
    }

    #[tokio::test]
    async fn prefills_current_month() {
        let today = current_local_date("Etc/UTC").unwrap();
        let want_month = Period::month_of(today).to_string();

        let (month, sources) = image_sources(None).await;

        assert_eq!(month, want_month);
        assert_eq!(sources.len(), 4);
        for source in sources {
            assert!(source.ends_with(&format!("month={want_month}")), "{source}");
        }
    }

    #[tokio::test]
    async fn shows_chosen_month() {
        let (month, sources) = image_sources(Some("2024-12")).await;

        assert_eq!(month, "2024-12");
        assert_eq!(
            sources,
            vec![
                "/graphs?graph=monthly_volume&month=2024-12",
                "/graphs?graph=monthly_transactions&month=2024-12",
                "/graphs?graph=ytd_volume&month=2024-12",
                "/graphs?graph=ytd_transactions&month=2024-12",
            ]
        );
    }

    #[tokio::test]
    async fn invalid_month_falls_back_to_current_month() {
        let today = current_local_date("Etc/UTC").unwrap();

        let (month, _) = image_sources(Some("not-a-month")).await;

        assert_eq!(month, Period::month_of(today).to_string());
    }

    #[test]
    fn graph_urls_name_kind_and_month() {
        let month: Period = "2025-01".parse().unwrap();

        assert_eq!(
            graph_url(ReportKind::YtdVolume, &month),
            "/graphs?graph=ytd_volume&month=2025-01"
        );
    }
}
