//! Lays out the horizontal bar chart for a report and converts it to an
//! ECharts option.
//!
//! The layout is plain data so that it can be checked without a JavaScript
//! runtime. Tick and bar labels are formatted here and handed to ECharts as
//! lookup tables.

use std::{collections::BTreeMap, sync::OnceLock};

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    datatype::DataPointItem,
    element::{AxisLabel, AxisType, ItemStyle, JsFunction, Label, LabelPosition},
    series::Bar,
};
use numfmt::{Formatter, Precision};

use crate::{
    Error,
    report::{
        kind::{Period, ReportKind},
        query::AggregateRow,
    },
};

/// The label of the bar drawn when a report has no rows.
pub const NO_DATA_LABEL: &str = "no data";

/// The name of the category axis.
pub const CATEGORY_AXIS_NAME: &str = "Agents";

/// The most steps drawn along the value axis.
///
/// Larger values widen the step instead of adding more ticks.
pub const MAX_TICKS: usize = 20;

const PODIUM_COLOURS: [&str; 3] = ["green", "gold", "silver"];
const DEFAULT_COLOUR: &str = "skyblue";

/// A single agent's bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    /// The agent name shown on the category axis.
    pub label: String,
    /// The length of the bar.
    pub value: f64,
    /// The fill colour of the bar.
    pub colour: &'static str,
    /// The text drawn next to the bar, `None` for zero bars.
    pub annotation: Option<String>,
}

/// Everything needed to draw a report as a horizontal bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    /// The chart title.
    pub title: String,
    /// The name of the value axis.
    pub value_axis_name: &'static str,
    /// The bars from largest to smallest.
    pub bars: Vec<ChartBar>,
    /// The distance between value axis ticks.
    pub tick_step: f64,
    /// The end of the value axis.
    pub axis_max: f64,
    /// The value axis ticks and their labels, from zero to `axis_max`.
    pub ticks: Vec<(f64, String)>,
}

impl BarChart {
    /// Lay out `rows` for the report `kind` over `period`.
    ///
    /// Bars are sorted from largest to smallest, keeping the order of `rows`
    /// for equal values. The value axis has at most [MAX_TICKS] steps.
    ///
    /// # Errors
    /// Returns an [Error::ChartRenderError] if a value is infinite or NaN.
    pub fn new(kind: ReportKind, period: &Period, rows: &[AggregateRow]) -> Result<Self, Error> {
        if let Some(row) = rows.iter().find(|row| !row.value.is_finite()) {
            return Err(Error::ChartRenderError(format!(
                "the {kind} total for {} is {}",
                row.agent_name, row.value
            )));
        }

        let mut rows: Vec<(String, f64)> = if rows.is_empty() {
            vec![(NO_DATA_LABEL.to_owned(), 0.0)]
        } else {
            rows.iter()
                .map(|row| (row.agent_name.clone(), row.value))
                .collect()
        };
        rows.sort_by(|(_, a), (_, b)| b.total_cmp(a));

        let bars = rows
            .into_iter()
            .enumerate()
            .map(|(rank, (label, value))| ChartBar {
                label,
                value,
                colour: PODIUM_COLOURS.get(rank).copied().unwrap_or(DEFAULT_COLOUR),
                annotation: (value != 0.0).then(|| format_annotation(kind, value)),
            })
            .collect::<Vec<_>>();

        let max_value = bars.iter().map(|bar| bar.value).fold(0.0, f64::max);
        let (tick_step, step_count) = axis_steps(max_value, kind.tick_step());
        let axis_max = step_count as f64 * tick_step;

        let ticks = (0..=step_count)
            .map(|index| {
                let tick = index as f64 * tick_step;
                (tick, format_tick(kind, tick))
            })
            .collect();

        Ok(Self {
            title: kind.title(period),
            value_axis_name: kind.value_axis_name(),
            bars,
            tick_step,
            axis_max,
            ticks,
        })
    }

    /// Convert the layout to an ECharts option.
    ///
    /// The value axis is pinned to run from zero to [BarChart::axis_max].
    ///
    /// # Errors
    /// Returns an [Error::ChartRenderError] if the label tables could not be
    /// encoded.
    pub fn to_echarts(&self) -> Result<Chart, Error> {
        let names: Vec<String> = self.bars.iter().map(|bar| bar.label.clone()).collect();
        let data: Vec<DataPointItem> = self
            .bars
            .iter()
            .map(|bar| {
                DataPointItem::new(bar.value).item_style(ItemStyle::new().color(bar.colour))
            })
            .collect();

        let annotations: Vec<&str> = self
            .bars
            .iter()
            .map(|bar| bar.annotation.as_deref().unwrap_or_default())
            .collect();
        let tick_labels: BTreeMap<String, &str> = self
            .ticks
            .iter()
            .map(|(tick, label)| (tick.to_string(), label.as_str()))
            .collect();

        let annotations = to_json(&annotations)?;
        let tick_labels = to_json(&tick_labels)?;

        Ok(Chart::new()
            .title(Title::new().text(self.title.as_str()).left("center"))
            .grid(
                Grid::new()
                    .left("3%")
                    .right("10%")
                    .bottom("8%")
                    .contain_label(true),
            )
            .x_axis(
                Axis::new()
                    .type_(AxisType::Value)
                    .name(self.value_axis_name)
                    .min(0.0)
                    .max(self.axis_max)
                    .interval(self.tick_step)
                    .axis_label(AxisLabel::new().formatter(JsFunction::new_with_args(
                        "value",
                        &format!("const labels = {tick_labels}; return labels[value] ?? value;"),
                    ))),
            )
            .y_axis(
                Axis::new()
                    .type_(AxisType::Category)
                    .name(CATEGORY_AXIS_NAME)
                    .inverse(true)
                    .data(names),
            )
            .series(
                Bar::new().data(data).label(
                    Label::new()
                        .show(true)
                        .position(LabelPosition::Right)
                        .formatter(JsFunction::new_with_args(
                            "params",
                            &format!("const labels = {annotations}; return labels[params.dataIndex];"),
                        )),
                ),
            ))
    }
}

/// The tick step and number of steps for an axis that covers `max_value`.
///
/// `step` is multiplied by a whole number when covering `max_value` would
/// take more than [MAX_TICKS] steps.
fn axis_steps(max_value: f64, step: f64) -> (f64, usize) {
    let steps = (max_value / step).ceil().max(1.0);

    let step = if steps > MAX_TICKS as f64 {
        step * (steps / MAX_TICKS as f64).ceil()
    } else {
        step
    };

    let steps = (max_value / step).ceil().clamp(1.0, MAX_TICKS as f64);

    (step, steps as usize)
}

fn to_json(value: &impl serde::Serialize) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|error| Error::ChartRenderError(error.to_string()))
}

fn format_annotation(kind: ReportKind, value: f64) -> String {
    if kind.is_volume() {
        format_currency(value)
    } else {
        format_thousands(value)
    }
}

fn format_tick(kind: ReportKind, tick: f64) -> String {
    if kind == ReportKind::YtdVolume {
        format!("{}M", format_thousands(tick / 1_000_000.0))
    } else {
        format_thousands(tick)
    }
}

/// Format `number` as dollars and cents, e.g. `$1,000.50`.
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let number = (number * 100.0).round() / 100.0;

    let formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "$0.00".to_owned()
    };

    pad_cents(formatted_string)
}

/// numfmt drops trailing zeros after the decimal point, so "12.30" is
/// rendered as "12.3" and "12.00" as "12".
fn pad_cents(mut formatted_string: String) -> String {
    match formatted_string.rfind('.') {
        Some(point) => {
            let decimals = formatted_string.len() - point - 1;
            for _ in decimals..2 {
                formatted_string.push('0');
            }
        }
        None => formatted_string.push_str(".00"),
    }

    formatted_string
}

/// Format `number` rounded to a whole number with commas between each
/// group of three digits, e.g. `1,234,567`.
pub fn format_thousands(number: f64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();

    let fmt = FMT.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .unwrap()
            .precision(Precision::Decimals(0))
    });

    let number = number.round();

    if number == 0.0 {
        "0".to_owned()
    } else {
        fmt.fmt_string(number)
    }
}


#[cfg(test)]
mod echarts_tests {
    use crate::report::{
        kind::{Period, ReportKind},
        query::AggregateRow,
    };

    use super::BarChart;

    fn chart_json(kind: ReportKind, values: &[(&str, f64)]) -> String {
        let rows: Vec<_> = values
            .iter()
            .map(|(name, value)| AggregateRow {
                agent_name: (*name).to_owned(),
                value: *value,
            })
            .collect();
        let period: Period = "2024-12".parse().unwrap();

        BarChart::new(kind, &period, &rows)
            .unwrap()
            .to_echarts()
            .unwrap()
            .to_string()
    }

    #[test]
    fn value_axis_is_pinned_to_layout() {
        let json = chart_json(ReportKind::MonthlyVolume, &[("Alice", 1000.50)]);

        assert!(json.contains("\"min\": 0.0"), "{json}");
        assert!(json.contains("\"max\": 200000.0"), "{json}");
        assert!(json.contains("\"interval\": 200000.0"), "{json}");
        assert!(json.contains(r#"const labels = {"0":"0","200000":"200,000"};"#), "{json}");
    }

    #[test]
    fn largest_bar_is_drawn_at_the_top() {
        let json = chart_json(
            ReportKind::MonthlyTransactions,
            &[("Alice", 1.0), ("Bob", 3.0), ("Cat", 2.0), ("Dan", 4.0)],
        );

        assert!(json.contains("\"inverse\": true"), "{json}");
        let dan = json.find("\"Dan\"").unwrap();
        let bob = json.find("\"Bob\"").unwrap();
        let alice = json.find("\"Alice\"").unwrap();
        assert!(dan < bob && bob < alice, "{json}");
        for colour in ["green", "gold", "silver", "skyblue"] {
            assert!(json.contains(&format!("\"{colour}\"")), "missing {colour}: {json}");
        }
    }

    #[test]
    fn annotations_are_embedded_as_json() {
        let json = chart_json(ReportKind::MonthlyVolume, &[("Alice", 1000.50), ("Bob", 0.0)]);

        assert!(
            json.contains(r#"const labels = ["$1,000.50",""]; return labels[params.dataIndex];"#),
            "{json}"
        );
    }

    #[test]
    fn control_characters_in_names_are_escaped() {
        let json = chart_json(
            ReportKind::MonthlyVolume,
            &[("A\rB", 10.0), ("Bell\u{7}", 5.0)],
        );

        assert!(!json.contains('\r'), "{json:?}");
        assert!(!json.contains('\u{7}'), "{json:?}");
        assert!(json.contains(r#""A\rB""#), "{json}");
    }
}
