//! Aggregate reports of agent performance, drawn as bar charts and cached
//! for a few seconds.

mod cache;
mod chart;
mod graphs_endpoint;
mod kind;
mod query;
mod renderer;

pub use cache::{
    CACHE_TTL, CacheEntry, CacheStore, DirectoryCacheStore, MemoryCacheStore, ReportCache,
    cache_key, is_fresh,
};
pub use chart::{BarChart, ChartBar, format_currency};
pub use graphs_endpoint::get_graph;
pub use kind::{Period, ReportKind};
pub use query::{AggregateRow, get_report_rows};
pub use renderer::{ChartRenderer, EChartsRenderer};
