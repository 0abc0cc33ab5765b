use crate::{
    Error,
    report::{BarChart, ChartRenderer},
};

/// Encodes the chart layout as its debug text so tests can read what would
/// have been drawn.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StubChartRenderer;

impl ChartRenderer for StubChartRenderer {
    fn render(&self, chart: &BarChart) -> Result<Vec<u8>, Error> {
        Ok(format!("{chart:?}").into_bytes())
    }
}
