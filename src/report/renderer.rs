//! Draws chart layouts as images.
//!
//! [EChartsRenderer] is used by the server. Tests swap in renderers that skip
//! the JavaScript runtime.

use std::fmt::Debug;

use charming::{ImageFormat, ImageRenderer};

use crate::{Error, report::chart::BarChart};

/// The width of rendered report images in pixels.
pub const IMAGE_WIDTH: u32 = 1000;
/// The height of rendered report images in pixels.
pub const IMAGE_HEIGHT: u32 = 600;

/// Encodes a chart layout as image bytes.
pub trait ChartRenderer: Debug + Send + Sync {
    /// Render `chart` to image bytes.
    ///
    /// # Errors
    /// Returns an [Error::ChartRenderError] if the chart could not be drawn.
    fn render(&self, chart: &BarChart) -> Result<Vec<u8>, Error>;
}

/// Draws charts as PNG images with the ECharts server side renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct EChartsRenderer;

impl ChartRenderer for EChartsRenderer {
    fn render(&self, chart: &BarChart) -> Result<Vec<u8>, Error> {
        let option = chart.to_echarts()?;

        // The renderer owns a JavaScript runtime that cannot be shared between threads.
        let mut renderer = ImageRenderer::new(IMAGE_WIDTH, IMAGE_HEIGHT);

        renderer
            .render_format(ImageFormat::Png, &option)
            .map_err(|error| Error::ChartRenderError(format!("{error:?}")))
    }
}
