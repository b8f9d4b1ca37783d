//! Chart planning and rendering.
//!
//! Planning turns the cleaned tables into [`Chart`] descriptions; a
//! [`ChartRenderer`] then draws them. Rendering is a side channel: a failed
//! chart is logged and the run carries on.

pub mod plan;
mod svg;

pub use plan::{plan_distribution_charts, plan_group_charts};
pub use svg::SvgRenderer;

use anyhow::Result;
use tracing::{error, info};

pub const DEFAULT_BINS: usize = 15;

/// One histogram bucket covering `[start, end)`, or `[start, end]` for the
/// last bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// Bucket counts with a density curve scaled to the same axis.
    Histogram {
        bins: Vec<Bin>,
        density: Vec<(f64, f64)>,
    },
    /// Labelled bars, used both for counts and for grouped means.
    Bars(Vec<(String, f64)>),
    /// Labelled points joined in order.
    Line(Vec<(String, f64)>),
    /// Row-major grid of missing cells, one column per table column.
    MissingHeatmap {
        columns: Vec<String>,
        mask: Vec<Vec<bool>>,
    },
}

impl ChartData {
    fn kind(&self) -> &'static str {
        match self {
            ChartData::Histogram { .. } => "histogram",
            ChartData::Bars(_) => "bar",
            ChartData::Line(_) => "line",
            ChartData::MissingHeatmap { .. } => "missing_heatmap",
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            ChartData::Histogram { bins, .. } => bins.is_empty(),
            ChartData::Bars(points) | ChartData::Line(points) => points.is_empty(),
            ChartData::MissingHeatmap { columns, mask } => columns.is_empty() || mask.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color: (u8, u8, u8),
    pub data: ChartData,
}

impl Chart {
    /// File-name friendly form of the title.
    pub fn slug(&self) -> String {
        self.title
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join("-")
    }
}

pub trait ChartRenderer {
    /// Draws `chart` and returns where it went.
    fn render(&mut self, index: usize, chart: &Chart) -> Result<String>;
}

/// Only logs a one-line description of each chart.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl ChartRenderer for LogRenderer {
    fn render(&mut self, _index: usize, chart: &Chart) -> Result<String> {
        info!(
            chart = %chart.title,
            kind = chart.data.kind(),
            x = %chart.x_label,
            y = %chart.y_label,
            "Chart (rendering disabled)"
        );
        Ok(chart.title.clone())
    }
}

/// Renders every chart, continuing past failures. Returns what was rendered.
pub fn render_all<R: ChartRenderer>(renderer: &mut R, charts: &[Chart]) -> Vec<String> {
    let mut rendered = Vec::new();
    for (index, chart) in charts.iter().enumerate() {
        match renderer.render(index + 1, chart) {
            Ok(location) => rendered.push(location),
            Err(e) => error!(chart = %chart.title, error = %e, "Failed to render chart"),
        }
    }
    rendered
}
