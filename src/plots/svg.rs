//! SVG chart output using the plotters SVG backend.

use anyhow::{Context, Result, bail};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use super::{Bin, Chart, ChartData, ChartRenderer};

const SIZE: (u32, u32) = (960, 540);

/// Writes each chart to `<dir>/<index>-<slug>.svg`.
pub struct SvgRenderer {
    dir: PathBuf,
}

impl SvgRenderer {
    /// Creates the output directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create plots directory {}", dir.display()))?;
        Ok(Self { dir })
    }
}

impl ChartRenderer for SvgRenderer {
    fn render(&mut self, index: usize, chart: &Chart) -> Result<String> {
        if chart.data.is_empty() {
            bail!("No data to plot");
        }
        let path = self.dir.join(format!("{index:02}-{}.svg", chart.slug()));
        draw(&path, chart)?;
        Ok(path.display().to_string())
    }
}

fn draw(path: &Path, chart: &Chart) -> Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let (r, g, b) = chart.color;
    let color = RGBColor(r, g, b);

    match &chart.data {
        ChartData::Histogram { bins, density } => {
            draw_histogram(&root, chart, bins, density, color)?
        }
        ChartData::Bars(bars) => draw_labelled(&root, chart, bars, color, false)?,
        ChartData::Line(points) => draw_labelled(&root, chart, points, color, true)?,
        ChartData::MissingHeatmap { columns, mask } => {
            draw_heatmap(&root, chart, columns, mask, color)?
        }
    }

    root.present()?;
    Ok(())
}

type Area<'a> = DrawingArea<SVGBackend<'a>, plotters::coord::Shift>;

fn draw_histogram(
    root: &Area<'_>,
    chart: &Chart,
    bins: &[Bin],
    density: &[(f64, f64)],
    color: RGBColor,
) -> Result<()> {
    let x_min = bins.first().map_or(0.0, |b| b.start);
    let x_max = bins.last().map_or(1.0, |b| b.end);
    let tallest = bins.iter().map(|b| b.count as f64).fold(0.0, f64::max);
    let y_max = density.iter().map(|(_, y)| *y).fold(tallest, f64::max) * 1.1 + 1.0;

    let mut ctx = ChartBuilder::on(root)
        .caption(chart.title.as_str(), ("sans-serif", 24))
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    ctx.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], color.mix(0.6).filled())
    }))?;
    if !density.is_empty() {
        ctx.draw_series(LineSeries::new(density.iter().copied(), color.stroke_width(2)))?;
    }
    Ok(())
}

/// Bars or a line over categorical labels placed at integer x positions.
/// Bar labels are drawn vertically so long category names do not overlap.
fn draw_labelled(
    root: &Area<'_>,
    chart: &Chart,
    points: &[(String, f64)],
    color: RGBColor,
    as_line: bool,
) -> Result<()> {
    let n = points.len();
    let y_lo = points.iter().map(|(_, y)| *y).fold(0.0, f64::min);
    let y_hi = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    let pad = ((y_hi - y_lo) * 0.1).max(1.0);

    let label_at = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        points
            .get(i as usize)
            .map(|(label, _)| label.clone())
            .unwrap_or_default()
    };

    let label_style = if as_line {
        ("sans-serif", 12).into_font()
    } else {
        ("sans-serif", 12).into_font().transform(FontTransform::Rotate90)
    };

    let mut ctx = ChartBuilder::on(root)
        .caption(chart.title.as_str(), ("sans-serif", 24))
        .margin(30)
        .x_label_area_size(if as_line { 60 } else { 120 })
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), (y_lo - pad)..(y_hi + pad))?;

    ctx.configure_mesh()
        .x_labels(n)
        .x_label_formatter(&label_at)
        .x_label_style(label_style)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let xy = || points.iter().enumerate().map(|(i, (_, y))| (i as f64, *y));
    if as_line {
        ctx.draw_series(LineSeries::new(xy(), color.stroke_width(2)))?;
        ctx.draw_series(xy().map(|p| Circle::new(p, 4, color.filled())))?;
    } else {
        ctx.draw_series(xy().map(|(x, y)| {
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, y)], color.filled())
        }))?;
    }
    Ok(())
}

fn draw_heatmap(
    root: &Area<'_>,
    chart: &Chart,
    columns: &[String],
    mask: &[Vec<bool>],
    color: RGBColor,
) -> Result<()> {
    let label_at = |x: &f64| {
        let i = x.floor();
        if i < 0.0 {
            return String::new();
        }
        columns.get(i as usize).cloned().unwrap_or_default()
    };

    let mut ctx = ChartBuilder::on(root)
        .caption(chart.title.as_str(), ("sans-serif", 24))
        .margin(30)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..columns.len() as f64, 0.0..mask.len() as f64)?;

    ctx.configure_mesh()
        .disable_mesh()
        .x_labels(columns.len())
        .x_label_formatter(&label_at)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    let cells = mask.iter().enumerate().flat_map(|(row, flags)| {
        flags
            .iter()
            .enumerate()
            .filter(|(_, missing)| **missing)
            .map(move |(col, _)| (col as f64, row as f64))
    });
    ctx.draw_series(cells.map(|(x, y)| Rectangle::new([(x, y), (x + 1.0, y + 1.0)], color.filled())))?;
    Ok(())
}
