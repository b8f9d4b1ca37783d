//! Decides which charts to draw from the cleaned tables.

use tracing::info;

use super::{Bin, Chart, ChartData};
use crate::pipeline::{ACCURACY, ACCURACY_NUMERIC, RANK_NUMERIC, RANK_TEXT};
use crate::stats::{Aggregation, NumericSummary, SCORE_COLUMN, value_counts};
use crate::table::Table;

const BLUE: (u8, u8, u8) = (31, 119, 180);
const GREEN: (u8, u8, u8) = (44, 160, 44);
const ORANGE: (u8, u8, u8) = (255, 127, 14);
const VIRIDIS: (u8, u8, u8) = (68, 1, 84);

enum Style {
    Histogram,
    Counts,
}

/// A distribution chart, drawn from `source` when `guard` is present.
struct Signal {
    guard: &'static str,
    source: &'static str,
    title: &'static str,
    x_label: &'static str,
    color: (u8, u8, u8),
    style: Style,
}

const SIGNALS: [Signal; 4] = [
    Signal {
        guard: SCORE_COLUMN,
        source: SCORE_COLUMN,
        title: "Distribution of Scores in Historical Quiz Data",
        x_label: "Score",
        color: BLUE,
        style: Style::Histogram,
    },
    Signal {
        guard: "trophy_level",
        source: "trophy_level",
        title: "Distribution of Trophy Levels",
        x_label: "Trophy Level",
        color: VIRIDIS,
        style: Style::Counts,
    },
    Signal {
        guard: ACCURACY,
        source: ACCURACY_NUMERIC,
        title: "Distribution of Accuracy Percentages",
        x_label: "Accuracy (%)",
        color: GREEN,
        style: Style::Histogram,
    },
    Signal {
        guard: RANK_TEXT,
        source: RANK_NUMERIC,
        title: "Distribution of Rank (Numeric)",
        x_label: "Rank",
        color: ORANGE,
        style: Style::Histogram,
    },
];

/// Points sampled along each density curve.
const DENSITY_POINTS: usize = 100;

/// Splits `values` into `bins` equal-width buckets between their min and max.
/// Non-finite values are not counted.
///
/// A single distinct value gets one unit-wide bucket centred on it.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some(summary) = NumericSummary::from_values(&values) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if summary.min == summary.max {
        return vec![Bin {
            start: summary.min - 0.5,
            end: summary.max + 0.5,
            count: values.len(),
        }];
    }

    let width = (summary.max - summary.min) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: summary.min + width * i as f64,
            end: summary.min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in &values {
        let idx = (((v - summary.min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Gaussian kernel density estimate of `values`, sampled across the span of
/// `bins` and scaled so it sits on the histogram's count axis.
///
/// Bandwidth follows Silverman's rule of thumb. Fewer than two distinct
/// values give no curve.
pub fn density_curve(values: &[f64], bins: &[Bin]) -> Vec<(f64, f64)> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(summary), Some(first), Some(last)) = (
        NumericSummary::from_values(&values),
        bins.first(),
        bins.last(),
    ) else {
        return Vec::new();
    };
    if summary.count < 2 || summary.stddev <= 0.0 {
        return Vec::new();
    }

    let n = summary.count as f64;
    let bandwidth = 1.06 * summary.stddev * n.powf(-0.2);
    let bin_width = first.end - first.start;
    let scale = bin_width / (bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let step = (last.end - first.start) / (DENSITY_POINTS - 1) as f64;
    (0..DENSITY_POINTS)
        .map(|i| {
            let x = first.start + step * i as f64;
            let sum: f64 = values
                .iter()
                .map(|v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum();
            (x, sum * scale)
        })
        .collect()
}

fn missing_heatmap(table: &Table) -> Chart {
    Chart {
        title: "Missing Data Heatmap".to_string(),
        x_label: "Column".to_string(),
        y_label: "Row".to_string(),
        color: BLUE,
        data: ChartData::MissingHeatmap {
            columns: table.column_names().iter().map(|s| s.to_string()).collect(),
            mask: table.missing_mask(),
        },
    }
}

/// One chart per distribution signal of the historical table, falling back to
/// a missing-data heatmap when the signal's column is absent.
pub fn plan_distribution_charts(historical: &Table, bins: usize) -> Vec<Chart> {
    SIGNALS
        .iter()
        .map(|signal| {
            if !historical.has_column(signal.guard) {
                info!(
                    "No '{}' column available. Displaying missing value counts instead.",
                    signal.guard
                );
                return missing_heatmap(historical);
            }

            let (y_label, data) = match signal.style {
                Style::Histogram => {
                    let values = historical
                        .column(signal.source)
                        .map(|c| c.numeric_values())
                        .unwrap_or_default();
                    if let Some(summary) = NumericSummary::from_values(&values) {
                        info!(
                            column = signal.source,
                            count = summary.count,
                            mean = summary.mean,
                            stddev = summary.stddev,
                            min = summary.min,
                            max = summary.max,
                            "Distribution summary"
                        );
                    }
                    let bins = histogram(&values, bins);
                    let density = density_curve(&values, &bins);
                    ("Frequency", ChartData::Histogram { bins, density })
                }
                Style::Counts => {
                    let counts = value_counts(historical, signal.source).unwrap_or_default();
                    let bars = counts
                        .into_iter()
                        .map(|(key, n)| (key.to_string(), n as f64))
                        .collect();
                    ("Count", ChartData::Bars(bars))
                }
            };

            Chart {
                title: signal.title.to_string(),
                x_label: signal.x_label.to_string(),
                y_label: y_label.to_string(),
                color: signal.color,
                data,
            }
        })
        .collect()
}

/// Charts for the grouped score means. Skipped aggregations draw nothing.
pub fn plan_group_charts(breakdowns: &[(&str, Aggregation)]) -> Vec<Chart> {
    breakdowns
        .iter()
        .filter_map(|(_, aggregation)| {
            let Aggregation::Computed(grouped) = aggregation else {
                return None;
            };
            let points: Vec<(String, f64)> = grouped
                .groups
                .iter()
                .filter_map(|g| g.mean.map(|m| (g.key.to_string(), m)))
                .collect();

            let (title, x_label, color, data) = match grouped.by.as_str() {
                "topic" => ("Performance by Topic", "Topic", BLUE, ChartData::Bars(points)),
                "difficulty_level" => (
                    "Performance by Difficulty Level",
                    "Difficulty Level",
                    VIRIDIS,
                    ChartData::Bars(points),
                ),
                "response_accuracy" => (
                    "Performance by Accuracy",
                    "Accuracy",
                    ORANGE,
                    ChartData::Line(points),
                ),
                _ => return None,
            };

            Some(Chart {
                title: title.to_string(),
                x_label: x_label.to_string(),
                y_label: "Average Score".to_string(),
                color,
                data,
            })
        })
        .collect()
}
