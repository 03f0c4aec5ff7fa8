use crate::axis::{self, AxisPlan, ScaleBase};
use crate::error::Result;
use crate::record::{self, ColumnNames, SourceLocation};
use crate::series::{self, Series, SeriesId};
use crate::style::{self, Styles};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Text drawn around the plot
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    /// Appended to each config key in the legend
    pub key_suffix: String,
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            title: "Throughput for Different Memtable Sizes".to_string(),
            x_label: "Input Data Size (MB)".to_string(),
            y_label: "Throughput (MB/s)".to_string(),
            legend_title: "Memtable Size (MB)".to_string(),
            key_suffix: " MB".to_string(),
        }
    }
}

/// Everything needed to build and draw one chart, loadable from JSON
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub sources: Vec<SourceLocation>,
    #[serde(flatten)]
    pub labels: ChartLabels,
    /// `null` for linear, 2 or 10
    pub log_base: ScaleBase,
    pub columns: ColumnNames,
    pub grid: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            labels: ChartLabels::default(),
            log_base: ScaleBase::Log2,
            columns: ColumnNames::default(),
            grid: false,
            width: 1000,
            height: 600,
        }
    }
}

impl ChartConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

/// A finished chart, ready for a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub series: Vec<Series>,
    pub styles: Styles,
    pub axis: AxisPlan,
    pub labels: ChartLabels,
}

impl Chart {
    /// Largest throughput across all series
    pub fn max_throughput(&self) -> f64 {
        self.series
            .iter()
            .map(Series::max_throughput)
            .fold(0.0_f64, |a, b| a.max(b))
    }
}

/// Load, group, style and plan a chart in one pass. Any failure aborts
/// the whole build.
pub fn build_chart(
    locations: &[SourceLocation],
    columns: &ColumnNames,
    labels: ChartLabels,
    scale: ScaleBase,
) -> Result<Chart> {
    let records = record::load(locations, columns)?;
    let series = series::build(&records)?;

    let ids: Vec<SeriesId> = series.iter().map(|s| s.id.clone()).collect();
    let styles = style::assign(&ids);
    let axis = axis::plan(&series::input_sizes(&series), scale)?;

    info!(
        sources = locations.len(),
        records = records.len(),
        series = series.len(),
        "built chart"
    );

    Ok(Chart {
        series,
        styles,
        axis,
        labels,
    })
}
