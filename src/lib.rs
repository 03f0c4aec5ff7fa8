pub mod axis;
pub mod chart;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod series;
pub mod style;

pub use error::{PlotError, Result};
pub use pipeline::{build_chart, Chart, ChartConfig, ChartLabels};
