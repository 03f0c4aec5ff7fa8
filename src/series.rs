use crate::error::{PlotError, Result};
use crate::record::{ConfigKey, Record};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Names one plotted line
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeriesId {
    pub source_tag: Option<String>,
    pub config_key: ConfigKey,
}

impl SeriesId {
    pub fn new(source_tag: Option<&str>, config_key: impl Into<ConfigKey>) -> Self {
        Self {
            source_tag: source_tag.map(str::to_string),
            config_key: config_key.into(),
        }
    }

    /// Legend text, e.g. `linux 4 MB`
    pub fn label(&self, key_suffix: &str) -> String {
        match &self.source_tag {
            Some(tag) => format!("{} {}{}", tag, self.config_key, key_suffix),
            None => format!("{}{}", self.config_key, key_suffix),
        }
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(""))
    }
}

/// A finished line: points strictly increasing by input size
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: SeriesId,
    /// (input_size, throughput)
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn max_throughput(&self) -> f64 {
        self.points
            .iter()
            .map(|&(_, y)| y)
            .fold(0.0_f64, |a, b| a.max(b))
    }
}

/// Group records into series.
///
/// Output order: source tags in first-seen order, then config keys
/// ascending within each tag.
pub fn build(records: &[Record]) -> Result<Vec<Series>> {
    let mut groups: Vec<(Option<String>, BTreeMap<ConfigKey, Vec<(f64, f64)>>)> = Vec::new();

    for record in records {
        let idx = match groups.iter().position(|(tag, _)| *tag == record.source_tag) {
            Some(idx) => idx,
            None => {
                groups.push((record.source_tag.clone(), BTreeMap::new()));
                groups.len() - 1
            }
        };
        groups[idx]
            .1
            .entry(record.config_key.clone())
            .or_default()
            .push((record.input_size, record.throughput));
    }

    let mut series = Vec::new();
    for (source_tag, by_key) in groups {
        for (config_key, mut points) in by_key {
            let id = SeriesId {
                source_tag: source_tag.clone(),
                config_key,
            };

            points.sort_by(|(a, _), (b, _)| a.total_cmp(b));
            if let Some(pair) = points.windows(2).find(|pair| pair[0].0 == pair[1].0) {
                return Err(PlotError::DuplicateInputSize {
                    identity: id,
                    input_size: pair[0].0,
                    first: pair[0].1,
                    second: pair[1].1,
                });
            }

            debug!(series = %id, points = points.len(), "built series");
            series.push(Series { id, points });
        }
    }

    Ok(series)
}

/// Every input size across all series, ascending and deduplicated
pub fn input_sizes(series: &[Series]) -> Vec<f64> {
    let mut sizes: Vec<f64> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|&(x, _)| x))
        .collect();
    sizes.sort_by(|a, b| a.total_cmp(b));
    sizes.dedup();
    sizes
}
