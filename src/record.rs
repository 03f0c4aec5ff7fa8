use crate::error::{PlotError, Result};
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Configuration parameter a measurement was taken under (e.g. a memtable size).
///
/// Numbers sort before text; numbers use the IEEE total order.
#[derive(Debug, Clone)]
pub enum ConfigKey {
    Number(f64),
    Text(String),
}

impl ConfigKey {
    /// Parse a table cell, preferring the numeric form
    pub fn parse(cell: &str) -> Self {
        match cell.parse::<f64>() {
            Ok(value) if value.is_finite() => ConfigKey::Number(value),
            _ => ConfigKey::Text(cell.to_string()),
        }
    }
}

impl Ord for ConfigKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ConfigKey::Number(a), ConfigKey::Number(b)) => a.total_cmp(b),
            (ConfigKey::Number(_), ConfigKey::Text(_)) => Ordering::Less,
            (ConfigKey::Text(_), ConfigKey::Number(_)) => Ordering::Greater,
            (ConfigKey::Text(a), ConfigKey::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for ConfigKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ConfigKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ConfigKey {}

impl From<f64> for ConfigKey {
    fn from(value: f64) -> Self {
        ConfigKey::Number(value)
    }
}

impl From<&str> for ConfigKey {
    fn from(value: &str) -> Self {
        ConfigKey::Text(value.to_string())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // f64's Display never switches to exponent notation
            ConfigKey::Number(value) => write!(f, "{}", value),
            ConfigKey::Text(text) => f.write_str(text),
        }
    }
}

/// One measurement row
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Size of the input data set (x axis)
    pub input_size: f64,
    /// Configuration the run used (one line per key)
    pub config_key: ConfigKey,
    /// Measured throughput (y axis)
    pub throughput: f64,
    /// Dataset the row came from, e.g. an operating system
    pub source_tag: Option<String>,
}

impl Record {
    pub fn new(
        input_size: f64,
        config_key: impl Into<ConfigKey>,
        throughput: f64,
        source_tag: Option<&str>,
    ) -> Self {
        Self {
            input_size,
            config_key: config_key.into(),
            throughput,
            source_tag: source_tag.map(str::to_string),
        }
    }
}

/// Accepted header names for each semantic column. The first alias
/// present in a file's header row wins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub input_size: Vec<String>,
    pub config_key: Vec<String>,
    pub throughput: Vec<String>,
    pub source_tag: Vec<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            input_size: names(&["input_size", "DataSizeMB"]),
            config_key: names(&["config_key", "MemtableSizeMB", "MemtableSize"]),
            throughput: names(&["throughput", "Throughput(MB/s)"]),
            source_tag: names(&["source_tag"]),
        }
    }
}

/// A backing file plus the tag its rows are attributed to
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceLocation {
    #[serde(default)]
    pub tag: Option<String>,
    pub path: PathBuf,
}

impl SourceLocation {
    pub fn new(tag: Option<&str>, path: impl Into<PathBuf>) -> Self {
        Self {
            tag: tag.map(str::to_string),
            path: path.into(),
        }
    }
}

/// Parses `TAG=PATH`, or a bare `PATH` with no tag.
impl FromStr for SourceLocation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (tag, path) = match s.split_once('=') {
            Some((tag, path)) => (Some(tag.trim()), path.trim()),
            None => (None, s.trim()),
        };
        if path.is_empty() {
            return Err(format!("missing path in source '{}'", s));
        }
        if tag.is_some_and(str::is_empty) {
            return Err(format!("empty tag in source '{}'", s));
        }
        Ok(SourceLocation::new(tag, path))
    }
}

/// Load every location in order. Rows are returned as read: no sorting,
/// no deduplication.
pub fn load(locations: &[SourceLocation], columns: &ColumnNames) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for location in locations {
        let file = open(&location.path)?;
        let loaded = read_records(
            file,
            &location.path.display().to_string(),
            location.tag.as_deref(),
            columns,
        )?;
        debug!(
            location = %location.path.display(),
            tag = location.tag.as_deref().unwrap_or("-"),
            rows = loaded.len(),
            "loaded records"
        );
        records.extend(loaded);
    }

    Ok(records)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| PlotError::source_read(path.display().to_string(), e.to_string()))
}

/// Read CSV records from any reader. `location` only labels errors.
pub fn read_records<R: Read>(
    reader: R,
    location: &str,
    tag: Option<&str>,
    columns: &ColumnNames,
) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| PlotError::source_read(location, e.to_string()))?
        .clone();

    let find = |aliases: &[String]| {
        aliases
            .iter()
            .find_map(|alias| headers.iter().position(|h| h == alias.as_str()))
    };
    let require = |aliases: &[String], field: &str| {
        find(aliases).ok_or_else(|| {
            PlotError::source_read(
                location,
                format!("missing required column {} (tried {})", field, aliases.join(", ")),
            )
        })
    };

    let input_idx = require(&columns.input_size, "input_size")?;
    let key_idx = require(&columns.config_key, "config_key")?;
    let throughput_idx = require(&columns.throughput, "throughput")?;
    let tag_idx = find(&columns.source_tag);

    let mut records = Vec::new();
    for (i, row) in csv_reader.records().enumerate() {
        let row_number = i + 1;
        let row = row.map_err(|e| PlotError::source_read(location, e.to_string()))?;

        let cell = |idx: usize, field: &str| {
            row.get(idx)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| {
                    PlotError::source_read(location, format!("row {}: empty {}", row_number, field))
                })
        };
        let number = |idx: usize, field: &str| -> Result<f64> {
            let text = cell(idx, field)?;
            text.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    PlotError::source_read(
                        location,
                        format!("row {}: {} '{}' is not a number", row_number, field, text),
                    )
                })
        };

        let input_size = number(input_idx, "input_size")?;
        if input_size <= 0.0 {
            return Err(PlotError::source_read(
                location,
                format!("row {}: input_size {} must be positive", row_number, input_size),
            ));
        }

        let throughput = number(throughput_idx, "throughput")?;
        if throughput < 0.0 {
            return Err(PlotError::source_read(
                location,
                format!("row {}: throughput {} must not be negative", row_number, throughput),
            ));
        }

        let config_key = ConfigKey::parse(cell(key_idx, "config_key")?);

        let row_tag = tag_idx
            .and_then(|idx| row.get(idx))
            .filter(|t| !t.is_empty());

        records.push(Record {
            input_size,
            config_key,
            throughput,
            source_tag: row_tag.or(tag).map(str::to_string),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_benchmark_headers() {
        let data = "DataSizeMB,MemtableSizeMB,Throughput(MB/s)\n32,4,100.5\n64,4,150\n";
        let records =
            read_records(data.as_bytes(), "mem", Some("linux"), &ColumnNames::default()).unwrap();

        assert_eq!(
            records,
            vec![
                Record::new(32.0, 4.0, 100.5, Some("linux")),
                Record::new(64.0, 4.0, 150.0, Some("linux")),
            ]
        );
    }

    #[test]
    fn test_read_keeps_file_order() {
        let data = "input_size,config_key,throughput\n512,8,1\n32,4,2\n32,4,3\n";
        let records = read_records(data.as_bytes(), "mem", None, &ColumnNames::default()).unwrap();

        let sizes: Vec<f64> = records.iter().map(|r| r.input_size).collect();
        assert_eq!(sizes, vec![512.0, 32.0, 32.0]);
        assert!(records.iter().all(|r| r.source_tag.is_none()));
    }

    #[test]
    fn test_row_tag_overrides_location_tag() {
        let data = "input_size,config_key,throughput,source_tag\n32,4,1,macos\n64,4,2,\n";
        let records =
            read_records(data.as_bytes(), "mem", Some("linux"), &ColumnNames::default()).unwrap();

        assert_eq!(records[0].source_tag.as_deref(), Some("macos"));
        assert_eq!(records[1].source_tag.as_deref(), Some("linux"));
    }

    #[test]
    fn test_missing_column() {
        let data = "DataSizeMB,Throughput(MB/s)\n32,100\n";
        let err = read_records(data.as_bytes(), "scan.csv", None, &ColumnNames::default())
            .unwrap_err();

        match err {
            PlotError::SourceRead { location, reason } => {
                assert_eq!(location, "scan.csv");
                assert!(reason.contains("config_key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_cells() {
        let columns = ColumnNames::default();
        for data in [
            "input_size,config_key,throughput\nabc,4,1\n",
            "input_size,config_key,throughput\n0,4,1\n",
            "input_size,config_key,throughput\n32,4,-1\n",
            "input_size,config_key,throughput\n32,,1\n",
            "input_size,config_key,throughput\n32,4,NaN\n",
        ] {
            let err = read_records(data.as_bytes(), "mem", None, &columns).unwrap_err();
            assert!(matches!(err, PlotError::SourceRead { .. }), "{data}");
        }
    }

    #[test]
    fn test_text_config_key() {
        let data = "input_size,config_key,throughput\n32,small,1\n";
        let records = read_records(data.as_bytes(), "mem", None, &ColumnNames::default()).unwrap();
        assert_eq!(records[0].config_key, ConfigKey::from("small"));
    }

    #[test]
    fn test_config_key_ordering() {
        let mut keys = vec![
            ConfigKey::from("b"),
            ConfigKey::from(16.0),
            ConfigKey::from("a"),
            ConfigKey::from(4.0),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                ConfigKey::from(4.0),
                ConfigKey::from(16.0),
                ConfigKey::from("a"),
                ConfigKey::from("b"),
            ]
        );
        assert_eq!(ConfigKey::from(4.0).to_string(), "4");
        assert_eq!(ConfigKey::from(0.5).to_string(), "0.5");
    }

    #[test]
    fn test_load_multiple_files() {
        let linux = write_csv("DataSizeMB,MemtableSizeMB,Throughput(MB/s)\n32,4,100\n");
        let macos = write_csv("DataSizeMB,MemtableSizeMB,Throughput(MB/s)\n32,4,80\n64,4,90\n");

        let locations = vec![
            SourceLocation::new(Some("linux"), linux.path()),
            SourceLocation::new(Some("macos"), macos.path()),
        ];
        let records = load(&locations, &ColumnNames::default()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].source_tag.as_deref(), Some("linux"));
        assert_eq!(records[2].source_tag.as_deref(), Some("macos"));
    }

    #[test]
    fn test_load_missing_file() {
        let locations = vec![SourceLocation::new(None, "/nonexistent/throughput.csv")];
        let err = load(&locations, &ColumnNames::default()).unwrap_err();

        match err {
            PlotError::SourceRead { location, .. } => {
                assert_eq!(location, "/nonexistent/throughput.csv")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_source_location() {
        let tagged: SourceLocation = "linux=data/linux.csv".parse().unwrap();
        assert_eq!(tagged, SourceLocation::new(Some("linux"), "data/linux.csv"));

        let bare: SourceLocation = "put_throughput.csv".parse().unwrap();
        assert_eq!(bare, SourceLocation::new(None, "put_throughput.csv"));

        assert!("linux=".parse::<SourceLocation>().is_err());
        assert!("=a.csv".parse::<SourceLocation>().is_err());
    }
}
