use crate::domain::errors::ParseError;
use crate::domain::sample::{LoadLevel, SampleRow};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const CPU_COLUMN: &str = "cpu_usage";
pub const MEMORY_COLUMN: &str = "memory_usage_percent";

/// Naive formats are read as UTC
const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses one monitoring CSV into typed samples.
pub struct DatasetLoader;

impl DatasetLoader {
    pub fn load(path: &Path, load_level: LoadLevel) -> Result<Vec<SampleRow>, ParseError> {
        let file = File::open(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rows = Self::load_from_reader(file, path, load_level)?;
        debug!("Loaded {} samples from {:?}", rows.len(), path);
        Ok(rows)
    }

    /// `origin` is only used to label errors.
    ///
    /// Rows keep their input order; elapsed seconds are measured from the
    /// earliest timestamp of this source.
    pub fn load_from_reader<R: Read>(
        reader: R,
        origin: &Path,
        load_level: LoadLevel,
    ) -> Result<Vec<SampleRow>, ParseError> {
        let csv_error = |source| ParseError::Csv {
            path: origin.to_path_buf(),
            source,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().map_err(csv_error)?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ParseError::MissingColumn {
                    path: origin.to_path_buf(),
                    column: name.to_string(),
                })
        };
        let ts_idx = column(TIMESTAMP_COLUMN)?;
        let cpu_idx = column(CPU_COLUMN)?;
        let mem_idx = column(MEMORY_COLUMN)?;

        let mut parsed = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record.map_err(csv_error)?;
            let row = i + 1;
            let field = |idx: usize| record.get(idx).unwrap_or("");
            let invalid = |column: &str, value: &str| ParseError::InvalidValue {
                path: origin.to_path_buf(),
                row,
                column: column.to_string(),
                value: value.to_string(),
            };

            let raw_ts = field(ts_idx);
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| invalid(TIMESTAMP_COLUMN, raw_ts))?;

            let raw_cpu = field(cpu_idx);
            let cpu_usage = parse_finite(raw_cpu).ok_or_else(|| invalid(CPU_COLUMN, raw_cpu))?;

            let raw_mem = field(mem_idx);
            let memory_usage_percent =
                parse_finite(raw_mem).ok_or_else(|| invalid(MEMORY_COLUMN, raw_mem))?;

            parsed.push((timestamp, cpu_usage, memory_usage_percent));
        }

        let Some(start) = parsed.iter().map(|(ts, _, _)| *ts).min() else {
            return Ok(Vec::new());
        };

        Ok(parsed
            .into_iter()
            .map(|(timestamp, cpu_usage, memory_usage_percent)| {
                let delta = timestamp - start;
                SampleRow {
                    timestamp,
                    elapsed_seconds: delta.num_seconds() as f64
                        + f64::from(delta.subsec_nanos()) * 1e-9,
                    cpu_usage,
                    memory_usage_percent,
                    load_level,
                }
            })
            .collect())
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
