use crate::domain::errors::ParseError;
use crate::domain::sample::{LoadLevel, ResponseTimePoint};
use serde::Deserialize;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::info;

pub const RESPONSE_TIMES_FILE: &str = "response_times.csv";

#[derive(Debug, Deserialize)]
struct ResponseTimeRecord {
    users: String,
    mean_time_ms: String,
}

/// Reads the optional `users,mean_time_ms` table behind the companion trend view.
pub struct ResponseTimeLoader;

impl ResponseTimeLoader {
    /// `Ok(None)` when the file does not exist.
    pub fn load(dir: &Path) -> Result<Option<Vec<ResponseTimePoint>>, ParseError> {
        let path = dir.join(RESPONSE_TIMES_FILE);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No {} found, skipping response-time view", RESPONSE_TIMES_FILE);
                return Ok(None);
            }
            Err(source) => return Err(ParseError::Io { path, source }),
        };
        Self::load_from_reader(file, &path).map(Some)
    }

    pub fn load_from_reader<R: Read>(
        reader: R,
        origin: &Path,
    ) -> Result<Vec<ResponseTimePoint>, ParseError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|source| ParseError::Csv {
                path: origin.to_path_buf(),
                source,
            })?
            .clone();
        for column in ["users", "mean_time_ms"] {
            if !headers.iter().any(|h| h == column) {
                return Err(ParseError::MissingColumn {
                    path: origin.to_path_buf(),
                    column: column.to_string(),
                });
            }
        }

        let mut points = Vec::new();
        for (i, record) in rdr.deserialize::<ResponseTimeRecord>().enumerate() {
            let record = record.map_err(|source| ParseError::Csv {
                path: origin.to_path_buf(),
                source,
            })?;
            let invalid = |column: &str, value: &str| ParseError::InvalidValue {
                path: origin.to_path_buf(),
                row: i + 1,
                column: column.to_string(),
                value: value.to_string(),
            };

            let users = record
                .users
                .parse::<LoadLevel>()
                .ok()
                .filter(|u| *u > 0)
                .ok_or_else(|| invalid("users", &record.users))?;
            let mean_time_ms = record
                .mean_time_ms
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid("mean_time_ms", &record.mean_time_ms))?;

            points.push(ResponseTimePoint {
                users,
                mean_time_ms,
            });
        }

        points.sort_by_key(|p| p.users);
        Ok(points)
    }
}
