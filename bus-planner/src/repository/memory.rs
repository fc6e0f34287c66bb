//! In-memory repository backed by a JSON snapshot.
//!
//! A snapshot directory holds `lines.json` and `stops.json`, each an array of
//! records. This is useful for development and tests without a live store.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::domain::{AreaContext, Category, Line, LineCode, Stop};

use super::StopRepository;
use super::convert::{RepositoryConfig, convert_line, convert_stop};
use super::error::RepositoryError;
use super::records::{LineRecord, StopRecord};

/// Lines file name inside a snapshot directory.
pub const LINES_FILE: &str = "lines.json";

/// Stops file name inside a snapshot directory.
pub const STOPS_FILE: &str = "stops.json";

/// Repository holding a fixed set of lines and stops.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    /// Sorted by code
    lines: Vec<Line>,
    stops: HashMap<LineCode, Vec<Stop>>,
}

impl MemoryRepository {
    /// Build from already-converted lines and stops.
    pub fn new(mut lines: Vec<Line>, stops: Vec<Stop>) -> Self {
        lines.sort_by(|a, b| a.code.cmp(&b.code));
        lines.dedup_by(|a, b| a.code == b.code);

        let mut by_line: HashMap<LineCode, Vec<Stop>> = HashMap::new();
        for stop in stops {
            by_line.entry(stop.line.clone()).or_default().push(stop);
        }

        Self {
            lines,
            stops: by_line,
        }
    }

    /// Build from raw records. Records that fail conversion are skipped.
    pub fn from_records(
        lines: &[LineRecord],
        stops: &[StopRecord],
        config: &RepositoryConfig,
    ) -> Self {
        let lines = lines
            .iter()
            .filter_map(|record| match convert_line(record, config) {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!(code = ?record.codigo, error = %e, "Skipping line record");
                    None
                }
            })
            .collect();

        let stops = stops
            .iter()
            .filter_map(|record| match convert_stop(record, None) {
                Ok(stop) => Some(stop),
                Err(e) => {
                    warn!(code = ?record.codigo, error = %e, "Skipping stop record");
                    None
                }
            })
            .collect();

        Self::new(lines, stops)
    }

    /// Load a snapshot directory containing `lines.json` and `stops.json`.
    pub fn load_dir(
        dir: impl AsRef<Path>,
        config: &RepositoryConfig,
    ) -> Result<Self, RepositoryError> {
        let dir = dir.as_ref();
        let lines: Vec<LineRecord> = read_json(&dir.join(LINES_FILE))?;
        let stops: Vec<StopRecord> = read_json(&dir.join(STOPS_FILE))?;

        let repo = Self::from_records(&lines, &stops, config);
        info!(
            dir = %dir.display(),
            lines = repo.lines.len(),
            stops = repo.stop_count(),
            "Loaded repository snapshot"
        );
        Ok(repo)
    }

    /// Number of lines held.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of stops held across all lines.
    pub fn stop_count(&self) -> usize {
        self.stops.values().map(Vec::len).sum()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RepositoryError> {
    let json = std::fs::read_to_string(path).map_err(|source| RepositoryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|e| RepositoryError::Json {
        message: format!("{}: {e}", path.display()),
    })
}

impl StopRepository for MemoryRepository {
    async fn fetch_lines(
        &self,
        category: Category,
        area: &AreaContext,
    ) -> Result<Vec<Line>, RepositoryError> {
        Ok(self
            .lines
            .iter()
            .filter(|line| line.category == category && line.serves(area))
            .cloned()
            .collect())
    }

    async fn fetch_stops(&self, line: &LineCode) -> Result<Vec<Stop>, RepositoryError> {
        Ok(self.stops.get(line).cloned().unwrap_or_default())
    }

    async fn fetch_line(&self, line: &LineCode) -> Result<Option<Line>, RepositoryError> {
        Ok(self.lines.iter().find(|l| &l.code == line).cloned())
    }
}
