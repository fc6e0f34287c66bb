//! Read-only access to lines and stops.
//!
//! The planner sees the store through [`StopRepository`]. Raw records are
//! converted to domain types at this boundary; every backend returns
//! normalised values. Results are fresh snapshots; callers that want
//! caching wrap a backend in [`CachedRepository`].

mod cache;
mod client;
mod convert;
mod error;
mod memory;
mod records;

use std::future::Future;

pub use cache::{CacheConfig, CachedRepository};
pub use client::{HttpRepository, HttpRepositoryConfig};
pub use convert::{RepositoryConfig, StopKind, convert_line, convert_stop};
pub use error::RepositoryError;
pub use memory::{LINES_FILE, MemoryRepository, STOPS_FILE};
pub use records::{LineRecord, StopRecord};

use crate::domain::{AreaContext, Category, Line, LineCode, Stop};

/// Source of lines and stops.
///
/// Each call may suspend on I/O. Futures are `Send` so the stops of several
/// lines can be fetched concurrently.
pub trait StopRepository: Send + Sync {
    /// Lines of `category` serving `area`, sorted by code.
    fn fetch_lines(
        &self,
        category: Category,
        area: &AreaContext,
    ) -> impl Future<Output = Result<Vec<Line>, RepositoryError>> + Send;

    /// All stops of a line, in repository order. Unknown lines have none.
    fn fetch_stops(
        &self,
        line: &LineCode,
    ) -> impl Future<Output = Result<Vec<Stop>, RepositoryError>> + Send;

    /// A single line by code.
    fn fetch_line(
        &self,
        line: &LineCode,
    ) -> impl Future<Output = Result<Option<Line>, RepositoryError>> + Send;
}

/// The backend chosen at startup.
#[derive(Debug, Clone)]
pub enum RepositoryBackend {
    Memory(MemoryRepository),
    Http(HttpRepository),
}

impl StopRepository for RepositoryBackend {
    async fn fetch_lines(
        &self,
        category: Category,
        area: &AreaContext,
    ) -> Result<Vec<Line>, RepositoryError> {
        match self {
            RepositoryBackend::Memory(r) => r.fetch_lines(category, area).await,
            RepositoryBackend::Http(r) => r.fetch_lines(category, area).await,
        }
    }

    async fn fetch_stops(&self, line: &LineCode) -> Result<Vec<Stop>, RepositoryError> {
        match self {
            RepositoryBackend::Memory(r) => r.fetch_stops(line).await,
            RepositoryBackend::Http(r) => r.fetch_stops(line).await,
        }
    }

    async fn fetch_line(&self, line: &LineCode) -> Result<Option<Line>, RepositoryError> {
        match self {
            RepositoryBackend::Memory(r) => r.fetch_line(line).await,
            RepositoryBackend::Http(r) => r.fetch_line(line).await,
        }
    }
}
