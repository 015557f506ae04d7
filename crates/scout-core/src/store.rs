//! Session-keyed holding area for the records of past scrapes.
//!
//! Older sessions live in a bounded cache and expire after a period without
//! access. The most recent write is also held outside the cache, so it stays
//! readable even when the cache is full or has declined to admit it. Callers
//! that do not pass a session see that latest write.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::RwLock;

use crate::models::JobRecord;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);
pub const DEFAULT_CAPACITY: u64 = 256;

type Records = Arc<Vec<JobRecord>>;

#[derive(Clone)]
pub struct ResultStore {
    sessions: Cache<String, Records>,
    latest: Arc<RwLock<Option<(String, Records)>>>,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl ResultStore {
    pub fn new(time_to_idle: Duration, capacity: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(time_to_idle)
                .build(),
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the records held for `session` and make it the latest session.
    pub async fn put(&self, session: &str, records: Vec<JobRecord>) {
        tracing::debug!(session, count = records.len(), "Storing results");
        let records = Arc::new(records);
        // insert under the write lock: readers see cache and pointer change together
        let mut latest = self.latest.write().await;
        self.sessions
            .insert(session.to_string(), Arc::clone(&records))
            .await;
        *latest = Some((session.to_string(), records));
    }

    /// Clear `session` after a failed scrape.
    pub async fn reset(&self, session: &str) {
        self.put(session, Vec::new()).await;
    }

    /// Records for `session`, or for the most recent session when `None`.
    pub async fn get(&self, session: Option<&str>) -> Option<Records> {
        {
            let latest = self.latest.read().await;
            match (session, latest.as_ref()) {
                (None, None) => return None,
                (None, Some((_, records))) => return Some(Arc::clone(records)),
                (Some(id), Some((key, records))) if key == id => {
                    return Some(Arc::clone(records));
                }
                _ => {}
            }
        }
        let id = session?;
        self.sessions.get(id).await
    }

    /// Number of records that `get(session)` would return.
    pub async fn count(&self, session: Option<&str>) -> usize {
        self.get(session).await.map_or(0, |records| records.len())
    }
}
