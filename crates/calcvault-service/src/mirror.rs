//! Optional remote mirroring of calculation history
//!
//! The calculator can push each completed calculation to a remote mirror
//! and pull the remote record back into the local database. Pushes are
//! fire-and-forget: a mirror failure never fails a key press. Vault file
//! contents are never mirrored, only history lines.

use crate::{Error, Result, SharedDb};
use calcvault_storage_sqlite::{HistoryEntry, Repository};

/// A remote store for calculation history.
pub trait RemoteMirror: Send {
    /// Push one history line to the remote store.
    fn push_calculation(&self, entry: &HistoryEntry) -> Result<()>;

    /// Fetch every history line the remote store knows about.
    fn fetch_calculations(&self) -> Result<Vec<HistoryEntry>>;
}

impl<M: RemoteMirror + Sync + ?Sized> RemoteMirror for std::sync::Arc<M> {
    fn push_calculation(&self, entry: &HistoryEntry) -> Result<()> {
        (**self).push_calculation(entry)
    }

    fn fetch_calculations(&self) -> Result<Vec<HistoryEntry>> {
        (**self).fetch_calculations()
    }
}

/// Mirror that drops pushes and has nothing to fetch.
pub struct NoopMirror;

impl RemoteMirror for NoopMirror {
    fn push_calculation(&self, _entry: &HistoryEntry) -> Result<()> {
        Ok(())
    }

    fn fetch_calculations(&self) -> Result<Vec<HistoryEntry>> {
        Ok(Vec::new())
    }
}

/// In-memory mirror backed by a JSON document, for tests and offline use.
#[derive(Default)]
pub struct JsonMirror {
    entries: parking_lot::Mutex<Vec<String>>,
}

impl JsonMirror {
    /// Empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror pre-loaded with existing remote entries.
    pub fn with_entries(entries: &[HistoryEntry]) -> Result<Self> {
        let mirror = Self::new();
        for entry in entries {
            mirror.push_calculation(entry)?;
        }
        Ok(mirror)
    }
}

impl RemoteMirror for JsonMirror {
    fn push_calculation(&self, entry: &HistoryEntry) -> Result<()> {
        let line = serde_json::to_string(entry)?;
        self.entries.lock().push(line);
        Ok(())
    }

    fn fetch_calculations(&self) -> Result<Vec<HistoryEntry>> {
        self.entries
            .lock()
            .iter()
            .map(|line| serde_json::from_str(line).map_err(Error::from))
            .collect()
    }
}

/// Pull remote history into the local database, skipping lines that are
/// already present. Returns how many new lines were merged.
pub fn merge_remote_history(db: &SharedDb, mirror: &dyn RemoteMirror) -> Result<usize> {
    let remote = mirror.fetch_calculations()?;
    let db = db.lock();
    let repo = Repository::new(&db);

    let mut merged = 0;
    for entry in &remote {
        if !repo.calculation_exists(&entry.expression, &entry.result, &entry.timestamp)? {
            repo.insert_calculation_at(&entry.expression, &entry.result, &entry.timestamp)?;
            merged += 1;
        }
    }

    tracing::debug!("Merged {} of {} remote history lines", merged, remote.len());
    Ok(merged)
}
