//! Shared handle: one tracker behind one lock for multi-caller embeddings.
//!
//! Each method holds the lock for its whole call, so no other caller ever
//! sees a tentative grant that is still awaiting its safety verdict.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Error;
use crate::safety::SafeSequence;
use crate::state::{ProcessId, Snapshot};
use crate::tracker::{RequestOutcome, Tracker};

/// Cloneable handle to a tracker shared between callers.
#[derive(Debug, Clone)]
pub struct SharedTracker {
    inner: Arc<Mutex<Tracker>>,
}

impl SharedTracker {
    /// Take ownership of `tracker` and share it.
    pub fn new(tracker: Tracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tracker>, Error> {
        self.inner.lock().map_err(|_| Error::Poisoned)
    }

    /// Submit a request as one critical section.
    pub fn request_resources(
        &self,
        pid: ProcessId,
        request: &[u32],
    ) -> Result<RequestOutcome, Error> {
        Ok(self.lock()?.request_resources(pid, request)?)
    }

    /// Safety verdict of the committed state.
    pub fn check_safety(&self) -> Result<(bool, SafeSequence), Error> {
        Ok(self.lock()?.check_safety())
    }

    /// Owned copy of the committed state.
    pub fn snapshot(&self) -> Result<Snapshot, Error> {
        Ok(self.lock()?.snapshot())
    }

    /// Run `f` against the committed state while holding the lock.
    pub fn with<R>(&self, f: impl FnOnce(&Tracker) -> R) -> Result<R, Error> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }
}

impl From<Tracker> for SharedTracker {
    fn from(tracker: Tracker) -> Self {
        Self::new(tracker)
    }
}
