//! Debounced notes auto-save
//!
//! Each [`NotesAutoSaver::schedule`] call restarts the delay; the snapshot is
//! written once the operator stops typing. Dropping the saver cancels a
//! pending save.

use crate::config::ProgressConfig;
use crate::error::ProgressError;
use crate::store::ProgressStore;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Store shared between the view and background saves
pub type SharedStore = Arc<Mutex<ProgressStore>>;

/// Debounces snapshot writes after notes edits
#[derive(Debug)]
pub struct NotesAutoSaver {
    store: SharedStore,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    last_saved: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl NotesAutoSaver {
    /// Create saver with an explicit delay
    #[must_use]
    pub fn new(store: SharedStore, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: None,
            last_saved: Arc::new(Mutex::new(None)),
        }
    }

    /// Create saver using the configured delay
    #[inline]
    #[must_use]
    pub fn from_config(store: SharedStore, config: &ProgressConfig) -> Self {
        Self::new(store, config.autosave_delay())
    }

    /// Debounce delay
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Time of the last successful save
    #[must_use]
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        *self.last_saved.lock()
    }

    /// Whether a save is waiting for its delay
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Arm the timer, replacing any pending save
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self) {
        self.cancel();
        let store = Arc::clone(&self.store);
        let last_saved = Arc::clone(&self.last_saved);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = save(&store, &last_saved) {
                tracing::warn!("Notes auto-save failed: {}", e);
            }
        }));
    }

    /// Save now and drop any pending save
    ///
    /// # Errors
    /// As [`ProgressStore::save_to_storage`].
    pub fn flush(&mut self) -> Result<(), ProgressError> {
        self.cancel();
        save(&self.store, &self.last_saved)
    }

    /// Drop a pending save without writing
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for NotesAutoSaver {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn save(
    store: &SharedStore,
    last_saved: &Mutex<Option<DateTime<Utc>>>,
) -> Result<(), ProgressError> {
    store.lock().save_to_storage()?;
    *last_saved.lock() = Some(Utc::now());
    tracing::debug!("Notes auto-saved");
    Ok(())
}
