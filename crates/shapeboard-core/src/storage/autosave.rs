//! Periodic saving of the open document.

use crate::command::SubscriptionId;
use crate::session::EditorSession;
use crate::storage::{FileStorage, Storage, StorageError, StorageResult};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Key holding a copy of the most recently saved document.
pub const LAST_DOCUMENT_KEY: &str = "__last_document__";

/// Key used until a document is given its own.
pub const DEFAULT_DOCUMENT_KEY: &str = "untitled";

/// Saves a session's document when it has changed and the interval has
/// passed.
///
/// The dirty flag is driven by the session's history notifications, so any
/// recorded edit, undo or redo marks the document as changed.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: Rc<Cell<bool>>,
    document_key: String,
    subscription: Option<SubscriptionId>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: Rc::new(Cell::new(false)),
            document_key: DEFAULT_DOCUMENT_KEY.to_string(),
            subscription: None,
        }
    }

    /// Start tracking changes made in `session`.
    pub fn attach(&mut self, session: &mut EditorSession) {
        self.detach(session);
        let dirty = Rc::clone(&self.dirty);
        self.subscription = Some(session.subscribe(move |_| dirty.set(true)));
    }

    /// Stop tracking `session`.
    pub fn detach(&mut self, session: &mut EditorSession) {
        if let Some(id) = self.subscription.take() {
            session.unsubscribe(id);
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn set_document_key(&mut self, key: impl Into<String>) {
        self.document_key = key.into();
    }

    pub fn document_key(&self) -> &str {
        &self.document_key
    }

    /// Dirty and the interval has elapsed since the last save.
    pub fn should_save(&self) -> bool {
        if !self.is_dirty() {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if [`should_save`](Self::should_save). Returns whether it saved.
    pub async fn maybe_save(&mut self, session: &EditorSession) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(session).await?;
        Ok(true)
    }

    /// Save now, under the document key and as the last document.
    pub async fn save(&mut self, session: &EditorSession) -> StorageResult<()> {
        let json = session
            .save_document()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.save(&self.document_key, &json).await?;
        self.storage.save(LAST_DOCUMENT_KEY, &json).await?;
        self.last_save = Some(Instant::now());
        self.dirty.set(false);
        log::debug!("Auto-saved document '{}'", self.document_key);
        Ok(())
    }

    /// Load the document stored under `key` into `session`.
    ///
    /// Returns `Ok(false)` if nothing is stored there.
    pub async fn restore(&mut self, session: &mut EditorSession, key: &str) -> StorageResult<bool> {
        let Some(json) = self.storage.load(key).await? else {
            return Ok(false);
        };
        session
            .load_document(&json)
            .map_err(|e| StorageError::Serialization(format!("Failed to restore '{key}': {e}")))?;
        if key != LAST_DOCUMENT_KEY {
            self.document_key = key.to_string();
        }
        self.last_save = Some(Instant::now());
        self.dirty.set(false);
        Ok(true)
    }

    /// Load the most recently saved document, if any.
    pub async fn restore_last(&mut self, session: &mut EditorSession) -> StorageResult<bool> {
        self.restore(session, LAST_DOCUMENT_KEY).await
    }

    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        self.storage.delete(key).await
    }

    /// Saved document keys, without the last-document copy.
    pub async fn list_documents(&self) -> StorageResult<Vec<String>> {
        let mut keys = self.storage.list().await?;
        keys.retain(|key| key != LAST_DOCUMENT_KEY);
        Ok(keys)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Auto-save manager over the default file storage.
pub type PlatformAutoSaveManager = AutoSaveManager<FileStorage>;

/// File storage in the platform data directory.
pub fn create_default_storage() -> StorageResult<Arc<FileStorage>> {
    Ok(Arc::new(FileStorage::default_location()?))
}

/// Auto-save manager over [`create_default_storage`].
pub fn create_autosave_manager() -> StorageResult<PlatformAutoSaveManager> {
    Ok(AutoSaveManager::new(create_default_storage()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, ShapeKind, ShapeType};
    use crate::storage::{MemoryStorage, block_on};
    use kurbo::Point;

    fn draw(session: &mut EditorSession) {
        session.start_shape_creation(ShapeType::Rectangle, Point::new(10.0, 10.0));
        session.update_shape_creation(|s| s.kind = ShapeKind::Rectangle(Rectangle::new(5.0, 5.0)));
        session.complete_shape_creation();
    }

    #[test]
    fn test_edits_mark_dirty() {
        let mut session = EditorSession::default();
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.attach(&mut session);
        assert!(!manager.is_dirty());
        assert!(!manager.should_save());

        draw(&mut session);
        assert!(manager.is_dirty());
        assert!(manager.should_save());
    }

    #[test]
    fn test_detach_stops_tracking() {
        let mut session = EditorSession::default();
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.attach(&mut session);
        manager.detach(&mut session);
        draw(&mut session);
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_save_clears_dirty_and_respects_interval() {
        let mut session = EditorSession::default();
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.attach(&mut session);
        draw(&mut session);

        assert!(block_on(manager.maybe_save(&session)).unwrap());
        assert!(!manager.is_dirty());

        draw(&mut session);
        // Interval has not elapsed yet.
        assert!(!block_on(manager.maybe_save(&session)).unwrap());

        manager.set_interval(Duration::ZERO);
        assert!(block_on(manager.maybe_save(&session)).unwrap());
    }

    #[test]
    fn test_restore_round_trip() {
        let storage = Arc::new(MemoryStorage::new());
        let mut session = EditorSession::default();
        let mut manager = AutoSaveManager::new(Arc::clone(&storage));
        manager.set_document_key("plan");
        draw(&mut session);
        block_on(manager.save(&session)).unwrap();

        let mut restored = EditorSession::default();
        let mut other = AutoSaveManager::new(storage);
        other.attach(&mut restored);
        assert!(block_on(other.restore(&mut restored, "plan")).unwrap());
        assert_eq!(restored.shapes(), session.shapes());
        assert_eq!(other.document_key(), "plan");
        assert!(!other.is_dirty());

        let mut last = EditorSession::default();
        assert!(block_on(other.restore_last(&mut last)).unwrap());
        assert_eq!(last.shapes().len(), 1);
    }

    #[test]
    fn test_restore_missing_is_false() {
        let mut session = EditorSession::default();
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        assert!(!block_on(manager.restore(&mut session, "nope")).unwrap());
        assert!(!block_on(manager.restore_last(&mut session)).unwrap());
    }

    #[test]
    fn test_restore_malformed_leaves_session() {
        let storage = Arc::new(MemoryStorage::new());
        block_on(storage.save("broken", "{}")).unwrap();
        let mut session = EditorSession::default();
        draw(&mut session);
        let mut manager = AutoSaveManager::new(storage);
        let result = block_on(manager.restore(&mut session, "broken"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
        assert_eq!(session.shapes().len(), 1);
    }

    #[test]
    fn test_list_excludes_last_document_key() {
        let mut session = EditorSession::default();
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        draw(&mut session);
        block_on(manager.save(&session)).unwrap();
        let list = block_on(manager.list_documents()).unwrap();
        assert_eq!(list, vec![DEFAULT_DOCUMENT_KEY]);
    }
}
