use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::data::{MediaId, MediaItem, SourceLocator};
use super::preferences::{PlaybackPreferences, PreferencesPatch};
use super::storage::{MemoryStorage, SqliteStorage, Storage};
use crate::config::{LibraryConfig, STORAGE_KEY};
use crate::error::{Error, Result};

/// Maximum number of items kept in the catalog; the oldest are evicted first
pub const MAX_ITEMS: usize = 50;

/// Immutable view of the catalog at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    /// Newest first
    pub items: Vec<MediaItem>,
    /// Active selection; not validated against `items`
    pub selected: Option<MediaId>,
    pub preferences: PlaybackPreferences,
}

impl CatalogState {
    pub fn item(&self, id: &MediaId) -> Option<&MediaItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    pub fn selected_item(&self) -> Option<&MediaItem> {
        self.selected.as_ref().and_then(|id| self.item(id))
    }
}

/// The durable record, as written
#[derive(Serialize)]
struct PersistedRef<'a> {
    items: &'a [MediaItem],
    preferences: &'a PlaybackPreferences,
}

/// The durable record, as read back
#[derive(Deserialize, Default)]
struct PersistedCatalog {
    #[serde(default)]
    items: Vec<MediaItem>,
    #[serde(default)]
    preferences: PlaybackPreferences,
}

/// Handle returned by `Catalog::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Arc<CatalogState>)>;

/// The Catalog owns the library's items and playback preferences.
///
/// Every mutation produces a new snapshot (copy-on-write), writes the durable
/// record and then notifies observers. Holders of an older snapshot never see
/// it change.
pub struct Catalog {
    state: Arc<CatalogState>,
    storage: Box<dyn Storage>,
    storage_key: String,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl Catalog {
    /// Open the catalog stored in the SQLite database named by `config`
    pub fn open(config: &LibraryConfig) -> Result<Self> {
        let storage = SqliteStorage::open(&config.db_path)?;
        Ok(Self::load(Box::new(storage), &config.storage_key))
    }

    /// A catalog that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStorage::new()), STORAGE_KEY)
    }

    /// Restore the catalog from `storage`.
    ///
    /// A missing record starts an empty library with default preferences. An
    /// unreadable record is logged and treated the same way. Restored items
    /// carry no source locator and must be re-linked before playback.
    pub fn load(storage: Box<dyn Storage>, storage_key: &str) -> Self {
        let persisted = match read_record(storage.as_ref(), storage_key) {
            Ok(record) => record.unwrap_or_default(),
            Err(Error::Serialization(e)) => {
                tracing::warn!("⚠️  Discarding unreadable catalog record: {}", e);
                PersistedCatalog::default()
            }
            Err(e) => {
                tracing::error!("Failed to read catalog record: {}", e);
                PersistedCatalog::default()
            }
        };

        let mut items = persisted.items;
        items.truncate(MAX_ITEMS);
        tracing::info!("🎬 Catalog loaded with {} items", items.len());

        Self {
            state: Arc::new(CatalogState {
                items,
                selected: None,
                preferences: persisted.preferences,
            }),
            storage,
            storage_key: storage_key.to_string(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    // ========== Reads ==========

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<CatalogState> {
        Arc::clone(&self.state)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.state.items
    }

    pub fn item(&self, id: &MediaId) -> Option<&MediaItem> {
        self.state.item(id)
    }

    pub fn selected(&self) -> Option<MediaId> {
        self.state.selected
    }

    pub fn selected_item(&self) -> Option<&MediaItem> {
        self.state.selected_item()
    }

    pub fn preferences(&self) -> &PlaybackPreferences {
        &self.state.preferences
    }

    pub fn len(&self) -> usize {
        self.state.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    // ========== Mutations ==========

    /// Insert an item as the newest entry.
    /// An entry with the same id is replaced; the oldest entries beyond
    /// `MAX_ITEMS` are evicted.
    ///
    /// Returns the entries that left the catalog so their live sources can be
    /// released.
    pub fn add(&mut self, item: MediaItem) -> Vec<MediaItem> {
        let mut dropped = Vec::new();
        self.commit(|state| {
            if let Some(index) = state.items.iter().position(|existing| existing.id == item.id) {
                // Hand back only the locators the new entry stops using
                let mut replaced = state.items.remove(index);
                if replaced.source == item.source {
                    replaced.source = None;
                }
                if replaced.caption == item.caption {
                    replaced.caption = None;
                }
                if replaced.source.is_some() || replaced.caption.is_some() {
                    dropped.push(replaced);
                }
            }
            state.items.insert(0, item);
            if state.items.len() > MAX_ITEMS {
                dropped.extend(state.items.drain(MAX_ITEMS..));
            }
            true
        });

        if !dropped.is_empty() {
            tracing::debug!("Evicted {} items from the catalog", dropped.len());
        }
        dropped
    }

    /// Delete an item, clearing the selection if it pointed at it.
    /// Returns the removed entry.
    pub fn remove(&mut self, id: &MediaId) -> Option<MediaItem> {
        let mut removed = None;
        self.commit(|state| {
            if let Some(index) = state.items.iter().position(|item| item.id == *id) {
                removed = Some(state.items.remove(index));
            }
            let was_selected = state.selected == Some(*id);
            if was_selected {
                state.selected = None;
            }
            removed.is_some() || was_selected
        });
        removed
    }

    /// Set or clear the active selection
    pub fn select(&mut self, id: Option<MediaId>) {
        self.commit(|state| {
            let changed = state.selected != id;
            state.selected = id;
            changed
        });
    }

    /// Record a playback position (seconds) and stamp the item as just played
    pub fn update_progress(&mut self, id: &MediaId, position: f64) {
        if self.item(id).is_none() {
            return;
        }
        self.commit(|state| {
            if let Some(item) = state.items.iter_mut().find(|item| item.id == *id) {
                item.progress = Some(position);
                item.last_played = Some(chrono::Utc::now());
                return true;
            }
            false
        });
    }

    pub fn toggle_favorite(&mut self, id: &MediaId) {
        if self.item(id).is_none() {
            return;
        }
        self.commit(|state| {
            if let Some(item) = state.items.iter_mut().find(|item| item.id == *id) {
                item.favorite = !item.favorite;
                return true;
            }
            false
        });
    }

    /// Merge a partial preferences update
    pub fn update_preferences(&mut self, patch: PreferencesPatch) {
        self.commit(|state| {
            let before = state.preferences;
            state.preferences.merge(patch);
            before != state.preferences
        });
    }

    /// Attach live bytes to an item restored from storage.
    /// Returns the source it replaced, if any.
    pub fn relink_source(&mut self, id: &MediaId, source: SourceLocator) -> Option<SourceLocator> {
        let mut previous = None;
        if self.item(id).is_none() {
            return previous;
        }
        self.commit(|state| {
            match state.items.iter_mut().find(|item| item.id == *id) {
                Some(item) if item.source.as_ref() != Some(&source) => {
                    previous = item.source.replace(source);
                    true
                }
                _ => false,
            }
        });
        previous
    }

    /// Empty the library and clear the selection.
    /// Returns every entry that was in the catalog.
    pub fn clear(&mut self) -> Vec<MediaItem> {
        let mut removed = Vec::new();
        self.commit(|state| {
            let changed = !state.items.is_empty() || state.selected.is_some();
            removed = std::mem::take(&mut state.items);
            state.selected = None;
            changed
        });
        removed
    }

    // ========== Observers ==========

    /// Register a callback invoked with every new snapshot
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&Arc<CatalogState>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.retain(|(existing, _)| *existing != id);
    }

    /// Apply `mutate` to a private copy of the state, then persist and notify.
    /// Nothing happens when `mutate` reports no change.
    fn commit(&mut self, mutate: impl FnOnce(&mut CatalogState) -> bool) {
        let mut next = CatalogState::clone(&self.state);
        if !mutate(&mut next) {
            return;
        }
        self.state = Arc::new(next);
        self.persist();

        for (_, observer) in self.observers.iter_mut() {
            observer(&self.state);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.write_record() {
            tracing::error!("Failed to write catalog record: {}", e);
        }
    }

    fn write_record(&mut self) -> Result<()> {
        let record = PersistedRef {
            items: &self.state.items,
            preferences: &self.state.preferences,
        };
        let json = serde_json::to_string(&record)?;
        self.storage.write(&self.storage_key, &json)
    }
}

/// Read and decode the durable record; `Ok(None)` when nothing was stored yet
fn read_record(storage: &dyn Storage, key: &str) -> Result<Option<PersistedCatalog>> {
    match storage.read(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("items", &self.state.items.len())
            .field("selected", &self.state.selected)
            .field("storage_key", &self.storage_key)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn playable(title: &str) -> MediaItem {
        let mut item = MediaItem::new(title);
        item.source = Some(SourceLocator(format!("local:{title}")));
        item
    }

    fn stored_json(catalog: &Catalog) -> serde_json::Value {
        let raw = catalog.storage().read(STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_add_prepends() {
        let mut catalog = Catalog::in_memory();
        let first = playable("first");
        let second = playable("second");
        catalog.add(first.clone());
        catalog.add(second.clone());

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0].id, second.id);
        assert_eq!(catalog.items()[1].id, first.id);
    }

    #[test]
    fn test_add_with_same_id_replaces() {
        let mut catalog = Catalog::in_memory();
        let original = playable("original");
        catalog.add(original.clone());
        catalog.add(playable("other"));

        let mut renamed = original.clone();
        renamed.title = "renamed".into();
        assert!(catalog.add(renamed).is_empty());

        // Replacing with a different source hands the old entry back
        let mut moved = original.clone();
        moved.source = Some(SourceLocator("local:moved".into()));
        let dropped = catalog.add(moved);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].source, original.source);

        assert_eq!(catalog.len(), 2);
        let matches: Vec<_> = catalog.items().iter().filter(|i| i.id == original.id).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].source, Some(SourceLocator("local:moved".into())));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut catalog = Catalog::in_memory();
        let oldest = playable("0");
        catalog.add(oldest.clone());
        for i in 1..MAX_ITEMS {
            catalog.add(playable(&i.to_string()));
        }
        assert_eq!(catalog.len(), MAX_ITEMS);
        assert!(catalog.item(&oldest.id).is_some());

        let newest = playable("overflow");
        let evicted = catalog.add(newest.clone());

        assert_eq!(evicted, vec![oldest.clone()]);
        assert_eq!(catalog.len(), MAX_ITEMS);
        assert!(catalog.item(&oldest.id).is_none());
        assert_eq!(catalog.items()[0].id, newest.id);
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut catalog = Catalog::in_memory();
        let item = playable("a");
        catalog.add(item.clone());
        catalog.select(Some(item.id));

        let removed = catalog.remove(&item.id);

        assert_eq!(removed.map(|i| i.id), Some(item.id));
        assert!(catalog.is_empty());
        assert_eq!(catalog.selected(), None);
    }

    #[test]
    fn test_remove_other_keeps_selection() {
        let mut catalog = Catalog::in_memory();
        let a = playable("a");
        let b = playable("b");
        catalog.add(a.clone());
        catalog.add(b.clone());
        catalog.select(Some(b.id));

        catalog.remove(&a.id);

        assert_eq!(catalog.selected(), Some(b.id));
        assert_eq!(catalog.selected_item().map(|i| i.id), Some(b.id));
    }

    #[test]
    fn test_select_does_not_validate() {
        let mut catalog = Catalog::in_memory();
        let ghost = MediaId::new();
        catalog.select(Some(ghost));
        assert_eq!(catalog.selected(), Some(ghost));
        assert!(catalog.selected_item().is_none());
        catalog.select(None);
        assert_eq!(catalog.selected(), None);
    }

    #[test]
    fn test_update_progress_touches_only_target() {
        let mut catalog = Catalog::in_memory();
        let a = playable("a");
        let b = playable("b");
        let c = playable("c");
        catalog.add(a.clone());
        catalog.add(b.clone());
        catalog.add(c.clone());
        let before = catalog.snapshot();

        catalog.update_progress(&b.id, 12.5);

        let updated = catalog.item(&b.id).unwrap();
        assert_eq!(updated.progress, Some(12.5));
        assert!(updated.last_played.is_some());
        assert_eq!(catalog.item(&a.id), before.item(&a.id));
        assert_eq!(catalog.item(&c.id), before.item(&c.id));
    }

    #[test]
    fn test_update_progress_unknown_id_is_noop() {
        let mut catalog = Catalog::in_memory();
        catalog.add(playable("a"));
        let before = catalog.snapshot();

        catalog.update_progress(&MediaId::new(), 3.0);

        assert!(Arc::ptr_eq(&before, &catalog.snapshot()));
    }

    #[test]
    fn test_toggle_favorite() {
        let mut catalog = Catalog::in_memory();
        let a = playable("a");
        let b = playable("b");
        catalog.add(a.clone());
        catalog.add(b.clone());

        catalog.toggle_favorite(&b.id);
        assert!(catalog.item(&b.id).unwrap().favorite);
        assert!(!catalog.item(&a.id).unwrap().favorite);

        catalog.toggle_favorite(&b.id);
        assert!(!catalog.item(&b.id).unwrap().favorite);
    }

    #[test]
    fn test_clear() {
        let mut catalog = Catalog::in_memory();
        let a = playable("a");
        catalog.add(a.clone());
        catalog.select(Some(a.id));

        let removed = catalog.clear();

        assert_eq!(removed, vec![a]);
        assert!(catalog.is_empty());
        assert_eq!(catalog.selected(), None);
        assert_eq!(stored_json(&catalog)["items"], serde_json::json!([]));
    }

    #[test]
    fn test_snapshot_is_immutable() {
        let mut catalog = Catalog::in_memory();
        let a = playable("a");
        catalog.add(a.clone());
        let old = catalog.snapshot();

        catalog.toggle_favorite(&a.id);
        catalog.update_progress(&a.id, 9.0);

        assert!(!old.item(&a.id).unwrap().favorite);
        assert_eq!(old.item(&a.id).unwrap().progress, None);
    }

    #[test]
    fn test_persisted_record_has_no_source() {
        let mut catalog = Catalog::in_memory();
        catalog.add(playable("a"));
        catalog.add(playable("b"));

        let raw = catalog.storage().read(STORAGE_KEY).unwrap().unwrap();
        assert!(!raw.contains("local:"));

        let json = stored_json(&catalog);
        assert_eq!(json["items"].as_array().unwrap().len(), 2);
        for item in json["items"].as_array().unwrap() {
            assert!(item.get("source").is_none());
        }
        assert_eq!(json["preferences"]["volume"], serde_json::json!(1.0));
    }

    #[test]
    fn test_preferences_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config = LibraryConfig::with_db_path(dir.path().join("library.db"));
        let item = playable("movie");

        {
            let mut catalog = Catalog::open(&config).unwrap();
            catalog.add(item.clone());
            catalog.update_progress(&item.id, 61.0);
            catalog.update_preferences(PreferencesPatch::volume(0.25));
        }

        let catalog = Catalog::open(&config).unwrap();
        let restored = catalog.item(&item.id).unwrap();
        assert_eq!(restored.title, "movie");
        assert_eq!(restored.progress, Some(61.0));
        assert_eq!(restored.source, None);
        assert!(!restored.is_playable());
        assert_eq!(catalog.preferences().volume, 0.25);
        assert_eq!(catalog.selected(), None);
    }

    #[test]
    fn test_corrupt_record_falls_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        storage.write(STORAGE_KEY, "{not json").unwrap();

        assert!(matches!(
            read_record(&storage, STORAGE_KEY),
            Err(Error::Serialization(_))
        ));

        let catalog = Catalog::load(Box::new(storage), STORAGE_KEY);

        assert!(catalog.is_empty());
        assert_eq!(*catalog.preferences(), PlaybackPreferences::default());
    }

    #[test]
    fn test_relink_source() {
        let mut storage = MemoryStorage::new();
        let item = MediaItem::new("restored");
        let record = serde_json::json!({ "items": [item.clone()], "preferences": {} });
        storage.write(STORAGE_KEY, &record.to_string()).unwrap();

        let mut catalog = Catalog::load(Box::new(storage), STORAGE_KEY);
        assert!(!catalog.item(&item.id).unwrap().is_playable());

        let previous = catalog.relink_source(&item.id, SourceLocator("local:new".into()));
        assert_eq!(previous, None);
        assert!(catalog.item(&item.id).unwrap().is_playable());

        let previous = catalog.relink_source(&item.id, SourceLocator("local:newer".into()));
        assert_eq!(previous, Some(SourceLocator("local:new".into())));

        // Relinking to the current source changes nothing
        let before = catalog.snapshot();
        assert_eq!(catalog.relink_source(&item.id, SourceLocator("local:newer".into())), None);
        assert!(Arc::ptr_eq(&before, &catalog.snapshot()));
    }

    #[test]
    fn test_observers_notified_until_unsubscribed() {
        let mut catalog = Catalog::in_memory();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let subscription =
            catalog.subscribe(move |state| sink.borrow_mut().push(state.items.len()));

        catalog.add(playable("a"));
        catalog.add(playable("b"));
        catalog.unsubscribe(subscription);
        catalog.add(playable("c"));

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
