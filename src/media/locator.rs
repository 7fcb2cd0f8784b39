/// Process-local locators for live file bytes
///
/// A locator stands in for a file while the process runs. Media items keep one
/// as their playable source and playback sessions create one per caption file.
/// Locators are never persisted; revoking one frees its entry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

use super::file::MediaFile;
use crate::state::data::{MediaItem, SourceLocator};

/// Issues and releases locators
pub trait LocatorRegistry {
    /// Create a new locator for `file`
    fn create(&self, file: &MediaFile) -> SourceLocator;

    /// Look up the file behind a live locator
    fn resolve(&self, locator: &SourceLocator) -> Option<PathBuf>;

    /// Release a locator; unknown or already revoked locators are ignored
    fn revoke(&self, locator: &SourceLocator);

    /// Release the source and caption locators of items that left the catalog
    fn release(&self, items: &[MediaItem]) {
        for item in items {
            for locator in item.source.iter().chain(item.caption.iter()) {
                self.revoke(locator);
            }
        }
    }
}

/// Locators of the form `local:<uuid>`, valid until revoked or process exit
#[derive(Debug, Default)]
pub struct LocalLocators {
    entries: RefCell<HashMap<SourceLocator, PathBuf>>,
}

impl LocalLocators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of locators currently live
    pub fn live_count(&self) -> usize {
        self.entries.borrow().len()
    }
}

impl LocatorRegistry for LocalLocators {
    fn create(&self, file: &MediaFile) -> SourceLocator {
        let locator = SourceLocator(format!("local:{}", Uuid::new_v4()));
        self.entries
            .borrow_mut()
            .insert(locator.clone(), file.path.clone());
        locator
    }

    fn resolve(&self, locator: &SourceLocator) -> Option<PathBuf> {
        self.entries.borrow().get(locator).cloned()
    }

    fn revoke(&self, locator: &SourceLocator) {
        if self.entries.borrow_mut().remove(locator).is_some() {
            tracing::debug!("Revoked locator {}", locator);
        }
    }
}
