/// State management module
///
/// This module handles all library state, including:
/// - The catalog and its mutation rules (library.rs)
/// - Durable storage of the catalog record (storage.rs)
/// - Shared data structures (data.rs)
/// - Playback preferences (preferences.rs)
/// - Read-only projections for the view layer (views.rs)

pub mod data;
pub mod library;
pub mod preferences;
pub mod storage;
pub mod views;
