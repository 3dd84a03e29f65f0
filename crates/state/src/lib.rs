//! Local state persistence for AudioReader
//!
//! Settings, per-book progress and per-book bookmarks live in a
//! `KeyValueStore` as JSON records. `Reader` ties them to a
//! `PlaybackController` so every command that changes persisted state also
//! writes it.

mod bookmarks;
mod error;
mod kv;
mod progress;
mod reader;
mod settings;

pub use bookmarks::{BookmarkStore, BOOKMARKS_KEY};
pub use error::{StorageError, StorageResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use progress::{ProgressEntry, ProgressStore, PROGRESS_KEY};
pub use reader::Reader;
pub use settings::{SettingsStore, SETTINGS_KEY};
