//! Persisted reader facade
//!
//! Wraps a `PlaybackController` and keeps local storage in step with it:
//! settings follow speed and volume changes, the position is saved on pause,
//! seek and close (and periodically while playing), and bookmarks are written
//! whenever the list changes. Storage failures are logged and never surface
//! to the caller.

use crate::bookmarks::BookmarkStore;
use crate::kv::KeyValueStore;
use crate::progress::ProgressStore;
use crate::settings::SettingsStore;
use audioreader_config::PlayerConfig;
use audioreader_core::{BookId, Bookmark, BookmarkId, PlaybackSpeed, Settings, Volume};
use media_engine::{
    BookSource, ChapterTarget, EngineResult, EngineState, FrameScheduler, MediaBackend,
    PlaybackController, SeekTarget, TickHandle,
};
use std::time::{Duration, Instant};

pub struct Reader<B: MediaBackend, S: FrameScheduler, K: KeyValueStore> {
    controller: PlaybackController<B, S>,
    settings_store: SettingsStore<K>,
    progress: ProgressStore<K>,
    bookmarks: BookmarkStore<K>,
    settings: Settings,
    resume_threshold: f64,
    autosave_interval: Duration,
    last_saved: Option<Instant>,
}

impl<B, S, K> Reader<B, S, K>
where
    B: MediaBackend,
    S: FrameScheduler,
    K: KeyValueStore + Clone,
{
    pub fn new(controller: PlaybackController<B, S>, kv: K) -> Self {
        Self::with_config(controller, kv, &PlayerConfig::default())
    }

    pub fn with_config(
        controller: PlaybackController<B, S>,
        kv: K,
        config: &PlayerConfig,
    ) -> Self {
        let settings_store = SettingsStore::new(kv.clone());
        let settings = settings_store.load();
        Self {
            controller,
            settings_store,
            progress: ProgressStore::new(kv.clone()),
            bookmarks: BookmarkStore::new(kv),
            settings,
            resume_threshold: config.resume_threshold_secs,
            autosave_interval: config.autosave_interval(),
            last_saved: None,
        }
    }
}

impl<B: MediaBackend, S: FrameScheduler, K: KeyValueStore> Reader<B, S, K> {
    pub fn controller(&self) -> &PlaybackController<B, S> {
        &self.controller
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> EngineState {
        self.controller.state()
    }

    /// Opens a book and resumes where it was left
    ///
    /// Stored speed and volume are applied first. A saved position beyond the
    /// resume threshold is sought to before returning, so the word there is
    /// reported before any `play`. The position in a book that is already
    /// open is saved before it is replaced.
    pub async fn open<Src: BookSource>(
        &mut self,
        source: &Src,
        book_id: &BookId,
    ) -> EngineResult<()> {
        self.save_progress(Instant::now());

        let speed = PlaybackSpeed::clamped(self.settings.playback_speed.value());
        let volume = Volume::clamped(self.settings.volume.value());
        self.controller.set_speed(speed.value())?;
        self.controller.set_volume(volume.value())?;

        self.controller.open(source, book_id).await?;
        self.last_saved = None;

        let bookmarks = self.bookmarks.load(book_id);
        if !bookmarks.is_empty() {
            log::debug!("Restoring {} bookmarks", bookmarks.len());
            self.controller.restore_bookmarks(bookmarks)?;
        }

        let position = self.progress.restore(book_id);
        if position > self.resume_threshold {
            log::info!("Resuming '{}' at {:.1}s", book_id, position);
            self.controller.seek(SeekTarget::Time(position))?;
        }
        Ok(())
    }

    pub fn play(&mut self) -> EngineResult<()> {
        self.controller.play()?;
        self.last_saved = Some(Instant::now());
        Ok(())
    }

    pub fn pause(&mut self) -> EngineResult<()> {
        self.controller.pause()?;
        self.save_progress(Instant::now());
        Ok(())
    }

    /// Play when paused, pause when playing
    pub fn toggle(&mut self) -> EngineResult<()> {
        if self.controller.state() == EngineState::Playing {
            self.pause()
        } else {
            self.play()
        }
    }

    pub fn seek(&mut self, target: SeekTarget) -> EngineResult<f64> {
        let time = self.controller.seek(target)?;
        self.save_progress(Instant::now());
        Ok(time)
    }

    pub fn goto_chapter(&mut self, target: ChapterTarget) -> EngineResult<usize> {
        let index = self.controller.goto_chapter(target)?;
        self.save_progress(Instant::now());
        Ok(index)
    }

    pub fn set_speed(&mut self, speed: f32) -> EngineResult<()> {
        self.controller.set_speed(speed)?;
        self.settings.playback_speed = self.controller.playback().speed;
        self.save_settings();
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) -> EngineResult<()> {
        self.controller.set_volume(volume)?;
        self.settings.volume = self.controller.playback().volume;
        self.save_settings();
        Ok(())
    }

    /// Bookmarks the current position
    pub fn add_bookmark(&mut self, label: impl Into<String>) -> EngineResult<Bookmark> {
        let time = self.controller.current_time();
        let bookmark = self.controller.add_bookmark(time, label)?;
        self.save_bookmarks();
        Ok(bookmark)
    }

    pub fn delete_bookmark(&mut self, id: &BookmarkId) -> EngineResult<Bookmark> {
        let removed = self.controller.delete_bookmark(id)?;
        self.save_bookmarks();
        Ok(removed)
    }

    pub fn rename_bookmark(
        &mut self,
        id: &BookmarkId,
        label: impl Into<String>,
    ) -> EngineResult<()> {
        self.controller.rename_bookmark(id, label)?;
        self.save_bookmarks();
        Ok(())
    }

    /// Saves the position and closes the book
    pub fn close(&mut self) {
        self.save_progress(Instant::now());
        self.controller.close();
        self.last_saved = None;
    }

    pub fn tick(&mut self, handle: TickHandle) -> bool {
        self.tick_at(handle, Instant::now())
    }

    /// Runs a frame and autosaves when due; `now` is the frame time
    pub fn tick_at(&mut self, handle: TickHandle, now: Instant) -> bool {
        if !self.controller.tick(handle) {
            return false;
        }

        match self.controller.state() {
            EngineState::Finished => self.save_progress(now),
            EngineState::Playing => {
                let interval = self.autosave_interval;
                let due = self
                    .last_saved
                    .is_none_or(|saved| now.saturating_duration_since(saved) >= interval);
                if due {
                    self.save_progress(now);
                }
            }
            _ => {}
        }
        true
    }

    fn save_progress(&mut self, now: Instant) {
        let Some(session) = self.controller.session() else {
            return;
        };
        let position = self.controller.current_time();
        if let Err(e) = self.progress.save(session.book_id(), position) {
            log::warn!("Could not save position: {}", e);
        }
        self.last_saved = Some(now);
    }

    fn save_bookmarks(&self) {
        let Some(session) = self.controller.session() else {
            return;
        };
        if let Err(e) = self.bookmarks.save(session.book_id(), self.controller.bookmarks()) {
            log::warn!("Could not save bookmarks: {}", e);
        }
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings_store.save(&self.settings) {
            log::warn!("Could not save settings: {}", e);
        }
    }
}
