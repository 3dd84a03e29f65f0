//! Playback controller
//!
//! Owns the open book and is the only place playback state changes. Commands
//! are plain `&mut self` methods; progress is driven by `tick`, which the host
//! calls whenever the `FrameScheduler` fires. Listeners observe everything via
//! `PlayerEvent`s.

use crate::bookmarks::BookmarkList;
use crate::chapters::{ChapterList, ChapterTarget};
use crate::error::{EngineError, EngineResult, PlaybackRejected};
use crate::events::{EventSink, PlayerEvent};
use crate::index::WordIndex;
use crate::media::{MediaBackend, MediaHandle};
use crate::scheduler::{FrameScheduler, TickHandle};
use crate::session::BookSession;
use crate::source::BookSource;
use crate::state::{EngineState, PlaybackState};
use crate::timeline::SegmentTimeline;
use audioreader_core::{
    Alignment, AudioSegment, BookId, Bookmark, BookmarkId, Chapter, PlaybackSpeed, Volume, Word,
};
use crossbeam_channel::Sender;
use std::time::Duration;

/// How long `open` waits for each segment to become ready
pub const DEFAULT_SEGMENT_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Where to move the playhead
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    /// Absolute global time in seconds
    Time(f64),
    /// Percentage of the whole book, 0 - 100
    Percent(f64),
    /// Offset from the current time in seconds
    Relative(f64),
}

pub struct PlaybackController<B: MediaBackend, S: FrameScheduler> {
    backend: B,
    scheduler: S,
    events: EventSink,
    session: Option<BookSession<B::Handle>>,
    state: EngineState,
    playback: PlaybackState,
    pending_tick: Option<TickHandle>,
    ready_timeout: Duration,
}

impl<B: MediaBackend, S: FrameScheduler> PlaybackController<B, S> {
    pub fn new(backend: B, scheduler: S, events: Sender<PlayerEvent>) -> Self {
        Self {
            backend,
            scheduler,
            events: EventSink::new(events),
            session: None,
            state: EngineState::Idle,
            playback: PlaybackState::default(),
            pending_tick: None,
            ready_timeout: DEFAULT_SEGMENT_READY_TIMEOUT,
        }
    }

    /// Sets how long `open` waits for each segment to become ready
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    // ----- snapshots -----

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn session(&self) -> Option<&BookSession<B::Handle>> {
        self.session.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending_tick
    }

    pub fn total_duration(&self) -> f64 {
        self.session
            .as_ref()
            .map_or(0.0, |s| s.timeline.total_duration())
    }

    /// Current position on the global timeline, in seconds
    pub fn current_time(&self) -> f64 {
        let Some(session) = self.session.as_ref() else {
            return 0.0;
        };
        let index = self.playback.active_segment_index;
        session.handles.get(index).map_or(0.0, |handle| {
            session
                .timeline
                .to_global(index, handle.current_time())
                .clamp(0.0, session.timeline.total_duration())
        })
    }

    /// The last word reported to listeners
    pub fn current_word(&self) -> Option<(usize, &Word)> {
        let session = self.session.as_ref()?;
        let index = session.current_word?;
        session.words.get(index).map(|word| (index, word))
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.session.as_ref()?.chapters.current_chapter()
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        self.session
            .as_ref()
            .map(|s| s.bookmarks.as_slice())
            .unwrap_or(&[])
    }

    // ----- lifecycle -----

    /// Loads a book and acquires a media handle for every segment
    ///
    /// On failure a previously open book is left exactly as it was; without
    /// one the controller enters `Error`. Either way `LoadError` is emitted.
    pub async fn open<Src: BookSource>(
        &mut self,
        source: &Src,
        book_id: &BookId,
    ) -> EngineResult<()> {
        let previous_state = self.state;
        self.set_state(EngineState::Loading);
        log::info!("Opening '{}'", book_id);

        match self.load_session(source, book_id).await {
            Ok(session) => {
                self.close_session();
                log::info!(
                    "Opened '{}': {} segments, {} words, {} chapters",
                    book_id,
                    session.timeline.segment_count(),
                    session.words.len(),
                    session.chapters.chapter_count()
                );
                self.session = Some(session);
                self.set_state(EngineState::Ready);
                self.report_position(true);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to open '{}': {}", book_id, e);
                self.events.emit(PlayerEvent::LoadError {
                    reason: e.to_string(),
                });
                if self.session.is_some() {
                    self.set_state(previous_state);
                } else {
                    self.set_state(EngineState::Error);
                }
                Err(e)
            }
        }
    }

    async fn load_session<Src: BookSource>(
        &mut self,
        source: &Src,
        book_id: &BookId,
    ) -> EngineResult<BookSession<B::Handle>> {
        let alignment = source.load(book_id).await?;
        alignment.validate()?;

        let Alignment {
            title,
            author,
            total_duration,
            words,
            segments,
            chapters,
            ..
        } = alignment;

        let mut handles: Vec<B::Handle> = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            match self.acquire_segment(index, segment).await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    for handle in &mut handles {
                        handle.release();
                    }
                    return Err(e);
                }
            }
        }

        Ok(BookSession::new(
            book_id.clone(),
            title,
            author,
            SegmentTimeline::new(segments, total_duration),
            WordIndex::new(words),
            ChapterList::new(chapters),
            handles,
        ))
    }

    async fn acquire_segment(
        &mut self,
        index: usize,
        segment: &AudioSegment,
    ) -> EngineResult<B::Handle> {
        let acquisition_error = |source| EngineError::SegmentAcquisition {
            index,
            source_ref: segment.source_ref.clone(),
            source,
        };

        let mut handle = self.backend.acquire(segment).map_err(acquisition_error)?;
        let timeout = self.ready_timeout;

        let ready = tokio::time::timeout(timeout, handle.wait_ready()).await;
        match ready {
            Ok(Ok(())) => Ok(handle),
            Ok(Err(source)) => {
                handle.release();
                Err(acquisition_error(source))
            }
            Err(_) => {
                log::warn!(
                    "Segment {} ({}) not ready after {:?}, continuing",
                    index,
                    segment.source_ref,
                    timeout
                );
                Ok(handle)
            }
        }
    }

    /// Stops playback, releases every handle and forgets the book
    pub fn close(&mut self) {
        self.close_session();
        self.set_state(EngineState::Idle);
    }

    fn close_session(&mut self) {
        self.cancel_pending_tick();
        if let Some(mut session) = self.session.take() {
            session.release_all();
            log::info!("Closed '{}'", session.book_id);
        }
        self.playback.active_segment_index = 0;
        self.playback.is_playing = false;
    }

    // ----- transport -----

    /// Starts or resumes playback
    ///
    /// From `Finished` playback restarts at the beginning. A start the host
    /// refuses is reported as `PlaybackBlocked`; the controller still enters
    /// `Playing` so the next user action can retry.
    pub fn play(&mut self) -> EngineResult<()> {
        match self.state {
            EngineState::Ready | EngineState::Paused => {}
            EngineState::Playing => return Ok(()),
            EngineState::Finished => {
                self.seek(SeekTarget::Time(0.0))?;
            }
            EngineState::Idle | EngineState::Loading | EngineState::Error => {
                return Err(EngineError::InvalidState(format!(
                    "cannot play while {}",
                    self.state
                )));
            }
        }

        let playback = self.playback;
        let session = self.session.as_mut().ok_or(EngineError::NoBookOpen)?;
        let handle = session.handle_mut(playback.active_segment_index)?;
        handle.set_rate(playback.speed.value());
        handle.set_volume(playback.volume.value());
        let started = handle.play();

        self.playback.is_playing = true;
        self.set_state(EngineState::Playing);
        if let Err(rejected) = started {
            self.report_blocked(rejected);
        }
        self.schedule_next_tick();
        Ok(())
    }

    pub fn pause(&mut self) -> EngineResult<()> {
        match self.state {
            EngineState::Playing => {}
            EngineState::Ready | EngineState::Paused | EngineState::Finished => return Ok(()),
            EngineState::Idle | EngineState::Loading | EngineState::Error => {
                return Err(EngineError::InvalidState(format!(
                    "cannot pause while {}",
                    self.state
                )));
            }
        }

        let index = self.playback.active_segment_index;
        if let Some(session) = self.session.as_mut() {
            session.handle_mut(index)?.pause();
        }
        self.playback.is_playing = false;
        self.cancel_pending_tick();
        self.set_state(EngineState::Paused);
        self.report_position(false);
        Ok(())
    }

    /// Moves the playhead, switching segments when needed
    ///
    /// Out-of-range targets are clamped. The word at the new position is
    /// always reported, even if it did not change. Returns the resolved time.
    pub fn seek(&mut self, target: SeekTarget) -> EngineResult<f64> {
        if !self.state.has_session() {
            return Err(EngineError::InvalidState(format!(
                "cannot seek while {}",
                self.state
            )));
        }

        let current = self.current_time();
        let playback = self.playback;
        let session = self.session.as_mut().ok_or(EngineError::NoBookOpen)?;

        let raw = match target {
            SeekTarget::Time(t) => t,
            SeekTarget::Percent(p) => p / 100.0 * session.timeline.total_duration(),
            SeekTarget::Relative(delta) => current + delta,
        };
        if raw.is_nan() {
            return Err(EngineError::InvalidSeekTarget(raw));
        }

        let time = session.timeline.clamp(raw);
        let position = session.timeline.global_to_segment(time);
        let active = playback.active_segment_index;
        let mut blocked = None;

        if position.index != active {
            session.handle_mut(active)?.pause();

            let handle = session.handle_mut(position.index)?;
            handle.set_current_time(position.local_time);
            handle.set_rate(playback.speed.value());
            handle.set_volume(playback.volume.value());
            if playback.is_playing {
                blocked = handle.play().err();
            }
            self.playback.active_segment_index = position.index;
            log::debug!(
                "Seek to {:.2}s switched segment {} -> {}",
                time,
                active,
                position.index
            );
        } else {
            session.handle_mut(active)?.set_current_time(position.local_time);
            log::debug!("Seek to {:.2}s within segment {}", time, active);
        }

        if let Some(rejected) = blocked {
            self.report_blocked(rejected);
        }
        if self.state == EngineState::Finished {
            self.set_state(EngineState::Paused);
        }
        self.report_position(true);
        Ok(time)
    }

    /// Sets the playback rate; allowed before a book is open
    pub fn set_speed(&mut self, speed: f32) -> EngineResult<()> {
        let speed = PlaybackSpeed::new(speed).map_err(|_| EngineError::InvalidSpeed(speed))?;
        self.playback.speed = speed;

        let index = self.playback.active_segment_index;
        if let Some(session) = self.session.as_mut() {
            session.handle_mut(index)?.set_rate(speed.value());
        }
        Ok(())
    }

    /// Sets the output volume; allowed before a book is open
    pub fn set_volume(&mut self, volume: f32) -> EngineResult<()> {
        let volume = Volume::new(volume).map_err(|_| EngineError::InvalidVolume(volume))?;
        self.playback.volume = volume;

        let index = self.playback.active_segment_index;
        if let Some(session) = self.session.as_mut() {
            session.handle_mut(index)?.set_volume(volume.value());
        }
        Ok(())
    }

    /// Seeks to the start of a chapter, returning its index
    pub fn goto_chapter(&mut self, target: ChapterTarget) -> EngineResult<usize> {
        let session = self.session.as_ref().ok_or(EngineError::NoBookOpen)?;
        let chapters = &session.chapters;
        if !chapters.has_chapters() {
            return Err(EngineError::NoChapters);
        }

        let index = chapters.resolve(target).ok_or_else(|| {
            let requested = match target {
                ChapterTarget::Index(i) => i as i64,
                ChapterTarget::Relative(delta) => chapters
                    .current_chapter_index()
                    .map_or(-1, |i| i as i64)
                    .saturating_add(delta),
            };
            EngineError::ChapterOutOfRange(requested)
        })?;
        let start = chapters
            .get_chapter(index)
            .map(|ch| ch.start_time)
            .ok_or(EngineError::ChapterOutOfRange(index as i64))?;

        self.seek(SeekTarget::Time(start))?;
        Ok(index)
    }

    // ----- bookmarks -----

    /// Bookmarks `position`, capturing the word and context there
    pub fn add_bookmark(
        &mut self,
        position: f64,
        label: impl Into<String>,
    ) -> EngineResult<Bookmark> {
        let session = self.session.as_mut().ok_or(EngineError::NoBookOpen)?;
        if position.is_nan() {
            return Err(EngineError::InvalidSeekTarget(position));
        }

        let position = position.clamp(0.0, session.timeline.total_duration());
        let bookmark = session.capture_bookmark(position, label.into());
        session.bookmarks.insert(bookmark.clone());
        log::debug!("Bookmark {} at {:.2}s", bookmark.id, position);
        Ok(bookmark)
    }

    pub fn delete_bookmark(&mut self, id: &BookmarkId) -> EngineResult<Bookmark> {
        let session = self.session.as_mut().ok_or(EngineError::NoBookOpen)?;
        session
            .bookmarks
            .remove(id)
            .ok_or_else(|| EngineError::BookmarkNotFound(id.to_string()))
    }

    pub fn rename_bookmark(
        &mut self,
        id: &BookmarkId,
        label: impl Into<String>,
    ) -> EngineResult<()> {
        let session = self.session.as_mut().ok_or(EngineError::NoBookOpen)?;
        if session.bookmarks.rename(id, label) {
            Ok(())
        } else {
            Err(EngineError::BookmarkNotFound(id.to_string()))
        }
    }

    /// Replaces the open book's bookmarks, e.g. with a stored list
    pub fn restore_bookmarks(&mut self, bookmarks: Vec<Bookmark>) -> EngineResult<()> {
        let session = self.session.as_mut().ok_or(EngineError::NoBookOpen)?;
        session.bookmarks = BookmarkList::from_vec(bookmarks);
        Ok(())
    }

    // ----- frame loop -----

    /// Runs one frame of the display loop
    ///
    /// Ignored (returns false) unless `handle` is the outstanding tick and the
    /// controller is playing.
    pub fn tick(&mut self, handle: TickHandle) -> bool {
        if self.pending_tick != Some(handle) || self.state != EngineState::Playing {
            log::trace!("Ignoring stale tick {}", handle.id());
            return false;
        }
        // Spent: the scheduler must stop reporting it as due
        self.cancel_pending_tick();

        let index = self.playback.active_segment_index;
        let ended = self
            .session
            .as_ref()
            .and_then(|s| s.handles.get(index))
            .is_some_and(|h| h.has_ended());
        let finished = ended && self.advance_segment();

        self.report_position(false);

        if self.state == EngineState::Playing {
            self.schedule_next_tick();
        } else if finished {
            self.events.emit(PlayerEvent::Finished);
        }
        true
    }

    /// Moves from an ended segment to the next one; returns true at the end
    /// of the book
    fn advance_segment(&mut self) -> bool {
        let playback = self.playback;
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        let current = playback.active_segment_index;
        let next = current + 1;
        if let Some(handle) = session.handles.get_mut(current) {
            handle.pause();
        }

        if next >= session.handles.len() {
            log::info!("Finished '{}'", session.book_id);
            self.playback.is_playing = false;
            self.cancel_pending_tick();
            self.set_state(EngineState::Finished);
            return true;
        }

        let started = match session.handle_mut(next) {
            Ok(handle) => {
                handle.set_current_time(0.0);
                handle.set_rate(playback.speed.value());
                handle.set_volume(playback.volume.value());
                handle.play()
            }
            Err(e) => {
                log::error!("{}", e);
                return false;
            }
        };

        self.playback.active_segment_index = next;
        log::debug!("Segment {} ended, continuing with segment {}", current, next);
        if let Err(rejected) = started {
            self.report_blocked(rejected);
        }
        false
    }

    /// Emits the word, chapter and progress for the current time
    fn report_position(&mut self, force_word: bool) {
        let time = self.current_time();
        let events = &self.events;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        // Chapters only move when the word does; a wordless book checks every frame
        let mut word_changed = session.words.is_empty();
        if !session.words.is_empty() {
            let index = session.words.find_word_at_time(time);
            if force_word || session.current_word != Some(index) {
                session.current_word = Some(index);
                word_changed = true;
                if let Some(word) = session.words.get(index) {
                    events.emit(PlayerEvent::WordChanged {
                        index,
                        word: word.clone(),
                    });
                }
            }
        }

        if word_changed {
            if let Some(index) = session.chapters.update_position(time) {
                if let Some(chapter) = session.chapters.get_chapter(index) {
                    events.emit(PlayerEvent::ChapterChanged {
                        index,
                        chapter: chapter.clone(),
                    });
                }
            }
        }

        events.emit(PlayerEvent::Progress {
            time,
            percent: session.timeline.percent(time),
        });
    }

    fn report_blocked(&self, rejected: PlaybackRejected) {
        log::warn!("{}", rejected);
        self.events.emit(PlayerEvent::PlaybackBlocked {
            reason: rejected.reason,
        });
    }

    fn schedule_next_tick(&mut self) {
        self.cancel_pending_tick();
        self.pending_tick = Some(self.scheduler.schedule_tick());
    }

    fn cancel_pending_tick(&mut self) {
        if let Some(handle) = self.pending_tick.take() {
            self.scheduler.cancel_tick(handle);
        }
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            log::debug!("State {} -> {}", self.state, state);
            self.state = state;
            self.events.emit(PlayerEvent::StateChanged { state });
        }
    }
}

impl<B: MediaBackend, S: FrameScheduler> Drop for PlaybackController<B, S> {
    fn drop(&mut self) {
        self.close_session();
    }
}
