//! In-memory stand-ins for the host audio subsystem and book storage
//!
//! Every fake shares its state between clones, so a test keeps one clone to
//! drive and inspect while the controller owns another.

use crate::error::{MediaError, PlaybackRejected};
use crate::media::{MediaBackend, MediaHandle};
use crate::source::BookSource;
use audioreader_core::{
    Alignment, AudioSegment, BookId, Chapter, LoadError, LoadResult, Word,
};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug)]
struct FakeMediaState {
    source_ref: String,
    duration: f64,
    time: f64,
    ended: bool,
    playing: bool,
    rate: f32,
    volume: f32,
    released: bool,
    reject_play: Option<String>,
    play_calls: u32,
    stall_ready: bool,
    fail_ready: bool,
}

/// Media handle whose clock only moves when the test moves it
#[derive(Debug, Clone)]
pub struct FakeMedia {
    state: Arc<Mutex<FakeMediaState>>,
}

impl FakeMedia {
    fn new(segment: &AudioSegment, stall_ready: bool, fail_ready: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeMediaState {
                source_ref: segment.source_ref.clone(),
                duration: segment.duration,
                time: 0.0,
                ended: false,
                playing: false,
                rate: 1.0,
                volume: 1.0,
                released: false,
                reject_play: None,
                play_calls: 0,
                stall_ready,
                fail_ready,
            })),
        }
    }

    pub fn source_ref(&self) -> String {
        lock(&self.state).source_ref.clone()
    }

    /// Moves the local clock, as if playback had progressed
    pub fn set_time(&self, t: f64) {
        let mut state = lock(&self.state);
        state.time = t.clamp(0.0, state.duration);
        state.ended = state.time >= state.duration;
    }

    /// Runs the segment to its end
    pub fn finish(&self) {
        let mut state = lock(&self.state);
        state.time = state.duration;
        state.ended = true;
        state.playing = false;
    }

    /// Makes every later `play` fail with `reason`
    pub fn reject_play(&self, reason: &str) {
        lock(&self.state).reject_play = Some(reason.to_string());
    }

    pub fn allow_play(&self) {
        lock(&self.state).reject_play = None;
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.state).playing
    }

    pub fn time(&self) -> f64 {
        lock(&self.state).time
    }

    pub fn rate(&self) -> f32 {
        lock(&self.state).rate
    }

    pub fn volume(&self) -> f32 {
        lock(&self.state).volume
    }

    pub fn is_released(&self) -> bool {
        lock(&self.state).released
    }

    pub fn play_calls(&self) -> u32 {
        lock(&self.state).play_calls
    }
}

impl MediaHandle for FakeMedia {
    async fn wait_ready(&mut self) -> Result<(), MediaError> {
        let (stall, fail, source_ref) = {
            let state = lock(&self.state);
            (state.stall_ready, state.fail_ready, state.source_ref.clone())
        };
        if stall {
            std::future::pending::<()>().await;
        }
        if fail {
            return Err(MediaError::NotReady(source_ref));
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackRejected> {
        let mut state = lock(&self.state);
        state.play_calls += 1;
        if state.released {
            return Err(PlaybackRejected::new("media released"));
        }
        if let Some(ref reason) = state.reject_play {
            return Err(PlaybackRejected::new(reason.clone()));
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        lock(&self.state).playing = false;
    }

    fn current_time(&self) -> f64 {
        lock(&self.state).time
    }

    fn set_current_time(&mut self, t: f64) {
        self.set_time(t);
    }

    fn set_rate(&mut self, rate: f32) {
        lock(&self.state).rate = rate;
    }

    fn set_volume(&mut self, volume: f32) {
        lock(&self.state).volume = volume;
    }

    fn has_ended(&self) -> bool {
        lock(&self.state).ended
    }

    fn duration(&self) -> f64 {
        lock(&self.state).duration
    }

    fn release(&mut self) {
        let mut state = lock(&self.state);
        state.playing = false;
        state.released = true;
    }
}

#[derive(Debug, Default)]
struct FakeBackendState {
    acquired: Vec<FakeMedia>,
    fail_acquire: HashSet<String>,
    stall_ready: HashSet<String>,
    fail_ready: HashSet<String>,
}

/// Backend handing out `FakeMedia`, with per-segment failure injection
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeBackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquiring `source_ref` fails
    pub fn fail_on(&self, source_ref: &str) {
        lock(&self.state).fail_acquire.insert(source_ref.to_string());
    }

    /// `source_ref` never becomes ready
    pub fn stall_on(&self, source_ref: &str) {
        lock(&self.state).stall_ready.insert(source_ref.to_string());
    }

    /// `source_ref` reports an error while becoming ready
    pub fn fail_ready_on(&self, source_ref: &str) {
        lock(&self.state).fail_ready.insert(source_ref.to_string());
    }

    /// Every handle acquired so far, oldest first
    pub fn acquired(&self) -> Vec<FakeMedia> {
        lock(&self.state).acquired.clone()
    }

    /// The most recent handle acquired for `source_ref`
    pub fn media(&self, source_ref: &str) -> Option<FakeMedia> {
        lock(&self.state)
            .acquired
            .iter()
            .rev()
            .find(|m| m.source_ref() == source_ref)
            .cloned()
    }
}

impl MediaBackend for FakeBackend {
    type Handle = FakeMedia;

    fn acquire(&mut self, segment: &AudioSegment) -> Result<FakeMedia, MediaError> {
        let mut state = lock(&self.state);
        if state.fail_acquire.contains(&segment.source_ref) {
            return Err(MediaError::NotFound(PathBuf::from(&segment.source_ref)));
        }
        let media = FakeMedia::new(
            segment,
            state.stall_ready.contains(&segment.source_ref),
            state.fail_ready.contains(&segment.source_ref),
        );
        state.acquired.push(media.clone());
        Ok(media)
    }
}

#[derive(Debug, Clone)]
enum StoredBook {
    Parsed(Alignment),
    Raw(String),
}

/// Book source backed by a map
#[derive(Debug, Clone, Default)]
pub struct MemoryBookSource {
    books: Arc<Mutex<HashMap<BookId, StoredBook>>>,
}

impl MemoryBookSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, book_id: &BookId, alignment: Alignment) {
        lock(&self.books).insert(book_id.clone(), StoredBook::Parsed(alignment));
    }

    /// Stores raw JSON, parsed on every load
    pub fn insert_json(&self, book_id: &BookId, json: &str) {
        lock(&self.books).insert(book_id.clone(), StoredBook::Raw(json.to_string()));
    }
}

impl BookSource for MemoryBookSource {
    async fn load(&self, book_id: &BookId) -> LoadResult<Alignment> {
        let stored = lock(&self.books).get(book_id).cloned();
        match stored {
            Some(StoredBook::Parsed(alignment)) => Ok(alignment),
            Some(StoredBook::Raw(json)) => Ok(serde_json::from_str(&json)?),
            None => Err(LoadError::NotFound {
                path: PathBuf::from(book_id.as_str()),
            }),
        }
    }
}

/// Builds an alignment whose segments are named `part1` .. `partN`
pub fn sample_alignment(segment_durations: &[f64], words: Vec<Word>) -> Alignment {
    let mut offset = 0.0;
    let segments = segment_durations
        .iter()
        .enumerate()
        .map(|(i, &duration)| {
            let segment = AudioSegment::new(format!("part{}", i + 1), offset, duration);
            offset += duration;
            segment
        })
        .collect();

    Alignment {
        title: "Sample Book".to_string(),
        author: "Sample Author".to_string(),
        slug: None,
        total_duration: offset,
        words,
        segments,
        chapters: Vec::new(),
    }
}

/// One word every `spacing` seconds across `[0, total)`, named `w0`, `w1`, ...
pub fn evenly_spaced_words(total: f64, spacing: f64) -> Vec<Word> {
    let count = (total / spacing).floor() as usize;
    (0..count)
        .map(|i| {
            let start = i as f64 * spacing;
            Word::new(format!("w{}", i), start, start + spacing * 0.9)
        })
        .collect()
}

/// A chapter spanning `[start, end)` and the given word range
pub fn chapter(title: &str, start: f64, end: f64, words: (usize, usize)) -> Chapter {
    Chapter {
        title: title.to_string(),
        start_time: start,
        end_time: end,
        start_word_index: words.0,
        end_word_index: words.1,
    }
}
