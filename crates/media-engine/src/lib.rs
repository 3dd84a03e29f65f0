//! Media Engine - playback synchronization for AudioReader
//!
//! Presents a book's audio segments as one timeline and keeps the displayed
//! word, chapter and bookmarks in step with it.
//!
//! - `timeline`: segment resolution and seek clamping
//! - `index`, `chapters`, `bookmarks`: interval lookups by time
//! - `controller`: the playback state machine and frame loop
//! - `media`, `source`, `scheduler`: seams to the host

mod bookmarks;
mod chapters;
mod clock;
mod controller;
mod error;
mod events;
mod index;
mod media;
mod scheduler;
mod session;
mod source;
mod state;
mod timeline;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bookmarks::BookmarkList;
pub use chapters::{ChapterList, ChapterTarget};
pub use clock::{ClockBackend, ClockMedia};
pub use controller::{PlaybackController, SeekTarget, DEFAULT_SEGMENT_READY_TIMEOUT};
pub use error::{EngineError, EngineResult, MediaError, PlaybackRejected};
pub use events::{EventSink, PlayerEvent};
pub use index::WordIndex;
pub use media::{MediaBackend, MediaHandle};
pub use scheduler::{FrameScheduler, IntervalScheduler, ManualScheduler, TickHandle};
pub use session::BookSession;
pub use source::BookSource;
pub use state::{EngineState, PlaybackState};
pub use timeline::{SegmentPosition, SegmentTimeline, SEEK_END_EPSILON};
