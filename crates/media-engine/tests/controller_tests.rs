//! Integration tests for the playback controller
//!
//! Every test drives the controller through fakes: `FakeBackend` for audio,
//! `ManualScheduler` for frames and `MemoryBookSource` for books.

use audioreader_core::BookId;
use crossbeam_channel::{unbounded, Receiver};
use media_engine::testing::{
    chapter, evenly_spaced_words, sample_alignment, FakeBackend, MemoryBookSource,
};
use media_engine::{
    ChapterTarget, EngineError, EngineState, IntervalScheduler, ManualScheduler,
    PlaybackController, PlayerEvent, SeekTarget,
};
use std::time::{Duration, Instant};

type TestResult = Result<(), Box<dyn std::error::Error>>;

struct Harness {
    controller: PlaybackController<FakeBackend, ManualScheduler>,
    backend: FakeBackend,
    scheduler: ManualScheduler,
    source: MemoryBookSource,
    events: Receiver<PlayerEvent>,
}

impl Harness {
    fn new() -> Self {
        let backend = FakeBackend::new();
        let scheduler = ManualScheduler::new();
        let (tx, rx) = unbounded();
        let controller = PlaybackController::new(backend.clone(), scheduler.clone(), tx)
            .with_ready_timeout(Duration::from_millis(50));
        let source = MemoryBookSource::new();

        // 450s book in three parts: [0,120) [120,300) [300,450)
        let mut book = sample_alignment(&[120.0, 180.0, 150.0], evenly_spaced_words(450.0, 0.5));
        book.chapters = vec![
            chapter("Opening", 10.0, 200.0, (20, 400)),
            chapter("Middle", 200.0, 350.0, (400, 700)),
            chapter("Ending", 350.0, 450.0, (700, 900)),
        ];
        source.insert(&book_id("three-parts"), book);
        source.insert(
            &book_id("short"),
            sample_alignment(&[30.0], evenly_spaced_words(30.0, 1.0)),
        );

        Self {
            controller,
            backend,
            scheduler,
            source,
            events: rx,
        }
    }

    async fn open(&mut self, slug: &str) -> Result<(), EngineError> {
        let source = self.source.clone();
        self.controller.open(&source, &book_id(slug)).await
    }

    fn drain(&self) -> Vec<PlayerEvent> {
        self.events.try_iter().collect()
    }

    /// Fires the outstanding tick, if any
    fn tick(&mut self) -> bool {
        match self.scheduler.take_due() {
            Some(handle) => self.controller.tick(handle),
            None => false,
        }
    }
}

fn book_id(slug: &str) -> BookId {
    BookId::parse(slug).unwrap()
}

fn words_reported(events: &[PlayerEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            PlayerEvent::WordChanged { index, .. } => Some(*index),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_open_reports_first_word() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;

    assert_eq!(h.controller.state(), EngineState::Ready);
    let events = h.drain();
    assert_eq!(
        events[0],
        PlayerEvent::StateChanged {
            state: EngineState::Loading
        }
    );
    assert!(events.contains(&PlayerEvent::StateChanged {
        state: EngineState::Ready
    }));
    assert_eq!(words_reported(&events), vec![0]);
    assert_eq!(h.backend.acquired().len(), 3);
    assert_eq!(h.controller.playback().active_segment_index, 0);
    Ok(())
}

#[tokio::test]
async fn test_segment_transition_is_continuous() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.controller.play()?;
    assert!(h.tick());

    let part1 = h.backend.media("part1").unwrap();
    let part2 = h.backend.media("part2").unwrap();
    part1.finish();
    h.drain();
    assert!(h.tick());

    assert_eq!(h.controller.playback().active_segment_index, 1);
    assert!(part2.is_playing());
    assert_eq!(part2.time(), 0.0);
    assert_eq!(h.controller.state(), EngineState::Playing);
    assert!((h.controller.current_time() - 120.0).abs() < 1e-9);

    let events = h.drain();
    assert!(!events.contains(&PlayerEvent::Finished));
    assert_eq!(words_reported(&events), vec![240]);
    Ok(())
}

#[tokio::test]
async fn test_last_segment_end_finishes() -> TestResult {
    let mut h = Harness::new();
    h.open("short").await?;
    h.controller.play()?;
    h.backend.media("part1").unwrap().finish();
    h.drain();

    assert!(h.tick());
    assert_eq!(h.controller.state(), EngineState::Finished);
    assert!(!h.controller.playback().is_playing);
    assert!(h.controller.pending_tick().is_none());
    assert!(h.drain().contains(&PlayerEvent::Finished));
    Ok(())
}

#[tokio::test]
async fn test_stale_tick_ignored() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.controller.play()?;
    let first = h.scheduler.pending().unwrap();

    h.controller.pause()?;
    assert!(!h.controller.tick(first));

    h.controller.play()?;
    let second = h.scheduler.pending().unwrap();
    assert_ne!(first, second);
    assert!(!h.controller.tick(first));
    assert!(h.controller.tick(second));
    Ok(())
}

#[tokio::test]
async fn test_ticks_stop_after_pause() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.controller.play()?;
    h.controller.pause()?;

    assert!(h.scheduler.pending().is_none());
    assert!(!h.tick());
    assert_eq!(h.scheduler.cancelled_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_open_keeps_previous_book() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.controller.seek(SeekTarget::Time(250.0))?;
    h.drain();

    let result = h.open("missing").await;
    assert!(result.is_err());
    assert_eq!(h.controller.state(), EngineState::Ready);
    assert_eq!(
        h.controller.session().unwrap().book_id().as_str(),
        "three-parts"
    );
    assert!((h.controller.current_time() - 250.0).abs() < 1e-9);
    assert!(h
        .drain()
        .iter()
        .any(|e| matches!(e, PlayerEvent::LoadError { .. })));
    Ok(())
}

#[tokio::test]
async fn test_failed_open_without_book_enters_error() {
    let mut h = Harness::new();
    let result = h.open("missing").await;

    assert!(result.is_err());
    assert_eq!(h.controller.state(), EngineState::Error);
    assert!(matches!(
        h.controller.play(),
        Err(EngineError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_invalid_alignment_rejected() {
    let mut h = Harness::new();
    h.source.insert_json(
        &book_id("broken"),
        r#"{"title":"T","total_duration":25.0,"words":[],
            "parts":[{"file":"a","offset":0.0,"duration":10.0},
                     {"file":"b","offset":15.0,"duration":10.0}]}"#,
    );

    let result = h.open("broken").await;
    assert!(matches!(result, Err(EngineError::Load(_))));
    assert!(h.backend.acquired().is_empty());
}

#[tokio::test]
async fn test_acquisition_failure_releases_handles() {
    let mut h = Harness::new();
    h.backend.fail_on("part3");

    let result = h.open("three-parts").await;
    match result {
        Err(EngineError::SegmentAcquisition { index, .. }) => assert_eq!(index, 2),
        other => panic!("unexpected result: {:?}", other.err()),
    }
    let acquired = h.backend.acquired();
    assert_eq!(acquired.len(), 2);
    assert!(acquired.iter().all(|m| m.is_released()));
    assert!(h.controller.session().is_none());
}

#[tokio::test]
async fn test_readiness_error_fails_open() {
    let mut h = Harness::new();
    h.backend.fail_ready_on("part2");

    assert!(h.open("three-parts").await.is_err());
    assert!(h.backend.acquired().iter().all(|m| m.is_released()));
}

#[tokio::test]
async fn test_readiness_timeout_proceeds() -> TestResult {
    let mut h = Harness::new();
    h.backend.stall_on("part2");

    h.open("three-parts").await?;
    assert_eq!(h.controller.state(), EngineState::Ready);
    assert_eq!(h.controller.session().unwrap().handles().len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_blocked_playback_stays_playing() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.backend.media("part1").unwrap().reject_play("autoplay not allowed");
    h.drain();

    h.controller.play()?;
    assert_eq!(h.controller.state(), EngineState::Playing);
    assert!(h.drain().contains(&PlayerEvent::PlaybackBlocked {
        reason: "autoplay not allowed".to_string()
    }));

    // A later user action retries
    let part1 = h.backend.media("part1").unwrap();
    part1.allow_play();
    h.controller.pause()?;
    h.controller.play()?;
    assert!(part1.is_playing());
    Ok(())
}

#[tokio::test]
async fn test_seek_resolves_segment() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;

    let t = h.controller.seek(SeekTarget::Time(300.0))?;
    assert_eq!(t, 300.0);
    assert_eq!(h.controller.playback().active_segment_index, 2);
    assert_eq!(h.backend.media("part3").unwrap().time(), 0.0);

    h.controller.seek(SeekTarget::Percent(50.0))?;
    assert_eq!(h.controller.playback().active_segment_index, 1);
    assert!((h.backend.media("part2").unwrap().time() - 105.0).abs() < 1e-9);

    h.controller.seek(SeekTarget::Relative(-20.0))?;
    assert!((h.controller.current_time() - 205.0).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_seek_clamps() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;

    let end = h.controller.seek(SeekTarget::Time(10_000.0))?;
    assert!((end - 449.9).abs() < 1e-9);
    assert_eq!(h.controller.playback().active_segment_index, 2);

    let start = h.controller.seek(SeekTarget::Time(-5.0))?;
    assert_eq!(start, 0.0);
    assert_eq!(h.controller.playback().active_segment_index, 0);

    assert!(matches!(
        h.controller.seek(SeekTarget::Time(f64::NAN)),
        Err(EngineError::InvalidSeekTarget(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_seek_while_playing_switches_audio() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.controller.set_speed(1.5)?;
    h.controller.play()?;

    h.controller.seek(SeekTarget::Time(320.0))?;
    let part1 = h.backend.media("part1").unwrap();
    let part3 = h.backend.media("part3").unwrap();
    assert!(!part1.is_playing());
    assert!(part3.is_playing());
    assert_eq!(part3.rate(), 1.5);
    assert_eq!(h.controller.state(), EngineState::Playing);
    Ok(())
}

#[tokio::test]
async fn test_seek_while_paused_stays_paused() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;

    h.controller.seek(SeekTarget::Time(320.0))?;
    assert!(!h.backend.media("part3").unwrap().is_playing());
    assert_eq!(h.controller.state(), EngineState::Ready);
    Ok(())
}

#[tokio::test]
async fn test_seek_always_reports_word() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.drain();

    h.controller.seek(SeekTarget::Time(100.2))?;
    h.controller.seek(SeekTarget::Time(100.2))?;
    assert_eq!(words_reported(&h.drain()), vec![200, 200]);
    Ok(())
}

#[tokio::test]
async fn test_seek_requires_book() {
    let mut h = Harness::new();
    assert!(matches!(
        h.controller.seek(SeekTarget::Time(1.0)),
        Err(EngineError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_seek_after_finish_pauses() -> TestResult {
    let mut h = Harness::new();
    h.open("short").await?;
    h.controller.play()?;
    h.backend.media("part1").unwrap().finish();
    h.tick();
    assert_eq!(h.controller.state(), EngineState::Finished);

    h.controller.seek(SeekTarget::Time(5.0))?;
    assert_eq!(h.controller.state(), EngineState::Paused);
    Ok(())
}

#[tokio::test]
async fn test_play_after_finish_restarts() -> TestResult {
    let mut h = Harness::new();
    h.open("short").await?;
    h.controller.play()?;
    h.backend.media("part1").unwrap().finish();
    h.tick();

    h.controller.play()?;
    assert_eq!(h.controller.state(), EngineState::Playing);
    assert_eq!(h.controller.current_time(), 0.0);
    assert!(h.backend.media("part1").unwrap().is_playing());
    Ok(())
}

#[tokio::test]
async fn test_speed_and_volume_validation() -> TestResult {
    let mut h = Harness::new();
    assert!(matches!(
        h.controller.set_speed(5.0),
        Err(EngineError::InvalidSpeed(_))
    ));
    assert!(matches!(
        h.controller.set_volume(1.5),
        Err(EngineError::InvalidVolume(_))
    ));

    // Accepted before open and applied on play
    h.controller.set_speed(2.0)?;
    h.controller.set_volume(0.4)?;
    h.open("three-parts").await?;
    h.controller.play()?;

    let part1 = h.backend.media("part1").unwrap();
    assert_eq!(part1.rate(), 2.0);
    assert_eq!(part1.volume(), 0.4);
    Ok(())
}

#[tokio::test]
async fn test_chapter_changes_reported_on_entry() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.drain();

    h.controller.seek(SeekTarget::Time(210.0))?;
    let events = h.drain();
    let entered: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            PlayerEvent::ChapterChanged { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(entered, vec![1]);
    assert_eq!(h.controller.current_chapter().unwrap().title, "Middle");

    // Leaving all chapters is silent
    h.controller.seek(SeekTarget::Time(2.0))?;
    assert!(!h
        .drain()
        .iter()
        .any(|e| matches!(e, PlayerEvent::ChapterChanged { .. })));
    assert!(h.controller.current_chapter().is_none());
    Ok(())
}

#[tokio::test]
async fn test_chapter_follows_word_change_in_tick() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.controller.play()?;
    let part1 = h.backend.media("part1").unwrap();

    part1.set_time(9.9);
    assert!(h.tick());
    h.drain();

    part1.set_time(10.2);
    assert!(h.tick());
    let events = h.drain();
    assert!(matches!(events[0], PlayerEvent::WordChanged { index: 20, .. }));
    assert!(matches!(events[1], PlayerEvent::ChapterChanged { index: 0, .. }));
    assert!(matches!(events[2], PlayerEvent::Progress { .. }));

    // Same word: only progress
    part1.set_time(10.3);
    assert!(h.tick());
    let events = h.drain();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], PlayerEvent::Progress { .. }));
    Ok(())
}

#[tokio::test]
async fn test_goto_chapter() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;

    // Before the first chapter, "next" is chapter 0
    assert_eq!(h.controller.goto_chapter(ChapterTarget::Relative(1))?, 0);
    assert_eq!(h.controller.current_time(), 10.0);

    assert_eq!(h.controller.goto_chapter(ChapterTarget::Relative(1))?, 1);
    assert_eq!(h.controller.current_time(), 200.0);

    assert_eq!(h.controller.goto_chapter(ChapterTarget::Index(2))?, 2);
    assert!(matches!(
        h.controller.goto_chapter(ChapterTarget::Relative(1)),
        Err(EngineError::ChapterOutOfRange(3))
    ));
    Ok(())
}

#[tokio::test]
async fn test_goto_chapter_without_chapters() -> TestResult {
    let mut h = Harness::new();
    h.open("short").await?;
    assert!(matches!(
        h.controller.goto_chapter(ChapterTarget::Index(0)),
        Err(EngineError::NoChapters)
    ));
    Ok(())
}

#[tokio::test]
async fn test_bookmarks_sorted_with_context() -> TestResult {
    let mut h = Harness::new();
    assert!(matches!(
        h.controller.add_bookmark(1.0, "early"),
        Err(EngineError::NoBookOpen)
    ));

    h.open("three-parts").await?;
    let late = h.controller.add_bookmark(300.0, "late")?;
    h.controller.add_bookmark(100.0, "first")?;
    h.controller.add_bookmark(100.0, "second")?;

    let labels: Vec<&str> = h
        .controller
        .bookmarks()
        .iter()
        .map(|b| b.label.as_str())
        .collect();
    assert_eq!(labels, vec!["first", "second", "late"]);

    assert_eq!(late.word_at_position, "w600");
    assert_eq!(late.chapter_title.as_deref(), Some("Middle"));
    assert!(late.context_snippet.contains("w598"));

    h.controller.rename_bookmark(&late.id, "renamed")?;
    let removed = h.controller.delete_bookmark(&late.id)?;
    assert_eq!(removed.label, "renamed");
    assert_eq!(h.controller.bookmarks().len(), 2);
    assert!(matches!(
        h.controller.delete_bookmark(&late.id),
        Err(EngineError::BookmarkNotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_close_releases_everything() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.controller.play()?;

    h.controller.close();
    assert_eq!(h.controller.state(), EngineState::Idle);
    assert!(h.controller.session().is_none());
    assert!(h.scheduler.pending().is_none());
    assert!(h.backend.acquired().iter().all(|m| m.is_released()));
    Ok(())
}

#[tokio::test]
async fn test_opening_another_book_releases_previous() -> TestResult {
    let mut h = Harness::new();
    h.open("three-parts").await?;
    h.open("short").await?;

    let acquired = h.backend.acquired();
    assert_eq!(acquired.len(), 4);
    assert!(acquired[..3].iter().all(|m| m.is_released()));
    assert!(!acquired[3].is_released());
    assert_eq!(h.controller.total_duration(), 30.0);
    Ok(())
}

#[tokio::test]
async fn test_interval_scheduler_goes_quiet_after_finish() -> TestResult {
    let backend = FakeBackend::new();
    let (tx, _events) = unbounded();
    let mut controller =
        PlaybackController::new(backend.clone(), IntervalScheduler::new(Duration::ZERO), tx)
            .with_ready_timeout(Duration::from_millis(50));
    let source = MemoryBookSource::new();
    source.insert(
        &book_id("short"),
        sample_alignment(&[30.0], evenly_spaced_words(30.0, 1.0)),
    );
    controller.open(&source, &book_id("short")).await?;
    controller.play()?;

    let handle = controller
        .scheduler()
        .due(Instant::now())
        .ok_or("no frame scheduled")?;
    assert!(controller.tick(handle));
    assert!(controller.scheduler().deadline().is_some());

    backend.media("part1").ok_or("part1 not acquired")?.finish();
    let handle = controller
        .scheduler()
        .due(Instant::now())
        .ok_or("no frame scheduled")?;
    assert!(controller.tick(handle));

    assert_eq!(controller.state(), EngineState::Finished);
    assert!(controller.scheduler().deadline().is_none());
    for _ in 0..100 {
        assert!(controller.scheduler().due(Instant::now()).is_none());
    }
    assert!(!controller.tick(handle));
    Ok(())
}

#[tokio::test]
async fn test_fired_tick_is_not_due_again() -> TestResult {
    let backend = FakeBackend::new();
    let (tx, _events) = unbounded();
    let mut controller =
        PlaybackController::new(backend, IntervalScheduler::new(Duration::from_secs(3600)), tx)
            .with_ready_timeout(Duration::from_millis(50));
    let source = MemoryBookSource::new();
    source.insert(
        &book_id("short"),
        sample_alignment(&[30.0], evenly_spaced_words(30.0, 1.0)),
    );
    controller.open(&source, &book_id("short")).await?;
    controller.play()?;

    let first = controller.pending_tick().ok_or("no frame scheduled")?;
    assert!(controller.tick(first));

    let later = Instant::now() + Duration::from_secs(7200);
    let next = controller.scheduler().due(later).ok_or("no frame scheduled")?;
    assert_ne!(next, first);
    assert!(controller.scheduler().due(Instant::now()).is_none());
    Ok(())
}
