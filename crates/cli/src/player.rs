// FILE: crates/cli/src/player.rs

//! Interactive word display
//!
//! Runs the reader on the terminal: the frame scheduler's deadline doubles as
//! the key-poll timeout, so a single thread drives ticks, input and drawing.

use crate::commands::parse_book_id;
use crate::display::{focus_word, parse_hex_color, progress_bar};
use crate::AppContext;
use anyhow::{Context, Result};
use audioreader_config::PlayerConfig;
use audioreader_core::{format_clock, ColorScheme, PlaybackSpeed};
use audioreader_library::DirectoryBookSource;
use audioreader_state::{FileStore, Reader};
use crossbeam_channel::Receiver;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, Stylize},
    terminal::{self, ClearType},
};
use media_engine::{
    ChapterTarget, ClockBackend, EngineResult, IntervalScheduler, PlaybackController,
    PlayerEvent, SeekTarget,
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

type TerminalReader = Reader<ClockBackend, IntervalScheduler, FileStore>;

/// Key-poll timeout while no frame is scheduled
const IDLE_POLL: Duration = Duration::from_millis(250);

const HELP: &str = "space play/pause  ←/→ skip  ↑/↓ speed  [/] chapter  b bookmark  q quit";

#[derive(Debug, Clone, Copy, PartialEq)]
enum PlayerCommand {
    Toggle,
    /// Skip by this many seconds (negative is back)
    Skip(f64),
    /// Change speed by this many steps
    Speed(i32),
    Chapter(i64),
    Bookmark,
    Quit,
}

fn command_for(key: KeyEvent, config: &PlayerConfig) -> Option<PlayerCommand> {
    let command = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => PlayerCommand::Quit,
        KeyCode::Char(' ') => PlayerCommand::Toggle,
        KeyCode::Left => PlayerCommand::Skip(-config.skip_step_secs),
        KeyCode::Right => PlayerCommand::Skip(config.skip_step_secs),
        KeyCode::Up => PlayerCommand::Speed(1),
        KeyCode::Down => PlayerCommand::Speed(-1),
        KeyCode::Char('[') => PlayerCommand::Chapter(-1),
        KeyCode::Char(']') => PlayerCommand::Chapter(1),
        KeyCode::Char('b') => PlayerCommand::Bookmark,
        KeyCode::Char('q') | KeyCode::Esc => PlayerCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// Speed after `steps` presses, clamped and rounded to hundredths
fn next_speed(current: f32, steps: i32, step: f32) -> f32 {
    let raw = current + steps as f32 * step;
    let rounded = (raw * 100.0).round() / 100.0;
    PlaybackSpeed::clamped(rounded).value()
}

/// Runs a command; returns a status line worth showing, if any
fn apply(
    reader: &mut TerminalReader,
    command: PlayerCommand,
    config: &PlayerConfig,
) -> EngineResult<Option<String>> {
    match command {
        PlayerCommand::Toggle => reader.toggle().map(|_| None),
        PlayerCommand::Skip(delta) => reader.seek(SeekTarget::Relative(delta)).map(|_| None),
        PlayerCommand::Speed(steps) => {
            let speed = next_speed(
                reader.controller().playback().speed.value(),
                steps,
                config.speed_step,
            );
            reader.set_speed(speed)?;
            Ok(Some(format!("Speed {:.2}x", speed)))
        }
        PlayerCommand::Chapter(delta) => {
            let index = reader.goto_chapter(ChapterTarget::Relative(delta))?;
            Ok(Some(format!("Chapter {}", index + 1)))
        }
        PlayerCommand::Bookmark => {
            let label = format!("Bookmark at {}", format_clock(reader.controller().current_time()));
            let bookmark = reader.add_bookmark(label)?;
            Ok(Some(format!("Bookmarked {}", format_clock(bookmark.position))))
        }
        PlayerCommand::Quit => Ok(None),
    }
}

fn status_for(event: &PlayerEvent) -> Option<String> {
    match event {
        PlayerEvent::Finished => Some("Finished. Press space to start over.".to_string()),
        PlayerEvent::PlaybackBlocked { reason } => Some(format!("Audio blocked: {}", reason)),
        PlayerEvent::LoadError { reason } => Some(reason.clone()),
        _ => None,
    }
}

/// Terminal colors for a scheme; unparseable entries fall back to defaults
struct Palette {
    background: Color,
    text: Color,
    focus: Color,
    context: Color,
}

impl Palette {
    fn from_scheme(scheme: &ColorScheme) -> Self {
        let color = |value: &str, fallback: Color| {
            parse_hex_color(value).map_or(fallback, |(r, g, b)| Color::Rgb { r, g, b })
        };
        Self {
            background: color(&scheme.background, Color::Reset),
            text: color(&scheme.text, Color::White),
            focus: color(&scheme.focus, Color::Red),
            context: color(&scheme.context, Color::DarkGrey),
        }
    }
}

fn draw(out: &mut impl Write, reader: &TerminalReader, status: Option<&str>) -> Result<()> {
    let (width, height) = terminal::size()?;
    let controller = reader.controller();
    let settings = reader.settings();
    let palette = Palette::from_scheme(&settings.colors);

    queue!(
        out,
        SetBackgroundColor(palette.background),
        terminal::Clear(ClearType::All),
        cursor::MoveTo(0, 0)
    )?;

    let Some(session) = controller.session() else {
        out.flush()?;
        return Ok(());
    };

    let header = format!("{} by {}", session.title(), session.author());
    queue!(out, Print(header.with(palette.text).bold()))?;
    if let Some(chapter) = controller.current_chapter() {
        let line = format!("{}  {}", session.chapters().chapter_progress(), chapter.title);
        queue!(out, cursor::MoveTo(0, 1), Print(line.with(palette.context)))?;
    }

    let middle = height / 2;
    if let Some((index, word)) = controller.current_word() {
        let focused = focus_word(&word.text, width as usize);
        queue!(
            out,
            cursor::MoveTo(0, middle.saturating_sub(1)),
            Print(" ".repeat(focused.padding)),
            Print(focused.before.with(palette.text)),
            Print(focused.focus.with(palette.focus).bold()),
            Print(focused.after.with(palette.text))
        )?;

        if settings.show_context {
            let snippet = session.words().context_snippet(index);
            let indent = (width as usize).saturating_sub(snippet.chars().count()) / 2;
            queue!(
                out,
                cursor::MoveTo(0, middle + 1),
                Print(" ".repeat(indent)),
                Print(snippet.with(palette.context))
            )?;
        }
    }

    let time = controller.current_time();
    let percent = session.timeline().percent(time);
    let progress = format!(
        "{} {} / {}  {:.1}%  {:.2}x  {}",
        progress_bar(percent, 30),
        format_clock(time),
        format_clock(controller.total_duration()),
        percent,
        controller.playback().speed.value(),
        controller.state()
    );
    queue!(
        out,
        cursor::MoveTo(0, height.saturating_sub(3)),
        Print(progress.with(palette.text))
    )?;
    if let Some(status) = status {
        queue!(
            out,
            cursor::MoveTo(0, height.saturating_sub(2)),
            Print(status.with(palette.focus))
        )?;
    }
    queue!(
        out,
        cursor::MoveTo(0, height.saturating_sub(1)),
        Print(HELP.with(palette.context))
    )?;

    out.flush()?;
    Ok(())
}

fn run_loop(
    out: &mut impl Write,
    reader: &mut TerminalReader,
    events: &Receiver<PlayerEvent>,
    config: &PlayerConfig,
) -> Result<()> {
    let mut status: Option<String> = None;
    let mut dirty = true;

    loop {
        let now = Instant::now();
        if let Some(handle) = reader.controller().scheduler().due(now) {
            reader.tick_at(handle, now);
        }

        for event in events.try_iter() {
            dirty = true;
            if let Some(message) = status_for(&event) {
                status = Some(message);
            }
        }

        if dirty {
            draw(out, reader, status.as_deref())?;
            dirty = false;
        }

        let timeout = reader
            .controller()
            .scheduler()
            .deadline()
            .map_or(IDLE_POLL, |deadline| {
                deadline.saturating_duration_since(Instant::now())
            });
        if !event::poll(timeout)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let Some(command) = command_for(key, config) else {
                    continue;
                };
                if command == PlayerCommand::Quit {
                    return Ok(());
                }
                match apply(reader, command, config) {
                    Ok(Some(message)) => status = Some(message),
                    Ok(None) => {}
                    Err(e) => status = Some(e.to_string()),
                }
                dirty = true;
            }
            Event::Resize(..) => dirty = true,
            _ => {}
        }
    }
}

/// Opens a book and runs the display until the user quits
pub async fn play_book(ctx: &AppContext, slug: &str) -> Result<()> {
    let book_id = parse_book_id(slug)?;
    let config = &ctx.config.player;

    let (tx, events) = crossbeam_channel::unbounded();
    let controller = PlaybackController::new(
        ClockBackend::new(),
        IntervalScheduler::new(config.frame_interval()),
        tx,
    )
    .with_ready_timeout(config.segment_ready_timeout());
    let mut reader = Reader::with_config(controller, ctx.state_store(), config);

    let source = DirectoryBookSource::new(&ctx.books_dir);
    reader
        .open(&source, &book_id)
        .await
        .with_context(|| format!("Failed to open '{}'", book_id))?;

    // Log lines would tear the full-screen display
    let log_level = log::max_level();
    log::set_max_level(log::LevelFilter::Off);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = run_loop(&mut stdout, &mut reader, &events, config);

    let restored = execute!(
        stdout,
        ResetColor,
        cursor::Show,
        terminal::LeaveAlternateScreen
    )
    .and_then(|_| terminal::disable_raw_mode());
    log::set_max_level(log_level);

    let position = reader.controller().current_time();
    reader.close();
    result?;
    restored?;

    println!("Stopped at {}", format_clock(position));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_bindings() {
        let config = PlayerConfig::default();
        assert_eq!(
            command_for(key(KeyCode::Char(' ')), &config),
            Some(PlayerCommand::Toggle)
        );
        assert_eq!(
            command_for(key(KeyCode::Left), &config),
            Some(PlayerCommand::Skip(-10.0))
        );
        assert_eq!(
            command_for(key(KeyCode::Char(']')), &config),
            Some(PlayerCommand::Chapter(1))
        );
        assert_eq!(command_for(key(KeyCode::Esc), &config), Some(PlayerCommand::Quit));
        assert_eq!(command_for(key(KeyCode::Char('x')), &config), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let config = PlayerConfig::default();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(ctrl_c, &config), Some(PlayerCommand::Quit));
    }

    #[test]
    fn test_next_speed_clamps_and_rounds() {
        assert_eq!(next_speed(1.0, 1, 0.1), 1.1);
        assert_eq!(next_speed(1.1, -1, 0.1), 1.0);
        assert_eq!(next_speed(2.95, 1, 0.1), 3.0);
        assert_eq!(next_speed(0.3, -1, 0.1), 0.25);
    }

    #[test]
    fn test_status_messages() {
        assert!(status_for(&PlayerEvent::Finished).is_some());
        assert_eq!(
            status_for(&PlayerEvent::PlaybackBlocked {
                reason: "device busy".to_string()
            }),
            Some("Audio blocked: device busy".to_string())
        );
        assert_eq!(status_for(&PlayerEvent::Progress { time: 1.0, percent: 0.5 }), None);
    }
}
