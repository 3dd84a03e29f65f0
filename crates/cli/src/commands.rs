// FILE: crates/cli/src/commands.rs

use crate::AppContext;
use anyhow::{anyhow, bail, Context, Result};
use audioreader_config::ConfigManager;
use audioreader_core::{format_clock, BookId, BookSummary, BookmarkId, PlaybackSpeed, Volume};
use audioreader_library::{scan_books, DirectoryBookSource};
use audioreader_state::{BookmarkStore, KeyValueStore, ProgressStore, SettingsStore};
use clap::ArgMatches;
use console::style;
use media_engine::BookSource;

pub(crate) fn parse_book_id(slug: &str) -> Result<BookId> {
    BookId::parse(slug).map_err(|e| anyhow!(e))
}

/// List all processed books
pub fn list_books(ctx: &AppContext) -> Result<()> {
    let books = scan_books(&ctx.books_dir)
        .with_context(|| format!("Failed to scan {}", ctx.books_dir.display()))?;

    if books.is_empty() {
        println!(
            "No processed books in {}. Run the alignment pipeline first.",
            ctx.books_dir.display()
        );
        return Ok(());
    }

    let progress = ProgressStore::new(ctx.state_store());
    println!("\n{} Books", style(books.len()).bold().cyan());
    println!("{}", "=".repeat(80));

    for book in &books {
        print_book_summary(book, progress_of(&progress, book));
    }

    Ok(())
}

fn progress_of<K: KeyValueStore>(progress: &ProgressStore<K>, book: &BookSummary) -> f64 {
    BookId::parse(&book.slug)
        .map(|id| progress.restore(&id))
        .unwrap_or(0.0)
}

fn print_book_summary(book: &BookSummary, position: f64) {
    println!("\n{}", style(&book.title).bold());
    println!("  Author: {}", book.author);
    println!("  Id: {}", style(&book.slug).dim());
    println!(
        "  Length: {}  ({} words{})",
        format_clock(book.total_duration),
        book.word_count,
        if book.has_chapters { ", chapters" } else { "" }
    );
    if position > 0.0 && book.total_duration > 0.0 {
        println!(
            "  Progress: {} ({:.1}%)",
            format_clock(position),
            (position / book.total_duration * 100.0).min(100.0)
        );
    }
}

/// Show a book's parts, chapters and saved state
pub async fn show_book_info(ctx: &AppContext, slug: &str) -> Result<()> {
    let book_id = parse_book_id(slug)?;
    let source = DirectoryBookSource::new(&ctx.books_dir);
    let alignment = source
        .load(&book_id)
        .await
        .map_err(|e| {
            let message = e.user_message();
            anyhow::Error::new(e).context(message)
        })?;

    println!("\n{}", style("Book Information").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("Title: {}", style(&alignment.title).bold());
    println!("Author: {}", alignment.author);
    println!("Length: {}", format_clock(alignment.total_duration));
    println!("Words: {}", alignment.words.len());

    println!("\n{} ({})", style("Audio parts").bold(), alignment.segments.len());
    for (i, segment) in alignment.segments.iter().enumerate() {
        let marker = if std::path::Path::new(&segment.source_ref).is_file() {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!(
            "  {} {:>3}. {} - {}  {}",
            marker,
            i + 1,
            format_clock(segment.offset),
            format_clock(segment.end()),
            segment.source_ref
        );
    }

    if alignment.chapters.is_empty() {
        println!("\nNo chapters");
    } else {
        println!("\n{} ({})", style("Chapters").bold(), alignment.chapters.len());
        for (i, chapter) in alignment.chapters.iter().enumerate() {
            println!(
                "  {:>3}. {}  {}",
                i + 1,
                format_clock(chapter.start_time),
                chapter.title
            );
        }
    }

    let store = ctx.state_store();
    let position = ProgressStore::new(store.clone()).restore(&book_id);
    let bookmarks = BookmarkStore::new(store).load(&book_id);
    println!();
    println!("Saved position: {}", format_clock(position));
    println!("Bookmarks: {}", bookmarks.len());

    Ok(())
}

/// List a book's bookmarks, or delete / rename one
pub fn manage_bookmarks(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let slug = crate::required(matches, "book")?;
    let book_id = parse_book_id(slug)?;
    let store = BookmarkStore::new(ctx.state_store());
    let mut bookmarks = store.load(&book_id);

    if let Some(id) = matches.get_one::<String>("delete") {
        let id = BookmarkId::from_string(id).context("Invalid bookmark id")?;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != id);
        if bookmarks.len() == before {
            bail!("No bookmark {} in '{}'", id, book_id);
        }
        store
            .save(&book_id, &bookmarks)
            .context("Failed to save bookmarks")?;
        println!("{} Bookmark deleted", style("✓").green().bold());
        return Ok(());
    }

    if let Some(mut values) = matches.get_many::<String>("rename") {
        let (id, label) = match (values.next(), values.next()) {
            (Some(id), Some(label)) => (id, label),
            _ => bail!("--rename needs an id and a label"),
        };
        let id = BookmarkId::from_string(id).context("Invalid bookmark id")?;
        let bookmark = bookmarks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| anyhow!("No bookmark {} in '{}'", id, book_id))?;
        bookmark.set_label(label.as_str());
        store
            .save(&book_id, &bookmarks)
            .context("Failed to save bookmarks")?;
        println!("{} Bookmark renamed", style("✓").green().bold());
        return Ok(());
    }

    if bookmarks.is_empty() {
        println!("No bookmarks for '{}'. Press 'b' while playing to add one.", book_id);
        return Ok(());
    }

    println!("\n{} Bookmarks in '{}'", style(bookmarks.len()).bold().cyan(), book_id);
    println!("{}", "=".repeat(80));
    for bookmark in &bookmarks {
        println!(
            "\n{}  {}",
            style(format_clock(bookmark.position)).bold(),
            bookmark.label
        );
        if let Some(ref chapter) = bookmark.chapter_title {
            println!("  Chapter: {}", chapter);
        }
        if !bookmark.context_snippet.is_empty() {
            println!("  \"{}\"", bookmark.context_snippet);
        }
        println!("  Id: {}", style(bookmark.id).dim());
    }

    Ok(())
}

/// `config init | show | path`
pub fn config_command(
    manager: &ConfigManager,
    ctx: &AppContext,
    matches: &ArgMatches,
) -> Result<()> {
    match matches.subcommand() {
        Some(("init", _)) => {
            if manager.initialize().context("Failed to write config file")? {
                println!(
                    "{} Created {}",
                    style("✓").green().bold(),
                    manager.config_path().display()
                );
            } else {
                println!("Config already exists at {}", manager.config_path().display());
            }
        }
        Some(("show", _)) => {
            let config = &ctx.config;
            println!("{}", style("[app]").bold());
            println!("log_level = {}", config.app.log_level);
            println!("books_dir = {}", ctx.books_dir.display());
            println!("data_dir = {}", ctx.data_dir.display());
            println!("\n{}", style("[player]").bold());
            println!("frame_interval_ms = {}", config.player.frame_interval_ms);
            println!("autosave_interval_secs = {}", config.player.autosave_interval_secs);
            println!("resume_threshold_secs = {}", config.player.resume_threshold_secs);
            println!("segment_ready_timeout_ms = {}", config.player.segment_ready_timeout_ms);
            println!("skip_step_secs = {}", config.player.skip_step_secs);
            println!("speed_step = {}", config.player.speed_step);
        }
        Some(("path", _)) => println!("{}", manager.config_path().display()),
        _ => bail!("Unknown config command"),
    }
    Ok(())
}

/// Show the reader settings, applying any changes given on the command line
pub fn update_settings(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let store = SettingsStore::new(ctx.state_store());
    let mut settings = store.load();
    let mut changed = false;

    if let Some(&speed) = matches.get_one::<f32>("speed") {
        settings.playback_speed = PlaybackSpeed::new(speed).map_err(|e| anyhow!(e))?;
        changed = true;
    }
    if let Some(&volume) = matches.get_one::<f32>("volume") {
        settings.volume = Volume::new(volume).map_err(|e| anyhow!(e))?;
        changed = true;
    }
    if matches.get_flag("no-context") {
        settings.show_context = false;
        changed = true;
    }

    if changed {
        store.save(&settings).context("Failed to save settings")?;
        println!("{} Settings saved", style("✓").green().bold());
    }

    println!("Speed: {:.2}x", settings.playback_speed.value());
    println!("Volume: {:.0}%", settings.volume.value() * 100.0);
    println!("Font scale: {:.1}", settings.font_scale);
    println!("Show context: {}", if settings.show_context { "yes" } else { "no" });
    Ok(())
}

#[cfg(test)]
mod tests;
