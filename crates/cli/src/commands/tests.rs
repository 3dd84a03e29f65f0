use super::*;
use audioreader_config::Config;
use audioreader_core::{Bookmark, ALIGNMENT_FILE_NAME};
use std::fs;
use tempfile::TempDir;

fn setup_context() -> (TempDir, AppContext) {
    let temp_dir = TempDir::new().unwrap();
    let books_dir = temp_dir.path().join("books");
    fs::create_dir_all(&books_dir).unwrap();
    let ctx = AppContext {
        config: Config::default(),
        books_dir,
        data_dir: temp_dir.path().join("data"),
    };
    (temp_dir, ctx)
}

fn sub_matches(args: &[&str]) -> ArgMatches {
    let mut full = vec!["audioreader"];
    full.extend_from_slice(args);
    let matches = crate::build_cli().try_get_matches_from(full).unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    sub.clone()
}

fn seed_bookmarks(ctx: &AppContext) -> Vec<Bookmark> {
    let marks = vec![Bookmark::new(10.0, "first"), Bookmark::new(20.0, "second")];
    BookmarkStore::new(ctx.state_store())
        .save(&parse_book_id("dune").unwrap(), &marks)
        .unwrap();
    marks
}

#[test]
fn test_list_books_empty() {
    let (_temp, ctx) = setup_context();
    assert!(list_books(&ctx).is_ok());
}

#[test]
fn test_list_books_with_data() {
    let (_temp, ctx) = setup_context();
    let dir = ctx.books_dir.join("dune");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(ALIGNMENT_FILE_NAME), r#"{"title":"Dune"}"#).unwrap();
    ProgressStore::new(ctx.state_store())
        .save(&parse_book_id("dune").unwrap(), 30.0)
        .unwrap();

    assert!(list_books(&ctx).is_ok());
}

#[test]
fn test_parse_book_id_rejects_paths() {
    assert!(parse_book_id("../secret").is_err());
    assert!(parse_book_id("dune").is_ok());
}

#[tokio::test]
async fn test_info_missing_book_fails() {
    let (_temp, ctx) = setup_context();
    let err = show_book_info(&ctx, "ghost").await.unwrap_err();
    assert!(err.to_string().contains("not been processed"));
}

#[test]
fn test_delete_bookmark() {
    let (_temp, ctx) = setup_context();
    let marks = seed_bookmarks(&ctx);

    let id = marks[0].id.to_string();
    manage_bookmarks(&ctx, &sub_matches(&["bookmarks", "dune", "--delete", &id])).unwrap();

    let remaining = BookmarkStore::new(ctx.state_store()).load(&parse_book_id("dune").unwrap());
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].label, "second");
}

#[test]
fn test_delete_unknown_bookmark_fails() {
    let (_temp, ctx) = setup_context();
    seed_bookmarks(&ctx);

    let unknown = BookmarkId::new().to_string();
    let result = manage_bookmarks(&ctx, &sub_matches(&["bookmarks", "dune", "--delete", &unknown]));
    assert!(result.is_err());
}

#[test]
fn test_rename_bookmark() {
    let (_temp, ctx) = setup_context();
    let marks = seed_bookmarks(&ctx);

    let id = marks[1].id.to_string();
    manage_bookmarks(
        &ctx,
        &sub_matches(&["bookmarks", "dune", "--rename", &id, "renamed"]),
    )
    .unwrap();

    let stored = BookmarkStore::new(ctx.state_store()).load(&parse_book_id("dune").unwrap());
    assert_eq!(stored[1].label, "renamed");
}

#[test]
fn test_update_settings_persists() {
    let (_temp, ctx) = setup_context();
    update_settings(
        &ctx,
        &sub_matches(&["settings", "--speed", "1.5", "--volume", "0.5", "--no-context"]),
    )
    .unwrap();

    let settings = SettingsStore::new(ctx.state_store()).load();
    assert_eq!(settings.playback_speed.value(), 1.5);
    assert_eq!(settings.volume.value(), 0.5);
    assert!(!settings.show_context);
}

#[test]
fn test_update_settings_rejects_out_of_range() {
    let (_temp, ctx) = setup_context();
    let result = update_settings(&ctx, &sub_matches(&["settings", "--speed", "9"]));
    assert!(result.is_err());
    assert_eq!(
        SettingsStore::new(ctx.state_store()).load().playback_speed.value(),
        1.0
    );
}

#[test]
fn test_config_path() {
    let (temp, ctx) = setup_context();
    let manager = ConfigManager::with_directory(temp.path().join("config")).unwrap();
    assert!(config_command(&manager, &ctx, &sub_matches(&["config", "init"])).is_ok());
    assert!(manager.config_path().exists());
    assert!(config_command(&manager, &ctx, &sub_matches(&["config", "show"])).is_ok());
}
