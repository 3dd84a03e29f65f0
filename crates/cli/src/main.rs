// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use audioreader_config::{Config, ConfigManager};
use audioreader_state::FileStore;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

mod commands;
mod display;
mod player;

/// Resolved locations and configuration for one invocation
pub struct AppContext {
    pub config: Config,
    pub books_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppContext {
    fn from_matches(manager: &ConfigManager, config: Config, matches: &ArgMatches) -> Self {
        let books_dir = matches
            .get_one::<String>("books")
            .map(PathBuf::from)
            .unwrap_or_else(|| config.app.books_dir.clone());
        let data_dir = matches
            .get_one::<String>("data-dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| manager.data_dir(&config));

        Self {
            config,
            books_dir,
            data_dir,
        }
    }

    /// Key-value store holding settings, progress and bookmarks
    pub fn state_store(&self) -> FileStore {
        FileStore::new(self.data_dir.join("state"))
    }
}

fn book_arg() -> Arg {
    Arg::new("book")
        .required(true)
        .value_name("BOOK")
        .help("Book directory name under the books directory")
}

fn build_cli() -> Command {
    Command::new("audioreader")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Speed-read along with an audiobook, one word at a time")
        .arg(
            Arg::new("books")
                .short('b')
                .long("books")
                .value_name("DIR")
                .help("Books directory (overrides app.books_dir)")
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Where progress, bookmarks and settings are kept")
                .global(true),
        )
        .subcommand(Command::new("list").about("List processed books"))
        .subcommand(
            Command::new("info")
                .about("Show a book's parts, chapters and saved progress")
                .arg(book_arg()),
        )
        .subcommand(
            Command::new("play")
                .about("Open a book in the word display")
                .arg(book_arg()),
        )
        .subcommand(
            Command::new("bookmarks")
                .about("List, delete or rename a book's bookmarks")
                .arg(book_arg())
                .arg(
                    Arg::new("delete")
                        .short('d')
                        .long("delete")
                        .value_name("ID")
                        .help("Delete the bookmark with this id")
                        .conflicts_with("rename"),
                )
                .arg(
                    Arg::new("rename")
                        .short('r')
                        .long("rename")
                        .value_names(["ID", "LABEL"])
                        .num_args(2)
                        .help("Give a bookmark a new label"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config file"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location")),
        )
        .subcommand(
            Command::new("settings")
                .about("Show or change reader settings")
                .arg(
                    Arg::new("speed")
                        .short('s')
                        .long("speed")
                        .value_name("X")
                        .value_parser(clap::value_parser!(f32))
                        .help("Playback speed, 0.25 - 3.0"),
                )
                .arg(
                    Arg::new("volume")
                        .short('v')
                        .long("volume")
                        .value_name("X")
                        .value_parser(clap::value_parser!(f32))
                        .help("Volume, 0.0 - 1.0"),
                )
                .arg(
                    Arg::new("no-context")
                        .long("no-context")
                        .help("Hide the surrounding words")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow::anyhow!("{} is required", name))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = ConfigManager::new().context("Failed to locate configuration directory")?;
    let config = match manager.load_with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}; using default configuration", e);
            Config::default()
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();

    let ctx = AppContext::from_matches(&manager, config, &matches);

    match matches.subcommand() {
        Some(("list", _)) => commands::list_books(&ctx),
        Some(("info", sub_matches)) => {
            commands::show_book_info(&ctx, required(sub_matches, "book")?).await
        }
        Some(("play", sub_matches)) => player::play_book(&ctx, required(sub_matches, "book")?).await,
        Some(("bookmarks", sub_matches)) => commands::manage_bookmarks(&ctx, sub_matches),
        Some(("config", sub_matches)) => commands::config_command(&manager, &ctx, sub_matches),
        Some(("settings", sub_matches)) => commands::update_settings(&ctx, sub_matches),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
