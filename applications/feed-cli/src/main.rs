/// Fuplay Feed - headless vertical video feed
use clap::{Parser, Subcommand};
use feed_cli::{library, AppConfig, CliError, Input, Session, HELP};
use fuplay_catalog::DirectoryPermissionGate;
use fuplay_core::{format_duration, group_by_folder, MediaItem};
use fuplay_feed::{ClockBackend, FeedDispatcher};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fuplay-feed")]
#[command(about = "Vertical video feed over local media directories", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./fuplay.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List videos grouped by folder
    List {
        /// Directories to scan (overrides library.directories)
        dirs: Vec<PathBuf>,
    },
    /// Page through videos interactively
    Play {
        /// Directories to scan (overrides library.directories)
        dirs: Vec<PathBuf>,

        /// Only play videos from this folder
        #[arg(short, long)]
        folder: Option<String>,

        /// Video to start on (1-based)
        #[arg(short, long, default_value_t = 1)]
        start: usize,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries feed output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fuplay_feed=info,feed_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::List { dirs } => {
            let items = scan(&config, &dirs)?;
            list(items);
        }
        Commands::Play {
            dirs,
            folder,
            start,
            json,
        } => {
            let items = library::select_folder(scan(&config, &dirs)?, folder.as_deref())?;
            play(&config, items, start, json).await?;
        }
    }

    Ok(())
}

fn scan(config: &AppConfig, dirs: &[PathBuf]) -> feed_cli::Result<Vec<MediaItem>> {
    let directories = config.directories(dirs);
    if directories.is_empty() {
        return Err(CliError::Config(
            "no library directories; pass DIRS or set library.directories".to_string(),
        ));
    }

    let gate = DirectoryPermissionGate::new(directories.clone());
    let catalog = library::catalog(&config.library, directories);
    library::load_items(&gate, &catalog)
}

fn list(items: Vec<MediaItem>) {
    for folder in group_by_folder(items) {
        println!(
            "{} ({} videos, {})",
            folder.name,
            folder.len(),
            format_duration(folder.total_duration_ms())
        );
        for item in &folder.items {
            println!("  {:>4}  {}  {}", item.id.0, item.formatted_duration(), item.display_name);
        }
    }
}

async fn play(config: &AppConfig, items: Vec<MediaItem>, start: usize, json: bool) -> anyhow::Result<()> {
    if start == 0 || start > items.len() {
        anyhow::bail!("--start must be between 1 and {}", items.len());
    }

    let mut session = Session::new(items.clone(), json);
    let (dispatcher, feed, mut events) =
        FeedDispatcher::new(items, Box::new(ClockBackend::new()), &config.feed)?;
    let task = dispatcher.spawn();

    tracing::info!(start, "Feed started");
    feed.focus(start - 1)?;
    if !json {
        println!("Type 'help' for commands.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if let Some(line) = session.observe(&event) {
                    println!("{line}");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Input>() {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => println!("{HELP}"),
                    Ok(input) => match session.commands(input) {
                        Ok(commands) => {
                            for command in commands {
                                feed.send(command)?;
                            }
                        }
                        Err(e) => eprintln!("{e}"),
                    },
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    feed.shutdown()?;
    task.await?;
    tracing::info!("Feed stopped");

    Ok(())
}
