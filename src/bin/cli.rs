//! Game launcher CLI
//!
//! Terminal front end: shows server content, installs the client and
//! starts it.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use launcher::{
    error::Result,
    launcher::{LaunchState, Launcher, LauncherPaths},
    models::{
        BoostedCreature, BoostedPair, Config, CountdownEvent, format_for_display, format_online,
        format_with_highlight,
    },
    updater::Progress,
    utils::log as steps,
};

/// Game launcher
#[derive(Parser, Debug)]
#[command(
    name = "launcher",
    version,
    about = "Keeps the game client up to date and shows server news"
)]
struct Cli {
    /// Launcher settings file (default: {base_dir}/launcher.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Installation directory (default: the launcher's own directory)
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the startup checks and show everything
    Status,

    /// Show the latest news
    News {
        /// Mark this entry (0-based) as the current one
        #[arg(long)]
        highlight: Option<usize>,
    },

    /// Show today's boosted creature and boss
    Boosted {
        #[arg(long)]
        force: bool,
    },

    /// Show upcoming events
    Countdowns {
        /// Keep refreshing the remaining time every second
        #[arg(long)]
        watch: bool,
    },

    /// Show the number of players online
    Online {
        #[arg(long)]
        force: bool,
    },

    /// News, countdowns and boosted creatures from a single request
    Overview {
        #[arg(long)]
        force: bool,
    },

    /// Download and install the latest client
    Update,

    /// Replace this launcher with the latest release
    SelfUpdate,

    /// Install the client if needed, then start it
    Play,

    /// Validate the settings file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Single-line progress on stderr.
fn show_progress(progress: Progress) {
    let mut err = std::io::stderr();
    let _ = write!(err, "\r{:<60}", progress.to_string());
    if progress.percent == Some(100) {
        let _ = writeln!(err);
    }
    let _ = err.flush();
}

fn print_creature(label: &str, creature: &BoostedCreature) {
    println!("{label}: {}", creature.name);
    if let Some(url) = &creature.image_url {
        println!("    {url}");
    }
}

fn print_boosted(pair: &BoostedPair) {
    print_creature("Boosted creature", &pair.creature);
    print_creature("Boosted boss", &pair.boss);
}

fn print_countdowns(events: &[CountdownEvent]) {
    let now = Utc::now();
    if events.is_empty() {
        println!("No upcoming events");
    }
    for event in events {
        println!("{:<30} {}", event.name, event.format_remaining(now));
    }
}

fn print_state(launcher: &Launcher, state: &LaunchState) {
    println!("{}\n", format_for_display(&state.news));
    print_boosted(&state.boosted);
    println!();
    print_countdowns(&state.countdowns);
    println!("\n{}", format_online(state.online));

    steps::separator();
    steps::summary(
        "Launcher status",
        &[
            ("Client folder", launcher.paths().client.display().to_string()),
            (
                "Client version",
                state.client_version.clone().unwrap_or_else(|| "unknown".into()),
            ),
            (
                "Client update",
                if state.client_update_needed { "needed" } else { "up to date" }.into(),
            ),
            (
                "Launcher update",
                state
                    .launcher_update
                    .clone()
                    .unwrap_or_else(|| "none".into()),
            ),
        ],
    );
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => LauncherPaths::current_base_dir()?,
    };
    let config_path = cli.config.unwrap_or_else(|| base_dir.join("launcher.toml"));
    let config = Arc::new(Config::load_or_default(&config_path));
    let connect = || Launcher::connect(Arc::clone(&config), base_dir.clone());

    match cli.command {
        Command::Status => {
            let launcher = connect().await?;
            steps::header("Starting launcher");
            let state = launcher.prepare().await;
            print_state(&launcher, &state);
        }

        Command::News { highlight } => {
            let launcher = connect().await?;
            let items = launcher.news().fetch().await;
            let text = match highlight {
                Some(index) => format_with_highlight(&items, index),
                None => format_for_display(&items),
            };
            println!("{text}");
        }

        Command::Boosted { force } => {
            let launcher = connect().await?;
            print_boosted(&launcher.boosted().fetch(force).await);
        }

        Command::Countdowns { watch } => {
            let launcher = connect().await?;
            let events = launcher.countdowns().fetch(false).await;
            print_countdowns(&events);

            if watch && !events.is_empty() {
                let mut ticker = tokio::time::interval(Duration::from_secs(1));
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    println!();
                    print_countdowns(&events);
                    let now = Utc::now();
                    if events.iter().all(|e| e.remaining(now).is_zero()) {
                        break;
                    }
                }
            }
        }

        Command::Online { force } => {
            let launcher = connect().await?;
            println!("{}", format_online(launcher.online().fetch(force).await));
        }

        Command::Overview { force } => {
            let launcher = connect().await?;
            let data = launcher.overview(force).await;
            println!("{}\n", format_for_display(&data.news));
            print_creature("Boosted creature", &data.boosted_creature);
            print_creature("Boosted boss", &data.boosted_boss);
            println!();
            print_countdowns(&data.countdowns);
            ::log::info!(
                "Fetched at {}{}",
                data.fetched_at.format("%Y-%m-%d %H:%M:%S"),
                if data.from_cache { " (cached)" } else { "" }
            );
        }

        Command::Update => {
            let launcher = connect().await?;
            let version = launcher.update_client(&show_progress).await?;
            ::log::info!(
                "Client is up to date ({})",
                version.as_deref().unwrap_or("unknown version")
            );
        }

        Command::SelfUpdate => {
            let launcher = connect().await?;
            launcher.self_update(&show_progress).await?;
            ::log::info!("New launcher started; exiting");
        }

        Command::Play => {
            let launcher = connect().await?;
            steps::header("Starting launcher");
            let state = launcher.prepare().await;
            if let Some(version) = &state.launcher_update {
                ::log::warn!(
                    "Launcher {} is available; run `launcher self-update` to install it",
                    version
                );
            }
            let child = launcher.play(&state, &show_progress).await?;
            ::log::info!("Client started (pid {})", child.id());
        }

        Command::Validate => {
            ::log::info!("Validating {}...", config_path.display());
            if let Err(e) = config.validate() {
                ::log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            ::log::info!("✓ Config OK (includes site URLs and extraction patterns)");
        }
    }

    Ok(())
}
