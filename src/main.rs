//! speakwave main entry point
//!
//! Loads the configuration, picks a speech backend, opens the audio device
//! and hands control to the terminal UI until the user quits.

use anyhow::{bail, Context};
use log::{debug, error, info};
use speakwave::config::Config;
use speakwave::session::Session;
use speakwave::ui::{self, TerminalGuard};
use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

/// Command line options
struct Options {
    debug: bool,
    config: Option<PathBuf>,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut options = Options {
            debug: false,
            config: None,
        };
        let mut args = args.skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" | "-d" => options.debug = true,
                "--config" | "-c" => {
                    let path = args.next().context("--config needs a path")?;
                    options.config = Some(PathBuf::from(path));
                }
                "--help" | "-h" => {
                    println!("Usage: speakwave [--debug|-d] [--config <path>]");
                    process::exit(0);
                }
                "--version" | "-V" => {
                    println!("{} {}", speakwave::APP_NAME, speakwave::VERSION);
                    process::exit(0);
                }
                other => bail!("Unknown argument: {}", other),
            }
        }
        Ok(options)
    }
}

fn main() {
    let options = match Options::parse(std::env::args()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: speakwave [--debug|-d] [--config <path>]");
            process::exit(2);
        }
    };

    init_logging(options.debug);

    // Run the application
    if let Err(e) = run(&options) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Initialize logger
///
/// stderr belongs to the TUI, so logs always go to a file.
fn init_logging(debug_mode: bool) {
    let (path, level) = if debug_mode {
        // Debug mode: write to speakwave.log in the working directory
        (PathBuf::from("speakwave.log"), log::LevelFilter::Debug)
    } else {
        let dir = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(speakwave::APP_NAME);
        if let Err(e) = fs::create_dir_all(&dir) {
            eprintln!("Warning: Failed to create {}: {}", dir.display(), e);
        }
        (dir.join("speakwave.log"), log::LevelFilter::Warn)
    };

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(log_file) => {
            env_logger::Builder::new()
                .filter_level(level)
                .target(env_logger::Target::Pipe(Box::new(log_file)))
                .init();
        }
        Err(e) => {
            eprintln!("Warning: Failed to open {} for logging: {}", path.display(), e);
            eprintln!("Continuing without file logging...");
            env_logger::Builder::new()
                .filter_level(log::LevelFilter::Off)
                .init();
        }
    }

    if debug_mode {
        info!(
            "speakwave version {} starting (debug mode, logging to {})",
            speakwave::VERSION,
            path.display()
        );
    }
}

fn run(options: &Options) -> anyhow::Result<()> {
    debug!("Initializing speakwave");

    // The TUI needs an interactive terminal
    if !io::stdout().is_terminal() || !io::stdin().is_terminal() {
        bail!("speakwave requires an interactive terminal (stdin/stdout is not a TTY)");
    }

    let config = match &options.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    info!("Config loaded from {:?}", config.path());

    // Backend and audio device before touching the terminal, so errors print normally
    let mut session = Session::from_config(&config).context("Failed to start speech session")?;
    info!("Using {} synthesis", session.synth_name());

    let _guard = TerminalGuard::new().context("Failed to set up terminal")?;
    ui::run(&config, &mut session).context("Terminal UI failed")?;

    info!("speakwave exiting");
    Ok(())
}
