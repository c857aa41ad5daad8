//! gestref – replay a scripted input stream against a scene of gestures.
//!
//! CLI entry point.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::SystemTime;

use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record};

use gestref::config::{AppConfig, parse_config_file};
use gestref::scene::{Replay, parse_scene_file};

#[derive(Parser)]
#[command(name = "gestref", about = "Replay input events through the gesture referee")]
struct Cli {
    /// Path to the scene file (nodes, gestures and events)
    scene: PathBuf,

    /// Path to a thresholds configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Simple logger that writes to stderr and optionally to a log file.
struct GestrefLogger {
    level: LevelFilter,
    file: Option<Mutex<std::fs::File>>,
}

impl Log for GestrefLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("gestref")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let line = format!("[{secs} {level} {}] {}\n", record.target(), record.args());

        eprint!("{line}");

        if let Some(ref file_mutex) = self.file {
            if let Ok(mut f) = file_mutex.lock() {
                let _ = f.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Some(ref file_mutex) = self.file {
            if let Ok(mut f) = file_mutex.lock() {
                let _ = f.flush();
            }
        }
    }
}

fn init_logging(config: &AppConfig, verbose: bool) {
    // CLI --verbose overrides the config file setting.
    let log_level: LevelFilter = if verbose {
        LevelFilter::Debug
    } else {
        config.log_level.parse().unwrap_or(LevelFilter::Info)
    };

    let log_file = config.log_file.as_deref().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Mutex::new(file)),
            Err(e) => {
                eprintln!("Warning: cannot open log file '{path}': {e}");
                None
            }
        }
    });

    let logger = GestrefLogger {
        level: log_level,
        file: log_file,
    };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(log_level);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Parse config first (before logger init) so we can read the configured log level.
    let config = match &cli.config {
        Some(path) => match parse_config_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };
    init_logging(&config, cli.verbose);

    let scene = match parse_scene_file(&cli.scene) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Replaying {} events over {} nodes from {}",
        scene.events.len(),
        scene.nodes.len(),
        cli.scene.display()
    );

    let mut replay = match Replay::new(scene, config.settings) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let fired = replay.run();
    for callback in &fired {
        println!("{}", callback.summary());
    }
    log::info!("{} callbacks fired", fired.len());

    ExitCode::SUCCESS
}
