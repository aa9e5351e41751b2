// IP Info Bar - Main Entry Point
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! # IP Info Bar
//!
//! A status bar widget that shows one network fact at a time (LAN, WAN,
//! VPN addresses and SSH activity) and cycles through them on demand.
//!
//! Labels are written to stdout, one per line, and exposed on the session
//! bus for panels that prefer to poll or subscribe.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod application;
mod cycle;
mod labels;
mod models;
mod render;
mod scheduler;
mod services;
mod storage;
mod tray;

use application::{Application, RunOptions};
use models::{AppConfig, ViewMode};
use storage::SettingsStore;

/// Human-readable application name.
pub const APP_NAME: &str = "IP Info Bar";

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Print version information and exit.
fn print_version() {
    println!("{} {}", APP_NAME, VERSION);
    println!("Copyright (C) 2026 Christos A. Daggas");
    println!("License: MIT");
}

/// Print help information and exit.
fn print_help() {
    println!("Usage: {} [OPTIONS]", env::args().next().unwrap_or_else(|| "ip-info-bar".to_string()));
    println!();
    println!("Shows network addresses and SSH activity in a status bar, one label at a time.");
    println!();
    println!("Options:");
    println!("  -h, --help          Show this help message and exit");
    println!("  -v, --version       Show version information and exit");
    println!("  -d, --debug         Enable debug logging");
    println!("  -c, --config PATH   Use PATH as the settings file");
    println!("      --detailed      Show interface names and MAC addresses for this run");
    println!("      --simple        Show plain address labels for this run");
    println!("      --once          Refresh once, print the label and exit");
    println!("      --no-dbus       Do not export the D-Bus interface");
    println!("      --advance       Show the next label in the running instance and exit");
    println!("  -i, --interactive   Read commands from stdin (Enter = next, r = refresh, q = quit)");
    println!();
    println!("Data provider:");
    println!("  Runs `python3 $XDG_DATA_HOME/ip-info-bar/backend/utils.py` by default.");
    println!("  The script is not installed with this program; set [provider] in the");
    println!("  settings file to use another location or program.");
    println!();
    println!("Environment variables:");
    println!("  RUST_LOG            Set log level (trace, debug, info, warn, error)");
}

/// What the process was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Run,
    Once,
    Advance,
}

/// Parsed command line.
#[derive(Debug)]
struct Args {
    mode: Mode,
    debug: bool,
    config_path: Option<PathBuf>,
    view_override: Option<ViewMode>,
    options: RunOptions,
}

/// Parse arguments. `Err` carries the exit code for early exits.
fn parse_args(args: &[String]) -> Result<Args, ExitCode> {
    let mut parsed = Args {
        mode: Mode::Run,
        debug: false,
        config_path: None,
        view_override: None,
        options: RunOptions::default(),
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Err(ExitCode::SUCCESS);
            }
            "-v" | "--version" => {
                print_version();
                return Err(ExitCode::SUCCESS);
            }
            "-d" | "--debug" => parsed.debug = true,
            "-c" | "--config" => match iter.next() {
                Some(path) => parsed.config_path = Some(PathBuf::from(path)),
                None => {
                    eprintln!("Option {} requires a path", arg);
                    return Err(ExitCode::FAILURE);
                }
            },
            "--detailed" => parsed.view_override = Some(ViewMode::Detailed),
            "--simple" => parsed.view_override = Some(ViewMode::Simple),
            "--once" => parsed.mode = Mode::Once,
            "--advance" => parsed.mode = Mode::Advance,
            "--no-dbus" => parsed.options.no_dbus = true,
            "-i" | "--interactive" => parsed.options.interactive = true,
            _ => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Try '--help' for more information.");
                return Err(ExitCode::FAILURE);
            }
        }
    }

    Ok(parsed)
}

fn init_logging(debug_mode: bool, configured_level: &str) {
    let filter = if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(code) => return code,
    };

    let settings_path = args
        .config_path
        .clone()
        .unwrap_or_else(SettingsStore::default_path);

    // The subscriber must exist before the store logs anything.
    let log_level = AppConfig::load_from_file(&settings_path)
        .map(|c| c.log_level)
        .unwrap_or_else(|_| AppConfig::default().log_level);
    init_logging(args.debug, &log_level);

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(async {
        match args.mode {
            Mode::Advance => match tray::advance_running_instance().await {
                Ok(label) => {
                    println!("{}", label);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{}", e);
                    ExitCode::FAILURE
                }
            },
            Mode::Once | Mode::Run => {
                let settings = Arc::new(SettingsStore::with_file(settings_path));
                if let Some(mode) = args.view_override {
                    settings.override_view_mode(mode);
                }
                let app = Application::new(settings, args.options);

                if args.mode == Mode::Once {
                    let (label, ok) = app.run_once().await;
                    println!("{}", label);
                    return if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE };
                }

                match app.run().await {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(e) => {
                        tracing::error!("{}", e);
                        ExitCode::FAILURE
                    }
                }
            }
        }
    });

    // A pending stdin read would otherwise block shutdown.
    runtime.shutdown_timeout(Duration::from_millis(500));
    code
}
