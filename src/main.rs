//! wconsole - Windows console surface negotiation
//!
//! wconsole prepares the host console for a full-screen text renderer: it
//! opens the console streams, remembers the original input mode and cursor,
//! enables window-resize notifications, sizes the screen buffer and window
//! to a usable cell geometry (never below the platform's minimum window
//! size), hides the cursor, and puts everything back on exit.
//!
//! # Quick Start
//!
//! ```text
//! wconsole                  # Negotiate and hold the surface until q/Esc
//! wconsole --check          # Negotiate, print the geometry, restore, exit
//! wconsole --overwrite-mode # Replace the input mode instead of extending it
//! ```

mod config;
mod console;
mod surface;

use std::env;
use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;
use crate::console::ModePolicy;

/// Command line flags
#[derive(Debug, Default)]
struct Cli {
    /// Negotiate, report, tear down
    check: bool,
    /// Use `ModePolicy::Overwrite`
    overwrite_mode: bool,
    /// Leave the cursor visible
    show_cursor: bool,
}

impl Cli {
    /// Command line flags override the config file.
    fn apply(&self, config: &mut Config) {
        if self.overwrite_mode {
            config.console.mode_policy = ModePolicy::Overwrite;
        }
        if self.show_cursor {
            config.console.hide_cursor = false;
        }
    }
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    eprintln!("wconsole {} - Windows console surface negotiation", VERSION);
    eprintln!();
    eprintln!("Usage: wconsole [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --check               Negotiate, print the geometry, restore and exit");
    eprintln!("  --overwrite-mode      Replace the input mode with window input only");
    eprintln!("  --show-cursor         Keep the cursor visible");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.wconsole/config.toml");
    eprintln!("Log file:      ~/.wconsole/wconsole.log (filter with RUST_LOG)");
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Option<Cli>, String> {
    let mut cli = Cli::default();

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            "-v" | "--version" => {
                eprintln!("wconsole {}", VERSION);
                return Ok(None);
            }
            "--check" => cli.check = true,
            "--overwrite-mode" => cli.overwrite_mode = true,
            "--show-cursor" => cli.show_cursor = true,
            other => {
                return Err(format!("Unknown argument: {}. Use -h for help.", other));
            }
        }
    }

    Ok(Some(cli))
}

/// Log to `~/.wconsole/wconsole.log`; the console belongs to the renderer.
fn init_logging(level: &str) {
    let log_path = Config::dir()
        .map(|dir| dir.join("wconsole.log"))
        .unwrap_or_else(|| PathBuf::from("wconsole.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> anyhow::Result<()> {
    let cli = match parse_args(env::args().skip(1)) {
        Ok(Some(cli)) => cli,
        Ok(None) => return Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let (mut config, config_error) = Config::load();
    cli.apply(&mut config);
    init_logging(&config.log_level);

    info!("wconsole {} starting...", VERSION);
    if let Some(e) = config_error {
        warn!("ignoring malformed config: {}", e);
    }

    #[cfg(not(windows))]
    {
        eprintln!("wconsole negotiates the Windows console and only runs on Windows.");
        std::process::exit(1);
    }

    #[cfg(windows)]
    {
        run(cli.check, config)?;
    }

    Ok(())
}

/// Negotiate the console, hand it to the surface, restore it.
#[cfg(windows)]
fn run(check_only: bool, config: Config) -> anyhow::Result<()> {
    use crate::console::{signal, ConsoleError, ConsoleNegotiator, Win32Console};
    use tracing::error;

    fn fatal(err: ConsoleError) -> ! {
        error!("console negotiation failed at {}: {}", err.step(), err);
        eprintln!("error: {} failed: {}", err.step(), err);
        std::process::exit(1);
    }

    let console = Win32Console::attach().unwrap_or_else(|e| fatal(e));
    let negotiator = ConsoleNegotiator::new(config.console.options());
    let mut session = negotiator
        .negotiate(console)
        .unwrap_or_else(|e| fatal(e));

    let geometry = session.geometry();
    match session.buffer_size() {
        Ok(buffer) => info!("surface geometry {}, screen buffer {}", geometry, buffer),
        Err(e) => warn!("could not re-read screen buffer: {}", e),
    }

    if check_only {
        let failures = session.teardown();
        println!("{}", geometry);
        if !failures.is_empty() {
            warn!("{} teardown step(s) failed", failures.len());
        }
        return Ok(());
    }

    if let Err(e) = signal::install(session.interrupt_event()) {
        warn!("control events will terminate without restore: {}", e);
    }

    let result = surface::run(&mut session, &mut std::io::stdout(), signal::interrupted);

    signal::detach_event();
    let failures = session.teardown();
    signal::uninstall();
    if !failures.is_empty() {
        warn!("{} teardown step(s) failed", failures.len());
    }
    info!("wconsole exiting");

    result
}
