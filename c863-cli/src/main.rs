//! c863 CLI - send a single command to a PI C-863 motor controller.
//!
//! ```text
//! c863 /dev/ttyS0 home
//! c863 /dev/ttyS0 "TT,TP"
//! ```
//!
//! The controller's reply is written to stdout with its terminators removed.

use anyhow::{Context, Result};
use c863::{Line, LogicalCommand, SendOutcome, Transceiver, dispatch};
use clap::{CommandFactory, FromArgMatches, Parser, error::ErrorKind};
use console::style;
use env_logger::Env;
use log::{debug, info, warn};
use std::env;
use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

mod config;

use config::Config;

/// Set by the Ctrl-C handler.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Exit code used when the user interrupts a command.
const EXIT_INTERRUPTED: i32 = 130;

/// c863 - send a single command to a PI C-863 motor controller.
///
/// Environment variables:
///   C863_BAUD  - Line baud rate (default: 9600)
///   RUST_LOG   - Log filter, overrides -v/-q
#[derive(Parser)]
#[command(name = "c863")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial device the controller is attached to (e.g. /dev/ttyS0).
    device: String,

    /// Command to run; anything not listed below is sent verbatim.
    command: String,

    /// Line baud rate [default: 9600].
    #[arg(short, long, env = "C863_BAUD")]
    baud: Option<u32>,

    /// Verbose output level (-v, -vv, -vvv for increasing detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only report errors).
    #[arg(short, long)]
    quiet: bool,

    /// Path to a configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
}

/// The controller command table shown after the option help.
fn commands_help() -> String {
    let mut help = String::from("Controller commands:\n");
    for command in LogicalCommand::ALL {
        let _ = writeln!(help, "  {:<7} {}", command.name(), command.description());
    }
    let _ = writeln!(
        help,
        "  {:<7} other commands are sent directly to the motor controller!",
        "..."
    );
    help.push_str("\nPut -- before a controller command that starts with '-':\n");
    help.push_str("  c863 /dev/ttyS0 -- -5\n");
    help
}

fn build_command() -> clap::Command {
    Cli::command().after_help(commands_help())
}

fn main() -> Result<()> {
    let mut command = build_command();
    let matches = match command.try_get_matches_from_mut(env::args_os()) {
        Ok(matches) => matches,
        Err(err) => match err.kind() {
            // Wrong number of arguments: show usage and leave quietly.
            ErrorKind::MissingRequiredArgument
            | ErrorKind::UnknownArgument
            | ErrorKind::TooManyValues
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                command.print_help()?;
                return Ok(());
            },
            _ => err.exit(),
        },
    };
    let cli = Cli::from_arg_matches(&matches)?;

    // --- NO_COLOR and TTY detection ---
    if env::var("NO_COLOR").is_ok() || !console::Term::stderr().is_term() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    init_logging(&cli);

    debug!(
        "c863 v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    let config = if let Some(ref path) = cli.config_path {
        Config::load_from_path(path)
    } else {
        Config::load()
    };

    let interrupted = cmd_send(&cli, &config)?;
    if interrupted {
        std::process::exit(EXIT_INTERRUPTED);
    }

    Ok(())
}

/// Setup logging based on verbosity.
fn init_logging(cli: &Cli) {
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();
}

/// Route Ctrl-C into the library's interrupt checker.
fn install_interrupt_handler() {
    if let Err(e) = ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst)) {
        warn!("Could not install Ctrl-C handler: {e}");
    }
    c863::set_interrupt_checker(|| INTERRUPTED.load(Ordering::SeqCst));
}

/// Open the line, run the command and print the replies.
///
/// Returns whether the user interrupted the exchange.
fn cmd_send(cli: &Cli, config: &Config) -> Result<bool> {
    let command = LogicalCommand::parse(&cli.command);

    // Refuse text that cannot be framed before the device is touched.
    command
        .frames()
        .with_context(|| format!("Cannot send {:?}", cli.command))?;

    install_interrupt_handler();

    let line_config = config.line_config(cli.baud);
    let mut line = Line::open(&cli.device, &line_config)
        .with_context(|| format!("Failed to connect to controller on {}", cli.device))?;

    let transceiver = Transceiver::new(&config.transceiver_config());
    let outcomes = dispatch(&transceiver, &mut line, &command);

    line.close();

    let mut interrupted = false;
    let mut stdout = io::stdout().lock();
    for (outcome, text) in outcomes?
        .iter()
        .zip(command.wire_texts())
    {
        match outcome {
            SendOutcome::Success { reply } => {
                stdout.write_all(reply)?;
            },
            SendOutcome::NoResponse => {
                info!("No reply to {text:?} from {}", cli.device);
            },
            SendOutcome::LineFault => {
                warn!("Line to {} failed while sending {text:?}", cli.device);
            },
            SendOutcome::Interrupted => {
                interrupted = true;
            },
        }
    }
    stdout.flush()?;

    if interrupted && !cli.quiet {
        eprintln!("{} {}", style("⚠").yellow(), style("Interrupted").yellow());
    }

    Ok(interrupted)
}
