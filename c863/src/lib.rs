//! # c863
//!
//! Serial transport and command framing for PI C-863 "Mercury" DC motor
//! controllers.
//!
//! This crate provides the pieces needed to issue a single ASCII command to
//! the controller and collect its reply:
//!
//! - [`Line`]: exclusive ownership of the serial device, with the original
//!   terminal attributes restored on close
//! - [`Watchdog`]: a per-read deadline that abandons and closes a stalled line
//! - [`Transceiver`]: command framing, write, and bounded reply polling
//! - [`LogicalCommand`] / [`dispatch`]: named operations such as `home`
//!
//! ## Example
//!
//! ```rust,no_run
//! use c863::{Line, LineConfig, LogicalCommand, Transceiver, dispatch};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut line = Line::open("/dev/ttyS0", &LineConfig::default())?;
//!     let transceiver = Transceiver::default();
//!
//!     for outcome in dispatch(&transceiver, &mut line, &LogicalCommand::Position)? {
//!         println!("{}", String::from_utf8_lossy(outcome.reply()));
//!     }
//!
//!     line.close();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::{Arc, OnceLock};

pub mod command;
pub mod error;
pub mod line;
pub mod port;
pub mod protocol;
pub mod transceiver;
pub mod watchdog;

#[cfg(test)]
pub(crate) mod mock;

static INTERRUPT_CHECKER: OnceLock<Arc<dyn Fn() -> bool + Send + Sync>> = OnceLock::new();

/// Register a global interruption checker consulted between reply polls.
///
/// The checker should return `true` when the current operation should stop
/// (for example after receiving Ctrl-C in CLI applications).
pub fn set_interrupt_checker<F>(checker: F)
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    let _ = INTERRUPT_CHECKER.set(Arc::new(checker));
}

/// Returns whether interruption was requested by the embedding application.
#[must_use]
pub fn is_interrupted_requested() -> bool {
    INTERRUPT_CHECKER
        .get()
        .is_some_and(|checker| checker())
}

#[cfg(test)]
pub(crate) fn test_set_interrupted(value: bool) {
    use std::sync::atomic::{AtomicBool, Ordering};

    static TEST_INTERRUPT_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

    let flag = TEST_INTERRUPT_FLAG
        .get_or_init(|| {
            let shared = Arc::new(AtomicBool::new(false));
            let checker = Arc::clone(&shared);
            set_interrupt_checker(move || checker.load(Ordering::Relaxed));
            shared
        })
        .clone();

    flag.store(value, Ordering::Relaxed);
}

// Re-exports for convenience
pub use {
    command::{LogicalCommand, dispatch},
    error::{Error, Result},
    line::Line,
    port::{DEFAULT_BAUD, DEFAULT_IDLE_TIMEOUT, LineConfig, NativePort, Port},
    protocol::{Frame, filter_reply},
    transceiver::{
        DEFAULT_POLL_INTERVAL, DEFAULT_RETRIES, RESPONSE_CAPACITY, SendOutcome, Transceiver,
        TransceiverConfig,
    },
    watchdog::{DEFAULT_WATCHDOG_TIMEOUT, Watchdog},
};
