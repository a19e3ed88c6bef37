//! Send one framed command and poll for the controller's reply.
//!
//! The controller answers asynchronously, so after writing a frame the
//! transceiver sleeps a fixed interval and tries one guarded read, up to a
//! fixed number of attempts. The first read that yields any bytes ends the
//! exchange; its content is not checked against the command sent.

use {
    crate::{
        error::Result,
        line::Line,
        protocol::{Frame, filter_reply},
        watchdog::{DEFAULT_WATCHDOG_TIMEOUT, Watchdog},
    },
    log::{debug, trace, warn},
    std::{thread, time::Duration},
};

/// Poll attempts made after each command.
pub const DEFAULT_RETRIES: u32 = 10;

/// Sleep before each poll attempt.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Capacity of the buffer handed to each read.
pub const RESPONSE_CAPACITY: usize = 256;

/// Result of one command exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The controller answered; terminators are already stripped.
    Success {
        /// Filtered reply bytes.
        reply: Vec<u8>,
    },
    /// Every poll attempt came back empty.
    NoResponse,
    /// The line was closed before or during the exchange.
    LineFault,
    /// The embedding application asked to stop.
    Interrupted,
}

impl SendOutcome {
    /// Whether any reply was received.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The filtered reply, empty unless successful.
    pub fn reply(&self) -> &[u8] {
        match self {
            Self::Success { reply } => reply,
            _ => &[],
        }
    }
}

/// Timing parameters for an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransceiverConfig {
    /// Poll attempts before giving up.
    pub retries: u32,
    /// Sleep before each poll attempt.
    pub poll_interval: Duration,
    /// Deadline for each individual read.
    pub watchdog_timeout: Duration,
}

impl Default for TransceiverConfig {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            poll_interval: DEFAULT_POLL_INTERVAL,
            watchdog_timeout: DEFAULT_WATCHDOG_TIMEOUT,
        }
    }
}

/// Command transceiver.
#[derive(Debug, Clone)]
pub struct Transceiver {
    watchdog: Watchdog,
    retries: u32,
    poll_interval: Duration,
    interrupted: fn() -> bool,
}

impl Default for Transceiver {
    fn default() -> Self {
        Self::new(&TransceiverConfig::default())
    }
}

impl Transceiver {
    /// Create a transceiver from its timing parameters.
    ///
    /// A retry count of zero is raised to one so every send polls at least
    /// once.
    pub fn new(config: &TransceiverConfig) -> Self {
        Self {
            watchdog: Watchdog::new(config.watchdog_timeout),
            retries: config.retries.max(1),
            poll_interval: config.poll_interval,
            interrupted: crate::is_interrupted_requested,
        }
    }

    /// Replace the interruption check consulted before each poll.
    #[must_use]
    pub fn with_interrupt_check(mut self, interrupted: fn() -> bool) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Poll attempts per send.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Frame `text` and exchange it with the controller.
    ///
    /// Only text that cannot be framed is an `Err`; everything that happens
    /// on the line is reported through [`SendOutcome`].
    pub fn send(&self, line: &mut Line, text: &str) -> Result<SendOutcome> {
        let frame = Frame::new(text)?;
        Ok(self.send_frame(line, &frame))
    }

    /// Exchange an already built frame with the controller.
    pub fn send_frame(&self, line: &mut Line, frame: &Frame) -> SendOutcome {
        debug!("Sending {:?} to {}", frame.text(), line.name());

        if !line.is_open() {
            warn!("Cannot send {:?}: {} is closed", frame.text(), line.name());
            return SendOutcome::LineFault;
        }

        // The reply poll runs even if the write fails; a dead line shows up
        // as a failed read below.
        if let Err(e) = line.write_frame(frame) {
            warn!("Write of {:?} to {} failed: {e}", frame.text(), line.name());
        }

        let mut retries = self.retries;
        while retries > 0 {
            if (self.interrupted)() {
                debug!("Interrupted while waiting for reply to {:?}", frame.text());
                return SendOutcome::Interrupted;
            }

            thread::sleep(self.poll_interval);

            let mut buf = [0u8; RESPONSE_CAPACITY];
            let n = self
                .watchdog
                .guard_read(line, &mut buf);
            if n > 0 {
                let reply = filter_reply(&buf[..n]);
                debug!("Reply to {:?}: {n} bytes", frame.text());
                return SendOutcome::Success { reply };
            }

            retries -= 1;
            if !line.is_open() {
                warn!("{} closed while waiting for reply to {:?}", line.name(), frame.text());
                return SendOutcome::LineFault;
            }
            trace!("No reply yet, {retries} attempts left");
        }

        debug!("No reply to {:?} after {} attempts", frame.text(), self.retries);
        SendOutcome::NoResponse
    }
}
