//! Port abstraction for the controller's serial line.
//!
//! The [`Port`] trait is the raw byte pipe underneath a [`Line`](crate::Line).
//! The native implementation sits on the `serialport` crate; tests use an
//! in-memory double so the transceiver and watchdog can be exercised without
//! hardware.
//!
//! ```text
//! +-----------------------+
//! |  Transceiver / Frame  |
//! +-----------+-----------+
//!             |
//!             v
//! +-----------+-----------+
//! |  Line (+ Watchdog)    |
//! +-----------+-----------+
//!             |
//!             v
//! +-----------+-----------+
//! |  Port trait           |
//! +-----------+-----------+
//!             |
//!             v
//! +-----------------------+
//! |  NativePort           |
//! |  (serialport + tty)   |
//! +-----------------------+
//! ```

pub mod native;

#[cfg(unix)]
pub(crate) mod snapshot;

use std::io::{Read, Write};
use std::time::Duration;

use crate::error::{Error, Result};

/// Baud rate the C-863 ships with.
pub const DEFAULT_BAUD: u32 = 9600;

/// Inter-byte idle timeout of a single read (one tenth of a second).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial line configuration.
///
/// Character framing is fixed at 8N1 with no flow control; only the speed
/// and the per-read idle timeout can be tuned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineConfig {
    /// Baud rate.
    pub baud_rate: u32,
    /// How long a read waits for the first byte before reporting no data.
    pub idle_timeout: Duration,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl LineConfig {
    /// Create a configuration with the given baud rate.
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }

    /// Set the per-read idle timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Check the configuration can be applied to a line.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(Error::Config("baud rate must be non-zero".into()));
        }
        Ok(())
    }
}

/// Byte pipe to the controller.
///
/// Implementors must be `Send` so the watchdog can move the port onto its
/// reader thread for the duration of one read.
pub trait Port: Read + Write + Send {
    /// Get the port name/path.
    fn name(&self) -> &str;

    /// Discard anything pending in the input and output queues.
    fn clear_buffers(&mut self) -> Result<()>;
}

pub use native::NativePort;
