//! The owned serial line.
//!
//! A [`Line`] is the single live connection to the controller. It owns the
//! port handle and, on unix, a snapshot of the device's terminal attributes
//! taken before the line was configured. Closing restores the snapshot first
//! and then releases the handle; closing again does nothing.
//!
//! Only one line opened from a device path may be live per process. The
//! claim is taken in [`Line::open`] and given back when the line closes.

use {
    crate::{
        error::{Error, Result},
        port::{LineConfig, NativePort, Port},
        protocol::Frame,
    },
    log::{debug, info, trace, warn},
    std::{
        io::Write as _,
        sync::atomic::{AtomicBool, Ordering},
    },
};

#[cfg(unix)]
use crate::port::snapshot::TermiosSnapshot;

static LINE_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Process-wide claim on the one device line.
struct LineClaim;

impl LineClaim {
    fn acquire() -> Option<Self> {
        LINE_CLAIMED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self)
    }
}

impl Drop for LineClaim {
    fn drop(&mut self) {
        LINE_CLAIMED.store(false, Ordering::SeqCst);
    }
}

/// Exclusively owned serial line to the controller.
pub struct Line {
    port: Option<Box<dyn Port>>,
    name: String,
    #[cfg(unix)]
    snapshot: Option<TermiosSnapshot>,
    claim: Option<LineClaim>,
}

impl Line {
    /// Open and configure the device at `path`.
    ///
    /// The current terminal attributes are saved and both queues are flushed
    /// before the line is switched to raw 8N1 at the configured speed.
    pub fn open(path: &str, config: &LineConfig) -> Result<Self> {
        config.validate()?;
        let claim = LineClaim::acquire().ok_or_else(|| Error::Busy(path.to_string()))?;

        debug!("Open {path}");

        #[cfg(unix)]
        let snapshot = {
            let snapshot = TermiosSnapshot::capture(path).map_err(|e| Error::open(path, e))?;
            snapshot
                .flush()
                .map_err(|e| Error::open(path, e))?;
            snapshot
        };

        let port = settle(path, NativePort::open(path, config), || {
            #[cfg(unix)]
            {
                if let Err(restore_err) = snapshot.restore() {
                    warn!("Failed to restore {path} after open error: {restore_err}");
                }
            }
        })?;

        info!("Opened {path} at {} baud", config.baud_rate);

        Ok(Self {
            port: Some(Box::new(port)),
            name: path.to_string(),
            #[cfg(unix)]
            snapshot: Some(snapshot),
            claim: Some(claim),
        })
    }

    /// Adopt an already configured port.
    ///
    /// The line takes no process-wide claim and has no attributes to
    /// restore; closing it only releases the port.
    pub fn from_port<P: Port + 'static>(port: P) -> Self {
        Self {
            name: port
                .name()
                .to_string(),
            port: Some(Box::new(port)),
            #[cfg(unix)]
            snapshot: None,
            claim: None,
        }
    }

    /// Device name/path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the line still holds a usable handle.
    pub fn is_open(&self) -> bool {
        self.port
            .is_some()
    }

    /// Write a frame in one go.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let port = self
            .port
            .as_mut()
            .ok_or(Error::LineClosed)?;
        trace!("Writing {} bytes: {:02X?}", frame.len(), frame.as_bytes());
        port.write_all(frame.as_bytes())?;
        port.flush()?;
        Ok(())
    }

    /// Restore the saved attributes and release the handle.
    ///
    /// Closing a closed line is a no-op.
    pub fn close(&mut self) {
        let Some(port) = self
            .port
            .take()
        else {
            trace!("{} already closed", self.name);
            return;
        };

        self.restore_attributes();
        drop(port);
        self.claim = None;
        debug!("Close {}", self.name);
    }

    /// Mark the line closed after its handle was abandoned.
    ///
    /// Used by the watchdog when a read overruns its deadline. The handle may
    /// still be held by the stalled read; the attributes are restored through
    /// the snapshot descriptor regardless.
    pub(crate) fn force_close(&mut self) {
        warn!("Forcing {} closed", self.name);
        self.port
            .take();
        self.restore_attributes();
        self.claim = None;
    }

    /// Take the handle out for a guarded read.
    pub(crate) fn take_port(&mut self) -> Option<Box<dyn Port>> {
        self.port
            .take()
    }

    /// Give back a handle taken with [`take_port`](Self::take_port).
    pub(crate) fn return_port(&mut self, port: Box<dyn Port>) {
        self.port = Some(port);
    }

    fn restore_attributes(&mut self) {
        #[cfg(unix)]
        {
            if let Some(snapshot) = self
                .snapshot
                .take()
            {
                if let Err(e) = snapshot.restore() {
                    warn!("Failed to restore attributes of {}: {e}", self.name);
                }
            }
        }
    }
}

/// Clear the queues of a freshly configured port.
///
/// If opening or clearing failed, `undo` puts the device back before the
/// error is returned.
fn settle<P: Port>(path: &str, opened: Result<P>, undo: impl FnOnce()) -> Result<P> {
    opened
        .and_then(|mut port| {
            port.clear_buffers()?;
            Ok(port)
        })
        .map_err(|e| {
            undo();
            Error::open(path, e)
        })
}

impl Drop for Line {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Line")
            .field("name", &self.name)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
