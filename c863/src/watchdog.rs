//! Deadline guard around a single line read.
//!
//! Serial drivers and misbehaving devices can leave a read blocked forever.
//! [`Watchdog::guard_read`] moves the port onto a short-lived reader thread
//! and waits for it with a deadline. If the deadline passes first, the read
//! is abandoned and the line is forced closed: the process always makes
//! progress, even if that costs the line.
//!
//! Every failure reports zero bytes. Callers only see "got data" or "did
//! not"; whether the line survived is visible through [`Line::is_open`].

use {
    crate::{line::Line, port::Port},
    log::{trace, warn},
    std::{
        io::{self, Read as _},
        sync::mpsc::{self, RecvTimeoutError},
        thread,
        time::Duration,
    },
};

/// How long one read may take before the line is given up.
pub const DEFAULT_WATCHDOG_TIMEOUT: Duration = Duration::from_secs(5);

/// Hand-off from the reader thread back to the caller.
type ReadReturn = (Box<dyn Port>, Vec<u8>, io::Result<usize>);

/// Per-read deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watchdog {
    max_wait: Duration,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_WATCHDOG_TIMEOUT)
    }
}

impl Watchdog {
    /// Create a watchdog with the given deadline.
    pub fn new(max_wait: Duration) -> Self {
        Self { max_wait }
    }

    /// The deadline applied to each read.
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Read once from `line` into `buf` under the deadline.
    ///
    /// Returns the number of bytes read; 0 means no data, a transient
    /// error, a fatal error or an expired deadline. A fatal error or an
    /// expired deadline also closes the line. A closed line is never
    /// touched and always yields 0.
    pub fn guard_read(&self, line: &mut Line, buf: &mut [u8]) -> usize {
        let Some(mut port) = line.take_port() else {
            trace!("Read skipped: {} is closed", line.name());
            return 0;
        };

        let capacity = buf.len();
        let (tx, rx) = mpsc::sync_channel::<ReadReturn>(1);
        let spawned = thread::Builder::new()
            .name("c863-read".into())
            .spawn(move || {
                let mut scratch = vec![0u8; capacity];
                let result = port.read(&mut scratch);
                // The receiver is gone if the deadline already expired.
                let _ = tx.send((port, scratch, result));
            });

        if let Err(e) = spawned {
            warn!("Could not start reader for {}: {e}", line.name());
            line.force_close();
            return 0;
        }

        match rx.recv_timeout(self.max_wait) {
            Ok((port, scratch, Ok(n))) => {
                line.return_port(port);
                let n = n.min(capacity);
                buf[..n].copy_from_slice(&scratch[..n]);
                trace!("Read {n} bytes from {}", line.name());
                n
            },
            Ok((port, _, Err(e))) if is_transient(&e) => {
                line.return_port(port);
                trace!("No data from {}: {e}", line.name());
                0
            },
            Ok((port, _, Err(e))) => {
                line.return_port(port);
                warn!("Read error on {}: {e}", line.name());
                line.close();
                0
            },
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Read on {} exceeded {:?}; abandoning the line",
                    line.name(),
                    self.max_wait
                );
                line.force_close();
                0
            },
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Reader for {} exited without returning the port", line.name());
                line.force_close();
                0
            },
        }
    }
}

/// Errors that only mean "nothing arrived yet".
fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
