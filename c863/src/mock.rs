//! In-memory port double shared by the unit tests.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use env_logger::Env;

use crate::error::Result;
use crate::port::Port;

/// Route log output through the test harness, at full detail.
///
/// `RUST_LOG` still overrides the level.
pub(crate) fn init_logger() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("trace"))
        .is_test(true)
        .try_init();
}

/// What the next `read` call does.
#[derive(Debug)]
pub(crate) enum ReadStep {
    /// Return these bytes.
    Data(Vec<u8>),
    /// Return `Ok(0)`: the read completed without data.
    Empty,
    /// Report the idle timeout expiring with nothing received.
    Idle,
    /// Fail with the given error kind.
    Fail(io::ErrorKind),
    /// Block for the duration, then return the bytes.
    Stall(Duration, Vec<u8>),
}

/// Shared view of what happened to a [`MockPort`].
#[derive(Clone, Debug, Default)]
pub(crate) struct MockTap {
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
    reads: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl MockTap {
    /// Every buffer passed to `write`, in order.
    pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
        self.writes
            .lock()
            .unwrap()
            .clone()
    }

    /// Number of `read` calls made.
    pub(crate) fn reads(&self) -> usize {
        self.reads
            .load(Ordering::SeqCst)
    }

    /// Number of times the port handle was released.
    pub(crate) fn releases(&self) -> usize {
        self.releases
            .load(Ordering::SeqCst)
    }
}

/// Scripted serial port.
///
/// Once the script runs out every read reports [`ReadStep::Idle`].
#[derive(Debug)]
pub(crate) struct MockPort {
    script: VecDeque<ReadStep>,
    fail_writes: bool,
    fail_clear: bool,
    tap: MockTap,
}

impl MockPort {
    pub(crate) fn new(script: Vec<ReadStep>) -> (Self, MockTap) {
        init_logger();
        let tap = MockTap::default();
        let port = Self {
            script: script.into(),
            fail_writes: false,
            fail_clear: false,
            tap: tap.clone(),
        };
        (port, tap)
    }

    /// A port that never answers.
    pub(crate) fn silent() -> (Self, MockTap) {
        Self::new(Vec::new())
    }

    #[must_use]
    pub(crate) fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    #[must_use]
    pub(crate) fn with_failing_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }
}

impl Port for MockPort {
    fn name(&self) -> &str {
        "mock"
    }

    fn clear_buffers(&mut self) -> Result<()> {
        if self.fail_clear {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "clear refused").into());
        }
        Ok(())
    }
}

impl io::Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.tap
            .reads
            .fetch_add(1, Ordering::SeqCst);

        let data = match self
            .script
            .pop_front()
            .unwrap_or(ReadStep::Idle)
        {
            ReadStep::Data(data) => data,
            ReadStep::Empty => Vec::new(),
            ReadStep::Idle => {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
            },
            ReadStep::Fail(kind) => return Err(io::Error::new(kind, "scripted failure")),
            ReadStep::Stall(delay, data) => {
                thread::sleep(delay);
                data
            },
        };

        let n = buf.len().min(data.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }
}

impl io::Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write refused"));
        }
        self.tap
            .writes
            .lock()
            .unwrap()
            .push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MockPort {
    fn drop(&mut self) {
        self.tap
            .releases
            .fetch_add(1, Ordering::SeqCst);
    }
}
