//! Terminal attribute snapshot for restoring a device on release.
//!
//! `serialport` rewrites the termios of the device when it opens it and never
//! puts the old settings back. The snapshot keeps its own non-blocking,
//! non-controlling descriptor to the same device so the attributes captured
//! before configuration can be reapplied after the line is done, even if the
//! serialport handle has been abandoned by the watchdog.

use {
    log::trace,
    nix::sys::termios::{self, FlushArg, SetArg, Termios},
    std::{
        fs::{File, OpenOptions},
        io,
        os::unix::fs::OpenOptionsExt,
    },
};

/// Saved terminal attributes plus the descriptor used to reapply them.
pub(crate) struct TermiosSnapshot {
    file: File,
    saved: Termios,
}

impl TermiosSnapshot {
    /// Capture the current attributes of `path`.
    ///
    /// Fails if the path does not exist or is not a terminal.
    pub(crate) fn capture(path: &str) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path)?;
        let saved = termios::tcgetattr(&file)?;
        trace!("Captured terminal attributes of {path}");
        Ok(Self { file, saved })
    }

    /// Drop anything queued in either direction.
    pub(crate) fn flush(&self) -> io::Result<()> {
        termios::tcflush(&self.file, FlushArg::TCIOFLUSH)?;
        Ok(())
    }

    /// Reapply the captured attributes immediately.
    pub(crate) fn restore(&self) -> io::Result<()> {
        termios::tcsetattr(&self.file, SetArg::TCSANOW, &self.saved)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_missing_device_fails() {
        let err = TermiosSnapshot::capture("/nonexistent/c863-test-device")
            .err()
            .expect("capture should fail");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_capture_regular_file_fails() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let path = file
            .path()
            .to_str()
            .expect("utf-8 path");
        assert!(TermiosSnapshot::capture(path).is_err());
    }
}
