//! Native serial port implementation using the `serialport` crate.

use {
    crate::{
        error::Result,
        port::{LineConfig, Port},
    },
    log::trace,
    serialport::{ClearBuffer, DataBits, FlowControl, Parity, StopBits},
    std::io::{Read, Write},
};

/// Native serial port.
///
/// Opened exclusively, in raw mode, 8N1, with modem control lines ignored.
/// Reads return after the first byte arrives or after the configured idle
/// timeout with `ErrorKind::TimedOut`.
pub struct NativePort {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl NativePort {
    /// Open and configure a serial device.
    pub fn open(path: &str, config: &LineConfig) -> Result<Self> {
        let port = serialport::new(path, config.baud_rate)
            .timeout(config.idle_timeout)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open()?;

        trace!(
            "Configured {path}: {} baud 8N1, idle timeout {:?}",
            config.baud_rate, config.idle_timeout
        );

        Ok(Self {
            port,
            name: path.to_string(),
        })
    }
}

impl Port for NativePort {
    fn name(&self) -> &str {
        &self.name
    }

    fn clear_buffers(&mut self) -> Result<()> {
        self.port
            .clear(ClearBuffer::All)?;
        Ok(())
    }
}

impl Read for NativePort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port
            .read(buf)
    }
}

impl Write for NativePort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port
            .flush()
    }
}
