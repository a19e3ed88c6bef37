//! Named controller operations.
//!
//! A [`LogicalCommand`] expands to one or more C-863 command texts which are
//! sent one after another. Names outside the table are passed through as a
//! single raw command so the controller's full command set stays reachable.

use {
    crate::{
        error::Result,
        line::Line,
        protocol::Frame,
        transceiver::{SendOutcome, Transceiver},
    },
    log::debug,
    std::fmt,
};

/// A user-facing controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalCommand {
    /// Enable the servo loop and raise the D-term from 35 to 350.
    Start,
    /// Reset the controller, dropping the servo.
    Stop,
    /// Report the current position.
    Position,
    /// Find the reference edge and define it as home.
    Home,
    /// Move 5000 counts forward.
    MoveForward,
    /// Move 5000 counts backward.
    MoveBackward,
    /// Any other text, sent to the controller verbatim.
    Raw(String),
}

impl LogicalCommand {
    /// Every named command, in usage order.
    pub const ALL: [Self; 6] = [
        Self::Start,
        Self::Stop,
        Self::Position,
        Self::Home,
        Self::MoveForward,
        Self::MoveBackward,
    ];

    /// Resolve a command-line name.
    pub fn parse(name: &str) -> Self {
        match name {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "pos" => Self::Position,
            "home" => Self::Home,
            "move+" => Self::MoveForward,
            "move-" => Self::MoveBackward,
            other => Self::Raw(other.to_string()),
        }
    }

    /// Name accepted by [`parse`](Self::parse).
    pub fn name(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Position => "pos",
            Self::Home => "home",
            Self::MoveForward => "move+",
            Self::MoveBackward => "move-",
            Self::Raw(text) => text,
        }
    }

    /// Short description for usage text.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Start => "activate the servo feature",
            Self::Stop => "deactivate the servo feature",
            Self::Position => "tell position",
            Self::Home => "go to home position",
            Self::MoveForward | Self::MoveBackward => "do some example movement",
            Self::Raw(_) => "sent directly to the motor controller",
        }
    }

    /// Controller command texts, in send order.
    pub fn wire_texts(&self) -> Vec<&str> {
        match self {
            // Servo on, then D-term 35 -> 350
            Self::Start => vec!["MN", "DP350"],
            Self::Stop => vec!["RT"],
            Self::Position => vec!["TT,TP"],
            // Find edge, then wait for stop and define home
            Self::Home => vec!["FE2", "WS0,DH"],
            Self::MoveForward => vec!["MR5000"],
            Self::MoveBackward => vec!["MR-5000"],
            Self::Raw(text) => vec![text.as_str()],
        }
    }

    /// Frame every wire text, failing before anything is sent.
    pub fn frames(&self) -> Result<Vec<Frame>> {
        self.wire_texts()
            .into_iter()
            .map(Frame::new)
            .collect()
    }
}

impl fmt::Display for LogicalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Send every wire text of `command` in order.
///
/// A failed exchange does not stop the sequence. An interruption from the
/// registered checker (Ctrl-C in the CLI) is the only thing that ends it
/// early; the line itself is still released by the caller.
/// Returns one outcome per exchange attempted.
pub fn dispatch(
    transceiver: &Transceiver,
    line: &mut Line,
    command: &LogicalCommand,
) -> Result<Vec<SendOutcome>> {
    let frames = command.frames()?;
    debug!("{command} -> {} command(s)", frames.len());

    let mut outcomes = Vec::with_capacity(frames.len());
    for frame in &frames {
        let outcome = transceiver.send_frame(line, frame);
        let interrupted = outcome == SendOutcome::Interrupted;
        outcomes.push(outcome);
        if interrupted {
            break;
        }
    }
    Ok(outcomes)
}
