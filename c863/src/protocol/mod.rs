//! Protocol implementations.

pub mod frame;

// Re-export common types
pub use frame::{ADDRESS, END, ETX, FRAME_OVERHEAD, Frame, START, filter_reply};
