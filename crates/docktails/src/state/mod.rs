//! State module — shared tailer state.

pub mod tail;

pub use tail::{SharedState, TailState};
