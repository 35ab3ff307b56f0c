//! Replay stores: where resolved contexts are recorded between bakes.

mod json;
mod memory;

pub use json::JsonReplayStore;
pub use memory::InMemoryReplayStore;
