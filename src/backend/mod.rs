// Summarization backend adapters

pub mod provider;
pub mod polling;
pub mod direct;

pub use provider::*;
pub use polling::HttpPollingBackend;
pub use direct::HttpDirectBackend;
