//! Transfer orchestration
//!
//! Runs the data-connection protocol for validated requests.

pub mod orchestrator;

pub use orchestrator::{respond, send_line};
