//! Control protocol
//!
//! Handles request-line parsing and validation, and defines the reserved
//! wire sentinels exchanged on the control and data connections.

pub mod request;
pub mod responses;

pub use request::{Command, Request, parse_request};
