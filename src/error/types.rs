//! Error types
//!
//! Defines domain-specific error types for each module of the FTP server.

use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Request validation errors
///
/// One variant per way a request line can be rejected. `Display` carries
/// the human-readable message sent back to the client on the control
/// connection.
#[derive(Debug, PartialEq, Eq)]
pub enum RequestError {
    TooFewArguments,
    TooManyArguments,
    UnknownCommand,
    CommandArgumentMismatch { count: usize, command: String },
    MissingFilename,
    DataPortNotNumeric,
    DataPortOutOfRange,
    DataPortEqualsControlPort,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::TooFewArguments => {
                write!(f, "Too few FTP request arguments were provided.")
            }
            RequestError::TooManyArguments => {
                write!(f, "Too many FTP request arguments were provided.")
            }
            RequestError::UnknownCommand => write!(
                f,
                "An invalid command was provided. Please use \"-l\", \"-la\", \"-ll\", \"-lr\", or \"-g\"."
            ),
            RequestError::CommandArgumentMismatch { count, command } => write!(
                f,
                "Command mismatch: {} arguments were provided with a command of {}.",
                count, command
            ),
            RequestError::MissingFilename => {
                write!(f, "No file name was provided. Please provide one")
            }
            RequestError::DataPortNotNumeric => write!(
                f,
                "Non-numeric data port argument. Please provide a numeric port in the range: 1024..65535"
            ),
            RequestError::DataPortOutOfRange => write!(
                f,
                "Invalid data port argument. Please provide a numeric port in the range: 1024..65535"
            ),
            RequestError::DataPortEqualsControlPort => write!(
                f,
                "Invalid data port argument. The data port should not be the same as the command port."
            ),
        }
    }
}

impl std::error::Error for RequestError {}

/// Transfer module errors
#[derive(Debug)]
pub enum TransferError {
    /// The outbound data connection to the client could not be established.
    DataConnectionFailed(SocketAddr, io::Error),
    /// The client closed the control connection mid-handshake.
    ControlChannelClosed,
    /// I/O failure while streaming a response.
    TransferFailed(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::DataConnectionFailed(addr, e) => {
                write!(f, "Failed to open data connection to {}: {}", addr, e)
            }
            TransferError::ControlChannelClosed => {
                write!(f, "Control connection closed by client")
            }
            TransferError::TransferFailed(e) => write!(f, "Transfer failed: {}", e),
        }
    }
}

impl std::error::Error for TransferError {}

impl From<io::Error> for TransferError {
    fn from(error: io::Error) -> Self {
        TransferError::TransferFailed(error)
    }
}
