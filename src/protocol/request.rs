//! Request parsing
//!
//! Turns one untrusted line of client input into a validated `Request`,
//! or a `RequestError` describing exactly why it was rejected.

use crate::error::RequestError;

/// Lowest port a client may name for its data connection.
const MIN_DATA_PORT: u16 = 1024;

/// The five operations a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `-l`: list the served directory, hidden entries filtered.
    ListShort,
    /// `-la`: list including hidden entries.
    ListAll,
    /// `-ll`: list including hidden entries, with byte sizes.
    ListWithSize,
    /// `-lr`: recursive listing with hidden entries and byte sizes.
    ListRecursive,
    /// `-g <file>`: stream a file from the served directory.
    Get,
}

impl Command {
    /// The request-line token for this command.
    pub fn token(&self) -> &'static str {
        match self {
            Command::ListShort => "-l",
            Command::ListAll => "-la",
            Command::ListWithSize => "-ll",
            Command::ListRecursive => "-lr",
            Command::Get => "-g",
        }
    }

    fn from_token(token: &str) -> Option<Command> {
        match token {
            "-l" => Some(Command::ListShort),
            "-la" => Some(Command::ListAll),
            "-ll" => Some(Command::ListWithSize),
            "-lr" => Some(Command::ListRecursive),
            "-g" => Some(Command::Get),
            _ => None,
        }
    }

    /// Number of whitespace-delimited components a request line carrying
    /// this command must have.
    fn expected_components(&self) -> usize {
        match self {
            Command::Get => 3,
            _ => 2,
        }
    }
}

/// A fully validated client request.
///
/// Only [`parse_request`] constructs one, so a `Request` that exists has a
/// legal command/argument pairing and a usable data port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    command: Command,
    filename: Option<String>,
    data_port: u16,
}

impl Request {
    pub fn command(&self) -> Command {
        self.command
    }

    /// Requested file, present only for [`Command::Get`].
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn data_port(&self) -> u16 {
        self.data_port
    }
}

/// Validates one request line against the control connection's local port.
///
/// Components are checked in a fixed order - count, command, data port,
/// filename - so the first failing check decides which error the client
/// sees when several apply. A whitespace-only line splits into zero
/// components and is rejected for having too few.
pub fn parse_request(raw: &str, control_port: u16) -> Result<Request, RequestError> {
    let components: Vec<&str> = raw.split_whitespace().collect();

    if components.len() < 2 {
        return Err(RequestError::TooFewArguments);
    }
    if components.len() > 3 {
        return Err(RequestError::TooManyArguments);
    }

    let command = validate_command(&components)?;
    let data_port = validate_data_port(&components, control_port)?;
    let filename = validate_filename(&components, command)?;

    Ok(Request {
        command,
        filename,
        data_port,
    })
}

fn validate_command(components: &[&str]) -> Result<Command, RequestError> {
    let token = components[0];
    let command = Command::from_token(token).ok_or(RequestError::UnknownCommand)?;

    if components.len() != command.expected_components() {
        return Err(RequestError::CommandArgumentMismatch {
            count: components.len(),
            command: token.to_string(),
        });
    }

    Ok(command)
}

/// The data port is always the last component. Parsed into an `i64` first
/// so that values beyond `u16` still classify as out-of-range rather than
/// non-numeric.
fn validate_data_port(components: &[&str], control_port: u16) -> Result<u16, RequestError> {
    let token = components[components.len() - 1];
    let port: i64 = token.parse().map_err(|_| RequestError::DataPortNotNumeric)?;

    if port < i64::from(MIN_DATA_PORT) || port > i64::from(u16::MAX) {
        return Err(RequestError::DataPortOutOfRange);
    }
    let port = port as u16;

    if port == control_port {
        return Err(RequestError::DataPortEqualsControlPort);
    }

    Ok(port)
}

fn validate_filename(
    components: &[&str],
    command: Command,
) -> Result<Option<String>, RequestError> {
    if command != Command::Get {
        return Ok(None);
    }

    let filename = components[1].trim();
    if filename.is_empty() {
        return Err(RequestError::MissingFilename);
    }

    Ok(Some(filename.to_string()))
}
