//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Lookup = 0x01,
    Upload = 0x02,
    Ping = 0x03,
    Stats = 0x04,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Look up one promotion by id
    Lookup { id: String },

    /// Replace the whole dataset with a CSV upload
    Upload { data: Vec<u8> },

    /// Ping (health check)
    Ping,

    /// Describe the installed dataset
    Stats,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Lookup { .. } => CommandType::Lookup,
            Command::Upload { .. } => CommandType::Upload,
            Command::Ping => CommandType::Ping,
            Command::Stats => CommandType::Stats,
        }
    }

    /// Size of the payload this command encodes to
    pub fn payload_len(&self) -> usize {
        match self {
            Command::Lookup { id } => id.len(),
            Command::Upload { data } => data.len(),
            Command::Ping | Command::Stats => 0,
        }
    }
}
