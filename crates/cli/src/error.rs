//! CLI errors and their exit codes.
//!
//! | code | kind            | cause                                         |
//! |------|-----------------|-----------------------------------------------|
//! | 0    |                 | success                                       |
//! | 2    |                 | argument parsing (reported by clap)           |
//! | 10   | `flow`          | unknown field, invalid mesh or trace settings |
//! | 11   | `io`            | writing the output file                       |
//! | 12   | `input`         | bad `--params`, `--config` or point argument  |
//! | 13   | `serialization` | rendering JSON to stdout                      |

use evenflow_core::FlowError;
use std::fmt;

/// Failure of a CLI command.
#[derive(Debug)]
pub enum CliError {
    /// Rejected by the library.
    Flow(FlowError),
    /// Output file could not be written.
    Io(String),
    /// Malformed command-line input or settings file.
    Input(String),
    Serialization(String),
}

impl CliError {
    /// Process exit code, see the table above.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Flow(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Short label used in `--json` error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Flow(_) => "flow",
            CliError::Io(_) => "io",
            CliError::Input(_) => "input",
            CliError::Serialization(_) => "serialization",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Flow(e) => e.fmt(f),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                f.write_str(msg)
            }
        }
    }
}

impl From<FlowError> for CliError {
    /// `FlowError::Io` comes from writing results, so it keeps the I/O code.
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Io(msg) => CliError::Io(msg),
            other => CliError::Flow(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
