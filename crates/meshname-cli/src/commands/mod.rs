pub mod bind;
pub mod resolve;

use std::fmt;

/// How a command ended, when it did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    Success,
    NegativeBinding(String),
    EmptyReplicas(String),
}

impl Exit {
    /// Exit status for errors that escape a command.
    pub const UNEXPECTED: u8 = 1;

    pub fn code(&self) -> u8 {
        match self {
            Exit::Success => 0,
            Exit::NegativeBinding(_) => 2,
            Exit::EmptyReplicas(_) => 3,
        }
    }
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exit::Success => f.write_str("ok"),
            Exit::NegativeBinding(msg) | Exit::EmptyReplicas(msg) => write!(f, "error: {msg}"),
        }
    }
}
