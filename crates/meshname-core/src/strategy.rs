//! Endpoint resolution strategies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a bound identifier is resolved to endpoints.
///
/// Selected once per resolve call and applied to every identifier the
/// name binds to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// A single `GetReplicas` request.
    UnaryOnly,
    /// A `StreamReplicas` subscription, read until the first bound update.
    StreamOnly,
    /// `GetReplicas` first; subscribe only if the resolver reports pending.
    #[default]
    UnaryThenStream,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::UnaryOnly,
        Strategy::StreamOnly,
        Strategy::UnaryThenStream,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::UnaryOnly => "unary-only",
            Strategy::StreamOnly => "stream-only",
            Strategy::UnaryThenStream => "unary-then-stream",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resolution strategy: {0:?}")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}
