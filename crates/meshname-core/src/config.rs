//! meshname.toml configuration parser.
//!
//! Every field is optional; missing values fall back to the defaults
//! below. CLI flags are applied on top of the parsed file.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::{Path, PathError};
use crate::strategy::Strategy;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:4321";
pub const DEFAULT_ROOT: &str = "/default";
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid duration for {field}: {value:?}")]
    InvalidDuration { field: &'static str, value: String },

    #[error("invalid root path: {0}")]
    InvalidPath(#[from] PathError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshnameConfig {
    pub namerd: Option<NamerdConfig>,
    pub resolve: Option<ResolveConfig>,
}

/// Connection settings for the naming service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamerdConfig {
    pub address: Option<String>,
    pub dial_timeout: Option<String>,
    /// Budget shared by every call made for one bind or resolve.
    pub op_timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveConfig {
    pub root: Option<String>,
    pub strategy: Option<Strategy>,
}

/// Options handed to the client at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub dial_timeout: Duration,
    pub op_timeout: Duration,
    pub strategy: Strategy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            op_timeout: DEFAULT_OP_TIMEOUT,
            strategy: Strategy::default(),
        }
    }
}

impl MeshnameConfig {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path` if given, otherwise use the built-in defaults.
    pub fn load_or_default(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn address(&self) -> &str {
        self.namerd
            .as_ref()
            .and_then(|n| n.address.as_deref())
            .unwrap_or(DEFAULT_ADDRESS)
    }

    pub fn default_root(&self) -> Result<Path, ConfigError> {
        let root = self
            .resolve
            .as_ref()
            .and_then(|r| r.root.as_deref())
            .unwrap_or(DEFAULT_ROOT);
        Ok(Path::read(root)?)
    }

    pub fn client_options(&self) -> Result<ClientOptions, ConfigError> {
        let namerd = self.namerd.as_ref();
        let dial_timeout = duration_field(
            "namerd.dial_timeout",
            namerd.and_then(|n| n.dial_timeout.as_deref()),
            DEFAULT_DIAL_TIMEOUT,
        )?;
        let op_timeout = duration_field(
            "namerd.op_timeout",
            namerd.and_then(|n| n.op_timeout.as_deref()),
            DEFAULT_OP_TIMEOUT,
        )?;
        let strategy = self
            .resolve
            .as_ref()
            .and_then(|r| r.strategy)
            .unwrap_or_default();

        Ok(ClientOptions {
            dial_timeout,
            op_timeout,
            strategy,
        })
    }
}

fn duration_field(
    field: &'static str,
    value: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(value) => parse_duration(value).ok_or_else(|| ConfigError::InvalidDuration {
            field,
            value: value.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse `500ms`, `5s`, `2m`, or a bare number of seconds.
///
/// Values whose unit conversion overflows are rejected.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let digits = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (value, unit) = s.split_at(digits);
    let value: u64 = value.parse().ok()?;

    match unit {
        "ms" => Some(Duration::from_millis(value)),
        "" | "s" => Some(Duration::from_secs(value)),
        "m" => value.checked_mul(60).map(Duration::from_secs),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = MeshnameConfig::parse("").unwrap();
        assert_eq!(config.address(), DEFAULT_ADDRESS);
        assert_eq!(config.default_root().unwrap().to_string(), DEFAULT_ROOT);
        assert_eq!(config.client_options().unwrap(), ClientOptions::default());
    }

    #[test]
    fn parse_full() {
        let toml_str = r#"
[namerd]
address = "namerd.mesh:4100"
dial_timeout = "250ms"
op_timeout = "3s"

[resolve]
root = "/svc"
strategy = "stream-only"
"#;
        let config = MeshnameConfig::parse(toml_str).unwrap();
        assert_eq!(config.address(), "namerd.mesh:4100");
        assert_eq!(config.default_root().unwrap(), Path::read("/svc").unwrap());

        let options = config.client_options().unwrap();
        assert_eq!(options.dial_timeout, Duration::from_millis(250));
        assert_eq!(options.op_timeout, Duration::from_secs(3));
        assert_eq!(options.strategy, Strategy::StreamOnly);
    }

    #[test]
    fn unknown_strategy_is_a_parse_error() {
        let err = MeshnameConfig::parse("[resolve]\nstrategy = \"smart\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bad_duration_names_the_field() {
        let config = MeshnameConfig::parse("[namerd]\nop_timeout = \"soon\"\n").unwrap();
        match config.client_options() {
            Err(ConfigError::InvalidDuration { field, value }) => {
                assert_eq!(field, "namerd.op_timeout");
                assert_eq!(value, "soon");
            }
            other => panic!("expected InvalidDuration, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_minutes_are_rejected() {
        assert_eq!(parse_duration("307445734561825861m"), None);
        assert_eq!(
            parse_duration("18446744073709551615"),
            Some(Duration::from_secs(u64::MAX))
        );

        let config =
            MeshnameConfig::parse("[namerd]\ndial_timeout = \"307445734561825861m\"\n").unwrap();
        assert!(matches!(
            config.client_options(),
            Err(ConfigError::InvalidDuration { field: "namerd.dial_timeout", .. })
        ));
    }

    #[test]
    fn bad_root_is_rejected() {
        let config = MeshnameConfig::parse("[resolve]\nroot = \"svc\"\n").unwrap();
        assert!(matches!(
            config.default_root(),
            Err(ConfigError::InvalidPath(PathError::MissingLeadingSlash(_)))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = MeshnameConfig::from_file(std::path::Path::new("/nonexistent/meshname.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/meshname.toml"));
    }

    #[test]
    fn load_or_default_without_path() {
        let config = MeshnameConfig::load_or_default(None).unwrap();
        assert!(config.namerd.is_none());
        assert!(config.resolve.is_none());
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("fast"), None);
        assert_eq!(parse_duration("5h"), None);
        assert_eq!(parse_duration("ms"), None);
    }
}
