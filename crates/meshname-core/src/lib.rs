//! meshname-core: values shared by the meshname client and CLI.
//!
//! - **`path`**: hierarchical `Path` values and their `/a/b` text form
//! - **`endpoint`**: resolved network endpoints
//! - **`strategy`**: the endpoint resolution policy
//! - **`config`**: `meshname.toml` parsing and client options

pub mod config;
pub mod endpoint;
pub mod path;
pub mod strategy;

pub use config::{ClientOptions, ConfigError, MeshnameConfig, parse_duration};
pub use endpoint::{Endpoint, EndpointMeta};
pub use path::{Path, PathError};
pub use strategy::{ParseStrategyError, Strategy};
