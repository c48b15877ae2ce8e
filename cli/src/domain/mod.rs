//! Domain layer: pure deployment logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod credential;
pub mod environment;
pub mod error;
pub mod phase;
pub mod php_config;
pub mod rewrite;
pub mod routes;
pub mod settings;
pub mod sql;

pub use environment::{
    AdminCredentials, ApplicationMode, DbCredentials, EnvironmentContext, RedisConfig,
};
pub use error::DeployError;
pub use phase::{BuildPhase, DeployPhase};
pub use routes::{RouteTable, UrlBucket};
pub use settings::DeploySettings;
