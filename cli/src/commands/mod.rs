//! Command implementations

pub mod build;
pub mod deploy;
pub mod routes;
pub mod version;
