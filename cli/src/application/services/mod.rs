//! Application services: use-case orchestration.
//!
//! Each service module implements a single concern by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod app_cli;
pub mod config_document;
pub mod database;
pub mod exec;
pub mod orchestrator;
