//! Triage Service
//!
//! HTTP surface and benchmark CLI over the `triage` library:
//! - [`config`]: environment and TOML configuration
//! - [`server`]: axum router for `/health`, `/analyze` and `/draft`
//! - [`cli`]: `serve`, `bench` and `report` subcommands

pub mod cli;
pub mod config;
pub mod server;

pub use config::ServiceConfig;
pub use server::{router, AppState};
