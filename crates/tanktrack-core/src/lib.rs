//! # TankTrack Core
//!
//! Core library for TankTrack - an asset management register for rural
//! water infrastructure (septic systems and cisterns).
//!
//! This crate provides the data model, durable storage adapter, project
//! repository, and recommendation engine client independent of the CLI
//! interface.
//!
//! ## Architecture
//!
//! - **model**: Assets, repair prices, rules, snapshots, projects
//! - **store**: Durable key-value store adapter with change subscriptions
//! - **projects**: Project repository (working copy, switching, saving)
//! - **engine**: Recommendation engine client and result reconciliation
//! - **prefs**: Per-table view preferences

pub mod engine;
pub mod error;
pub mod model;
pub mod prefs;
pub mod projects;
pub mod store;

pub use error::{Result, TankError};
pub use projects::ProjectRepository;
pub use store::KvStore;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
