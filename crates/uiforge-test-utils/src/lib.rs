#![deny(unsafe_code)]

//! Shared test utilities for the uiforge workspace.
//!
//! Provides config builders, throwaway component catalogs, a scripted model
//! provider, and tracing helpers so that crate tests stay concise.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! uiforge-test-utils = { workspace = true }
//! ```

pub mod catalog;
pub mod config;
pub mod provider;
pub mod tracing_setup;

pub use catalog::CatalogFixture;
pub use config::TestConfigBuilder;
pub use provider::ScriptedProvider;
