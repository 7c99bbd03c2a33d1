//! ---
//! osr_section: "01-core-functionality"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Shared primitives and utilities for the regression toolkit."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Core shared primitives for the osr-regress workspace.
//! This crate exposes configuration loading, tracing setup, build
//! metadata, and the release version ordering shared by every crate.

pub mod config;
pub mod logging;
pub mod release;
pub mod version;

pub use config::{
    AppConfig, CompatConfig, HeatmapConfig, LoadedAppConfig, LoggingConfig, PathsConfig,
    StabilityConfig, UnknownVersions,
};
pub use logging::{init_tracing, LogFormat};
pub use release::{compare_versions, is_version_triplet};
pub use version::VersionInfo;
