//! sqlplay - SQL code generation playground
//!
//! Content-addressed build cache for generated code: inputs are
//! fingerprinted, built once in an isolated workspace, and served back
//! over HTTP by fingerprint.

pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod playground;
pub mod server;

pub use error::{PlayError, PlayResult};
pub use playground::{BuildRequest, Playground, PlaygroundView, BASELINE_CONFIG};
