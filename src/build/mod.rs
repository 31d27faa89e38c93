//! Generation orchestration
//!
//! - `generator`: the backend trait and its error type
//! - `command`: backend that runs an external code generator
//! - `runner`: executes a backend inside a workspace with failure containment
//! - `locks`: per-fingerprint serialization of concurrent builds
//! - `assemble`: reads workspaces back into wire responses

pub mod assemble;
pub mod command;
pub mod generator;
pub mod locks;
pub mod runner;

pub use assemble::{content_type_for, read_inputs, read_outputs, Artifact, BuildResponse};
pub use command::CommandGenerator;
pub use generator::{Artifacts, DiagnosticsSink, GenerationError, Generator};
pub use locks::{BuildGuard, BuildLocks};
pub use runner::{BuildOutcome, BuildRunner};
