//! Filesystem-backed build cache
//!
//! Provides content-addressed workspaces keyed by input fingerprints.
//! The directory tree is the cache; nothing is held in memory.
//!
//! # Workspace States
//!
//! | State | On disk | Description |
//! |-------|---------|-------------|
//! | Empty | no directory | Never built |
//! | InProgress | no `.complete` marker | Building, or abandoned mid-build |
//! | Succeeded | `.complete` marker, empty log | Finished, reusable |
//! | Failed | non-empty `out.log` | Finished with a generation error |

pub mod fingerprint;
pub mod workspace;

pub use fingerprint::{Fingerprint, DIGEST_LEN};
pub use workspace::{
    Workspace, WorkspaceState, WorkspaceStore, COMPLETE_MARKER, CONFIG_FILE, INPUT_FILES, LOG_FILE,
    QUERY_FILE,
};
