//! `mlops-core`: idempotent setup of data-versioned ML projects.
//!
//! Drives the `git` and `dvc` command-line tools to clone a hosted
//! repository, initialize DVC with an S3-compatible remote, register a data
//! directory, and publish each step; then points MLflow at the matching
//! tracking server.
//!
//! ```text
//! Credentials + Config
//!     │
//!     ▼
//! RepoOrchestrator ── CommandRunner (git / dvc)
//!     │            └─ PathProbe     (idempotency gates)
//!     ▼
//! RunReport        ← one StageReport per stage
//! ```

pub mod command;
pub mod config;
pub mod credentials;
pub mod error;
pub mod orchestrator;
pub mod paths;
pub mod preflight;
pub mod probe;
pub mod report;
pub mod tracking;
pub mod types;
pub mod urls;


pub use error::{MlopsError, Result};
pub use orchestrator::RepoOrchestrator;
