//! RPC contract compiler.
//!
//! Reads TypeScript API modules (`*.api.ts`), flattens the types of their
//! exported functions and generates a typed frontend client plus a backend
//! dispatch table that share one contract hash per function.

pub mod config;
pub mod contract;
pub mod error;
pub mod extract;
pub mod hasher;
pub mod host;
pub mod model;
pub mod pipeline;
pub mod resolver;
pub mod watch;

pub use config::{ConfigOverrides, RpcGenConfig};
pub use error::GenerateError;
pub use pipeline::{GenerationReport, StaleFile, WriteStatus, check, generate};
pub use resolver::{Diagnostic, DiagnosticKind};
pub use watch::watch;
