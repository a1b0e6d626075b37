//! Fatal generation errors. Any of these aborts the run before a file is written.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("No source files found: no '*{suffix}' modules under {}", .root.display())]
    NoSourceFiles { root: PathBuf, suffix: String },

    #[error(
        "Duplicate module name '{name}': {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateModule {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid module name '{name}' derived from {}: not a usable identifier", .path.display())]
    InvalidModuleName { name: String, path: PathBuf },

    #[error(
        "Module name '{name}' derived from {} clashes with a declaration of the generated code",
        .path.display()
    )]
    ReservedModuleName { name: String, path: PathBuf },

    #[error("Type name '{name}' clashes with a declaration of the generated frontend")]
    ReservedTypeName { name: String },

    #[error(
        "Invalid api function declaration: {module}.{function}. There must be at least one {context} type parameter."
    )]
    MissingContextParameter {
        module: String,
        function: String,
        context: String,
    },

    #[error(
        "Invalid api function declaration: {module}.{function}. First parameter must be {context}, but got {found}"
    )]
    InvalidContextParameter {
        module: String,
        function: String,
        context: String,
        found: String,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("File watcher failed: {0}")]
    Watch(String),
}
