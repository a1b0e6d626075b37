//! Pipeline driver.
//!
//! One run: discover API modules, extract their signatures, normalize them
//! into the contract IR, render both artifacts and write them. Every fatal
//! error surfaces before the first file is touched.

use std::collections::HashMap;
use std::fs;
use std::io::Write as _;
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::RpcGenConfig;
use crate::contract::utils::is_valid_identifier;
use crate::contract::{
    BackendOptions, GENERATED_BINDINGS, module_specifier, normalize_modules, render,
};
use crate::error::GenerateError;
use crate::extract::{TypeQuery, extract_signatures};
use crate::host::TypeScriptHost;
use crate::model::Module;
use crate::resolver::Diagnostic;

/// Directories never searched for API modules.
pub const IGNORED_DIRS: [&str; 8] = [
    ".git",
    ".next",
    ".turbo",
    ".cache",
    "build",
    "coverage",
    "dist",
    "node_modules",
];

/// Rendered output of a run, not yet written.
#[derive(Debug, Clone)]
pub struct Build {
    pub modules: Vec<String>,
    pub functions: usize,
    pub named_types: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub outputs: Vec<OutputFile>,
}

/// One generated artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
}

impl OutputFile {
    /// Current content on disk, `None` when the file does not exist.
    pub fn existing(&self) -> Result<Option<String>, GenerateError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(GenerateError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub modules: Vec<String>,
    pub functions: usize,
    pub named_types: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub files: Vec<(PathBuf, WriteStatus)>,
}

impl GenerationReport {
    pub fn written(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, status)| *status == WriteStatus::Written)
            .count()
    }
}

/// A generated file whose content on disk differs from the rendered one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleFile {
    pub path: PathBuf,
    pub current: Option<String>,
    pub expected: String,
}

/// Generate both artifacts for the project at `root` and write them.
pub fn generate(root: &Path, config: &RpcGenConfig) -> Result<GenerationReport, GenerateError> {
    let build = build(root, config)?;
    let files = write_outputs(&build.outputs)?;

    let report = GenerationReport {
        modules: build.modules,
        functions: build.functions,
        named_types: build.named_types,
        diagnostics: build.diagnostics,
        files,
    };
    info!(
        modules = report.modules.len(),
        functions = report.functions,
        types = report.named_types,
        written = report.written(),
        "RPC contract generated"
    );
    Ok(report)
}

/// Render both artifacts and report the ones that are out of date.
pub fn check(root: &Path, config: &RpcGenConfig) -> Result<Vec<StaleFile>, GenerateError> {
    let build = build(root, config)?;
    let mut stale = Vec::new();

    for output in build.outputs {
        let current = output.existing()?;
        if current.as_deref() != Some(output.content.as_str()) {
            debug!(path = %output.path.display(), "Generated file is stale");
            stale.push(StaleFile {
                path: output.path,
                current,
                expected: output.content,
            });
        }
    }

    Ok(stale)
}

/// Run every stage except writing.
pub fn build(root: &Path, config: &RpcGenConfig) -> Result<Build, GenerateError> {
    let sources = discover_modules(root, &config.module_suffix)?;
    if let Some((name, path)) = sources.iter().find(|(name, _)| *name == config.context_type) {
        return Err(GenerateError::ReservedModuleName {
            name: name.clone(),
            path: path.clone(),
        });
    }
    let mut host = TypeScriptHost::new(config.context_type.clone());

    let mut modules = Vec::with_capacity(sources.len());
    for (name, path) in sources {
        info!("Analyzing {}", path.display());
        let functions = extract_signatures(host.declarations(&path)?);
        debug!(module = %name, functions = functions.len(), "Extracted signatures");
        modules.push(Module {
            name,
            source_path: path,
            functions,
        });
    }

    let (ir, diagnostics) = normalize_modules(&modules, host.graph(), &config.context_type)?;

    let frontend_path = config.frontend_path(root);
    let backend_path = config.backend_path(root);
    let output_dir = backend_path.parent().unwrap_or(root);
    let context_import = context_specifier(root, output_dir, &config.context_import);
    let artifacts = render(
        &ir,
        &config.rpc_api_url,
        &BackendOptions {
            context_type: &config.context_type,
            context_import: &context_import,
            output_dir,
        },
    );

    Ok(Build {
        modules: ir.modules.iter().map(|module| module.name.clone()).collect(),
        functions: ir.function_count(),
        named_types: ir.types.len(),
        diagnostics,
        outputs: vec![
            OutputFile {
                path: frontend_path,
                content: artifacts.frontend,
            },
            OutputFile {
                path: backend_path,
                content: artifacts.backend,
            },
        ],
    })
}

/// Specifier of the context import as written in the backend artifact.
///
/// Relative specifiers are taken relative to the project root and rewritten
/// against the backend's directory; package specifiers are kept as they are.
fn context_specifier(root: &Path, output_dir: &Path, specifier: &str) -> String {
    if specifier.starts_with("./") || specifier.starts_with("../") {
        module_specifier(output_dir, &root.join(specifier))
    } else {
        specifier.to_string()
    }
}

/// API modules under `root`, sorted by path, with their logical names.
pub fn discover_modules(root: &Path, suffix: &str) -> Result<Vec<(String, PathBuf)>, GenerateError> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !entry.path().strip_prefix(root).is_ok_and(is_ignored_path))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(suffix) && name.len() > suffix.len())
        })
        .map(walkdir::DirEntry::into_path)
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(GenerateError::NoSourceFiles {
            root: root.to_path_buf(),
            suffix: suffix.to_string(),
        });
    }

    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut modules = Vec::with_capacity(paths.len());

    for path in paths {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(suffix))
            .unwrap_or_default()
            .to_string();

        if !is_valid_identifier(&name) {
            return Err(GenerateError::InvalidModuleName { name, path });
        }
        if GENERATED_BINDINGS.contains(&name.as_str()) {
            return Err(GenerateError::ReservedModuleName { name, path });
        }
        if let Some(first) = seen.get(&name) {
            return Err(GenerateError::DuplicateModule {
                name,
                first: first.clone(),
                second: path,
            });
        }

        debug!(module = %name, path = %path.display(), "Discovered API module");
        seen.insert(name.clone(), path.clone());
        modules.push((name, path));
    }

    Ok(modules)
}

/// Whether any component of `path`, relative to the project root, is an
/// ignored directory.
pub fn is_ignored_path(path: &Path) -> bool {
    path.components().any(|component| {
        let Component::Normal(name) = component else {
            return false;
        };
        name.to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
    })
}

/// Write changed outputs. All files are staged next to their targets first,
/// so a failure leaves every target untouched.
fn write_outputs(outputs: &[OutputFile]) -> Result<Vec<(PathBuf, WriteStatus)>, GenerateError> {
    let mut staged = Vec::new();
    let mut statuses = Vec::with_capacity(outputs.len());

    for output in outputs {
        if output.existing()?.as_deref() == Some(output.content.as_str()) {
            debug!(path = %output.path.display(), "Generated file unchanged");
            statuses.push((output.path.clone(), WriteStatus::Unchanged));
            continue;
        }
        staged.push((stage(output)?, &output.path, output.content.len()));
        statuses.push((output.path.clone(), WriteStatus::Written));
    }

    for (temp, path, bytes) in staged {
        temp.persist(path).map_err(|err| GenerateError::Write {
            path: path.clone(),
            message: err.error.to_string(),
        })?;
        info!("Wrote {}", path.display());
        debug!(path = %path.display(), bytes, "Persisted staged file");
    }

    Ok(statuses)
}

fn stage(output: &OutputFile) -> Result<NamedTempFile, GenerateError> {
    let write_error = |message: String| GenerateError::Write {
        path: output.path.clone(),
        message,
    };

    let dir = match output.path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| write_error(format!("Failed to create directory: {err}")))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|err| write_error(err.to_string()))?;
    temp.write_all(output.content.as_bytes())
        .map_err(|err| write_error(err.to_string()))?;
    temp.flush().map_err(|err| write_error(err.to_string()))?;
    Ok(temp)
}
