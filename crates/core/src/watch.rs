//! Watch mode: regenerate whenever a TypeScript source under the project
//! root changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use notify::{RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::config::RpcGenConfig;
use crate::error::GenerateError;
use crate::pipeline::{GenerationReport, generate, is_ignored_path};

const WATCH_DEBOUNCE_MS: u64 = 100;

/// Generate once, then again after every burst of source changes.
///
/// `on_run` receives the outcome of each run; failed runs do not stop the
/// watcher. Returns when the watcher shuts down.
pub fn watch<F>(root: &Path, config: &RpcGenConfig, mut on_run: F) -> Result<(), GenerateError>
where
    F: FnMut(Result<GenerationReport, GenerateError>),
{
    let root = fs::canonicalize(root).map_err(|source| GenerateError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    let outputs = [config.frontend_path(&root), config.backend_path(&root)];

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |result| {
        let _ = tx.send(result);
    })
    .map_err(|err| GenerateError::Watch(format!("Failed to create file watcher: {err}")))?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .map_err(|err| GenerateError::Watch(format!("Failed to watch {}: {err}", root.display())))?;

    info!(root = %root.display(), "Watching for changes");
    on_run(generate(&root, config));

    loop {
        let Ok(first) = rx.recv() else {
            debug!("File watcher channel closed");
            return Ok(());
        };
        let mut changed = is_relevant(&first, &root, &outputs);

        loop {
            match rx.recv_timeout(Duration::from_millis(WATCH_DEBOUNCE_MS)) {
                Ok(result) => changed |= is_relevant(&result, &root, &outputs),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("File watcher channel closed");
                    return Ok(());
                }
            }
        }

        if changed {
            info!("Source change detected, regenerating...");
            on_run(generate(&root, config));
        }
    }
}

fn is_relevant(result: &notify::Result<notify::Event>, root: &Path, outputs: &[PathBuf]) -> bool {
    match result {
        Ok(event) => event
            .paths
            .iter()
            .any(|path| is_source_change(path, root, outputs)),
        Err(err) => {
            warn!("File watcher error: {err}");
            false
        }
    }
}

/// Whether a change to `path` can affect the generated contract.
fn is_source_change(path: &Path, root: &Path, outputs: &[PathBuf]) -> bool {
    if outputs.iter().any(|output| output == path) {
        return false;
    }
    if path.strip_prefix(root).is_ok_and(is_ignored_path) {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "ts" || ext == "tsx")
}
