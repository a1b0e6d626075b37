//! Generator configuration.
//!
//! Layering: built-in defaults < `rpcgen.toml` at the project root < CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;

pub const CONFIG_FILENAME: &str = "rpcgen.toml";

pub const DEFAULT_RPC_API_URL: &str = "/api/rpc";
pub const DEFAULT_FRONTEND_FILE: &str = "./frontend.rpc.ts";
pub const DEFAULT_BACKEND_FILE: &str = "./backend.rpc.ts";
pub const DEFAULT_CONTEXT_TYPE: &str = "RpcContext";
pub const DEFAULT_CONTEXT_IMPORT: &str = "rpc-gen";
pub const DEFAULT_MODULE_SUFFIX: &str = ".api.ts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RpcGenConfig {
    /// Endpoint the generated client POSTs to
    pub rpc_api_url: String,
    pub frontend_file: PathBuf,
    pub backend_file: PathBuf,
    /// Name of the context type every API function takes first
    pub context_type: String,
    /// Module specifier the backend imports the context type from
    pub context_import: String,
    pub module_suffix: String,
}

impl Default for RpcGenConfig {
    fn default() -> Self {
        Self {
            rpc_api_url: DEFAULT_RPC_API_URL.to_string(),
            frontend_file: PathBuf::from(DEFAULT_FRONTEND_FILE),
            backend_file: PathBuf::from(DEFAULT_BACKEND_FILE),
            context_type: DEFAULT_CONTEXT_TYPE.to_string(),
            context_import: DEFAULT_CONTEXT_IMPORT.to_string(),
            module_suffix: DEFAULT_MODULE_SUFFIX.to_string(),
        }
    }
}

/// Values given on the command line; `None` keeps the lower layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rpc_api_url: Option<String>,
    pub frontend_file: Option<PathBuf>,
    pub backend_file: Option<PathBuf>,
    pub context_type: Option<String>,
    pub context_import: Option<String>,
}

impl RpcGenConfig {
    /// Defaults merged with `rpcgen.toml` when the project has one.
    pub fn load(project_root: &Path) -> Result<Self, GenerateError> {
        let path = project_root.join(CONFIG_FILENAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        tracing::debug!("Reading configuration from {}", path.display());
        let contents = fs::read_to_string(&path).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        let config: Self = toml::from_str(&contents)
            .map_err(|err| GenerateError::Config(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self, GenerateError> {
        if let Some(url) = overrides.rpc_api_url {
            self.rpc_api_url = url;
        }
        if let Some(path) = overrides.frontend_file {
            self.frontend_file = path;
        }
        if let Some(path) = overrides.backend_file {
            self.backend_file = path;
        }
        if let Some(name) = overrides.context_type {
            self.context_type = name;
        }
        if let Some(specifier) = overrides.context_import {
            self.context_import = specifier;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), GenerateError> {
        if self.context_type.trim().is_empty() {
            return Err(GenerateError::Config("contextType must not be empty".into()));
        }
        if !self.module_suffix.ends_with(".ts") {
            return Err(GenerateError::Config(format!(
                "moduleSuffix must end with '.ts', got '{}'",
                self.module_suffix
            )));
        }
        if self.frontend_file == self.backend_file {
            return Err(GenerateError::Config(
                "frontendFile and backendFile must differ".into(),
            ));
        }
        Ok(())
    }

    pub fn frontend_path(&self, project_root: &Path) -> PathBuf {
        resolve_against(project_root, &self.frontend_file)
    }

    pub fn backend_path(&self, project_root: &Path) -> PathBuf {
        resolve_against(project_root, &self.backend_file)
    }
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path.strip_prefix(".").unwrap_or(path))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RpcGenConfig::default();
        assert_eq!(config.rpc_api_url, "/api/rpc");
        assert_eq!(config.frontend_file, PathBuf::from("./frontend.rpc.ts"));
        assert_eq!(config.backend_file, PathBuf::from("./backend.rpc.ts"));
        assert_eq!(config.context_type, "RpcContext");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(RpcGenConfig::load(dir.path()).unwrap(), RpcGenConfig::default());
    }

    #[test]
    fn test_file_then_overrides() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "rpcApiUrl = \"/rpc\"\nfrontendFile = \"web/api.rpc.ts\"\n",
        )
        .unwrap();

        let config = RpcGenConfig::load(dir.path()).unwrap();
        assert_eq!(config.rpc_api_url, "/rpc");
        assert_eq!(config.backend_file, PathBuf::from("./backend.rpc.ts"));

        let config = config
            .apply(ConfigOverrides {
                rpc_api_url: Some("/v2/rpc".into()),
                ..ConfigOverrides::default()
            })
            .unwrap();
        assert_eq!(config.rpc_api_url, "/v2/rpc");
        assert_eq!(config.frontend_file, PathBuf::from("web/api.rpc.ts"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "apiUrl = \"/rpc\"\n").unwrap();
        assert!(matches!(
            RpcGenConfig::load(dir.path()),
            Err(GenerateError::Config(_))
        ));
    }

    #[test]
    fn test_same_output_paths_are_rejected() {
        let result = RpcGenConfig::default().apply(ConfigOverrides {
            backend_file: Some(PathBuf::from(DEFAULT_FRONTEND_FILE)),
            ..ConfigOverrides::default()
        });
        assert!(matches!(result, Err(GenerateError::Config(_))));
    }

    #[test]
    fn test_output_paths_resolve_against_root() {
        let config = RpcGenConfig::default();
        let root = Path::new("/project");
        assert_eq!(
            config.frontend_path(root),
            PathBuf::from("/project/frontend.rpc.ts")
        );
    }
}
