//! Compiler configuration — output locations and generated file names,
//! loaded from `cffc.yaml` or `~/.cffc/config.yaml`.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cff::CodegenOptions;

const LOCAL_CONFIG: &str = "cffc.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Where and under which names the generated documents are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_header_file")]
    pub header_file: String,
    #[serde(default = "default_implementation_file")]
    pub implementation_file: String,
    #[serde(default = "default_runtime_header")]
    pub runtime_header: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_header_file() -> String {
    "Machine.h".to_string()
}

fn default_implementation_file() -> String {
    "Machine.cpp".to_string()
}

fn default_runtime_header() -> String {
    "RunTime.h".to_string()
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            header_file: default_header_file(),
            implementation_file: default_implementation_file(),
            runtime_header: default_runtime_header(),
        }
    }
}

impl CompilerConfig {
    /// Load a config file that the user asked for explicitly.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look for `./cffc.yaml`, then `~/.cffc/config.yaml`.
    /// Missing or broken files fall back to the defaults.
    pub fn discover() -> Self {
        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG))
            .chain(dirs::home_dir().map(|home| home.join(".cffc").join("config.yaml")));

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => {
                    debug!("using config {}", path.display());
                    return config;
                }
                Err(e) => warn!("ignoring {e}"),
            }
        }
        Self::default()
    }

    pub fn codegen_options(&self) -> CodegenOptions {
        CodegenOptions {
            header_file: self.header_file.clone(),
            runtime_header: self.runtime_header.clone(),
        }
    }

    pub fn header_path(&self) -> PathBuf {
        self.output_dir.join(&self.header_file)
    }

    pub fn implementation_path(&self) -> PathBuf {
        self.output_dir.join(&self.implementation_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CompilerConfig::default();
        assert_eq!(config.header_file, "Machine.h");
        assert_eq!(config.implementation_file, "Machine.cpp");
        assert_eq!(config.header_path(), PathBuf::from("./Machine.h"));
        assert_eq!(config.codegen_options(), CodegenOptions::default());
    }

    #[test]
    fn serialize_deserialize() {
        let config = CompilerConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: CompilerConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let yaml = r#"
output_dir: build
header_file: Box.h
"#;
        let config: CompilerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("build"));
        assert_eq!(config.header_file, "Box.h");
        assert_eq!(config.implementation_file, "Machine.cpp");
        assert_eq!(config.runtime_header, "RunTime.h");
        assert_eq!(config.implementation_path(), PathBuf::from("build/Machine.cpp"));
        assert_eq!(config.codegen_options().header_guard(), "BOX_H");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cffc.yaml");
        std::fs::write(&path, "runtime_header: Robot.h\n").unwrap();
        let config = CompilerConfig::load_from(&path).unwrap();
        assert_eq!(config.runtime_header, "Robot.h");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CompilerConfig::load_from(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "output_dir: [unclosed\n").unwrap();
        let err = CompilerConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn discover_never_fails() {
        let _ = CompilerConfig::discover();
    }
}
