//! Run configuration: output root, variable domains, bundles and asset groups.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::dump::DumpSettings;
use crate::groups::GroupManifest;
use crate::models::VariableDomain;
use crate::variables::DEFAULT_CONTROLLER_MARKER;

/// Configuration file names searched for, in order, when no explicit path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
  ["assets.config.json", "assets.config.yaml", "assets.config.yml"];

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The configuration file exists but could not be read.
  #[error("failed to read {}", path.display())]
  Io {
    /// File that failed to load.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// The JSON configuration could not be parsed.
  #[error("failed to parse {}", path.display())]
  Json {
    /// File that failed to parse.
    path: PathBuf,
    /// Parser error.
    #[source]
    source: serde_json::Error,
  },
  /// The YAML configuration could not be parsed.
  #[error("failed to parse {}", path.display())]
  Yaml {
    /// File that failed to parse.
    path: PathBuf,
    /// Parser error.
    #[source]
    source: serde_yaml::Error,
  },
  /// Two bundles share a name.
  #[error("bundle `{name}` is declared more than once")]
  DuplicateBundle {
    /// The repeated bundle name.
    name: String,
  },
}

/// Discoverable configuration describing what to dump and where.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
  /// Output root; relative values are taken from the configuration file's directory.
  pub write_to: String,
  /// Base directory for asset input files, relative to the configuration file's directory.
  pub source_root: String,
  /// Path segment removed from targets served by a dynamic controller.
  pub controller_marker: String,
  /// Variable name to ordered list of values.
  pub variables: VariableDomain,
  /// Bundles in dump order.
  pub bundles: Vec<BundleConfig>,
  /// Group category to member group names.
  pub groups: BTreeMap<String, Vec<String>>,
  /// Group category to names of groups that are already compiled.
  pub compiled_groups: BTreeMap<String, Vec<String>>,
  #[serde(skip)]
  base_dir: PathBuf,
}

/// Bundle declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleConfig {
  /// Unique bundle name.
  pub name: String,
  /// Assets produced by the bundle.
  #[serde(default)]
  pub assets: Vec<AssetDefinition>,
}

/// Asset declaration within a bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetDefinition {
  /// Target path template relative to the output root.
  pub target: String,
  /// Variables the asset is compiled for.
  #[serde(default)]
  pub vars: Vec<String>,
  /// Input files concatenated into the asset, relative to the source root.
  #[serde(default)]
  pub inputs: Vec<String>,
}

impl Default for AssetConfig {
  fn default() -> Self {
    Self {
      write_to: "web".into(),
      source_root: ".".into(),
      controller_marker: DEFAULT_CONTROLLER_MARKER.into(),
      variables: VariableDomain::new(),
      bundles: Vec::new(),
      groups: BTreeMap::new(),
      compiled_groups: BTreeMap::new(),
      base_dir: PathBuf::from("."),
    }
  }
}

impl AssetConfig {
  /// Load the first default configuration file found in `dir`.
  ///
  /// When none exists the defaults are used, rooted at `dir`.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    for name in DEFAULT_CONFIG_FILES {
      let candidate = dir.join(name);
      if candidate.is_file() {
        return Self::from_path(&candidate);
      }
    }

    Ok(Self {
      base_dir: dir.to_path_buf(),
      ..Self::default()
    })
  }

  /// Read configuration from a JSON or YAML file, chosen by extension.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let mut config: Self = if is_yaml {
      serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
      })?
    } else {
      serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
      })?
    };

    config.base_dir = path
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_else(|| PathBuf::from("."));
    config.validate()?;
    Ok(config)
  }

  /// Reject configurations with repeated bundle names.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for bundle in &self.bundles {
      if !seen.insert(bundle.name.as_str()) {
        return Err(ConfigError::DuplicateBundle {
          name: bundle.name.clone(),
        });
      }
    }
    Ok(())
  }

  /// Configured output root resolved against the configuration directory.
  pub fn output_root(&self) -> PathBuf {
    self.base_dir.join(&self.write_to)
  }

  /// Source root resolved against the configuration directory.
  pub fn source_root_path(&self) -> PathBuf {
    self.base_dir.join(&self.source_root)
  }

  /// Settings for a dump run, optionally writing to `write_to` instead of the configured root.
  ///
  /// The returned output root is always absolute.
  pub fn dump_settings(&self, write_to: Option<&Path>) -> std::io::Result<DumpSettings> {
    let root = match write_to {
      Some(path) => path.to_path_buf(),
      None => self.output_root(),
    };

    Ok(DumpSettings {
      output_root: std::path::absolute(root)?,
      controller_marker: self.controller_marker.clone(),
      variables: self.variables.clone(),
    })
  }
}

impl GroupManifest for AssetConfig {
  fn asset_groups(&self) -> &BTreeMap<String, Vec<String>> {
    &self.groups
  }

  fn compiled_groups(&self) -> &BTreeMap<String, Vec<String>> {
    &self.compiled_groups
  }
}
