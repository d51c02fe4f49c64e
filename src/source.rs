//! Asset source collaborator: the bundles, assets and content producers of a dump run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{AssetConfig, AssetDefinition};
use crate::models::Combination;
use crate::variables::substitute_placeholders;

/// Single templated output unit within a bundle.
pub trait CompressibleAsset {
  /// Target path template relative to the output root, possibly containing `{var}` placeholders.
  fn target_path(&self) -> &str;

  /// Names of the variables the asset depends on, in declaration order.
  fn vars(&self) -> &[String];

  /// Produce the compiled content for one combination.
  fn dump(&self, combination: &Combination) -> Result<Vec<u8>>;
}

/// Named group of compressible assets.
pub struct Bundle {
  /// Bundle name, unique within a run.
  pub name: String,
  /// Assets in dump order.
  pub assets: Vec<Box<dyn CompressibleAsset>>,
}

impl Bundle {
  /// Create an empty bundle.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      assets: Vec::new(),
    }
  }

  /// Builder-style helper appending an asset.
  pub fn with_asset(mut self, asset: impl CompressibleAsset + 'static) -> Self {
    self.assets.push(Box::new(asset));
    self
  }
}

/// Collaborator exposing the ordered bundles of a run.
pub trait AssetSource {
  /// Bundles to dump, in order.
  fn bundles(&self) -> Result<Vec<Bundle>>;
}

/// Asset whose content is the newline-joined concatenation of its input files.
///
/// Input paths may use the same `{var}` placeholders as the target template and are read
/// relative to the source root.
#[derive(Debug, Clone)]
pub struct FileAsset {
  target: String,
  vars: Vec<String>,
  inputs: Vec<String>,
  source_root: PathBuf,
}

impl FileAsset {
  /// Build an asset from its configured definition.
  pub fn from_definition(definition: &AssetDefinition, source_root: &Path) -> Self {
    Self {
      target: definition.target.clone(),
      vars: definition.vars.clone(),
      inputs: definition.inputs.clone(),
      source_root: source_root.to_path_buf(),
    }
  }
}

impl CompressibleAsset for FileAsset {
  fn target_path(&self) -> &str {
    &self.target
  }

  fn vars(&self) -> &[String] {
    &self.vars
  }

  fn dump(&self, combination: &Combination) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    for (index, input) in self.inputs.iter().enumerate() {
      let relative = substitute_placeholders(input, combination)?;
      let path = self.source_root.join(relative);
      let bytes =
        fs::read(&path).with_context(|| format!("failed to read input {}", path.display()))?;

      if index > 0 {
        content.push(b'\n');
      }
      content.extend_from_slice(&bytes);
    }
    Ok(content)
  }
}

/// Asset source backed by the bundles declared in configuration.
#[derive(Debug)]
pub struct ConfigAssetSource<'a> {
  config: &'a AssetConfig,
}

impl<'a> ConfigAssetSource<'a> {
  /// Wrap a loaded configuration.
  pub fn new(config: &'a AssetConfig) -> Self {
    Self { config }
  }
}

impl AssetSource for ConfigAssetSource<'_> {
  fn bundles(&self) -> Result<Vec<Bundle>> {
    let source_root = self.config.source_root_path();
    Ok(
      self
        .config
        .bundles
        .iter()
        .map(|bundle| Bundle {
          name: bundle.name.clone(),
          assets: bundle
            .assets
            .iter()
            .map(|definition| {
              Box::new(FileAsset::from_definition(definition, &source_root))
                as Box<dyn CompressibleAsset>
            })
            .collect(),
        })
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn definition(target: &str, vars: &[&str], inputs: &[&str]) -> AssetDefinition {
    AssetDefinition {
      target: target.to_string(),
      vars: vars.iter().map(|v| v.to_string()).collect(),
      inputs: inputs.iter().map(|v| v.to_string()).collect(),
    }
  }

  #[test]
  fn concatenates_inputs_resolved_for_combination() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("styles/dark")).unwrap();
    fs::write(dir.path().join("styles/base.css"), "body{}").unwrap();
    fs::write(dir.path().join("styles/dark/theme.css"), ".dark{}").unwrap();

    let asset = FileAsset::from_definition(
      &definition(
        "css/{theme}.css",
        &["theme"],
        &["styles/base.css", "styles/{theme}/theme.css"],
      ),
      dir.path(),
    );

    let content = asset
      .dump(&Combination::default().with("theme", "dark"))
      .unwrap();
    assert_eq!(content, b"body{}\n.dark{}");
  }

  #[test]
  fn missing_input_names_the_path() {
    let dir = tempdir().unwrap();
    let asset = FileAsset::from_definition(
      &definition("css/app.css", &[], &["styles/missing.css"]),
      dir.path(),
    );

    let err = asset.dump(&Combination::default()).unwrap_err();
    assert!(format!("{err:#}").contains("missing.css"));
  }

  #[test]
  fn config_source_preserves_bundle_and_asset_order() {
    let config: AssetConfig = serde_json::from_str(
      r#"{
        "bundles": [
          {"name": "app", "assets": [{"target": "a.css"}, {"target": "b.css"}]},
          {"name": "admin", "assets": [{"target": "c.css", "vars": ["theme"]}]}
        ]
      }"#,
    )
    .unwrap();

    let bundles = ConfigAssetSource::new(&config).bundles().unwrap();
    let names: Vec<&str> = bundles.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["app", "admin"]);
    let targets: Vec<&str> = bundles[0].assets.iter().map(|a| a.target_path()).collect();
    assert_eq!(targets, vec!["a.css", "b.css"]);
    assert_eq!(bundles[1].assets[0].vars(), ["theme".to_string()]);
  }
}
