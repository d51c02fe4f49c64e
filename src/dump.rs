//! Dump orchestrator writing every asset combination below the output root.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Combination, VariableDomain};
use crate::references::validate_references;
use crate::report::{Diagnostic, DumpReport, DumpReporter, ProgressEvent, ProgressKind};
use crate::source::{Bundle, CompressibleAsset};
use crate::variables::{
  DEFAULT_CONTROLLER_MARKER, ResolveError, TargetResolver, VarResolver, expand_combinations,
};

/// Settings for a dump run, injected by the caller.
#[derive(Debug, Clone)]
pub struct DumpSettings {
  /// Absolute directory all targets are written below.
  pub output_root: PathBuf,
  /// Path segment stripped from resolved targets.
  pub controller_marker: String,
  /// Values to expand asset variables with.
  pub variables: VariableDomain,
}

impl DumpSettings {
  /// Settings writing below `output_root` with no variables configured.
  pub fn new(output_root: impl Into<PathBuf>) -> Self {
    Self {
      output_root: output_root.into(),
      controller_marker: DEFAULT_CONTROLLER_MARKER.to_string(),
      variables: VariableDomain::new(),
    }
  }
}

/// Errors that abort a dump run.
#[derive(Debug, Error)]
pub enum DumpError {
  /// A missing target directory could not be created.
  #[error("unable to create directory {}", path.display())]
  DirectoryCreation {
    /// Directory that could not be created.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// A target file could not be written.
  #[error("unable to write file {}", path.display())]
  Write {
    /// File that could not be written.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// An asset failed to produce its content.
  #[error("unable to dump asset {asset}")]
  Content {
    /// Artifact description: bundle, template and combination.
    asset: String,
    /// Error returned by the asset.
    #[source]
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
  },
}

/// Drives bundles, assets and combinations through resolve, write and validate.
pub struct AssetDumper<R = VarResolver> {
  settings: DumpSettings,
  resolver: R,
}

impl AssetDumper<VarResolver> {
  /// Create a dumper using the placeholder resolver for the configured root.
  pub fn new(settings: DumpSettings) -> Self {
    let resolver = VarResolver::new(&settings.output_root)
      .with_controller_marker(settings.controller_marker.clone());
    Self { settings, resolver }
  }
}

impl<R: TargetResolver> AssetDumper<R> {
  /// Create a dumper with a custom target resolver.
  pub fn with_resolver(settings: DumpSettings, resolver: R) -> Self {
    Self { settings, resolver }
  }

  /// Settings the dumper was created with.
  pub fn settings(&self) -> &DumpSettings {
    &self.settings
  }

  /// Dump every asset of every bundle for each of its combinations.
  ///
  /// Directory and write failures abort the run. Reference problems, collisions and
  /// unresolved variables are reported to `reporter` and collected in the returned report.
  pub fn dump(
    &self,
    bundles: &[Bundle],
    reporter: &mut dyn DumpReporter,
  ) -> Result<DumpReport, DumpError> {
    let mut run = DumpRun {
      reporter,
      report: DumpReport::default(),
      claimed: HashMap::new(),
    };

    for bundle in bundles {
      debug!(bundle = %bundle.name, assets = bundle.assets.len(), "dumping bundle");
      for asset in &bundle.assets {
        self.dump_asset(&bundle.name, asset.as_ref(), &mut run)?;
      }
    }

    let report = run.report;
    info!(
      files = report.files_written().len(),
      directories = report.directories_created().len(),
      diagnostics = report.diagnostics.len(),
      "asset dump finished"
    );
    Ok(report)
  }

  fn dump_asset(
    &self,
    bundle: &str,
    asset: &dyn CompressibleAsset,
    run: &mut DumpRun<'_>,
  ) -> Result<(), DumpError> {
    for combination in expand_combinations(asset.vars(), &self.settings.variables) {
      let target = match self.resolver.resolve(asset.target_path(), &combination) {
        Ok(target) => target,
        Err(ResolveError::UnresolvedVariable { template, variable }) => {
          warn!(bundle, %template, %variable, "skipping asset with unresolved variable");
          run.diagnose(Diagnostic::UnresolvedVariable {
            bundle: bundle.to_string(),
            template,
            variable,
          });
          continue;
        }
      };

      let label = artifact_label(bundle, asset.target_path(), &combination);
      debug!(artifact = %label, target = %target.display(), "dumping artifact");

      if let Some(previous) = run.claimed.insert(target.clone(), label.clone()) {
        run.diagnose(Diagnostic::TargetCollision {
          target: target.clone(),
          previous,
          current: label.clone(),
        });
      }

      self.ensure_parent_dir(&target, run)?;

      let content = asset
        .dump(&combination)
        .map_err(|source| DumpError::Content {
          asset: label,
          source: source.into(),
        })?;

      fs::write(&target, &content).map_err(|source| DumpError::Write {
        path: target.clone(),
        source,
      })?;
      run.progress(ProgressKind::FileWritten, target.clone());

      let text = String::from_utf8_lossy(&content);
      for diagnostic in validate_references(&text, &self.settings.output_root, &target) {
        run.diagnose(diagnostic);
      }
    }

    Ok(())
  }

  fn ensure_parent_dir(&self, target: &Path, run: &mut DumpRun<'_>) -> Result<(), DumpError> {
    let Some(dir) = target.parent() else {
      return Ok(());
    };
    if dir.is_dir() {
      return Ok(());
    }

    fs::create_dir_all(dir).map_err(|source| DumpError::DirectoryCreation {
      path: dir.to_path_buf(),
      source,
    })?;
    run.progress(ProgressKind::DirectoryCreated, dir.to_path_buf());
    Ok(())
  }
}

struct DumpRun<'a> {
  reporter: &'a mut dyn DumpReporter,
  report: DumpReport,
  claimed: HashMap<PathBuf, String>,
}

impl DumpRun<'_> {
  fn progress(&mut self, kind: ProgressKind, path: PathBuf) {
    let event = ProgressEvent::now(kind, path);
    self.reporter.progress(&event);
    self.report.progress.push(event);
  }

  fn diagnose(&mut self, diagnostic: Diagnostic) {
    self.reporter.diagnostic(&diagnostic);
    self.report.diagnostics.push(diagnostic);
  }
}

fn artifact_label(bundle: &str, template: &str, combination: &Combination) -> String {
  if combination.is_empty() {
    format!("{bundle}:{template}")
  } else {
    format!("{bundle}:{template} [{combination}]")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::report::ConsoleReporter;
  use anyhow::anyhow;
  use tempfile::tempdir;

  struct TemplateAsset {
    target: String,
    vars: Vec<String>,
    body: String,
  }

  impl TemplateAsset {
    fn new(target: &str, vars: &[&str], body: &str) -> Self {
      Self {
        target: target.to_string(),
        vars: vars.iter().map(|v| v.to_string()).collect(),
        body: body.to_string(),
      }
    }
  }

  impl CompressibleAsset for TemplateAsset {
    fn target_path(&self) -> &str {
      &self.target
    }

    fn vars(&self) -> &[String] {
      &self.vars
    }

    fn dump(&self, combination: &Combination) -> anyhow::Result<Vec<u8>> {
      let mut body = self.body.clone();
      for (name, value) in combination.iter() {
        body = body.replace(&format!("{{{name}}}"), value);
      }
      Ok(body.into_bytes())
    }
  }

  struct FailingAsset;

  impl CompressibleAsset for FailingAsset {
    fn target_path(&self) -> &str {
      "js/broken.js"
    }

    fn vars(&self) -> &[String] {
      &[]
    }

    fn dump(&self, _combination: &Combination) -> anyhow::Result<Vec<u8>> {
      Err(anyhow!("compiler crashed"))
    }
  }

  fn themed_settings(root: &Path) -> DumpSettings {
    let mut settings = DumpSettings::new(root);
    settings.variables.insert(
      "theme".to_string(),
      vec!["light".to_string(), "dark".to_string()],
    );
    settings
  }

  fn dump_with_console(
    settings: DumpSettings,
    bundles: &[Bundle],
  ) -> (Result<DumpReport, DumpError>, String) {
    let mut reporter = ConsoleReporter::new(Vec::new());
    let result = AssetDumper::new(settings).dump(bundles, &mut reporter);
    let output = String::from_utf8(reporter.into_inner()).unwrap();
    (result, output)
  }

  #[test]
  fn writes_one_file_per_theme_and_creates_directory_once() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("out");
    let bundles = vec![
      Bundle::new("app").with_asset(TemplateAsset::new("css/{theme}.css", &["theme"], ".{theme}{}")),
    ];

    let (result, output) = dump_with_console(themed_settings(&root), &bundles);
    let report = result.unwrap();

    assert_eq!(report.files_written(), vec![
      root.join("css/light.css").as_path(),
      root.join("css/dark.css").as_path(),
    ]);
    assert_eq!(report.directories_created(), vec![root.join("css").as_path()]);
    assert_eq!(fs::read_to_string(root.join("css/light.css")).unwrap(), ".light{}");
    assert_eq!(fs::read_to_string(root.join("css/dark.css")).unwrap(), ".dark{}");
    assert_eq!(output.matches("[file+]").count(), 2);
    assert_eq!(output.matches("[dir+]").count(), 1);
  }

  #[test]
  fn existing_directory_produces_no_directory_event() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("out");
    fs::create_dir_all(root.join("css")).unwrap();
    let bundles = vec![
      Bundle::new("app").with_asset(TemplateAsset::new("css/{theme}.css", &["theme"], "")),
    ];

    let (result, _) = dump_with_console(themed_settings(&root), &bundles);
    let report = result.unwrap();

    assert_eq!(report.files_written().len(), 2);
    assert!(report.directories_created().is_empty());
  }

  #[test]
  fn written_content_reads_back_identically() {
    let dir = tempdir().unwrap();
    let body = "binary-ish \u{0}\u{1} payload";
    let bundles = vec![Bundle::new("app").with_asset(TemplateAsset::new("raw/data.bin", &[], body))];

    let (result, _) = dump_with_console(DumpSettings::new(dir.path()), &bundles);
    result.unwrap();

    assert_eq!(fs::read(dir.path().join("raw/data.bin")).unwrap(), body.as_bytes());
  }

  #[test]
  fn controller_marker_is_collapsed_in_output_layout() {
    let dir = tempdir().unwrap();
    let bundles = vec![
      Bundle::new("app").with_asset(TemplateAsset::new("_controller/css/{theme}.css", &["theme"], "")),
    ];

    let (result, _) = dump_with_console(themed_settings(dir.path()), &bundles);
    result.unwrap();

    assert!(dir.path().join("css/light.css").is_file());
    assert!(dir.path().join("css/dark.css").is_file());
    assert!(!dir.path().join("_controller").exists());
  }

  #[test]
  fn reference_problems_are_reported_without_aborting() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("img")).unwrap();
    fs::write(dir.path().join("img/logo.png"), b"png").unwrap();
    let body = "a{background:url(/img/logo.png?v=3)} b{background:url('/img/gone.png')} c{background:url(img/logo.png)}";
    let bundles = vec![Bundle::new("app").with_asset(TemplateAsset::new("css/app.css", &[], body))];

    let (result, output) = dump_with_console(DumpSettings::new(dir.path()), &bundles);
    let report = result.unwrap();
    let target = dir.path().join("css/app.css");

    assert!(target.is_file());
    assert_eq!(report.diagnostics, vec![
      Diagnostic::DanglingReference {
        url: "/img/gone.png".to_string(),
        target: target.clone(),
      },
      Diagnostic::NonAbsoluteReference {
        url: "img/logo.png".to_string(),
        target: target.clone(),
      },
    ]);
    assert!(report.diagnostics.iter().all(|d| d.target() == Some(target.as_path())));
    assert!(output.contains("\"/img/gone.png\""));
  }

  #[test]
  fn references_are_checked_below_root_containing_controller_marker() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("_controller").join("web");
    fs::create_dir_all(root.join("img")).unwrap();
    fs::write(root.join("img/logo.png"), b"png").unwrap();
    let bundles = vec![Bundle::new("app").with_asset(TemplateAsset::new(
      "_controller/css/app.css",
      &[],
      "a{background:url(/img/logo.png)}",
    ))];

    let (result, _) = dump_with_console(DumpSettings::new(&root), &bundles);
    let report = result.unwrap();

    assert_eq!(report.files_written(), vec![root.join("css/app.css").as_path()]);
    assert!(report.diagnostics.is_empty());
  }

  #[test]
  fn unresolved_variable_skips_only_that_artifact() {
    let dir = tempdir().unwrap();
    let bundles = vec![
      Bundle::new("app")
        .with_asset(TemplateAsset::new("css/{locale}.css", &["locale"], ""))
        .with_asset(TemplateAsset::new("css/{theme}.css", &["theme"], "")),
    ];

    let (result, _) = dump_with_console(themed_settings(dir.path()), &bundles);
    let report = result.unwrap();

    assert_eq!(report.diagnostics, vec![Diagnostic::UnresolvedVariable {
      bundle: "app".to_string(),
      template: "css/{locale}.css".to_string(),
      variable: "locale".to_string(),
    }]);
    assert_eq!(report.files_written().len(), 2);
  }

  #[test]
  fn colliding_targets_are_reported_and_last_write_wins() {
    let dir = tempdir().unwrap();
    let bundles = vec![
      Bundle::new("app").with_asset(TemplateAsset::new("css/app.css", &["theme"], "{theme}")),
    ];

    let (result, _) = dump_with_console(themed_settings(dir.path()), &bundles);
    let report = result.unwrap();

    assert_eq!(report.files_written().len(), 2);
    assert_eq!(report.diagnostics.len(), 1);
    assert!(matches!(
      &report.diagnostics[0],
      Diagnostic::TargetCollision { previous, current, .. }
        if previous.ends_with("[theme=light]") && current.ends_with("[theme=dark]")
    ));
    assert_eq!(fs::read_to_string(dir.path().join("css/app.css")).unwrap(), "dark");
  }

  #[test]
  fn custom_resolver_decides_target_layout() {
    struct FlatResolver(PathBuf);

    impl TargetResolver for FlatResolver {
      fn resolve(&self, template: &str, combination: &Combination) -> Result<PathBuf, ResolveError> {
        let name = template.replace('/', "_");
        let suffix = combination.get("theme").unwrap_or("default");
        Ok(self.0.join(format!("{suffix}-{name}")))
      }
    }

    let dir = tempdir().unwrap();
    let settings = themed_settings(dir.path());
    let dumper = AssetDumper::with_resolver(settings, FlatResolver(dir.path().to_path_buf()));
    let bundles = vec![Bundle::new("app").with_asset(TemplateAsset::new("css/app.css", &["theme"], "x"))];

    let report = dumper.dump(&bundles, &mut ConsoleReporter::new(Vec::new())).unwrap();

    assert_eq!(dumper.settings().output_root, dir.path());
    assert_eq!(report.files_written(), vec![
      dir.path().join("light-css_app.css").as_path(),
      dir.path().join("dark-css_app.css").as_path(),
    ]);
    assert!(report.directories_created().is_empty());
  }

  #[test]
  fn directory_creation_failure_aborts_with_path() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("css"), b"not a directory").unwrap();
    let bundles = vec![
      Bundle::new("app")
        .with_asset(TemplateAsset::new("css/app.css", &[], ""))
        .with_asset(TemplateAsset::new("js/app.js", &[], "")),
    ];

    let (result, _) = dump_with_console(DumpSettings::new(dir.path()), &bundles);
    let err = result.unwrap_err();

    assert!(matches!(&err, DumpError::DirectoryCreation { path, .. } if *path == dir.path().join("css")));
    assert!(err.to_string().contains("unable to create directory"));
    assert!(!dir.path().join("js").exists());
  }

  #[test]
  fn write_failure_aborts_with_path() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("css/app.css")).unwrap();
    let bundles = vec![Bundle::new("app").with_asset(TemplateAsset::new("css/app.css", &[], ""))];

    let (result, output) = dump_with_console(DumpSettings::new(dir.path()), &bundles);
    let err = result.unwrap_err();

    assert!(matches!(&err, DumpError::Write { path, .. } if *path == dir.path().join("css/app.css")));
    assert!(!output.contains("[file+]"));
  }

  #[test]
  fn content_failure_names_the_artifact() {
    let dir = tempdir().unwrap();
    let bundles = vec![Bundle::new("scripts").with_asset(FailingAsset)];

    let (result, _) = dump_with_console(DumpSettings::new(dir.path()), &bundles);
    let err = result.unwrap_err();

    assert_eq!(err.to_string(), "unable to dump asset scripts:js/broken.js");
    assert_eq!(
      std::error::Error::source(&err).map(ToString::to_string),
      Some("compiler crashed".to_string())
    );
  }
}
