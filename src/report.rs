//! Progress records and advisory diagnostics emitted while dumping assets.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::warn;

/// Kind of filesystem change recorded in a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
  /// A missing target directory was created.
  DirectoryCreated,
  /// A target file was written.
  FileWritten,
}

impl ProgressKind {
  /// Short tag used in console output.
  pub fn label(self) -> &'static str {
    match self {
      Self::DirectoryCreated => "dir+",
      Self::FileWritten => "file+",
    }
  }
}

/// Timestamped record of a directory created or a file written.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
  /// Local time the change was made.
  pub timestamp: DateTime<Local>,
  /// What happened.
  pub kind: ProgressKind,
  /// Directory or file affected.
  pub path: PathBuf,
}

impl ProgressEvent {
  /// Record `kind` for `path` at the current local time.
  pub fn now(kind: ProgressKind, path: PathBuf) -> Self {
    Self {
      timestamp: Local::now(),
      kind,
      path,
    }
  }
}

impl fmt::Display for ProgressEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} [{}] {}",
      self.timestamp.format("%H:%M:%S"),
      self.kind.label(),
      self.path.display()
    )
  }
}

/// Advisory finding reported during a dump. None of these abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
  /// Root-relative reference that does not resolve to a file under the output root.
  DanglingReference {
    /// URL as written in the content.
    url: String,
    /// File containing the reference.
    target: PathBuf,
  },
  /// Reference that is not root-relative and therefore was not checked.
  NonAbsoluteReference {
    /// URL as written in the content.
    url: String,
    /// File containing the reference.
    target: PathBuf,
  },
  /// Two artifacts resolved to the same target; the later one overwrote the earlier.
  TargetCollision {
    /// Path both artifacts were written to.
    target: PathBuf,
    /// Artifact written first.
    previous: String,
    /// Artifact that overwrote it.
    current: String,
  },
  /// Artifact skipped because its template uses a variable with no bound value.
  UnresolvedVariable {
    /// Bundle owning the asset.
    bundle: String,
    /// Template containing the placeholder.
    template: String,
    /// Name of the unbound variable.
    variable: String,
  },
}

impl Diagnostic {
  /// Target file the diagnostic refers to, when one was resolved.
  pub fn target(&self) -> Option<&Path> {
    match self {
      Self::DanglingReference { target, .. }
      | Self::NonAbsoluteReference { target, .. }
      | Self::TargetCollision { target, .. } => Some(target),
      Self::UnresolvedVariable { .. } => None,
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::DanglingReference { url, target } => write!(
        f,
        "Resource path \"{url}\" does not point to any file inside the output directory (in {}).",
        target.display()
      ),
      Self::NonAbsoluteReference { url, target } => write!(
        f,
        "Please use absolute resource paths to avoid wrong path resolution when styles are imported from other bundles (\"{url}\" given in {}).",
        target.display()
      ),
      Self::TargetCollision {
        target,
        previous,
        current,
      } => write!(
        f,
        "Target {} is produced by both {previous} and {current}; the last write wins.",
        target.display()
      ),
      Self::UnresolvedVariable {
        bundle,
        template,
        variable,
      } => write!(
        f,
        "Skipped asset `{template}` in bundle `{bundle}`: variable `{variable}` has no value."
      ),
    }
  }
}

/// Sink receiving progress events and diagnostics as the dump proceeds.
pub trait DumpReporter {
  /// Called after a directory is created or a file is written.
  fn progress(&mut self, event: &ProgressEvent);

  /// Called for every advisory diagnostic.
  fn diagnostic(&mut self, diagnostic: &Diagnostic);
}

/// Reporter writing one line per event to any writer, usually stdout.
#[derive(Debug)]
pub struct ConsoleReporter<W: Write> {
  out: W,
  write_failed: bool,
}

impl<W: Write> ConsoleReporter<W> {
  /// Wrap the writer that receives report lines.
  pub fn new(out: W) -> Self {
    Self {
      out,
      write_failed: false,
    }
  }

  /// Write a free-form line, such as a header or summary.
  ///
  /// Write errors never abort the dump; the first one is logged as a warning.
  pub fn line(&mut self, text: impl fmt::Display) {
    if let Err(err) = writeln!(self.out, "{text}") {
      if !self.write_failed {
        warn!(error = %err, "failed to write report output");
      }
      self.write_failed = true;
    }
  }

  /// Returns `true` once any report line failed to write.
  pub fn write_failed(&self) -> bool {
    self.write_failed
  }

  /// Return the wrapped writer.
  pub fn into_inner(self) -> W {
    self.out
  }
}

impl<W: Write> DumpReporter for ConsoleReporter<W> {
  fn progress(&mut self, event: &ProgressEvent) {
    self.line(event);
  }

  fn diagnostic(&mut self, diagnostic: &Diagnostic) {
    self.line(diagnostic);
  }
}

/// Everything that happened during a dump run.
#[derive(Debug, Default)]
pub struct DumpReport {
  /// Progress events in the order they occurred.
  pub progress: Vec<ProgressEvent>,
  /// Advisory diagnostics in the order they were found.
  pub diagnostics: Vec<Diagnostic>,
}

impl DumpReport {
  /// Paths of every file written, in write order.
  pub fn files_written(&self) -> Vec<&Path> {
    self.paths_of(ProgressKind::FileWritten)
  }

  /// Paths of every directory created, in creation order.
  pub fn directories_created(&self) -> Vec<&Path> {
    self.paths_of(ProgressKind::DirectoryCreated)
  }

  fn paths_of(&self, kind: ProgressKind) -> Vec<&Path> {
    self
      .progress
      .iter()
      .filter(|event| event.kind == kind)
      .map(|event| event.path.as_path())
      .collect()
  }

  /// One-line summary of the run.
  pub fn summary(&self) -> String {
    format!(
      "{} file(s) written, {} directories created, {} diagnostic(s).",
      self.files_written().len(),
      self.directories_created().len(),
      self.diagnostics.len()
    )
  }
}
