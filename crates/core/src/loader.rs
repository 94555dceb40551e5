//! Source Loader (C4): decouples where compiled plugin content comes from
//! from how the Compiler turns it into an Executable Artifact.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

/// Supplies a byte stream to a [`crate::compiler::Compiler`].
pub trait SourceLoader {
  /// Opens a fresh reader over the source content. May be called more than
  /// once; each call starts from the beginning.
  fn get_reader(&self) -> io::Result<Box<dyn Read>>;

  /// A human-readable identifier for diagnostics, if one exists.
  fn get_source_url(&self) -> Option<String>;
}

/// Loads compiled content from a file on disk.
pub struct FileLoader {
  path: PathBuf,
}

impl FileLoader {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl SourceLoader for FileLoader {
  fn get_reader(&self) -> io::Result<Box<dyn Read>> {
    Ok(Box::new(File::open(&self.path)?))
  }

  fn get_source_url(&self) -> Option<String> {
    Some(format!("file://{}", self.path.display()))
  }
}

/// Loads compiled content already resident in memory, e.g. an embedded
/// plugin or test fixture.
pub struct MemoryLoader {
  bytes: Vec<u8>,
  source_url: Option<String>,
}

impl MemoryLoader {
  #[must_use]
  pub fn new(bytes: Vec<u8>) -> Self {
    Self {
      bytes,
      source_url: None,
    }
  }

  #[must_use]
  pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
    self.source_url = Some(url.into());
    self
  }
}

impl SourceLoader for MemoryLoader {
  fn get_reader(&self) -> io::Result<Box<dyn Read>> {
    Ok(Box::new(Cursor::new(self.bytes.clone())))
  }

  fn get_source_url(&self) -> Option<String> {
    self.source_url.clone()
  }
}
