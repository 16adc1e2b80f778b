//! Persistence of edited values to the working file.
//!
//! Edited values are written to one well-known location before every install,
//! and an upgrade reads whatever was written last. Rather than sharing that
//! path implicitly between steps, [`ValuesWorkdir::persist`] returns a
//! [`ValuesFile`] handle that install and upgrade take as an explicit
//! parameter. An upgrade without a handle from a prior persist cannot be
//! expressed.

use std::path::{Path, PathBuf};

use helmdeck_values::ConfigDocument;
use tracing::debug;

use crate::error::{ConsoleError, ConsoleResult};

/// The working location edited values are persisted to.
#[derive(Debug, Clone)]
pub struct ValuesWorkdir {
    path: PathBuf,
}

impl ValuesWorkdir {
    /// Create a workdir writing to the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the document to the working file, replacing any prior content,
    /// and return a handle to the persisted file.
    pub fn persist(&self, values: &ConfigDocument) -> ConsoleResult<ValuesFile> {
        let yaml = values.to_yaml()?;
        std::fs::write(&self.path, yaml).map_err(|source| ConsoleError::WorkingFile {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "persisted edited values");
        Ok(ValuesFile {
            path: self.path.clone(),
        })
    }
}

/// Handle to a persisted values file.
#[derive(Debug, Clone)]
pub struct ValuesFile {
    path: PathBuf,
}

impl ValuesFile {
    /// Location of the persisted values.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
