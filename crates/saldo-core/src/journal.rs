use crate::observation::Observation;
use crate::Result;
use std::path::{Path, PathBuf};

/// Separator between journal sections.
pub const SECTION_SEPARATOR: &str = "\n---\n\n";

/// The newest-first balance journal.
///
/// Each run prepends one section; prior content is never rewritten, so
/// external viewers always see the latest observation at the top.
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prepend one observation to the journal.
    ///
    /// A missing journal file is an empty prior document, not an error.
    /// Read or write failures are fatal: the journal is the durable source
    /// of truth and cannot be silently skipped.
    pub fn record(&self, observation: &Observation) -> Result<()> {
        let prior = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };

        let section = observation.render();
        let document = if prior.is_empty() {
            section
        } else {
            format!("{section}{SECTION_SEPARATOR}{prior}")
        };

        std::fs::write(&self.path, document)?;

        tracing::info!(
            "recorded observation at {} in {}",
            observation.timestamp(),
            self.path.display()
        );
        Ok(())
    }

    /// The most recent `count` sections, newest first.
    pub fn recent(&self, count: usize) -> Result<Vec<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(content
            .split(SECTION_SEPARATOR)
            .filter(|section| !section.trim().is_empty())
            .take(count)
            .map(str::to_string)
            .collect())
    }
}
