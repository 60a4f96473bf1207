//! Discovery of Apex source files.
//!
//! A project source tree keeps classes in `classes/*.cls` and triggers in
//! `triggers/*.trigger`. The renderer needs those files to annotate coverage.

use crate::error::{ReportError, Result};
use crate::model::EntityKind;
use crate::report::CoverageResult;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CLASS_EXTENSION: &str = "cls";
const TRIGGER_EXTENSION: &str = "trigger";

/// Lookup table from entity name to source file, per entity kind.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    classes: BTreeMap<String, PathBuf>,
    triggers: BTreeMap<String, PathBuf>,
}

impl SourceIndex {
    /// Scan `src_dir/classes` and `src_dir/triggers`.
    ///
    /// A missing subdirectory contributes no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing subdirectory cannot be read.
    pub fn discover(src_dir: &Path) -> Result<Self> {
        let classes = scan_dir(&src_dir.join(EntityKind::Class.dir_name()), CLASS_EXTENSION)?;
        let triggers = scan_dir(
            &src_dir.join(EntityKind::Trigger.dir_name()),
            TRIGGER_EXTENSION,
        )?;
        debug!(
            src_dir = %src_dir.display(),
            classes = classes.len(),
            triggers = triggers.len(),
            "Discovered source files"
        );
        Ok(Self { classes, triggers })
    }

    /// Register a source file by hand.
    pub fn insert(&mut self, kind: EntityKind, name: impl Into<String>, path: impl Into<PathBuf>) {
        let map = match kind {
            EntityKind::Class => &mut self.classes,
            EntityKind::Trigger => &mut self.triggers,
        };
        map.insert(name.into(), path.into());
    }

    #[must_use]
    pub fn get(&self, kind: EntityKind, name: &str) -> Option<&Path> {
        let map = match kind {
            EntityKind::Class => &self.classes,
            EntityKind::Trigger => &self.triggers,
        };
        map.get(name).map(PathBuf::as_path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len() + self.triggers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.triggers.is_empty()
    }

    /// Source file for a covered entity.
    ///
    /// Tries the namespace-qualified name first, then the bare name.
    ///
    /// # Errors
    ///
    /// Returns `SourceNotFound` if no mapping exists or the file is gone.
    pub fn resolve(&self, coverage: &CoverageResult) -> Result<&Path> {
        let kind = coverage.kind();
        self.get(kind, coverage.name())
            .or_else(|| self.get(kind, coverage.base_name()))
            .filter(|path| path.is_file())
            .ok_or_else(|| ReportError::SourceNotFound {
                name: coverage.name().to_string(),
            })
    }
}

fn scan_dir(dir: &Path, extension: &str) -> Result<BTreeMap<String, PathBuf>> {
    let mut found = BTreeMap::new();
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "Source directory missing, skipping");
        return Ok(found);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            found.insert(stem.to_string(), path.clone());
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "public class X {}\n").unwrap();
    }

    #[test]
    fn test_discover() {
        let temp = TempDir::new().expect("temp dir");
        write(&temp.path().join("classes/Invoice.cls"));
        write(&temp.path().join("classes/Invoice.cls-meta.xml"));
        write(&temp.path().join("triggers/AccountTrigger.trigger"));

        let index = SourceIndex::discover(temp.path()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.get(EntityKind::Class, "Invoice").is_some());
        assert!(index.get(EntityKind::Trigger, "AccountTrigger").is_some());
        assert!(index.get(EntityKind::Class, "AccountTrigger").is_none());
    }

    #[test]
    fn test_missing_dirs_are_empty() {
        let temp = TempDir::new().expect("temp dir");
        let index = SourceIndex::discover(temp.path()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_resolve_falls_back_to_bare_name() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("classes/Invoice.cls");
        write(&path);
        let index = SourceIndex::discover(temp.path()).unwrap();

        let ccr = CoverageResult::new("acme__Invoice", "Invoice", EntityKind::Class);
        assert_eq!(index.resolve(&ccr).unwrap(), path.as_path());
    }

    #[test]
    fn test_resolve_missing_source() {
        let index = SourceIndex::default();
        let ccr = CoverageResult::new("Invoice", "Invoice", EntityKind::Class);
        assert!(matches!(
            index.resolve(&ccr),
            Err(ReportError::SourceNotFound { name }) if name == "Invoice"
        ));
    }

    #[test]
    fn test_resolve_deleted_file() {
        let mut index = SourceIndex::default();
        index.insert(EntityKind::Trigger, "Gone", "/nonexistent/Gone.trigger");
        let ccr = CoverageResult::new("Gone", "Gone", EntityKind::Trigger);
        assert!(index.resolve(&ccr).is_err());
    }
}
