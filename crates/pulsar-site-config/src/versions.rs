//! Documentation versions.
//!
//! Released versions come from `versions.json`, a JSON array of labels. The
//! in-development docs are always available as `current`, labelled "Next".
//! An optional `.build-versions.json` narrows which versions a build emits.

use std::io;
use std::path::Path;

use serde::Serialize;

use crate::{ConfigError, DocsConfig};

/// Key of the in-development docs version.
pub const CURRENT_VERSION: &str = "current";

const CURRENT_LABEL: &str = "Next";
const CURRENT_PATH: &str = "next";

/// One entry of the docs version map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    /// Version key (a released label or `current`).
    pub key: String,
    /// Label shown in the version dropdown.
    pub label: String,
    /// URL path segment of the version's docs.
    pub path: String,
}

/// Released and build-selected documentation versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsVersions {
    released: Vec<String>,
    build: Vec<String>,
}

impl DocsVersions {
    /// Build from a released list and an optional build selection.
    ///
    /// Without a build selection only `current` is built.
    #[must_use]
    pub fn new(released: Vec<String>, build: Option<Vec<String>>) -> Self {
        Self {
            released,
            build: build.unwrap_or_else(|| vec![CURRENT_VERSION.to_owned()]),
        }
    }

    /// Load the versions files named in the docs configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the versions file is missing, and
    /// I/O or JSON errors if it is unreadable or malformed. Any problem with
    /// the build versions file falls back to building `current` only.
    pub fn load(docs: &DocsConfig) -> Result<Self, ConfigError> {
        let released = read_json_list(&docs.versions_file)?
            .ok_or_else(|| ConfigError::NotFound(docs.versions_file.clone()))?;

        let build = match read_json_list(&docs.build_versions_file) {
            Ok(Some(build)) => Some(build),
            Ok(None) => {
                tracing::debug!(
                    path = %docs.build_versions_file.display(),
                    "No build versions file, building current docs only"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    path = %docs.build_versions_file.display(),
                    error = %e,
                    "Ignoring unusable build versions file, building current docs only"
                );
                None
            }
        };

        Ok(Self::new(released, build))
    }

    /// Released version labels, newest first as listed in the file.
    #[must_use]
    pub fn released(&self) -> &[String] {
        &self.released
    }

    /// Version keys included in the build.
    #[must_use]
    pub fn build_versions(&self) -> &[String] {
        &self.build
    }

    /// Version map: every released version, then `current`.
    ///
    /// A label listed twice yields one entry, at its first position.
    #[must_use]
    pub fn entries(&self) -> Vec<VersionEntry> {
        let mut entries: Vec<VersionEntry> = Vec::with_capacity(self.released.len() + 1);
        for label in &self.released {
            if label == CURRENT_VERSION || entries.iter().any(|e| &e.key == label) {
                continue;
            }
            entries.push(VersionEntry {
                key: label.clone(),
                label: label.clone(),
                path: label.clone(),
            });
        }
        entries.push(current_entry());
        entries
    }

    /// Whether the build includes `key`.
    #[must_use]
    pub fn is_built(&self, key: &str) -> bool {
        self.build.iter().any(|v| v == key)
    }
}

fn current_entry() -> VersionEntry {
    VersionEntry {
        key: CURRENT_VERSION.to_owned(),
        label: CURRENT_LABEL.to_owned(),
        path: CURRENT_PATH.to_owned(),
    }
}

/// Read a JSON array of strings; `None` if the file doesn't exist.
fn read_json_list(path: &Path) -> Result<Option<Vec<String>>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn docs_config(dir: &Path) -> DocsConfig {
        DocsConfig {
            source_dir: dir.join("docs"),
            versions_file: dir.join("versions.json"),
            build_versions_file: dir.join(".build-versions.json"),
        }
    }

    #[test]
    fn test_entries_end_with_current() {
        let versions = DocsVersions::new(vec!["3.0.x".to_owned(), "2.11.x".to_owned()], None);
        let entries = versions.entries();

        assert_eq!(
            entries,
            vec![
                VersionEntry {
                    key: "3.0.x".to_owned(),
                    label: "3.0.x".to_owned(),
                    path: "3.0.x".to_owned(),
                },
                VersionEntry {
                    key: "2.11.x".to_owned(),
                    label: "2.11.x".to_owned(),
                    path: "2.11.x".to_owned(),
                },
                VersionEntry {
                    key: "current".to_owned(),
                    label: "Next".to_owned(),
                    path: "next".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_current_overrides_released_label() {
        let versions = DocsVersions::new(vec!["current".to_owned()], None);
        let entries = versions.entries();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "Next");
    }

    #[test]
    fn test_default_build_is_current_only() {
        let versions = DocsVersions::new(vec!["3.0.x".to_owned()], None);
        assert_eq!(versions.build_versions(), ["current".to_owned()]);
        assert!(versions.is_built("current"));
        assert!(!versions.is_built("3.0.x"));
    }

    #[test]
    fn test_duplicate_released_labels_collapse() {
        let versions = DocsVersions::new(
            vec!["3.0.x".to_owned(), "2.11.x".to_owned(), "3.0.x".to_owned()],
            None,
        );
        let keys: Vec<_> = versions.entries().into_iter().map(|e| e.key).collect();

        assert_eq!(keys, vec!["3.0.x", "2.11.x", "current"]);
    }

    #[test]
    fn test_load_with_build_versions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("versions.json"), r#"["3.1.x", "3.0.x"]"#).unwrap();
        std::fs::write(
            dir.path().join(".build-versions.json"),
            r#"["current", "3.1.x"]"#,
        )
        .unwrap();

        let versions = DocsVersions::load(&docs_config(dir.path())).unwrap();

        assert_eq!(versions.released(), ["3.1.x".to_owned(), "3.0.x".to_owned()]);
        assert!(versions.is_built("3.1.x"));
        assert!(!versions.is_built("3.0.x"));
    }

    #[test]
    fn test_load_without_build_versions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("versions.json"), "[]").unwrap();

        let versions = DocsVersions::load(&docs_config(dir.path())).unwrap();

        assert!(versions.released().is_empty());
        assert_eq!(versions.build_versions(), ["current".to_owned()]);
    }

    #[test]
    fn test_load_malformed_build_versions_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("versions.json"), r#"["3.0.x"]"#).unwrap();
        std::fs::write(dir.path().join(".build-versions.json"), "{").unwrap();

        let versions = DocsVersions::load(&docs_config(dir.path())).unwrap();

        assert_eq!(versions.build_versions(), ["current".to_owned()]);
        assert_eq!(versions.released(), ["3.0.x".to_owned()]);
    }

    #[test]
    fn test_load_unreadable_build_versions_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("versions.json"), "[]").unwrap();
        // A directory can't be read as a file.
        std::fs::create_dir(dir.path().join(".build-versions.json")).unwrap();

        let versions = DocsVersions::load(&docs_config(dir.path())).unwrap();

        assert_eq!(versions.build_versions(), ["current".to_owned()]);
    }

    #[test]
    fn test_load_missing_versions_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocsVersions::load(&docs_config(dir.path())).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(ref p) if p == &dir.path().join("versions.json")));
    }

    #[test]
    fn test_load_malformed_versions_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("versions.json"), r#"{"not": "a list"}"#).unwrap();

        let err = DocsVersions::load(&docs_config(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_read_json_list_missing_is_none() {
        let result = read_json_list(&PathBuf::from("/nonexistent/versions.json")).unwrap();
        assert!(result.is_none());
    }
}
