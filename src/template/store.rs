//! Sources of template bytes, addressed by logical path

use crate::error::{PackagerError, Result};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Read-only storage of templates keyed by logical relative path
/// (`chrome/content/about.xul`).
pub trait TemplateStore: Send + Sync {
    /// Fetch the bytes stored under `logical_path`.
    fn read(&self, logical_path: &str) -> Result<Cow<'_, [u8]>>;

    /// A file on disk holding the template, when the store is file-backed.
    fn source_path(&self, _logical_path: &str) -> Option<PathBuf> {
        None
    }

    /// Every logical path this store can serve, sorted
    fn logical_paths(&self) -> Vec<String>;
}

macro_rules! embedded {
    ($($path:literal),* $(,)?) => {
        &[$(($path, include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/", $path)) as &[u8])),*]
    };
}

static EMBEDDED: &[(&str, &[u8])] = embedded![
    "install.rdf",
    "chrome.manifest",
    "defaults/preferences/prefs.js",
    "chrome/content/overlay.js",
    "chrome/content/about.xul",
    "chrome/content/options.xul",
    "chrome/content/ff-overlay.xul",
    "chrome/content/ff-overlay.js",
    "chrome/content/ff-sidebar.xul",
    "chrome/content/ff-sidebar.js",
    "chrome/skin/overlay.css",
    "chrome/skin/toolbar-button.png",
    "chrome/locale/en-US/overlay.dtd",
    "chrome/locale/en-US/overlay.properties",
    "chrome/locale/en-US/about.dtd",
    "chrome/locale/en-US/options.dtd",
    "fragments/install/description.rdf",
    "fragments/install/contributor.rdf",
    "fragments/install/target-application.rdf",
    "fragments/install/options-url.rdf",
    "fragments/install/about-url.rdf",
    "fragments/manifest/overlay.manifest",
    "fragments/manifest/style.manifest",
    "fragments/overlay/toolbar-button.xul",
    "fragments/overlay/context-menu.xul",
    "fragments/overlay/main-menu.xul",
    "fragments/overlay/sidebar.xul",
    "fragments/overlay/toolbar.xul",
];

/// The stock templates, compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplates;

impl TemplateStore for EmbeddedTemplates {
    fn read(&self, logical_path: &str) -> Result<Cow<'_, [u8]>> {
        EMBEDDED
            .iter()
            .find(|(path, _)| *path == logical_path)
            .map(|(_, bytes)| Cow::Borrowed(*bytes))
            .ok_or_else(|| PackagerError::TemplateNotFound(logical_path.to_string()))
    }

    fn logical_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = EMBEDDED.iter().map(|(path, _)| path.to_string()).collect();
        paths.sort();
        paths
    }
}

/// Templates read from a directory laid out like `resources/`.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a logical path below the root. Absolute paths and `..` are
    /// refused so a template name can never reach outside the directory.
    fn resolve(&self, logical_path: &str) -> Option<PathBuf> {
        let relative = Path::new(logical_path);
        let contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        contained.then(|| self.root.join(relative))
    }
}

impl TemplateStore for DirectoryTemplates {
    fn read(&self, logical_path: &str) -> Result<Cow<'_, [u8]>> {
        let path = self
            .resolve(logical_path)
            .ok_or_else(|| PackagerError::TemplateNotFound(logical_path.to_string()))?;

        match fs::read(&path) {
            Ok(bytes) => Ok(Cow::Owned(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(PackagerError::TemplateNotFound(logical_path.to_string()))
            }
            Err(err) => Err(PackagerError::io(path, err)),
        }
    }

    fn source_path(&self, logical_path: &str) -> Option<PathBuf> {
        self.resolve(logical_path).filter(|path| path.is_file())
    }

    fn logical_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&self.root).ok()?;
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                Some(parts.join("/"))
            })
            .collect();
        paths.sort();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_store_serves_known_paths() {
        let store = EmbeddedTemplates;
        for path in store.logical_paths() {
            assert!(!store.read(&path).unwrap().is_empty(), "{} is empty", path);
        }
        assert!(store.source_path("install.rdf").is_none());
    }

    #[test]
    fn test_embedded_store_unknown_path() {
        let err = EmbeddedTemplates.read("chrome/content/nope.xul").unwrap_err();
        assert!(matches!(err, PackagerError::TemplateNotFound(path) if path == "chrome/content/nope.xul"));
    }

    #[test]
    fn test_directory_store() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("chrome/content")).unwrap();
        fs::write(temp_dir.path().join("test.txt"), "{foo}").unwrap();
        fs::write(temp_dir.path().join("chrome/content/a.xul"), "<a/>").unwrap();

        let store = DirectoryTemplates::new(temp_dir.path());
        assert_eq!(store.read("test.txt").unwrap().as_ref(), b"{foo}");
        assert_eq!(store.logical_paths(), vec!["chrome/content/a.xul", "test.txt"]);
        assert_eq!(
            store.source_path("chrome/content/a.xul"),
            Some(temp_dir.path().join("chrome/content/a.xul"))
        );
        assert!(store.source_path("missing.txt").is_none());
    }

    #[test]
    fn test_directory_store_missing_and_escaping_paths() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirectoryTemplates::new(temp_dir.path());

        assert!(matches!(
            store.read("missing.txt").unwrap_err(),
            PackagerError::TemplateNotFound(_)
        ));
        assert!(matches!(
            store.read("../etc/passwd").unwrap_err(),
            PackagerError::TemplateNotFound(_)
        ));
    }
}
