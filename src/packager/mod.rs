//! Package assembly
//!
//! [`Packager::plan`] decides which files a package contains and renders
//! them; [`Packager::package_into`] hands the result to an [`ArchiveWriter`].
//! The file set depends only on the feature set and the target
//! applications, never on the order features were given in:
//!
//! | Entries | Included when |
//! |---|---|
//! | `install.rdf`, `chrome.manifest`, base resources | always |
//! | `about.xul`, `about.dtd` | `about_dialog` |
//! | `options.xul`, `options.dtd` | `preferences_dialog` |
//! | `toolbar-button.png` | `toolbar_button` |
//! | `ff-sidebar.js`, `ff-sidebar.xul` | `sidebar_support` |
//! | `ff-overlay.xul`, `ff-overlay.js` | Firefox is a target application |

pub mod archive;

pub use archive::{ArchiveWriter, MemoryArchive, XpiWriter};

use crate::builder::{build_install_rdf, build_manifest, build_overlay};
use crate::builder::{INSTALL_RDF_PATH, MANIFEST_PATH, OVERLAY_PATH};
use crate::error::Result;
use crate::models::{Feature, FeatureSet, MetadataRecord};
use crate::template::{Substitutions, TemplateRenderer, TemplateStore};
use crate::utils::SlugOptions;
use crate::validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How a resource gets into the package
#[derive(Debug, Clone, Copy)]
enum Resource {
    /// Rendered against the sanitized metadata
    Render(&'static str),
    /// Copied byte for byte
    Copy(&'static str),
}

const BASE_RESOURCES: [Resource; 5] = [
    Resource::Render("defaults/preferences/prefs.js"),
    Resource::Render("chrome/content/overlay.js"),
    Resource::Render("chrome/skin/overlay.css"),
    Resource::Render("chrome/locale/en-US/overlay.dtd"),
    Resource::Render("chrome/locale/en-US/overlay.properties"),
];

const FEATURE_RESOURCES: [(Feature, &[Resource]); 4] = [
    (
        Feature::AboutDialog,
        &[
            Resource::Render("chrome/content/about.xul"),
            Resource::Copy("chrome/locale/en-US/about.dtd"),
        ],
    ),
    (
        Feature::PreferencesDialog,
        &[
            Resource::Render("chrome/content/options.xul"),
            Resource::Render("chrome/locale/en-US/options.dtd"),
        ],
    ),
    (
        Feature::ToolbarButton,
        &[Resource::Copy("chrome/skin/toolbar-button.png")],
    ),
    (
        Feature::SidebarSupport,
        &[
            Resource::Copy("chrome/content/ff-sidebar.js"),
            Resource::Render("chrome/content/ff-sidebar.xul"),
        ],
    ),
];

const OVERLAY_SCRIPT: Resource = Resource::Render("chrome/content/ff-overlay.js");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    /// Rendered text
    Text(String),
    /// Raw bytes copied from the template store under the same path
    Asset,
}

/// One entry of the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: String,
    pub content: EntryContent,
}

impl RenderedFile {
    fn text(path: &str, content: String) -> Self {
        Self {
            path: path.to_string(),
            content: EntryContent::Text(content),
        }
    }

    fn asset(path: &str) -> Self {
        Self {
            path: path.to_string(),
            content: EntryContent::Asset,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            EntryContent::Text(text) => Some(text),
            EntryContent::Asset => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackagerOptions {
    /// Deflate entries; stored uncompressed otherwise
    pub compress: bool,
    pub slug: SlugOptions,
}

impl Default for PackagerOptions {
    fn default() -> Self {
        Self {
            compress: true,
            slug: SlugOptions::default(),
        }
    }
}

/// Assembles add-on packages from one template store.
#[derive(Debug)]
pub struct Packager {
    renderer: TemplateRenderer,
    options: PackagerOptions,
}

impl Default for Packager {
    fn default() -> Self {
        Self::new(TemplateRenderer::default())
    }
}

impl Packager {
    pub fn new(renderer: TemplateRenderer) -> Self {
        Self {
            renderer,
            options: PackagerOptions::default(),
        }
    }

    pub fn with_store(store: impl TemplateStore + 'static) -> Self {
        Self::new(TemplateRenderer::new(store))
    }

    pub fn with_options(mut self, options: PackagerOptions) -> Self {
        self.options = options;
        self
    }

    /// Decide and render every entry of the package, in write order.
    ///
    /// Metadata is validated first and sanitized exactly once; every
    /// builder only ever sees the sanitized copy.
    pub fn plan(&self, metadata: &MetadataRecord, features: &FeatureSet) -> Result<Vec<RenderedFile>> {
        validator::validate_record(metadata)?;

        let is_firefox = metadata.targets_firefox();
        let metadata = metadata.sanitized();
        let subs = metadata.substitutions();
        let renderer = &self.renderer;

        let mut files = vec![
            RenderedFile::text(INSTALL_RDF_PATH, build_install_rdf(renderer, &metadata, features)?),
            RenderedFile::text(MANIFEST_PATH, build_manifest(renderer, &metadata, features, is_firefox)?),
        ];

        for resource in BASE_RESOURCES {
            files.push(self.resource(resource, &subs)?);
        }

        for (feature, resources) in FEATURE_RESOURCES {
            if features.contains(feature) {
                for resource in resources {
                    files.push(self.resource(*resource, &subs)?);
                }
            }
        }

        if is_firefox {
            files.push(RenderedFile::text(
                OVERLAY_PATH,
                build_overlay(renderer, &metadata, features, is_firefox)?,
            ));
            files.push(self.resource(OVERLAY_SCRIPT, &subs)?);
        }

        Ok(files)
    }

    /// Render the package and write every entry to `writer`.
    ///
    /// Nothing is written unless the whole package renders. The writer is
    /// left open; closing it is up to the caller.
    pub fn package_into<W>(
        &self,
        metadata: &MetadataRecord,
        features: &FeatureSet,
        writer: &mut W,
    ) -> Result<Vec<String>>
    where
        W: ArchiveWriter + ?Sized,
    {
        let files = self.plan(metadata, features)?;
        let store = self.renderer.store();

        for file in &files {
            match &file.content {
                EntryContent::Text(text) => writer.write(&file.path, text.as_bytes())?,
                EntryContent::Asset => match store.source_path(&file.path) {
                    Some(source) => writer.write_file(&file.path, &source)?,
                    None => writer.write(&file.path, &store.read(&file.path)?)?,
                },
            }
            debug!(path = %file.path, "wrote package entry");
        }

        Ok(files.into_iter().map(|file| file.path).collect())
    }

    /// Build an XPI at `output` and return its path.
    pub fn package(
        &self,
        metadata: &MetadataRecord,
        output: &Path,
        features: &FeatureSet,
    ) -> Result<PathBuf> {
        let mut writer = XpiWriter::new(output);
        if !self.options.compress {
            writer = writer.stored();
        }

        let entries = self.package_into(metadata, features, &mut writer)?;
        writer.close()?;

        info!(
            output = %output.display(),
            entries = entries.len(),
            slug = %metadata.slug,
            "package written"
        );
        Ok(output.to_path_buf())
    }

    fn resource(&self, resource: Resource, subs: &Substitutions) -> Result<RenderedFile> {
        match resource {
            Resource::Render(path) => Ok(RenderedFile::text(path, self.renderer.render(path, Some(subs))?)),
            Resource::Copy(path) => {
                // Fail at planning time rather than halfway through writing.
                self.renderer.store().read(path)?;
                Ok(RenderedFile::asset(path))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetadataInput, TargetApplication, FIREFOX_GUID};
    use crate::PackagerError;

    const THUNDERBIRD_GUID: &str = "{3550f703-e582-4d05-9a08-453d09bdfdc6}";

    fn metadata(guid: &str) -> MetadataRecord {
        MetadataRecord::from_input(
            MetadataInput {
                id: "slap@tickle.me".into(),
                version: "1.0".into(),
                name: "Wamp Wamp".into(),
                author_name: "me".into(),
                target_applications: vec![TargetApplication::new(guid, "3.0", "8.*")],
                ..Default::default()
            },
            &SlugOptions::default(),
        )
        .unwrap()
    }

    fn paths(files: &[RenderedFile]) -> Vec<&str> {
        files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_base_file_set() {
        let packager = Packager::default();
        let files = packager.plan(&metadata(THUNDERBIRD_GUID), &FeatureSet::new()).unwrap();
        assert_eq!(
            paths(&files),
            vec![
                "install.rdf",
                "chrome.manifest",
                "defaults/preferences/prefs.js",
                "chrome/content/overlay.js",
                "chrome/skin/overlay.css",
                "chrome/locale/en-US/overlay.dtd",
                "chrome/locale/en-US/overlay.properties",
            ]
        );
    }

    #[test]
    fn test_about_dialog_only() {
        let packager = Packager::default();
        let features = FeatureSet::from([Feature::AboutDialog]);
        let files = packager.plan(&metadata(THUNDERBIRD_GUID), &features).unwrap();
        let paths = paths(&files);

        assert!(paths.contains(&"chrome/content/about.xul"));
        assert!(paths.contains(&"chrome/locale/en-US/about.dtd"));
        for excluded in [
            "chrome/content/options.xul",
            "chrome/locale/en-US/options.dtd",
            "chrome/skin/toolbar-button.png",
            "chrome/content/ff-sidebar.js",
            "chrome/content/ff-sidebar.xul",
            "chrome/content/ff-overlay.xul",
            "chrome/content/ff-overlay.js",
        ] {
            assert!(!paths.contains(&excluded), "{} should be excluded", excluded);
        }
    }

    #[test]
    fn test_firefox_adds_overlay_pair() {
        let packager = Packager::default();
        let files = packager.plan(&metadata(FIREFOX_GUID), &FeatureSet::new()).unwrap();
        let paths = paths(&files);
        assert_eq!(
            &paths[paths.len() - 2..],
            &["chrome/content/ff-overlay.xul", "chrome/content/ff-overlay.js"]
        );
    }

    #[test]
    fn test_binary_and_copied_resources_are_assets() {
        let packager = Packager::default();
        let features = FeatureSet::from([Feature::ToolbarButton, Feature::SidebarSupport, Feature::AboutDialog]);
        let files = packager.plan(&metadata(THUNDERBIRD_GUID), &features).unwrap();

        let assets: Vec<&str> = files
            .iter()
            .filter(|f| f.content == EntryContent::Asset)
            .map(|f| f.path.as_str())
            .collect();
        assert_eq!(
            assets,
            vec![
                "chrome/locale/en-US/about.dtd",
                "chrome/skin/toolbar-button.png",
                "chrome/content/ff-sidebar.js",
            ]
        );
    }

    #[test]
    fn test_invalid_record_writes_nothing() {
        let packager = Packager::default();
        let mut record = metadata(FIREFOX_GUID);
        record.id.clear();

        let mut archive = MemoryArchive::new();
        let err = packager
            .package_into(&record, &FeatureSet::new(), &mut archive)
            .unwrap_err();
        assert!(matches!(err, PackagerError::InvalidMetadata { .. }));
        assert!(archive.entries().is_empty());
    }

    #[test]
    fn test_package_into_memory() {
        let packager = Packager::default();
        let features = FeatureSet::from([Feature::ToolbarButton]);
        let mut archive = MemoryArchive::new();

        let written = packager
            .package_into(&metadata(FIREFOX_GUID), &features, &mut archive)
            .unwrap();

        assert_eq!(written, archive.paths());
        let png = archive.get("chrome/skin/toolbar-button.png").unwrap();
        assert!(png.starts_with(b"\x89PNG"));
        let js = archive.get_text("chrome/content/overlay.js").unwrap();
        assert!(js.starts_with("var wamp_wamp = {"));
    }
}
