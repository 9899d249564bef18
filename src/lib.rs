//! Mozilla Add-on Packager
//!
//! Builds installable XPI packages for legacy XUL add-ons from a handful of
//! metadata fields and a set of optional features. Every file in the package
//! comes from a stock template: user text is escaped once, placeholders are
//! substituted, and optional fragments are composed into install.rdf,
//! chrome.manifest and the browser overlay.

pub mod builder;
pub mod error;
pub mod models;
pub mod packager;
pub mod sanitizer;
pub mod template;
pub mod utils;
pub mod validator;

pub use error::{PackagerError, Result};
pub use models::{Feature, FeatureSet, MetadataInput, MetadataRecord, TargetApplication, FIREFOX_GUID};
pub use packager::{Packager, PackagerOptions, RenderedFile};
pub use sanitizer::{sanitize, Sanitize};
pub use utils::slugify;

use std::path::{Path, PathBuf};

/// Package an add-on with the stock templates and default options.
///
/// Returns the path of the written package.
pub fn package_addon(
    metadata: &MetadataRecord,
    output_path: &Path,
    features: &FeatureSet,
) -> Result<PathBuf> {
    Packager::default().package(metadata, output_path, features)
}
