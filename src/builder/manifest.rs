//! chrome.manifest composition

use crate::error::Result;
use crate::models::{Feature, FeatureSet, SanitizedMetadata};
use crate::template::TemplateRenderer;

pub const MANIFEST_PATH: &str = "chrome.manifest";

const OVERLAY_LINE: &str = "fragments/manifest/overlay.manifest";
const STYLE_LINE: &str = "fragments/manifest/style.manifest";

/// Build the chrome registration manifest.
///
/// Lines always come out in the same order: the base registrations, then
/// the browser overlay (Firefox targets only), then the toolbar style sheet
/// (`toolbar_button` only).
pub fn build_manifest(
    renderer: &TemplateRenderer,
    metadata: &SanitizedMetadata,
    features: &FeatureSet,
    is_firefox: bool,
) -> Result<String> {
    let names = metadata.package_names();

    let mut lines = vec![renderer.render(MANIFEST_PATH, Some(&names))?];

    if is_firefox {
        lines.push(renderer.render(OVERLAY_LINE, Some(&names))?);
    }

    if features.contains(Feature::ToolbarButton) {
        lines.push(renderer.render(STYLE_LINE, Some(&names))?);
    }

    Ok(lines.join("\n"))
}
