//! ff-overlay.xul, the browser window overlay

use crate::error::Result;
use crate::models::{Feature, FeatureSet, SanitizedMetadata};
use crate::template::TemplateRenderer;

pub const OVERLAY_PATH: &str = "chrome/content/ff-overlay.xul";

/// Overlay fragments in the order they are emitted.
const FRAGMENTS: [(Feature, &str); 5] = [
    (Feature::ToolbarButton, "fragments/overlay/toolbar-button.xul"),
    (Feature::ContextMenuCommand, "fragments/overlay/context-menu.xul"),
    (Feature::MainMenuCommand, "fragments/overlay/main-menu.xul"),
    (Feature::SidebarSupport, "fragments/overlay/sidebar.xul"),
    (Feature::Toolbar, "fragments/overlay/toolbar.xul"),
];

const ITEM_SEPARATOR: &str = "\n\n  ";

/// Build the browser overlay from the fragments of the selected features.
///
/// Fragments attach to element ids of the Firefox browser window, so they are
/// only emitted when Firefox is targeted. With no fragments the wrapper is
/// still produced, just without extra items.
pub fn build_overlay(
    renderer: &TemplateRenderer,
    metadata: &SanitizedMetadata,
    features: &FeatureSet,
    is_firefox: bool,
) -> Result<String> {
    let names = metadata.package_names();

    let mut items = String::new();
    if is_firefox {
        for (feature, fragment) in FRAGMENTS {
            if features.contains(feature) {
                items.push_str(ITEM_SEPARATOR);
                items.push_str(&renderer.render(fragment, Some(&names))?);
            }
        }
    }

    let subs = names.with("items", items);
    renderer.render(OVERLAY_PATH, Some(&subs))
}
