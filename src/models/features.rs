//! Optional add-on capabilities

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    AboutDialog,
    PreferencesDialog,
    ToolbarButton,
    ContextMenuCommand,
    MainMenuCommand,
    SidebarSupport,
    /// A standalone toolbar in the browser window
    Toolbar,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::AboutDialog,
        Feature::PreferencesDialog,
        Feature::ToolbarButton,
        Feature::ContextMenuCommand,
        Feature::MainMenuCommand,
        Feature::SidebarSupport,
        Feature::Toolbar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::AboutDialog => "about_dialog",
            Feature::PreferencesDialog => "preferences_dialog",
            Feature::ToolbarButton => "toolbar_button",
            Feature::ContextMenuCommand => "context_menu_command",
            Feature::MainMenuCommand => "main_menu_command",
            Feature::SidebarSupport => "sidebar_support",
            Feature::Toolbar => "toolbar",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| format!("unknown feature `{}`", s))
    }
}

/// The set of features selected for one package.
///
/// Iteration order is the declaration order of [`Feature`], never the order
/// tags were supplied in. Deserializes from a list of tags with the same
/// tolerance as [`FeatureSet::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureSet(BTreeSet<Feature>);

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw tags. Unrecognized tags are skipped.
    pub fn parse<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = Self::new();
        for tag in tags {
            match tag.trim().parse::<Feature>() {
                Ok(feature) => {
                    set.insert(feature);
                }
                Err(_) if tag.trim().is_empty() => {}
                Err(_) => debug!(tag, "ignoring unrecognized feature tag"),
            }
        }
        set
    }

    /// Parse a whitespace-delimited tag list such as `"about_dialog toolbar_button"`
    pub fn from_delimited(raw: &str) -> Self {
        Self::parse(raw.split_whitespace())
    }

    pub fn insert(&mut self, feature: Feature) -> bool {
        self.0.insert(feature)
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.0.contains(&feature)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.0.iter().copied()
    }
}

impl<'de> Deserialize<'de> for FeatureSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tags = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::parse(tags.iter().map(String::as_str)))
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Feature; N]> for FeatureSet {
    fn from(features: [Feature; N]) -> Self {
        features.into_iter().collect()
    }
}
