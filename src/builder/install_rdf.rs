//! install.rdf, the add-on's install descriptor

use crate::error::Result;
use crate::models::{Feature, FeatureSet, SanitizedMetadata};
use crate::template::{Substitutions, TemplateRenderer};

pub const INSTALL_RDF_PATH: &str = "install.rdf";

const DESCRIPTION: &str = "fragments/install/description.rdf";
const CONTRIBUTOR: &str = "fragments/install/contributor.rdf";
const TARGET_APPLICATION: &str = "fragments/install/target-application.rdf";
const OPTIONS_URL: &str = "fragments/install/options-url.rdf";
const ABOUT_URL: &str = "fragments/install/about-url.rdf";

/// Indentation of entries inside `<Description>`
const ENTRY_INDENT: &str = "\n    ";

/// Build install.rdf from already sanitized metadata.
///
/// Optional entries follow the identity fields in a fixed order:
/// description, contributors, target applications, options URL, about URL.
/// Contributors and target applications keep their input order and are
/// never deduplicated.
pub fn build_install_rdf(
    renderer: &TemplateRenderer,
    metadata: &SanitizedMetadata,
    features: &FeatureSet,
) -> Result<String> {
    let mut entries = Vec::new();

    if let Some(description) = metadata.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let subs = Substitutions::new().with("description", description);
        entries.push(renderer.render(DESCRIPTION, Some(&subs))?);
    }

    for contributor in metadata.contributors.iter().filter(|c| !c.trim().is_empty()) {
        let subs = Substitutions::new().with("contributor", contributor.trim());
        entries.push(renderer.render(CONTRIBUTOR, Some(&subs))?);
    }

    for app in &metadata.target_applications {
        let subs = Substitutions::new()
            .with("guid", &app.guid)
            .with("min_version", &app.min_version)
            .with("max_version", &app.max_version);
        entries.push(renderer.render(TARGET_APPLICATION, Some(&subs))?);
    }

    let names = metadata.package_names();
    if features.contains(Feature::PreferencesDialog) {
        entries.push(renderer.render(OPTIONS_URL, Some(&names))?);
    }
    if features.contains(Feature::AboutDialog) {
        entries.push(renderer.render(ABOUT_URL, Some(&names))?);
    }

    let entries: String = entries
        .iter()
        .map(|entry| format!("{}{}", ENTRY_INDENT, entry))
        .collect();

    let subs = metadata.substitutions().with("entries", entries);
    renderer.render(INSTALL_RDF_PATH, Some(&subs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetadataInput, MetadataRecord, TargetApplication, FIREFOX_GUID};
    use crate::utils::SlugOptions;

    fn record(input: MetadataInput) -> SanitizedMetadata {
        MetadataRecord::from_input(input, &SlugOptions::default())
            .unwrap()
            .sanitized()
    }

    fn minimal() -> MetadataInput {
        MetadataInput {
            id: "a@b.c".into(),
            version: "1.0".into(),
            name: "Bare".into(),
            author_name: "me".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_targets_and_contributors() {
        let renderer = TemplateRenderer::default();
        let rdf = build_install_rdf(&renderer, &record(minimal()), &FeatureSet::new()).unwrap();

        assert!(rdf.contains("<em:id>a@b.c</em:id>"));
        assert!(!rdf.contains("em:targetApplication"));
        assert!(!rdf.contains("em:contributor"));
        assert!(!rdf.contains("em:description"));
        assert!(!rdf.contains("em:optionsURL"));
        assert!(!rdf.contains("em:aboutURL"));
        assert!(rdf.contains("<em:creator>me</em:creator>\n  </Description>"));
    }

    #[test]
    fn test_optional_sections_in_order() {
        let renderer = TemplateRenderer::default();
        let mut input = minimal();
        input.description = Some("Does things".into());
        input.contributors = vec!["first".into(), " ".into(), "second".into()];
        input.target_applications = vec![
            TargetApplication::new(FIREFOX_GUID, "3.0", "8.*"),
            TargetApplication::new(FIREFOX_GUID, "4.0", "5.*"),
        ];
        let features = FeatureSet::from([Feature::AboutDialog, Feature::PreferencesDialog]);

        let rdf = build_install_rdf(&renderer, &record(input), &features).unwrap();

        let position = |needle: &str| rdf.find(needle).unwrap_or_else(|| panic!("{needle} missing"));
        assert!(position("<em:description>Does things") < position("<em:contributor>first"));
        assert!(position("<em:contributor>first") < position("<em:contributor>second"));
        assert!(position("<em:contributor>second") < position("<em:minVersion>3.0"));
        assert!(position("<em:minVersion>3.0") < position("<em:minVersion>4.0"));
        assert!(position("<em:minVersion>4.0") < position("<em:optionsURL>"));
        assert!(position("<em:optionsURL>") < position("<em:aboutURL>"));

        assert_eq!(rdf.matches("<em:contributor>").count(), 2);
        assert_eq!(rdf.matches("<em:targetApplication>").count(), 2);
        assert!(rdf.contains("<em:optionsURL>chrome://bare/content/options.xul</em:optionsURL>"));
        assert!(rdf.contains("<em:aboutURL>chrome://bare/content/about.xul</em:aboutURL>"));
    }

    #[test]
    fn test_values_are_escaped_once() {
        let renderer = TemplateRenderer::default();
        let mut input = minimal();
        input.name = "Wamp Wamp<script>".into();
        input.contributors = vec!["mr. bean <mr@bean.com>".into()];
        let metadata = record(input);

        let rdf = build_install_rdf(&renderer, &metadata, &FeatureSet::new()).unwrap();
        assert!(rdf.contains("<em:name>Wamp Wamp&lt;script&gt;</em:name>"));
        assert!(rdf.contains("<em:contributor>mr. bean &lt;mr@bean.com&gt;</em:contributor>"));

        // Sanitizing the already sanitized record changes nothing.
        let again = metadata.sanitized();
        assert_eq!(build_install_rdf(&renderer, &again, &FeatureSet::new()).unwrap(), rdf);
    }
}
