//! Add-on identity and compatibility metadata

use crate::error::{PackagerError, Result};
use crate::sanitizer::Sanitize;
use crate::template::Substitutions;
use crate::utils::{identifier, slugify, SlugOptions};
use crate::validator;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::str::FromStr;

/// Application GUID identifying the Firefox browser
pub const FIREFOX_GUID: &str = "{ec8030f7-c20a-464f-9b0e-13a3a9e97384}";

/// A host application the add-on declares compatibility with.
///
/// All three fields are opaque: versions are never parsed or compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetApplication {
    pub guid: String,
    pub min_version: String,
    pub max_version: String,
}

impl TargetApplication {
    pub fn new(
        guid: impl Into<String>,
        min_version: impl Into<String>,
        max_version: impl Into<String>,
    ) -> Self {
        Self {
            guid: guid.into(),
            min_version: min_version.into(),
            max_version: max_version.into(),
        }
    }

    pub fn is_firefox(&self) -> bool {
        self.guid == FIREFOX_GUID
    }
}

impl FromStr for TargetApplication {
    type Err = PackagerError;

    /// Parse a `guid,min_version,max_version` triple
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [guid, min_version, max_version] => Ok(Self::new(*guid, *min_version, *max_version)),
            _ => Err(PackagerError::invalid_metadata(
                "targetapps",
                format!("expected `guid,min,max`, got `{}`", s),
            )),
        }
    }
}

/// Parse a semicolon-delimited list of `guid,min,max` triples
pub fn parse_target_applications(raw: &str) -> Result<Vec<TargetApplication>> {
    raw.split(';')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| entry.parse::<TargetApplication>())
        .collect()
}

/// Parse a comma-delimited list of contributor names, dropping blanks
pub fn parse_contributors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Metadata exactly as the caller supplied it.
///
/// Deserializable so that it can be read from a JSON file; every field
/// defaults to empty so that command-line flags can fill the gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataInput {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: Option<String>,
    pub author_name: String,
    pub contributors: Vec<String>,
    pub target_applications: Vec<TargetApplication>,
    /// Overrides the name as the source of the package slug
    pub package_name: Option<String>,
}

impl MetadataInput {
    /// Parse metadata from a JSON document; absent fields stay empty.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Validated metadata for one packaging run.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: Option<String>,
    pub author_name: String,
    pub contributors: Vec<String>,
    pub target_applications: Vec<TargetApplication>,
    /// Token unique to this package
    pub uuid: String,
    /// Chrome package name, `[a-z0-9_]+`
    pub slug: String,
}

impl MetadataRecord {
    /// Validate caller input, derive the slug and assign a fresh uuid.
    pub fn from_input(input: MetadataInput, slug_options: &SlugOptions) -> Result<Self> {
        validator::validate_input(&input)?;

        let slug = slugify(&input.name, input.package_name.as_deref(), slug_options);
        let description = input
            .description
            .filter(|description| !description.trim().is_empty());

        Ok(Self {
            id: input.id,
            version: input.version,
            name: input.name,
            description,
            author_name: input.author_name,
            contributors: input
                .contributors
                .into_iter()
                .filter(|name| !name.trim().is_empty())
                .collect(),
            target_applications: input.target_applications,
            uuid: uuid::Uuid::new_v4().simple().to_string(),
            slug,
        })
    }

    /// Whether Firefox is among the target applications
    pub fn targets_firefox(&self) -> bool {
        self.target_applications.iter().any(TargetApplication::is_firefox)
    }

    pub fn sanitized(&self) -> SanitizedMetadata {
        SanitizedMetadata(self.sanitize())
    }
}

/// Metadata whose free-text fields have been escaped for markup.
///
/// Only obtainable through [`MetadataRecord::sanitized`], so anything that
/// takes a `&SanitizedMetadata` cannot be handed raw user text.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedMetadata(MetadataRecord);

impl SanitizedMetadata {
    /// Placeholder values shared by every rendered resource
    pub fn substitutions(&self) -> Substitutions {
        let record = &self.0;
        self.package_names()
            .with("id", &record.id)
            .with("version", &record.version)
            .with("name", &record.name)
            .with("description", record.description.as_deref().unwrap_or_default())
            .with("author_name", &record.author_name)
            .with("contributors", record.contributors.join(", "))
            .with("uuid", &record.uuid)
    }

    /// `slug` for chrome URLs and element ids, `ident` where the name must
    /// be a script identifier or an XML entity name
    pub fn package_names(&self) -> Substitutions {
        Substitutions::new()
            .with("slug", &self.0.slug)
            .with("ident", identifier(&self.0.slug))
    }
}

impl Deref for SanitizedMetadata {
    type Target = MetadataRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
