//! Structural validation of add-on metadata

use crate::error::{PackagerError, Result};
use crate::models::{MetadataInput, MetadataRecord};
use crate::utils::is_valid_slug;

/// Check the identity fields every package needs.
pub fn validate_input(input: &MetadataInput) -> Result<()> {
    require("id", &input.id)?;
    require("version", &input.version)?;
    require("name", &input.name)?;
    require("author_name", &input.author_name)?;
    Ok(())
}

/// Re-check a record right before packaging, including the slug invariant.
pub fn validate_record(record: &MetadataRecord) -> Result<()> {
    require("id", &record.id)?;
    require("version", &record.version)?;
    require("name", &record.name)?;
    require("author_name", &record.author_name)?;

    if !is_valid_slug(&record.slug) {
        return Err(PackagerError::invalid_metadata(
            "slug",
            format!("`{}` must be non-empty and only contain [a-z0-9_]", record.slug),
        ));
    }

    Ok(())
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PackagerError::invalid_metadata(field, "is required"));
    }
    Ok(())
}
