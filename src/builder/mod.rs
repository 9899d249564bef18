//! Builders for the package files composed from several templates

pub mod install_rdf;
pub mod manifest;
pub mod overlay;

pub use install_rdf::{build_install_rdf, INSTALL_RDF_PATH};
pub use manifest::{build_manifest, MANIFEST_PATH};
pub use overlay::{build_overlay, OVERLAY_PATH};
