//! Core data models for add-on packaging

pub mod features;
pub mod metadata;

pub use features::*;
pub use metadata::*;
