pub mod generate;
pub mod graph;
pub mod preview;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use synthseed_core::schema::{self, RawSchema, ValidatedSchema};

/// Load and validate a schema document, printing any non-fatal warnings.
pub fn load_validated(path: &Path) -> Result<(RawSchema, ValidatedSchema)> {
    let raw = schema::load_schema(path)?;
    let validated = schema::validate(&raw).map_err(synthseed_core::SynthSeedError::from)?;
    for warning in &validated.warnings {
        tracing::warn!("{}", warning);
    }
    Ok((raw, validated))
}
