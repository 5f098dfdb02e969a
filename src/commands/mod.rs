use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::model::Catalog;
use crate::util::read_json;

pub mod build;
pub mod load;
pub mod merge;
pub mod parse;
pub mod render;
pub mod repair;
pub mod status;

pub(crate) fn load_catalog(path: &Path) -> Result<Catalog> {
    let catalog: Catalog = read_json(path)?;
    catalog
        .validate()
        .with_context(|| format!("invalid catalog {}", path.display()))?;

    info!(
        path = %path.display(),
        sources = catalog.sources.len(),
        "loaded source catalog"
    );
    Ok(catalog)
}
