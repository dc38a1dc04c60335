use std::fs;
use std::path::Path;

use tracing::info;

use crate::models::Question;

use super::catalog::{Catalog, CatalogError};

const BUILTIN_QUESTIONS: &str = include_str!("../../data/questions.json");

/// The ten-question catalog shipped with the server.
pub fn builtin_catalog() -> Result<Catalog, CatalogError> {
    parse_catalog(BUILTIN_QUESTIONS, "builtin catalog")
}

/// Load and validate a catalog from a JSON file.
pub fn load_catalog_from_json<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let origin = path.display().to_string();

    let json_content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: origin.clone(),
        source,
    })?;

    let catalog = parse_catalog(&json_content, &origin)?;
    info!(path = %origin, questions = catalog.len(), "loaded question catalog");
    Ok(catalog)
}

fn parse_catalog(json_content: &str, origin: &str) -> Result<Catalog, CatalogError> {
    let questions: Vec<Question> =
        serde_json::from_str(json_content).map_err(|source| CatalogError::Parse {
            path: origin.to_string(),
            source,
        })?;

    Catalog::new(questions)
}
