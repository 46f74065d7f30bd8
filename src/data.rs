// src/data.rs

use crate::catalog::{Catalog, CatalogError};

/// Carga el catálogo de capítulos y niveles desde el YAML embebido
pub fn read_catalog_embedded() -> Result<Catalog, CatalogError> {
    let file_content = include_str!("data/catalog.yaml");
    let catalog = Catalog::from_yaml(file_content)?;
    log::info!(
        "Catálogo cargado: {} capítulos, {} niveles",
        catalog.chapters().len(),
        catalog.level_count()
    );
    Ok(catalog)
}
