mod catalog;
mod loader;

pub use catalog::{Catalog, CatalogError};
pub use loader::{builtin_catalog, load_catalog_from_json};
