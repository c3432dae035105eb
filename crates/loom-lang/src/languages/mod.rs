//! Per-language extractors and the default plugin set: TypeScript/JavaScript
//! (including TSX/JSX), Python, and C#.

pub mod csharp;
pub mod python;
pub mod ts_family;

use crate::extractor::{LanguagePlugin, PluginRegistry, RegistrationError};
use crate::parser_pool::ParserPool;

/// Builds the registry the coordinator uses for a full project parse.
pub fn default_registry(pool: ParserPool) -> Result<PluginRegistry, RegistrationError> {
    let mut registry = PluginRegistry::new();
    registry.register(LanguagePlugin {
        id: "typescript",
        display_name: "TypeScript / JavaScript",
        extensions: &[".ts", ".tsx", ".js", ".jsx", ".mts", ".cts", ".mjs", ".cjs"],
        extractor: Box::new(ts_family::TsFamilyExtractor::new(pool.clone())),
    })?;
    registry.register(LanguagePlugin {
        id: "python",
        display_name: "Python",
        extensions: &[".py", ".pyw", ".pyi"],
        extractor: Box::new(python::PythonExtractor::new(pool)),
    })?;
    registry.register(LanguagePlugin {
        id: "csharp",
        display_name: "C#",
        extensions: &[".cs"],
        extractor: Box::new(csharp::CSharpExtractor),
    })?;
    Ok(registry)
}
