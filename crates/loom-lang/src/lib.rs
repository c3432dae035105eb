//! Language Plugin Registry and per-language syntactic extractors: the C1/C2
//! stages of the pipeline. Depends only on `loom-core` for its output types and
//! on tree-sitter for parsing; knows nothing about the resolver or the store.

pub mod extractor;
pub mod languages;
pub mod parser_pool;

pub use extractor::{LanguageExtractor, LanguagePlugin, PluginRegistry, RegistrationError};
pub use languages::default_registry;
pub use parser_pool::{create_parser_pool, GrammarId, ParseOutcome, ParseRequest, ParserPool};
