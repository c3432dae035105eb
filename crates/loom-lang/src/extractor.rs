//! Language extractor trait (spec §4.2) and the plugin registry (spec §4.1).

use std::path::Path;

use loom_core::ParsedFileEntities;

/// A single file's extraction, always paired with its source path so the registry
/// can report parse/extractor failures without the extractor needing to know about
/// `ParseStats`.
pub trait LanguageExtractor: Send + Sync {
    /// `project_root` is only consulted by extractors that resolve import paths at
    /// extraction time (Python); others ignore it and leave `resolvedPath` for the
    /// resolver to fill in.
    fn extract(&self, project_root: &Path, path: &Path, content: &str) -> anyhow::Result<ParsedFileEntities>;
}

/// One source language: a stable id, the extensions it claims, and the extractor
/// that turns a file into entities. `display_name` and `id` are distinct because a
/// plugin id is wire-stable (used in logs/metrics) while `display_name` is for
/// human-facing listings.
pub struct LanguagePlugin {
    pub id: &'static str,
    pub display_name: &'static str,
    pub extensions: &'static [&'static str],
    pub extractor: Box<dyn LanguageExtractor>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("extension {extension} already claimed by plugin {existing}")]
    ExtensionAlreadyClaimed { extension: String, existing: &'static str },
}

/// Maps a file extension to the plugin that handles it. Extensions are
/// case-insensitive and normalised to begin with `.` (spec §4.1 contract).
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<LanguagePlugin>,
    by_extension: std::collections::HashMap<String, usize>,
}

fn normalize_extension(ext: &str) -> String {
    let lower = ext.to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin, claiming all of its extensions. Fails without mutating
    /// the registry if any extension is already claimed by another plugin.
    pub fn register(&mut self, plugin: LanguagePlugin) -> Result<(), RegistrationError> {
        for ext in plugin.extensions {
            let norm = normalize_extension(ext);
            if let Some(&idx) = self.by_extension.get(&norm) {
                return Err(RegistrationError::ExtensionAlreadyClaimed {
                    extension: norm,
                    existing: self.plugins[idx].id,
                });
            }
        }

        let idx = self.plugins.len();
        for ext in plugin.extensions {
            self.by_extension.insert(normalize_extension(ext), idx);
        }
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn is_supported(&self, ext: &str) -> bool {
        self.by_extension.contains_key(&normalize_extension(ext))
    }

    pub fn plugin_for_extension(&self, ext: &str) -> Option<&LanguagePlugin> {
        self.by_extension
            .get(&normalize_extension(ext))
            .map(|&idx| &self.plugins[idx])
    }

    pub fn plugin_for_path(&self, path: &Path) -> Option<&LanguagePlugin> {
        let ext = path.extension()?.to_str()?;
        self.plugin_for_extension(ext)
    }

    pub fn plugins(&self) -> impl Iterator<Item = &LanguagePlugin> {
        self.plugins.iter()
    }

    /// The preferred entry point (spec §4.1): parse `path` with whichever plugin
    /// claims its extension, or `None` if no plugin does.
    pub fn extract_all_entities(
        &self,
        project_root: &Path,
        path: &Path,
        content: &str,
    ) -> Option<anyhow::Result<ParsedFileEntities>> {
        self.plugin_for_path(path).map(|p| p.extractor.extract(project_root, path, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubExtractor;
    impl LanguageExtractor for StubExtractor {
        fn extract(&self, _project_root: &Path, _path: &Path, _content: &str) -> anyhow::Result<ParsedFileEntities> {
            Ok(ParsedFileEntities::default())
        }
    }

    fn stub_plugin(id: &'static str, exts: &'static [&'static str]) -> LanguagePlugin {
        LanguagePlugin { id, display_name: id, extensions: exts, extractor: Box::new(StubExtractor) }
    }

    #[test]
    fn registers_and_looks_up_by_extension_case_insensitively() {
        let mut reg = PluginRegistry::new();
        reg.register(stub_plugin("ts", &[".ts", ".tsx"])).unwrap();
        assert!(reg.is_supported("TS"));
        assert!(reg.is_supported(".tsx"));
        assert!(!reg.is_supported(".py"));
    }

    #[test]
    fn duplicate_extension_registration_fails_without_mutating() {
        let mut reg = PluginRegistry::new();
        reg.register(stub_plugin("ts", &[".ts"])).unwrap();
        let err = reg.register(stub_plugin("other", &[".ts"])).unwrap_err();
        assert!(matches!(err, RegistrationError::ExtensionAlreadyClaimed { .. }));
        assert_eq!(reg.plugin_for_extension(".ts").unwrap().id, "ts");
    }

    #[test]
    fn is_supported_is_total() {
        let reg = PluginRegistry::new();
        assert!(!reg.is_supported(""));
        assert!(!reg.is_supported(".anything"));
    }
}
