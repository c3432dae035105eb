//! Project enumeration: walks `project_root`, applying the configured ignore
//! globs (spec §6 "Default ignore patterns") and the plugin registry's supported
//! extensions (spec §6 "Supported extensions").

use std::path::PathBuf;

use loom_core::PipelineConfig;
use loom_lang::PluginRegistry;

pub fn enumerate_files(config: &PipelineConfig, registry: &PluginRegistry) -> anyhow::Result<Vec<PathBuf>> {
    let matcher = config.ignore_matcher()?;
    let extension_filter: Option<Vec<String>> =
        config.extension_filter.as_ref().map(|exts| exts.iter().map(|e| e.to_ascii_lowercase()).collect());

    let mut out = Vec::new();
    // Ignoring is entirely driven by `config.ignore` (spec §6 "Default ignore
    // patterns" is a configuration surface, not a `.gitignore` lookup), so the
    // walker's own filters are disabled and every file is handed to our matcher.
    let walker = ignore::WalkBuilder::new(&config.project_root).standard_filters(false).build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("walk error: {err}");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if matcher.is_match(path) {
            continue;
        }
        if !registry.is_supported(path.extension().and_then(|e| e.to_str()).unwrap_or("")) {
            continue;
        }
        if let Some(filter) = &extension_filter {
            let ext = path.extension().and_then(|e| e.to_str()).map(|e| format!(".{}", e.to_ascii_lowercase()));
            if !ext.map(|e| filter.contains(&e)).unwrap_or(false) {
                continue;
            }
        }
        out.push(path.to_path_buf());
    }

    Ok(out)
}
