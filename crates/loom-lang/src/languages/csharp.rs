//! C# plugin: extensions only. The registry accepts a plugin whose extractor is
//! a stub — `.cs` files are recognised and counted, but the entity lists stay
//! empty until a real grammar-driven extractor replaces this one.

use std::path::Path;

use loom_core::{FileEntity, ParsedFileEntities};

use crate::extractor::LanguageExtractor;

pub struct CSharpExtractor;

impl LanguageExtractor for CSharpExtractor {
    fn extract(&self, _project_root: &Path, path: &Path, content: &str) -> anyhow::Result<ParsedFileEntities> {
        use chrono::Utc;
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash = hex::encode(hasher.finalize());

        Ok(ParsedFileEntities {
            file: Some(FileEntity {
                path: path.to_path_buf(),
                name: path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
                extension: path.extension().map(|e| e.to_string_lossy().into_owned()).unwrap_or_default(),
                loc: content.lines().count() as u32,
                last_modified: Utc::now(),
                hash,
            }),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn emits_only_a_file_record() {
        let parsed = CSharpExtractor.extract(Path::new("/proj"), &PathBuf::from("/proj/A.cs"), "class A {}\n").unwrap();
        assert!(parsed.file.is_some());
        assert!(parsed.functions.is_empty());
        assert!(parsed.classes.is_empty());
    }
}
