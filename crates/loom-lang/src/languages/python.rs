//! Python extractor.
//!
//! `self`/`cls` are dropped from `params`; a function/class's docstring is its
//! first string-expression statement with the triple-quote delimiters stripped;
//! a name is exported unless it starts with `_`. Import resolution here is
//! syntactic only — candidate paths are computed from the module path and the
//! first one under the project root that doesn't look like a site-packages
//! path is chosen, with no filesystem probe.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tree_sitter::{Node, Point};

use loom_core::{FileEntity, FunctionEntity, ImportEntity, ImportSpecifier, ParsedFileEntities, Param};
use loom_core::parsed::CallRef;

use crate::extractor::LanguageExtractor;
use crate::parser_pool::{GrammarId, ParseRequest, ParserPool};

pub struct PythonExtractor {
    parser_pool: ParserPool,
}

impl PythonExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }
}

impl LanguageExtractor for PythonExtractor {
    fn extract(&self, project_root: &Path, path: &Path, content: &str) -> anyhow::Result<ParsedFileEntities> {
        let outcome = self.parser_pool.parse_blocking(ParseRequest {
            grammar: GrammarId::Python,
            content: content.to_string(),
            path: path.to_path_buf(),
        })?;

        let source = outcome.content.as_bytes();
        let root = outcome.tree.root_node();
        if root.has_error() && root.child_count() == 0 {
            anyhow::bail!("{} produced an empty, unparseable tree", path.display());
        }

        let project_root = project_root.to_path_buf();
        let mut walker = Walker {
            path: path.to_path_buf(),
            project_root,
            source,
            enclosing: Vec::new(),
            out: ParsedFileEntities::default(),
        };
        walker.visit(root);

        let mut hasher = Sha256::new();
        hasher.update(source);
        let hash = hex::encode(hasher.finalize());

        walker.out.file = Some(FileEntity {
            path: path.to_path_buf(),
            name: path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
            extension: path.extension().map(|e| e.to_string_lossy().into_owned()).unwrap_or_default(),
            loc: outcome.content.lines().count() as u32,
            last_modified: Utc::now(),
            hash,
        });

        Ok(walker.out)
    }
}

fn line(point: Point) -> u32 {
    point.row as u32 + 1
}

fn text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn is_exported(name: &str) -> bool {
    !name.starts_with('_')
}

/// `print`, `len`, `isinstance`, and common test/log helpers — the built-in
/// names excluded from `callRefs`.
fn is_builtin_call(name: &str) -> bool {
    matches!(
        name,
        "print" | "len" | "isinstance" | "issubclass" | "hasattr" | "getattr" | "setattr"
            | "super" | "range" | "enumerate" | "zip" | "map" | "filter" | "sorted" | "reversed"
            | "open" | "input" | "repr" | "str" | "int" | "float" | "bool" | "list" | "dict"
            | "set" | "tuple" | "type" | "format" | "abs" | "min" | "max" | "sum" | "any" | "all"
            | "assertEqual" | "assertTrue" | "assertFalse" | "assertRaises"
            | "info" | "debug" | "warning" | "error" | "exception"
    )
}

fn docstring_of(body: Option<Node>, source: &[u8]) -> Option<String> {
    let body = body?;
    let first_stmt = body.named_child(0)?;
    if first_stmt.kind() != "expression_statement" {
        return None;
    }
    let expr = first_stmt.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    let raw = text(expr, source);
    let stripped = raw
        .trim_start_matches("\"\"\"")
        .trim_end_matches("\"\"\"")
        .trim_start_matches("'''")
        .trim_end_matches("'''")
        .trim_start_matches(['r', 'R', 'u', 'U', 'b', 'B'])
        .trim_matches('"')
        .trim_matches('\'')
        .trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

fn param_from_node(node: Node, source: &[u8]) -> Option<Param> {
    match node.kind() {
        "identifier" => {
            let name = text(node, source);
            if name == "self" || name == "cls" {
                None
            } else {
                Some(Param { name: name.to_string(), type_: None, optional: None, default_value: None, is_rest: None })
            }
        }
        "typed_parameter" => {
            let mut cursor = node.walk();
            let ident = node.children(&mut cursor).find(|c| c.kind() == "identifier")?;
            let name = text(ident, source).to_string();
            if name == "self" || name == "cls" {
                return None;
            }
            let type_ = node.child_by_field_name("type").map(|t| text(t, source).to_string());
            Some(Param { name, type_, optional: None, default_value: None, is_rest: None })
        }
        "default_parameter" | "typed_default_parameter" => {
            let name_node = node.child_by_field_name("name")?;
            let name = text(name_node, source).to_string();
            if name == "self" || name == "cls" {
                return None;
            }
            let type_ = node.child_by_field_name("type").map(|t| text(t, source).to_string());
            let default_value = node.child_by_field_name("value").map(|v| text(v, source).to_string());
            Some(Param { name, type_, optional: Some(true), default_value, is_rest: None })
        }
        "list_splat_pattern" => {
            let inner = node.named_child(0)?;
            Some(Param { name: text(inner, source).to_string(), type_: None, optional: None, default_value: None, is_rest: Some(true) })
        }
        "dictionary_splat_pattern" => {
            let inner = node.named_child(0)?;
            Some(Param { name: format!("**{}", text(inner, source)), type_: None, optional: None, default_value: None, is_rest: Some(true) })
        }
        _ => None,
    }
}

fn extract_params(params_node: Option<Node>, source: &[u8]) -> Vec<Param> {
    let Some(params_node) = params_node else { return Vec::new() };
    let mut cursor = params_node.walk();
    params_node.named_children(&mut cursor).filter_map(|n| param_from_node(n, source)).collect()
}

/// Resolves `from .pkg.mod import x` / `import pkg.mod` module paths to a
/// candidate absolute path under `project_root`, without touching the
/// filesystem. Relative imports walk up one directory per leading dot.
fn resolve_python_module(project_root: &Path, module: &str, relative_dots: u32, from_file: &Path) -> Option<PathBuf> {
    let mut base = if relative_dots > 0 {
        let mut dir = from_file.parent()?.to_path_buf();
        for _ in 1..relative_dots {
            dir = dir.parent()?.to_path_buf();
        }
        dir
    } else {
        project_root.to_path_buf()
    };

    if !module.is_empty() {
        for segment in module.split('.') {
            base.push(segment);
        }
    }

    let as_module = base.with_extension("py");
    let as_package = base.join("__init__.py");

    for candidate in [as_module, as_package] {
        if candidate.starts_with(project_root) && !is_site_packages(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn is_site_packages(path: &Path) -> bool {
    path.components().any(|c| {
        let s = c.as_os_str().to_string_lossy();
        s == "site-packages" || s == "dist-packages" || s == "node_modules"
    })
}

struct Walker<'s> {
    path: PathBuf,
    project_root: PathBuf,
    source: &'s [u8],
    enclosing: Vec<String>,
    out: ParsedFileEntities,
}

impl<'s> Walker<'s> {
    fn visit(&mut self, node: Node<'s>) {
        match node.kind() {
            "function_definition" => {
                self.visit_function(node);
                return;
            }
            "class_definition" => {
                self.visit_class(node);
                return;
            }
            "import_statement" => self.visit_import(node),
            "import_from_statement" => self.visit_import_from(node),
            "call" => self.visit_call(node),
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }
    }

    fn name_of(&self, node: Node<'s>) -> Option<String> {
        let name_node = node.child_by_field_name("name")?;
        Some(text(name_node, self.source).to_string())
    }

    fn visit_function(&mut self, node: Node<'s>) {
        let Some(name) = self.name_of(node) else { return };
        let body = node.child_by_field_name("body");
        let params = extract_params(node.child_by_field_name("parameters"), self.source);
        let is_async = has_leading_token(node, "async");

        self.out.functions.push(FunctionEntity {
            name: name.clone(),
            file_path: self.path.clone(),
            start_line: line(node.start_position()),
            end_line: line(node.end_position()),
            is_exported: is_exported(&name),
            is_async,
            is_arrow: false,
            is_generator: None,
            params,
            return_type: node.child_by_field_name("return_type").map(|t| text(t, self.source).to_string()),
            docstring: docstring_of(body, self.source),
            complexity: None,
        });

        self.enclosing.push(name);
        if let Some(body) = body {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                self.visit(child);
            }
        }
        self.enclosing.pop();
    }

    fn visit_class(&mut self, node: Node<'s>) {
        let Some(name) = self.name_of(node) else { return };
        let body = node.child_by_field_name("body");

        let mut extends = None;
        if let Some(args) = node.child_by_field_name("superclasses") {
            let mut cursor = args.walk();
            if let Some(first) = args.named_children(&mut cursor).find(|c| c.kind() == "identifier") {
                let parent = text(first, self.source).to_string();
                extends = Some(parent.clone());
                self.out.inheritance_refs.push(loom_core::parsed::InheritanceRef {
                    child_name: name.clone(),
                    parent_name: parent,
                    kind: loom_core::parsed::InheritanceKind::Extends,
                });
            }
        }

        self.out.classes.push(loom_core::ClassEntity {
            name: name.clone(),
            file_path: self.path.clone(),
            start_line: line(node.start_position()),
            end_line: line(node.end_position()),
            is_exported: is_exported(&name),
            is_abstract: false,
            extends,
            implements: None,
            docstring: docstring_of(body, self.source),
        });

        if let Some(body) = body {
            let mut cursor = body.walk();
            for child in body.children(&mut cursor) {
                self.visit(child);
            }
        }
    }

    fn visit_import(&mut self, node: Node<'s>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            let (module, alias) = match child.kind() {
                "dotted_name" => (text(child, self.source).to_string(), None),
                "aliased_import" => {
                    let Some(name_node) = child.child_by_field_name("name") else { continue };
                    let alias_node = child.child_by_field_name("alias");
                    (text(name_node, self.source).to_string(), alias_node.map(|a| text(a, self.source).to_string()))
                }
                _ => continue,
            };
            let resolved = resolve_python_module(&self.project_root, &module, 0, &self.path);
            self.out.imports.push(ImportEntity {
                source: module.clone(),
                file_path: self.path.clone(),
                line: line(node.start_position()),
                is_default: false,
                is_namespace: true,
                specifiers: vec![ImportSpecifier { name: module, alias: alias.clone() }],
                namespace_alias: alias,
                default_alias: None,
                resolved_path: resolved,
            });
        }
    }

    fn visit_import_from(&mut self, node: Node<'s>) {
        let Some(module_node) = node.child_by_field_name("module_name") else { return };
        let relative_dots = text(module_node, self.source).chars().take_while(|c| *c == '.').count() as u32;
        let module = text(module_node, self.source).trim_start_matches('.').to_string();

        let mut specifiers = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "dotted_name" if child != module_node => {
                    specifiers.push(ImportSpecifier { name: text(child, self.source).to_string(), alias: None });
                }
                "aliased_import" => {
                    let Some(name_node) = child.child_by_field_name("name") else { continue };
                    let alias_node = child.child_by_field_name("alias");
                    specifiers.push(ImportSpecifier {
                        name: text(name_node, self.source).to_string(),
                        alias: alias_node.map(|a| text(a, self.source).to_string()),
                    });
                }
                "wildcard_import" => specifiers.push(ImportSpecifier { name: "*".to_string(), alias: None }),
                _ => {}
            }
        }

        let resolved = resolve_python_module(&self.project_root, &module, relative_dots, &self.path);
        self.out.imports.push(ImportEntity {
            source: format!("{}{}", ".".repeat(relative_dots as usize), module),
            file_path: self.path.clone(),
            line: line(node.start_position()),
            is_default: false,
            is_namespace: false,
            specifiers,
            namespace_alias: None,
            default_alias: None,
            resolved_path: resolved,
        });
    }

    fn visit_call(&mut self, node: Node<'s>) {
        let Some(caller) = self.enclosing.last().cloned() else { return };
        let Some(func) = node.child_by_field_name("function") else { return };
        let callee_name = match func.kind() {
            "identifier" => text(func, self.source).to_string(),
            "attribute" => {
                let Some(attr) = func.child_by_field_name("attribute") else { return };
                text(attr, self.source).to_string()
            }
            _ => return,
        };
        if is_builtin_call(&callee_name) {
            return;
        }
        self.out.call_refs.push(CallRef { caller_name: caller, callee_name, line: line(node.start_position()) });
    }
}

fn has_leading_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| !c.is_named() && c.kind() == token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::create_parser_pool;

    fn extract(path: &str, src: &str) -> ParsedFileEntities {
        let extractor = PythonExtractor::new(create_parser_pool());
        extractor.extract(Path::new("/proj"), &PathBuf::from(path), src).unwrap()
    }

    #[test]
    fn self_and_cls_are_omitted_from_params() {
        let parsed = extract(
            "/proj/a.py",
            "class Foo:\n    def method(self, x):\n        return x\n",
        );
        assert_eq!(parsed.functions.len(), 1);
        assert_eq!(parsed.functions[0].params.len(), 1);
        assert_eq!(parsed.functions[0].params[0].name, "x");
    }

    #[test]
    fn docstring_is_first_string_statement_stripped() {
        let parsed = extract(
            "/proj/a.py",
            "def f():\n    \"\"\"Does a thing.\"\"\"\n    return 1\n",
        );
        assert_eq!(parsed.functions[0].docstring.as_deref(), Some("Does a thing."));
    }

    #[test]
    fn underscore_prefixed_names_are_not_exported() {
        let parsed = extract("/proj/a.py", "def _helper():\n    return 1\n\ndef public():\n    return 2\n");
        let helper = parsed.functions.iter().find(|f| f.name == "_helper").unwrap();
        let public = parsed.functions.iter().find(|f| f.name == "public").unwrap();
        assert!(!helper.is_exported);
        assert!(public.is_exported);
    }

    #[test]
    fn print_is_filtered_user_function_is_not() {
        let parsed = extract(
            "/proj/a.py",
            "def run():\n    print('x')\n    compute()\n",
        );
        assert_eq!(parsed.call_refs.len(), 1);
        assert_eq!(parsed.call_refs[0].callee_name, "compute");
    }

    #[test]
    fn class_inherits_via_superclasses() {
        let parsed = extract("/proj/a.py", "class Dog(Animal):\n    pass\n");
        assert_eq!(parsed.classes[0].extends.as_deref(), Some("Animal"));
    }
}
