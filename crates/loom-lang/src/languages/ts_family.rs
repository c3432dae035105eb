//! TypeScript/TSX/JavaScript/JSX extractor.
//!
//! One extractor covers the whole family because the four extensions share a
//! grammar lineage (tree-sitter-typescript's TSX grammar is a superset of its
//! TypeScript grammar, and tree-sitter-javascript already parses JSX) — the same
//! node-kind vocabulary (`function_declaration`, `class_declaration`, `jsx_element`,
//! …) shows up regardless of which of the three grammars actually produced the
//! tree, so a single visitor handles all of them.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tree_sitter::{Node, Point};

use loom_core::{
    ClassEntity, ComplexityMetrics, ComponentEntity, FileEntity, FunctionEntity, ImportEntity,
    ImportSpecifier, InterfaceEntity, ParsedFileEntities, Param, PropSpec, TypeEntity,
    TypeEntityKind, VariableEntity, VariableKind,
};
use loom_core::parsed::{CallRef, InheritanceKind, InheritanceRef, RenderRef};

use crate::extractor::LanguageExtractor;
use crate::parser_pool::{GrammarId, ParseRequest, ParserPool};

pub struct TsFamilyExtractor {
    parser_pool: ParserPool,
}

impl TsFamilyExtractor {
    pub fn new(parser_pool: ParserPool) -> Self {
        Self { parser_pool }
    }

    fn grammar_for(path: &Path) -> GrammarId {
        match path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase().as_str() {
            "tsx" => GrammarId::Tsx,
            "ts" | "mts" | "cts" => GrammarId::TypeScript,
            _ => GrammarId::JavaScript,
        }
    }
}

impl LanguageExtractor for TsFamilyExtractor {
    fn extract(&self, _project_root: &Path, path: &Path, content: &str) -> anyhow::Result<ParsedFileEntities> {
        let grammar = Self::grammar_for(path);
        let outcome = self.parser_pool.parse_blocking(ParseRequest {
            grammar,
            content: content.to_string(),
            path: path.to_path_buf(),
        })?;

        let source = outcome.content.as_bytes();
        let root = outcome.tree.root_node();
        if root.has_error() && root.child_count() == 0 {
            anyhow::bail!("{} produced an empty, unparseable tree", path.display());
        }

        let mut walker = Walker { path: path.to_path_buf(), source, enclosing: Vec::new(), out: ParsedFileEntities::default() };
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

fn strip_quotes(s: &str) -> String {
    s.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string()
}

/// JSDoc comments (`/** ... */`) immediately preceding a declaration; `None` for
/// anything else, including single-line `//` comments.
fn leading_doc_comment(node: Node, source: &[u8]) -> Option<String> {
    let mut candidate = node;
    // export statements wrap the declaration; the comment precedes the wrapper.
    if let Some(parent) = node.parent() {
        if parent.kind() == "export_statement" {
            candidate = parent;
        }
    }
    let prev = candidate.prev_sibling()?;
    if prev.kind() != "comment" {
        return None;
    }
    let raw = text(prev, source);
    if !raw.starts_with("/**") {
        return None;
    }
    let stripped = raw.trim_start_matches("/**").trim_end_matches("*/");
    let cleaned: Vec<&str> = stripped
        .lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .filter(|l| !l.is_empty())
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join("\n"))
    }
}

fn is_exported(node: Node) -> bool {
    node.parent().map(|p| p.kind() == "export_statement").unwrap_or(false)
}

fn jsx_tag_name<'a>(node: Node<'a>, source: &'a [u8]) -> Option<&'a str> {
    let name_node = node.child_by_field_name("name")?;
    Some(text(name_node, source))
}

/// Whether `node`'s subtree contains a JSX element — the signal the data model
/// uses to classify a function/class as a Component rather than plain Function/Class.
fn contains_jsx(node: Node) -> bool {
    if matches!(node.kind(), "jsx_element" | "jsx_self_closing_element" | "jsx_fragment") {
        return true;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).any(contains_jsx)
}

fn collect_jsx_component_uses(node: Node, source: &[u8], out: &mut Vec<(String, u32)>) {
    if matches!(node.kind(), "jsx_element" | "jsx_self_closing_element") {
        if let Some(name) = jsx_tag_name(node, source) {
            let base = name.split('.').next().unwrap_or(name);
            if base.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) {
                out.push((base.to_string(), line(node.start_position())));
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_jsx_component_uses(child, source, out);
    }
}

/// Built-ins excluded from `callRefs` to cut noise (console.*, common globals).
fn is_builtin_call(name: &str) -> bool {
    matches!(
        name,
        "log" | "warn" | "error" | "info" | "debug"
            | "parseInt" | "parseFloat" | "isNaN" | "isFinite"
            | "setTimeout" | "setInterval" | "clearTimeout" | "clearInterval"
            | "require" | "Array" | "Object" | "JSON" | "Promise"
            | "map" | "filter" | "reduce" | "forEach" | "push" | "join" | "slice"
            | "toString" | "hasOwnProperty" | "describe" | "it" | "test" | "expect"
    )
}

fn param_from_node(node: Node, source: &[u8]) -> Option<Param> {
    match node.kind() {
        "identifier" => Some(Param { name: text(node, source).to_string(), type_: None, optional: None, default_value: None, is_rest: None }),
        "required_parameter" | "optional_parameter" => {
            let pattern = node.child_by_field_name("pattern")?;
            let name = text(pattern, source).to_string();
            let type_ = node
                .child_by_field_name("type")
                .map(|t| text(t, source).trim_start_matches(':').trim().to_string());
            let default_value = node.child_by_field_name("value").map(|v| text(v, source).to_string());
            Some(Param {
                name,
                type_,
                optional: Some(node.kind() == "optional_parameter"),
                default_value,
                is_rest: None,
            })
        }
        "assignment_pattern" => {
            let pattern = node.child_by_field_name("left")?;
            let default_value = node.child_by_field_name("right").map(|v| text(v, source).to_string());
            Some(Param { name: text(pattern, source).to_string(), type_: None, optional: Some(true), default_value, is_rest: None })
        }
        "rest_pattern" => {
            let mut cursor = node.walk();
            let inner = node.children(&mut cursor).find(|c| c.kind() == "identifier")?;
            Some(Param { name: text(inner, source).to_string(), type_: None, optional: None, default_value: None, is_rest: Some(true) })
        }
        "object_pattern" | "array_pattern" => {
            Some(Param { name: text(node, source).to_string(), type_: None, optional: None, default_value: None, is_rest: None })
        }
        _ => None,
    }
}

fn extract_params(params_node: Option<Node>, source: &[u8]) -> Vec<Param> {
    let Some(params_node) = params_node else { return Vec::new() };
    let mut cursor = params_node.walk();
    params_node
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "this")
        .filter_map(|n| param_from_node(n, source))
        .collect()
}

fn return_type_of(node: Node, source: &[u8]) -> Option<String> {
    node.child_by_field_name("return_type")
        .map(|t| text(t, source).trim_start_matches(':').trim().to_string())
}

fn cyclomatic_complexity(body: Option<Node>) -> u32 {
    let Some(body) = body else { return 1 };
    fn walk(node: Node, acc: &mut u32) {
        if matches!(
            node.kind(),
            "if_statement" | "for_statement" | "for_in_statement" | "while_statement"
                | "do_statement" | "catch_clause" | "case" | "ternary_expression"
                | "binary_expression"
        ) {
            *acc += 1;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            walk(child, acc);
        }
    }
    let mut acc = 1;
    walk(body, &mut acc);
    acc
}

struct Walker<'s> {
    path: PathBuf,
    source: &'s [u8],
    enclosing: Vec<String>,
    out: ParsedFileEntities,
}

impl<'s> Walker<'s> {
    /// Dispatches on node kind. Kinds that manage their own sub-recursion (any
    /// declaration with a body — function/method/class, and var declarations,
    /// which must selectively recurse into initializer expressions only) return
    /// early so their subtree isn't walked twice; everything else falls through to
    /// the generic recursion at the bottom.
    fn visit(&mut self, node: Node<'s>) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                self.visit_function_decl(node);
                return;
            }
            "method_definition" => {
                self.visit_method(node);
                return;
            }
            "class_declaration" => {
                self.visit_class_decl(node);
                return;
            }
            "lexical_declaration" | "variable_declaration" => {
                self.visit_var_decl(node);
                return;
            }
            "interface_declaration" => self.visit_interface_decl(node),
            "type_alias_declaration" => self.visit_type_alias(node),
            "enum_declaration" => self.visit_enum_decl(node),
            "import_statement" => self.visit_import(node),
            "call_expression" => self.visit_call(node),
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

    fn visit_function_decl(&mut self, node: Node<'s>) {
        let Some(name) = self.name_of(node) else { return };
        let body = node.child_by_field_name("body");
        let is_component = body.map(contains_jsx).unwrap_or(false);
        let params = extract_params(node.child_by_field_name("parameters"), self.source);
        let start = line(node.start_position());
        let end = line(node.end_position());
        let docstring = leading_doc_comment(node, self.source);

        if is_component {
            self.out.components.push(ComponentEntity {
                name: name.clone(),
                file_path: self.path.clone(),
                start_line: start,
                end_line: end,
                is_exported: is_exported(node),
                props: first_param_props(&params),
                props_type: params.first().and_then(|p| p.type_.clone()),
            });
        } else {
            self.out.functions.push(FunctionEntity {
                name: name.clone(),
                file_path: self.path.clone(),
                start_line: start,
                end_line: end,
                is_exported: is_exported(node),
                is_async: has_token(node, "async"),
                is_arrow: false,
                is_generator: Some(node.kind() == "generator_function_declaration" || has_token(node, "*")),
                params,
                return_type: return_type_of(node, self.source),
                docstring,
                complexity: Some(ComplexityMetrics {
                    cyclomatic: cyclomatic_complexity(body),
                    params: node.child_by_field_name("parameters").map(|p| p.named_child_count() as u32).unwrap_or(0),
                    lines: end.saturating_sub(start) + 1,
                }),
            });
        }

        self.enter_body(name, body);
    }

    fn visit_method(&mut self, node: Node<'s>) {
        // Skip methods whose enclosing class_body is itself reached via the generic
        // recursion — method_definition only appears inside class_body, so this is
        // always a real class member.
        let Some(name) = self.name_of(node) else { return };
        let body = node.child_by_field_name("body");
        let is_component = body.map(contains_jsx).unwrap_or(false);
        let params = extract_params(node.child_by_field_name("parameters"), self.source);
        let start = line(node.start_position());
        let end = line(node.end_position());
        let docstring = leading_doc_comment(node, self.source);

        if is_component {
            self.out.components.push(ComponentEntity {
                name: name.clone(),
                file_path: self.path.clone(),
                start_line: start,
                end_line: end,
                is_exported: false,
                props: first_param_props(&params),
                props_type: params.first().and_then(|p| p.type_.clone()),
            });
        } else {
            self.out.functions.push(FunctionEntity {
                name: name.clone(),
                file_path: self.path.clone(),
                start_line: start,
                end_line: end,
                is_exported: false,
                is_async: has_token(node, "async"),
                is_arrow: false,
                is_generator: Some(has_token(node, "*")),
                params,
                return_type: return_type_of(node, self.source),
                docstring,
                complexity: Some(ComplexityMetrics {
                    cyclomatic: cyclomatic_complexity(body),
                    params: node.child_by_field_name("parameters").map(|p| p.named_child_count() as u32).unwrap_or(0),
                    lines: end.saturating_sub(start) + 1,
                }),
            });
        }

        self.enter_body(name, body);
    }

    fn visit_class_decl(&mut self, node: Node<'s>) {
        let Some(name) = self.name_of(node) else { return };
        let body = node.child_by_field_name("body");
        let is_component = body.map(contains_jsx).unwrap_or(false);
        let start = line(node.start_position());
        let end = line(node.end_position());
        let docstring = leading_doc_comment(node, self.source);

        let mut extends = None;
        let mut implements = Vec::new();
        // Plain JavaScript classes put `extends` directly on a `superclass` field;
        // TypeScript's grammar wraps both clauses in a `class_heritage` node.
        if let Some(superclass) = node.child_by_field_name("superclass") {
            let parent_name = text(superclass, self.source).to_string();
            extends = Some(parent_name.clone());
            self.out.inheritance_refs.push(InheritanceRef {
                child_name: name.clone(),
                parent_name,
                kind: InheritanceKind::Extends,
            });
        } else if let Some(heritage) = find_child_kind(node, "class_heritage") {
            let mut cursor = heritage.walk();
            for child in heritage.children(&mut cursor) {
                match child.kind() {
                    "extends_clause" => {
                        if let Some(value) = child.child_by_field_name("value") {
                            let parent_name = text(value, self.source).to_string();
                            extends = Some(parent_name.clone());
                            self.out.inheritance_refs.push(InheritanceRef {
                                child_name: name.clone(),
                                parent_name,
                                kind: InheritanceKind::Extends,
                            });
                        }
                    }
                    "implements_clause" => {
                        let mut ic = child.walk();
                        for t in child.named_children(&mut ic) {
                            let parent_name = text(t, self.source).to_string();
                            implements.push(parent_name.clone());
                            self.out.inheritance_refs.push(InheritanceRef {
                                child_name: name.clone(),
                                parent_name,
                                kind: InheritanceKind::Implements,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }

        if is_component {
            self.out.components.push(ComponentEntity {
                name: name.clone(),
                file_path: self.path.clone(),
                start_line: start,
                end_line: end,
                is_exported: is_exported(node),
                props: None,
                props_type: None,
            });
        } else {
            self.out.classes.push(ClassEntity {
                name: name.clone(),
                file_path: self.path.clone(),
                start_line: start,
                end_line: end,
                is_exported: is_exported(node),
                is_abstract: has_token(node, "abstract"),
                extends,
                implements: if implements.is_empty() { None } else { Some(implements) },
                docstring,
            });
        }

        self.enter_body(name, body);
    }

    fn visit_interface_decl(&mut self, node: Node<'s>) {
        let Some(name) = self.name_of(node) else { return };
        let start = line(node.start_position());
        let end = line(node.end_position());
        let mut extends = Vec::new();
        if let Some(clause) = find_child_kind(node, "extends_type_clause") {
            let mut cursor = clause.walk();
            for t in clause.named_children(&mut cursor) {
                let parent_name = text(t, self.source).to_string();
                extends.push(parent_name.clone());
                self.out.inheritance_refs.push(InheritanceRef {
                    child_name: name.clone(),
                    parent_name,
                    kind: InheritanceKind::Extends,
                });
            }
        }
        self.out.interfaces.push(InterfaceEntity {
            name,
            file_path: self.path.clone(),
            start_line: start,
            end_line: end,
            is_exported: is_exported(node),
            extends: if extends.is_empty() { None } else { Some(extends) },
            docstring: leading_doc_comment(node, self.source),
        });
    }

    fn visit_type_alias(&mut self, node: Node<'s>) {
        let Some(name) = self.name_of(node) else { return };
        self.out.types.push(TypeEntity {
            name,
            file_path: self.path.clone(),
            start_line: line(node.start_position()),
            end_line: line(node.end_position()),
            is_exported: is_exported(node),
            kind: TypeEntityKind::Type,
            docstring: leading_doc_comment(node, self.source),
        });
    }

    fn visit_enum_decl(&mut self, node: Node<'s>) {
        let Some(name) = self.name_of(node) else { return };
        self.out.types.push(TypeEntity {
            name,
            file_path: self.path.clone(),
            start_line: line(node.start_position()),
            end_line: line(node.end_position()),
            is_exported: is_exported(node),
            kind: TypeEntityKind::Enum,
            docstring: leading_doc_comment(node, self.source),
        });
    }

    /// A declarator assigned an arrow/function expression becomes a Function (or
    /// Component) entity instead of a Variable — callable bindings carry
    /// `params`/`isAsync`, which only Function has. Declarators are visited at any
    /// nesting depth so calls inside a locally-scoped helper still surface.
    fn visit_var_decl(&mut self, node: Node<'s>) {
        let kind = if text(node, self.source).trim_start().starts_with("const") {
            VariableKind::Const
        } else if text(node, self.source).trim_start().starts_with("let") {
            VariableKind::Let
        } else {
            VariableKind::Var
        };

        let mut cursor = node.walk();
        for declarator in node.children(&mut cursor).filter(|c| c.kind() == "variable_declarator") {
            let Some(name_node) = declarator.child_by_field_name("name") else { continue };
            let name = text(name_node, self.source).to_string();
            let value = declarator.child_by_field_name("value");
            let exported = is_exported(node);
            let decl_line = line(declarator.start_position());

            match value.map(|v| v.kind()) {
                Some("arrow_function") | Some("function_expression") => {
                    let value = value.unwrap();
                    let body = value.child_by_field_name("body");
                    let is_component = body.map(contains_jsx).unwrap_or(false);
                    let params = extract_params(value.child_by_field_name("parameters"), self.source);
                    let start = line(value.start_position());
                    let end = line(value.end_position());
                    let docstring = leading_doc_comment(node, self.source);

                    if is_component {
                        self.out.components.push(ComponentEntity {
                            name: name.clone(),
                            file_path: self.path.clone(),
                            start_line: start,
                            end_line: end,
                            is_exported: exported,
                            props: first_param_props(&params),
                            props_type: params.first().and_then(|p| p.type_.clone()),
                        });
                    } else {
                        self.out.functions.push(FunctionEntity {
                            name: name.clone(),
                            file_path: self.path.clone(),
                            start_line: start,
                            end_line: end,
                            is_exported: exported,
                            is_async: has_token(value, "async"),
                            is_arrow: value.kind() == "arrow_function",
                            is_generator: Some(has_token(value, "*")),
                            params,
                            return_type: return_type_of(value, self.source),
                            docstring,
                            complexity: Some(ComplexityMetrics {
                                cyclomatic: cyclomatic_complexity(body),
                                params: value.child_by_field_name("parameters").map(|p| p.named_child_count() as u32).unwrap_or(0),
                                lines: end.saturating_sub(start) + 1,
                            }),
                        });
                    }

                    self.enter_body(name, body);
                }
                _ => {
                    let type_ = declarator
                        .child_by_field_name("type")
                        .map(|t| text(t, self.source).trim_start_matches(':').trim().to_string());
                    self.out.variables.push(VariableEntity {
                        name,
                        file_path: self.path.clone(),
                        line: decl_line,
                        kind,
                        is_exported: exported,
                        type_,
                    });
                    // Not a callable binding, but its initializer (a call, JSX
                    // expression, object literal, …) may still contain call
                    // expressions worth recording against the enclosing function.
                    if let Some(value) = value {
                        self.visit(value);
                    }
                }
            }
        }
    }

    fn visit_import(&mut self, node: Node<'s>) {
        let Some(source_node) = find_child_kind(node, "string") else { return };
        let source_module = strip_quotes(text(source_node, self.source));
        let decl_line = line(node.start_position());

        let mut is_default = false;
        let mut is_namespace = false;
        let mut specifiers = Vec::new();
        let mut namespace_alias = None;
        let mut default_alias = None;

        if let Some(clause) = find_child_kind(node, "import_clause") {
            let mut cursor = clause.walk();
            for child in clause.children(&mut cursor) {
                match child.kind() {
                    "identifier" => {
                        is_default = true;
                        let alias = text(child, self.source).to_string();
                        default_alias = Some(alias.clone());
                        specifiers.push(ImportSpecifier { name: alias, alias: None });
                    }
                    "namespace_import" => {
                        is_namespace = true;
                        if let Some(ident) = child.named_child(0) {
                            namespace_alias = Some(text(ident, self.source).to_string());
                        }
                    }
                    "named_imports" => {
                        let mut ic = child.walk();
                        for spec in child.named_children(&mut ic).filter(|c| c.kind() == "import_specifier") {
                            let name_node = spec.child_by_field_name("name");
                            let alias_node = spec.child_by_field_name("alias");
                            if let Some(name_node) = name_node {
                                specifiers.push(ImportSpecifier {
                                    name: text(name_node, self.source).to_string(),
                                    alias: alias_node.map(|a| text(a, self.source).to_string()),
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        self.out.imports.push(ImportEntity {
            source: source_module,
            file_path: self.path.clone(),
            line: decl_line,
            is_default,
            is_namespace,
            specifiers,
            namespace_alias,
            default_alias,
            resolved_path: None,
        });
    }

    fn visit_call(&mut self, node: Node<'s>) {
        let Some(caller) = self.enclosing.last().cloned() else { return };
        let Some(func) = node.child_by_field_name("function") else { return };
        let callee_name = match func.kind() {
            "identifier" => text(func, self.source).to_string(),
            "member_expression" => {
                let Some(prop) = func.child_by_field_name("property") else { return };
                text(prop, self.source).to_string()
            }
            _ => return,
        };
        if is_builtin_call(&callee_name) {
            return;
        }
        self.out.call_refs.push(CallRef { caller_name: caller, callee_name, line: line(node.start_position()) });
    }

    /// Pushes `name` onto the enclosing-function stack for the duration of `body`'s
    /// traversal, and records JSX component usages found directly inside it.
    fn enter_body(&mut self, name: String, body: Option<Node<'s>>) {
        let Some(body) = body else { return };
        let mut uses = Vec::new();
        collect_jsx_component_uses(body, self.source, &mut uses);
        for (rendered, l) in uses {
            if rendered != name {
                self.out.render_refs.push(RenderRef { component_name: name.clone(), rendered_component_name: rendered, line: l });
            }
        }
        self.enclosing.push(name);
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            self.visit(child);
        }
        self.enclosing.pop();
    }
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| !c.is_named() && c.kind() == token)
}

fn find_child_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool::create_parser_pool;
    use std::path::PathBuf;

    fn extract(path: &str, src: &str) -> ParsedFileEntities {
        let extractor = TsFamilyExtractor::new(create_parser_pool());
        extractor.extract(Path::new("/"), &PathBuf::from(path), src).unwrap()
    }

    #[test]
    fn extracts_exported_function_with_call() {
        let parsed = extract(
            "/src/a.ts",
            "export function fnA() {\n  fnB();\n}\n",
        );
        assert_eq!(parsed.functions.len(), 1);
        assert_eq!(parsed.functions[0].name, "fnA");
        assert!(parsed.functions[0].is_exported);
        assert_eq!(parsed.call_refs.len(), 1);
        assert_eq!(parsed.call_refs[0].caller_name, "fnA");
        assert_eq!(parsed.call_refs[0].callee_name, "fnB");
    }

    #[test]
    fn module_level_calls_are_discarded() {
        let parsed = extract("/src/a.ts", "fnB();\n");
        assert!(parsed.call_refs.is_empty());
    }

    #[test]
    fn extracts_class_with_extends_and_implements() {
        let parsed = extract(
            "/src/pets.ts",
            "class Dog extends Animal implements Runnable {\n  bark() {}\n}\n",
        );
        assert_eq!(parsed.classes.len(), 1);
        assert_eq!(parsed.classes[0].extends.as_deref(), Some("Animal"));
        assert!(parsed.inheritance_refs.iter().any(|r| r.parent_name == "Animal" && r.kind == InheritanceKind::Extends));
        assert_eq!(parsed.functions.len(), 1);
        assert_eq!(parsed.functions[0].name, "bark");
    }

    #[test]
    fn extracts_named_and_default_imports() {
        let parsed = extract(
            "/src/a.ts",
            "import React from 'react';\nimport { useState, useEffect as fx } from 'react';\n",
        );
        assert_eq!(parsed.imports.len(), 2);
        assert_eq!(parsed.imports[0].source, "react");
        assert!(parsed.imports[0].is_default);
        assert_eq!(parsed.imports[1].specifiers.len(), 2);
        assert_eq!(parsed.imports[1].specifiers[1].alias.as_deref(), Some("fx"));
    }

    #[test]
    fn arrow_function_component_with_jsx_is_a_component() {
        let parsed = extract(
            "/src/Widget.tsx",
            "export const Widget = () => {\n  return <Child />;\n};\n",
        );
        assert_eq!(parsed.components.len(), 1);
        assert_eq!(parsed.components[0].name, "Widget");
        assert!(parsed.functions.is_empty());
        assert_eq!(parsed.render_refs.len(), 1);
        assert_eq!(parsed.render_refs[0].rendered_component_name, "Child");
    }

    #[test]
    fn builtin_calls_are_filtered() {
        let parsed = extract(
            "/src/a.ts",
            "function run() {\n  console.log('x');\n  compute();\n}\n",
        );
        assert_eq!(parsed.call_refs.len(), 1);
        assert_eq!(parsed.call_refs[0].callee_name, "compute");
    }
}

fn first_param_props(params: &[Param]) -> Option<Vec<PropSpec>> {
    let first = params.first()?;
    let type_ = first.type_.as_ref()?;
    let inner = type_.trim().trim_start_matches('{').trim_end_matches('}');
    let props: Vec<PropSpec> = inner
        .split(';')
        .flat_map(|part| part.split(','))
        .filter_map(|field| {
            let field = field.trim();
            if field.is_empty() {
                return None;
            }
            let (name_part, type_part) = field.split_once(':').unwrap_or((field, ""));
            Some(PropSpec {
                name: name_part.trim().trim_end_matches('?').to_string(),
                type_: if type_part.trim().is_empty() { None } else { Some(type_part.trim().to_string()) },
            })
        })
        .collect();
    if props.is_empty() { None } else { Some(props) }
}
