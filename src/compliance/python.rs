//! Tree-sitter based analyzer for Python sources.
//!
//! The analyzer walks the syntax tree once and reports:
//!
//! | Node | Checks |
//! |------|--------|
//! | `function_definition` | name, parameter names and annotations, return annotation, docstring example |
//! | `assignment`, `augmented_assignment` | target names |
//! | `for_statement`, `for_in_clause` | loop target names |
//! | `named_expression` | walrus target name |
//! | `as_pattern`, `except_clause` | `with ... as`, `except ... as` and `case ... as` names |
//! | `lambda` | parameter names |
//!
//! A tree containing any error node is reported as [`ParseFailure::Syntax`]
//! rather than analyzed partially.

use tree_sitter::{Node, Parser};

use super::{Location, NamingPolicy, ParseFailure, RuleKind, SourceAnalyzer, Violation};
use crate::config::GatekeeperConfig;

/// Parameters that never need an annotation.
const IMPLICIT_PARAMETERS: [&str; 2] = ["self", "cls"];

/// Marker of an interactive example inside a docstring.
const DOCTEST_PROMPT: &str = ">>>";

/// Python analyzer backed by `tree-sitter-python`.
#[derive(Debug, Clone, Default)]
pub struct PythonAnalyzer {
    naming: NamingPolicy,
}

impl PythonAnalyzer {
    pub fn new(naming: NamingPolicy) -> Self {
        PythonAnalyzer { naming }
    }

    pub fn from_config(config: &GatekeeperConfig) -> Self {
        Self::new(NamingPolicy::from_config(config))
    }
}

impl SourceAnalyzer for PythonAnalyzer {
    fn analyze(&self, source: &str) -> Result<Vec<Violation>, ParseFailure> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|err| ParseFailure::LanguageUnavailable(err.to_string()))?;
        let tree = parser.parse(source, None).ok_or(ParseFailure::NoTree)?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseFailure::Syntax(first_error_location(root)));
        }

        let mut visitor = Visitor {
            source: source.as_bytes(),
            naming: &self.naming,
            violations: Vec::new(),
        };
        visitor.walk(root);

        let mut violations = visitor.violations;
        violations.sort_by_key(|v| (v.location, v.rule));
        Ok(violations)
    }
}

struct Visitor<'a> {
    source: &'a [u8],
    naming: &'a NamingPolicy,
    violations: Vec<Violation>,
}

impl<'a> Visitor<'a> {
    fn walk(&mut self, root: Node<'_>) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "function_definition" => self.check_function(node),
                "assignment" | "augmented_assignment" | "for_statement" | "for_in_clause" => {
                    if let Some(left) = node.child_by_field_name("left") {
                        self.check_target(left);
                    }
                }
                "named_expression" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        self.check_target(name);
                    }
                }
                "as_pattern" => {
                    if let Some(alias) = node.child_by_field_name("alias") {
                        self.check_target(alias);
                    }
                }
                "except_clause" => {
                    if let Some(alias) = except_alias(node) {
                        self.check_target(alias);
                    }
                }
                "lambda" => {
                    if let Some(parameters) = node.child_by_field_name("parameters") {
                        self.check_parameters("lambda", parameters, false);
                    }
                }
                _ => {}
            }

            let mut cursor = node.walk();
            let mut children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            children.reverse();
            stack.extend(children);
        }
    }

    fn check_function(&mut self, node: Node<'_>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.text(name_node);
        let location = location_of(name_node);

        if !self.naming.is_descriptive(name) {
            self.report(
                RuleKind::NonDescriptiveName,
                location,
                format!("function name `{}` is not descriptive", name),
            );
        }

        if let Some(parameters) = node.child_by_field_name("parameters") {
            self.check_parameters(&format!("function `{}`", name), parameters, true);
        }

        if name != "__init__" && node.child_by_field_name("return_type").is_none() {
            self.report(
                RuleKind::MissingAnnotations,
                location,
                format!("return annotation missing for function `{}`", name),
            );
        }

        if !is_dunder(name) && !self.has_doctest(node) {
            self.report(
                RuleKind::MissingDoctestExample,
                location,
                format!("docstring example missing for function `{}`", name),
            );
        }
    }

    /// Lambdas cannot carry annotations, so `annotations` is off for them.
    fn check_parameters(&mut self, owner: &str, parameters: Node<'_>, annotations: bool) {
        let mut cursor = parameters.walk();
        let params: Vec<Node<'_>> = parameters.named_children(&mut cursor).collect();
        for param in params {
            self.check_parameter(owner, param, annotations);
        }
    }

    fn check_parameter(&mut self, owner: &str, param: Node<'_>, annotations: bool) {
        let (name_node, annotated) = match param.kind() {
            "identifier" => (Some(param), false),
            "default_parameter" => (param.child_by_field_name("name"), false),
            "typed_default_parameter" => (param.child_by_field_name("name"), true),
            "typed_parameter" => (param.named_child(0).and_then(splat_identifier), true),
            "list_splat_pattern" | "dictionary_splat_pattern" => (splat_identifier(param), false),
            // `*`, `/` separators and comments
            _ => return,
        };
        let Some(name_node) = name_node else {
            return;
        };
        let name = self.text(name_node);
        if IMPLICIT_PARAMETERS.contains(&name) {
            return;
        }
        let location = location_of(name_node);

        if annotations && !annotated {
            self.report(
                RuleKind::MissingAnnotations,
                location,
                format!("argument `{}` of {} has no type annotation", name, owner),
            );
        }
        if !self.naming.is_descriptive(name) {
            self.report(
                RuleKind::NonDescriptiveName,
                location,
                format!("argument `{}` of {} is not descriptive", name, owner),
            );
        }
    }

    fn check_target(&mut self, target: Node<'_>) {
        let mut names = Vec::new();
        collect_target_identifiers(target, &mut names);
        for name_node in names {
            let name = self.text(name_node);
            if !self.naming.is_descriptive(name) {
                self.report(
                    RuleKind::NonDescriptiveName,
                    location_of(name_node),
                    format!("variable name `{}` is not descriptive", name),
                );
            }
        }
    }

    /// The first statement of the body must be a string containing a prompt.
    fn has_doctest(&self, function: Node<'_>) -> bool {
        let Some(body) = function.child_by_field_name("body") else {
            return false;
        };
        let mut cursor = body.walk();
        let first_statement = body
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment");

        first_statement
            .filter(|stmt| stmt.kind() == "expression_statement")
            .and_then(|stmt| stmt.named_child(0))
            .filter(|expr| expr.kind() == "string")
            .is_some_and(|docstring| self.text(docstring).contains(DOCTEST_PROMPT))
    }

    fn text(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.source).unwrap_or_default()
    }

    fn report(&mut self, rule: RuleKind, location: Location, message: String) {
        self.violations.push(Violation {
            rule,
            location,
            message,
        });
    }
}

fn location_of(node: Node<'_>) -> Location {
    let point = node.start_position();
    Location {
        line: point.row + 1,
        column: point.column + 1,
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Resolves `*args` / `**kwargs` patterns to their identifier.
fn splat_identifier(node: Node<'_>) -> Option<Node<'_>> {
    if node.kind() == "identifier" {
        return Some(node);
    }
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "identifier");
    found
}

/// The name bound by `except E as name` when the grammar does not wrap it in
/// an `as_pattern`.
fn except_alias(node: Node<'_>) -> Option<Node<'_>> {
    if let Some(alias) = node.child_by_field_name("alias") {
        return Some(alias);
    }
    let mut cursor = node.walk();
    let alias = node
        .children(&mut cursor)
        .skip_while(|child| child.kind() != "as")
        .nth(1);
    alias
}

/// Identifiers bound by an assignment or loop target. Attribute and subscript
/// targets bind nothing new and are skipped.
fn collect_target_identifiers<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    match node.kind() {
        "identifier" => out.push(node),
        "as_pattern_target" if node.named_child_count() == 0 => out.push(node),
        "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern" | "tuple"
        | "list" | "parenthesized_expression" | "as_pattern_target" => {
            let mut cursor = node.walk();
            let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
            for child in children {
                collect_target_identifiers(child, out);
            }
        }
        _ => {}
    }
}

fn first_error_location(root: Node<'_>) -> Location {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return location_of(node);
        }
        let mut cursor = node.walk();
        let mut children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        children.reverse();
        stack.extend(children);
    }
    location_of(root)
}
