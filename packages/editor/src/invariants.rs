//! # Invariant Checker
//!
//! Read-only audit of a document snapshot against the structural
//! invariants every normalized tree satisfies. Reports all breaches with
//! the offending path instead of stopping at the first.

use richdoc_common::{walk_element, Visitor};
use richdoc_model::{Element, ElementKind, Node, Path, TextLeaf};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Invariant {
    /// 1: every element has at least one child
    NonEmpty,
    /// 2: lists hold only list items, list items sit in lists
    ListChildren,
    /// 3: table → table-row → table-cell, no tables inside cells
    TableShape,
    /// 4: no table directly inside a paragraph
    TableInParagraph,
    /// 5: no embedded block directly inside a paragraph
    BlockInParagraph,
    /// 6: void elements hold exactly one empty text leaf
    VoidChild,
    /// 7: links hold text only and never sit at the top level
    InlineLink,
    /// Top-level nodes are blocks
    RootKind,
}

impl Invariant {
    pub fn number(&self) -> Option<u8> {
        match self {
            Invariant::NonEmpty => Some(1),
            Invariant::ListChildren => Some(2),
            Invariant::TableShape => Some(3),
            Invariant::TableInParagraph => Some(4),
            Invariant::BlockInParagraph => Some(5),
            Invariant::VoidChild => Some(6),
            Invariant::InlineLink => Some(7),
            Invariant::RootKind => None,
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number() {
            Some(number) => write!(f, "invariant {}", number),
            None => write!(f, "root kind"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvariantViolation {
    pub invariant: Invariant,
    pub path: Path,
    pub message: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.invariant, self.path, self.message)
    }
}

#[derive(Default)]
struct InvariantChecker {
    /// Kinds of the enclosing elements, outermost first
    ancestors: Vec<ElementKind>,
    violations: Vec<InvariantViolation>,
}

impl InvariantChecker {
    fn report(&mut self, invariant: Invariant, path: &Path, message: String) {
        self.violations.push(InvariantViolation {
            invariant,
            path: path.clone(),
            message,
        });
    }

    fn check_children(&mut self, element: &Element, path: &Path) {
        let kind = &element.kind;
        for (index, child) in element.children.iter().enumerate() {
            let child_path = path.child(index);
            let child_kind = child.kind();
            let name = child_kind.map(ElementKind::name).unwrap_or("text");

            if kind.is_list() && !child_kind.map(ElementKind::is_list_item).unwrap_or(false) {
                self.report(Invariant::ListChildren, &child_path, format!("{} inside {}", name, kind.name()));
            }
            if kind.is_table() && !child_kind.map(ElementKind::is_table_row).unwrap_or(false) {
                self.report(Invariant::TableShape, &child_path, format!("{} inside table", name));
            }
            if kind.is_table_row() && !child_kind.map(ElementKind::is_table_cell).unwrap_or(false) {
                self.report(Invariant::TableShape, &child_path, format!("{} inside table-row", name));
            }
            if kind.is_paragraph() {
                if child_kind.map(ElementKind::is_table).unwrap_or(false) {
                    self.report(Invariant::TableInParagraph, &child_path, "table inside paragraph".to_string());
                } else if child_kind.map(ElementKind::is_embedded_block).unwrap_or(false) {
                    self.report(Invariant::BlockInParagraph, &child_path, format!("{} inside paragraph", name));
                }
            }
            if kind.is_link() && !child.is_text() {
                self.report(Invariant::InlineLink, &child_path, format!("{} inside link", name));
            }
        }
    }

    fn check_placement(&mut self, kind: &ElementKind, path: &Path) {
        let parent = self.ancestors.last().cloned();
        let parent = parent.as_ref();
        if kind.is_list_item() && !parent.map(ElementKind::is_list).unwrap_or(false) {
            self.report(Invariant::ListChildren, path, "list-item outside a list".to_string());
        }
        if kind.is_table_row() && !parent.map(ElementKind::is_table).unwrap_or(false) {
            self.report(Invariant::TableShape, path, "table-row outside a table".to_string());
        }
        if kind.is_table_cell() && !parent.map(ElementKind::is_table_row).unwrap_or(false) {
            self.report(Invariant::TableShape, path, "table-cell outside a table-row".to_string());
        }
        if kind.is_table_part() && self.ancestors.iter().any(ElementKind::is_table_cell) {
            self.report(Invariant::TableShape, path, format!("{} nested in a table-cell", kind.name()));
        }
        if kind.is_link() && parent.is_none() {
            self.report(Invariant::InlineLink, path, "link at the top level".to_string());
        }
    }
}

impl Visitor for InvariantChecker {
    fn visit_element(&mut self, element: &Element, path: &Path) {
        let kind = &element.kind;
        if element.children.is_empty() {
            self.report(Invariant::NonEmpty, path, format!("{} has no children", kind.name()));
        }
        if kind.is_void_block() {
            let single_empty = matches!(element.children.as_slice(), [Node::Text(leaf)] if leaf.is_empty());
            if !single_empty {
                self.report(
                    Invariant::VoidChild,
                    path,
                    format!("{} must hold exactly one empty text leaf", kind.name()),
                );
            }
        }
        self.check_placement(kind, path);
        self.check_children(element, path);

        self.ancestors.push(kind.clone());
        walk_element(self, element, path);
        self.ancestors.pop();
    }

    fn visit_text(&mut self, _leaf: &TextLeaf, path: &Path) {
        if self.ancestors.is_empty() {
            self.report(Invariant::RootKind, path, "text at the top level".to_string());
        }
    }
}

/// Every invariant breach in `nodes`; empty when the document is valid
pub fn check_invariants(nodes: &[Node]) -> Vec<InvariantViolation> {
    let mut checker = InvariantChecker::default();
    if nodes.is_empty() {
        checker.report(Invariant::RootKind, &Path::root(), "document has no blocks".to_string());
    }
    checker.visit_document(nodes);
    checker.violations
}
