//! # Validation/Repair
//!
//! Turns any externally supplied JSON value into a document that satisfies
//! every structural invariant. Repair never fails: the worst case is the
//! default document (one empty paragraph).
//!
//! ```text
//! JSON value → coerce (typed nodes) → sanitize (table shape) → normalize
//! ```

use crate::config::EditorConfig;
use crate::normalize::normalize_tree;
use crate::rules::RulePipeline;
use richdoc_common::{walk_element_mut, VisitorMut};
use richdoc_model::{DocumentTree, Element, ElementKind, Node, TextLeaf};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// A JSON value read as a node. Elements of an unknown type keep their
/// repaired children so the caller can splice them in place.
enum Coerced {
    Node(Node),
    Unknown(Vec<Node>),
}

/// Read a raw JSON document into typed nodes.
///
/// Anything that is not a non-empty array becomes the default document.
/// Bare strings become text. Unknown element types turn into paragraphs at
/// the top level and are unwrapped below it. Values that are neither text
/// nor element become empty text leaves.
pub fn coerce_document(value: Value) -> Vec<Node> {
    let items = match value {
        Value::Array(items) if !items.is_empty() => items,
        other => {
            debug!(kind = json_kind(&other), "document replaced by the default document");
            return Node::default_document();
        }
    };
    items.into_iter().map(coerce_block).collect()
}

fn coerce_block(value: Value) -> Node {
    match coerce_node(value) {
        Coerced::Node(node @ Node::Element(_)) => node,
        Coerced::Node(text @ Node::Text(_)) => Node::element(ElementKind::paragraph(), vec![text]),
        Coerced::Unknown(children) => Node::element(ElementKind::paragraph(), children),
    }
}

fn coerce_node(value: Value) -> Coerced {
    match value {
        Value::String(text) => Coerced::Node(Node::text(text)),
        Value::Object(object) => coerce_object(object),
        other => {
            debug!(kind = json_kind(&other), "unrecognized node replaced by empty text");
            Coerced::Node(Node::empty_text())
        }
    }
}

fn coerce_object(mut object: Map<String, Value>) -> Coerced {
    let is_element = object.contains_key("type") || object.contains_key("children");
    if !is_element {
        return Coerced::Node(Node::Text(coerce_leaf(object)));
    }

    let children = match object.remove("children") {
        Some(Value::Array(items)) => coerce_children(items),
        Some(Value::String(text)) => vec![Node::text(text)],
        _ => Vec::new(),
    };
    match serde_json::from_value::<ElementKind>(Value::Object(object)) {
        Ok(ElementKind::Heading { level, align }) => Coerced::Node(Node::Element(Element {
            kind: ElementKind::Heading {
                level: level.clamp(1, 6),
                align,
            },
            children,
        })),
        Ok(kind) => Coerced::Node(Node::Element(Element { kind, children })),
        Err(err) => {
            debug!(%err, "element with unknown type unwrapped");
            Coerced::Unknown(children)
        }
    }
}

fn coerce_children(items: Vec<Value>) -> Vec<Node> {
    let mut children = Vec::with_capacity(items.len());
    for item in items {
        match coerce_node(item) {
            Coerced::Node(node) => children.push(node),
            Coerced::Unknown(nodes) => children.extend(nodes),
        }
    }
    children
}

/// Text leaf from an object; marks that do not parse are dropped
fn coerce_leaf(object: Map<String, Value>) -> TextLeaf {
    let text = match object.get("text") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    };
    match serde_json::from_value::<TextLeaf>(Value::Object(object)) {
        Ok(leaf) => leaf,
        Err(_) => TextLeaf::new(text),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Table-shape and non-empty-children repair over a typed snapshot
#[derive(Debug, Default)]
pub struct Sanitizer {
    /// Number of nodes dropped or flattened
    pub fixes: usize,
    cell_depth: usize,
}

impl Sanitizer {
    fn keep_only(&mut self, element: &mut Element, keep: fn(&ElementKind) -> bool) {
        let before = element.children.len();
        element
            .children
            .retain(|child| child.kind().map(keep).unwrap_or(false));
        self.fixes += before - element.children.len();
    }

    /// Replace nested table parts by their contents
    fn flatten_table_parts(&mut self, children: Vec<Node>) -> Vec<Node> {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Node::Element(element) if element.kind.is_table_part() => {
                    self.fixes += 1;
                    flat.extend(self.flatten_table_parts(element.children));
                }
                other => flat.push(other),
            }
        }
        flat
    }
}

impl VisitorMut for Sanitizer {
    fn visit_element_mut(&mut self, element: &mut Element) {
        match element.kind {
            ElementKind::Table { .. } => self.keep_only(element, ElementKind::is_table_row),
            ElementKind::TableRow => self.keep_only(element, ElementKind::is_table_cell),
            _ => {}
        }
        if self.cell_depth > 0 || element.kind.is_table_cell() {
            let children = std::mem::take(&mut element.children);
            element.children = self.flatten_table_parts(children);
        }

        let in_cell = element.kind.is_table_cell();
        if in_cell {
            self.cell_depth += 1;
        }
        walk_element_mut(self, element);
        if in_cell {
            self.cell_depth -= 1;
        }

        // Empty tables and rows are rebuilt by normalization
        let shaped_later = matches!(element.kind, ElementKind::Table { .. } | ElementKind::TableRow);
        if element.children.is_empty() && !shaped_later {
            element.children.push(Node::empty_text());
            self.fixes += 1;
        }
    }
}

/// Sanitize a typed snapshot in place. Returns the number of fixes.
pub fn sanitize(nodes: &mut Vec<Node>) -> usize {
    if nodes.is_empty() {
        *nodes = Node::default_document();
        return 1;
    }
    let mut sanitizer = Sanitizer::default();
    sanitizer.visit_document_mut(nodes);
    sanitizer.fixes
}

/// Repair an arbitrary JSON value into a valid, normalized document
pub fn repair(value: Value, rules: &RulePipeline, config: &EditorConfig) -> Vec<Node> {
    let mut nodes = coerce_document(value);
    let fixes = sanitize(&mut nodes);
    if fixes > 0 {
        debug!(fixes, "document sanitized");
    }
    repair_nodes(&nodes, rules, config)
}

/// Normalize already typed nodes, falling back to the default document
pub fn repair_nodes(nodes: &[Node], rules: &RulePipeline, config: &EditorConfig) -> Vec<Node> {
    let mut tree = DocumentTree::from_nodes(nodes);
    match normalize_tree(&mut tree, rules, config) {
        Ok(_) => tree.to_nodes(),
        Err(err) => {
            warn!(%err, "repair fell back to the default document");
            Node::default_document()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repaired(value: Value) -> Vec<Node> {
        repair(value, &RulePipeline::standard(), &EditorConfig::default())
    }

    #[test]
    fn test_non_array_input_gives_default_document() {
        for value in [json!(null), json!([]), json!("text"), json!({"type": "paragraph"}), json!(42)] {
            assert_eq!(repaired(value), Node::default_document());
        }
    }

    #[test]
    fn test_bare_strings_become_text() {
        let nodes = repaired(json!(["hello", {"type": "paragraph", "children": ["a", {"text": "b"}]}]));
        assert_eq!(nodes, vec![Node::paragraph("hello"), Node::paragraph("ab")]);
    }

    #[test]
    fn test_unknown_types() {
        let nodes = repaired(json!([
            {"type": "blockquote", "children": [{"text": "quoted"}]},
            {"type": "paragraph", "children": [
                {"type": "mention", "children": [{"text": "@bob"}]},
                {"text": " hi"}
            ]}
        ]));
        assert_eq!(nodes, vec![Node::paragraph("quoted"), Node::paragraph("@bob hi")]);
    }

    #[test]
    fn test_junk_children_become_empty_text() {
        let nodes = repaired(json!([{"type": "paragraph", "children": [null, 7, true]}]));
        assert_eq!(nodes, vec![Node::paragraph("")]);

        let nodes = repaired(json!([{"type": "heading", "level": 2}]));
        assert_eq!(
            nodes,
            vec![Node::element(ElementKind::heading(2), vec![Node::empty_text()])]
        );
    }

    #[test]
    fn test_bad_marks_are_dropped() {
        let nodes = repaired(json!([{"type": "paragraph", "children": [{"text": "x", "bold": "yes"}]}]));
        assert_eq!(nodes, vec![Node::paragraph("x")]);
    }

    #[test]
    fn test_table_without_rows_gets_a_cell() {
        let mut nodes = coerce_document(json!([{"type": "table", "children": [{"type": "paragraph", "children": [{"text": "x"}]}]}]));
        sanitize(&mut nodes);
        assert_eq!(
            nodes,
            vec![Node::element(ElementKind::Table { cols: None, rows: None }, vec![])]
        );

        let nodes = repair_nodes(&nodes, &RulePipeline::standard(), &EditorConfig::default());
        assert_eq!(
            nodes,
            vec![Node::element(
                ElementKind::Table {
                    cols: Some(1),
                    rows: Some(1)
                },
                vec![Node::element(
                    ElementKind::TableRow,
                    vec![Node::element(ElementKind::table_cell(false), vec![Node::empty_text()])]
                )]
            )]
        );
    }

    #[test]
    fn test_nested_table_in_cell_is_flattened() {
        let nodes = repaired(json!([{"type": "table", "children": [
            {"type": "table-row", "children": [
                {"type": "table-cell", "children": [
                    {"type": "table", "children": [
                        {"type": "table-row", "children": [
                            {"type": "table-cell", "children": [{"text": "inner"}]}
                        ]}
                    ]}
                ]}
            ]}
        ]}]));
        let cell = &nodes[0].children()[0].children()[0];
        assert_eq!(cell.children(), &[Node::text("inner")]);
    }
}
