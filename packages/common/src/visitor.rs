use richdoc_model::{Element, Node, Path, TextLeaf};

/// Visitor pattern for traversing document snapshots immutably
///
/// This trait provides default implementations that walk the entire tree.
/// Override specific visit_* methods to perform custom actions on nodes.
/// Every callback receives the node's path from the document root.
pub trait Visitor: Sized {
    fn visit_document(&mut self, nodes: &[Node]) {
        walk_document(self, nodes);
    }

    fn visit_node(&mut self, node: &Node, path: &Path) {
        walk_node(self, node, path);
    }

    fn visit_element(&mut self, element: &Element, path: &Path) {
        walk_element(self, element, path);
    }

    fn visit_text(&mut self, _leaf: &TextLeaf, _path: &Path) {
        // Leaf node, no children to walk
    }
}

/// Mutable visitor pattern for transforming document snapshots
///
/// Similar to Visitor, but provides mutable access to nodes.
pub trait VisitorMut: Sized {
    fn visit_document_mut(&mut self, nodes: &mut [Node]) {
        walk_document_mut(self, nodes);
    }

    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }

    fn visit_element_mut(&mut self, element: &mut Element) {
        walk_element_mut(self, element);
    }

    fn visit_text_mut(&mut self, _leaf: &mut TextLeaf) {
        // Leaf node, no children to walk
    }
}

// Default walk implementations for immutable visitor

pub fn walk_document<V: Visitor>(visitor: &mut V, nodes: &[Node]) {
    for (index, node) in nodes.iter().enumerate() {
        visitor.visit_node(node, &Path::new(vec![index]));
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node, path: &Path) {
    match node {
        Node::Text(leaf) => visitor.visit_text(leaf, path),
        Node::Element(element) => visitor.visit_element(element, path),
    }
}

pub fn walk_element<V: Visitor>(visitor: &mut V, element: &Element, path: &Path) {
    for (index, child) in element.children.iter().enumerate() {
        visitor.visit_node(child, &path.child(index));
    }
}

// Default walk implementations for mutable visitor

pub fn walk_document_mut<V: VisitorMut>(visitor: &mut V, nodes: &mut [Node]) {
    for node in nodes {
        visitor.visit_node_mut(node);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    match node {
        Node::Text(leaf) => visitor.visit_text_mut(leaf),
        Node::Element(element) => visitor.visit_element_mut(element),
    }
}

pub fn walk_element_mut<V: VisitorMut>(visitor: &mut V, element: &mut Element) {
    for child in &mut element.children {
        visitor.visit_node_mut(child);
    }
}
