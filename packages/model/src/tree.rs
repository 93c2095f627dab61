//! # Arena Document Tree
//!
//! Nodes live in a slot arena addressed by [`NodeId`]. Each slot stores its
//! parent and an ordered child list, so parent lookup is O(1) and
//! wrap/unwrap/move are O(children) with no path recomputation. Ids are
//! never reused after removal, which keeps stale ids detectable.
//!
//! A hidden root element owns the top-level blocks.

use crate::error::{ModelError, ModelResult};
use crate::kind::ElementKind;
use crate::node::{Element, Node, TextLeaf};
use crate::path::Path;
use std::fmt;

/// Stable identifier of a node inside one [`DocumentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payload of an arena slot
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Root,
    Text(TextLeaf),
    Element(ElementKind),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct DocumentTree {
    slots: Vec<Option<Slot>>,
    root: NodeId,
    live: usize,
}

impl DocumentTree {
    /// Empty tree: a root with no blocks
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Slot {
                data: NodeData::Root,
                parent: None,
                children: Vec::new(),
            })],
            root: NodeId(0),
            live: 0,
        }
    }

    /// Build an arena from an owned snapshot. No validation happens here;
    /// run repair/normalization afterwards.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut tree = Self::new();
        let root = tree.root;
        for node in nodes {
            let id = tree.alloc_subtree(node, Some(root));
            tree.slot_unchecked_mut(root).children.push(id);
        }
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root excluded
    pub fn node_count(&self) -> usize {
        self.live
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.get(id.0).map(Option::is_some).unwrap_or(false)
    }

    fn slot(&self, id: NodeId) -> ModelResult<&Slot> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(ModelError::NodeNotFound(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> ModelResult<&mut Slot> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ModelError::NodeNotFound(id))
    }

    // Only for ids allocated by this tree in the same call
    fn slot_unchecked_mut(&mut self, id: NodeId) -> &mut Slot {
        match self.slots[id.0].as_mut() {
            Some(slot) => slot,
            None => unreachable!("slot {} freed during allocation", id),
        }
    }

    fn alloc(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Slot {
            data,
            parent,
            children: Vec::new(),
        }));
        self.live += 1;
        id
    }

    fn alloc_subtree(&mut self, node: &Node, parent: Option<NodeId>) -> NodeId {
        match node {
            Node::Text(leaf) => self.alloc(NodeData::Text(leaf.clone()), parent),
            Node::Element(element) => {
                let id = self.alloc(NodeData::Element(element.kind.clone()), parent);
                let children: Vec<NodeId> = element
                    .children
                    .iter()
                    .map(|child| self.alloc_subtree(child, Some(id)))
                    .collect();
                self.slot_unchecked_mut(id).children = children;
                id
            }
        }
    }

    // ---- Queries ------------------------------------------------------

    pub fn data(&self, id: NodeId) -> ModelResult<&NodeData> {
        Ok(&self.slot(id)?.data)
    }

    pub fn kind(&self, id: NodeId) -> Option<&ElementKind> {
        match self.slot(id).ok()?.data {
            NodeData::Element(ref kind) => Some(kind),
            _ => None,
        }
    }

    pub fn kind_mut(&mut self, id: NodeId) -> Option<&mut ElementKind> {
        match self.slot_mut(id).ok()?.data {
            NodeData::Element(ref mut kind) => Some(kind),
            _ => None,
        }
    }

    pub fn leaf(&self, id: NodeId) -> Option<&TextLeaf> {
        match self.slot(id).ok()?.data {
            NodeData::Text(ref leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn leaf_mut(&mut self, id: NodeId) -> Option<&mut TextLeaf> {
        match self.slot_mut(id).ok()?.data {
            NodeData::Text(ref mut leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.leaf(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).ok()?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|slot| slot.children.as_slice()).unwrap_or(&[])
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Top-level blocks
    pub fn blocks(&self) -> &[NodeId] {
        self.children(self.root)
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index_in_parent(id)?;
        if index == 0 {
            return None;
        }
        self.child(self.parent(id)?, index - 1)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index_in_parent(id)?;
        self.child(self.parent(id)?, index + 1)
    }

    /// Ancestors from the parent upwards, root excluded
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == self.root {
                break;
            }
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// Strict ancestry test
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Nearest ancestor (or the node itself) matching `predicate`
    pub fn closest<F>(&self, id: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&ElementKind) -> bool,
    {
        if self.kind(id).map(&predicate).unwrap_or(false) {
            return Some(id);
        }
        self.ancestors(id)
            .into_iter()
            .find(|ancestor| self.kind(*ancestor).map(&predicate).unwrap_or(false))
    }

    /// The top-level block containing `id` (or `id` itself)
    pub fn top_block_of(&self, id: NodeId) -> Option<NodeId> {
        if self.parent(id) == Some(self.root) {
            return Some(id);
        }
        self.ancestors(id).last().copied()
    }

    pub fn path_of(&self, id: NodeId) -> ModelResult<Path> {
        let mut indices = Vec::new();
        let mut current = id;
        while current != self.root {
            let parent = self.slot(current)?.parent.ok_or(ModelError::NodeNotFound(current))?;
            let index = self
                .children(parent)
                .iter()
                .position(|child| *child == current)
                .ok_or(ModelError::NodeNotFound(current))?;
            indices.push(index);
            current = parent;
        }
        indices.reverse();
        Ok(Path::new(indices))
    }

    /// Resolve a path in O(depth)
    pub fn node_at_path(&self, path: &Path) -> ModelResult<NodeId> {
        let mut current = self.root;
        for index in path.indices() {
            current = self
                .child(current, *index)
                .ok_or_else(|| ModelError::PathNotFound(path.clone()))?;
        }
        Ok(current)
    }

    /// All nodes under `id` in pre-order, `id` excluded
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Every node of the document bottom-up (children before parents,
    /// siblings left to right), root excluded
    pub fn post_order(&self) -> Vec<NodeId> {
        fn visit(tree: &DocumentTree, id: NodeId, out: &mut Vec<NodeId>) {
            for child in tree.children(id) {
                visit(tree, *child, out);
            }
            out.push(id);
        }
        let mut out = Vec::with_capacity(self.live);
        for block in self.blocks() {
            visit(self, *block, &mut out);
        }
        out
    }

    /// Text leaves under `id` in document order
    pub fn text_leaves(&self, id: NodeId) -> Vec<NodeId> {
        if self.is_text(id) {
            return vec![id];
        }
        self.descendants(id)
            .into_iter()
            .filter(|node| self.is_text(*node))
            .collect()
    }

    /// Concatenated text under `id`
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_leaves(id)
            .into_iter()
            .filter_map(|leaf| self.leaf(leaf))
            .map(|leaf| leaf.text.as_str())
            .collect()
    }

    // ---- Snapshots ----------------------------------------------------

    pub fn to_node(&self, id: NodeId) -> ModelResult<Node> {
        let slot = self.slot(id)?;
        match &slot.data {
            NodeData::Root => Err(ModelError::RootNode),
            NodeData::Text(leaf) => Ok(Node::Text(leaf.clone())),
            NodeData::Element(kind) => {
                let children = slot
                    .children
                    .iter()
                    .map(|child| self.to_node(*child))
                    .collect::<ModelResult<Vec<_>>>()?;
                Ok(Node::Element(Element {
                    kind: kind.clone(),
                    children,
                }))
            }
        }
    }

    /// Immutable snapshot of the whole document
    pub fn to_nodes(&self) -> Vec<Node> {
        self.blocks()
            .iter()
            .filter_map(|block| self.to_node(*block).ok())
            .collect()
    }

    // ---- Mutations ----------------------------------------------------

    fn check_container(&self, parent: NodeId) -> ModelResult<()> {
        match self.slot(parent)?.data {
            NodeData::Text(_) => Err(ModelError::NotAnElement(parent)),
            _ => Ok(()),
        }
    }

    pub fn insert_node(&mut self, parent: NodeId, index: usize, data: NodeData) -> ModelResult<NodeId> {
        self.check_container(parent)?;
        let len = self.children(parent).len();
        if index > len {
            return Err(ModelError::IndexOutOfBounds { index, len });
        }
        let id = self.alloc(data, Some(parent));
        self.slot_mut(parent)?.children.insert(index, id);
        Ok(id)
    }

    pub fn insert_text(&mut self, parent: NodeId, index: usize, leaf: TextLeaf) -> ModelResult<NodeId> {
        self.insert_node(parent, index, NodeData::Text(leaf))
    }

    pub fn insert_subtree(&mut self, parent: NodeId, index: usize, node: &Node) -> ModelResult<NodeId> {
        self.check_container(parent)?;
        let len = self.children(parent).len();
        if index > len {
            return Err(ModelError::IndexOutOfBounds { index, len });
        }
        let id = self.alloc_subtree(node, Some(parent));
        self.slot_mut(parent)?.children.insert(index, id);
        Ok(id)
    }

    fn detach(&mut self, id: NodeId) -> ModelResult<(NodeId, usize)> {
        if id == self.root {
            return Err(ModelError::RootNode);
        }
        let parent = self.slot(id)?.parent.ok_or(ModelError::NodeNotFound(id))?;
        let index = self
            .children(parent)
            .iter()
            .position(|child| *child == id)
            .ok_or(ModelError::NodeNotFound(id))?;
        self.slot_mut(parent)?.children.remove(index);
        self.slot_mut(id)?.parent = None;
        Ok((parent, index))
    }

    /// Remove `id` and its whole subtree
    pub fn remove(&mut self, id: NodeId) -> ModelResult<()> {
        self.detach(id)?;
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in doomed {
            if let Some(slot) = self.slots.get_mut(node.0) {
                if slot.take().is_some() {
                    self.live -= 1;
                }
            }
        }
        Ok(())
    }

    /// Move `id` under `new_parent` at `index` (clamped to the child count
    /// after detaching)
    pub fn move_node(&mut self, id: NodeId, new_parent: NodeId, index: usize) -> ModelResult<()> {
        if id == new_parent || self.is_ancestor(id, new_parent) {
            return Err(ModelError::CycleDetected);
        }
        self.check_container(new_parent)?;
        self.detach(id)?;
        let children = &mut self.slot_mut(new_parent)?.children;
        let index = index.min(children.len());
        children.insert(index, id);
        self.slot_mut(id)?.parent = Some(new_parent);
        Ok(())
    }

    /// Replace `id` by its children in its parent. Returns the lifted
    /// children.
    pub fn unwrap(&mut self, id: NodeId) -> ModelResult<Vec<NodeId>> {
        let (parent, index) = self.detach(id)?;
        let children = std::mem::take(&mut self.slot_mut(id)?.children);
        for child in &children {
            self.slot_mut(*child)?.parent = Some(parent);
        }
        let siblings = &mut self.slot_mut(parent)?.children;
        siblings.splice(index..index, children.iter().copied());
        self.slots[id.0] = None;
        self.live -= 1;
        Ok(children)
    }

    /// Wrap `parent`'s children in `start..end` into a new element of `kind`
    pub fn wrap(&mut self, parent: NodeId, start: usize, end: usize, kind: ElementKind) -> ModelResult<NodeId> {
        self.check_container(parent)?;
        let len = self.children(parent).len();
        if start > end || end > len {
            return Err(ModelError::IndexOutOfBounds { index: end, len });
        }
        let wrapper = self.alloc(NodeData::Element(kind), Some(parent));
        let moved: Vec<NodeId> = self
            .slot_mut(parent)?
            .children
            .splice(start..end, std::iter::once(wrapper))
            .collect();
        for child in &moved {
            self.slot_mut(*child)?.parent = Some(wrapper);
        }
        self.slot_mut(wrapper)?.children = moved;
        Ok(wrapper)
    }

    /// Split `id` after its first `at` children: the rest move into a new
    /// sibling of the same kind placed right after `id`.
    pub fn split_element(&mut self, id: NodeId, at: usize) -> ModelResult<NodeId> {
        let kind = self.kind(id).cloned().ok_or(ModelError::NotAnElement(id))?;
        let parent = self.parent(id).ok_or(ModelError::RootNode)?;
        let index = self.index_in_parent(id).ok_or(ModelError::NodeNotFound(id))?;
        let len = self.children(id).len();
        if at > len {
            return Err(ModelError::IndexOutOfBounds { index: at, len });
        }
        let sibling = self.insert_node(parent, index + 1, NodeData::Element(kind))?;
        let tail: Vec<NodeId> = self.slot_mut(id)?.children.drain(at..).collect();
        for child in &tail {
            self.slot_mut(*child)?.parent = Some(sibling);
        }
        self.slot_mut(sibling)?.children = tail;
        Ok(sibling)
    }

    pub fn set_kind(&mut self, id: NodeId, kind: ElementKind) -> ModelResult<()> {
        match &mut self.slot_mut(id)?.data {
            NodeData::Element(current) => {
                *current = kind;
                Ok(())
            }
            _ => Err(ModelError::NotAnElement(id)),
        }
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}
