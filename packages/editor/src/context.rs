//! # Edit Context
//!
//! Everything a command, rule hook or normalization step may touch during
//! one command: the tree, the session state (selection, pending marks,
//! list counter), the rule pipeline and the config.
//!
//! Tree edits that move characters between leaves or drop leaves go through
//! the helpers here so that the selection follows the text it points at.

use crate::config::EditorConfig;
use crate::errors::{EditorError, EditorResult};
use crate::rules::RulePipeline;
use crate::selection::{self, LeafPoint, LeafRange};
use richdoc_model::{BlockFormat, DocumentTree, ElementKind, Mark, Marks, ModelError, NodeId, TextLeaf};
use serde::Serialize;

/// Outcome of a command or of a rule hook that took over a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command ran; the tree or the session state may have changed
    Applied,
    /// Nothing to do
    Noop,
    /// Refused, with the reason logged
    Rejected(String),
}

/// Counter behind "double Enter leaves the list"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListState {
    /// Consecutive empty list items created by Enter
    pub empty_enter_count: u32,
}

impl ListState {
    pub fn reset(&mut self) {
        self.empty_enter_count = 0;
    }
}

/// Per-session editing state that lives next to the tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub selection: Option<LeafRange>,
    /// Marks toggled on a collapsed caret, applied by the next text insert
    pub pending_marks: Option<Marks>,
    pub list: ListState,
}

pub struct EditContext<'a> {
    pub tree: &'a mut DocumentTree,
    pub state: &'a mut EditorState,
    pub rules: &'a RulePipeline,
    pub config: &'a EditorConfig,
}

impl<'a> EditContext<'a> {
    pub fn new(
        tree: &'a mut DocumentTree,
        state: &'a mut EditorState,
        rules: &'a RulePipeline,
        config: &'a EditorConfig,
    ) -> Self {
        Self {
            tree,
            state,
            rules,
            config,
        }
    }

    pub fn query(&self) -> Query<'_> {
        Query {
            tree: &*self.tree,
            state: &*self.state,
            rules: self.rules,
        }
    }

    // ---- Selection ----------------------------------------------------

    pub fn selection(&self) -> Option<LeafRange> {
        self.state.selection
    }

    /// The caret, when the selection is collapsed
    pub fn caret(&self) -> Option<LeafPoint> {
        self.state
            .selection
            .filter(LeafRange::is_collapsed)
            .map(|range| range.anchor)
    }

    pub fn set_selection(&mut self, selection: Option<LeafRange>) {
        self.state.selection = selection;
    }

    pub fn set_caret(&mut self, point: LeafPoint) {
        self.state.selection = Some(LeafRange::collapsed(point));
    }

    /// Selection edges in document order
    pub fn edges(&self) -> EditorResult<Option<(LeafPoint, LeafPoint)>> {
        match self.state.selection {
            Some(range) => Ok(Some(selection::edges(self.tree, range)?)),
            None => Ok(None),
        }
    }

    fn for_each_point<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut LeafPoint),
    {
        if let Some(range) = self.state.selection.as_mut() {
            f(&mut range.anchor);
            f(&mut range.focus);
        }
    }

    /// Re-seat a selection whose leaves are gone at the document start and
    /// clamp offsets that ran past the end of their leaf. A deselected
    /// session stays deselected.
    pub fn ensure_selection(&mut self) {
        let tree: &DocumentTree = &*self.tree;
        let rules = self.rules;
        let valid = |point: &LeafPoint| {
            tree.leaf(point.leaf).is_some() && !selection::in_void(tree, rules, point.leaf)
        };
        let range = match self.state.selection.as_mut() {
            Some(range) => range,
            None => return,
        };
        if valid(&range.anchor) && valid(&range.focus) {
            for point in [&mut range.anchor, &mut range.focus] {
                let len = tree.leaf(point.leaf).map(TextLeaf::char_len).unwrap_or(0);
                point.offset = point.offset.min(len);
            }
            return;
        }
        self.state.selection = selection::start_of(tree, rules, tree.root()).map(LeafRange::collapsed);
    }

    // ---- Text edits ---------------------------------------------------

    fn leaf_text(&self, leaf: NodeId) -> EditorResult<&TextLeaf> {
        self.tree
            .leaf(leaf)
            .ok_or_else(|| EditorError::Model(ModelError::NotText(leaf)))
    }

    fn leaf_text_mut(&mut self, leaf: NodeId) -> EditorResult<&mut TextLeaf> {
        self.tree
            .leaf_mut(leaf)
            .ok_or_else(|| EditorError::Model(ModelError::NotText(leaf)))
    }

    pub fn char_len(&self, leaf: NodeId) -> usize {
        self.tree.leaf(leaf).map(TextLeaf::char_len).unwrap_or(0)
    }

    /// Split a text leaf at a char offset. The tail becomes a new leaf
    /// right after it with the same marks; points past the split follow
    /// the tail. Returns `None` when the offset is at either edge.
    pub fn split_leaf(&mut self, leaf: NodeId, offset: usize) -> EditorResult<Option<NodeId>> {
        let current = self.leaf_text(leaf)?;
        if offset == 0 || offset >= current.char_len() {
            return Ok(None);
        }
        let byte = current.byte_index(offset);
        let tail = TextLeaf::with_marks(&current.text[byte..], current.marks.clone());
        self.leaf_text_mut(leaf)?.text.truncate(byte);

        let parent = self.tree.parent(leaf).ok_or(ModelError::RootNode)?;
        let index = self
            .tree
            .index_in_parent(leaf)
            .ok_or(ModelError::NodeNotFound(leaf))?;
        let right = self.tree.insert_text(parent, index + 1, tail)?;
        self.for_each_point(|point| {
            if point.leaf == leaf && point.offset > offset {
                *point = LeafPoint::new(right, point.offset - offset);
            }
        });
        Ok(Some(right))
    }

    /// Where new siblings go when inserting at `point`: the parent of its
    /// leaf and the child index right after the text before the point.
    /// Splits the leaf when the point is inside it.
    pub fn insertion_index(&mut self, point: LeafPoint) -> EditorResult<(NodeId, usize)> {
        let parent = self
            .tree
            .parent(point.leaf)
            .ok_or(ModelError::RootNode)?;
        let index = self
            .tree
            .index_in_parent(point.leaf)
            .ok_or(ModelError::NodeNotFound(point.leaf))?;
        if point.offset == 0 {
            return Ok((parent, index));
        }
        self.split_leaf(point.leaf, point.offset)?;
        Ok((parent, index + 1))
    }

    /// Append `right`'s text to `left` (keeping `left`'s marks) and remove
    /// `right`
    pub fn merge_leaves(&mut self, left: NodeId, right: NodeId) -> EditorResult<()> {
        let shift = self.leaf_text(left)?.char_len();
        let text = self.leaf_text(right)?.text.clone();
        self.leaf_text_mut(left)?.text.push_str(&text);
        self.for_each_point(|point| {
            if point.leaf == right {
                *point = LeafPoint::new(left, point.offset + shift);
            }
        });
        self.tree.remove(right)?;
        Ok(())
    }

    pub fn insert_chars(&mut self, leaf: NodeId, offset: usize, text: &str) -> EditorResult<()> {
        let inserted = text.chars().count();
        let current = self.leaf_text_mut(leaf)?;
        let byte = current.byte_index(offset);
        current.text.insert_str(byte, text);
        self.for_each_point(|point| {
            if point.leaf == leaf && point.offset >= offset {
                point.offset += inserted;
            }
        });
        Ok(())
    }

    /// Delete the chars in `start..end` of one leaf
    pub fn delete_chars(&mut self, leaf: NodeId, start: usize, end: usize) -> EditorResult<()> {
        if end <= start {
            return Ok(());
        }
        let current = self.leaf_text_mut(leaf)?;
        let from = current.byte_index(start);
        let to = current.byte_index(end);
        current.text.replace_range(from..to, "");
        let removed = end - start;
        self.for_each_point(|point| {
            if point.leaf != leaf || point.offset <= start {
                return;
            }
            point.offset = if point.offset <= end {
                start
            } else {
                point.offset - removed
            };
        });
        Ok(())
    }

    /// Move every point sitting on `from` to `to`
    pub fn move_points(&mut self, from: NodeId, to: LeafPoint) {
        self.for_each_point(|point| {
            if point.leaf == from {
                *point = to;
            }
        });
    }

    // ---- Structural edits ---------------------------------------------

    /// Remove a node and its subtree. Points inside it move to the end of
    /// the closest editable leaf before it, else the start of the one after
    /// it; with neither, they go stale and [`Self::ensure_selection`]
    /// re-seats them once normalization is done.
    pub fn remove_node(&mut self, id: NodeId) -> EditorResult<()> {
        if let Some(range) = self.state.selection {
            let tree: &DocumentTree = &*self.tree;
            let inside = |leaf: NodeId| leaf == id || tree.is_ancestor(id, leaf);
            if inside(range.anchor.leaf) || inside(range.focus.leaf) {
                if let Some(target) = relocation_target(tree, self.rules, id) {
                    let moved = |point: LeafPoint| if inside(point.leaf) { target } else { point };
                    self.state.selection = Some(LeafRange::new(moved(range.anchor), moved(range.focus)));
                }
            }
        }
        self.tree.remove(id)?;
        Ok(())
    }

    /// Move `id` out of its parent into the grandparent, keeping document
    /// order. A parent left with other children is split around the node;
    /// a parent left empty is removed.
    pub fn lift_out(&mut self, id: NodeId) -> EditorResult<()> {
        let parent = self.tree.parent(id).ok_or(ModelError::RootNode)?;
        let grandparent = self
            .tree
            .parent(parent)
            .ok_or(ModelError::RootNode)?;
        let parent_index = self
            .tree
            .index_in_parent(parent)
            .ok_or(ModelError::NodeNotFound(parent))?;
        let index = self
            .tree
            .index_in_parent(id)
            .ok_or(ModelError::NodeNotFound(id))?;
        let len = self.tree.children(parent).len();

        if len == 1 {
            self.tree.move_node(id, grandparent, parent_index)?;
            self.tree.remove(parent)?;
        } else if index == 0 {
            self.tree.move_node(id, grandparent, parent_index)?;
        } else if index == len - 1 {
            self.tree.move_node(id, grandparent, parent_index + 1)?;
        } else {
            self.tree.split_element(parent, index + 1)?;
            self.tree.move_node(id, grandparent, parent_index + 1)?;
        }
        Ok(())
    }

    /// Remove `id` if it has no children, then its ancestors that end up
    /// empty the same way
    pub fn remove_empty_ancestors(&mut self, id: NodeId) -> EditorResult<()> {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.tree.root() || !self.tree.children(node).is_empty() || self.tree.is_text(node) {
                break;
            }
            current = self.tree.parent(node);
            self.tree.remove(node)?;
        }
        Ok(())
    }

    /// Move all children of `from` to the end of `into`, then remove `from`
    /// and any ancestors it leaves empty
    pub fn merge_blocks(&mut self, into: NodeId, from: NodeId) -> EditorResult<()> {
        let children: Vec<NodeId> = self.tree.children(from).to_vec();
        for child in children {
            let end = self.tree.children(into).len();
            self.tree.move_node(child, into, end)?;
        }
        self.remove_empty_ancestors(from)
    }
}

fn relocation_target(tree: &DocumentTree, rules: &RulePipeline, id: NodeId) -> Option<LeafPoint> {
    let path = tree.path_of(id).ok()?;
    let outside: Vec<NodeId> = selection::editable_leaves(tree, rules)
        .into_iter()
        .filter(|leaf| *leaf != id && !tree.is_ancestor(id, *leaf))
        .collect();
    let before = outside
        .iter()
        .filter(|leaf| tree.path_of(**leaf).map(|p| p < path).unwrap_or(false))
        .last();
    if let Some(leaf) = before {
        let len = tree.leaf(*leaf).map(TextLeaf::char_len).unwrap_or(0);
        return Some(LeafPoint::new(*leaf, len));
    }
    outside
        .iter()
        .find(|leaf| tree.path_of(**leaf).map(|p| p > path).unwrap_or(false))
        .map(|leaf| LeafPoint::new(*leaf, 0))
}

/// Read-only view for the activity queries a toolbar asks between
/// commands
pub struct Query<'a> {
    pub tree: &'a DocumentTree,
    pub state: &'a EditorState,
    pub rules: &'a RulePipeline,
}

impl<'a> Query<'a> {
    /// Whether every text leaf the selection touches carries `mark`. On a
    /// collapsed caret, pending marks win over the leaf's own.
    pub fn is_mark_active(&self, mark: &Mark) -> EditorResult<bool> {
        let range = match self.state.selection {
            Some(range) => range,
            None => return Ok(false),
        };
        if range.is_collapsed() {
            if let Some(pending) = &self.state.pending_marks {
                return Ok(pending.has(mark));
            }
            return Ok(self
                .tree
                .leaf(range.anchor.leaf)
                .map(|leaf| leaf.marks.has(mark))
                .unwrap_or(false));
        }

        let range = selection::unhang(self.tree, self.rules, range)?;
        let (start, end) = selection::edges(self.tree, range)?;
        let leaves: Vec<&TextLeaf> = selection::covered_leaves(self.tree, self.rules, start, end)
            .into_iter()
            .filter_map(|id| self.tree.leaf(id))
            .collect();
        let mut non_empty = leaves.iter().filter(|leaf| !leaf.is_empty()).peekable();
        if non_empty.peek().is_none() {
            return Ok(leaves.iter().all(|leaf| leaf.marks.has(mark)) && !leaves.is_empty());
        }
        Ok(non_empty.all(|leaf| leaf.marks.has(mark)))
    }

    /// Whether every block the selection touches is of `format`; list
    /// formats look at the closest enclosing list instead
    pub fn is_block_active(&self, format: &BlockFormat) -> EditorResult<bool> {
        let range = match self.state.selection {
            Some(range) => selection::unhang(self.tree, self.rules, range)?,
            None => return Ok(false),
        };
        let (start, end) = selection::edges(self.tree, range)?;
        let blocks = selection::blocks_in(self.tree, self.rules, start, end);
        if blocks.is_empty() {
            return Ok(false);
        }
        Ok(blocks.iter().all(|block| {
            let candidate = if format.is_list() {
                self.tree.closest(*block, ElementKind::is_list)
            } else {
                Some(*block)
            };
            candidate
                .and_then(|id| self.tree.kind(id))
                .map(|kind| format.matches(kind))
                .unwrap_or(false)
        }))
    }

    /// Link enclosing the anchor, the focus, or any leaf in between
    pub fn active_links(&self) -> EditorResult<Vec<NodeId>> {
        let range = match self.state.selection {
            Some(range) => range,
            None => return Ok(Vec::new()),
        };
        let (start, end) = selection::edges(self.tree, range)?;
        let mut leaves = selection::leaves_between(self.tree, self.rules, start, end);
        if leaves.is_empty() {
            leaves.push(start.leaf);
        }
        let mut links = Vec::new();
        for leaf in leaves {
            if let Some(link) = self.tree.closest(leaf, ElementKind::is_link) {
                if !links.contains(&link) {
                    links.push(link);
                }
            }
        }
        Ok(links)
    }

    pub fn is_link_active(&self) -> EditorResult<bool> {
        Ok(!self.active_links()?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richdoc_model::Node;

    struct Fixture {
        tree: DocumentTree,
        state: EditorState,
        rules: RulePipeline,
        config: EditorConfig,
    }

    impl Fixture {
        fn new(nodes: &[Node]) -> Self {
            Self {
                tree: DocumentTree::from_nodes(nodes),
                state: EditorState::default(),
                rules: RulePipeline::standard(),
                config: EditorConfig::default(),
            }
        }

        fn ctx(&mut self) -> EditContext<'_> {
            EditContext::new(&mut self.tree, &mut self.state, &self.rules, &self.config)
        }
    }

    #[test]
    fn test_split_leaf_moves_trailing_points() {
        let mut fx = Fixture::new(&[Node::paragraph("hello")]);
        let leaf = fx.tree.text_leaves(fx.tree.root())[0];
        let mut ctx = fx.ctx();
        ctx.set_selection(Some(LeafRange::new(LeafPoint::new(leaf, 2), LeafPoint::new(leaf, 4))));
        let right = ctx.split_leaf(leaf, 2).unwrap().unwrap();
        assert_eq!(ctx.tree.leaf(leaf).unwrap().text, "he");
        assert_eq!(ctx.tree.leaf(right).unwrap().text, "llo");
        let range = ctx.selection().unwrap();
        assert_eq!(range.anchor, LeafPoint::new(leaf, 2));
        assert_eq!(range.focus, LeafPoint::new(right, 2));
        assert_eq!(ctx.split_leaf(leaf, 2).unwrap(), None);
    }

    #[test]
    fn test_merge_shifts_points() {
        let mut fx = Fixture::new(&[Node::element(
            ElementKind::paragraph(),
            vec![Node::text("ab"), Node::text("cd")],
        )]);
        let leaves = fx.tree.text_leaves(fx.tree.root());
        let mut ctx = fx.ctx();
        ctx.set_caret(LeafPoint::new(leaves[1], 1));
        ctx.merge_leaves(leaves[0], leaves[1]).unwrap();
        assert_eq!(ctx.tree.leaf(leaves[0]).unwrap().text, "abcd");
        assert_eq!(ctx.caret(), Some(LeafPoint::new(leaves[0], 3)));
    }

    #[test]
    fn test_delete_chars_clamps_points() {
        let mut fx = Fixture::new(&[Node::paragraph("héllo")]);
        let leaf = fx.tree.text_leaves(fx.tree.root())[0];
        let mut ctx = fx.ctx();
        ctx.set_selection(Some(LeafRange::new(LeafPoint::new(leaf, 2), LeafPoint::new(leaf, 5))));
        ctx.delete_chars(leaf, 1, 3).unwrap();
        assert_eq!(ctx.tree.leaf(leaf).unwrap().text, "hlo");
        let range = ctx.selection().unwrap();
        assert_eq!(range.anchor.offset, 1);
        assert_eq!(range.focus.offset, 3);
    }

    #[test]
    fn test_remove_node_relocates_to_previous_leaf() {
        let mut fx = Fixture::new(&[Node::paragraph("one"), Node::paragraph("two")]);
        let leaves = fx.tree.text_leaves(fx.tree.root());
        let second = fx.tree.blocks()[1];
        let mut ctx = fx.ctx();
        ctx.set_caret(LeafPoint::new(leaves[1], 2));
        ctx.remove_node(second).unwrap();
        assert_eq!(ctx.caret(), Some(LeafPoint::new(leaves[0], 3)));
    }

    #[test]
    fn test_lift_out_splits_parent() {
        let item = |text: &str| Node::element(ElementKind::ListItem, vec![Node::text(text)]);
        let mut fx = Fixture::new(&[Node::element(
            ElementKind::BulletedList,
            vec![item("a"), item("b"), item("c")],
        )]);
        let list = fx.tree.blocks()[0];
        let middle = fx.tree.children(list)[1];
        let mut ctx = fx.ctx();
        ctx.lift_out(middle).unwrap();
        assert_eq!(ctx.tree.blocks().len(), 3);
        assert_eq!(ctx.tree.blocks()[1], middle);
        assert_eq!(ctx.tree.children(list).len(), 1);
    }

    #[test]
    fn test_lift_out_removes_emptied_parent() {
        let mut fx = Fixture::new(&[Node::element(
            ElementKind::NumberedList,
            vec![Node::element(ElementKind::ListItem, vec![Node::text("a")])],
        )]);
        let list = fx.tree.blocks()[0];
        let item = fx.tree.children(list)[0];
        let mut ctx = fx.ctx();
        ctx.lift_out(item).unwrap();
        assert_eq!(ctx.tree.blocks(), &[item]);
        assert!(!ctx.tree.contains(list));
    }

    #[test]
    fn test_pending_marks_drive_collapsed_activity() {
        let mut fx = Fixture::new(&[Node::paragraph("a")]);
        let leaf = fx.tree.text_leaves(fx.tree.root())[0];
        fx.state.selection = Some(LeafRange::collapsed(LeafPoint::new(leaf, 1)));
        fx.state.pending_marks = Some(Marks::default().with(&Mark::Italic));
        let ctx = fx.ctx();
        assert!(ctx.query().is_mark_active(&Mark::Italic).unwrap());
        assert!(!ctx.query().is_mark_active(&Mark::Bold).unwrap());
    }
}
