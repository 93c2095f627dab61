//! # Editing Operations
//!
//! Generic Backspace, Delete, Enter and typing. The rule pipeline gets the
//! first word on Backspace, Delete and Enter; what is here runs only when no
//! rule took the edit over.

use crate::context::{CommandOutcome, EditContext};
use crate::errors::{EditorError, EditorResult};
use crate::rules::crosses_cell;
use crate::selection::{self, LeafPoint};
use richdoc_model::{ElementKind, ModelError, NodeId, TextLeaf};

/// Split `block` at `point`, splitting every element between the point's
/// leaf and `block`. Returns the new block holding the text after the
/// point. Both halves keep at least one text leaf.
pub(crate) fn split_block(ctx: &mut EditContext, point: LeafPoint, block: NodeId) -> EditorResult<NodeId> {
    let marks = ctx
        .tree
        .leaf(point.leaf)
        .map(|leaf| leaf.marks.clone())
        .unwrap_or_default();
    let (mut parent, mut at) = ctx.insertion_index(point)?;
    loop {
        let tail = ctx.tree.split_element(parent, at)?;
        if parent == block {
            for half in [block, tail] {
                if ctx.tree.text_leaves(half).is_empty() {
                    ctx.tree
                        .insert_text(half, 0, TextLeaf::with_marks("", marks.clone()))?;
                }
            }
            return Ok(tail);
        }
        at = ctx
            .tree
            .index_in_parent(parent)
            .ok_or(ModelError::NodeNotFound(parent))?
            + 1;
        parent = ctx.tree.parent(parent).ok_or(ModelError::RootNode)?;
    }
}

/// Delete everything between two points (in document order) and merge the
/// blocks they sat in. Leaves the caret at `start`. A range that leaves or
/// enters a table cell only collapses.
pub(crate) fn delete_between(ctx: &mut EditContext, start: LeafPoint, end: LeafPoint) -> EditorResult<()> {
    ctx.set_caret(start);
    if crosses_cell(ctx.tree, start, end) {
        return Ok(());
    }
    if start.leaf == end.leaf {
        return ctx.delete_chars(start.leaf, start.offset, end.offset);
    }

    let order = ctx.tree.descendants(ctx.tree.root());
    let first = order.iter().position(|id| *id == start.leaf);
    let last = order.iter().position(|id| *id == end.leaf);
    let (first, last) = match (first, last) {
        (Some(first), Some(last)) if first < last => (first, last),
        _ => {
            return Err(EditorError::InvalidSelection(
                "range edges are out of document order".to_string(),
            ))
        }
    };

    let mut doomed: Vec<NodeId> = Vec::new();
    for id in &order[first + 1..last] {
        if ctx.tree.is_ancestor(*id, end.leaf) {
            continue;
        }
        if doomed.iter().any(|d| ctx.tree.is_ancestor(*d, *id)) {
            continue;
        }
        doomed.push(*id);
    }

    ctx.delete_chars(end.leaf, 0, end.offset)?;
    let len = ctx.char_len(start.leaf);
    ctx.delete_chars(start.leaf, start.offset, len)?;
    for id in doomed {
        ctx.remove_node(id)?;
    }

    let start_block = selection::block_of(ctx.tree, ctx.rules, start.leaf);
    let end_block = selection::block_of(ctx.tree, ctx.rules, end.leaf);
    if let (Some(a), Some(b)) = (start_block, end_block) {
        if a != b && !ctx.tree.is_ancestor(a, b) && !ctx.tree.is_ancestor(b, a) {
            ctx.merge_blocks(a, b)?;
        }
    }
    Ok(())
}

/// Delete the expanded selection, if any. Returns whether it was expanded.
fn delete_selection(ctx: &mut EditContext) -> EditorResult<bool> {
    match ctx.edges()? {
        Some((start, end)) if start != end => {
            delete_between(ctx, start, end)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Closest editable leaf (and its length) with text before `point` in
/// `block`
fn char_before(ctx: &EditContext, point: LeafPoint, block: NodeId) -> Option<(NodeId, usize)> {
    if point.offset > 0 {
        return Some((point.leaf, point.offset));
    }
    let leaves = ctx.tree.text_leaves(block);
    let index = leaves.iter().position(|leaf| *leaf == point.leaf)?;
    leaves[..index]
        .iter()
        .rev()
        .filter(|leaf| !selection::in_void(ctx.tree, ctx.rules, **leaf))
        .map(|leaf| (*leaf, ctx.char_len(*leaf)))
        .find(|(_, len)| *len > 0)
}

/// Closest editable leaf with text after `point` in `block`, and the
/// offset of that next char
fn char_after(ctx: &EditContext, point: LeafPoint, block: NodeId) -> Option<(NodeId, usize)> {
    if point.offset < ctx.char_len(point.leaf) {
        return Some((point.leaf, point.offset));
    }
    let leaves = ctx.tree.text_leaves(block);
    let index = leaves.iter().position(|leaf| *leaf == point.leaf)?;
    leaves[index + 1..]
        .iter()
        .filter(|leaf| !selection::in_void(ctx.tree, ctx.rules, **leaf))
        .find(|leaf| ctx.char_len(**leaf) > 0)
        .map(|leaf| (*leaf, 0))
}

/// Remove the void element holding `leaf`, if there is one
fn remove_void_at(ctx: &mut EditContext, leaf: NodeId) -> EditorResult<bool> {
    let rules = ctx.rules;
    match ctx.tree.closest(leaf, |kind| rules.is_void(kind)) {
        Some(void) => {
            ctx.remove_node(void)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn delete_backward(ctx: &mut EditContext) -> EditorResult<CommandOutcome> {
    let rules = ctx.rules;
    if let Some(outcome) = rules.delete_backward(ctx)? {
        return Ok(outcome);
    }
    if delete_selection(ctx)? {
        return Ok(CommandOutcome::Applied);
    }
    let point = match ctx.caret() {
        Some(point) => point,
        None => return Ok(CommandOutcome::Noop),
    };
    let block = match selection::block_of(ctx.tree, ctx.rules, point.leaf) {
        Some(block) => block,
        None => return Ok(CommandOutcome::Noop),
    };

    if let Some((leaf, offset)) = char_before(ctx, point, block) {
        ctx.delete_chars(leaf, offset - 1, offset)?;
        ctx.set_caret(LeafPoint::new(leaf, offset - 1));
        return Ok(CommandOutcome::Applied);
    }

    // At the start of the block
    let first = match ctx.tree.text_leaves(block).first().copied() {
        Some(first) => first,
        None => return Ok(CommandOutcome::Noop),
    };
    let previous = match selection::previous_leaf(ctx.tree, first) {
        Some(previous) => previous,
        None => return Ok(CommandOutcome::Noop),
    };
    if remove_void_at(ctx, previous)? {
        return Ok(CommandOutcome::Applied);
    }
    match selection::block_of(ctx.tree, ctx.rules, previous) {
        Some(target) if target != block && !ctx.tree.is_ancestor(target, block) && !ctx.tree.is_ancestor(block, target) => {
            ctx.merge_blocks(target, block)?;
            Ok(CommandOutcome::Applied)
        }
        _ => Ok(CommandOutcome::Noop),
    }
}

pub fn delete_forward(ctx: &mut EditContext) -> EditorResult<CommandOutcome> {
    let rules = ctx.rules;
    if let Some(outcome) = rules.delete_forward(ctx)? {
        return Ok(outcome);
    }
    if delete_selection(ctx)? {
        return Ok(CommandOutcome::Applied);
    }
    let point = match ctx.caret() {
        Some(point) => point,
        None => return Ok(CommandOutcome::Noop),
    };
    let block = match selection::block_of(ctx.tree, ctx.rules, point.leaf) {
        Some(block) => block,
        None => return Ok(CommandOutcome::Noop),
    };

    if let Some((leaf, offset)) = char_after(ctx, point, block) {
        ctx.delete_chars(leaf, offset, offset + 1)?;
        return Ok(CommandOutcome::Applied);
    }

    // At the end of the block
    let last = match ctx.tree.text_leaves(block).last().copied() {
        Some(last) => last,
        None => return Ok(CommandOutcome::Noop),
    };
    let next = match selection::next_leaf(ctx.tree, last) {
        Some(next) => next,
        None => return Ok(CommandOutcome::Noop),
    };
    if remove_void_at(ctx, next)? {
        return Ok(CommandOutcome::Applied);
    }
    match selection::block_of(ctx.tree, ctx.rules, next) {
        Some(target) if target != block && !ctx.tree.is_ancestor(target, block) && !ctx.tree.is_ancestor(block, target) => {
            ctx.merge_blocks(block, target)?;
            Ok(CommandOutcome::Applied)
        }
        _ => Ok(CommandOutcome::Noop),
    }
}

pub fn insert_break(ctx: &mut EditContext) -> EditorResult<CommandOutcome> {
    let rules = ctx.rules;
    if let Some(outcome) = rules.insert_break(ctx)? {
        return Ok(outcome);
    }
    delete_selection(ctx)?;
    let point = match ctx.caret() {
        Some(point) => point,
        None => return Ok(CommandOutcome::Noop),
    };
    let block = match selection::block_of(ctx.tree, ctx.rules, point.leaf) {
        Some(block) => block,
        None => return Ok(CommandOutcome::Noop),
    };
    let heading = matches!(ctx.tree.kind(block), Some(ElementKind::Heading { .. }));

    let tail = split_block(ctx, point, block)?;
    if heading && ctx.tree.text_content(tail).is_empty() {
        ctx.tree.set_kind(tail, ElementKind::paragraph())?;
    }
    if let Some(start) = selection::start_of(ctx.tree, ctx.rules, tail) {
        ctx.set_caret(start);
    }
    Ok(CommandOutcome::Applied)
}

/// Type `text` at the caret, replacing an expanded selection. Pending
/// marks that differ from the caret leaf's marks get a leaf of their own.
pub fn insert_text(ctx: &mut EditContext, text: &str) -> EditorResult<CommandOutcome> {
    ctx.state.list.reset();
    if text.is_empty() {
        return Ok(CommandOutcome::Noop);
    }
    delete_selection(ctx)?;
    let point = match ctx.caret() {
        Some(point) => point,
        None => return Ok(CommandOutcome::Noop),
    };
    let pending = ctx.state.pending_marks.take();
    let current = ctx
        .tree
        .leaf(point.leaf)
        .map(|leaf| leaf.marks.clone())
        .unwrap_or_default();

    match pending {
        Some(marks) if marks != current => {
            if ctx.char_len(point.leaf) == 0 {
                if let Some(leaf) = ctx.tree.leaf_mut(point.leaf) {
                    leaf.marks = marks;
                }
                ctx.insert_chars(point.leaf, 0, text)?;
            } else {
                let (parent, index) = ctx.insertion_index(point)?;
                let leaf = ctx.tree.insert_text(parent, index, TextLeaf::with_marks(text, marks))?;
                ctx.set_caret(LeafPoint::new(leaf, text.chars().count()));
            }
        }
        _ => ctx.insert_chars(point.leaf, point.offset, text)?,
    }
    Ok(CommandOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::context::EditorState;
    use crate::normalize::normalize;
    use crate::rules::RulePipeline;
    use crate::selection::LeafRange;
    use richdoc_model::{DocumentTree, Mark, Marks, Node, Path};

    struct Fixture {
        tree: DocumentTree,
        state: EditorState,
        rules: RulePipeline,
        config: EditorConfig,
    }

    impl Fixture {
        fn new(nodes: &[Node], anchor: (Vec<usize>, usize), focus: (Vec<usize>, usize)) -> Self {
            let tree = DocumentTree::from_nodes(nodes);
            let anchor = LeafPoint::new(tree.node_at_path(&Path::new(anchor.0)).unwrap(), anchor.1);
            let focus = LeafPoint::new(tree.node_at_path(&Path::new(focus.0)).unwrap(), focus.1);
            Self {
                tree,
                state: EditorState {
                    selection: Some(LeafRange::new(anchor, focus)),
                    ..EditorState::default()
                },
                rules: RulePipeline::standard(),
                config: EditorConfig::default(),
            }
        }

        fn caret(nodes: &[Node], path: Vec<usize>, offset: usize) -> Self {
            Self::new(nodes, (path.clone(), offset), (path, offset))
        }

        fn apply<F>(&mut self, f: F) -> CommandOutcome
        where
            F: FnOnce(&mut EditContext) -> EditorResult<CommandOutcome>,
        {
            let mut ctx = EditContext::new(&mut self.tree, &mut self.state, &self.rules, &self.config);
            let outcome = f(&mut ctx).unwrap();
            normalize(&mut ctx).unwrap();
            outcome
        }

        fn nodes(&self) -> Vec<Node> {
            self.tree.to_nodes()
        }
    }

    #[test]
    fn test_backspace_deletes_char() {
        let mut fx = Fixture::caret(&[Node::paragraph("abc")], vec![0, 0], 2);
        fx.apply(delete_backward);
        assert_eq!(fx.nodes(), vec![Node::paragraph("ac")]);
    }

    #[test]
    fn test_backspace_merges_blocks() {
        let mut fx = Fixture::caret(&[Node::paragraph("ab"), Node::paragraph("cd")], vec![1, 0], 0);
        fx.apply(delete_backward);
        assert_eq!(fx.nodes(), vec![Node::paragraph("abcd")]);
        let caret = fx.state.selection.unwrap().anchor;
        assert_eq!(caret.offset, 2);
    }

    #[test]
    fn test_backspace_at_document_start_is_noop() {
        let mut fx = Fixture::caret(&[Node::paragraph("ab")], vec![0, 0], 0);
        assert_eq!(fx.apply(delete_backward), CommandOutcome::Noop);
    }

    #[test]
    fn test_delete_forward_removes_following_void() {
        let image = Node::element(
            ElementKind::Image {
                url: "a.png".to_string(),
                alt: None,
                caption: None,
                width: None,
                height: None,
            },
            vec![Node::empty_text()],
        );
        let mut fx = Fixture::caret(&[Node::paragraph("ab"), image, Node::paragraph("c")], vec![0, 0], 2);
        fx.apply(delete_forward);
        assert_eq!(fx.nodes(), vec![Node::paragraph("ab"), Node::paragraph("c")]);
    }

    #[test]
    fn test_enter_splits_paragraph() {
        let mut fx = Fixture::caret(&[Node::paragraph("abcd")], vec![0, 0], 2);
        fx.apply(insert_break);
        assert_eq!(fx.nodes(), vec![Node::paragraph("ab"), Node::paragraph("cd")]);
        let caret = fx.state.selection.unwrap().anchor;
        assert_eq!(fx.tree.path_of(caret.leaf).unwrap(), Path::new(vec![1, 0]));
        assert_eq!(caret.offset, 0);
    }

    #[test]
    fn test_enter_at_heading_end_makes_paragraph() {
        let heading = Node::element(ElementKind::heading(1), vec![Node::text("Title")]);
        let mut fx = Fixture::caret(&[heading.clone()], vec![0, 0], 5);
        fx.apply(insert_break);
        assert_eq!(fx.nodes(), vec![heading, Node::paragraph("")]);
    }

    #[test]
    fn test_range_delete_merges_edge_blocks() {
        let mut fx = Fixture::new(
            &[Node::paragraph("abc"), Node::paragraph("mid"), Node::paragraph("xyz")],
            (vec![0, 0], 1),
            (vec![2, 0], 2),
        );
        fx.apply(delete_backward);
        assert_eq!(fx.nodes(), vec![Node::paragraph("az")]);
    }

    #[test]
    fn test_typing_uses_pending_marks() {
        let mut fx = Fixture::caret(&[Node::paragraph("ab")], vec![0, 0], 1);
        fx.state.pending_marks = Some(Marks::default().with(&Mark::Bold));
        fx.apply(|ctx| insert_text(ctx, "X"));
        let bold = Node::Text(TextLeaf::with_marks("X", Marks::default().with(&Mark::Bold)));
        assert_eq!(
            fx.nodes(),
            vec![Node::element(
                ElementKind::paragraph(),
                vec![Node::text("a"), bold, Node::text("b")]
            )]
        );
        assert!(fx.state.pending_marks.is_none());
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut fx = Fixture::new(&[Node::paragraph("hello")], (vec![0, 0], 1), (vec![0, 0], 4));
        fx.apply(|ctx| insert_text(ctx, "ipp"));
        assert_eq!(fx.nodes(), vec![Node::paragraph("hippo")]);
    }
}
