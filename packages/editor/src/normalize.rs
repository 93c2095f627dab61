//! # Normalization Engine
//!
//! Re-establishes the document invariants after every command.
//!
//! ## Passes
//!
//! A pass walks the tree bottom-up (children before parents). For each
//! element the rule pipeline runs first; if no rule repaired the node the
//! generic steps run in order:
//!
//! 1. void elements are reset to exactly one empty text child
//! 2. (a) an element without children gets an empty text leaf
//! 3. (b) a run of list items outside a list is wrapped in a bulleted list
//! 4. (c) non-item children of a list become list items
//! 5. (d) a table inside a paragraph moves out to become its sibling
//! 6. (e) other embedded blocks inside a paragraph move out the same way
//! 7. adjacent text leaves with equal marks merge; empty leaves next to
//!    another leaf are dropped
//!
//! The first fix on a node ends the work on that node for the pass. Ids
//! are stable, so the pass carries on with the remaining nodes; removed
//! nodes are skipped. Passes repeat until one finds nothing to fix.

use crate::context::EditContext;
use crate::errors::{EditorError, EditorResult};
use crate::rules::NormalizeOutcome;
use richdoc_model::{DocumentTree, ElementKind, ModelResult, Node, NodeId, TextLeaf};
use tracing::{debug, instrument};

/// Wrap every maximal run of `parent`'s children matching `matches` in a
/// new `kind` element. Returns whether anything was wrapped.
pub fn wrap_runs<F>(tree: &mut DocumentTree, parent: NodeId, matches: F, kind: ElementKind) -> ModelResult<bool>
where
    F: Fn(&DocumentTree, NodeId) -> bool,
{
    let mut wrapped = false;
    let mut index = 0;
    while index < tree.children(parent).len() {
        let child = tree.children(parent)[index];
        if !matches(tree, child) {
            index += 1;
            continue;
        }
        let mut end = index + 1;
        while end < tree.children(parent).len() && matches(tree, tree.children(parent)[end]) {
            end += 1;
        }
        tree.wrap(parent, index, end, kind.clone())?;
        wrapped = true;
        index += 1;
    }
    Ok(wrapped)
}

/// Normalize until clean. Returns the number of passes that fixed
/// something.
#[instrument(skip_all)]
pub fn normalize(ctx: &mut EditContext) -> EditorResult<usize> {
    let limit = ctx.config.max_normalize_passes;
    for pass in 0..limit {
        if !normalize_pass(ctx)? {
            ctx.ensure_selection();
            if pass > 0 {
                debug!(passes = pass, "document normalized");
            }
            return Ok(pass);
        }
    }
    Err(EditorError::NormalizationDiverged(limit))
}

/// One bottom-up pass. Returns whether anything changed.
fn normalize_pass(ctx: &mut EditContext) -> EditorResult<bool> {
    let mut dirty = false;
    for id in ctx.tree.post_order() {
        if !ctx.tree.contains(id) || ctx.tree.is_text(id) {
            continue;
        }
        if normalize_node(ctx, id)? {
            dirty = true;
        }
    }
    if normalize_root(ctx)? {
        dirty = true;
    }
    Ok(dirty)
}

fn normalize_node(ctx: &mut EditContext, id: NodeId) -> EditorResult<bool> {
    let rules = ctx.rules;
    if rules.normalize_node(ctx, id)? == NormalizeOutcome::Fixed {
        return Ok(true);
    }
    let kind = match ctx.tree.kind(id) {
        Some(kind) => kind.clone(),
        None => return Ok(false),
    };

    if rules.is_void(&kind) {
        return reset_void(ctx, id);
    }

    if ctx.tree.children(id).is_empty() {
        debug!(node = %id, kind = kind.name(), "empty element filled");
        ctx.tree.insert_text(id, 0, TextLeaf::empty())?;
        return Ok(true);
    }

    if kind.is_list_item() && !parent_is_list(ctx.tree, id) {
        let parent = ctx.tree.parent(id).unwrap_or_else(|| ctx.tree.root());
        debug!(node = %id, "orphan list items wrapped");
        wrap_runs(
            ctx.tree,
            parent,
            |tree, c| tree.kind(c).map(ElementKind::is_list_item).unwrap_or(false),
            ElementKind::BulletedList,
        )?;
        return Ok(true);
    }

    if kind.is_list() && fix_list_children(ctx, id)? {
        return Ok(true);
    }

    if kind.is_table() && parent_is_paragraph(ctx.tree, id) {
        debug!(node = %id, "table moved out of paragraph");
        ctx.lift_out(id)?;
        return Ok(true);
    }

    if kind.is_paragraph() {
        let embedded = ctx
            .tree
            .children(id)
            .iter()
            .copied()
            .find(|c| ctx.tree.kind(*c).map(ElementKind::is_embedded_block).unwrap_or(false));
        if let Some(child) = embedded {
            debug!(node = %child, "embedded block moved out of paragraph");
            ctx.lift_out(child)?;
            return Ok(true);
        }
    }

    merge_text(ctx, id)
}

fn parent_is_list(tree: &DocumentTree, id: NodeId) -> bool {
    tree.parent(id)
        .and_then(|parent| tree.kind(parent))
        .map(ElementKind::is_list)
        .unwrap_or(false)
}

fn parent_is_paragraph(tree: &DocumentTree, id: NodeId) -> bool {
    tree.parent(id)
        .and_then(|parent| tree.kind(parent))
        .map(ElementKind::is_paragraph)
        .unwrap_or(false)
}

/// Exactly one empty text child
fn reset_void(ctx: &mut EditContext, id: NodeId) -> EditorResult<bool> {
    let children = ctx.tree.children(id).to_vec();
    let clean = children.len() == 1
        && ctx
            .tree
            .leaf(children[0])
            .map(TextLeaf::is_empty)
            .unwrap_or(false);
    if clean {
        return Ok(false);
    }
    for child in children {
        ctx.remove_node(child)?;
    }
    ctx.tree.insert_text(id, 0, TextLeaf::empty())?;
    debug!(node = %id, "void children reset");
    Ok(true)
}

/// Retype element children of a list to list items and wrap text children
/// in one
fn fix_list_children(ctx: &mut EditContext, list: NodeId) -> EditorResult<bool> {
    let mut changed = false;
    for child in ctx.tree.children(list).to_vec() {
        match ctx.tree.kind(child) {
            Some(kind) if kind.is_list_item() => {}
            Some(_) => {
                ctx.tree.set_kind(child, ElementKind::ListItem)?;
                changed = true;
            }
            None => {}
        }
    }
    if wrap_runs(
        ctx.tree,
        list,
        |tree, c| tree.is_text(c),
        ElementKind::ListItem,
    )? {
        changed = true;
    }
    if changed {
        debug!(node = %list, "list children retyped to list items");
    }
    Ok(changed)
}

/// Merge equal-mark neighbours and drop redundant empty leaves
fn merge_text(ctx: &mut EditContext, id: NodeId) -> EditorResult<bool> {
    let mut changed = false;
    let mut index = 1;
    while index < ctx.tree.children(id).len() {
        let left = ctx.tree.children(id)[index - 1];
        let right = ctx.tree.children(id)[index];
        let (left_leaf, right_leaf) = match (ctx.tree.leaf(left), ctx.tree.leaf(right)) {
            (Some(l), Some(r)) => (l, r),
            _ => {
                index += 1;
                continue;
            }
        };

        if left_leaf.marks == right_leaf.marks || right_leaf.is_empty() {
            ctx.merge_leaves(left, right)?;
        } else if left_leaf.is_empty() {
            ctx.move_points(left, crate::selection::LeafPoint::new(right, 0));
            ctx.remove_node(left)?;
        } else {
            index += 1;
            continue;
        }
        changed = true;
    }
    Ok(changed)
}

/// Root children must be blocks: runs of text and inline nodes get a
/// paragraph; an empty document gets the default paragraph.
fn normalize_root(ctx: &mut EditContext) -> EditorResult<bool> {
    let root = ctx.tree.root();
    if ctx.tree.blocks().is_empty() {
        for node in Node::default_document() {
            ctx.tree.insert_subtree(root, 0, &node)?;
        }
        debug!("empty document given a paragraph");
        return Ok(true);
    }
    let rules = ctx.rules;
    let wrapped = wrap_runs(
        ctx.tree,
        root,
        |tree, c| tree.is_text(c) || tree.kind(c).map(|k| rules.is_inline(k)).unwrap_or(false),
        ElementKind::paragraph(),
    )?;
    if wrapped {
        debug!("root level text wrapped in a paragraph");
    }
    Ok(wrapped)
}

/// Normalize a detached tree with no selection
pub fn normalize_tree(
    tree: &mut DocumentTree,
    rules: &crate::rules::RulePipeline,
    config: &crate::config::EditorConfig,
) -> EditorResult<usize> {
    let mut state = crate::context::EditorState::default();
    let mut ctx = EditContext::new(tree, &mut state, rules, config);
    normalize(&mut ctx)
}
