use super::{NormalizeOutcome, StructuralRule};
use crate::context::{CommandOutcome, EditContext};
use crate::errors::EditorResult;
use crate::normalize::wrap_runs;
use crate::selection::{self, LeafPoint};
use richdoc_model::{DocumentTree, ElementKind, Node, NodeId};
use tracing::debug;

/// Keeps `table → table-row → table-cell` shape and stops Backspace,
/// Delete and Enter from merging, splitting or escaping cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRule;

/// Cell holding `id`, when that cell sits inside a table
pub fn cell_of(tree: &DocumentTree, id: NodeId) -> Option<NodeId> {
    let cell = tree.closest(id, ElementKind::is_table_cell)?;
    tree.closest(cell, ElementKind::is_table).map(|_| cell)
}

/// Whether a range between two points leaves or enters a cell
pub fn crosses_cell(tree: &DocumentTree, start: LeafPoint, end: LeafPoint) -> bool {
    let a = cell_of(tree, start.leaf);
    let b = cell_of(tree, end.leaf);
    (a.is_some() || b.is_some()) && a != b
}

fn empty_row() -> Node {
    Node::element(ElementKind::TableRow, vec![empty_cell()])
}

fn empty_cell() -> Node {
    Node::element(ElementKind::table_cell(false), vec![Node::empty_text()])
}

fn has_kind(tree: &DocumentTree, id: NodeId, predicate: fn(&ElementKind) -> bool) -> bool {
    tree.kind(id).map(predicate).unwrap_or(false)
}

fn parent_is(tree: &DocumentTree, id: NodeId, predicate: fn(&ElementKind) -> bool) -> bool {
    tree.parent(id).map(|parent| has_kind(tree, parent, predicate)).unwrap_or(false)
}

impl TableRule {
    fn normalize_table(&self, ctx: &mut EditContext, id: NodeId) -> EditorResult<NormalizeOutcome> {
        let children = ctx.tree.children(id).to_vec();

        if children.iter().any(|c| has_kind(ctx.tree, *c, ElementKind::is_table_cell)) {
            wrap_runs(
                ctx.tree,
                id,
                |tree, c| has_kind(tree, c, ElementKind::is_table_cell),
                ElementKind::TableRow,
            )?;
            return Ok(NormalizeOutcome::Fixed);
        }

        let strays: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|c| !has_kind(ctx.tree, *c, ElementKind::is_table_row))
            .collect();
        if !strays.is_empty() {
            for stray in strays {
                ctx.remove_node(stray)?;
            }
            return Ok(NormalizeOutcome::Fixed);
        }

        if children.is_empty() {
            ctx.tree.insert_subtree(id, 0, &empty_row())?;
            return Ok(NormalizeOutcome::Fixed);
        }

        let rows = children.len() as u32;
        let cols = children
            .iter()
            .map(|row| ctx.tree.children(*row).len() as u32)
            .max()
            .unwrap_or(0);
        let synced = ElementKind::Table {
            cols: Some(cols),
            rows: Some(rows),
        };
        if ctx.tree.kind(id) != Some(&synced) {
            ctx.tree.set_kind(id, synced)?;
            return Ok(NormalizeOutcome::Fixed);
        }
        Ok(NormalizeOutcome::Clean)
    }

    fn normalize_row(&self, ctx: &mut EditContext, id: NodeId) -> EditorResult<NormalizeOutcome> {
        if !parent_is(ctx.tree, id, ElementKind::is_table) {
            let parent = ctx.tree.parent(id).unwrap_or_else(|| ctx.tree.root());
            wrap_runs(
                ctx.tree,
                parent,
                |tree, c| has_kind(tree, c, ElementKind::is_table_row),
                ElementKind::Table {
                    cols: None,
                    rows: None,
                },
            )?;
            return Ok(NormalizeOutcome::Fixed);
        }

        if ctx.tree.children(id).is_empty() {
            ctx.tree.insert_subtree(id, 0, &empty_cell())?;
            return Ok(NormalizeOutcome::Fixed);
        }

        let wrapped = wrap_runs(
            ctx.tree,
            id,
            |tree, c| !has_kind(tree, c, ElementKind::is_table_cell),
            ElementKind::table_cell(false),
        )?;
        Ok(if wrapped {
            NormalizeOutcome::Fixed
        } else {
            NormalizeOutcome::Clean
        })
    }

    fn normalize_cell(&self, ctx: &mut EditContext, id: NodeId) -> EditorResult<NormalizeOutcome> {
        if !parent_is(ctx.tree, id, ElementKind::is_table_row) {
            let parent = ctx.tree.parent(id).unwrap_or_else(|| ctx.tree.root());
            wrap_runs(
                ctx.tree,
                parent,
                |tree, c| has_kind(tree, c, ElementKind::is_table_cell),
                ElementKind::TableRow,
            )?;
            return Ok(NormalizeOutcome::Fixed);
        }

        // No nested tables: table parts anywhere inside a cell dissolve,
        // all at once
        let nested: Vec<NodeId> = ctx
            .tree
            .descendants(id)
            .into_iter()
            .filter(|c| has_kind(ctx.tree, *c, ElementKind::is_table_part))
            .collect();
        if nested.is_empty() {
            return Ok(NormalizeOutcome::Clean);
        }
        for part in nested {
            ctx.tree.unwrap(part)?;
        }
        Ok(NormalizeOutcome::Fixed)
    }

    /// Shared Backspace/Delete guard
    fn guard_delete(&self, ctx: &mut EditContext, backward: bool) -> EditorResult<Option<CommandOutcome>> {
        let range = match ctx.selection() {
            Some(range) => range,
            None => return Ok(None),
        };
        let tree: &DocumentTree = &*ctx.tree;
        let rules = ctx.rules;

        if !range.is_collapsed() {
            if crosses_cell(tree, range.anchor, range.focus) {
                debug!("range delete across a table cell edge swallowed");
                return Ok(Some(CommandOutcome::Noop));
            }
            return Ok(None);
        }

        let point = range.anchor;
        if let Some(cell) = cell_of(tree, point.leaf) {
            let at_edge = if backward {
                selection::is_at_start(tree, rules, point, cell)
            } else {
                selection::is_at_end(tree, rules, point, cell)
            };
            if at_edge {
                debug!(%cell, backward, "delete at a cell edge swallowed");
                return Ok(Some(CommandOutcome::Noop));
            }
            return Ok(None);
        }

        // From outside, never merge a block into a table
        let block = match selection::block_of(tree, rules, point.leaf) {
            Some(block) => block,
            None => return Ok(None),
        };
        let neighbour = if backward {
            selection::is_at_start(tree, rules, point, block)
                .then(|| tree.text_leaves(block).first().copied())
                .flatten()
                .and_then(|first| selection::previous_leaf(tree, first))
        } else {
            selection::is_at_end(tree, rules, point, block)
                .then(|| tree.text_leaves(block).last().copied())
                .flatten()
                .and_then(|last| selection::next_leaf(tree, last))
        };
        if neighbour.and_then(|leaf| cell_of(tree, leaf)).is_some() {
            debug!(backward, "delete into a table swallowed");
            return Ok(Some(CommandOutcome::Noop));
        }
        Ok(None)
    }
}

impl StructuralRule for TableRule {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn on_normalize(&self, ctx: &mut EditContext, id: NodeId) -> EditorResult<NormalizeOutcome> {
        match ctx.tree.kind(id) {
            Some(ElementKind::Table { .. }) => self.normalize_table(ctx, id),
            Some(ElementKind::TableRow) => self.normalize_row(ctx, id),
            Some(ElementKind::TableCell { .. }) => self.normalize_cell(ctx, id),
            _ => Ok(NormalizeOutcome::Clean),
        }
    }

    fn on_delete_backward(&self, ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        self.guard_delete(ctx, true)
    }

    fn on_delete_forward(&self, ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        self.guard_delete(ctx, false)
    }

    fn on_insert_break(&self, ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        let range = match ctx.selection() {
            Some(range) => range,
            None => return Ok(None),
        };
        if cell_of(ctx.tree, range.anchor.leaf).is_some() || cell_of(ctx.tree, range.focus.leaf).is_some() {
            debug!("Enter inside a table cell swallowed");
            return Ok(Some(CommandOutcome::Noop));
        }
        Ok(None)
    }
}
