use super::table::cell_of;
use super::StructuralRule;
use crate::context::{CommandOutcome, EditContext};
use crate::errors::EditorResult;
use crate::selection::{self, LeafPoint};
use richdoc_model::{DocumentTree, ElementKind, ModelError, Node, NodeId};
use tracing::debug;

/// Enter and Backspace inside list items.
///
/// Enter in a non-empty item adds an empty item after it and leaves the
/// text alone. Enter in an empty item adds another empty item until `list_exit_after` of them were made in a row, then the
/// next Enter turns the item into a paragraph outside the list. Backspace
/// at the start of an empty item does the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListRule;

/// List item holding `id` whose parent is a list. Items inside a table
/// cell are left to the table rule.
fn list_item_of(tree: &DocumentTree, id: NodeId) -> Option<NodeId> {
    let item = tree.closest(id, ElementKind::is_list_item)?;
    let parent = tree.parent(item)?;
    if !tree.kind(parent).map(ElementKind::is_list).unwrap_or(false) {
        return None;
    }
    if cell_of(tree, item).is_some() {
        return None;
    }
    Some(item)
}

/// Turn a list item into a paragraph and move it out of its list
fn exit_list(ctx: &mut EditContext, item: NodeId) -> EditorResult<()> {
    ctx.tree.set_kind(item, ElementKind::paragraph())?;
    ctx.lift_out(item)?;
    ctx.state.list.reset();
    debug!(%item, "left list");
    Ok(())
}

/// Insert an empty list item right after `item` and put the caret in it
fn add_empty_item_after(ctx: &mut EditContext, item: NodeId) -> EditorResult<()> {
    let list = ctx.tree.parent(item).ok_or(ModelError::RootNode)?;
    let index = ctx
        .tree
        .index_in_parent(item)
        .ok_or(ModelError::NodeNotFound(item))?;
    let created = ctx.tree.insert_subtree(
        list,
        index + 1,
        &Node::element(ElementKind::ListItem, vec![Node::empty_text()]),
    )?;
    let leaf = ctx
        .tree
        .child(created, 0)
        .ok_or(ModelError::NodeNotFound(created))?;
    ctx.set_caret(LeafPoint::new(leaf, 0));
    Ok(())
}

impl StructuralRule for ListRule {
    fn name(&self) -> &'static str {
        "lists"
    }

    fn on_insert_break(&self, ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        let item = match ctx.caret().and_then(|point| list_item_of(ctx.tree, point.leaf)) {
            Some(item) => item,
            None => {
                ctx.state.list.reset();
                return Ok(None);
            }
        };
        if !ctx.tree.text_content(item).is_empty() {
            add_empty_item_after(ctx, item)?;
            ctx.state.list.reset();
            return Ok(Some(CommandOutcome::Applied));
        }

        if ctx.state.list.empty_enter_count < ctx.config.list_exit_after {
            add_empty_item_after(ctx, item)?;
            ctx.state.list.empty_enter_count += 1;
            debug!(count = ctx.state.list.empty_enter_count, "empty list item added");
            return Ok(Some(CommandOutcome::Applied));
        }

        exit_list(ctx, item)?;
        Ok(Some(CommandOutcome::Applied))
    }

    fn on_delete_backward(&self, ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        let point = match ctx.caret() {
            Some(point) => point,
            None => return Ok(None),
        };
        let item = match list_item_of(ctx.tree, point.leaf) {
            Some(item) => item,
            None => {
                ctx.state.list.reset();
                return Ok(None);
            }
        };
        if selection::is_at_start(ctx.tree, ctx.rules, point, item) && ctx.tree.text_content(item).is_empty() {
            exit_list(ctx, item)?;
            return Ok(Some(CommandOutcome::Applied));
        }
        Ok(None)
    }
}
