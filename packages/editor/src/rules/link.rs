use super::{NormalizeOutcome, StructuralRule};
use crate::context::EditContext;
use crate::errors::EditorResult;
use richdoc_model::{ElementKind, NodeId};

/// Links are inline: they sit between text leaves and hold text only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkRule;

impl StructuralRule for LinkRule {
    fn name(&self) -> &'static str {
        "links"
    }

    fn is_inline(&self, kind: &ElementKind) -> bool {
        kind.is_link()
    }

    fn on_normalize(&self, ctx: &mut EditContext, id: NodeId) -> EditorResult<NormalizeOutcome> {
        if !ctx.tree.kind(id).map(ElementKind::is_link).unwrap_or(false) {
            return Ok(NormalizeOutcome::Clean);
        }

        // Nested links and any other element inside a link give up their
        // children to the link
        let nested: Vec<NodeId> = ctx
            .tree
            .children(id)
            .iter()
            .copied()
            .filter(|child| !ctx.tree.is_text(*child))
            .collect();
        if !nested.is_empty() {
            for child in nested {
                ctx.tree.unwrap(child)?;
            }
            return Ok(NormalizeOutcome::Fixed);
        }

        if ctx.tree.text_content(id).is_empty() {
            ctx.remove_node(id)?;
            return Ok(NormalizeOutcome::Fixed);
        }
        Ok(NormalizeOutcome::Clean)
    }
}
