//! # Structural Behavior Rules
//!
//! Each feature (tables, images, file attachments, links, database records,
//! lists) contributes a rule object. Rules answer "is this kind void / inline"
//! and may take over normalization of a node or the Backspace, Delete and
//! Enter edits before the generic behavior runs.
//!
//! ## Composition
//!
//! Rules are registered as an explicit pipeline. Every registration wraps
//! the previous ones, so hooks are consulted from the last registered rule
//! to the first. The first rule that handles an event wins and the generic
//! behavior is skipped.
//!
//! ```text
//! standard: tables → images → file-attachments → links → database-records → lists
//! hooks:    lists → database-records → links → file-attachments → images → tables
//! ```

mod link;
mod list;
mod table;
mod void;

pub use link::LinkRule;
pub use list::ListRule;
pub use table::{cell_of, crosses_cell, TableRule};
pub use void::{DatabaseRecordRule, FileAttachmentRule, ImageRule};

use crate::context::{CommandOutcome, EditContext};
use crate::errors::EditorResult;
use richdoc_model::{ElementKind, NodeId};

/// What a normalization hook did to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// Nothing to repair here
    Clean,
    /// The tree changed; the node is done for this pass
    Fixed,
}

/// Per-feature policy consulted by the command layer and the
/// normalization engine
pub trait StructuralRule: std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn is_void(&self, _kind: &ElementKind) -> bool {
        false
    }

    fn is_inline(&self, _kind: &ElementKind) -> bool {
        false
    }

    /// Repair `id` before the generic steps run
    fn on_normalize(&self, _ctx: &mut EditContext, _id: NodeId) -> EditorResult<NormalizeOutcome> {
        Ok(NormalizeOutcome::Clean)
    }

    /// `Some` takes over Backspace; `None` passes it on
    fn on_delete_backward(&self, _ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        Ok(None)
    }

    fn on_delete_forward(&self, _ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        Ok(None)
    }

    fn on_insert_break(&self, _ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        Ok(None)
    }
}

/// Ordered rule registry
#[derive(Debug, Default)]
pub struct RulePipeline {
    rules: Vec<Box<dyn StructuralRule>>,
}

impl RulePipeline {
    /// Pipeline with no rules at all
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The editor's pipeline
    pub fn standard() -> Self {
        Self::new()
            .with(TableRule)
            .with(ImageRule)
            .with(FileAttachmentRule)
            .with(LinkRule)
            .with(DatabaseRecordRule)
            .with(ListRule)
    }

    /// Register `rule` on top of the current pipeline
    pub fn with<R: StructuralRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Rule names in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn is_void(&self, kind: &ElementKind) -> bool {
        self.rules.iter().any(|rule| rule.is_void(kind))
    }

    pub fn is_inline(&self, kind: &ElementKind) -> bool {
        self.rules.iter().any(|rule| rule.is_inline(kind))
    }

    pub fn normalize_node(&self, ctx: &mut EditContext, id: NodeId) -> EditorResult<NormalizeOutcome> {
        for rule in self.rules.iter().rev() {
            if !ctx.tree.contains(id) {
                break;
            }
            if rule.on_normalize(ctx, id)? == NormalizeOutcome::Fixed {
                tracing::debug!(rule = rule.name(), node = %id, "rule repaired node");
                return Ok(NormalizeOutcome::Fixed);
            }
        }
        Ok(NormalizeOutcome::Clean)
    }

    pub fn delete_backward(&self, ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        self.dispatch(ctx, "delete_backward", |rule, ctx| rule.on_delete_backward(ctx))
    }

    pub fn delete_forward(&self, ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        self.dispatch(ctx, "delete_forward", |rule, ctx| rule.on_delete_forward(ctx))
    }

    pub fn insert_break(&self, ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
        self.dispatch(ctx, "insert_break", |rule, ctx| rule.on_insert_break(ctx))
    }

    fn dispatch<F>(&self, ctx: &mut EditContext, event: &str, hook: F) -> EditorResult<Option<CommandOutcome>>
    where
        F: Fn(&dyn StructuralRule, &mut EditContext) -> EditorResult<Option<CommandOutcome>>,
    {
        for rule in self.rules.iter().rev() {
            if let Some(outcome) = hook(rule.as_ref(), ctx)? {
                tracing::debug!(rule = rule.name(), event, ?outcome, "rule handled edit");
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richdoc_model::{FileInfo, RecordInfo};

    #[test]
    fn test_standard_order() {
        let pipeline = RulePipeline::standard();
        assert_eq!(
            pipeline.names(),
            vec!["tables", "images", "file-attachments", "links", "database-records", "lists"]
        );
    }

    #[test]
    fn test_void_and_inline_kinds() {
        let pipeline = RulePipeline::standard();
        let image = ElementKind::Image {
            url: "x.png".to_string(),
            alt: None,
            caption: None,
            width: None,
            height: None,
        };
        let file = ElementKind::FileAttachment {
            file: FileInfo {
                id: "f1".to_string(),
                name: "a.pdf".to_string(),
                size: 10,
                mime_type: "application/pdf".to_string(),
                url: "https://files/a.pdf".to_string(),
                uploaded_at: chrono::Utc::now(),
            },
        };
        let record = ElementKind::DatabaseRecord {
            record: RecordInfo {
                id: "r1".to_string(),
                record_type: "invoice".to_string(),
                title: "INV-1".to_string(),
                data: serde_json::Value::Null,
                url: None,
            },
        };
        let link = ElementKind::Link {
            url: "https://example.com".to_string(),
        };

        assert!(pipeline.is_void(&image));
        assert!(pipeline.is_void(&file));
        assert!(pipeline.is_void(&record));
        assert!(!pipeline.is_void(&link));
        assert!(pipeline.is_inline(&link));
        assert!(!pipeline.is_inline(&ElementKind::paragraph()));
        assert!(!RulePipeline::new().is_void(&image));
    }
}
