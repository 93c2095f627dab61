//! Void media rules. They only decide where a caret may go; the tree shape
//! of a void (one empty text child) is kept by the normalization engine.

use super::StructuralRule;
use richdoc_model::ElementKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRule;

impl StructuralRule for ImageRule {
    fn name(&self) -> &'static str {
        "images"
    }

    fn is_void(&self, kind: &ElementKind) -> bool {
        matches!(kind, ElementKind::Image { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileAttachmentRule;

impl StructuralRule for FileAttachmentRule {
    fn name(&self) -> &'static str {
        "file-attachments"
    }

    fn is_void(&self, kind: &ElementKind) -> bool {
        matches!(kind, ElementKind::FileAttachment { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseRecordRule;

impl StructuralRule for DatabaseRecordRule {
    fn name(&self) -> &'static str {
        "database-records"
    }

    fn is_void(&self, kind: &ElementKind) -> bool {
        matches!(kind, ElementKind::DatabaseRecord { .. })
    }
}
