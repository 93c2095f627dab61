//! # Document Handle
//!
//! A repaired document tree plus its version counter. Documents are either
//! memory-backed (hosts hand over JSON) or file-backed (the CLI).
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Repair → Edit → Snapshot → Save
//!   ↓       ↓       ↓        ↓        ↓
//! JSON   Nodes   Commands  Nodes    JSON
//! ```

use crate::config::EditorConfig;
use crate::errors::{EditorError, EditorResult};
use crate::repair::repair;
use crate::rules::RulePipeline;
use richdoc_common::{read_document, write_document};
use richdoc_model::{DocumentTree, Node};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Document {
    /// Backing file, if any
    pub path: Option<PathBuf>,

    /// Current version number (increments on each emitted change)
    pub version: u64,

    pub(crate) tree: DocumentTree,

    dirty: bool,
}

impl Document {
    /// Repair `value` into a memory-backed document
    pub fn from_value(value: Value, rules: &RulePipeline, config: &EditorConfig) -> Self {
        Self::from_nodes(&repair(value, rules, config))
    }

    /// Wrap nodes that are already valid
    pub fn from_nodes(nodes: &[Node]) -> Self {
        Self {
            path: None,
            version: 0,
            tree: DocumentTree::from_nodes(nodes),
            dirty: false,
        }
    }

    /// Load and repair a JSON document file (file-backed)
    pub fn load(path: PathBuf, rules: &RulePipeline, config: &EditorConfig) -> EditorResult<Self> {
        let value = read_document(&path)?;
        let mut document = Self::from_value(value, rules, config);
        document.path = Some(path);
        Ok(document)
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Immutable snapshot of the current tree
    pub fn snapshot(&self) -> Vec<Node> {
        self.tree.to_nodes()
    }

    /// Replace the whole tree and bump the version
    pub(crate) fn replace(&mut self, nodes: &[Node]) {
        self.tree = DocumentTree::from_nodes(nodes);
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
        self.dirty = true;
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> EditorResult<()> {
        let path = self.path.as_ref().ok_or(EditorError::NotFileBacked)?;
        write_document(path, &self.tree.to_nodes())?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_document_is_repaired() {
        let doc = Document::from_value(
            json!([{"type": "paragraph", "children": []}]),
            &RulePipeline::standard(),
            &EditorConfig::default(),
        );
        assert_eq!(doc.version, 0);
        assert!(!doc.is_dirty());
        assert_eq!(doc.snapshot(), vec![Node::paragraph("")]);
    }

    #[test]
    fn test_save_requires_file_backing() {
        let mut doc = Document::from_nodes(&Node::default_document());
        assert!(matches!(doc.save(), Err(EditorError::NotFileBacked)));
    }

    #[test]
    fn test_replace_bumps_version() {
        let mut doc = Document::from_nodes(&Node::default_document());
        doc.replace(&[Node::paragraph("x")]);
        assert_eq!(doc.version, 1);
        assert!(doc.is_dirty());
        assert_eq!(doc.snapshot(), vec![Node::paragraph("x")]);
    }
}
