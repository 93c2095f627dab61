//! # Edit Session
//!
//! Owns one document for the duration of an editing session, together with
//! the selection, pending marks, list counter, rule pipeline and config.
//!
//! Every command runs to completion synchronously:
//!
//! ```text
//! rule hooks → generic behavior → normalize → sanitize → emit (if changed)
//! ```
//!
//! A command that fails halfway leaves the tree in an unknown state, so the
//! session installs the default document and refuses further commands until
//! [`EditSession::recover`] or [`EditSession::replace_document`] is called.

use crate::command::Command;
use crate::config::EditorConfig;
use crate::context::{CommandOutcome, EditContext, EditorState, ListState, Query};
use crate::document::Document;
use crate::errors::{EditorError, EditorResult};
use crate::invariants::check_invariants;
use crate::normalize::normalize;
use crate::repair::{repair, sanitize};
use crate::rules::RulePipeline;
use crate::selection::{self, LeafRange};
use crate::serialize::serialize;
use richdoc_model::{BlockFormat, Mark, Marks, Node, Selection};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

/// Receives the full document after every command that changed it
pub type ChangeListener = Box<dyn FnMut(&[Node])>;

/// Result of one command as seen by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CommandResult {
    Applied { version: u64 },
    Noop,
    Rejected { reason: String },
    Failed { error: String },
}

impl CommandResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandResult::Applied { .. })
    }
}

pub struct EditSession {
    document: Document,
    state: EditorState,
    rules: RulePipeline,
    config: EditorConfig,
    listener: Option<ChangeListener>,
    structure_error: bool,
}

impl EditSession {
    /// Start a session on an externally supplied document with the
    /// standard rules
    pub fn new(value: Value) -> Self {
        Self::with_config(value, EditorConfig::default())
    }

    pub fn with_config(value: Value, config: EditorConfig) -> Self {
        Self::with_rules(value, RulePipeline::standard(), config)
    }

    pub fn with_rules(value: Value, rules: RulePipeline, config: EditorConfig) -> Self {
        let document = Document::from_value(value, &rules, &config);
        Self::from_document(document, rules, config)
    }

    pub fn from_document(document: Document, rules: RulePipeline, config: EditorConfig) -> Self {
        info!(
            blocks = document.tree().blocks().len(),
            rules = ?rules.names(),
            "edit session started"
        );
        let mut session = Self {
            document,
            state: EditorState::default(),
            rules,
            config,
            listener: None,
            structure_error: false,
        };
        session.reset_selection();
        session
    }

    /// Register the change listener, replacing any previous one
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&[Node]) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Run one command. Never panics and never returns an error: failures
    /// come back as [`CommandResult::Failed`] and put the session in the
    /// structure error state.
    #[instrument(skip(self, command), fields(command = command.name()))]
    pub fn execute(&mut self, command: &Command) -> CommandResult {
        if self.structure_error {
            debug!("command refused in structure error state");
            return CommandResult::Rejected {
                reason: EditorError::StructureError.to_string(),
            };
        }
        match self.run(command) {
            Ok(result) => result,
            Err(err) => self.fail(err),
        }
    }

    fn run(&mut self, command: &Command) -> EditorResult<CommandResult> {
        let before = if command.is_selection_only() {
            None
        } else {
            Some(self.document.snapshot())
        };

        let mut ctx = EditContext::new(
            &mut self.document.tree,
            &mut self.state,
            &self.rules,
            &self.config,
        );
        ctx.ensure_selection();
        match command.apply(&mut ctx)? {
            CommandOutcome::Applied => {}
            CommandOutcome::Noop => {
                debug!("no-op");
                return Ok(CommandResult::Noop);
            }
            CommandOutcome::Rejected(reason) => {
                debug!(%reason, "rejected");
                return Ok(CommandResult::Rejected { reason });
            }
        }
        let passes = normalize(&mut ctx)?;
        ctx.ensure_selection();
        debug!(passes, "normalized");

        let before = match before {
            Some(before) => before,
            None => {
                return Ok(CommandResult::Applied {
                    version: self.document.version,
                })
            }
        };
        let mut snapshot = self.document.snapshot();
        let fixes = sanitize(&mut snapshot);
        if fixes > 0 {
            warn!(fixes, "snapshot needed sanitizing after normalization");
            self.document.replace(&snapshot);
            self.reset_selection();
        }
        if snapshot == before {
            return Ok(CommandResult::Applied {
                version: self.document.version,
            });
        }

        if fixes == 0 {
            self.document.touch();
        }
        if cfg!(debug_assertions) {
            for violation in check_invariants(&snapshot) {
                warn!(%violation, "invariant violated after command");
            }
        }
        self.emit(&snapshot);
        Ok(CommandResult::Applied {
            version: self.document.version,
        })
    }

    fn fail(&mut self, err: EditorError) -> CommandResult {
        error!(%err, "command failed; default document installed");
        self.structure_error = true;
        self.document.replace(&Node::default_document());
        self.state = EditorState::default();
        CommandResult::Failed {
            error: err.to_string(),
        }
    }

    fn emit(&mut self, snapshot: &[Node]) {
        if let Some(listener) = self.listener.as_mut() {
            listener(snapshot);
        }
    }

    /// Caret at the start of the document
    fn reset_selection(&mut self) {
        let root = self.document.tree.root();
        self.state.selection = selection::start_of(&self.document.tree, &self.rules, root).map(LeafRange::collapsed);
    }

    /// Leave the structure error state with a fresh default document
    pub fn recover(&mut self) {
        self.document.replace(&Node::default_document());
        self.state = EditorState::default();
        self.reset_selection();
        self.structure_error = false;
        info!(version = self.document.version, "session recovered");
        let snapshot = self.document.snapshot();
        self.emit(&snapshot);
    }

    /// Swap in a new externally supplied document. The value is repaired
    /// first; the selection goes to the document start.
    pub fn replace_document(&mut self, value: Value) {
        let nodes = repair(value, &self.rules, &self.config);
        self.document.replace(&nodes);
        self.state = EditorState::default();
        self.reset_selection();
        self.structure_error = false;
        info!(blocks = nodes.len(), version = self.document.version, "document replaced");
    }

    // ---- Queries ------------------------------------------------------

    fn query(&self) -> Query<'_> {
        Query {
            tree: &self.document.tree,
            state: &self.state,
            rules: &self.rules,
        }
    }

    pub fn is_mark_active(&self, mark: &Mark) -> bool {
        self.query().is_mark_active(mark).unwrap_or(false)
    }

    /// `format` is a toolbar string; unknown formats are never active
    pub fn is_block_active(&self, format: &str) -> bool {
        match BlockFormat::parse(format) {
            Some(format) => self.query().is_block_active(&format).unwrap_or(false),
            None => false,
        }
    }

    pub fn is_link_active(&self) -> bool {
        self.query().is_link_active().unwrap_or(false)
    }

    pub fn selection(&self) -> Option<Selection> {
        let range = self.state.selection?;
        selection::to_selection(&self.document.tree, range).ok()
    }

    pub fn pending_marks(&self) -> Option<&Marks> {
        self.state.pending_marks.as_ref()
    }

    pub fn list_state(&self) -> ListState {
        self.state.list
    }

    pub fn snapshot(&self) -> Vec<Node> {
        self.document.snapshot()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn version(&self) -> u64 {
        self.document.version
    }

    pub fn has_structure_error(&self) -> bool {
        self.structure_error
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Plain-text rendition of the document
    pub fn text(&self) -> String {
        serialize(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::StructuralRule;
    use richdoc_model::Point;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn caret(path: Vec<usize>, offset: usize) -> Command {
        Command::SetSelection {
            selection: Selection::collapsed(Point::new(path, offset)),
        }
    }

    #[test]
    fn test_emits_once_per_changing_command() {
        let mut session = EditSession::new(json!([{"type": "paragraph", "children": [{"text": "ab"}]}]));
        let emitted = Rc::new(RefCell::new(Vec::new()));
        let sink = emitted.clone();
        session.on_change(move |nodes| sink.borrow_mut().push(nodes.to_vec()));

        assert!(session.execute(&caret(vec![0, 0], 2)).is_applied());
        assert_eq!(
            session.execute(&Command::InsertText { text: "c".to_string() }),
            CommandResult::Applied { version: 1 }
        );
        assert_eq!(session.execute(&Command::RemoveLink), CommandResult::Noop);

        let emitted = emitted.borrow();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0], vec![Node::paragraph("abc")]);
    }

    #[test]
    fn test_rejected_command_keeps_document() {
        let mut session = EditSession::new(json!([{"type": "paragraph", "children": [{"text": "a"}]}]));
        let result = session.execute(&Command::InsertTable { rows: 0, cols: 3 });
        assert!(matches!(result, CommandResult::Rejected { .. }));
        assert_eq!(session.version(), 0);
        assert_eq!(session.snapshot(), vec![Node::paragraph("a")]);
    }

    #[derive(Debug)]
    struct Broken;

    impl StructuralRule for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn on_insert_break(&self, _ctx: &mut EditContext) -> EditorResult<Option<CommandOutcome>> {
            Err(EditorError::InvalidSelection("stale caret".to_string()))
        }
    }

    #[test]
    fn test_failure_enters_structure_error_until_recover() {
        let mut session = EditSession::with_rules(
            json!([{"type": "paragraph", "children": [{"text": "keep me"}]}]),
            RulePipeline::standard().with(Broken),
            EditorConfig::default(),
        );
        let emitted = Rc::new(RefCell::new(0));
        let sink = emitted.clone();
        session.on_change(move |_| *sink.borrow_mut() += 1);

        assert!(matches!(session.execute(&Command::InsertBreak), CommandResult::Failed { .. }));
        assert!(session.has_structure_error());
        assert_eq!(session.snapshot(), Node::default_document());
        assert!(matches!(
            session.execute(&Command::InsertText { text: "x".to_string() }),
            CommandResult::Rejected { .. }
        ));

        session.recover();
        assert!(!session.has_structure_error());
        assert_eq!(*emitted.borrow(), 1);
        assert!(session
            .execute(&Command::InsertText { text: "x".to_string() })
            .is_applied());
        assert_eq!(session.text(), "x");
    }

    #[test]
    fn test_replace_document_repairs_input() {
        let mut session = EditSession::new(json!(null));
        assert_eq!(session.snapshot(), Node::default_document());
        session.replace_document(json!(["one", "two"]));
        assert_eq!(session.text(), "one\ntwo");
        assert_eq!(
            session.selection(),
            Some(Selection::collapsed(Point::new(vec![0, 0], 0)))
        );
    }

    #[test]
    fn test_result_wire_shape() {
        let value = serde_json::to_value(CommandResult::Applied { version: 3 }).unwrap();
        assert_eq!(value, json!({"status": "applied", "version": 3}));
        let value = serde_json::to_value(CommandResult::Noop).unwrap();
        assert_eq!(value, json!({"status": "noop"}));
    }
}
