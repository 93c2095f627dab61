//! # Rich Document Editor
//!
//! Structured editing core for the embedded rich-text editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ repair: external JSON → valid node tree     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: selection-scoped commands          │
//! │  - Rule hooks (tables, lists, voids, links) │
//! │  - Generic paragraph-level editing          │
//! │  - Normalization until the tree is valid    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host: snapshot emitted after each change    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is always valid**: every command ends with normalization
//! 2. **Rules are an explicit pipeline**: composition order is a visible list
//! 3. **Stable ids inside, paths outside**: structural edits never stale the
//!    selection
//! 4. **Bad input is repaired, never rejected**
//!
//! ## Usage
//!
//! ```rust,ignore
//! use richdoc_editor::{Command, EditSession};
//! use richdoc_model::Mark;
//!
//! let mut session = EditSession::new(serde_json::json!([
//!     { "type": "paragraph", "children": [{ "text": "Hello" }] }
//! ]));
//! session.on_change(|nodes| println!("{}", serde_json::to_string(nodes).unwrap()));
//!
//! session.execute(&Command::SelectAll);
//! session.execute(&Command::ToggleMark { mark: Mark::Bold });
//! assert!(session.is_mark_active(&Mark::Bold));
//! ```

pub mod command;
pub mod commands;
pub mod config;
pub mod context;
pub mod document;
pub mod editing;
pub mod errors;
pub mod invariants;
pub mod normalize;
pub mod repair;
pub mod rules;
pub mod selection;
pub mod serialize;
pub mod session;

pub use command::Command;
pub use config::EditorConfig;
pub use context::{CommandOutcome, EditContext, EditorState, ListState, Query};
pub use document::Document;
pub use errors::{EditorError, EditorResult};
pub use invariants::{check_invariants, Invariant, InvariantViolation};
pub use normalize::{normalize, normalize_tree};
pub use repair::{coerce_document, repair, repair_nodes, sanitize};
pub use rules::{NormalizeOutcome, RulePipeline, StructuralRule};
pub use selection::{LeafPoint, LeafRange};
pub use serialize::{deserialize, excerpt, serialize};
pub use session::{ChangeListener, CommandResult, EditSession};
