//! # Commands
//!
//! Serializable form of every editor command, so hosts and command scripts
//! can drive a session with plain JSON:
//!
//! ```json
//! [
//!   { "command": "setSelection", "selection": { "anchor": { "path": [0, 0], "offset": 0 }, "focus": { "path": [0, 0], "offset": 5 } } },
//!   { "command": "toggleMark", "mark": { "mark": "bold" } },
//!   { "command": "insertTable", "rows": 2, "cols": 3 }
//! ]
//! ```

use crate::commands;
use crate::context::{CommandOutcome, EditContext};
use crate::editing;
use crate::errors::EditorResult;
use richdoc_model::{Align, BlockFormat, FileInfo, Mark, RecordInfo, Selection};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    SetSelection {
        selection: Selection,
    },
    SelectAll,
    Deselect,

    ToggleMark {
        mark: Mark,
    },

    /// `format` is a toolbar string (`heading-2`, `bulleted-list`, ...)
    ToggleBlock {
        format: String,
    },

    SetAlignment {
        #[serde(default)]
        align: Option<Align>,
    },

    InsertText {
        text: String,
    },
    DeleteBackward,
    DeleteForward,
    InsertBreak,

    InsertTable {
        rows: u32,
        cols: u32,
    },

    InsertImage {
        url: String,
        #[serde(default)]
        alt: Option<String>,
    },

    InsertFileAttachment {
        file: FileInfo,
    },

    InsertLink {
        url: String,
        #[serde(default)]
        text: String,
    },
    RemoveLink,

    InsertDatabaseRecord {
        record: RecordInfo,
    },
}

impl Command {
    /// Command name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetSelection { .. } => "setSelection",
            Command::SelectAll => "selectAll",
            Command::Deselect => "deselect",
            Command::ToggleMark { .. } => "toggleMark",
            Command::ToggleBlock { .. } => "toggleBlock",
            Command::SetAlignment { .. } => "setAlignment",
            Command::InsertText { .. } => "insertText",
            Command::DeleteBackward => "deleteBackward",
            Command::DeleteForward => "deleteForward",
            Command::InsertBreak => "insertBreak",
            Command::InsertTable { .. } => "insertTable",
            Command::InsertImage { .. } => "insertImage",
            Command::InsertFileAttachment { .. } => "insertFileAttachment",
            Command::InsertLink { .. } => "insertLink",
            Command::RemoveLink => "removeLink",
            Command::InsertDatabaseRecord { .. } => "insertDatabaseRecord",
        }
    }

    /// Whether the command only moves the selection
    pub fn is_selection_only(&self) -> bool {
        matches!(
            self,
            Command::SetSelection { .. } | Command::SelectAll | Command::Deselect
        )
    }

    pub fn apply(&self, ctx: &mut EditContext) -> EditorResult<CommandOutcome> {
        match self {
            Command::SetSelection { selection } => commands::set_selection(ctx, selection),
            Command::SelectAll => commands::select_all(ctx),
            Command::Deselect => commands::deselect(ctx),
            Command::ToggleMark { mark } => commands::toggle_mark(ctx, mark),
            Command::ToggleBlock { format } => match BlockFormat::parse(format) {
                Some(format) => commands::toggle_block(ctx, format),
                None => {
                    debug!(format = %format, "unknown block format");
                    Ok(CommandOutcome::Noop)
                }
            },
            Command::SetAlignment { align } => commands::set_alignment(ctx, *align),
            Command::InsertText { text } => editing::insert_text(ctx, text),
            Command::DeleteBackward => editing::delete_backward(ctx),
            Command::DeleteForward => editing::delete_forward(ctx),
            Command::InsertBreak => editing::insert_break(ctx),
            Command::InsertTable { rows, cols } => commands::insert_table(ctx, *rows, *cols),
            Command::InsertImage { url, alt } => commands::insert_image(ctx, url, alt.as_deref()),
            Command::InsertFileAttachment { file } => {
                commands::insert_file_attachment(ctx, file.clone())
            }
            Command::InsertLink { url, text } => commands::insert_link(ctx, url, text),
            Command::RemoveLink => commands::remove_link(ctx),
            Command::InsertDatabaseRecord { record } => {
                commands::insert_database_record(ctx, record.clone())
            }
        }
    }
}
