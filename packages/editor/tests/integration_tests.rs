//! Integration tests for editor crate

use richdoc_editor::{
    check_invariants, excerpt, repair, Command, CommandResult, Document, EditSession, EditorConfig,
    RulePipeline,
};
use richdoc_model::{ElementKind, Node, Point, Selection};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn caret(path: Vec<usize>, offset: usize) -> Command {
    Command::SetSelection {
        selection: Selection::collapsed(Point::new(path, offset)),
    }
}

#[test]
fn test_heading_then_table_scenario() {
    let mut session = EditSession::new(json!([{"type": "paragraph", "children": [{"text": "A"}]}]));

    assert!(session.execute(&caret(vec![0, 0], 1)).is_applied());
    assert!(session
        .execute(&Command::ToggleBlock {
            format: "heading-2".to_string()
        })
        .is_applied());
    assert_eq!(
        serde_json::to_value(session.snapshot()).unwrap(),
        json!([{"type": "heading", "level": 2, "children": [{"text": "A"}]}])
    );

    assert!(session
        .execute(&Command::InsertTable { rows: 2, cols: 2 })
        .is_applied());
    let nodes = session.snapshot();
    assert_eq!(nodes.len(), 2);
    let table = &nodes[1];
    assert_eq!(
        table.kind(),
        Some(&ElementKind::Table {
            cols: Some(2),
            rows: Some(2)
        })
    );
    for (index, row) in table.children().iter().enumerate() {
        assert_eq!(row.children().len(), 2);
        for cell in row.children() {
            assert_eq!(cell.kind(), Some(&ElementKind::table_cell(index == 0)));
        }
    }
    assert!(check_invariants(&nodes).is_empty());

    // The caret did not move into the new table
    assert_eq!(
        session.selection(),
        Some(Selection::collapsed(Point::new(vec![0, 0], 1)))
    );
}

#[test]
fn test_row_less_table_repair() {
    let nodes = repair(
        json!([{"type": "table", "children": [{"type": "not-a-row", "children": [{"text": "x"}]}]}]),
        &RulePipeline::standard(),
        &EditorConfig::default(),
    );
    assert_eq!(
        serde_json::to_value(&nodes).unwrap(),
        json!([{"type": "table", "cols": 1, "rows": 1, "children": [
            {"type": "table-row", "children": [
                {"type": "table-cell", "children": [{"text": ""}]}
            ]}
        ]}])
    );
}

#[test]
fn test_file_backed_document_lifecycle() {
    let path = std::env::temp_dir().join(format!("richdoc-lifecycle-{}.json", std::process::id()));
    std::fs::write(&path, r#"[{"type": "paragraph", "children": []}, "second"]"#).unwrap();

    let rules = RulePipeline::standard();
    let config = EditorConfig::default();
    let doc = Document::load(path.clone(), &rules, &config).unwrap();
    assert_eq!(doc.version, 0);
    assert!(!doc.is_dirty());
    assert_eq!(doc.snapshot(), vec![Node::paragraph(""), Node::paragraph("second")]);

    let mut session = EditSession::from_document(doc, rules, config);
    session.execute(&Command::InsertText {
        text: "first".to_string(),
    });
    assert!(session.document().is_dirty());
    session.document_mut().save().unwrap();
    assert!(!session.document().is_dirty());

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        saved,
        json!([
            {"type": "paragraph", "children": [{"text": "first"}]},
            {"type": "paragraph", "children": [{"text": "second"}]}
        ])
    );
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_command_script_from_json() {
    let script: Vec<Command> = serde_json::from_value(json!([
        {"command": "selectAll"},
        {"command": "toggleMark", "mark": {"mark": "bold"}},
        {"command": "setSelection", "selection": {
            "anchor": {"path": [0, 0], "offset": 5},
            "focus": {"path": [0, 0], "offset": 5}
        }},
        {"command": "insertBreak"},
        {"command": "toggleBlock", "format": "bulleted-list"},
        {"command": "insertText", "text": "item"}
    ]))
    .unwrap();

    let mut session = EditSession::new(json!([{"type": "paragraph", "children": [{"text": "Hello"}]}]));
    let results: Vec<CommandResult> = script.iter().map(|command| session.execute(command)).collect();
    assert!(results.iter().all(CommandResult::is_applied), "{:?}", results);

    assert_eq!(
        serde_json::to_value(session.snapshot()).unwrap(),
        json!([
            {"type": "paragraph", "children": [{"text": "Hello", "bold": true}]},
            {"type": "bulleted-list", "children": [
                {"type": "list-item", "children": [{"text": "item", "bold": true}]}
            ]}
        ])
    );
    assert!(session.is_block_active("bulleted-list"));
    assert!(session.is_mark_active(&richdoc_model::Mark::Bold));
}

#[test]
fn test_listener_sees_every_change_once() {
    let mut session = EditSession::new(json!([{"type": "paragraph", "children": [{"text": ""}]}]));
    let versions = Rc::new(RefCell::new(Vec::new()));
    let sink = versions.clone();
    session.on_change(move |nodes| sink.borrow_mut().push(nodes.len()));

    for text in ["a", "b", "c"] {
        session.execute(&Command::InsertText {
            text: text.to_string(),
        });
    }
    session.execute(&Command::InsertBreak);
    session.execute(&caret(vec![0, 0], 0));
    session.execute(&Command::DeleteBackward);

    assert_eq!(*versions.borrow(), vec![1, 1, 1, 2]);
    assert_eq!(session.version(), 4);
    assert_eq!(session.text(), "abc\n");
    assert_eq!(excerpt(&session.snapshot(), 2), "ab…");
}
