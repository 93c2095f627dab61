//! # Command Layer
//!
//! Selection-scoped tree transformations. Each command reads the session
//! selection from the [`EditContext`], edits the tree in place and reports
//! a [`CommandOutcome`]. Normalization runs afterwards, in the session.
//!
//! Invalid arguments never raise: they come back as
//! [`CommandOutcome::Rejected`] with a diagnostic log line.

use crate::context::{CommandOutcome, EditContext};
use crate::errors::EditorResult;
use crate::selection::{self, LeafPoint, LeafRange};
use richdoc_model::{
    Align, BlockFormat, ElementKind, FileInfo, Mark, ModelError, Node, NodeId, RecordInfo, Selection,
    TextLeaf,
};
use std::cmp::Ordering;
use tracing::{debug, warn};

// ---- Marks --------------------------------------------------------------

/// Add `mark` to the selected text, or remove it when every selected leaf
/// already has it. On a collapsed caret only the pending marks change.
pub fn toggle_mark(ctx: &mut EditContext, mark: &Mark) -> EditorResult<CommandOutcome> {
    let range = match ctx.selection() {
        Some(range) => range,
        None => return Ok(CommandOutcome::Noop),
    };
    let active = ctx.query().is_mark_active(mark)?;

    if range.is_collapsed() {
        let mut pending = match ctx.state.pending_marks.take() {
            Some(pending) => pending,
            None => ctx
                .tree
                .leaf(range.anchor.leaf)
                .map(|leaf| leaf.marks.clone())
                .unwrap_or_default(),
        };
        if active {
            pending.remove(mark);
        } else {
            pending.add(mark);
        }
        ctx.state.pending_marks = Some(pending);
        return Ok(CommandOutcome::Applied);
    }

    let (start, end) = match split_selection_edges(ctx)? {
        Some(edges) => edges,
        None => return Ok(CommandOutcome::Noop),
    };
    for leaf in selection::covered_leaves(ctx.tree, ctx.rules, start, end) {
        if let Some(text) = ctx.tree.leaf_mut(leaf) {
            if active {
                text.marks.remove(mark);
            } else {
                text.marks.add(mark);
            }
        }
    }
    ctx.state.pending_marks = None;
    debug!(%mark, active, "mark toggled");
    Ok(CommandOutcome::Applied)
}

/// Unhang the selection and split the leaves at both edges so the selected
/// characters sit in whole leaves. Returns the new edges.
fn split_selection_edges(ctx: &mut EditContext) -> EditorResult<Option<(LeafPoint, LeafPoint)>> {
    let range = match ctx.selection() {
        Some(range) => range,
        None => return Ok(None),
    };
    let backward = selection::compare(ctx.tree, range.anchor, range.focus)? == Ordering::Greater;
    let unhung = selection::unhang(ctx.tree, ctx.rules, range)?;
    ctx.set_selection(Some(if backward {
        LeafRange::new(unhung.focus, unhung.anchor)
    } else {
        unhung
    }));

    // End first: the start split would move the end point to a new leaf
    ctx.split_leaf(unhung.focus.leaf, unhung.focus.offset)?;
    ctx.split_leaf(unhung.anchor.leaf, unhung.anchor.offset)?;
    ctx.edges()
}

// ---- Blocks -------------------------------------------------------------

fn parent_is_list(ctx: &EditContext, id: NodeId) -> bool {
    ctx.tree
        .parent(id)
        .and_then(|parent| ctx.tree.kind(parent))
        .map(ElementKind::is_list)
        .unwrap_or(false)
}

/// Retype a block, carrying its alignment over when both kinds have one
fn retype(ctx: &mut EditContext, block: NodeId, mut kind: ElementKind) -> EditorResult<()> {
    let align = ctx
        .tree
        .kind(block)
        .cloned()
        .as_mut()
        .and_then(|old| old.align_mut().and_then(|align| *align));
    if let Some(slot) = kind.align_mut() {
        if slot.is_none() {
            *slot = align;
        }
    }
    ctx.tree.set_kind(block, kind)?;
    Ok(())
}

/// Toggle the block format of every block in the selection.
///
/// Active formats revert to paragraph. List formats lift the blocks out of
/// any list, retype them to items and wrap each consecutive run in a new
/// list. Formats that are not plain retype targets, and any toggle inside
/// a table cell, are rejected.
pub fn toggle_block(ctx: &mut EditContext, format: BlockFormat) -> EditorResult<CommandOutcome> {
    let range = match ctx.selection() {
        Some(range) => range,
        None => return Ok(CommandOutcome::Noop),
    };
    let target = match format.retype_kind() {
        Some(kind) => kind,
        None => {
            debug!(%format, "not a block retype target");
            return Ok(CommandOutcome::Rejected(format!("{} cannot be toggled", format)));
        }
    };

    let unhung = selection::unhang(ctx.tree, ctx.rules, range)?;
    let blocks = selection::blocks_in(ctx.tree, ctx.rules, unhung.anchor, unhung.focus);
    if blocks
        .iter()
        .any(|block| ctx.tree.closest(*block, ElementKind::is_table_cell).is_some())
    {
        debug!(%format, "block toggle inside a table cell ignored");
        return Ok(CommandOutcome::Rejected(
            "selection is inside a table cell".to_string(),
        ));
    }
    let active = ctx.query().is_block_active(&format)?;

    if format.is_list() {
        return toggle_list(ctx, &blocks, target, active);
    }
    if active && format == BlockFormat::Paragraph {
        return Ok(CommandOutcome::Noop);
    }
    let kind = if active { ElementKind::paragraph() } else { target };
    for block in blocks {
        if parent_is_list(ctx, block) {
            ctx.lift_out(block)?;
        }
        retype(ctx, block, kind.clone())?;
    }
    debug!(%format, active, "block toggled");
    Ok(CommandOutcome::Applied)
}

fn toggle_list(ctx: &mut EditContext, blocks: &[NodeId], list: ElementKind, active: bool) -> EditorResult<CommandOutcome> {
    for block in blocks {
        if parent_is_list(ctx, *block) {
            ctx.lift_out(*block)?;
        }
    }
    if active {
        for block in blocks {
            retype(ctx, *block, ElementKind::paragraph())?;
        }
        debug!(list = list.name(), "list removed");
        return Ok(CommandOutcome::Applied);
    }

    for block in blocks {
        ctx.tree.set_kind(*block, ElementKind::ListItem)?;
    }
    // Consecutive siblings share one new list
    let mut groups: Vec<Vec<NodeId>> = Vec::new();
    for block in blocks {
        let adjacent = groups
            .last()
            .and_then(|group| group.last())
            .map(|last| ctx.tree.next_sibling(*last) == Some(*block))
            .unwrap_or(false);
        match groups.last_mut() {
            Some(group) if adjacent => group.push(*block),
            _ => groups.push(vec![*block]),
        }
    }
    for group in groups {
        let first = group[0];
        let parent = ctx.tree.parent(first).ok_or(ModelError::RootNode)?;
        let start = ctx
            .tree
            .index_in_parent(first)
            .ok_or(ModelError::NodeNotFound(first))?;
        ctx.tree.wrap(parent, start, start + group.len(), list.clone())?;
    }
    debug!(list = list.name(), "list applied");
    Ok(CommandOutcome::Applied)
}

/// Set (or clear) the alignment of the paragraphs and headings in the
/// selection
pub fn set_alignment(ctx: &mut EditContext, align: Option<Align>) -> EditorResult<CommandOutcome> {
    let range = match ctx.selection() {
        Some(range) => selection::unhang(ctx.tree, ctx.rules, range)?,
        None => return Ok(CommandOutcome::Noop),
    };
    let blocks = selection::blocks_in(ctx.tree, ctx.rules, range.anchor, range.focus);
    let mut changed = false;
    for block in blocks {
        if let Some(slot) = ctx.tree.kind_mut(block).and_then(ElementKind::align_mut) {
            if *slot != align {
                *slot = align;
                changed = true;
            }
        }
    }
    Ok(if changed {
        CommandOutcome::Applied
    } else {
        CommandOutcome::Noop
    })
}

// ---- Structural inserts -------------------------------------------------

/// Root index right after the top-level block holding the end of the
/// selection, or the end of the document without one
fn block_insertion_index(ctx: &EditContext) -> EditorResult<usize> {
    let end = match ctx.edges()? {
        Some((_, end)) => end,
        None => return Ok(ctx.tree.blocks().len()),
    };
    Ok(ctx
        .tree
        .top_block_of(end.leaf)
        .and_then(|block| ctx.tree.index_in_parent(block))
        .map(|index| index + 1)
        .unwrap_or_else(|| ctx.tree.blocks().len()))
}

/// `rows × cols` grid of empty cells; the first row is the header
pub fn build_table(rows: u32, cols: u32) -> Node {
    let row = |header: bool| {
        Node::element(
            ElementKind::TableRow,
            (0..cols)
                .map(|_| Node::element(ElementKind::table_cell(header), vec![Node::empty_text()]))
                .collect(),
        )
    };
    Node::element(
        ElementKind::Table {
            cols: Some(cols),
            rows: Some(rows),
        },
        (0..rows).map(|index| row(index == 0)).collect(),
    )
}

/// Insert a table after the block holding the selection. The caret stays
/// where it was.
pub fn insert_table(ctx: &mut EditContext, rows: u32, cols: u32) -> EditorResult<CommandOutcome> {
    let max_rows = ctx.config.max_table_rows;
    let max_cols = ctx.config.max_table_cols;
    if !(1..=max_rows).contains(&rows) || !(1..=max_cols).contains(&cols) {
        warn!(rows, cols, max_rows, max_cols, "insertTable rejected: size out of range");
        return Ok(CommandOutcome::Rejected(format!(
            "table size {}x{} outside 1..={} rows and 1..={} columns",
            rows, cols, max_rows, max_cols
        )));
    }
    if let Some(range) = ctx.selection() {
        let nested = [range.anchor.leaf, range.focus.leaf]
            .iter()
            .any(|leaf| ctx.tree.closest(*leaf, ElementKind::is_table_part).is_some());
        if nested {
            warn!("insertTable rejected: selection is inside a table");
            return Ok(CommandOutcome::Rejected(
                "tables cannot be nested".to_string(),
            ));
        }
    }

    let index = block_insertion_index(ctx)?;
    let root = ctx.tree.root();
    ctx.tree.insert_subtree(root, index, &build_table(rows, cols))?;
    debug!(rows, cols, index, "table inserted");
    Ok(CommandOutcome::Applied)
}

fn insert_void(ctx: &mut EditContext, kind: ElementKind) -> EditorResult<CommandOutcome> {
    let name = kind.name();
    let index = block_insertion_index(ctx)?;
    let root = ctx.tree.root();
    ctx.tree
        .insert_subtree(root, index, &Node::element(kind, vec![Node::empty_text()]))?;
    if ctx.config.trailing_paragraph_after_void && index + 1 == ctx.tree.blocks().len() {
        ctx.tree.insert_subtree(root, index + 1, &Node::paragraph(""))?;
    }
    debug!(kind = name, index, "void block inserted");
    Ok(CommandOutcome::Applied)
}

pub fn insert_image(ctx: &mut EditContext, url: &str, alt: Option<&str>) -> EditorResult<CommandOutcome> {
    if url.is_empty() {
        warn!("insertImage rejected: empty url");
        return Ok(CommandOutcome::Rejected("image url is empty".to_string()));
    }
    insert_void(
        ctx,
        ElementKind::Image {
            url: url.to_string(),
            alt: alt.map(str::to_string),
            caption: None,
            width: None,
            height: None,
        },
    )
}

pub fn insert_file_attachment(ctx: &mut EditContext, file: FileInfo) -> EditorResult<CommandOutcome> {
    insert_void(ctx, ElementKind::FileAttachment { file })
}

pub fn insert_database_record(ctx: &mut EditContext, record: RecordInfo) -> EditorResult<CommandOutcome> {
    insert_void(ctx, ElementKind::DatabaseRecord { record })
}

// ---- Links --------------------------------------------------------------

/// Insert a link at the caret, or turn the selected text into one when the
/// selection stays inside one parent. A link already under the selection is
/// replaced.
pub fn insert_link(ctx: &mut EditContext, url: &str, text: &str) -> EditorResult<CommandOutcome> {
    let range = match ctx.selection() {
        Some(range) => range,
        None => return Ok(CommandOutcome::Noop),
    };
    if url.is_empty() {
        warn!("insertLink rejected: empty url");
        return Ok(CommandOutcome::Rejected("link url is empty".to_string()));
    }
    for link in ctx.query().active_links()? {
        ctx.tree.unwrap(link)?;
    }
    let kind = ElementKind::Link {
        url: url.to_string(),
    };

    if !range.is_collapsed() {
        if wrap_selection(ctx, kind.clone())? {
            return Ok(CommandOutcome::Applied);
        }
        if let Some((start, _)) = ctx.edges()? {
            ctx.set_caret(start);
        }
    }

    let point = match ctx.caret() {
        Some(point) => point,
        None => return Ok(CommandOutcome::Noop),
    };
    let label = if text.is_empty() { url } else { text };
    let (parent, index) = ctx.insertion_index(point)?;
    let link = ctx
        .tree
        .insert_subtree(parent, index, &Node::element(kind, vec![Node::text(label)]))?;
    let after = match ctx.tree.next_sibling(link) {
        Some(next) if ctx.tree.is_text(next) => next,
        _ => ctx.tree.insert_text(parent, index + 1, TextLeaf::empty())?,
    };
    ctx.set_caret(LeafPoint::new(after, 0));
    debug!(url, "link inserted");
    Ok(CommandOutcome::Applied)
}

/// Wrap the selected leaves in `kind` when both edges share a parent
fn wrap_selection(ctx: &mut EditContext, kind: ElementKind) -> EditorResult<bool> {
    let (start, end) = match ctx.edges()? {
        Some(edges) => edges,
        None => return Ok(false),
    };
    let parent = match ctx.tree.parent(start.leaf) {
        Some(parent) if ctx.tree.parent(end.leaf) == Some(parent) => parent,
        _ => return Ok(false),
    };
    let (start, end) = match split_selection_edges(ctx)? {
        Some(edges) => edges,
        None => return Ok(false),
    };
    let covered = selection::covered_leaves(ctx.tree, ctx.rules, start, end);
    let (first, last) = match (covered.first(), covered.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Ok(false),
    };
    let from = ctx
        .tree
        .index_in_parent(first)
        .ok_or(ModelError::NodeNotFound(first))?;
    let to = ctx
        .tree
        .index_in_parent(last)
        .ok_or(ModelError::NodeNotFound(last))?;
    ctx.tree.wrap(parent, from, to + 1, kind)?;
    Ok(true)
}

/// Unwrap every link under the selection
pub fn remove_link(ctx: &mut EditContext) -> EditorResult<CommandOutcome> {
    let links = ctx.query().active_links()?;
    if links.is_empty() {
        return Ok(CommandOutcome::Noop);
    }
    for link in links {
        ctx.tree.unwrap(link)?;
    }
    Ok(CommandOutcome::Applied)
}

// ---- Selection ----------------------------------------------------------

/// Replace the selection. Points that do not address an editable text leaf
/// are rejected.
pub fn set_selection(ctx: &mut EditContext, target: &Selection) -> EditorResult<CommandOutcome> {
    match selection::resolve_selection(ctx.tree, ctx.rules, target) {
        Ok(range) => {
            ctx.set_selection(Some(range));
            ctx.state.pending_marks = None;
            Ok(CommandOutcome::Applied)
        }
        Err(err) => {
            debug!(%err, "selection rejected");
            Ok(CommandOutcome::Rejected(err.to_string()))
        }
    }
}

pub fn select_all(ctx: &mut EditContext) -> EditorResult<CommandOutcome> {
    let root = ctx.tree.root();
    let start = selection::start_of(ctx.tree, ctx.rules, root);
    let end = selection::end_of(ctx.tree, ctx.rules, root);
    match (start, end) {
        (Some(start), Some(end)) => {
            ctx.set_selection(Some(LeafRange::new(start, end)));
            ctx.state.pending_marks = None;
            Ok(CommandOutcome::Applied)
        }
        _ => Ok(CommandOutcome::Noop),
    }
}

pub fn deselect(ctx: &mut EditContext) -> EditorResult<CommandOutcome> {
    ctx.set_selection(None);
    ctx.state.pending_marks = None;
    Ok(CommandOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::context::EditorState;
    use crate::normalize::normalize;
    use crate::rules::RulePipeline;
    use richdoc_model::{DocumentTree, Marks, Path, Point};

    struct Fixture {
        tree: DocumentTree,
        state: EditorState,
        rules: RulePipeline,
        config: EditorConfig,
    }

    impl Fixture {
        fn new(nodes: &[Node]) -> Self {
            Self {
                tree: DocumentTree::from_nodes(nodes),
                state: EditorState::default(),
                rules: RulePipeline::standard(),
                config: EditorConfig::default(),
            }
        }

        fn apply<F>(&mut self, f: F) -> CommandOutcome
        where
            F: FnOnce(&mut EditContext) -> EditorResult<CommandOutcome>,
        {
            let mut ctx = EditContext::new(&mut self.tree, &mut self.state, &self.rules, &self.config);
            let outcome = f(&mut ctx).unwrap();
            normalize(&mut ctx).unwrap();
            outcome
        }

        fn select(&mut self, anchor: (Vec<usize>, usize), focus: (Vec<usize>, usize)) {
            let target = Selection::new(Point::new(anchor.0, anchor.1), Point::new(focus.0, focus.1));
            assert_eq!(
                self.apply(|ctx| set_selection(ctx, &target)),
                CommandOutcome::Applied
            );
        }

        fn query(&mut self) -> EditContext<'_> {
            EditContext::new(&mut self.tree, &mut self.state, &self.rules, &self.config)
        }
    }

    fn bold(text: &str) -> Node {
        Node::Text(TextLeaf::with_marks(text, Marks::default().with(&Mark::Bold)))
    }

    #[test]
    fn test_toggle_mark_on_partial_leaf() {
        let mut fx = Fixture::new(&[Node::paragraph("abc")]);
        fx.select((vec![0, 0], 1), (vec![0, 0], 2));
        fx.apply(|ctx| toggle_mark(ctx, &Mark::Bold));
        assert_eq!(
            fx.tree.to_nodes(),
            vec![Node::element(
                ElementKind::paragraph(),
                vec![Node::text("a"), bold("b"), Node::text("c")]
            )]
        );
        assert!(fx.query().query().is_mark_active(&Mark::Bold).unwrap());
    }

    #[test]
    fn test_toggle_mark_twice_restores_tree() {
        let original = vec![Node::paragraph("hello"), Node::paragraph("world")];
        let mut fx = Fixture::new(&original);
        fx.select((vec![1, 0], 3), (vec![0, 0], 2));
        fx.apply(|ctx| toggle_mark(ctx, &Mark::Italic));
        assert_ne!(fx.tree.to_nodes(), original);
        fx.apply(|ctx| toggle_mark(ctx, &Mark::Italic));
        assert_eq!(fx.tree.to_nodes(), original);
    }

    #[test]
    fn test_collapsed_toggle_sets_pending_marks_only() {
        let original = vec![Node::paragraph("abc")];
        let mut fx = Fixture::new(&original);
        fx.select((vec![0, 0], 1), (vec![0, 0], 1));
        fx.apply(|ctx| toggle_mark(ctx, &Mark::Underline));
        assert_eq!(fx.tree.to_nodes(), original);
        assert!(fx.state.pending_marks.as_ref().unwrap().underline);
    }

    #[test]
    fn test_toggle_heading_and_back() {
        let mut fx = Fixture::new(&[Node::paragraph("A")]);
        fx.select((vec![0, 0], 0), (vec![0, 0], 0));
        fx.apply(|ctx| toggle_block(ctx, BlockFormat::Heading(2)));
        assert_eq!(
            fx.tree.to_nodes(),
            vec![Node::element(ElementKind::heading(2), vec![Node::text("A")])]
        );
        fx.apply(|ctx| toggle_block(ctx, BlockFormat::Heading(2)));
        assert_eq!(fx.tree.to_nodes(), vec![Node::paragraph("A")]);
    }

    #[test]
    fn test_toggle_list_wraps_consecutive_blocks() {
        let mut fx = Fixture::new(&[Node::paragraph("a"), Node::paragraph("b")]);
        fx.select((vec![0, 0], 0), (vec![1, 0], 1));
        fx.apply(|ctx| toggle_block(ctx, BlockFormat::NumberedList));
        let nodes = fx.tree.to_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].kind(), Some(&ElementKind::NumberedList));
        assert_eq!(nodes[0].children().len(), 2);

        fx.select((vec![0, 0, 0], 0), (vec![0, 1, 0], 1));
        fx.apply(|ctx| toggle_block(ctx, BlockFormat::NumberedList));
        assert_eq!(
            fx.tree.to_nodes(),
            vec![Node::paragraph("a"), Node::paragraph("b")]
        );
    }

    #[test]
    fn test_toggle_block_rejects_structural_formats() {
        let mut fx = Fixture::new(&[Node::paragraph("a")]);
        fx.select((vec![0, 0], 0), (vec![0, 0], 0));
        let outcome = fx.apply(|ctx| toggle_block(ctx, BlockFormat::Image));
        assert!(matches!(outcome, CommandOutcome::Rejected(_)));
        assert_eq!(fx.tree.to_nodes(), vec![Node::paragraph("a")]);
    }

    #[test]
    fn test_insert_table_after_block() {
        let mut fx = Fixture::new(&[Node::paragraph("a"), Node::paragraph("b")]);
        fx.select((vec![0, 0], 1), (vec![0, 0], 1));
        fx.apply(|ctx| insert_table(ctx, 2, 3));
        let nodes = fx.tree.to_nodes();
        assert_eq!(nodes[1], build_table(2, 3));
        assert_eq!(nodes[2], Node::paragraph("b"));
        let caret = fx.state.selection.unwrap().anchor;
        assert_eq!(fx.tree.path_of(caret.leaf).unwrap(), Path::new(vec![0, 0]));
    }

    #[test]
    fn test_insert_table_bounds() {
        let mut fx = Fixture::new(&[Node::paragraph("a")]);
        fx.select((vec![0, 0], 0), (vec![0, 0], 0));
        assert!(matches!(fx.apply(|ctx| insert_table(ctx, 0, 2)), CommandOutcome::Rejected(_)));
        assert!(matches!(fx.apply(|ctx| insert_table(ctx, 2, 21)), CommandOutcome::Rejected(_)));
        assert_eq!(fx.tree.to_nodes().len(), 1);
    }

    #[test]
    fn test_insert_image_adds_trailing_paragraph() {
        let mut fx = Fixture::new(&[Node::paragraph("a")]);
        fx.select((vec![0, 0], 0), (vec![0, 0], 0));
        fx.apply(|ctx| insert_image(ctx, "cat.png", Some("cat")));
        let nodes = fx.tree.to_nodes();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1].kind().unwrap().name(), "image");
        assert_eq!(nodes[1].children(), &[Node::empty_text()]);
        assert_eq!(nodes[2], Node::paragraph(""));
    }

    #[test]
    fn test_insert_link_at_caret() {
        let mut fx = Fixture::new(&[Node::paragraph("ab")]);
        fx.select((vec![0, 0], 1), (vec![0, 0], 1));
        fx.apply(|ctx| insert_link(ctx, "https://example.com", "site"));
        let link = Node::element(
            ElementKind::Link {
                url: "https://example.com".to_string(),
            },
            vec![Node::text("site")],
        );
        assert_eq!(
            fx.tree.to_nodes(),
            vec![Node::element(
                ElementKind::paragraph(),
                vec![Node::text("a"), link, Node::text("b")]
            )]
        );
        assert!(!fx.query().query().is_link_active().unwrap());
    }

    #[test]
    fn test_insert_link_wraps_selection_and_remove_link_restores() {
        let original = vec![Node::paragraph("click here")];
        let mut fx = Fixture::new(&original);
        fx.select((vec![0, 0], 6), (vec![0, 0], 10));
        fx.apply(|ctx| insert_link(ctx, "https://example.com", ""));
        let nodes = fx.tree.to_nodes();
        assert_eq!(nodes[0].children()[1].text_content(), "here");
        assert!(fx.query().query().is_link_active().unwrap());

        fx.apply(remove_link);
        assert_eq!(fx.tree.to_nodes(), original);
    }

    #[test]
    fn test_set_selection_rejects_void_points() {
        let mut fx = Fixture::new(&[
            Node::element(
                ElementKind::Image {
                    url: "a.png".to_string(),
                    alt: None,
                    caption: None,
                    width: None,
                    height: None,
                },
                vec![Node::empty_text()],
            ),
            Node::paragraph(""),
        ]);
        let target = Selection::collapsed(Point::new(vec![0, 0], 0));
        assert!(matches!(
            fx.apply(|ctx| set_selection(ctx, &target)),
            CommandOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_set_alignment() {
        let mut fx = Fixture::new(&[Node::paragraph("a")]);
        fx.select((vec![0, 0], 0), (vec![0, 0], 0));
        assert_eq!(
            fx.apply(|ctx| set_alignment(ctx, Some(Align::Center))),
            CommandOutcome::Applied
        );
        assert_eq!(
            fx.tree.to_nodes()[0].kind(),
            Some(&ElementKind::Paragraph {
                align: Some(Align::Center)
            })
        );
        assert_eq!(
            fx.apply(|ctx| set_alignment(ctx, Some(Align::Center))),
            CommandOutcome::Noop
        );
    }
}
