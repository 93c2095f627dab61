//! # Selection Addressing
//!
//! Public selections are path based ([`Selection`]). Inside a session the
//! selection is held as [`LeafRange`]: leaf ids plus char offsets, which
//! survive sibling splices. Conversion happens at the API boundary.

use crate::errors::{EditorError, EditorResult};
use crate::rules::RulePipeline;
use richdoc_model::{DocumentTree, NodeId, Point, Selection};
use std::cmp::Ordering;

/// Caret position addressed by leaf id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafPoint {
    pub leaf: NodeId,
    pub offset: usize,
}

impl LeafPoint {
    pub fn new(leaf: NodeId, offset: usize) -> Self {
        Self { leaf, offset }
    }
}

/// Anchor/focus pair of leaf points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafRange {
    pub anchor: LeafPoint,
    pub focus: LeafPoint,
}

impl LeafRange {
    pub fn new(anchor: LeafPoint, focus: LeafPoint) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: LeafPoint) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Whether `id` is, or sits inside, a void element
pub fn in_void(tree: &DocumentTree, rules: &RulePipeline, id: NodeId) -> bool {
    tree.closest(id, |kind| rules.is_void(kind)).is_some()
}

pub fn resolve_point(tree: &DocumentTree, rules: &RulePipeline, point: &Point) -> EditorResult<LeafPoint> {
    let id = tree.node_at_path(&point.path)?;
    let leaf = tree
        .leaf(id)
        .ok_or_else(|| EditorError::InvalidSelection(format!("{} is not a text leaf", point.path)))?;
    if point.offset > leaf.char_len() {
        return Err(EditorError::InvalidSelection(format!(
            "offset {} past the end of {}",
            point.offset, point.path
        )));
    }
    if in_void(tree, rules, id) {
        return Err(EditorError::InvalidSelection(format!(
            "{} is inside a void element",
            point.path
        )));
    }
    Ok(LeafPoint::new(id, point.offset))
}

pub fn resolve_selection(tree: &DocumentTree, rules: &RulePipeline, selection: &Selection) -> EditorResult<LeafRange> {
    Ok(LeafRange::new(
        resolve_point(tree, rules, &selection.anchor)?,
        resolve_point(tree, rules, &selection.focus)?,
    ))
}

pub fn to_point(tree: &DocumentTree, point: LeafPoint) -> EditorResult<Point> {
    Ok(Point::new(tree.path_of(point.leaf)?, point.offset))
}

pub fn to_selection(tree: &DocumentTree, range: LeafRange) -> EditorResult<Selection> {
    Ok(Selection::new(
        to_point(tree, range.anchor)?,
        to_point(tree, range.focus)?,
    ))
}

pub fn compare(tree: &DocumentTree, a: LeafPoint, b: LeafPoint) -> EditorResult<Ordering> {
    if a.leaf == b.leaf {
        return Ok(a.offset.cmp(&b.offset));
    }
    Ok(tree.path_of(a.leaf)?.cmp(&tree.path_of(b.leaf)?))
}

/// `(start, end)` of a range in document order
pub fn edges(tree: &DocumentTree, range: LeafRange) -> EditorResult<(LeafPoint, LeafPoint)> {
    match compare(tree, range.anchor, range.focus)? {
        Ordering::Greater => Ok((range.focus, range.anchor)),
        _ => Ok((range.anchor, range.focus)),
    }
}

fn char_len(tree: &DocumentTree, leaf: NodeId) -> usize {
    tree.leaf(leaf).map(|l| l.char_len()).unwrap_or(0)
}

/// Text leaves a caret may enter, in document order
pub fn editable_leaves(tree: &DocumentTree, rules: &RulePipeline) -> Vec<NodeId> {
    tree.text_leaves(tree.root())
        .into_iter()
        .filter(|leaf| !in_void(tree, rules, *leaf))
        .collect()
}

/// Editable leaves from `start.leaf` to `end.leaf`, both included
pub fn leaves_between(tree: &DocumentTree, rules: &RulePipeline, start: LeafPoint, end: LeafPoint) -> Vec<NodeId> {
    let leaves = editable_leaves(tree, rules);
    let first = leaves.iter().position(|leaf| *leaf == start.leaf);
    let last = leaves.iter().position(|leaf| *leaf == end.leaf);
    match (first, last) {
        (Some(first), Some(last)) if first <= last => leaves[first..=last].to_vec(),
        _ => Vec::new(),
    }
}

/// Leaves whose characters the range actually covers: an edge leaf the
/// range only touches at its boundary is left out.
pub fn covered_leaves(tree: &DocumentTree, rules: &RulePipeline, start: LeafPoint, end: LeafPoint) -> Vec<NodeId> {
    if start.leaf == end.leaf {
        return if start.offset < end.offset {
            vec![start.leaf]
        } else {
            Vec::new()
        };
    }
    leaves_between(tree, rules, start, end)
        .into_iter()
        .filter(|leaf| {
            if *leaf == start.leaf {
                return start.offset < char_len(tree, *leaf);
            }
            if *leaf == end.leaf {
                return end.offset > 0;
            }
            true
        })
        .collect()
}

/// Pull an expanded range whose end sits at the very start of a later leaf
/// back to the end of the previous leaf, so that a triple-click style
/// selection does not count the following block as selected.
pub fn unhang(tree: &DocumentTree, rules: &RulePipeline, range: LeafRange) -> EditorResult<LeafRange> {
    if range.is_collapsed() {
        return Ok(range);
    }
    let (start, end) = edges(tree, range)?;
    if end.offset != 0 || end.leaf == start.leaf {
        return Ok(LeafRange::new(start, end));
    }
    let leaves = leaves_between(tree, rules, start, end);
    match leaves.len().checked_sub(2).and_then(|i| leaves.get(i)) {
        Some(previous) => Ok(LeafRange::new(
            start,
            LeafPoint::new(*previous, char_len(tree, *previous)),
        )),
        None => Ok(LeafRange::new(start, end)),
    }
}

/// Nearest enclosing block of a node: the closest element that is not
/// inline
pub fn block_of(tree: &DocumentTree, rules: &RulePipeline, id: NodeId) -> Option<NodeId> {
    let start = if tree.is_text(id) { tree.parent(id)? } else { id };
    tree.closest(start, |kind| !rules.is_inline(kind))
}

/// Lowest blocks touched by the range, in document order
pub fn blocks_in(tree: &DocumentTree, rules: &RulePipeline, start: LeafPoint, end: LeafPoint) -> Vec<NodeId> {
    let mut leaves = covered_leaves(tree, rules, start, end);
    if leaves.is_empty() {
        leaves.push(start.leaf);
    }
    let mut blocks: Vec<NodeId> = Vec::new();
    for leaf in leaves {
        if let Some(block) = block_of(tree, rules, leaf) {
            if !blocks.contains(&block) {
                blocks.push(block);
            }
        }
    }
    blocks
}

pub fn start_of(tree: &DocumentTree, rules: &RulePipeline, id: NodeId) -> Option<LeafPoint> {
    tree.text_leaves(id)
        .into_iter()
        .find(|leaf| !in_void(tree, rules, *leaf))
        .map(|leaf| LeafPoint::new(leaf, 0))
}

pub fn end_of(tree: &DocumentTree, rules: &RulePipeline, id: NodeId) -> Option<LeafPoint> {
    tree.text_leaves(id)
        .into_iter()
        .rev()
        .find(|leaf| !in_void(tree, rules, *leaf))
        .map(|leaf| LeafPoint::new(leaf, char_len(tree, leaf)))
}

/// Whether no text precedes the point inside `block`
pub fn is_at_start(tree: &DocumentTree, rules: &RulePipeline, point: LeafPoint, block: NodeId) -> bool {
    if point.offset > 0 {
        return false;
    }
    tree.text_leaves(block)
        .into_iter()
        .filter(|leaf| !in_void(tree, rules, *leaf))
        .take_while(|leaf| *leaf != point.leaf)
        .all(|leaf| char_len(tree, leaf) == 0)
}

/// Whether no text follows the point inside `block`
pub fn is_at_end(tree: &DocumentTree, rules: &RulePipeline, point: LeafPoint, block: NodeId) -> bool {
    if point.offset < char_len(tree, point.leaf) {
        return false;
    }
    tree.text_leaves(block)
        .into_iter()
        .filter(|leaf| !in_void(tree, rules, *leaf))
        .skip_while(|leaf| *leaf != point.leaf)
        .skip(1)
        .all(|leaf| char_len(tree, leaf) == 0)
}

/// Text leaf immediately before `leaf` in document order, void content
/// included
pub fn previous_leaf(tree: &DocumentTree, leaf: NodeId) -> Option<NodeId> {
    let leaves = tree.text_leaves(tree.root());
    let index = leaves.iter().position(|l| *l == leaf)?;
    index.checked_sub(1).map(|i| leaves[i])
}

/// Text leaf immediately after `leaf` in document order, void content
/// included
pub fn next_leaf(tree: &DocumentTree, leaf: NodeId) -> Option<NodeId> {
    let leaves = tree.text_leaves(tree.root());
    let index = leaves.iter().position(|l| *l == leaf)?;
    leaves.get(index + 1).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use richdoc_model::{ElementKind, Node, Path};

    fn tree() -> DocumentTree {
        DocumentTree::from_nodes(&[
            Node::paragraph("hello"),
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
            Node::paragraph("world"),
        ])
    }

    #[test]
    fn test_resolve_rejects_void_and_bad_offsets() {
        let tree = tree();
        let rules = RulePipeline::standard();
        assert!(resolve_point(&tree, &rules, &Point::new(vec![0, 0], 5)).is_ok());
        assert!(resolve_point(&tree, &rules, &Point::new(vec![0, 0], 6)).is_err());
        assert!(resolve_point(&tree, &rules, &Point::new(vec![1, 0], 0)).is_err());
        assert!(resolve_point(&tree, &rules, &Point::new(vec![0], 0)).is_err());
    }

    #[test]
    fn test_unhang_pulls_end_back() {
        let tree = tree();
        let rules = RulePipeline::standard();
        let first = tree.node_at_path(&Path::new(vec![0, 0])).unwrap();
        let last = tree.node_at_path(&Path::new(vec![2, 0])).unwrap();
        let range = LeafRange::new(LeafPoint::new(first, 0), LeafPoint::new(last, 0));
        let unhung = unhang(&tree, &rules, range).unwrap();
        assert_eq!(unhung.focus, LeafPoint::new(first, 5));
        assert_eq!(blocks_in(&tree, &rules, unhung.anchor, unhung.focus).len(), 1);
    }

    #[test]
    fn test_covered_leaves_skips_touching_edges() {
        let tree = tree();
        let rules = RulePipeline::standard();
        let first = tree.node_at_path(&Path::new(vec![0, 0])).unwrap();
        let last = tree.node_at_path(&Path::new(vec![2, 0])).unwrap();
        let covered = covered_leaves(&tree, &rules, LeafPoint::new(first, 5), LeafPoint::new(last, 3));
        assert_eq!(covered, vec![last]);
    }

    #[test]
    fn test_start_and_end_checks() {
        let tree = tree();
        let rules = RulePipeline::standard();
        let block = tree.blocks()[0];
        let leaf = tree.children(block)[0];
        assert!(is_at_start(&tree, &rules, LeafPoint::new(leaf, 0), block));
        assert!(!is_at_start(&tree, &rules, LeafPoint::new(leaf, 1), block));
        assert!(is_at_end(&tree, &rules, LeafPoint::new(leaf, 5), block));
    }
}
