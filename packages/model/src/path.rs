use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Sequence of child indices from the document root.
///
/// Lexicographic order is document order, with an ancestor sorting before
/// its descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<usize>);

impl Path {
    pub fn new(indices: Vec<usize>) -> Self {
        Path(indices)
    }

    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            return None;
        }
        Some(Path(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Index of the top-level block this path lives in
    pub fn top(&self) -> Option<usize> {
        self.0.first().copied()
    }

    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Path(indices)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "]")
    }
}

/// Address of a caret position: a text leaf path plus a char offset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then_with(|| self.offset.cmp(&other.offset))
    }
}

/// Anchor/focus pair. Collapsed when both are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// `(start, end)` in document order
    pub fn edges(&self) -> (&Point, &Point) {
        if self.anchor <= self.focus {
            (&self.anchor, &self.focus)
        } else {
            (&self.focus, &self.anchor)
        }
    }

    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order() {
        let a = Path::new(vec![0, 1]);
        let b = Path::new(vec![1]);
        let c = Path::new(vec![0]);
        assert!(a < b);
        assert!(c < a);
        assert!(c.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&a));
    }

    #[test]
    fn test_selection_edges() {
        let sel = Selection::new(Point::new(vec![1, 0], 2), Point::new(vec![0, 0], 5));
        let (start, end) = sel.edges();
        assert_eq!(start.path, Path::new(vec![0, 0]));
        assert_eq!(end.offset, 2);
        assert!(sel.is_backward());
        assert!(!sel.is_collapsed());
    }

    #[test]
    fn test_path_display() {
        assert_eq!(Path::new(vec![0, 2, 1]).to_string(), "[0,2,1]");
        assert_eq!(Path::new(vec![3]).parent(), Some(Path::root()));
    }
}
