//! # Rich Document Model
//!
//! Typed node tree for the embedded rich-text editor.
//!
//! Two representations of the same document live here:
//!
//! - [`Node`]: owned, recursive, serde-friendly snapshot. This is the shape
//!   hosts store and exchange (Slate-compatible JSON).
//! - [`DocumentTree`]: arena of nodes keyed by [`NodeId`] with parent links
//!   and ordered child lists. Editing happens here.
//!
//! Addresses into the tree are either stable ids (inside the editor) or
//! [`Path`]s (at the API boundary).

pub mod error;
pub mod kind;
pub mod marks;
pub mod node;
pub mod path;
pub mod tree;

pub use error::{ModelError, ModelResult};
pub use kind::{Align, BlockFormat, ElementKind, FileInfo, RecordInfo};
pub use marks::{Mark, Marks};
pub use node::{Element, Node, TextLeaf};
pub use path::{Path, Point, Selection};
pub use tree::{DocumentTree, NodeData, NodeId};
