use crate::kind::ElementKind;
use crate::marks::Marks;
use serde::{Deserialize, Serialize};

/// Text leaf. Never has children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLeaf {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl TextLeaf {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    /// Length in chars; offsets into a leaf count chars, not bytes
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte index of the char offset (clamped to the end)
    pub fn byte_index(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map(|(index, _)| index)
            .unwrap_or(self.text.len())
    }
}

/// Element node: kind plus ordered children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Document node snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(TextLeaf),
    Element(Element),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextLeaf::new(text))
    }

    pub fn empty_text() -> Self {
        Node::Text(TextLeaf::empty())
    }

    pub fn element(kind: ElementKind, children: Vec<Node>) -> Self {
        Node::Element(Element { kind, children })
    }

    /// Paragraph holding a single unmarked text leaf
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element(ElementKind::paragraph(), vec![Node::text(text)])
    }

    /// The document every failed load or repair falls back to
    pub fn default_document() -> Vec<Node> {
        vec![Node::paragraph("")]
    }

    pub fn kind(&self) -> Option<&ElementKind> {
        match self {
            Node::Element(element) => Some(&element.kind),
            Node::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Text(_) => &[],
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Concatenated text of all leaves under this node
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(leaf) => out.push_str(&leaf.text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Align;
    use serde_json::json;

    #[test]
    fn test_slate_json_roundtrip_shape() {
        let value = json!([
            {"type": "heading", "level": 2, "align": "center", "children": [
                {"text": "Title", "bold": true}
            ]},
            {"type": "paragraph", "children": [
                {"text": "see "},
                {"type": "link", "url": "https://example.com", "children": [{"text": "here"}]},
                {"text": ""}
            ]}
        ]);

        let nodes: Vec<Node> = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(
            nodes[0].kind(),
            Some(&ElementKind::Heading {
                level: 2,
                align: Some(Align::Center)
            })
        );
        assert!(nodes[1].children()[1].kind().unwrap().is_link());
        assert_eq!(serde_json::to_value(&nodes).unwrap(), value);
    }

    #[test]
    fn test_text_content() {
        let node = Node::element(
            ElementKind::paragraph(),
            vec![Node::text("a"), Node::text("b")],
        );
        assert_eq!(node.text_content(), "ab");
    }

    #[test]
    fn test_byte_index_multibyte() {
        let leaf = TextLeaf::new("héllo");
        assert_eq!(leaf.char_len(), 5);
        assert_eq!(leaf.byte_index(2), 3);
        assert_eq!(leaf.byte_index(10), leaf.text.len());
    }
}
