//! Plain-text bridge. Lossy by nature: lists, tables and marks flatten to
//! their text.

use richdoc_model::Node;

/// One line per top-level block. Nested blocks contribute their text
/// concatenated; void blocks contribute nothing.
pub fn serialize(nodes: &[Node]) -> String {
    nodes
        .iter()
        .map(Node::text_content)
        .collect::<Vec<_>>()
        .join("\n")
}

/// One paragraph per line; `\r\n` counts as a single break
pub fn deserialize(text: &str) -> Vec<Node> {
    if text.is_empty() {
        return Node::default_document();
    }
    text.split('\n')
        .map(|line| Node::paragraph(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

/// Serialized text cut to at most `max_chars` characters, with `…`
/// appended when anything was dropped
pub fn excerpt(nodes: &[Node], max_chars: usize) -> String {
    let text = serialize(nodes);
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richdoc_model::ElementKind;

    #[test]
    fn test_serialize_blocks() {
        let nodes = vec![
            Node::paragraph("one"),
            Node::element(
                ElementKind::BulletedList,
                vec![
                    Node::element(ElementKind::ListItem, vec![Node::text("a")]),
                    Node::element(ElementKind::ListItem, vec![Node::text("b")]),
                ],
            ),
            Node::element(
                ElementKind::Image {
                    url: "x.png".to_string(),
                    alt: Some("ignored".to_string()),
                    caption: None,
                    width: None,
                    height: None,
                },
                vec![Node::empty_text()],
            ),
            Node::paragraph("two"),
        ];
        assert_eq!(serialize(&nodes), "one\nab\n\ntwo");
    }

    #[test]
    fn test_deserialize_lines() {
        assert_eq!(
            deserialize("a\r\nb\n"),
            vec![Node::paragraph("a"), Node::paragraph("b"), Node::paragraph("")]
        );
        assert_eq!(deserialize(""), Node::default_document());
    }

    #[test]
    fn test_excerpt_cuts_on_char_boundary() {
        let nodes = vec![Node::paragraph("héllo wörld")];
        assert_eq!(excerpt(&nodes, 6), "héllo…");
        assert_eq!(excerpt(&nodes, 7), "héllo w…");
        assert_eq!(excerpt(&nodes, 11), "héllo wörld");
        assert_eq!(excerpt(&nodes, 0), "…");
    }
}
