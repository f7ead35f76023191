//! The document tree and its depth-first flattening into text lines.

/// A node in a parsed full-text document.
///
/// Element nodes carry a `tag`; text runs that follow a child element
/// (mixed content) are stored as tag-less nodes in `children`, so document
/// order is fully described by `text` followed by `children`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentNode {
    /// Element name, `None` for a bare text run.
    pub tag: Option<String>,
    /// Attributes in source order. Never emitted as text.
    pub attributes: Vec<(String, String)>,
    /// Text directly inside this node, before its first child.
    pub text: Option<String>,
    /// Child nodes in document order.
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// An element node with no content.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Default::default()
        }
    }

    /// A tag-less text run.
    pub fn text_run(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append character data at the current end of this node's content.
    ///
    /// Before any child exists the data extends `text`; afterwards it extends
    /// the trailing text run, starting a new one after an element child.
    pub(crate) fn push_text(&mut self, data: &str) {
        match self.children.last_mut() {
            None => self.text.get_or_insert_with(String::new).push_str(data),
            Some(last) if last.tag.is_none() => {
                last.text.get_or_insert_with(String::new).push_str(data)
            }
            Some(_) => self.children.push(Self::text_run(data)),
        }
    }
}

/// Flatten a document tree into trimmed, non-empty text lines.
///
/// Pre-order traversal: a node's own text comes first, then each child's
/// lines in document order. Tags, attributes, and whitespace-only text never
/// produce output. Uses an explicit stack, so arbitrarily deep trees are safe.
pub fn flatten(root: &DocumentNode) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if let Some(text) = node.text.as_deref() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        // Reverse so the first child is popped next.
        stack.extend(node.children.iter().rev());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> DocumentNode {
        DocumentNode::element("EXECORD")
            .with_child(DocumentNode::element("HD").with_text("  Title  "))
            .with_child(
                DocumentNode::element("P")
                    .with_text("Sec. 1")
                    .with_child(DocumentNode::element("E").with_text("Purpose."))
                    .with_child(DocumentNode::text_run(" The rest.\n")),
            )
            .with_child(DocumentNode::element("FP").with_text("Closing"))
    }

    #[test]
    fn flatten_preserves_document_order() {
        let root = DocumentNode::element("root")
            .with_child(DocumentNode::element("A").with_text("one"))
            .with_child(DocumentNode::element("B").with_text("two"));
        assert_eq!(flatten(&root), vec!["one", "two"]);
    }

    #[test]
    fn flatten_is_preorder() {
        assert_eq!(
            flatten(&sample_tree()),
            vec!["Title", "Sec. 1", "Purpose.", "The rest.", "Closing"]
        );
    }

    #[test]
    fn flatten_is_deterministic() {
        let tree = sample_tree();
        let first = flatten(&tree);
        let second = flatten(&tree);
        assert_eq!(first, second);
        assert_eq!(tree, sample_tree(), "flatten must not mutate its input");
    }

    #[test]
    fn whitespace_only_text_is_dropped() {
        let root = DocumentNode::element("root")
            .with_text("   ")
            .with_child(DocumentNode::element("PSIG").with_text("\n\t  "))
            .with_child(DocumentNode::element("P").with_text("kept"));
        assert_eq!(flatten(&root), vec!["kept"]);
    }

    #[test]
    fn empty_tree_yields_no_lines() {
        let root = DocumentNode::element("root")
            .with_child(DocumentNode::element("GPH").with_child(DocumentNode::element("GID")))
            .with_child(DocumentNode::text_run("  "));
        assert!(flatten(&root).is_empty());
        assert!(flatten(&DocumentNode::default()).is_empty());
    }

    #[test]
    fn attributes_and_tags_never_emitted() {
        let root = DocumentNode::element("HD")
            .with_attribute("SOURCE", "HED")
            .with_text("Heading");
        assert_eq!(flatten(&root), vec!["Heading"]);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let depth = 1_000;
        let mut node = DocumentNode::element("leaf").with_text("bottom");
        for i in 0..depth {
            node = DocumentNode::element(format!("n{i}")).with_child(node);
        }
        let root = node.with_text("top");
        assert_eq!(flatten(&root), vec!["top", "bottom"]);
    }

    #[test]
    fn push_text_builds_mixed_content() {
        let mut p = DocumentNode::element("P");
        p.push_text("before ");
        p.push_text("& more");
        p.children.push(DocumentNode::element("E").with_text("emph"));
        p.push_text(" after");
        p.push_text(" again");

        assert_eq!(p.text.as_deref(), Some("before & more"));
        assert_eq!(p.children.len(), 2);
        assert_eq!(p.children[1], DocumentNode::text_run(" after again"));
    }
}
