//! Full-text XML → plain-text conversion.
//!
//! Parses an order's structured XML into a [`DocumentNode`] tree with
//! `quick-xml`, then flattens the tree depth-first into trimmed text lines.
//! Tags, attributes, and markup never reach the output.

mod node;
mod parse;

use tracing::{debug, instrument};

use eo_tracker_shared::Result;

pub use node::{DocumentNode, flatten};
pub use parse::parse_document;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Result of converting one XML document to plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertResult {
    /// Extracted lines, in document order.
    pub lines: Vec<String>,
    /// The lines joined with `\n` (no trailing newline).
    pub text: String,
}

impl ConvertResult {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Convert an XML document to plain text.
///
/// Fails with a parse error when `xml` is not well-formed; a well-formed
/// document without any text converts to an empty result.
#[instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn convert(xml: &str) -> Result<ConvertResult> {
    let root = parse_document(xml)?;
    let lines = flatten(&root);
    let text = lines.join("\n");

    debug!(line_count = lines.len(), text_len = text.len(), "conversion complete");

    Ok(ConvertResult { lines, text })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use eo_tracker_shared::EoTrackerError;
    use std::fs;

    fn load_fixture(name: &str) -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    #[test]
    fn convert_simple_document() {
        let result = convert("<EXECORD><HD>Title</HD><P>Body text.</P></EXECORD>").unwrap();
        assert_eq!(result.lines, vec!["Title", "Body text."]);
        assert_eq!(result.text, "Title\nBody text.");
        assert_eq!(result.line_count(), 2);
    }

    #[test]
    fn convert_mixed_content_in_order() {
        let xml = "<P>\n  <E T=\"04\">Sec. 2</E>. <E T=\"03\">Definitions.</E> For the purposes:\n</P>";
        let result = convert(xml).unwrap();
        assert_eq!(
            result.lines,
            vec!["Sec. 2", ".", "Definitions.", "For the purposes:"]
        );
    }

    #[test]
    fn convert_textless_document_is_empty() {
        let result = convert("<PRESDOCU><PRTPAGE P=\"1\"/>  <GPH> </GPH></PRESDOCU>").unwrap();
        assert!(result.is_empty());
        assert_eq!(result.text, "");
    }

    #[test]
    fn convert_malformed_is_parse_error() {
        let err = convert("<PRESDOCU><P>unterminated</PRESDOCU>").unwrap_err();
        assert!(matches!(err, EoTrackerError::Parse { .. }));
    }

    #[test]
    fn convert_executive_order_fixture() {
        let xml = load_fixture("xml/executive-order.xml");
        let result = convert(&xml).unwrap();

        assert_eq!(result.lines[0], "Executive Order 14215 of February 18, 2025");
        assert_eq!(result.lines[1], "Ensuring Accountability for All Agencies");
        assert!(result.lines.contains(&"Section 1".to_string()));
        assert!(result.lines.contains(
            &"The Constitution vests all executive power in the President.".to_string()
        ));
        assert!(result.lines.contains(
            &"(a) The term \u{201C}independent regulatory agency\u{201D} has the meaning given in 44 U.S.C. 3502(5)."
                .to_string()
        ));
        assert!(result.lines.iter().any(|l| l.contains("\"employees\" & \"officers\"")));
        assert_eq!(result.lines.last().map(String::as_str), Some("Billing code 3395-F4-P"));

        // No markup or attribute values leak through.
        assert!(!result.text.contains('<'));
        assert!(!result.text.contains("HED"));
        assert!(result.lines.iter().all(|l| !l.is_empty() && l.trim() == l));
    }

    #[test]
    fn convert_is_deterministic() {
        let xml = load_fixture("xml/executive-order.xml");
        assert_eq!(convert(&xml).unwrap(), convert(&xml).unwrap());
    }
}
