//! Full-text document location convention.

use chrono::{Datelike, NaiveDate};
use url::Url;

use eo_tracker_shared::{DocumentPathStyle, EoTrackerError, Result};

/// Resolve the URL of an order's full-text XML document.
///
/// Pure: combines `base`, the publication date split into `yyyy/mm/dd`, and
/// the document number according to `style`. Fails with a validation error
/// when the date is absent or the document number is empty, starts with a
/// dot, or contains path syntax.
pub fn resolve_document_url(
    base: &Url,
    style: DocumentPathStyle,
    publication_date: Option<NaiveDate>,
    document_id: &str,
) -> Result<Url> {
    let id = document_id.trim();
    if id.is_empty() {
        return Err(EoTrackerError::validation("empty document number"));
    }
    if id.starts_with('.') || id.contains(['/', '\\', '?', '#']) {
        return Err(EoTrackerError::validation(format!(
            "document number {id:?} contains path characters"
        )));
    }
    let date = publication_date.ok_or_else(|| {
        EoTrackerError::validation(format!("missing or malformed publication date for {id}"))
    })?;

    let mut segments = vec![
        format!("{:04}", date.year()),
        format!("{:02}", date.month()),
        format!("{:02}", date.day()),
    ];
    match style {
        DocumentPathStyle::Nested => {
            segments.push(id.to_string());
            segments.push("document.xml".to_string());
        }
        DocumentPathStyle::Flat => segments.push(format!("{id}.xml")),
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| EoTrackerError::validation(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(&segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.federalregister.gov/documents/full_text/xml").unwrap()
    }

    fn feb_3() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 2, 3)
    }

    #[test]
    fn nested_layout() {
        let url = resolve_document_url(&base(), DocumentPathStyle::Nested, feb_3(), "2025-02841")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.federalregister.gov/documents/full_text/xml/2025/02/03/2025-02841/document.xml"
        );
    }

    #[test]
    fn flat_layout() {
        let url =
            resolve_document_url(&base(), DocumentPathStyle::Flat, feb_3(), "2025-02841").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.federalregister.gov/documents/full_text/xml/2025/02/03/2025-02841.xml"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let base = Url::parse("https://example.gov/xml/").unwrap();
        let url =
            resolve_document_url(&base, DocumentPathStyle::Nested, feb_3(), " 2025-02841 ").unwrap();
        assert_eq!(url.as_str(), "https://example.gov/xml/2025/02/03/2025-02841/document.xml");
    }

    #[test]
    fn empty_document_id_is_validation_error() {
        for id in ["", "   "] {
            let err = resolve_document_url(&base(), DocumentPathStyle::Nested, feb_3(), id)
                .unwrap_err();
            assert!(matches!(err, EoTrackerError::Validation { .. }));
        }
    }

    #[test]
    fn missing_date_is_validation_error() {
        let err = resolve_document_url(&base(), DocumentPathStyle::Nested, None, "2025-02841")
            .unwrap_err();
        assert!(matches!(err, EoTrackerError::Validation { .. }));
        assert!(err.to_string().contains("2025-02841"));
    }

    #[test]
    fn path_syntax_in_document_id_is_rejected() {
        for id in ["../secret", "..", ".", ".hidden", "a?b", "a#b"] {
            for style in [DocumentPathStyle::Nested, DocumentPathStyle::Flat] {
                let err = resolve_document_url(&base(), style, feb_3(), id).unwrap_err();
                assert!(matches!(err, EoTrackerError::Validation { .. }), "{id:?}");
            }
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = resolve_document_url(&base(), DocumentPathStyle::Nested, feb_3(), "2025-02841");
        let b = resolve_document_url(&base(), DocumentPathStyle::Nested, feb_3(), "2025-02841");
        assert_eq!(a.unwrap(), b.unwrap());
    }
}
