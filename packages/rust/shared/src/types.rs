//! Core domain types for executive-order tracking.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Version of the metadata log column layout in [`METADATA_LOG_COLUMNS`].
pub const METADATA_LOG_SCHEMA_VERSION: u32 = 1;

/// Fixed header of the metadata log, in column order.
pub const METADATA_LOG_COLUMNS: [&str; 9] = [
    "document_number",
    "executive_order_number",
    "title",
    "citation",
    "publication_date",
    "signing_date",
    "agencies",
    "pdf_url",
    "html_url",
];

/// Delimiter used when flattening list-valued fields into one log cell.
pub const LIST_DELIMITER: &str = "; ";

/// Date format shared by the upstream API and the watermark file.
const ISO_DATE: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Watermark
// ---------------------------------------------------------------------------

/// Publication date of the most recently processed order.
///
/// Used as the inclusive lower bound of the next incremental query. Never
/// moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watermark(pub NaiveDate);

impl Watermark {
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Advance to the latest of `dates`, keeping the current value when
    /// `dates` is empty or entirely older.
    pub fn advance<I>(self, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates
            .into_iter()
            .fold(self, |current, date| current.max(Self(date)))
    }
}

impl From<NaiveDate> for Watermark {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl std::fmt::Display for Watermark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(ISO_DATE))
    }
}

impl std::str::FromStr for Watermark {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(NaiveDate::parse_from_str(s.trim(), ISO_DATE)?))
    }
}

// ---------------------------------------------------------------------------
// OrderRecord
// ---------------------------------------------------------------------------

/// One agency reference attached to an upstream document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub raw_name: Option<String>,
}

impl AgencyRef {
    /// Display name, falling back to the raw upstream name.
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.raw_name.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// One executive order as returned by the documents search API.
///
/// Every field is optional: upstream metadata is not schema-validated, and a
/// missing field only matters where it is actually needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default)]
    pub document_number: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub executive_order_number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub citation: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub signing_date: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub agencies: Vec<AgencyRef>,
}

impl OrderRecord {
    /// The document number, if present and non-blank.
    pub fn document_id(&self) -> Option<&str> {
        self.document_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Publication date parsed as an ISO date; `None` if absent or malformed.
    pub fn parsed_publication_date(&self) -> Option<NaiveDate> {
        self.publication_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), ISO_DATE).ok())
    }

    /// Flatten into a metadata log row.
    pub fn to_metadata_row(&self) -> MetadataRow {
        let text = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();

        MetadataRow {
            document_number: text(&self.document_number),
            executive_order_number: text(&self.executive_order_number),
            title: text(&self.title),
            citation: text(&self.citation),
            publication_date: text(&self.publication_date),
            signing_date: text(&self.signing_date),
            agencies: self
                .agencies
                .iter()
                .filter_map(AgencyRef::label)
                .collect::<Vec<_>>()
                .join(LIST_DELIMITER),
            pdf_url: text(&self.pdf_url),
            html_url: text(&self.html_url),
        }
    }
}

/// One page of the documents search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentsPage {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub next_page_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<OrderRecord>,
}

// ---------------------------------------------------------------------------
// MetadataRow
// ---------------------------------------------------------------------------

/// A flattened, all-scalar metadata log row. Field order matches
/// [`METADATA_LOG_COLUMNS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRow {
    pub document_number: String,
    pub executive_order_number: String,
    pub title: String,
    pub citation: String,
    pub publication_date: String,
    pub signing_date: String,
    pub agencies: String,
    pub pdf_url: String,
    pub html_url: String,
}

impl MetadataRow {
    /// Cells in column order.
    pub fn cells(&self) -> [&str; 9] {
        [
            &self.document_number,
            &self.executive_order_number,
            &self.title,
            &self.citation,
            &self.publication_date,
            &self.signing_date,
            &self.agencies,
            &self.pdf_url,
            &self.html_url,
        ]
    }
}

// ---------------------------------------------------------------------------
// serde helpers
// ---------------------------------------------------------------------------

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The API reports executive order numbers as integers, but older records
/// carry strings.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|v| match v {
        Scalar::Text(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
    }))
}
