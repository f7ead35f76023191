//! Watermark-driven client for the documents search API.
//!
//! Builds the incremental query from the stored watermark and the configured
//! filters, follows pagination until the result set is exhausted, and fetches
//! per-order full-text documents. Requests are issued one at a time.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use eo_tracker_shared::{
    ApiConfig, DocumentsPage, EoTrackerError, FilterSet, OrderRecord, Result, Watermark,
};

use crate::document::resolve_document_url;

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("eo-tracker/", env!("CARGO_PKG_VERSION"));

/// Fields requested from the search endpoint (`fields[]`).
const REQUESTED_FIELDS: [&str; 9] = [
    "document_number",
    "executive_order_number",
    "title",
    "citation",
    "publication_date",
    "signing_date",
    "pdf_url",
    "html_url",
    "agencies",
];

// ---------------------------------------------------------------------------
// FetchOutcome
// ---------------------------------------------------------------------------

/// Records returned by one incremental query.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// All matching records, concatenated across pages in API order.
    pub orders: Vec<OrderRecord>,
    /// Latest publication date seen, never earlier than the input watermark.
    pub watermark: Watermark,
    /// Number of pages requested.
    pub pages: usize,
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Sequential HTTP client for the search endpoint and full-text documents.
pub struct Fetcher {
    client: Client,
    api: ApiConfig,
    base_url: Url,
    document_base_url: Url,
}

impl Fetcher {
    /// Create a fetcher for the given API settings.
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let parse = |name: &str, value: &str| {
            Url::parse(value)
                .map_err(|e| EoTrackerError::config(format!("{name} {value:?} is invalid: {e}")))
        };
        let base_url = parse("api.base_url", &api.base_url)?;
        let document_base_url = parse("api.document_base_url", &api.document_base_url)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| EoTrackerError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api: api.clone(),
            base_url,
            document_base_url,
        })
    }

    /// First-page query URL: every filter as an equality condition plus
    /// `publication_date >= watermark`.
    pub fn query_url(&self, watermark: Watermark, filters: &FilterSet) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("per_page", &self.api.per_page.to_string())
                .append_pair("order", &self.api.order)
                .append_pair("conditions[publication_date][gte]", &watermark.to_string())
                .append_pair("conditions[type][]", &filters.doc_type)
                .append_pair("conditions[presidential_document_type][]", &filters.subtype)
                .append_pair("conditions[president][]", &filters.signer);
            for field in REQUESTED_FIELDS {
                pairs.append_pair("fields[]", field);
            }
        }
        url
    }

    /// Fetch every record published on or after `watermark`.
    ///
    /// Follows `next_page_url`, falling back to `page=n+1` while `total_pages`
    /// says more remain. Any failing page fails the whole fetch; nothing is
    /// returned partially.
    #[instrument(skip_all, fields(watermark = %watermark))]
    pub async fn fetch_new_orders(
        &self,
        watermark: Watermark,
        filters: &FilterSet,
    ) -> Result<FetchOutcome> {
        let first = self.query_url(watermark, filters);
        let mut next = Some(first.clone());
        let mut visited = HashSet::new();
        let mut orders: Vec<OrderRecord> = Vec::new();
        let mut pages: usize = 0;

        while let Some(url) = next.take() {
            if !visited.insert(url.to_string()) {
                return Err(EoTrackerError::Fetch(format!("pagination loop at {url}")));
            }

            let page = self.fetch_page(&url).await?;
            pages += 1;

            debug!(
                page = pages,
                results = page.results.len(),
                total_pages = ?page.total_pages,
                "fetched results page"
            );

            next = match page.next_page_url.as_deref().map(str::trim) {
                Some(link) if !link.is_empty() => Some(url.join(link).map_err(|e| {
                    EoTrackerError::Fetch(format!("bad next_page_url {link:?}: {e}"))
                })?),
                _ => match page.total_pages {
                    Some(total) if (pages as u64) < u64::from(total) => {
                        Some(page_url(&first, pages + 1))
                    }
                    _ => None,
                },
            };

            orders.extend(page.results);
        }

        let updated = watermark.advance(orders.iter().filter_map(OrderRecord::parsed_publication_date));

        info!(
            orders = orders.len(),
            pages,
            watermark = %updated,
            "fetched new orders"
        );

        Ok(FetchOutcome {
            orders,
            watermark: updated,
            pages,
        })
    }

    /// Full-text document URL for `order`.
    pub fn document_url(&self, order: &OrderRecord) -> Result<Url> {
        resolve_document_url(
            &self.document_base_url,
            self.api.document_path_style,
            order.parsed_publication_date(),
            order.document_id().unwrap_or_default(),
        )
    }

    /// Download one order's full-text document body.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_document(&self, document_id: &str, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| EoTrackerError::document_fetch(document_id, format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EoTrackerError::document_fetch(
                document_id,
                format!("{url}: HTTP {status}"),
            ));
        }

        let body = response.text().await.map_err(|e| {
            EoTrackerError::document_fetch(document_id, format!("{url}: body read failed: {e}"))
        })?;

        debug!(bytes = body.len(), "fetched document");
        Ok(body)
    }

    /// GET and decode one results page.
    async fn fetch_page(&self, url: &Url) -> Result<DocumentsPage> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| EoTrackerError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EoTrackerError::Fetch(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EoTrackerError::Fetch(format!("{url}: body read failed: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| EoTrackerError::Fetch(format!("{url}: invalid results page: {e}")))
    }
}

/// `first` with an explicit `page` parameter.
fn page_url(first: &Url, page: usize) -> Url {
    let mut url = first.clone();
    url.query_pairs_mut().append_pair("page", &page.to_string());
    url
}
