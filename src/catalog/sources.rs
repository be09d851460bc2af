//! Source adapters - retrieve raw listing records in each source's native
//! schema. Adapters do I/O only; failures stop here (logged, empty or
//! error result) and never reach the normalizer as a panic.

use crate::catalog::types::SourceKind;
use crate::error::CatalogError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

/// Embedded snapshot of the static mock catalog, in the legacy schema.
const MOCK_SNAPSHOT: &str = include_str!("mock_catalog.json");

/// Agent block as the legacy catalog spells it.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyAgent {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub title: Option<String>,
}

/// The static mock catalog's schema. One conflated `status` field carries
/// both the transaction kind and the disposition; area is always metric.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyProperty {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub status: String,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub rooms: Option<u32>,
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub area_sqm: f64,
    pub floor: Option<u32>,
    pub total_floors: Option<u32>,
    pub year_built: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub agent: Option<LegacyAgent>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Agent block as the sale API spells it.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleAgent {
    pub full_name: String,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
}

fn default_active() -> bool {
    true
}

/// The remote sale API's schema. Kind and disposition are orthogonal here
/// (`property_type` + `is_active`); area is always imperial. Numeric fields
/// sometimes arrive as strings with currency punctuation.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleListing {
    pub listing_id: String,
    pub headline: String,
    #[serde(default)]
    pub body: String,
    pub price: Option<serde_json::Value>,
    pub currency: Option<String>,
    pub property_type: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub city: Option<String>,
    pub state: Option<String>,
    pub neighborhood: Option<String>,
    pub street: Option<String>,
    pub country: Option<String>,
    pub beds: Option<u32>,
    pub baths: Option<u32>,
    pub size_sqft: Option<serde_json::Value>,
    pub floor: Option<u32>,
    pub floors_total: Option<u32>,
    pub year_built: Option<i32>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub agent: Option<SaleAgent>,
    pub listed_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Raw records from the various sources - tagged union
#[derive(Debug, Clone)]
pub enum RawListing {
    Legacy(LegacyProperty),
    Sale(SaleListing),
}

impl RawListing {
    pub fn id(&self) -> &str {
        match self {
            RawListing::Legacy(p) => &p.id,
            RawListing::Sale(l) => &l.listing_id,
        }
    }

    pub fn source(&self) -> SourceKind {
        match self {
            RawListing::Legacy(_) => SourceKind::MockCatalog,
            RawListing::Sale(_) => SourceKind::SaleApi,
        }
    }
}

/// Common trait for all listing sources.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the full raw catalog from this source.
    async fn fetch_catalog(&self) -> Result<Vec<RawListing>, CatalogError>;

    /// Fetch a single raw record. Absence is a first-class result, not an
    /// error.
    async fn fetch_by_id(&self, id: &str) -> Result<Option<RawListing>, CatalogError>;

    /// Name of the source, for logging.
    fn source_name(&self) -> &'static str;

    /// Fetch the catalog, flattening failures to an empty sequence so
    /// normalizer-facing callers always receive a well-typed list.
    async fn fetch_catalog_or_empty(&self) -> Vec<RawListing> {
        match self.fetch_catalog().await {
            Ok(raws) => raws,
            Err(e) => {
                warn!("{}: catalog fetch failed: {}", self.source_name(), e);
                Vec::new()
            }
        }
    }
}

/// In-memory mock catalog backed by the embedded legacy snapshot.
pub struct MockCatalog {
    listings: Vec<LegacyProperty>,
}

impl MockCatalog {
    pub fn new() -> Self {
        let listings: Vec<LegacyProperty> = match serde_json::from_str(MOCK_SNAPSHOT) {
            Ok(listings) => listings,
            Err(e) => {
                warn!("mock catalog snapshot failed to parse: {}", e);
                Vec::new()
            }
        };
        Self { listings }
    }

    /// Build a catalog over an explicit set of legacy records (tests).
    pub fn with_listings(listings: Vec<LegacyProperty>) -> Self {
        Self { listings }
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingSource for MockCatalog {
    async fn fetch_catalog(&self) -> Result<Vec<RawListing>, CatalogError> {
        Ok(self
            .listings
            .iter()
            .cloned()
            .map(RawListing::Legacy)
            .collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<RawListing>, CatalogError> {
        Ok(self
            .listings
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .map(RawListing::Legacy))
    }

    fn source_name(&self) -> &'static str {
        "mock_catalog"
    }
}

/// Query parameters accepted by the sale listings endpoint.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub rooms: Option<u32>,
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListingQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if let Some(city) = &self.city {
            pairs.push(("city", city.clone()));
        }
        if let Some(t) = &self.property_type {
            pairs.push(("type", t.clone()));
        }
        if let Some(p) = self.min_price {
            pairs.push(("min_price", p.to_string()));
        }
        if let Some(p) = self.max_price {
            pairs.push(("max_price", p.to_string()));
        }
        if let Some(r) = self.rooms {
            pairs.push(("rooms", r.to_string()));
        }
        if let Some(a) = self.active {
            pairs.push(("active", a.to_string()));
        }
        if let Some(p) = self.page {
            pairs.push(("page", p.to_string()));
        }
        if let Some(l) = self.limit {
            pairs.push(("limit", l.to_string()));
        }
        pairs
    }
}

/// One page of sale listings plus paging metadata.
#[derive(Debug)]
pub struct SalePage {
    pub listings: Vec<SaleListing>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Wire shape of a page. Listings stay loosely typed so one malformed
/// record can be skipped instead of failing the whole page.
#[derive(Debug, Deserialize)]
struct SalePageWire {
    #[serde(default)]
    listings: Vec<serde_json::Value>,
    total: u64,
    page: u32,
    limit: u32,
}

impl SalePage {
    fn from_wire(wire: SalePageWire) -> Self {
        let mut listings = Vec::with_capacity(wire.listings.len());
        for value in wire.listings {
            let id = value
                .get("listing_id")
                .and_then(|v| v.as_str())
                .unwrap_or("?")
                .to_string();
            match serde_json::from_value::<SaleListing>(value) {
                Ok(listing) => listings.push(listing),
                Err(e) => warn!("skipping malformed sale listing {}: {}", id, e),
            }
        }
        SalePage {
            listings,
            total: wire.total,
            page: wire.page,
            limit: wire.limit,
        }
    }
}

/// Client for the remote sale listings API.
pub struct SaleApi {
    client: reqwest::Client,
    base_url: String,
}

impl SaleApi {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> CatalogError {
        CatalogError::SourceUnavailable {
            source_name: self.source_name(),
            reason: reason.to_string(),
        }
    }

    /// Fetch one page of listings matching `query`.
    pub async fn fetch_page(&self, query: &ListingQuery) -> Result<SalePage, CatalogError> {
        let url = format!("{}/listings", self.base_url);
        info!("fetching sale listings from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&query.to_pairs())
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {}", status)));
        }

        let wire: SalePageWire = response.json().await.map_err(|e| self.unavailable(e))?;
        let page = SalePage::from_wire(wire);
        info!(
            "fetched {} of {} sale listings (page {})",
            page.listings.len(),
            page.total,
            page.page
        );
        Ok(page)
    }
}

/// Page size requested when walking the full catalog.
const CATALOG_PAGE_LIMIT: u32 = 100;

fn catalog_page_query(page: u32) -> ListingQuery {
    ListingQuery {
        page: Some(page),
        limit: Some(CATALOG_PAGE_LIMIT),
        ..Default::default()
    }
}

#[async_trait]
impl ListingSource for SaleApi {
    /// Walk every page the endpoint reports. A failure on the first page
    /// fails the fetch; a failure on a later page returns the partial
    /// catalog with a warning.
    async fn fetch_catalog(&self) -> Result<Vec<RawListing>, CatalogError> {
        let first = self.fetch_page(&catalog_page_query(1)).await?;

        let limit = if first.limit > 0 {
            first.limit as u64
        } else {
            CATALOG_PAGE_LIMIT as u64
        };
        let total_pages = (first.total + limit - 1) / limit;

        let mut collected: Vec<RawListing> =
            first.listings.into_iter().map(RawListing::Sale).collect();

        for page_number in 2..=total_pages {
            let page = match self.fetch_page(&catalog_page_query(page_number as u32)).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "{}: page {} of {} failed, returning {} listings fetched so far: {}",
                        self.source_name(),
                        page_number,
                        total_pages,
                        collected.len(),
                        e
                    );
                    break;
                }
            };
            // A server that overstates its total eventually hands back an
            // empty page; stop instead of looping.
            if page.listings.is_empty() {
                break;
            }
            collected.extend(page.listings.into_iter().map(RawListing::Sale));
        }

        Ok(collected)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<RawListing>, CatalogError> {
        let url = format!("{}/listings/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {}", status)));
        }

        let listing: SaleListing = response.json().await.map_err(|e| self.unavailable(e))?;
        Ok(Some(RawListing::Sale(listing)))
    }

    fn source_name(&self) -> &'static str {
        "sale_api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal single-shot HTTP fixture: serves `pages[n-1]` for
    /// `page=n`, 500 for pages it does not have.
    async fn serve_pages(listener: TcpListener, pages: Vec<String>) {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0u8; 2048];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]).into_owned();
            let page_number = request
                .split("page=")
                .nth(1)
                .and_then(|rest| rest.split(['&', ' ']).next())
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(1);
            let response = match page_number.checked_sub(1).and_then(|i| pages.get(i)) {
                Some(body) => format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                ),
                None => "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                    .to_string(),
            };
            let _ = socket.write_all(response.as_bytes()).await;
        }
    }

    fn sale_listing_json(id: &str) -> serde_json::Value {
        json!({ "listing_id": id, "headline": format!("Listing {}", id) })
    }

    #[tokio::test]
    async fn test_mock_catalog_snapshot_parses() {
        let catalog = MockCatalog::new();
        let raws = catalog.fetch_catalog().await.unwrap();
        assert!(!raws.is_empty());

        // Every snapshot record carries the fields normalization relies on.
        for raw in &raws {
            assert!(!raw.id().is_empty());
        }
    }

    #[tokio::test]
    async fn test_mock_catalog_fetch_by_id() {
        let listing: LegacyProperty = serde_json::from_value(serde_json::json!({
            "id": "legacy-9",
            "title": "Walk-up Duplex",
            "status": "for_rent",
            "city": "Boise",
            "price": 1200.0,
            "area_sqm": 88.0
        }))
        .unwrap();
        let catalog = MockCatalog::with_listings(vec![listing]);

        let found = catalog.fetch_by_id("legacy-9").await.unwrap();
        assert!(matches!(found, Some(RawListing::Legacy(_))));

        let missing = catalog.fetch_by_id("no-such-listing").await.unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_listing_query_pairs() {
        let query = ListingQuery {
            q: Some("loft".to_string()),
            city: Some("Austin".to_string()),
            min_price: Some(100000.0),
            max_price: Some(500000.0),
            rooms: Some(2),
            active: Some(true),
            page: Some(1),
            limit: Some(20),
            ..Default::default()
        };

        let pairs = query.to_pairs();
        assert!(pairs.contains(&("q", "loft".to_string())));
        assert!(pairs.contains(&("city", "Austin".to_string())));
        assert!(pairs.contains(&("min_price", "100000".to_string())));
        assert!(pairs.contains(&("active", "true".to_string())));
        assert_eq!(pairs.len(), 8);
    }

    #[test]
    fn test_empty_query_has_no_pairs() {
        assert!(ListingQuery::default().to_pairs().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_catalog_walks_every_page() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let page1 = json!({
            "listings": [sale_listing_json("s1"), sale_listing_json("s2")],
            "total": 3, "page": 1, "limit": 2
        })
        .to_string();
        let page2 = json!({
            "listings": [sale_listing_json("s3")],
            "total": 3, "page": 2, "limit": 2
        })
        .to_string();
        tokio::spawn(serve_pages(listener, vec![page1, page2]));

        let api = SaleApi::new(format!("http://{}", addr)).unwrap();
        let raws = api.fetch_catalog().await.unwrap();

        let ids: Vec<&str> = raws.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
    }

    #[tokio::test]
    async fn test_later_page_failure_keeps_partial_catalog() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Two pages promised, only the first one available.
        let page1 = json!({
            "listings": [sale_listing_json("s1"), sale_listing_json("s2")],
            "total": 4, "page": 1, "limit": 2
        })
        .to_string();
        tokio::spawn(serve_pages(listener, vec![page1]));

        let api = SaleApi::new(format!("http://{}", addr)).unwrap();
        let raws = api.fetch_catalog().await.unwrap();
        assert_eq!(raws.len(), 2);
    }

    #[test]
    fn test_malformed_listing_skips_not_aborts() {
        let wire: SalePageWire = serde_json::from_value(json!({
            "listings": [
                sale_listing_json("ok-1"),
                { "listing_id": "bad-1", "headline": "Bad", "beds": "two" },
                sale_listing_json("ok-2")
            ],
            "total": 3, "page": 1, "limit": 100
        }))
        .unwrap();

        let page = SalePage::from_wire(wire);
        let ids: Vec<&str> = page.listings.iter().map(|l| l.listing_id.as_str()).collect();
        assert_eq!(ids, vec!["ok-1", "ok-2"]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_unreachable_sale_api_flattens_to_empty() {
        // Port 9 is discard; connection should fail fast.
        let api = SaleApi::new("http://127.0.0.1:9").unwrap();
        let raws = api.fetch_catalog_or_empty().await;
        assert!(raws.is_empty());
    }

    #[tokio::test]
    #[ignore] // Hits a live endpoint; run manually with SALE_API_URL set.
    async fn test_fetch_live_sale_listings() {
        let base = std::env::var("SALE_API_URL").expect("SALE_API_URL must be set");
        let api = SaleApi::new(base).unwrap();
        let page = api.fetch_page(&ListingQuery::default()).await.unwrap();
        assert!(page.total >= page.listings.len() as u64);
    }
}
