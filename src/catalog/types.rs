//! Core data types for the catalog pipeline
//! Pure data structures with no behavior beyond display and accessors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which adapter produced a record. Provenance only; the filter engine
/// never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    MockCatalog,
    SaleApi,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::MockCatalog => write!(f, "mock_catalog"),
            SourceKind::SaleApi => write!(f, "sale_api"),
        }
    }
}

/// Transaction kind of a listing. Unrecognized source labels are kept
/// verbatim in `Other` so presentation can still display them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingKind {
    Sale,
    Rent,
    Hotel,
    Other(String),
}

impl ListingKind {
    /// Label used for display and free-text matching.
    pub fn label(&self) -> &str {
        match self {
            ListingKind::Sale => "sale",
            ListingKind::Rent => "rent",
            ListingKind::Hotel => "hotel",
            ListingKind::Other(s) => s,
        }
    }
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Current disposition of a listing, orthogonal to its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    Sold,
    Rented,
    Pending,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Active => write!(f, "active"),
            LifecycleState::Sold => write!(f, "sold"),
            LifecycleState::Rented => write!(f, "rented"),
            LifecycleState::Pending => write!(f, "pending"),
        }
    }
}

/// Area unit is fixed by the source, never inferred from magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    Sqft,
    Sqm,
}

/// Location information. Only `city` is guaranteed after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub region: Option<String>,
    pub zone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
}

/// Normalized agent/contact block. Sources that carry no agent info yield
/// `None` on the property, never a partially-filled contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub role_label: Option<String>,
}

/// Canonical property record - the single normalized shape all core logic
/// depends on. Downstream code must never reach back to source-specific
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,

    pub price: f64,
    pub currency: String,

    pub kind: ListingKind,
    pub lifecycle: LifecycleState,

    pub location: Location,

    pub rooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area: f64,
    pub area_unit: AreaUnit,
    pub floor: Option<u32>,
    pub total_floors: Option<u32>,
    pub year_built: Option<i32>,

    pub images: Vec<String>,
    pub features: Vec<String>,
    pub contact: Option<Contact>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    pub source: SourceKind,
}

/// View rendering mode. Presentation-only; switching it never changes the
/// matching sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    List,
    Grid,
    Map,
}

/// Per-ingest counters, logged by the orchestrator.
#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    pub fetched: usize,
    pub normalized: usize,
    pub defaulted_fields: usize,
}

impl std::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fetched: {}, normalized: {}, defaulted fields: {}",
            self.fetched, self.normalized, self.defaulted_fields
        )
    }
}
