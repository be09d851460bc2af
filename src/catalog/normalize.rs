//! Normalization - pure mapping from raw source schemas to the canonical
//! property record. Total over syntactically valid input: absent or
//! malformed fields get explicit defaults, never a panic, and one bad
//! record never aborts the batch.

use crate::catalog::sources::{LegacyProperty, RawListing, SaleListing};
use crate::catalog::types::{
    AreaUnit, Contact, IngestStats, LifecycleState, ListingKind, Location, Property, SourceKind,
};
use crate::catalog::utils::{coerce_amount, parse_kind, parse_timestamp, split_legacy_status};
use tracing::{info, warn};

const UNKNOWN_CITY: &str = "Unknown";
const DEFAULT_CURRENCY: &str = "USD";

/// Normalize a whole fetched batch, tallying how many fields needed
/// default substitution.
pub fn normalize_all(raws: Vec<RawListing>) -> (Vec<Property>, IngestStats) {
    let mut stats = IngestStats {
        fetched: raws.len(),
        ..Default::default()
    };

    let properties: Vec<Property> = raws
        .into_iter()
        .map(|raw| {
            let (property, defaulted) = normalize_counted(raw);
            stats.defaulted_fields += defaulted;
            property
        })
        .collect();

    stats.normalized = properties.len();
    info!("normalization complete: {}", stats);

    (properties, stats)
}

/// Normalize one raw record into the canonical shape.
pub fn normalize(raw: RawListing) -> Property {
    normalize_counted(raw).0
}

fn normalize_counted(raw: RawListing) -> (Property, usize) {
    match raw {
        RawListing::Legacy(p) => normalize_legacy(p),
        RawListing::Sale(l) => normalize_sale(l),
    }
}

/// Clamp an already-numeric amount to the non-negative finite range.
fn clamp_amount(value: f64, id: &str, field: &'static str) -> (f64, usize) {
    if value.is_finite() && value >= 0.0 {
        (value, 0)
    } else {
        warn!("record {}: {} out of range ({}), using 0", id, field, value);
        (0.0, 1)
    }
}

fn normalize_legacy(raw: LegacyProperty) -> (Property, usize) {
    let mut defaulted = 0;

    let (price, d) = clamp_amount(raw.price, &raw.id, "price");
    defaulted += d;
    let (area, d) = clamp_amount(raw.area_sqm, &raw.id, "area");
    defaulted += d;

    let city = match raw.city {
        Some(city) if !city.trim().is_empty() => city,
        _ => {
            warn!("record {}: missing city, using '{}'", raw.id, UNKNOWN_CITY);
            defaulted += 1;
            UNKNOWN_CITY.to_string()
        }
    };

    let (kind, lifecycle) = split_legacy_status(&raw.status);

    let contact = raw.agent.map(|a| Contact {
        name: a.name,
        phone: a.phone,
        email: a.email,
        avatar: a.photo,
        role_label: a.title,
    });

    let property = Property {
        id: raw.id,
        title: raw.title,
        description: raw.description,
        price,
        currency: raw.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        kind,
        lifecycle,
        location: Location {
            city,
            region: raw.province,
            zone: raw.zone,
            address: raw.address,
            country: raw.country,
        },
        rooms: raw.rooms,
        bathrooms: raw.bathrooms,
        area,
        // The mock catalog only speaks metric.
        area_unit: AreaUnit::Sqm,
        floor: raw.floor,
        total_floors: raw.total_floors,
        year_built: raw.year_built,
        images: raw.images,
        features: raw.features,
        contact,
        created_at: parse_timestamp(raw.created_at.as_deref()),
        updated_at: parse_timestamp(raw.updated_at.as_deref()),
        source: SourceKind::MockCatalog,
    };

    (property, defaulted)
}

fn normalize_sale(raw: SaleListing) -> (Property, usize) {
    let mut defaulted = 0;

    let (price, was_defaulted) = coerce_amount(raw.price.as_ref(), &raw.listing_id, "price");
    defaulted += was_defaulted as usize;
    let (area, was_defaulted) = coerce_amount(raw.size_sqft.as_ref(), &raw.listing_id, "area");
    defaulted += was_defaulted as usize;

    let city = match raw.city {
        Some(city) if !city.trim().is_empty() => city,
        _ => {
            warn!(
                "record {}: missing city, using '{}'",
                raw.listing_id, UNKNOWN_CITY
            );
            defaulted += 1;
            UNKNOWN_CITY.to_string()
        }
    };

    let kind = match raw.property_type.as_deref() {
        Some(label) if !label.trim().is_empty() => parse_kind(label),
        _ => {
            defaulted += 1;
            ListingKind::Sale
        }
    };

    let lifecycle = if raw.is_active {
        LifecycleState::Active
    } else {
        LifecycleState::Sold
    };

    let contact = raw.agent.map(|a| Contact {
        name: a.full_name,
        phone: a.phone_number,
        email: a.email_address,
        avatar: a.avatar_url,
        role_label: a.role,
    });

    let property = Property {
        id: raw.listing_id,
        title: raw.headline,
        description: raw.body,
        price,
        currency: raw.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        kind,
        lifecycle,
        location: Location {
            city,
            region: raw.state,
            zone: raw.neighborhood,
            address: raw.street,
            country: raw.country,
        },
        rooms: raw.beds,
        bathrooms: raw.baths,
        area,
        // The sale API only speaks imperial.
        area_unit: AreaUnit::Sqft,
        floor: raw.floor,
        total_floors: raw.floors_total,
        year_built: raw.year_built,
        images: raw.photos,
        features: raw.amenities,
        contact,
        created_at: parse_timestamp(raw.listed_at.as_deref()),
        updated_at: parse_timestamp(raw.updated_at.as_deref()),
        source: SourceKind::SaleApi,
    };

    (property, defaulted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sources::{MockCatalog, SaleAgent};
    use crate::catalog::ListingSource;
    use serde_json::json;

    fn bare_sale_listing() -> SaleListing {
        serde_json::from_value(json!({
            "listing_id": "sale-1",
            "headline": "Corner Unit"
        }))
        .unwrap()
    }

    fn assert_invariants(p: &Property) {
        assert!(!p.id.is_empty());
        assert!(p.price >= 0.0 && p.price.is_finite());
        assert!(p.area >= 0.0 && p.area.is_finite());
        assert!(!p.location.city.trim().is_empty());
        assert!(!p.currency.is_empty());
    }

    #[test]
    fn test_bare_sale_listing_is_total() {
        let p = normalize(RawListing::Sale(bare_sale_listing()));

        assert_invariants(&p);
        assert_eq!(p.price, 0.0);
        assert_eq!(p.area, 0.0);
        assert_eq!(p.location.city, "Unknown");
        assert_eq!(p.kind, ListingKind::Sale);
        // Absent active flag defaults to an active listing.
        assert_eq!(p.lifecycle, LifecycleState::Active);
        assert_eq!(p.area_unit, AreaUnit::Sqft);
        assert!(p.contact.is_none());
        assert!(p.created_at.is_none());
    }

    #[test]
    fn test_inactive_sale_listing_maps_to_sold() {
        let mut raw = bare_sale_listing();
        raw.is_active = false;

        let p = normalize(RawListing::Sale(raw));
        assert_eq!(p.lifecycle, LifecycleState::Sold);
    }

    #[test]
    fn test_unrecognized_type_is_preserved() {
        let mut raw = bare_sale_listing();
        raw.property_type = Some("timeshare".to_string());

        let p = normalize(RawListing::Sale(raw));
        assert_eq!(p.kind, ListingKind::Other("timeshare".to_string()));
    }

    #[test]
    fn test_string_price_and_malformed_timestamp() {
        let mut raw = bare_sale_listing();
        raw.price = Some(json!("$425,000"));
        raw.size_sqft = Some(json!("1,180"));
        raw.listed_at = Some("last tuesday".to_string());
        raw.updated_at = Some("2024-04-02T08:00:00Z".to_string());

        let p = normalize(RawListing::Sale(raw));
        assert_eq!(p.price, 425_000.0);
        assert_eq!(p.area, 1_180.0);
        assert!(p.created_at.is_none());
        assert!(p.updated_at.is_some());
    }

    #[test]
    fn test_sale_agent_remaps_to_contact() {
        let mut raw = bare_sale_listing();
        raw.agent = Some(SaleAgent {
            full_name: "Priya Nair".to_string(),
            phone_number: Some("+1-206-555-0102".to_string()),
            email_address: None,
            avatar_url: None,
            role: Some("Broker".to_string()),
        });

        let p = normalize(RawListing::Sale(raw));
        let contact = p.contact.unwrap();
        assert_eq!(contact.name, "Priya Nair");
        assert_eq!(contact.phone.as_deref(), Some("+1-206-555-0102"));
        assert_eq!(contact.role_label.as_deref(), Some("Broker"));
        assert!(contact.email.is_none());
    }

    #[test]
    fn test_legacy_status_splits_into_kind_and_lifecycle() {
        let raw: LegacyProperty = serde_json::from_value(json!({
            "id": "legacy-1",
            "title": "Sold Studio",
            "status": "sold",
            "city": "Lisbon",
            "price": 120000.0,
            "area_sqm": 40.0
        }))
        .unwrap();

        let p = normalize(RawListing::Legacy(raw));
        assert_eq!(p.kind, ListingKind::Sale);
        assert_eq!(p.lifecycle, LifecycleState::Sold);
        assert_eq!(p.area_unit, AreaUnit::Sqm);
        assert_eq!(p.source, SourceKind::MockCatalog);
    }

    #[test]
    fn test_legacy_negative_price_clamps_to_zero() {
        let raw: LegacyProperty = serde_json::from_value(json!({
            "id": "legacy-2",
            "title": "Bad Data",
            "status": "for_sale",
            "price": -5.0
        }))
        .unwrap();

        let p = normalize(RawListing::Legacy(raw));
        assert_invariants(&p);
        assert_eq!(p.price, 0.0);
        assert_eq!(p.location.city, "Unknown");
    }

    #[tokio::test]
    async fn test_mock_snapshot_normalizes_totally() {
        let raws = MockCatalog::new().fetch_catalog().await.unwrap();
        let (properties, stats) = normalize_all(raws);

        assert_eq!(stats.fetched, stats.normalized);
        assert!(!properties.is_empty());
        for p in &properties {
            assert_invariants(p);
            assert_eq!(p.area_unit, AreaUnit::Sqm);
        }

        // The snapshot's unrecognized "auction" status passes through.
        let auction = properties.iter().find(|p| p.id == "mock-006").unwrap();
        assert_eq!(auction.kind, ListingKind::Other("auction".to_string()));
        assert_eq!(auction.lifecycle, LifecycleState::Active);
    }
}
