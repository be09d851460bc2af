//! Field-level parsing helpers shared by the normalizer

use crate::catalog::types::{LifecycleState, ListingKind};
use crate::error::CatalogError;
use chrono::{DateTime, Utc};
use tracing::warn;

/// Parse an RFC 3339 timestamp. Malformed input is treated as absent, not
/// partially parsed.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Coerce a loosely-typed numeric field (price, area) to a non-negative
/// f64. The sale API serializes some numbers as strings with currency
/// punctuation; other values, negatives, and non-finite numbers fall back
/// to zero. Returns the value and whether a default was substituted.
pub fn coerce_amount(raw: Option<&serde_json::Value>, id: &str, field: &'static str) -> (f64, bool) {
    let parsed = match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => {
            let clean = s.replace(['$', ','], "");
            clean.trim().parse::<f64>().ok()
        }
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => (v, false),
        Some(v) => {
            let err = CatalogError::MalformedRecord {
                id: id.to_string(),
                field,
                reason: format!("out of range ({})", v),
            };
            warn!("{}, using 0", err);
            (0.0, true)
        }
        None => {
            if raw.is_some() {
                let err = CatalogError::MalformedRecord {
                    id: id.to_string(),
                    field,
                    reason: "not a number".to_string(),
                };
                warn!("{}, using 0", err);
            }
            (0.0, true)
        }
    }
}

/// Map a source-specific free-text type label to the closed kind
/// enumeration. Unrecognized labels are preserved verbatim so presentation
/// can still display them.
pub fn parse_kind(label: &str) -> ListingKind {
    let lower = label.trim().to_lowercase();

    if lower.contains("sale") || lower.contains("sell") || lower.contains("buy") {
        ListingKind::Sale
    } else if lower.contains("rent") || lower.contains("lease") || lower.contains("let") {
        ListingKind::Rent
    } else if lower.contains("hotel") {
        ListingKind::Hotel
    } else {
        ListingKind::Other(label.trim().to_string())
    }
}

/// Split the legacy catalog's conflated status field into the orthogonal
/// kind + lifecycle pair.
pub fn split_legacy_status(status: &str) -> (ListingKind, LifecycleState) {
    match status.trim().to_lowercase().as_str() {
        "for_sale" | "for sale" => (ListingKind::Sale, LifecycleState::Active),
        "for_rent" | "for rent" => (ListingKind::Rent, LifecycleState::Active),
        "sold" => (ListingKind::Sale, LifecycleState::Sold),
        "rented" => (ListingKind::Rent, LifecycleState::Rented),
        "pending" => (ListingKind::Sale, LifecycleState::Pending),
        "hotel" => (ListingKind::Hotel, LifecycleState::Active),
        _ => (
            ListingKind::Other(status.trim().to_string()),
            LifecycleState::Active,
        ),
    }
}
