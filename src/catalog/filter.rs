//! Filter specification and predicate engine
//!
//! A `FilterSpec` composes per-field constraints with logical AND across
//! fields and logical OR within a field's multi-select set. Evaluation is
//! pure and total; it never mutates the record or the spec.

use crate::catalog::types::{LifecycleState, ListingKind, Property};
use crate::error::CatalogError;
use tracing::warn;

/// The complete set of active search constraints for one session.
/// `Default` is the match-everything spec.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub price_min: f64,
    pub price_max: f64,
    /// Accepted kinds; empty accepts all.
    pub kinds: Vec<ListingKind>,
    /// Accepted lifecycle states; empty accepts all.
    pub lifecycles: Vec<LifecycleState>,
    pub min_rooms: Option<u32>,
    pub min_bathrooms: Option<u32>,
    pub area_min: Option<f64>,
    pub area_max: Option<f64>,
    /// Free-text query; empty matches everything.
    pub query: String,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            price_min: 0.0,
            price_max: f64::MAX,
            kinds: Vec::new(),
            lifecycles: Vec::new(),
            min_rooms: None,
            min_bathrooms: None,
            area_min: None,
            area_max: None,
            query: String::new(),
        }
    }
}

impl FilterSpec {
    /// Restore every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when every field is at its default, i.e. the spec matches the
    /// whole catalog.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Decide whether `property` matches. Checks run as a short-circuiting
    /// conjunction, cheapest text rejection first; the order is an
    /// optimization only and never changes the result set.
    pub fn matches(&self, property: &Property) -> bool {
        if !self.query.trim().is_empty() && !self.query_matches(property) {
            return false;
        }

        if property.price < self.price_min || property.price > self.price_max {
            return false;
        }

        if !self.kinds.is_empty() && !self.kinds.contains(&property.kind) {
            return false;
        }

        if !self.lifecycles.is_empty() && !self.lifecycles.contains(&property.lifecycle) {
            return false;
        }

        // An absent count fails a set threshold; a listing that does not
        // report rooms cannot satisfy "at least N rooms".
        if let Some(min) = self.min_rooms {
            match property.rooms {
                Some(rooms) if rooms >= min => {}
                _ => return false,
            }
        }

        if let Some(min) = self.min_bathrooms {
            match property.bathrooms {
                Some(baths) if baths >= min => {}
                _ => return false,
            }
        }

        if let Some(min) = self.area_min {
            if property.area < min {
                return false;
            }
        }
        if let Some(max) = self.area_max {
            if property.area > max {
                return false;
            }
        }

        true
    }

    fn query_matches(&self, property: &Property) -> bool {
        let needle = self.query.trim().to_lowercase();
        let location = &property.location;

        let mut haystack = String::with_capacity(
            property.title.len() + location.city.len() + property.kind.label().len() + 16,
        );
        haystack.push_str(&property.title);
        haystack.push(' ');
        haystack.push_str(&location.city);
        haystack.push(' ');
        if let Some(address) = &location.address {
            haystack.push_str(address);
            haystack.push(' ');
        }
        haystack.push_str(property.kind.label());

        haystack.to_lowercase().contains(&needle)
    }
}

/// Stable filter over the catalog: indices of matching records in their
/// original relative order. No sorting happens here.
pub fn apply(spec: &FilterSpec, catalog: &[Property]) -> Vec<usize> {
    catalog
        .iter()
        .enumerate()
        .filter(|(_, p)| spec.matches(p))
        .map(|(i, _)| i)
        .collect()
}

/// Parse a user-entered price or area bound, substituting `fallback` when
/// the input does not parse to a non-negative finite number.
pub fn parse_bound(field: &'static str, input: &str, fallback: f64) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => {
            let err = CatalogError::InvalidFilterInput {
                field,
                input: input.to_string(),
            };
            warn!("{}, falling back to {}", err, fallback);
            fallback
        }
    }
}

/// Parse a user-entered count threshold. Empty or unparsable input means
/// no threshold.
pub fn parse_count_bound(field: &'static str, input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<u32>() {
        Ok(v) => Some(v),
        Err(_) => {
            let err = CatalogError::InvalidFilterInput {
                field,
                input: input.to_string(),
            };
            warn!("{}, clearing threshold", err);
            None
        }
    }
}
