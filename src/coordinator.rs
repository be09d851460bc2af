//! View coordinator - owns the filter specification, view mode, and
//! catalog state for one browsing session, and recomputes the visible
//! sequence whenever any of them change.

use crate::catalog::filter::{apply, FilterSpec};
use crate::catalog::normalize::normalize_all;
use crate::catalog::sources::ListingSource;
use crate::catalog::types::{IngestStats, Property, ViewMode};
use crate::error::CatalogError;
use crate::favorites::FavoritesStore;
use crate::storage::KeyValueStore;
use tracing::{debug, warn};

/// Catalog load state. `Failed` is terminal for that load and recoverable
/// only by a fresh `begin_load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Loading,
    Ready,
    Failed,
}

/// Handle tying a load completion back to the request that started it.
/// A completion whose ticket is stale (a newer load began) is discarded,
/// so the last request wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    epoch: u64,
}

pub struct ViewCoordinator {
    state: CatalogState,
    catalog: Vec<Property>,
    filter: FilterSpec,
    view_mode: ViewMode,
    filters_visible: bool,
    /// Indices of matching records, in catalog order.
    visible: Vec<usize>,
    epoch: u64,
    last_error: Option<CatalogError>,
}

impl ViewCoordinator {
    /// A freshly mounted session starts in `Loading`; callers issue a load
    /// immediately after construction.
    pub fn new() -> Self {
        Self {
            state: CatalogState::Loading,
            catalog: Vec::new(),
            filter: FilterSpec::default(),
            view_mode: ViewMode::default(),
            filters_visible: false,
            visible: Vec::new(),
            epoch: 0,
            last_error: None,
        }
    }

    /// Start a new catalog load, invalidating any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.epoch += 1;
        self.state = CatalogState::Loading;
        self.last_error = None;
        self.visible.clear();
        LoadTicket { epoch: self.epoch }
    }

    /// Complete a load. Stale tickets are ignored so a slow response never
    /// overwrites the catalog of a newer request. On success the matching
    /// sequence is recomputed against the filter spec as it stands now;
    /// changes made while loading are latest-wins.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<Vec<Property>, CatalogError>,
    ) {
        if ticket.epoch != self.epoch {
            debug!(
                "discarding stale load completion (epoch {} < {})",
                ticket.epoch, self.epoch
            );
            return;
        }

        match outcome {
            Ok(catalog) => {
                self.catalog = catalog;
                self.state = CatalogState::Ready;
                self.recompute();
            }
            Err(e) => {
                warn!("catalog load failed: {}", e);
                self.catalog.clear();
                self.visible.clear();
                self.last_error = Some(e);
                self.state = CatalogState::Failed;
            }
        }
    }

    /// Convenience path: fetch from `source`, normalize, and complete the
    /// load. Returns the ingest counters for logging.
    pub async fn load(&mut self, source: &dyn ListingSource) -> IngestStats {
        let ticket = self.begin_load();
        match source.fetch_catalog().await {
            Ok(raws) => {
                let (properties, stats) = normalize_all(raws);
                self.finish_load(ticket, Ok(properties));
                stats
            }
            Err(e) => {
                self.finish_load(ticket, Err(e));
                IngestStats::default()
            }
        }
    }

    /// Full synchronous re-evaluation over the in-memory catalog. Catalog
    /// sizes are small; this is an explicit scaling limit.
    fn recompute(&mut self) {
        if self.state == CatalogState::Ready {
            self.visible = apply(&self.filter, &self.catalog);
        } else {
            self.visible.clear();
        }
    }

    /// Mutate the filter spec in place and re-evaluate when ready.
    pub fn update_filter(&mut self, mutate: impl FnOnce(&mut FilterSpec)) {
        mutate(&mut self.filter);
        self.recompute();
    }

    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
        self.recompute();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
        self.recompute();
    }

    pub fn reset_filters(&mut self) {
        self.filter.reset();
        self.recompute();
    }

    /// Presentation-only; never touches the matching sequence.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Presentation-only; never touches the matching sequence.
    pub fn toggle_filters_panel(&mut self) {
        self.filters_visible = !self.filters_visible;
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    pub fn last_error(&self) -> Option<&CatalogError> {
        self.last_error.as_ref()
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn filters_visible(&self) -> bool {
        self.filters_visible
    }

    /// Size of the catalog from the last completed load. During `Loading`
    /// this still reports the superseded catalog; the matching sequence is
    /// already empty by then.
    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    /// Matching records in catalog order.
    pub fn results(&self) -> impl Iterator<Item = &Property> {
        self.visible.iter().map(|&i| &self.catalog[i])
    }

    pub fn result_count(&self) -> usize {
        self.visible.len()
    }

    /// The dedicated favorites view: the canonical catalog restricted to
    /// favorited ids, catalog order preserved. Favorite status never gates
    /// the regular matching sequence.
    pub fn favorites_view<'a, S: KeyValueStore>(
        &'a self,
        favorites: &FavoritesStore<S>,
    ) -> Vec<&'a Property> {
        self.catalog
            .iter()
            .filter(|p| favorites.is_favorite(&p.id))
            .collect()
    }
}

impl Default for ViewCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
