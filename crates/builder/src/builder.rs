//! Per-event row assembly.

use crate::order::PtDescendingOrder;
use crate::truncate::CollectionTruncator;
use evflat_config::{InputTags, ProducerConfig};
use evflat_core::{
    Capped, EventView, GenJetRow, InputTag, ObjectKind, PrescaleLookup, RegistryKind, Row,
    TrackRow, TriggerMenu, VertexRow, Warning,
};
use evflat_registry::{FilterRegistry, PathRegistry};
use tracing::{debug, info, warn};

/// A finished row and the warnings raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub row: Row,
    pub warnings: Vec<Warning>,
}

/// Assembles one [`Row`] per event.
///
/// Call [`begin_run`](Self::begin_run) at every run boundary, then
/// [`build`](Self::build) for each event of that run. Upstream
/// collections are only borrowed; nothing passed in is modified.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    inputs: InputTags,
    vertices: CollectionTruncator,
    tracks: CollectionTruncator,
    genjets: CollectionTruncator,
    is_data: bool,
    paths: PathRegistry,
    filters: FilterRegistry,
    /// Run whose menus the registries are resolved against.
    current_run: Option<u32>,
}

impl RecordBuilder {
    /// Validate `config` and build unresolved registries.
    ///
    /// Negative capacities, bad patterns, and duplicate names fail here,
    /// before any event is seen.
    pub fn new(config: &ProducerConfig) -> evflat_core::Result<Self> {
        config.validate()?;
        let capacities = config.capacities()?;

        Ok(Self {
            inputs: config.inputs.clone(),
            vertices: CollectionTruncator::new(capacities.for_kind(ObjectKind::Vertex)),
            tracks: CollectionTruncator::new(capacities.for_kind(ObjectKind::Track)),
            genjets: CollectionTruncator::new(capacities.for_kind(ObjectKind::GenJet)),
            is_data: config.producer.is_data,
            paths: PathRegistry::from_config(&config.triggers)?,
            filters: FilterRegistry::from_config(&config.filters)?,
            current_run: None,
        })
    }

    /// Refresh name resolution for a new run.
    ///
    /// Registries are only rebuilt when a menu actually changed.
    pub fn begin_run(
        &mut self,
        run: u32,
        trigger_menu: &TriggerMenu,
        filter_menu: &TriggerMenu,
    ) -> Vec<Warning> {
        let mut warnings = Vec::new();
        let mut refreshed = false;
        if let Some(w) = self.paths.resolve_if_changed(trigger_menu) {
            warnings.extend(w);
            refreshed = true;
        }
        if let Some(w) = self.filters.resolve_if_changed(filter_menu) {
            warnings.extend(w);
            refreshed = true;
        }
        self.current_run = Some(run);

        info!(
            run,
            refreshed,
            triggers = self.paths.resolved_count(),
            filters = self.filters.resolved_count(),
            "Run started"
        );
        warnings
    }

    /// Assemble the row for one event.
    pub fn build<E: EventView + ?Sized>(
        &mut self,
        event: &E,
        prescales: &dyn PrescaleLookup,
    ) -> Assembled {
        let id = event.id();
        let mut warnings = Vec::new();

        // 1. decision vectors → named flags
        if self.current_run == Some(id.run) {
            self.update_triggers(event, prescales, &mut warnings);
            self.update_filters(event, &mut warnings);
        } else {
            warn!(
                run = id.run,
                resolved_for = ?self.current_run,
                "Event outside the resolved run, trigger and filter fields default to false"
            );
            self.paths.clear();
            self.filters.clear();
            warnings.push(Warning::RegistryNotResolved {
                registry: RegistryKind::Trigger,
            });
            warnings.push(Warning::RegistryNotResolved {
                registry: RegistryKind::Filter,
            });
        }

        // 2-4. collections
        let raw_tracks = collection(
            ObjectKind::Track,
            &self.inputs.tracks,
            event.tracks(&self.inputs.tracks),
            &mut warnings,
        );
        let sorted_tracks = PtDescendingOrder::sorted(raw_tracks);
        let tracks: Capped<TrackRow> = self
            .tracks
            .truncate(&sorted_tracks)
            .project(|t| TrackRow::from(*t));

        let vertices: Capped<VertexRow> = self
            .vertices
            .truncate(collection(
                ObjectKind::Vertex,
                &self.inputs.vertices,
                event.vertices(&self.inputs.vertices),
                &mut warnings,
            ))
            .project(VertexRow::from);

        let genjets: Capped<GenJetRow> = if self.is_data {
            Capped::empty()
        } else {
            self.genjets
                .truncate(collection(
                    ObjectKind::GenJet,
                    &self.inputs.genjets,
                    event.genjets(&self.inputs.genjets),
                    &mut warnings,
                ))
                .project(GenJetRow::from)
        };

        let pileup_density = event.scalar(&self.inputs.pileup_density);
        if pileup_density.is_none() {
            debug!(event = %id, tag = %self.inputs.pileup_density, "Pileup density missing");
        }

        // 5-6. read out
        let row = Row {
            run: id.run,
            lumi: id.lumi,
            event: id.event,
            pileup_density,
            triggers: self.paths.columns(),
            filters: self.filters.columns(),
            vertices,
            tracks,
            genjets,
        };

        debug!(
            event = %id,
            vertices = row.vertices.total,
            tracks = row.tracks.total,
            genjets = row.genjets.total,
            warnings = warnings.len(),
            "Row assembled"
        );
        Assembled { row, warnings }
    }

    fn update_triggers<E: EventView + ?Sized>(
        &mut self,
        event: &E,
        prescales: &dyn PrescaleLookup,
        warnings: &mut Vec<Warning>,
    ) {
        let tag = &self.inputs.trigger_results;
        match event.decisions(tag) {
            Some(decisions) => warnings.extend(self.paths.update(decisions, prescales)),
            None => {
                debug!(event = %event.id(), %tag, "Trigger results missing");
                self.paths.clear();
                warnings.push(Warning::MissingDecisions {
                    registry: RegistryKind::Trigger,
                    tag: tag.to_string(),
                });
            }
        }
    }

    fn update_filters<E: EventView + ?Sized>(&mut self, event: &E, warnings: &mut Vec<Warning>) {
        let tag = &self.inputs.filter_results;
        match event.decisions(tag) {
            Some(decisions) => warnings.extend(self.filters.update(decisions)),
            None => {
                debug!(event = %event.id(), %tag, "Filter results missing");
                self.filters.clear();
                warnings.push(Warning::MissingDecisions {
                    registry: RegistryKind::Filter,
                    tag: tag.to_string(),
                });
            }
        }
    }

    pub fn paths(&self) -> &PathRegistry {
        &self.paths
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn current_run(&self) -> Option<u32> {
        self.current_run
    }

    pub fn capacity(&self, kind: ObjectKind) -> usize {
        match kind {
            ObjectKind::Vertex => self.vertices.capacity(),
            ObjectKind::Track => self.tracks.capacity(),
            ObjectKind::GenJet => self.genjets.capacity(),
        }
    }
}

/// An absent collection reads as empty, with a warning.
fn collection<'e, T>(
    kind: ObjectKind,
    tag: &InputTag,
    found: Option<&'e [T]>,
    warnings: &mut Vec<Warning>,
) -> &'e [T] {
    match found {
        Some(items) => items,
        None => {
            debug!(%kind, %tag, "Collection missing, treating as empty");
            warnings.push(Warning::MissingCollection {
                object: kind,
                tag: tag.to_string(),
            });
            &[]
        }
    }
}
