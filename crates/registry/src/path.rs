//! Trigger-path registry: fired flags and prescales by configured name.

use crate::matcher::{NamePattern, compile_all, decision_at, resolve_all};
use evflat_config::TriggerConfig;
use evflat_core::{
    PrescaleLookup, RegistryError, RegistryKind, TriggerColumn, TriggerMenu, Warning,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Prescale reported for a path whose prescale was never obtained.
pub const DEFAULT_PRESCALE: f64 = 1.0;

/// Construction input for one registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    pub name: String,
    pub pattern: String,
    pub record_prescale: bool,
}

impl PathSpec {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, record_prescale: bool) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            record_prescale,
        }
    }
}

impl From<&TriggerConfig> for PathSpec {
    fn from(c: &TriggerConfig) -> Self {
        Self {
            name: c.name.clone(),
            pattern: c.pattern.clone(),
            record_prescale: c.record_prescale,
        }
    }
}

/// State of one configured trigger path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathEntry {
    pub name: String,
    pub pattern: String,
    pub record_prescale: bool,
    /// Index into the current menu, `None` when nothing matched.
    pub resolved_index: Option<usize>,
    /// Full menu name of the resolved path.
    pub resolved_path: Option<String>,
    pub fired: bool,
    pub prescale: f64,
}

/// Resolves configured trigger patterns against the run's menu and tracks
/// per-event fired flags and prescales.
///
/// Owned by a single producer instance; nothing here is shared.
#[derive(Debug, Clone)]
pub struct PathRegistry {
    patterns: Vec<NamePattern>,
    entries: Vec<PathEntry>,
    /// Menu the current indices were resolved against.
    menu: Option<TriggerMenu>,
}

impl PathRegistry {
    /// Build an unresolved registry. Fails on bad pattern syntax or
    /// empty / duplicate names.
    pub fn new(specs: Vec<PathSpec>) -> Result<Self, RegistryError> {
        let patterns = compile_all(
            RegistryKind::Trigger,
            specs.iter().map(|s| (s.name.as_str(), s.pattern.as_str())),
        )?;
        let entries = specs
            .into_iter()
            .map(|s| PathEntry {
                name: s.name,
                pattern: s.pattern,
                record_prescale: s.record_prescale,
                resolved_index: None,
                resolved_path: None,
                fired: false,
                prescale: DEFAULT_PRESCALE,
            })
            .collect();
        Ok(Self {
            patterns,
            entries,
            menu: None,
        })
    }

    pub fn from_config(triggers: &[TriggerConfig]) -> Result<Self, RegistryError> {
        Self::new(triggers.iter().map(PathSpec::from).collect())
    }

    /// Resolve every configured pattern against `menu`.
    ///
    /// Rebuilds the name → index map from scratch and clears fired flags.
    /// Prescales keep their last known values. Calling this twice with the
    /// same menu yields the same map.
    pub fn resolve(&mut self, menu: &TriggerMenu) -> Vec<Warning> {
        let (indices, warnings) = resolve_all(RegistryKind::Trigger, &self.patterns, menu);
        for (entry, index) in self.entries.iter_mut().zip(indices) {
            entry.resolved_index = index;
            entry.resolved_path = index.map(|i| menu.paths[i].clone());
            entry.fired = false;
        }
        self.menu = Some(menu.clone());

        info!(
            menu = %menu.label(),
            configured = self.entries.len(),
            resolved = self.resolved_count(),
            "Trigger paths resolved"
        );
        warnings
    }

    /// Resolve only when `menu` differs from the one already resolved.
    ///
    /// Returns `None` when the existing resolution was kept.
    pub fn resolve_if_changed(&mut self, menu: &TriggerMenu) -> Option<Vec<Warning>> {
        if self.menu.as_ref().is_some_and(|m| m.same_identity(menu)) {
            debug!(menu = %menu.label(), "Trigger menu unchanged, keeping resolution");
            return None;
        }
        Some(self.resolve(menu))
    }

    /// Load this event's decisions and prescales.
    ///
    /// Prescale lookups are made only for resolved entries with
    /// `record_prescale`; a failed lookup keeps the previous value.
    pub fn update(&mut self, decisions: &[bool], prescales: &dyn PrescaleLookup) -> Vec<Warning> {
        if self.menu.is_none() {
            self.clear();
            warn!("Trigger registry updated before any menu was resolved");
            return vec![Warning::RegistryNotResolved {
                registry: RegistryKind::Trigger,
            }];
        }

        let mut warnings = Vec::new();
        for entry in &mut self.entries {
            let (Some(index), Some(path)) = (entry.resolved_index, entry.resolved_path.as_deref())
            else {
                entry.fired = false;
                continue;
            };

            entry.fired = decision_at(
                RegistryKind::Trigger,
                &entry.name,
                index,
                decisions,
                &mut warnings,
            );

            if entry.record_prescale {
                match prescales.prescale(path) {
                    Ok(value) => entry.prescale = value,
                    Err(e) => {
                        debug!(path, error = %e, retained = entry.prescale, "Prescale lookup failed");
                        warnings.push(Warning::PrescaleLookupFailure {
                            path: path.to_string(),
                            reason: e.to_string(),
                            retained: entry.prescale,
                        });
                    }
                }
            }
        }
        warnings
    }

    /// Mark every path as not fired for the current event.
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            entry.fired = false;
        }
    }

    /// Whether the configured path fired this event. `false` for
    /// unresolved or unknown names.
    pub fn fired(&self, name: &str) -> bool {
        self.entry(name).is_some_and(|e| e.fired)
    }

    /// Last known prescale, [`DEFAULT_PRESCALE`] if never set or unknown.
    pub fn prescale(&self, name: &str) -> f64 {
        self.entry(name).map_or(DEFAULT_PRESCALE, |e| e.prescale)
    }

    pub fn resolved_index(&self, name: &str) -> Option<usize> {
        self.entry(name).and_then(|e| e.resolved_index)
    }

    pub fn entry(&self, name: &str) -> Option<&PathEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Entries in configuration order.
    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    /// `(name, resolved_index)` pairs in configuration order.
    pub fn resolved_map(&self) -> Vec<(&str, Option<usize>)> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.resolved_index))
            .collect()
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.resolved_index.is_some()).count()
    }

    pub fn is_resolved(&self) -> bool {
        self.menu.is_some()
    }

    pub fn menu(&self) -> Option<&TriggerMenu> {
        self.menu.as_ref()
    }

    /// Row columns in configuration order.
    pub fn columns(&self) -> Vec<TriggerColumn> {
        self.entries
            .iter()
            .map(|e| TriggerColumn {
                name: e.name.clone(),
                fired: e.fired,
                prescale: e.prescale,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evflat_core::{PrescaleError, PrescaleTable};

    fn menu(table: &str, paths: &[&str]) -> TriggerMenu {
        TriggerMenu::new("HLT", table, paths.iter().map(|p| p.to_string()).collect())
    }

    fn registry() -> PathRegistry {
        PathRegistry::new(vec![
            PathSpec::new("jet450", "HLT_PFJet450_v", false),
            PathSpec::new("mu24", "HLT_IsoMu24_v", false),
            PathSpec::new("pho120", "HLT_Photon120_v", true),
        ])
        .unwrap()
    }

    fn prescales(pairs: &[(&str, f64)]) -> PrescaleTable {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn every_configured_name_has_an_entry_even_unresolved() {
        let mut reg = registry();
        let warnings = reg.resolve(&menu("A", &["HLT_PFJet450_v9"]));
        assert_eq!(reg.entries().len(), 3);
        assert_eq!(reg.resolved_count(), 1);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| matches!(w, Warning::UnresolvedName { .. })));
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut reg = registry();
        let m = menu("A", &["HLT_IsoMu24_v3", "HLT_Photon120_v7", "HLT_PFJet450_v9"]);
        reg.resolve(&m);
        let first: Vec<_> = reg.resolved_map().into_iter().map(|(n, i)| (n.to_string(), i)).collect();
        reg.resolve(&m);
        let second: Vec<_> = reg.resolved_map().into_iter().map(|(n, i)| (n.to_string(), i)).collect();
        assert_eq!(first, second);
        assert_eq!(reg.resolved_index("jet450"), Some(2));
    }

    #[test]
    fn update_sets_fired_and_prescale() {
        let mut reg = registry();
        reg.resolve(&menu("A", &["HLT_PFJet450_v9", "HLT_IsoMu24_v3", "HLT_Photon120_v7"]));
        let warnings = reg.update(
            &[true, false, true],
            &prescales(&[("HLT_PFJet450_v9", 1.0), ("HLT_IsoMu24_v3", 1.0), ("HLT_Photon120_v7", 40.0)]),
        );
        assert!(warnings.is_empty());
        assert!(reg.fired("jet450"));
        assert!(!reg.fired("mu24"));
        assert!(reg.fired("pho120"));
        assert_eq!(reg.prescale("pho120"), 40.0);
    }

    #[test]
    fn unknown_names_are_safe() {
        let mut reg = registry();
        assert!(!reg.fired("nonexistent"));
        assert_eq!(reg.prescale("nonexistent"), DEFAULT_PRESCALE);
        reg.resolve(&menu("A", &["HLT_PFJet450_v9"]));
        reg.update(&[true], &PrescaleTable::new());
        assert!(!reg.fired("nonexistent"));
    }

    #[test]
    fn failed_prescale_lookup_keeps_previous_value() {
        let mut reg = registry();
        reg.resolve(&menu("A", &["HLT_Photon120_v7"]));
        reg.update(&[true], &prescales(&[("HLT_Photon120_v7", 40.0)]));
        assert_eq!(reg.prescale("pho120"), 40.0);

        let failing = |_: &str| -> Result<f64, PrescaleError> {
            Err(PrescaleError::Unavailable("provider not initialised".into()))
        };
        let warnings = reg.update(&[true], &failing);
        assert_eq!(reg.prescale("pho120"), 40.0);
        assert!(reg.fired("pho120"));
        assert!(matches!(
            warnings.as_slice(),
            [Warning::PrescaleLookupFailure { retained, .. }] if *retained == 40.0
        ));
    }

    #[test]
    fn prescale_not_queried_when_not_recorded() {
        let mut reg =
            PathRegistry::new(vec![PathSpec::new("jet450", "HLT_PFJet450_v", false)]).unwrap();
        reg.resolve(&menu("A", &["HLT_PFJet450_v9"]));
        let warnings = reg.update(&[true], &PrescaleTable::new());
        assert!(warnings.is_empty());
        assert_eq!(reg.prescale("jet450"), DEFAULT_PRESCALE);
    }

    #[test]
    fn menu_change_drops_paths_missing_from_new_menu() {
        let mut reg = registry();
        reg.resolve(&menu("A", &["HLT_PFJet450_v9", "HLT_Photon120_v7"]));
        reg.update(&[false, true], &prescales(&[("HLT_Photon120_v7", 40.0)]));
        assert!(reg.fired("pho120"));

        let warnings = reg.resolve(&menu("B", &["HLT_PFJet450_v10", "HLT_IsoMu24_v4"]));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::UnresolvedName { name, .. } if name == "pho120")));
        assert_eq!(reg.resolved_index("pho120"), None);
        assert!(!reg.fired("pho120"));

        reg.update(&[true, true], &PrescaleTable::new());
        assert!(!reg.fired("pho120"));
        assert!(reg.fired("jet450"));
        assert!(reg.fired("mu24"));
        // last known prescale survives the menu change
        assert_eq!(reg.prescale("pho120"), 40.0);
    }

    #[test]
    fn resolve_if_changed_skips_identical_menu() {
        let mut reg = registry();
        let m = menu("A", &["HLT_PFJet450_v9"]);
        assert!(reg.resolve_if_changed(&m).is_some());
        assert!(reg.resolve_if_changed(&m).is_none());
        assert!(reg.resolve_if_changed(&menu("B", &["HLT_PFJet450_v9"])).is_some());
    }

    #[test]
    fn update_before_resolve_reports_and_defaults() {
        let mut reg = registry();
        let warnings = reg.update(&[true, true, true], &PrescaleTable::new());
        assert_eq!(
            warnings,
            vec![Warning::RegistryNotResolved {
                registry: RegistryKind::Trigger
            }]
        );
        assert!(reg.columns().iter().all(|c| !c.fired && c.prescale == DEFAULT_PRESCALE));
    }

    #[test]
    fn short_decision_vector_reads_not_fired() {
        let mut reg = registry();
        reg.resolve(&menu("A", &["HLT_PFJet450_v9", "HLT_IsoMu24_v3"]));
        let warnings = reg.update(&[true], &PrescaleTable::new());
        assert!(reg.fired("jet450"));
        assert!(!reg.fired("mu24"));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::DecisionOutOfRange { index: 1, len: 1, .. })));
    }

    #[test]
    fn columns_follow_configuration_order() {
        let mut reg = registry();
        reg.resolve(&menu("A", &["HLT_Photon120_v7", "HLT_PFJet450_v9"]));
        let names: Vec<_> = reg.columns().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["jet450", "mu24", "pho120"]);
    }

    #[test]
    fn from_config_keeps_prescale_flag() {
        let reg = PathRegistry::from_config(&[TriggerConfig::new("dijet", "HLT_DiPFJet_v", false)]).unwrap();
        assert!(!reg.entries()[0].record_prescale);
    }

    #[test]
    fn prescale_is_not_recorded_unless_configured() {
        let config = evflat_config::ProducerConfig::from_toml(
            "[[triggers]]\nname = \"jet450\"\npattern = \"HLT_PFJet450_v\"\n",
        )
        .unwrap();
        let mut reg = PathRegistry::from_config(&config.triggers).unwrap();
        assert!(!reg.entries()[0].record_prescale);

        reg.resolve(&menu("A", &["HLT_PFJet450_v9"]));
        let failing = |_: &str| -> Result<f64, PrescaleError> {
            Err(PrescaleError::Unavailable("never queried".into()))
        };
        assert!(reg.update(&[true], &failing).is_empty());
        assert!(reg.fired("jet450"));
    }

    #[test]
    fn ambiguous_pattern_resolves_to_first_in_menu_order() {
        let mut reg = registry();
        // the later entry equals the pattern verbatim, the earlier one still wins
        let warnings = reg.resolve(&menu(
            "A",
            &["HLT_PFJet450_v9", "HLT_IsoMu24_v3", "HLT_IsoMu24_v"],
        ));
        assert_eq!(reg.resolved_index("mu24"), Some(1));
        assert_eq!(
            reg.entry("mu24").unwrap().resolved_path.as_deref(),
            Some("HLT_IsoMu24_v3")
        );
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::AmbiguousMatch { name, .. } if name == "mu24")));
    }
}
