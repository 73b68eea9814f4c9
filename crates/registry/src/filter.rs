//! Filter-flag registry: pass/fail of named quality and noise filters.

use crate::matcher::{NamePattern, compile_all, decision_at, resolve_all};
use evflat_config::FilterConfig;
use evflat_core::{FilterColumn, RegistryError, RegistryKind, TriggerMenu, Warning};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub name: String,
    pub flag: String,
}

impl FilterSpec {
    pub fn new(name: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flag: flag.into(),
        }
    }
}

impl From<&FilterConfig> for FilterSpec {
    fn from(c: &FilterConfig) -> Self {
        Self::new(c.name.clone(), c.flag.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterEntry {
    pub name: String,
    pub flag: String,
    pub resolved_index: Option<usize>,
    pub passed: bool,
}

/// Same per-run discipline as [`crate::PathRegistry`], without prescales.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    patterns: Vec<NamePattern>,
    entries: Vec<FilterEntry>,
    menu: Option<TriggerMenu>,
}

impl FilterRegistry {
    pub fn new(specs: Vec<FilterSpec>) -> Result<Self, RegistryError> {
        let patterns = compile_all(
            RegistryKind::Filter,
            specs.iter().map(|s| (s.name.as_str(), s.flag.as_str())),
        )?;
        let entries = specs
            .into_iter()
            .map(|s| FilterEntry {
                name: s.name,
                flag: s.flag,
                resolved_index: None,
                passed: false,
            })
            .collect();
        Ok(Self {
            patterns,
            entries,
            menu: None,
        })
    }

    pub fn from_config(filters: &[FilterConfig]) -> Result<Self, RegistryError> {
        Self::new(filters.iter().map(FilterSpec::from).collect())
    }

    pub fn resolve(&mut self, menu: &TriggerMenu) -> Vec<Warning> {
        let (indices, warnings) = resolve_all(RegistryKind::Filter, &self.patterns, menu);
        for (entry, index) in self.entries.iter_mut().zip(indices) {
            entry.resolved_index = index;
            entry.passed = false;
        }
        self.menu = Some(menu.clone());

        info!(
            menu = %menu.label(),
            configured = self.entries.len(),
            resolved = self.resolved_count(),
            "Filter flags resolved"
        );
        warnings
    }

    pub fn resolve_if_changed(&mut self, menu: &TriggerMenu) -> Option<Vec<Warning>> {
        if self.menu.as_ref().is_some_and(|m| m.same_identity(menu)) {
            debug!(menu = %menu.label(), "Filter menu unchanged, keeping resolution");
            return None;
        }
        Some(self.resolve(menu))
    }

    pub fn update(&mut self, decisions: &[bool]) -> Vec<Warning> {
        if self.menu.is_none() {
            self.clear();
            warn!("Filter registry updated before any menu was resolved");
            return vec![Warning::RegistryNotResolved {
                registry: RegistryKind::Filter,
            }];
        }

        let mut warnings = Vec::new();
        for entry in &mut self.entries {
            entry.passed = match entry.resolved_index {
                Some(index) => decision_at(
                    RegistryKind::Filter,
                    &entry.name,
                    index,
                    decisions,
                    &mut warnings,
                ),
                None => false,
            };
        }
        warnings
    }

    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            entry.passed = false;
        }
    }

    /// `false` for unresolved or unknown names.
    pub fn passed(&self, name: &str) -> bool {
        self.entry(name).is_some_and(|e| e.passed)
    }

    pub fn resolved_index(&self, name: &str) -> Option<usize> {
        self.entry(name).and_then(|e| e.resolved_index)
    }

    pub fn entry(&self, name: &str) -> Option<&FilterEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.resolved_index.is_some()).count()
    }

    pub fn is_resolved(&self) -> bool {
        self.menu.is_some()
    }

    pub fn columns(&self) -> Vec<FilterColumn> {
        self.entries
            .iter()
            .map(|e| FilterColumn {
                name: e.name.clone(),
                passed: e.passed,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> TriggerMenu {
        TriggerMenu::new(
            "RECO",
            "flags",
            vec![
                "Flag_goodVertices".into(),
                "Flag_HBHENoiseFilter".into(),
                "Flag_HBHENoiseIsoFilter".into(),
                "Flag_eeBadScFilter".into(),
            ],
        )
    }

    fn registry() -> FilterRegistry {
        FilterRegistry::new(vec![
            FilterSpec::new("hbhe", "Flag_HBHENoiseFilter"),
            FilterSpec::new("vertex", "Flag_goodVertices"),
            FilterSpec::new("halo", "Flag_globalTightHalo2016Filter"),
        ])
        .unwrap()
    }

    #[test]
    fn full_flag_names_resolve_to_their_own_entry() {
        let mut reg = registry();
        let warnings = reg.resolve(&flags());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(&warnings[0], Warning::UnresolvedName { name, .. } if name == "halo"));
        assert_eq!(reg.resolved_index("hbhe"), Some(1));
        assert_eq!(reg.resolved_index("vertex"), Some(0));
    }

    #[test]
    fn update_reads_decisions() {
        let mut reg = registry();
        reg.resolve(&flags());
        assert!(reg.update(&[true, false, true, true]).is_empty());
        assert!(!reg.passed("hbhe"));
        assert!(reg.passed("vertex"));
        assert!(!reg.passed("halo"));
    }

    #[test]
    fn unknown_name_is_not_passed() {
        let mut reg = registry();
        reg.resolve(&flags());
        reg.update(&[true, true, true, true]);
        assert!(!reg.passed("nonexistent"));
    }

    #[test]
    fn update_before_resolve_reports() {
        let mut reg = registry();
        let warnings = reg.update(&[true; 4]);
        assert!(matches!(
            warnings.as_slice(),
            [Warning::RegistryNotResolved {
                registry: RegistryKind::Filter
            }]
        ));
        assert!(reg.columns().iter().all(|c| !c.passed));
    }

    #[test]
    fn clear_resets_passed_flags() {
        let mut reg = registry();
        reg.resolve(&flags());
        reg.update(&[true; 4]);
        assert!(reg.passed("vertex"));
        reg.clear();
        assert!(!reg.passed("vertex"));
    }

    #[test]
    fn from_config_uses_default_filter_list() {
        let config = evflat_config::ProducerConfig::default();
        let reg = FilterRegistry::from_config(&config.filters).unwrap();
        assert_eq!(reg.entries().len(), config.filters.len());
        assert!(!reg.is_resolved());
    }

    #[test]
    fn shared_prefix_is_ambiguous_and_takes_first_flag() {
        let mut reg = FilterRegistry::new(vec![FilterSpec::new("hbhe", "Flag_HBHENoise")]).unwrap();
        let warnings = reg.resolve(&flags());
        assert_eq!(reg.resolved_index("hbhe"), Some(1));
        assert!(matches!(
            warnings.as_slice(),
            [Warning::AmbiguousMatch { registry: RegistryKind::Filter, chosen, candidates, .. }]
                if chosen == "Flag_HBHENoiseFilter" && candidates.len() == 2
        ));

        reg.update(&[false, true, false, false]);
        assert!(reg.passed("hbhe"));
    }

    #[test]
    fn flag_dropped_from_new_menu_stops_passing() {
        let mut reg = registry();
        reg.resolve(&flags());
        reg.update(&[true, true, true, true]);
        assert!(reg.passed("hbhe"));
        assert!(reg.passed("vertex"));

        let reduced = TriggerMenu::new(
            "RECO",
            "flags-v2",
            vec!["Flag_goodVertices".into(), "Flag_eeBadScFilter".into()],
        );
        let warnings = reg.resolve_if_changed(&reduced).unwrap();
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::UnresolvedName { name, .. } if name == "hbhe")));
        assert_eq!(reg.resolved_index("hbhe"), None);
        assert!(!reg.passed("hbhe"));

        assert!(reg.update(&[true, true]).is_empty());
        assert!(!reg.passed("hbhe"));
        assert!(reg.passed("vertex"));
    }
}
