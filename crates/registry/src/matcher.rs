//! Pattern matching of configured names against menu entries.
//!
//! A pattern matches a menu path when the path equals it exactly, or when
//! the pattern, read as a regular expression anchored at the start of the
//! path, matches. The first matching entry in menu order is used; more than
//! one match is reported as ambiguous.
//!
//! ```text
//! HLT_IsoMu24_v        matches HLT_IsoMu24_v3, HLT_IsoMu24_v4 (prefix)
//! HLT_IsoMu24_v\d+$    matches HLT_IsoMu24_v3, not HLT_IsoMu24_eta2p1_v1
//! Flag_goodVertices    matches Flag_goodVertices (exact)
//! ```

use evflat_core::{RegistryError, RegistryKind, TriggerMenu, Warning};
use regex_lite::Regex;
use std::collections::HashSet;
use tracing::warn;

/// A configured column name together with its compiled menu pattern.
#[derive(Debug, Clone)]
pub struct NamePattern {
    name: String,
    pattern: String,
    regex: Regex,
}

/// Outcome of matching one pattern against a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuMatch {
    /// Index of the chosen menu entry.
    pub index: usize,
    /// Every matching index in menu order; more than one means ambiguous.
    pub candidates: Vec<usize>,
}

impl MenuMatch {
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

impl NamePattern {
    /// Compile `pattern` for the column `name`.
    pub fn compile(name: impl Into<String>, pattern: impl Into<String>) -> Result<Self, RegistryError> {
        let name = name.into();
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|e| {
            RegistryError::InvalidPattern {
                name: name.clone(),
                pattern: pattern.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            name,
            pattern,
            regex,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, path: &str) -> bool {
        path == self.pattern || self.regex.is_match(path)
    }

    /// Find this pattern's entry in `menu`: the first match in menu order.
    pub fn find_in(&self, menu: &TriggerMenu) -> Option<MenuMatch> {
        let candidates: Vec<usize> = menu
            .paths
            .iter()
            .enumerate()
            .filter(|(_, path)| self.is_match(path))
            .map(|(i, _)| i)
            .collect();

        let index = *candidates.first()?;
        Some(MenuMatch { index, candidates })
    }
}

/// Compile `(name, pattern)` pairs, rejecting empty and duplicate names.
pub(crate) fn compile_all<'a>(
    registry: RegistryKind,
    specs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<Vec<NamePattern>, RegistryError> {
    let mut seen = HashSet::new();
    let mut compiled = Vec::new();
    for (position, (name, pattern)) in specs.into_iter().enumerate() {
        if name.is_empty() {
            return Err(RegistryError::EmptyName {
                registry: registry.to_string(),
                position,
            });
        }
        if !seen.insert(name) {
            return Err(RegistryError::DuplicateName {
                registry: registry.to_string(),
                name: name.to_string(),
            });
        }
        compiled.push(NamePattern::compile(name, pattern)?);
    }
    Ok(compiled)
}

/// Resolve every pattern against `menu`, in configuration order.
///
/// Returns one slot per pattern plus the warnings raised along the way.
pub(crate) fn resolve_all(
    registry: RegistryKind,
    patterns: &[NamePattern],
    menu: &TriggerMenu,
) -> (Vec<Option<usize>>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let indices = patterns
        .iter()
        .map(|p| match p.find_in(menu) {
            Some(m) => {
                if m.is_ambiguous() {
                    let candidates: Vec<String> =
                        m.candidates.iter().map(|&i| menu.paths[i].clone()).collect();
                    warn!(
                        registry = %registry,
                        name = %p.name,
                        pattern = %p.pattern,
                        chosen = %menu.paths[m.index],
                        candidates = candidates.len(),
                        "Pattern is ambiguous, using first match in menu order"
                    );
                    warnings.push(Warning::AmbiguousMatch {
                        registry,
                        name: p.name.clone(),
                        pattern: p.pattern.clone(),
                        chosen: menu.paths[m.index].clone(),
                        candidates,
                    });
                }
                Some(m.index)
            }
            None => {
                warn!(
                    registry = %registry,
                    name = %p.name,
                    pattern = %p.pattern,
                    menu = %menu.label(),
                    "No menu entry matches"
                );
                warnings.push(Warning::UnresolvedName {
                    registry,
                    name: p.name.clone(),
                    pattern: p.pattern.clone(),
                    menu: menu.label(),
                });
                None
            }
        })
        .collect();
    (indices, warnings)
}

/// Read the decision at `index`, recording a warning when it is out of range.
pub(crate) fn decision_at(
    registry: RegistryKind,
    name: &str,
    index: usize,
    decisions: &[bool],
    warnings: &mut Vec<Warning>,
) -> bool {
    match decisions.get(index) {
        Some(&decision) => decision,
        None => {
            warn!(
                registry = %registry,
                name,
                index,
                len = decisions.len(),
                "Decision vector shorter than resolved menu"
            );
            warnings.push(Warning::DecisionOutOfRange {
                registry,
                name: name.to_string(),
                index,
                len: decisions.len(),
            });
            false
        }
    }
}
