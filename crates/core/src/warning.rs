//! Non-fatal diagnostics raised while resolving menus and assembling rows.
//!
//! A warning never aborts row construction: the affected field falls back
//! to its documented default and the warning is handed back to the caller
//! next to the row.

use crate::objects::ObjectKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which name registry raised a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKind {
    Trigger,
    Filter,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::Trigger => write!(f, "trigger"),
            RegistryKind::Filter => write!(f, "filter"),
        }
    }
}

/// A recorded, non-fatal condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A configured name has no matching entry in the current menu.
    #[error("{registry} '{name}' (pattern '{pattern}') has no match in menu '{menu}'")]
    UnresolvedName {
        registry: RegistryKind,
        name: String,
        pattern: String,
        menu: String,
    },

    /// More than one menu entry matches one configured pattern.
    #[error("{registry} '{name}' pattern '{pattern}' matches {} entries, using '{chosen}'", .candidates.len())]
    AmbiguousMatch {
        registry: RegistryKind,
        name: String,
        pattern: String,
        chosen: String,
        candidates: Vec<String>,
    },

    /// An object collection is absent from the event.
    #[error("{object} collection '{tag}' is missing, treated as empty")]
    MissingCollection { object: ObjectKind, tag: String },

    /// A decision vector is absent from the event.
    #[error("{registry} results '{tag}' are missing, all {registry} fields default to false")]
    MissingDecisions { registry: RegistryKind, tag: String },

    /// The prescale lookup failed; the previous value was kept.
    #[error("prescale lookup for '{path}' failed ({reason}), keeping {retained}")]
    PrescaleLookupFailure {
        path: String,
        reason: String,
        retained: f64,
    },

    /// `update` was called before the registry was resolved for this run.
    #[error("{registry} registry used before it was resolved against a menu")]
    RegistryNotResolved { registry: RegistryKind },

    /// A resolved index points past the end of the event's decision vector.
    #[error("{registry} '{name}' index {index} is outside a decision vector of length {len}")]
    DecisionOutOfRange {
        registry: RegistryKind,
        name: String,
        index: usize,
        len: usize,
    },
}

/// Fieldless discriminant of [`Warning`], used for tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    UnresolvedName,
    AmbiguousMatch,
    MissingCollection,
    MissingDecisions,
    PrescaleLookupFailure,
    RegistryNotResolved,
    DecisionOutOfRange,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::UnresolvedName => "unresolved_name",
            WarningKind::AmbiguousMatch => "ambiguous_match",
            WarningKind::MissingCollection => "missing_collection",
            WarningKind::MissingDecisions => "missing_decisions",
            WarningKind::PrescaleLookupFailure => "prescale_lookup_failure",
            WarningKind::RegistryNotResolved => "registry_not_resolved",
            WarningKind::DecisionOutOfRange => "decision_out_of_range",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Warning {
    pub fn kind(&self) -> WarningKind {
        match self {
            Warning::UnresolvedName { .. } => WarningKind::UnresolvedName,
            Warning::AmbiguousMatch { .. } => WarningKind::AmbiguousMatch,
            Warning::MissingCollection { .. } => WarningKind::MissingCollection,
            Warning::MissingDecisions { .. } => WarningKind::MissingDecisions,
            Warning::PrescaleLookupFailure { .. } => WarningKind::PrescaleLookupFailure,
            Warning::RegistryNotResolved { .. } => WarningKind::RegistryNotResolved,
            Warning::DecisionOutOfRange { .. } => WarningKind::DecisionOutOfRange,
        }
    }
}
