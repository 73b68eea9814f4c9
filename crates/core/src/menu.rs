//! Trigger and filter menus: the ordered path names valid for one run.

use serde::{Deserialize, Serialize};

/// An ordered list of decision-path names, valid for the duration of a run.
///
/// The same type describes both the HLT menu and the filter-results menu;
/// decision vectors delivered with each event are aligned to `paths`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerMenu {
    /// Process that produced the decisions (e.g. `HLT`, `RECO`).
    #[serde(default)]
    pub process: String,

    /// Menu / table version label.
    #[serde(default)]
    pub table: String,

    /// Path names, in decision-vector order.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl TriggerMenu {
    pub fn new(process: impl Into<String>, table: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            process: process.into(),
            table: table.into(),
            paths,
        }
    }

    /// Human-readable identity used in log lines and warnings.
    pub fn label(&self) -> String {
        match (self.process.is_empty(), self.table.is_empty()) {
            (true, true) => "(unnamed menu)".into(),
            (false, true) => self.process.clone(),
            (true, false) => self.table.clone(),
            (false, false) => format!("{}:{}", self.process, self.table),
        }
    }

    /// Whether `other` describes the same menu, i.e. resolution can be reused.
    pub fn same_identity(&self, other: &TriggerMenu) -> bool {
        self == other
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn index_of(&self, path: &str) -> Option<usize> {
        self.paths.iter().position(|p| p == path)
    }
}
