//! Prescale lookup: the per-run source of trigger prescale values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why a prescale could not be obtained.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PrescaleError {
    #[error("no prescale known for path '{0}'")]
    NotFound(String),

    #[error("prescale {value} for path '{path}' is not a valid divisor")]
    Invalid { path: String, value: f64 },

    #[error("prescale provider unavailable: {0}")]
    Unavailable(String),
}

/// Looks up the prescale of a menu path by its full name.
///
/// Failures are reported as values; the registry keeps the previous
/// prescale when a lookup fails.
pub trait PrescaleLookup {
    fn prescale(&self, path: &str) -> Result<f64, PrescaleError>;
}

impl<F> PrescaleLookup for F
where
    F: Fn(&str) -> Result<f64, PrescaleError>,
{
    fn prescale(&self, path: &str) -> Result<f64, PrescaleError> {
        self(path)
    }
}

/// A fixed name → prescale table, typically delivered with a run-begin record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrescaleTable {
    values: HashMap<String, f64>,
}

impl PrescaleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for PrescaleTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl PrescaleLookup for PrescaleTable {
    fn prescale(&self, path: &str) -> Result<f64, PrescaleError> {
        match self.values.get(path) {
            Some(&value) if value.is_finite() && value >= 0.0 => Ok(value),
            Some(&value) => Err(PrescaleError::Invalid {
                path: path.to_string(),
                value,
            }),
            None => Err(PrescaleError::NotFound(path.to_string())),
        }
    }
}
