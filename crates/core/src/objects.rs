//! Reconstructed physics objects as supplied by the upstream event source.
//!
//! These are read-only inputs: the producer never recomputes kinematics,
//! it only selects, orders, and projects what it is given.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The object collections a row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Vertex,
    Track,
    GenJet,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Vertex => "vertex",
            ObjectKind::Track => "track",
            ObjectKind::GenJet => "genjet",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Objects that carry a transverse momentum and can be ranked by it.
pub trait TransverseMomentum {
    fn pt(&self) -> f64;
}

/// A reconstructed primary vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub ndof: f64,
    #[serde(default)]
    pub n_tracks: u32,
    #[serde(default)]
    pub normalized_chi2: f64,
}

/// A reconstructed charged-particle track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    #[serde(default)]
    pub pt_error: f64,
    #[serde(default)]
    pub dxy: f64,
    #[serde(default)]
    pub d0: f64,
    #[serde(default)]
    pub dz: f64,
    #[serde(default)]
    pub dz_error: f64,
    #[serde(default)]
    pub normalized_chi2: f64,
    #[serde(default)]
    pub ndof: f64,
    #[serde(default)]
    pub n_hits: u32,
    #[serde(default)]
    pub n_pixel_hits: u32,
    #[serde(default)]
    pub high_purity: bool,
    /// Index of the primary vertex the track is associated with, if any.
    #[serde(default)]
    pub from_pv: Option<u32>,
}

impl TransverseMomentum for Track {
    fn pt(&self) -> f64 {
        self.pt
    }
}

/// A generator-level jet (simulation only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenJet {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub energy: f64,
    #[serde(default)]
    pub mass: f64,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default)]
    pub vz: f64,
    #[serde(default)]
    pub charged_energy_fraction: f64,
}

impl TransverseMomentum for GenJet {
    fn pt(&self) -> f64 {
        self.pt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_optional_fields_default() {
        let track: Track = serde_json::from_str(r#"{"pt": 12.5, "eta": 0.3, "phi": -1.2}"#).unwrap();
        assert_eq!(track.pt(), 12.5);
        assert_eq!(track.n_hits, 0);
        assert!(!track.high_purity);
        assert!(track.from_pv.is_none());
    }

    #[test]
    fn object_kind_display() {
        assert_eq!(ObjectKind::GenJet.to_string(), "genjet");
    }
}
