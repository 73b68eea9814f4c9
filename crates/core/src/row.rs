//! The flat output record: one [`Row`] per event.

use crate::objects::{GenJet, Track, Vertex};
use serde::{Deserialize, Deserializer, Serialize};

/// A capped, ordered collection together with the uncapped count.
///
/// `stored.len() == min(total, capacity)` for the capacity it was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capped<T> {
    pub total: usize,
    pub stored: Vec<T>,
}

impl<T> Capped<T> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            stored: Vec::new(),
        }
    }

    /// Whether entries were dropped to respect the capacity.
    pub fn is_truncated(&self) -> bool {
        self.stored.len() < self.total
    }
}

impl<T> Default for Capped<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// JSON has no NaN or infinity and `serde_json` writes them as `null`;
/// read `null` back as NaN so such rows still load. Infinities come back
/// as NaN.
fn null_as_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Fired flag and prescale of one configured trigger path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerColumn {
    pub name: String,
    pub fired: bool,
    #[serde(deserialize_with = "null_as_nan")]
    pub prescale: f64,
}

/// Pass flag of one configured filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterColumn {
    pub name: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRow {
    #[serde(deserialize_with = "null_as_nan")]
    pub x: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub y: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub z: f64,
    /// Transverse distance from the beam line.
    #[serde(deserialize_with = "null_as_nan")]
    pub rho: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub ndof: f64,
    pub n_tracks: u32,
    #[serde(deserialize_with = "null_as_nan")]
    pub normalized_chi2: f64,
}

impl From<&Vertex> for VertexRow {
    fn from(v: &Vertex) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
            rho: v.x.hypot(v.y),
            ndof: v.ndof,
            n_tracks: v.n_tracks,
            normalized_chi2: v.normalized_chi2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRow {
    #[serde(deserialize_with = "null_as_nan")]
    pub pt: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub eta: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub phi: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub pt_error: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub dxy: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub d0: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub dz: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub dz_error: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub normalized_chi2: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub ndof: f64,
    pub n_hits: u32,
    pub n_pixel_hits: u32,
    pub high_purity: bool,
    /// Associated primary-vertex index, `-1` when unassociated.
    pub from_pv: i64,
}

impl From<&Track> for TrackRow {
    fn from(t: &Track) -> Self {
        Self {
            pt: t.pt,
            eta: t.eta,
            phi: t.phi,
            pt_error: t.pt_error,
            dxy: t.dxy,
            d0: t.d0,
            dz: t.dz,
            dz_error: t.dz_error,
            normalized_chi2: t.normalized_chi2,
            ndof: t.ndof,
            n_hits: t.n_hits,
            n_pixel_hits: t.n_pixel_hits,
            high_purity: t.high_purity,
            from_pv: t.from_pv.map_or(-1, i64::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenJetRow {
    #[serde(deserialize_with = "null_as_nan")]
    pub pt: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub eta: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub phi: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub energy: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub mass: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub area: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub vx: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub vy: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub vz: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub charged_energy_fraction: f64,
}

impl From<&GenJet> for GenJetRow {
    fn from(j: &GenJet) -> Self {
        Self {
            pt: j.pt,
            eta: j.eta,
            phi: j.phi,
            energy: j.energy,
            mass: j.mass,
            area: j.area,
            vx: j.vx,
            vy: j.vy,
            vz: j.vz,
            charged_energy_fraction: j.charged_energy_fraction,
        }
    }
}

/// One flat, fixed-schema record per event.
///
/// Trigger and filter columns appear in configuration order, one per
/// configured name, whether or not the name resolved this run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,

    /// Pileup energy density, passed through unchanged. A non-finite
    /// value is written as `null` and reads back as `None`.
    pub pileup_density: Option<f64>,

    pub triggers: Vec<TriggerColumn>,
    pub filters: Vec<FilterColumn>,

    pub vertices: Capped<VertexRow>,
    pub tracks: Capped<TrackRow>,
    pub genjets: Capped<GenJetRow>,
}

impl Row {
    pub fn trigger(&self, name: &str) -> Option<&TriggerColumn> {
        self.triggers.iter().find(|t| t.name == name)
    }

    pub fn filter(&self, name: &str) -> Option<&FilterColumn> {
        self.filters.iter().find(|f| f.name == name)
    }
}
