//! The event boundary: what the upstream source delivers per run and per event.
//!
//! Collections are addressed by [`InputTag`], so the same source can carry
//! several products of one kind (e.g. two track collections) and the
//! configuration picks which one feeds the row.

use crate::menu::TriggerMenu;
use crate::objects::{GenJet, Track, Vertex};
use crate::prescale::PrescaleTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name of a product in the event, e.g. `offlinePrimaryVertices`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputTag(String);

impl fmt::Display for InputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InputTag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for InputTag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Run / luminosity-block / event numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.run, self.lumi, self.event)
    }
}

/// Read-only, tag-addressed access to one event's products.
///
/// `None` means the product is absent; an empty slice means it is present
/// but has no entries.
pub trait EventView {
    fn id(&self) -> EventId;
    fn vertices(&self, tag: &InputTag) -> Option<&[Vertex]>;
    fn tracks(&self, tag: &InputTag) -> Option<&[Track]>;
    fn genjets(&self, tag: &InputTag) -> Option<&[GenJet]>;
    fn decisions(&self, tag: &InputTag) -> Option<&[bool]>;
    fn scalar(&self, tag: &InputTag) -> Option<f64>;
}

/// A self-contained event, as read from a JSON-lines source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub vertices: HashMap<InputTag, Vec<Vertex>>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tracks: HashMap<InputTag, Vec<Track>>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub genjets: HashMap<InputTag, Vec<GenJet>>,

    /// Decision vectors (trigger and filter results), aligned to their menus.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub decisions: HashMap<InputTag, Vec<bool>>,

    /// Scalar products such as the pileup energy density.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub scalars: HashMap<InputTag, f64>,
}

impl EventRecord {
    pub fn new(run: u32, lumi: u32, event: u64) -> Self {
        Self {
            run,
            lumi,
            event,
            ..Self::default()
        }
    }

    pub fn with_vertices(mut self, tag: impl Into<InputTag>, vertices: Vec<Vertex>) -> Self {
        self.vertices.insert(tag.into(), vertices);
        self
    }

    pub fn with_tracks(mut self, tag: impl Into<InputTag>, tracks: Vec<Track>) -> Self {
        self.tracks.insert(tag.into(), tracks);
        self
    }

    pub fn with_genjets(mut self, tag: impl Into<InputTag>, genjets: Vec<GenJet>) -> Self {
        self.genjets.insert(tag.into(), genjets);
        self
    }

    pub fn with_decisions(mut self, tag: impl Into<InputTag>, decisions: Vec<bool>) -> Self {
        self.decisions.insert(tag.into(), decisions);
        self
    }

    pub fn with_scalar(mut self, tag: impl Into<InputTag>, value: f64) -> Self {
        self.scalars.insert(tag.into(), value);
        self
    }
}

impl EventView for EventRecord {
    fn id(&self) -> EventId {
        EventId {
            run: self.run,
            lumi: self.lumi,
            event: self.event,
        }
    }

    fn vertices(&self, tag: &InputTag) -> Option<&[Vertex]> {
        self.vertices.get(tag).map(Vec::as_slice)
    }

    fn tracks(&self, tag: &InputTag) -> Option<&[Track]> {
        self.tracks.get(tag).map(Vec::as_slice)
    }

    fn genjets(&self, tag: &InputTag) -> Option<&[GenJet]> {
        self.genjets.get(tag).map(Vec::as_slice)
    }

    fn decisions(&self, tag: &InputTag) -> Option<&[bool]> {
        self.decisions.get(tag).map(Vec::as_slice)
    }

    fn scalar(&self, tag: &InputTag) -> Option<f64> {
        self.scalars.get(tag).copied()
    }
}

/// Delivered once at the start of every run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunBegin {
    pub run: u32,

    #[serde(default)]
    pub trigger_menu: TriggerMenu,

    #[serde(default)]
    pub filter_menu: TriggerMenu,

    /// Prescales for this run, keyed by full path name.
    #[serde(default)]
    pub prescales: PrescaleTable,
}

/// One line of a source stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceRecord {
    RunBegin(RunBegin),
    Event(EventRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_tag_displays_verbatim() {
        let tag = InputTag::from("TriggerResults::HLT");
        assert_eq!(tag.to_string(), "TriggerResults::HLT");
        assert_eq!(tag, InputTag::from(String::from("TriggerResults::HLT")));
    }

    #[test]
    fn absent_and_empty_collections_differ() {
        let event = EventRecord::new(1, 1, 1).with_vertices("offlinePrimaryVertices", vec![]);
        assert_eq!(event.vertices(&"offlinePrimaryVertices".into()).map(<[_]>::len), Some(0));
        assert!(event.tracks(&"generalTracks".into()).is_none());
    }

    #[test]
    fn source_record_parses_tagged_lines() {
        let run: SourceRecord = serde_json::from_str(
            r#"{"type":"run_begin","run":316000,
                "trigger_menu":{"process":"HLT","table":"v1","paths":["HLT_PFJet450_v9"]},
                "prescales":{"HLT_PFJet450_v9":1.0}}"#,
        )
        .unwrap();
        assert!(matches!(run, SourceRecord::RunBegin(ref r) if r.run == 316000 && r.trigger_menu.len() == 1));

        let event: SourceRecord = serde_json::from_str(
            r#"{"type":"event","run":316000,"lumi":12,"event":99,
                "tracks":{"generalTracks":[{"pt":3.0,"eta":0.1,"phi":0.2}]},
                "scalars":{"fixedGridRhoFastjetAll":21.5}}"#,
        )
        .unwrap();
        match event {
            SourceRecord::Event(e) => {
                assert_eq!(e.id().to_string(), "316000:12:99");
                assert_eq!(e.scalar(&"fixedGridRhoFastjetAll".into()), Some(21.5));
                assert_eq!(e.tracks(&"generalTracks".into()).map(<[_]>::len), Some(1));
            }
            other => panic!("expected event, got {other:?}"),
        }
    }
}
