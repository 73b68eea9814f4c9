//! # evflat Core
//!
//! Domain types, traits, and error definitions for the evflat event-row
//! producer. This crate has **no framework dependencies**: it defines the
//! model that the registry, builder, and sink crates implement against.
//!
//! ## Data flow
//!
//! ```text
//! EventView ──▶ RecordBuilder ──▶ Row ──▶ RowSink
//!                  │
//!          PathRegistry / FilterRegistry
//!          (resolved per TriggerMenu)
//! ```
//!
//! Everything that can go wrong while assembling a row is a [`Warning`];
//! only configuration and I/O problems are [`Error`]s.

pub mod error;
pub mod event;
pub mod menu;
pub mod objects;
pub mod prescale;
pub mod row;
pub mod warning;

// Re-export key types at crate root for ergonomics
pub use error::{Error, RegistryError, Result, SinkError, SourceError};
pub use event::{EventId, EventRecord, EventView, InputTag, RunBegin, SourceRecord};
pub use menu::TriggerMenu;
pub use objects::{GenJet, ObjectKind, Track, TransverseMomentum, Vertex};
pub use prescale::{PrescaleError, PrescaleLookup, PrescaleTable};
pub use row::{Capped, FilterColumn, GenJetRow, Row, TrackRow, TriggerColumn, VertexRow};
pub use warning::{RegistryKind, Warning, WarningKind};
