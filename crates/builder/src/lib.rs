//! Row assembly for evflat.
//!
//! [`RecordBuilder`] turns one event into one [`Row`](evflat_core::Row):
//!
//! 1. trigger and filter decision vectors → named flags (registries)
//! 2. tracks → stable sort by descending pT ([`PtDescendingOrder`])
//! 3. every collection → first N entries plus true total ([`truncate`])
//! 4. retained objects → flat projected fields
//!
//! [`Producer`] drives a builder over a whole source stream and feeds a
//! [`RowSink`](evflat_sink::RowSink).

pub mod builder;
pub mod job;
pub mod order;
pub mod truncate;

pub use builder::{Assembled, RecordBuilder};
pub use job::{JobSummary, Producer};
pub use order::PtDescendingOrder;
pub use truncate::{CollectionTruncator, Truncated, truncate};
