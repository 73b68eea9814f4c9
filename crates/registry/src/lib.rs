//! Name resolution of configured trigger paths and filter flags.
//!
//! Both registries follow the same per-run discipline:
//!
//! ```text
//!   run begin ──▶ resolve(menu)     configured name → menu index, once
//!   each event ─▶ update(decisions) index → fired / passed (+ prescale)
//!   row build ──▶ fired(name) / passed(name) / columns()
//! ```
//!
//! Resolution failures are [`Warning`](evflat_core::Warning)s, never
//! errors: an unresolved name simply reads as not fired / not passed.
//! The only errors are configuration-time ones (bad pattern syntax,
//! duplicate or empty names), reported by the constructors.

mod filter;
mod matcher;
mod path;

pub use filter::{FilterEntry, FilterRegistry, FilterSpec};
pub use matcher::{MenuMatch, NamePattern};
pub use path::{DEFAULT_PRESCALE, PathEntry, PathRegistry, PathSpec};
