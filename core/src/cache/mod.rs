//! Match cache: persisted skill id → embedding store.
//!
//! Staleness is content-addressed: an entry is reusable only while the
//! signature of the skill text it was computed from still matches.

mod refresh;
mod signature;
mod store;

pub use refresh::{refresh_embeddings, BatchOptions, RefreshSummary};
pub use signature::source_signature;
pub use store::{CacheEntry, CacheStatus, MatchCache};
