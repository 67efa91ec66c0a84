//! List cursor
//!
//! Keeps a stable global index over a list of which only a bounded window is
//! materialized at any time.
//!
//! - [`ledger`] - section/offset accumulation into global indices
//! - [`session`] - eviction offset and ledger for one traversal
//! - [`resolver`] - global index to materialized item

pub mod ledger;
pub mod resolver;
pub mod session;

pub use ledger::SectionLedger;
pub use resolver::{IndexResolver, ItemHandle, Resolution};
pub use session::TraversalSession;
