//! Domain identifier types
//!
//! This module provides newtype wrappers for the identifiers the exporter
//! passes around, so a global list index can never be confused with a
//! position inside the currently materialized window.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Global list index newtype wrapper
///
/// A dense, monotonically assigned position in presentation order that stays
/// stable for the whole run, independent of which items are materialized.
///
/// # Examples
///
/// ```
/// use gallery_export::domain::ids::GlobalIndex;
///
/// let index = GlobalIndex::new(120);
/// assert_eq!(index.local_position(105), Some(15));
/// assert_eq!(index.local_position(200), None);
/// assert_eq!(index.next().value(), 121);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GlobalIndex(u64);

impl GlobalIndex {
    /// The first item of the list
    pub const ZERO: GlobalIndex = GlobalIndex(0);

    /// Creates a new GlobalIndex
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw index value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The index immediately after this one
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The index `count` positions after this one
    pub const fn advance(self, count: u64) -> Self {
        Self(self.0 + count)
    }

    /// Position inside the live window once `eviction_offset` items have been
    /// removed from its front, or `None` if this index has been evicted
    pub fn local_position(self, eviction_offset: u64) -> Option<usize> {
        self.0
            .checked_sub(eviction_offset)
            .and_then(|local| usize::try_from(local).ok())
    }
}

impl fmt::Display for GlobalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:05}", self.0)
    }
}

impl From<u64> for GlobalIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for GlobalIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('#');
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|e| format!("Invalid global index '{s}': {e}"))
    }
}

/// Identifier of a run kind, used as the checkpoint key
///
/// Each export mode keeps its own resume point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// Selection batches exported through the export control
    Batch,
    /// Per-item thumbnail saves
    Thumbnails,
}

impl RunKind {
    /// Returns the checkpoint key for this run kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Batch => "batch",
            RunKind::Thumbnails => "thumbnails",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch" => Ok(RunKind::Batch),
            "thumbnails" => Ok(RunKind::Thumbnails),
            other => Err(format!(
                "Unknown run kind '{other}'. Must be one of: batch, thumbnails"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_index_local_position() {
        let index = GlobalIndex::new(10);
        assert_eq!(index.local_position(0), Some(10));
        assert_eq!(index.local_position(10), Some(0));
        assert_eq!(index.local_position(11), None);
    }

    #[test]
    fn test_global_index_arithmetic() {
        let index = GlobalIndex::new(40);
        assert_eq!(index.next(), GlobalIndex::new(41));
        assert_eq!(index.advance(40), GlobalIndex::new(80));
        assert!(GlobalIndex::ZERO < index);
    }

    #[test]
    fn test_global_index_display_and_parse() {
        let index = GlobalIndex::new(7);
        assert_eq!(index.to_string(), "#00007");
        assert_eq!("#00007".parse::<GlobalIndex>().unwrap(), index);
        assert_eq!("7".parse::<GlobalIndex>().unwrap(), index);
        assert!("seven".parse::<GlobalIndex>().is_err());
    }

    #[test]
    fn test_global_index_serializes_as_number() {
        let json = serde_json::to_string(&GlobalIndex::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_run_kind_round_trip() {
        assert_eq!("batch".parse::<RunKind>().unwrap(), RunKind::Batch);
        assert_eq!(RunKind::Thumbnails.as_str(), "thumbnails");
        assert!("other".parse::<RunKind>().is_err());
    }
}
