//! Intrinsic item positions
//!
//! Every list item carries an identifier of the form
//! `<item_prefix><section>_<offset>` (for example `gallerySelector3_17`).
//! The section increases as the list is traversed and the offset restarts
//! near 1 inside each section. Offsets are only contiguous within a section.

use crate::domain::{ExporterError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(section, offset)` pair decoded from an item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntrinsicPosition {
    /// Section number, monotonically increasing through the list
    pub section: u32,
    /// 1-based offset inside the section
    pub offset: u32,
}

impl IntrinsicPosition {
    /// Creates a new position
    pub const fn new(section: u32, offset: u32) -> Self {
        Self { section, offset }
    }
}

impl fmt::Display for IntrinsicPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.section, self.offset)
    }
}

/// Naming convention linking list items to their identifiers and controls
///
/// The per-item select control is reached by swapping the item prefix for the
/// select prefix, so `gallerySelector3_17` selects through
/// `gallerySelectorCircle3_17`.
///
/// # Examples
///
/// ```
/// use gallery_export::domain::position::{IntrinsicPosition, ItemNaming};
///
/// let naming = ItemNaming::new("gallerySelector", "gallerySelectorCircle").unwrap();
/// assert_eq!(
///     naming.position_of("gallerySelector3_17"),
///     Some(IntrinsicPosition::new(3, 17))
/// );
/// assert_eq!(
///     naming.select_control_id("gallerySelector3_17").as_deref(),
///     Some("gallerySelectorCircle3_17")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ItemNaming {
    item_prefix: String,
    select_prefix: String,
    pattern: Regex,
}

impl ItemNaming {
    /// Builds the naming convention from the two identifier prefixes
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the item prefix is empty.
    pub fn new(item_prefix: impl Into<String>, select_prefix: impl Into<String>) -> Result<Self> {
        let item_prefix = item_prefix.into();
        let select_prefix = select_prefix.into();

        if item_prefix.is_empty() {
            return Err(ExporterError::Configuration(
                "list.item_id_prefix cannot be empty".to_string(),
            ));
        }

        let pattern = Regex::new(&format!(r"^{}(\d+)_(\d+)$", regex::escape(&item_prefix)))
            .map_err(|e| {
                ExporterError::Configuration(format!("Invalid item identifier pattern: {e}"))
            })?;

        Ok(Self {
            item_prefix,
            select_prefix,
            pattern,
        })
    }

    /// Decodes the intrinsic position from an item identifier
    ///
    /// Returns `None` for identifiers that don't follow the convention and for
    /// offset 0, which never appears on a settled list.
    pub fn position_of(&self, item_id: &str) -> Option<IntrinsicPosition> {
        let caps = self.pattern.captures(item_id)?;
        let section = caps[1].parse().ok()?;
        let offset: u32 = caps[2].parse().ok()?;
        if offset == 0 {
            return None;
        }
        Some(IntrinsicPosition::new(section, offset))
    }

    /// Formats the identifier of the item at `position`
    pub fn item_id(&self, position: IntrinsicPosition) -> String {
        format!("{}{}", self.item_prefix, position)
    }

    /// Derives the select control identifier from an item identifier
    pub fn select_control_id(&self, item_id: &str) -> Option<String> {
        item_id
            .strip_prefix(&self.item_prefix)
            .map(|rest| format!("{}{}", self.select_prefix, rest))
    }

    /// Decodes the position from a select control identifier
    pub fn position_of_select_control(&self, control_id: &str) -> Option<IntrinsicPosition> {
        let rest = control_id.strip_prefix(&self.select_prefix)?;
        self.position_of(&format!("{}{}", self.item_prefix, rest))
    }

    /// The item identifier prefix
    pub fn item_prefix(&self) -> &str {
        &self.item_prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn naming() -> ItemNaming {
        ItemNaming::new("gallerySelector", "gallerySelectorCircle").unwrap()
    }

    #[test_case("gallerySelector1_1", Some((1, 1)) ; "first item")]
    #[test_case("gallerySelector12_340", Some((12, 340)) ; "multi digit")]
    #[test_case("gallerySelectorCircle1_1", None ; "select control is not an item")]
    #[test_case("gallerySelector1_0", None ; "zero offset")]
    #[test_case("gallerySelector1", None ; "missing offset")]
    #[test_case("", None ; "empty identifier")]
    #[test_case("xgallerySelector1_2", None ; "anchored at start")]
    fn test_position_of(id: &str, expected: Option<(u32, u32)>) {
        let expected = expected.map(|(s, o)| IntrinsicPosition::new(s, o));
        assert_eq!(naming().position_of(id), expected);
    }

    #[test]
    fn test_select_control_round_trip() {
        let naming = naming();
        let control = naming.select_control_id("gallerySelector4_9").unwrap();
        assert_eq!(control, "gallerySelectorCircle4_9");
        assert_eq!(
            naming.position_of_select_control(&control),
            Some(IntrinsicPosition::new(4, 9))
        );
        assert!(naming.select_control_id("somethingElse4_9").is_none());
    }

    #[test]
    fn test_item_id_formatting() {
        assert_eq!(
            naming().item_id(IntrinsicPosition::new(2, 5)),
            "gallerySelector2_5"
        );
    }

    #[test]
    fn test_prefix_is_escaped() {
        let naming = ItemNaming::new("item.", "sel.").unwrap();
        assert!(naming.position_of("itemX1_1").is_none());
        assert_eq!(
            naming.position_of("item.1_1"),
            Some(IntrinsicPosition::new(1, 1))
        );
    }

    #[test]
    fn test_empty_prefix_rejected() {
        assert!(ItemNaming::new("", "sel").is_err());
    }
}
