//! Automation surface abstraction
//!
//! This module defines the trait a remote list surface must implement to be
//! driven by the exporter. Element references are opaque handles owned by the
//! surface; they can go stale when the surface re-renders.

use crate::domain::Result;
use async_trait::async_trait;
use std::fmt;

/// Opaque reference to an element on the surface
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    /// Wraps a surface-specific element reference
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The surface-specific reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an element is brought into view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Animated scroll that aligns the element; triggers lazy loading below it
    Smooth,
    /// Scroll only when the element is outside the viewport
    IfNeeded,
}

/// Automation surface trait
///
/// All operations are issued sequentially by a single task. Implementations
/// map their native failures onto [`crate::domain::SurfaceError`].
#[async_trait]
pub trait AutomationSurface: Send + Sync {
    /// Load a URL, resetting the list to its initial state
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Find every element matching a structural query, in presentation order
    async fn find_all(&self, query: &str) -> Result<Vec<ElementHandle>>;

    /// Find elements matching a query relative to `parent`
    async fn find_within(&self, parent: &ElementHandle, query: &str)
        -> Result<Vec<ElementHandle>>;

    /// Find an element by identifier
    ///
    /// Returns `Ok(None)` when no such element is currently present.
    async fn find_by_id(&self, id: &str) -> Result<Option<ElementHandle>>;

    /// Read an attribute, `None` when the attribute is absent
    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    /// Visible text of an element
    async fn text(&self, element: &ElementHandle) -> Result<String>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool>;

    /// Whether the element accepts input
    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool>;

    /// Move the pointer over an element
    async fn hover(&self, element: &ElementHandle) -> Result<()>;

    /// Click an element
    async fn click(&self, element: &ElementHandle) -> Result<()>;

    /// Scroll an element into view
    async fn scroll_into_view(&self, element: &ElementHandle, behavior: ScrollBehavior)
        -> Result<()>;

    /// Detach an element from the surface
    async fn remove(&self, element: &ElementHandle) -> Result<()>;

    /// Ask the host to save `url` as a file named `file_name`
    async fn trigger_file_save(&self, file_name: &str, url: &str) -> Result<()>;

    /// Release the underlying session
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Human-readable description for logs
    fn describe(&self) -> String;
}
