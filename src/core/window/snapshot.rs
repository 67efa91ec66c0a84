//! Window snapshot reader
//!
//! Reads the currently materialized list items in presentation order.

use crate::adapters::surface::{AutomationSurface, ElementHandle};
use crate::domain::{IntrinsicPosition, ItemNaming, Result};
use std::sync::Arc;

/// One materialized item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowItem {
    /// Surface handle of the item
    pub handle: ElementHandle,
    /// Identifier, absent while the surface is mid-update
    pub id: Option<String>,
    /// Position decoded from the identifier
    pub position: Option<IntrinsicPosition>,
}

/// The materialized items at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSnapshot {
    items: Vec<WindowItem>,
}

impl WindowSnapshot {
    pub fn new(items: Vec<WindowItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[WindowItem] {
        &self.items
    }

    pub fn get(&self, local: usize) -> Option<&WindowItem> {
        self.items.get(local)
    }

    pub fn last(&self) -> Option<&WindowItem> {
        self.items.last()
    }

    /// Items that carry a decoded position
    pub fn positioned(&self) -> impl Iterator<Item = (&WindowItem, IntrinsicPosition)> {
        self.items
            .iter()
            .filter_map(|item| item.position.map(|p| (item, p)))
    }
}

/// Reads [`WindowSnapshot`]s from the surface
#[derive(Clone)]
pub struct SnapshotReader {
    surface: Arc<dyn AutomationSurface>,
    item_query: String,
    naming: ItemNaming,
}

impl SnapshotReader {
    pub fn new(surface: Arc<dyn AutomationSurface>, item_query: impl Into<String>, naming: ItemNaming) -> Self {
        Self {
            surface,
            item_query: item_query.into(),
            naming,
        }
    }

    /// Handles of the materialized items, without reading identifiers
    pub async fn handles(&self) -> Result<Vec<ElementHandle>> {
        self.surface.find_all(&self.item_query).await
    }

    /// Full snapshot with decoded positions
    ///
    /// Items whose identifier is absent, unparseable, or stale while being
    /// read are kept as unpositioned.
    ///
    /// # Errors
    ///
    /// Returns an error if the item query itself fails, or if reading an
    /// identifier fails with a non-transient error.
    pub async fn snapshot(&self) -> Result<WindowSnapshot> {
        let handles = self.handles().await?;
        let mut items = Vec::with_capacity(handles.len());

        for handle in handles {
            let id = match self.surface.attribute(&handle, "id").await {
                Ok(id) => id,
                Err(e) if e.is_transient() => {
                    tracing::trace!(element = %handle, error = %e, "Item changed while reading");
                    None
                }
                Err(e) => return Err(e),
            };
            let position = id.as_deref().and_then(|id| self.naming.position_of(id));
            items.push(WindowItem {
                handle,
                id,
                position,
            });
        }

        Ok(WindowSnapshot::new(items))
    }

    /// The naming convention used to decode identifiers
    pub fn naming(&self) -> &ItemNaming {
        &self.naming
    }

    /// The surface this reader queries
    pub fn surface(&self) -> &Arc<dyn AutomationSurface> {
        &self.surface
    }
}
