//! Deterministic in-memory virtualized gallery
//!
//! Models the parts of the remote list the exporter depends on:
//! - items grouped in sections, identified as `<prefix><section>_<offset>`
//! - page-wise loading when the last materialized item is smooth-scrolled
//! - removal of items from the materialized window
//! - items the list itself unmounts, leaving holes in the materialized window
//! - per-item select controls, an export control and transient status
//!   messages that queue behind each other
//! - scripted export responses and injected transient failures
//!
//! Every interaction is recorded so tests can assert on it.

use crate::adapters::surface::{AutomationSurface, ElementHandle, ScrollBehavior};
use crate::config::{ListConfig, SimulatedConfig};
use crate::domain::{ExporterError, IntrinsicPosition, ItemNaming, Result, SurfaceError};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, VecDeque};
use tokio::sync::Mutex;

const THUMBNAIL_HOST: &str = "https://simulated.gallery/thumb";

/// Response of the surface to one export command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportResponse {
    /// Success message naming the selected count
    Confirm,
    /// Failure message naming the selected count
    Reject,
    /// A message with arbitrary text
    Message(String),
    /// No status message at all
    Silent,
}

/// Surface operation that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    FindAll,
    Hover,
    Click,
    Navigate,
    Remove,
    SaveFile,
    /// Thumbnail images stay unloaded
    ImageSource,
}

/// One export command as seen by the gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    /// Identifiers of the items selected when export was clicked
    pub selected: Vec<String>,
    /// Status message shown in response, if any
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Item(usize),
    SelectControl(usize),
    Thumbnail(usize),
    ExportControl,
    StatusMessage,
}

impl Node {
    fn handle(self) -> ElementHandle {
        match self {
            Node::Item(n) => ElementHandle::new(format!("item-{n}")),
            Node::SelectControl(n) => ElementHandle::new(format!("select-{n}")),
            Node::Thumbnail(n) => ElementHandle::new(format!("thumb-{n}")),
            Node::ExportControl => ElementHandle::new("export-control"),
            Node::StatusMessage => ElementHandle::new("status-message"),
        }
    }

    fn parse(handle: &ElementHandle) -> Option<Self> {
        let raw = handle.as_str();
        match raw {
            "export-control" => return Some(Node::ExportControl),
            "status-message" => return Some(Node::StatusMessage),
            _ => {}
        }
        let (kind, n) = raw.split_once('-')?;
        let n = n.parse().ok()?;
        match kind {
            "item" => Some(Node::Item(n)),
            "select" => Some(Node::SelectControl(n)),
            "thumb" => Some(Node::Thumbnail(n)),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Toast {
    text: String,
    remaining_checks: u32,
}

#[derive(Debug)]
struct GalleryState {
    positions: Vec<IntrinsicPosition>,
    loaded: usize,
    dom: Vec<usize>,
    selected: BTreeSet<usize>,
    toasts: VecDeque<Toast>,
    toast_checks: u32,
    script: VecDeque<ExportResponse>,
    failures: HashMap<FailurePoint, u32>,
    hovered: Vec<String>,
    exports: Vec<ExportRecord>,
    saved: Vec<(String, String)>,
    removed: usize,
    peak: usize,
    reloads: usize,
    navigations: Vec<String>,
}

impl GalleryState {
    fn fail(&mut self, point: FailurePoint, what: &str) -> Result<()> {
        if let Some(remaining) = self.failures.get_mut(&point) {
            if *remaining > 0 {
                *remaining -= 1;
                let error = match point {
                    FailurePoint::Click => SurfaceError::NotInteractable(what.to_string()),
                    FailurePoint::Navigate => SurfaceError::ConnectionFailed(what.to_string()),
                    _ => SurfaceError::StaleElement(what.to_string()),
                };
                return Err(error.into());
            }
        }
        Ok(())
    }

    fn is_injected(&self, point: FailurePoint) -> bool {
        self.failures.get(&point).is_some_and(|n| *n > 0)
    }

    fn in_dom(&self, n: usize) -> bool {
        self.dom.contains(&n)
    }

    fn require_in_dom(&self, n: usize, handle: &ElementHandle) -> Result<()> {
        if self.in_dom(n) {
            Ok(())
        } else {
            Err(SurfaceError::StaleElement(format!("{handle} is no longer attached")).into())
        }
    }

    fn load_more(&mut self, page_size: usize) {
        let end = (self.loaded + page_size).min(self.positions.len());
        self.dom.extend(self.loaded..end);
        self.loaded = end;
        self.peak = self.peak.max(self.dom.len());
    }

    fn reload(&mut self, page_size: usize) {
        self.loaded = 0;
        self.dom.clear();
        self.selected.clear();
        self.toasts.clear();
        self.load_more(page_size);
    }
}

/// Simulated virtualized gallery
///
/// # Example
///
/// ```
/// use gallery_export::adapters::memory::SimulatedGallery;
/// use gallery_export::adapters::surface::AutomationSurface;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> gallery_export::domain::Result<()> {
/// let gallery = SimulatedGallery::new(vec![30, 20], 10)?;
/// let items = gallery.find_all("//div[@role='listitem']").await?;
/// assert_eq!(items.len(), 10);
/// # Ok(())
/// # }
/// ```
pub struct SimulatedGallery {
    state: Mutex<GalleryState>,
    page_size: usize,
    naming: ItemNaming,
    list: ListConfig,
}

impl SimulatedGallery {
    /// Gallery with the given section sizes and the default list conventions
    pub fn new(sections: Vec<u32>, page_size: usize) -> Result<Self> {
        Self::with_list(sections, page_size, ListConfig::default())
    }

    /// Gallery shaped by configuration
    pub fn from_config(simulated: &SimulatedConfig, list: &ListConfig) -> Result<Self> {
        Self::with_list(simulated.sections.clone(), simulated.page_size, list.clone())
    }

    fn with_list(sections: Vec<u32>, page_size: usize, list: ListConfig) -> Result<Self> {
        if page_size == 0 {
            return Err(ExporterError::Configuration(
                "simulated.page_size must be > 0".to_string(),
            ));
        }

        let positions = sections
            .iter()
            .enumerate()
            .flat_map(|(i, count)| {
                let section = u32::try_from(i + 1).unwrap_or(u32::MAX);
                (1..=*count).map(move |offset| IntrinsicPosition::new(section, offset))
            })
            .collect();

        let mut state = GalleryState {
            positions,
            loaded: 0,
            dom: Vec::new(),
            selected: BTreeSet::new(),
            toasts: VecDeque::new(),
            toast_checks: 2,
            script: VecDeque::new(),
            failures: HashMap::new(),
            hovered: Vec::new(),
            exports: Vec::new(),
            saved: Vec::new(),
            removed: 0,
            peak: 0,
            reloads: 0,
            navigations: Vec::new(),
        };
        state.load_more(page_size);

        Ok(Self {
            state: Mutex::new(state),
            page_size,
            naming: list.naming()?,
            list,
        })
    }

    /// Queue responses for upcoming export commands
    ///
    /// Once the queue is empty every export is confirmed.
    pub async fn script_exports(&self, responses: impl IntoIterator<Item = ExportResponse>) {
        self.state.lock().await.script.extend(responses);
    }

    /// Make the next `times` calls of an operation fail
    pub async fn inject_failure(&self, point: FailurePoint, times: u32) {
        *self.state.lock().await.failures.entry(point).or_insert(0) += times;
    }

    /// Number of visibility checks a status message survives before fading
    pub async fn set_status_visibility(&self, checks: u32) {
        self.state.lock().await.toast_checks = checks.max(1);
    }

    /// Total number of items in the gallery
    pub async fn total_items(&self) -> usize {
        self.state.lock().await.positions.len()
    }

    /// Number of currently materialized items
    pub async fn materialized_len(&self) -> usize {
        self.state.lock().await.dom.len()
    }

    /// Largest number of items materialized at once
    pub async fn peak_materialized(&self) -> usize {
        self.state.lock().await.peak
    }

    /// Drop the item at a global index from the window the way the list's
    /// own virtualization does: no eviction is recorded for it
    pub async fn unmount(&self, index: usize) {
        self.state.lock().await.dom.retain(|n| *n != index);
    }

    /// Identifier of the item at a global index
    pub async fn item_id_at(&self, index: usize) -> Option<String> {
        let state = self.state.lock().await;
        state.positions.get(index).map(|p| self.naming.item_id(*p))
    }

    /// Identifiers of every hovered item, in order
    pub async fn hovered(&self) -> Vec<String> {
        self.state.lock().await.hovered.clone()
    }

    /// Every export command issued
    pub async fn exports(&self) -> Vec<ExportRecord> {
        self.state.lock().await.exports.clone()
    }

    /// Every file save as `(file_name, url)`
    pub async fn saved_files(&self) -> Vec<(String, String)> {
        self.state.lock().await.saved.clone()
    }

    /// Number of items removed from the window
    pub async fn removed_count(&self) -> usize {
        self.state.lock().await.removed
    }

    /// Number of navigations (each one reloads the list)
    pub async fn reload_count(&self) -> usize {
        self.state.lock().await.reloads
    }

    /// Every navigated URL
    pub async fn navigations(&self) -> Vec<String> {
        self.state.lock().await.navigations.clone()
    }

    /// Thumbnail URL of the item at a global index
    pub fn thumbnail_url(index: usize) -> String {
        format!("{THUMBNAIL_HOST}/{index}.jpg")
    }
}

#[async_trait]
impl AutomationSurface for SimulatedGallery {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.fail(FailurePoint::Navigate, "navigate")?;
        state.navigations.push(url.to_string());
        state.reloads += 1;
        state.reload(self.page_size);
        Ok(())
    }

    async fn find_all(&self, query: &str) -> Result<Vec<ElementHandle>> {
        let mut state = self.state.lock().await;
        state.fail(FailurePoint::FindAll, "find_all")?;
        if query != self.list.item_query {
            return Err(SurfaceError::CommandFailed {
                command: "find_all".to_string(),
                message: format!("unsupported query {query}"),
            }
            .into());
        }
        Ok(state.dom.iter().map(|n| Node::Item(*n).handle()).collect())
    }

    async fn find_within(
        &self,
        parent: &ElementHandle,
        query: &str,
    ) -> Result<Vec<ElementHandle>> {
        let state = self.state.lock().await;
        let Some(Node::Item(n)) = Node::parse(parent) else {
            return Ok(Vec::new());
        };
        state.require_in_dom(n, parent)?;
        if query != self.list.thumbnail_query || state.is_injected(FailurePoint::ImageSource) {
            return Ok(Vec::new());
        }
        Ok(vec![Node::Thumbnail(n).handle()])
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ElementHandle>> {
        let state = self.state.lock().await;

        if id == self.list.export_control_id {
            return Ok((!state.selected.is_empty()).then(|| Node::ExportControl.handle()));
        }

        if id == self.list.status_message_id {
            return Ok((!state.toasts.is_empty()).then(|| Node::StatusMessage.handle()));
        }

        let (position, make): (Option<IntrinsicPosition>, fn(usize) -> Node) =
            match self.naming.position_of_select_control(id) {
                Some(p) => (Some(p), Node::SelectControl),
                None => (self.naming.position_of(id), Node::Item),
            };

        let Some(position) = position else {
            return Ok(None);
        };
        let found = state
            .positions
            .iter()
            .position(|p| *p == position)
            .filter(|n| state.in_dom(*n));

        Ok(found.map(|n| make(n).handle()))
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let state = self.state.lock().await;
        match Node::parse(element) {
            Some(Node::Item(n)) => {
                state.require_in_dom(n, element)?;
                Ok((name == "id").then(|| self.naming.item_id(state.positions[n])))
            }
            Some(Node::SelectControl(n)) => {
                state.require_in_dom(n, element)?;
                Ok((name == "id")
                    .then(|| self.naming.item_id(state.positions[n]))
                    .and_then(|id| self.naming.select_control_id(&id)))
            }
            Some(Node::Thumbnail(n)) => {
                state.require_in_dom(n, element)?;
                Ok((name == "src").then(|| Self::thumbnail_url(n)))
            }
            Some(Node::ExportControl) => {
                Ok((name == "id").then(|| self.list.export_control_id.clone()))
            }
            Some(Node::StatusMessage) => {
                Ok((name == "id").then(|| self.list.status_message_id.clone()))
            }
            None => Err(SurfaceError::ElementNotFound(element.to_string()).into()),
        }
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let state = self.state.lock().await;
        match Node::parse(element) {
            Some(Node::StatusMessage) => match state.toasts.front() {
                Some(toast) => Ok(toast.text.clone()),
                None => Err(SurfaceError::StaleElement("status message faded".to_string()).into()),
            },
            Some(Node::ExportControl) => Ok("Download".to_string()),
            _ => Ok(String::new()),
        }
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool> {
        let mut state = self.state.lock().await;
        match Node::parse(element) {
            Some(Node::Item(n)) | Some(Node::SelectControl(n)) | Some(Node::Thumbnail(n)) => {
                Ok(state.in_dom(n))
            }
            Some(Node::ExportControl) => Ok(!state.selected.is_empty()),
            Some(Node::StatusMessage) => {
                let Some(toast) = state.toasts.front_mut() else {
                    return Ok(false);
                };
                toast.remaining_checks = toast.remaining_checks.saturating_sub(1);
                if toast.remaining_checks == 0 {
                    state.toasts.pop_front();
                }
                Ok(true)
            }
            None => Err(SurfaceError::ElementNotFound(element.to_string()).into()),
        }
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool> {
        let state = self.state.lock().await;
        match Node::parse(element) {
            Some(Node::ExportControl) => Ok(!state.selected.is_empty()),
            Some(Node::Item(n)) | Some(Node::SelectControl(n)) => Ok(state.in_dom(n)),
            Some(_) => Ok(true),
            None => Err(SurfaceError::ElementNotFound(element.to_string()).into()),
        }
    }

    async fn hover(&self, element: &ElementHandle) -> Result<()> {
        let mut state = self.state.lock().await;
        state.fail(FailurePoint::Hover, "hover")?;
        if let Some(Node::Item(n)) = Node::parse(element) {
            state.require_in_dom(n, element)?;
            let id = self.naming.item_id(state.positions[n]);
            state.hovered.push(id);
        }
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        let mut state = self.state.lock().await;
        match Node::parse(element) {
            Some(Node::SelectControl(n)) => {
                state.fail(FailurePoint::Click, "click select control")?;
                state.require_in_dom(n, element)?;
                if !state.selected.remove(&n) {
                    state.selected.insert(n);
                }
                Ok(())
            }
            Some(Node::ExportControl) => {
                state.fail(FailurePoint::Click, "click export control")?;
                if state.selected.is_empty() {
                    return Err(SurfaceError::NotInteractable(
                        "export control is hidden without a selection".to_string(),
                    )
                    .into());
                }

                let count = state.selected.len();
                let selected: Vec<String> = state
                    .selected
                    .iter()
                    .map(|n| self.naming.item_id(state.positions[*n]))
                    .collect();

                let response = state.script.pop_front().unwrap_or(ExportResponse::Confirm);
                let message = match &response {
                    ExportResponse::Confirm => Some(format!("{count} items downloaded")),
                    ExportResponse::Reject => {
                        Some(format!("{count} items could not be downloaded"))
                    }
                    ExportResponse::Message(text) => Some(text.clone()),
                    ExportResponse::Silent => None,
                };

                if response == ExportResponse::Confirm {
                    state.selected.clear();
                }

                // A new message shows once the ones before it have faded
                let checks = state.toast_checks;
                if let Some(text) = message.clone() {
                    state.toasts.push_back(Toast {
                        text,
                        remaining_checks: checks,
                    });
                }
                state.exports.push(ExportRecord { selected, message });
                Ok(())
            }
            Some(Node::Item(n)) | Some(Node::Thumbnail(n)) => state.require_in_dom(n, element),
            Some(Node::StatusMessage) => Ok(()),
            None => Err(SurfaceError::ElementNotFound(element.to_string()).into()),
        }
    }

    async fn scroll_into_view(
        &self,
        element: &ElementHandle,
        behavior: ScrollBehavior,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let Some(Node::Item(n)) = Node::parse(element) else {
            return Ok(());
        };
        state.require_in_dom(n, element)?;
        if behavior == ScrollBehavior::Smooth && n + 1 == state.loaded {
            state.load_more(self.page_size);
        }
        Ok(())
    }

    async fn remove(&self, element: &ElementHandle) -> Result<()> {
        let mut state = self.state.lock().await;
        state.fail(FailurePoint::Remove, "remove")?;
        let Some(Node::Item(n)) = Node::parse(element) else {
            return Err(SurfaceError::CommandFailed {
                command: "remove".to_string(),
                message: format!("{element} cannot be removed"),
            }
            .into());
        };
        state.require_in_dom(n, element)?;
        state.dom.retain(|m| *m != n);
        state.selected.remove(&n);
        state.removed += 1;
        Ok(())
    }

    async fn trigger_file_save(&self, file_name: &str, url: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.fail(FailurePoint::SaveFile, "trigger_file_save")?;
        state.saved.push((file_name.to_string(), url.to_string()));
        Ok(())
    }

    fn describe(&self) -> String {
        format!("simulated gallery (page size {})", self.page_size)
    }
}
