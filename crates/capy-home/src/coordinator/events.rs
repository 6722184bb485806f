//! Events published by the coordinator and the snapshot it answers with.

use crate::dock::SlotChange;
use crate::placement::{ContainerHeight, Fillers, WidgetLayoutSelector};
use crate::types::{AppId, ApplicationEntry};
use crate::widget::ViewHandle;
use std::sync::Arc;

/// Broadcast channel capacity.
/// Lagging receivers skip old events and should re-read a snapshot.
pub const CHANNEL_CAPACITY: usize = 64;

/// Which usage mutation was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsageAction {
    Opened,
    Reset,
    ToggledDisabled,
    ToggledSticky,
}

/// Changes to UI-bound state, in the order they were applied.
#[derive(Clone, Debug)]
pub enum HomeEvent {
    /// The application list was emptied ahead of a full scan.
    CatalogCleared,
    /// A full scan finished and its list is now shown.
    CatalogPublished(Arc<[ApplicationEntry]>),
    /// One dock slot visibly changed.
    DockSlotChanged(SlotChange),
    FillersChanged(Fillers),
    WidgetChanged {
        widget_id: i32,
        view: Option<ViewHandle>,
    },
    /// A usage mutation was persisted.
    UsageChanged { app: AppId, action: UsageAction },
    /// A full scan was superseded and its results were dropped.
    RefreshSuperseded { generation: u64 },
}

/// Copy of everything the coordinator currently shows.
#[derive(Clone, Debug)]
pub struct HomeSnapshot {
    pub catalog: Arc<[ApplicationEntry]>,
    pub dock: Vec<Option<ApplicationEntry>>,
    pub fillers: Fillers,
    pub widget_id: i32,
    pub widget_view: Option<ViewHandle>,
    pub layout: WidgetLayoutSelector,
    pub container: ContainerHeight,
    /// True while a full scan is running.
    pub refreshing: bool,
}
