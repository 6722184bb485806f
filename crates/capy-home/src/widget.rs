//! Embedded widget collaborator and the state tracked for it.

use crate::placement::{ContainerHeight, Fillers, WidgetLayoutSelector, compute_fillers};
use crate::store::NO_WIDGET;

/// Opaque handle to a host view created for a widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// Platform widget host.
///
/// Both calls may block; they only run on background workers.
pub trait WidgetHost: Send + Sync {
    /// Create the view for `widget_id`, or `None` if the id no longer
    /// resolves to a widget.
    fn create_view(&self, widget_id: i32) -> Option<ViewHandle>;

    /// Release `widget_id` at the host.
    fn delete_id(&self, widget_id: i32);
}

/// Active widget and its placement, owned by the coordinating task.
#[derive(Clone, Debug)]
pub(crate) struct WidgetState {
    pub widget_id: i32,
    pub view: Option<ViewHandle>,
    pub layout: WidgetLayoutSelector,
    pub container: ContainerHeight,
    pub fillers: Fillers,
    dock_height: i32,
}

impl WidgetState {
    pub fn new(dock_height: i32) -> Self {
        Self {
            widget_id: NO_WIDGET,
            view: None,
            layout: WidgetLayoutSelector::default(),
            container: ContainerHeight::default(),
            fillers: Fillers::default(),
            dock_height,
        }
    }

    /// Recompute the fillers. Returns the new value if it changed.
    pub fn relayout(&mut self) -> Option<Fillers> {
        let fillers = compute_fillers(self.layout, self.container, self.dock_height);
        if fillers == self.fillers {
            return None;
        }
        self.fillers = fillers;
        Some(fillers)
    }
}
