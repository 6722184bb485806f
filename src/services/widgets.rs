//! Widget host for desktops without embeddable widgets.

use capy_home::{ViewHandle, WidgetHost};
use log::debug;

/// Knows no widget ids: every view request fails, so a persisted widget
/// is cleared on load.
pub struct NoWidgetHost;

impl WidgetHost for NoWidgetHost {
    fn create_view(&self, widget_id: i32) -> Option<ViewHandle> {
        debug!("No widget host available for widget {}", widget_id);
        None
    }

    fn delete_id(&self, widget_id: i32) {
        debug!("Released widget {}", widget_id);
    }
}
