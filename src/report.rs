//! Logging of published home screen state.

use capy_home::{ContainerHeight, HomeEvent, HomeSnapshot, IconHandle, NO_WIDGET};
use log::{info, warn};
use tokio::sync::broadcast::{self, error::RecvError};

/// One log line per event.
pub fn describe_event(event: &HomeEvent) -> String {
    match event {
        HomeEvent::CatalogCleared => "catalog cleared, rescanning".to_string(),
        HomeEvent::CatalogPublished(entries) => format!("catalog published: {} apps", entries.len()),
        HomeEvent::DockSlotChanged(change) => match &change.entry {
            Some(entry) => format!("dock slot {}: {} ({})", change.slot, entry.label, entry.id),
            None => format!("dock slot {}: empty", change.slot),
        },
        HomeEvent::FillersChanged(fillers) => {
            format!("fillers: top {} bottom {}", fillers.top, fillers.bottom)
        }
        HomeEvent::WidgetChanged { widget_id, view } => match view {
            Some(view) => format!("widget {} shown as view {}", widget_id, view.0),
            None if *widget_id == NO_WIDGET => "no widget".to_string(),
            None => format!("widget {} has no view", widget_id),
        },
        HomeEvent::UsageChanged { app, action } => format!("{:?}: {}", action, app),
        HomeEvent::RefreshSuperseded { generation } => {
            format!("refresh {} superseded", generation)
        }
    }
}

/// Multi-line status report for the `status` command.
pub fn describe_snapshot(snapshot: &HomeSnapshot) -> Vec<String> {
    let mut lines = Vec::new();

    let state = if snapshot.refreshing { " (refreshing)" } else { "" };
    lines.push(format!("catalog: {} apps{}", snapshot.catalog.len(), state));
    for entry in snapshot.catalog.iter() {
        let mut flags = String::new();
        if entry.sticky {
            flags.push_str(" [sticky]");
        }
        if entry.disabled {
            flags.push_str(" [disabled]");
        }
        let icon = match &entry.icon {
            IconHandle::Default => "default icon".to_string(),
            IconHandle::Path(path) => path.display().to_string(),
        };
        lines.push(format!("  {} ({}, {}){}", entry.label, entry.id, icon, flags));
    }

    for (slot, entry) in snapshot.dock.iter().enumerate() {
        let label = entry.as_ref().map_or("-", |e| e.label.as_str());
        lines.push(format!("dock {}: {}", slot, label));
    }

    let container = match snapshot.container {
        ContainerHeight::Undefined => "undefined".to_string(),
        ContainerHeight::Known(height) => height.to_string(),
    };
    lines.push(format!(
        "widget {} layout {} container {} fillers {}/{}",
        snapshot.widget_id,
        snapshot.layout,
        container,
        snapshot.fillers.top,
        snapshot.fillers.bottom
    ));

    lines
}

/// Log every published event until the coordinator goes away.
pub async fn log_events(mut events: broadcast::Receiver<HomeEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => info!("{}", describe_event(&event)),
            Err(RecvError::Lagged(skipped)) => warn!("Event log skipped {} events", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}
