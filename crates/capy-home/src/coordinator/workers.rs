//! Background units of work.
//!
//! Every worker gets its own inputs, performs the blocking collaborator calls
//! and reports back to the coordinating task through a [`WorkerResult`].
//! Workers never touch coordinator state.

use super::events::UsageAction;
use crate::collate::LabelCollator;
use crate::dock::DOCK_CAPACITY;
use crate::placement::WidgetLayoutSelector;
use crate::scanner::{CatalogScanner, ScanCancelled};
use crate::store::{NO_WIDGET, PreferenceStore};
use crate::types::{AppId, ApplicationEntry};
use crate::usage::UsageModel;
use crate::widget::{ViewHandle, WidgetHost};
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;

pub(super) enum WorkerResult {
    CatalogScanned {
        generation: u64,
        outcome: Result<Vec<ApplicationEntry>, ScanCancelled>,
    },
    DockRanked {
        /// Mutation that ran before ranking, if it was persisted.
        applied: Option<(AppId, UsageAction)>,
        /// `None` if the store could not be read.
        ranked: Option<Vec<ApplicationEntry>>,
    },
    WidgetLoaded {
        widget_seq: u64,
        layout_seq: u64,
        widget_id: i32,
        view: Option<ViewHandle>,
        layout: WidgetLayoutSelector,
    },
    WidgetBound {
        seq: u64,
        widget_id: i32,
        view: Option<ViewHandle>,
    },
}

/// A unit of work for the serial queue.
pub(super) type Job = Box<dyn FnOnce() -> Option<WorkerResult> + Send + 'static>;

/// Start a queue that runs jobs one after another on the blocking pool.
/// Results are reported in submission order.
pub(super) fn spawn_serial_queue(
    name: &'static str,
    results: UnboundedSender<WorkerResult>,
) -> UnboundedSender<Job> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            match tokio::task::spawn_blocking(job).await {
                Ok(Some(result)) => {
                    if results.send(result).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{} worker failed: {}", name, e),
            }
        }
        debug!("{} queue stopped", name);
    });

    tx
}

/// Run a full catalog scan on the blocking pool.
pub(super) fn spawn_scan(
    scanner: Arc<CatalogScanner>,
    generation: u64,
    cancel: CancellationToken,
    results: UnboundedSender<WorkerResult>,
) {
    tokio::task::spawn_blocking(move || {
        let outcome = scanner.scan(&cancel);
        let _ = results.send(WorkerResult::CatalogScanned {
            generation,
            outcome,
        });
    });
}

/// Apply an optional usage mutation, then re-rank the dock from the store.
///
/// The mutation is persisted before the ranking reads the store.
pub(super) fn dock_rank_job(
    usage: Arc<UsageModel>,
    source: Arc<[ApplicationEntry]>,
    locale: Option<String>,
    mutation: Option<(AppId, UsageAction)>,
) -> Job {
    Box::new(move || {
        let applied = mutation.and_then(|(app, action)| {
            let outcome = match action {
                UsageAction::Opened => usage.record_open(&app),
                UsageAction::Reset => usage.reset_usage(&app),
                UsageAction::ToggledDisabled => usage.toggle_disabled(&app),
                UsageAction::ToggledSticky => usage.toggle_sticky(&app),
            };
            match outcome {
                Ok(_) => Some((app, action)),
                Err(e) => {
                    warn!("Failed to persist {:?} for {}: {}", action, app, e);
                    None
                }
            }
        });

        let collator = LabelCollator::new(locale.as_deref());
        let ranked = match usage.most_used(&source, DOCK_CAPACITY, &collator) {
            Ok(ranked) => Some(ranked),
            Err(e) => {
                warn!("Failed to rank dock: {}", e);
                None
            }
        };

        Some(WorkerResult::DockRanked { applied, ranked })
    })
}

/// Read the persisted widget and layout and recreate the widget view.
pub(super) fn load_widget_job(
    preferences: Arc<dyn PreferenceStore>,
    host: Arc<dyn WidgetHost>,
    widget_seq: u64,
    layout_seq: u64,
) -> Job {
    Box::new(move || {
        let layout_code = preferences.layout_code().unwrap_or_else(|e| {
            warn!("Failed to read widget layout: {}", e);
            WidgetLayoutSelector::FullScreen.code()
        });
        let persisted = preferences.widget_id().unwrap_or_else(|e| {
            warn!("Failed to read widget id: {}", e);
            NO_WIDGET
        });

        let (widget_id, view) = attach(preferences.as_ref(), host.as_ref(), persisted);

        Some(WorkerResult::WidgetLoaded {
            widget_seq,
            layout_seq,
            widget_id,
            view,
            layout: WidgetLayoutSelector::from_code(layout_code),
        })
    })
}

/// Replace the active widget: release the one currently persisted, then
/// persist and attach `requested`.
///
/// The persisted id is read on the widget queue, after any earlier load.
/// `shown` is the fallback when the store cannot be read.
pub(super) fn bind_widget_job(
    preferences: Arc<dyn PreferenceStore>,
    host: Arc<dyn WidgetHost>,
    seq: u64,
    shown: i32,
    requested: i32,
) -> Job {
    Box::new(move || {
        let requested = requested.max(NO_WIDGET);
        let previous = preferences.widget_id().unwrap_or_else(|e| {
            warn!("Failed to read widget id: {}", e);
            shown
        });
        if previous > NO_WIDGET && previous != requested {
            host.delete_id(previous);
        }

        if let Err(e) = preferences.set_widget_id(requested) {
            warn!("Failed to persist widget id {}: {}", requested, e);
        }

        let (widget_id, view) = attach(preferences.as_ref(), host.as_ref(), requested);
        Some(WorkerResult::WidgetBound {
            seq,
            widget_id,
            view,
        })
    })
}

pub(super) fn persist_layout_job(
    preferences: Arc<dyn PreferenceStore>,
    layout: WidgetLayoutSelector,
) -> Job {
    Box::new(move || {
        if let Err(e) = preferences.set_layout_code(layout.code()) {
            warn!("Failed to persist widget layout {}: {}", layout, e);
        }
        None
    })
}

/// Create the view for `widget_id`. A stale id is cleared from the store.
fn attach(
    preferences: &dyn PreferenceStore,
    host: &dyn WidgetHost,
    widget_id: i32,
) -> (i32, Option<ViewHandle>) {
    if widget_id <= NO_WIDGET {
        return (NO_WIDGET, None);
    }

    match host.create_view(widget_id) {
        Some(view) => (widget_id, Some(view)),
        None => {
            warn!("Widget {} is no longer available, clearing it", widget_id);
            if let Err(e) = preferences.set_widget_id(NO_WIDGET) {
                warn!("Failed to clear widget id: {}", e);
            }
            (NO_WIDGET, None)
        }
    }
}
