//! Refresh coordinator.
//!
//! A single task owns the published catalog, the dock slots and the widget
//! state. Commands arrive over a channel, background workers report back
//! over another, and every change to UI-bound state is applied here and
//! broadcast as a [`HomeEvent`].
//!
//! Full refreshes are generation-tagged: requesting a new one cancels the
//! running scan and bumps the generation, so a stale scan can never be
//! published. Dock refreshes always run to completion, one after another,
//! so each ranking sees every mutation requested before it.

mod events;
mod workers;

pub use events::{CHANNEL_CAPACITY, HomeEvent, HomeSnapshot, UsageAction};

use crate::dock::DockSlots;
use crate::error::HomeError;
use crate::placement::{ContainerHeight, WidgetLayoutSelector};
use crate::scanner::{CatalogScanner, PackageLister};
use crate::store::{NO_WIDGET, PreferenceStore, UsageStore};
use crate::types::{AppId, ApplicationEntry};
use crate::usage::UsageModel;
use crate::widget::{ViewHandle, WidgetHost, WidgetState};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use workers::{Job, WorkerResult};

/// Default dock height, in the unit of the container height.
pub const DOCK_HEIGHT: i32 = 60;

/// Platform collaborators used by the coordinator.
#[derive(Clone)]
pub struct HomeServices {
    pub lister: Arc<dyn PackageLister>,
    pub usage_store: Arc<dyn UsageStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub widget_host: Arc<dyn WidgetHost>,
}

#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Locale for label collation; `None` uses the root order.
    pub locale: Option<String>,
    pub dock_height: i32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            locale: None,
            dock_height: DOCK_HEIGHT,
        }
    }
}

enum Command {
    Start,
    CatalogChanged,
    VisibilityRegained,
    Usage(AppId, UsageAction),
    SetContainerHeight(ContainerHeight),
    SetLayout(WidgetLayoutSelector),
    BindWidget(i32),
    RemoveWidget,
    Snapshot(oneshot::Sender<HomeSnapshot>),
    Shutdown,
}

/// Cloneable handle to a running coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<HomeEvent>,
}

impl CoordinatorHandle {
    /// Subscribe to published changes. Subscribe before [`Self::start`] to
    /// see the initial load.
    pub fn subscribe(&self) -> broadcast::Receiver<HomeEvent> {
        self.events.subscribe()
    }

    /// Restore the widget and run the first full refresh.
    pub fn start(&self) -> Result<(), HomeError> {
        self.send(Command::Start)
    }

    /// Installed apps or the locale may have changed: rescan everything.
    pub fn catalog_possibly_changed(&self) -> Result<(), HomeError> {
        self.send(Command::CatalogChanged)
    }

    /// The home screen is visible again: re-rank the dock.
    pub fn visibility_regained(&self) -> Result<(), HomeError> {
        self.send(Command::VisibilityRegained)
    }

    /// Count an app launch and re-rank the dock.
    pub fn open_app(&self, app: AppId) -> Result<(), HomeError> {
        self.send(Command::Usage(app, UsageAction::Opened))
    }

    pub fn reset_usage(&self, app: AppId) -> Result<(), HomeError> {
        self.send(Command::Usage(app, UsageAction::Reset))
    }

    pub fn toggle_disabled(&self, app: AppId) -> Result<(), HomeError> {
        self.send(Command::Usage(app, UsageAction::ToggledDisabled))
    }

    pub fn toggle_sticky(&self, app: AppId) -> Result<(), HomeError> {
        self.send(Command::Usage(app, UsageAction::ToggledSticky))
    }

    pub fn set_container_height(&self, height: ContainerHeight) -> Result<(), HomeError> {
        self.send(Command::SetContainerHeight(height))
    }

    pub fn set_layout(&self, layout: WidgetLayoutSelector) -> Result<(), HomeError> {
        self.send(Command::SetLayout(layout))
    }

    /// Show `widget_id`, replacing the current widget. Negative ids clear it.
    pub fn bind_widget(&self, widget_id: i32) -> Result<(), HomeError> {
        self.send(Command::BindWidget(widget_id))
    }

    /// Drop the widget and reset its layout to full screen.
    pub fn remove_widget(&self) -> Result<(), HomeError> {
        self.send(Command::RemoveWidget)
    }

    pub async fn snapshot(&self) -> Result<HomeSnapshot, HomeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| HomeError::CoordinatorClosed)
    }

    pub fn shutdown(&self) -> Result<(), HomeError> {
        self.send(Command::Shutdown)
    }

    fn send(&self, command: Command) -> Result<(), HomeError> {
        self.commands
            .send(command)
            .map_err(|_| HomeError::CoordinatorClosed)
    }
}

/// In-flight full refresh.
struct ActiveRefresh {
    generation: u64,
    cancel: CancellationToken,
}

/// State owned by the coordinating task.
pub struct Coordinator {
    services: HomeServices,
    config: CoordinatorConfig,
    usage: Arc<UsageModel>,
    scanner: Arc<CatalogScanner>,

    events: broadcast::Sender<HomeEvent>,
    results_tx: mpsc::UnboundedSender<WorkerResult>,
    /// Usage mutations and dock rankings, in request order.
    usage_queue: mpsc::UnboundedSender<Job>,
    /// Widget host calls and preference writes, in request order.
    widget_queue: mpsc::UnboundedSender<Job>,

    /// Published list, cleared while a full refresh runs.
    catalog: Arc<[ApplicationEntry]>,
    /// Last completed scan, the input of every dock ranking.
    ranking_source: Arc<[ApplicationEntry]>,
    dock: DockSlots,

    refresh: Option<ActiveRefresh>,
    generation: u64,

    widget: WidgetState,
    widget_seq: u64,
    layout_seq: u64,
}

impl Coordinator {
    /// Spawn the coordinating task on the current tokio runtime.
    pub fn spawn(services: HomeServices, config: CoordinatorConfig) -> CoordinatorHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let usage = Arc::new(UsageModel::new(Arc::clone(&services.usage_store)));
        let scanner = Arc::new(CatalogScanner::new(
            Arc::clone(&services.lister),
            Arc::clone(&usage),
            config.locale.clone(),
        ));
        let usage_queue = workers::spawn_serial_queue("usage", results_tx.clone());
        let widget_queue = workers::spawn_serial_queue("widget", results_tx.clone());

        let coordinator = Coordinator {
            widget: WidgetState::new(config.dock_height),
            services,
            config,
            usage,
            scanner,
            events: events.clone(),
            results_tx,
            usage_queue,
            widget_queue,
            catalog: Arc::from(Vec::new()),
            ranking_source: Arc::from(Vec::new()),
            dock: DockSlots::default(),
            refresh: None,
            generation: 0,
            widget_seq: 0,
            layout_seq: 0,
        };

        tokio::spawn(coordinator.run(commands_rx, results_rx));

        CoordinatorHandle {
            commands: commands_tx,
            events,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut results: mpsc::UnboundedReceiver<WorkerResult>,
    ) {
        info!("Home coordinator running");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(result) = results.recv() => self.handle_result(result),
            }
        }

        if let Some(active) = self.refresh.take() {
            active.cancel.cancel();
        }
        info!("Home coordinator stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => {
                self.load_widget();
                self.start_full_refresh();
            }
            Command::CatalogChanged => self.start_full_refresh(),
            Command::VisibilityRegained => self.start_dock_refresh(None),
            Command::Usage(app, action) => self.start_dock_refresh(Some((app, action))),
            Command::SetContainerHeight(height) => {
                self.widget.container = height;
                self.relayout();
            }
            Command::SetLayout(layout) => self.set_layout(layout),
            Command::BindWidget(widget_id) => self.bind_widget(widget_id),
            Command::RemoveWidget => {
                self.set_layout(WidgetLayoutSelector::FullScreen);
                self.bind_widget(NO_WIDGET);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn handle_result(&mut self, result: WorkerResult) {
        match result {
            WorkerResult::CatalogScanned {
                generation,
                outcome,
            } => {
                let current = self
                    .refresh
                    .as_ref()
                    .is_some_and(|a| a.generation == generation && !a.cancel.is_cancelled());

                match outcome {
                    Ok(entries) if current => {
                        self.refresh = None;
                        self.publish_catalog(entries);
                        self.start_dock_refresh(None);
                    }
                    _ => {
                        debug!("Dropping results of superseded refresh {}", generation);
                        self.emit(HomeEvent::RefreshSuperseded { generation });
                    }
                }
            }
            WorkerResult::DockRanked { applied, ranked } => {
                if let Some((app, action)) = applied {
                    self.emit(HomeEvent::UsageChanged { app, action });
                }
                if let Some(ranked) = ranked {
                    for change in self.dock.apply(&ranked) {
                        self.emit(HomeEvent::DockSlotChanged(change));
                    }
                }
            }
            WorkerResult::WidgetLoaded {
                widget_seq,
                layout_seq,
                widget_id,
                view,
                layout,
            } => {
                if layout_seq == self.layout_seq {
                    self.widget.layout = layout;
                    self.relayout();
                }
                if widget_seq == self.widget_seq {
                    self.set_widget(widget_id, view);
                }
            }
            WorkerResult::WidgetBound {
                seq,
                widget_id,
                view,
            } => {
                if seq == self.widget_seq {
                    self.set_widget(widget_id, view);
                }
            }
        }
    }

    fn start_full_refresh(&mut self) {
        if let Some(active) = self.refresh.take() {
            debug!("Cancelling running refresh {}", active.generation);
            active.cancel.cancel();
        }

        self.generation += 1;
        let cancel = CancellationToken::new();
        self.refresh = Some(ActiveRefresh {
            generation: self.generation,
            cancel: cancel.clone(),
        });

        // Show "loading" until the scan lands
        self.catalog = Arc::from(Vec::new());
        self.emit(HomeEvent::CatalogCleared);

        debug!("Starting full refresh {}", self.generation);
        workers::spawn_scan(
            Arc::clone(&self.scanner),
            self.generation,
            cancel,
            self.results_tx.clone(),
        );
    }

    fn publish_catalog(&mut self, entries: Vec<ApplicationEntry>) {
        let entries: Arc<[ApplicationEntry]> = Arc::from(entries);
        self.catalog = Arc::clone(&entries);
        self.ranking_source = Arc::clone(&entries);
        info!("Published {} applications", entries.len());
        self.emit(HomeEvent::CatalogPublished(entries));
    }

    fn start_dock_refresh(&mut self, mutation: Option<(AppId, UsageAction)>) {
        let job = workers::dock_rank_job(
            Arc::clone(&self.usage),
            Arc::clone(&self.ranking_source),
            self.config.locale.clone(),
            mutation,
        );
        enqueue(&self.usage_queue, job);
    }

    fn load_widget(&mut self) {
        self.widget_seq += 1;
        self.layout_seq += 1;
        let job = workers::load_widget_job(
            Arc::clone(&self.services.preferences),
            Arc::clone(&self.services.widget_host),
            self.widget_seq,
            self.layout_seq,
        );
        enqueue(&self.widget_queue, job);
    }

    fn bind_widget(&mut self, widget_id: i32) {
        self.widget_seq += 1;
        let shown = self.widget.widget_id;
        // The old view goes away right away; the new one arrives with the result
        self.widget.widget_id = widget_id.max(NO_WIDGET);
        self.widget.view = None;

        let job = workers::bind_widget_job(
            Arc::clone(&self.services.preferences),
            Arc::clone(&self.services.widget_host),
            self.widget_seq,
            shown,
            widget_id,
        );
        enqueue(&self.widget_queue, job);
    }

    fn set_layout(&mut self, layout: WidgetLayoutSelector) {
        self.layout_seq += 1;
        self.widget.layout = layout;
        self.relayout();
        let job = workers::persist_layout_job(Arc::clone(&self.services.preferences), layout);
        enqueue(&self.widget_queue, job);
    }

    fn set_widget(&mut self, widget_id: i32, view: Option<ViewHandle>) {
        self.widget.widget_id = widget_id;
        self.widget.view = view;
        self.emit(HomeEvent::WidgetChanged { widget_id, view });
    }

    fn relayout(&mut self) {
        if let Some(fillers) = self.widget.relayout() {
            self.emit(HomeEvent::FillersChanged(fillers));
        }
    }

    fn snapshot(&self) -> HomeSnapshot {
        HomeSnapshot {
            catalog: Arc::clone(&self.catalog),
            dock: self.dock.slots().to_vec(),
            fillers: self.widget.fillers,
            widget_id: self.widget.widget_id,
            widget_view: self.widget.view,
            layout: self.widget.layout,
            container: self.widget.container,
            refreshing: self.refresh.is_some(),
        }
    }

    fn emit(&self, event: HomeEvent) {
        // No subscribers is fine (e.g. during startup)
        let _ = self.events.send(event);
    }
}

fn enqueue(queue: &mpsc::UnboundedSender<Job>, job: Job) {
    if queue.send(job).is_err() {
        warn!("Worker queue is gone, dropping job");
    }
}
