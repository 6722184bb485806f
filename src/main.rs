//! CapyLauncher - Home screen daemon for CapyShell
//!
//! Keeps the application catalog, dock and widget placement up to date and
//! logs every change. Line commands on stdin drive it (see `commands`).

mod commands;
mod config;
mod report;
mod services;

use capy_apps::AppCatalog;
use capy_home::{Coordinator, CoordinatorConfig, CoordinatorHandle, HomeServices, JsonStateStore};
use commands::DaemonCommand;
use config::LauncherConfig;
use log::{error, info, warn};
use services::apps::{DesktopLister, watch_catalog};
use services::widgets::NoWidgetHost;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting CapyLauncher...");

    let config = LauncherConfig::default_path()
        .map(|path| LauncherConfig::load(&path))
        .unwrap_or_default();
    let locale = config.locale();
    info!("Locale: {}", locale.as_deref().unwrap_or("root"));

    let store = Arc::new(match config.state_path() {
        Some(path) => {
            info!("State file: {:?}", path);
            JsonStateStore::open(path)
        }
        None => {
            warn!("No data directory, launcher state will not persist");
            JsonStateStore::in_memory()
        }
    });

    let catalog = Arc::new(AppCatalog::new(locale.clone()));
    let services = HomeServices {
        lister: Arc::new(DesktopLister::new(catalog.clone())),
        usage_store: store.clone(),
        preferences: store,
        widget_host: Arc::new(NoWidgetHost),
    };

    let coordinator = Coordinator::spawn(
        services,
        CoordinatorConfig {
            locale,
            dock_height: config.dock_height,
        },
    );

    tokio::spawn(report::log_events(coordinator.subscribe()));
    coordinator.start()?;

    let _watcher = if config.watch_applications {
        match watch_catalog(&catalog, config.watch_debounce(), coordinator.clone()) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                warn!("Application directories will not be watched: {}", e);
                None
            }
        }
    } else {
        None
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match DaemonCommand::parse(&line) {
            Ok(Some(DaemonCommand::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(e) = dispatch(&coordinator, command).await {
                    error!("Coordinator stopped: {}", e);
                    return Err(e.into());
                }
            }
            Ok(None) => {}
            Err(e) => warn!("{}", e),
        }
    }

    info!("Shutting down CapyLauncher...");
    let _ = coordinator.shutdown();
    Ok(())
}

async fn dispatch(
    coordinator: &CoordinatorHandle,
    command: DaemonCommand,
) -> Result<(), capy_home::HomeError> {
    match command {
        DaemonCommand::Open(app) => coordinator.open_app(app),
        DaemonCommand::Reset(app) => coordinator.reset_usage(app),
        DaemonCommand::ToggleDisabled(app) => coordinator.toggle_disabled(app),
        DaemonCommand::ToggleSticky(app) => coordinator.toggle_sticky(app),
        DaemonCommand::Refresh => coordinator.catalog_possibly_changed(),
        DaemonCommand::Resume => coordinator.visibility_regained(),
        DaemonCommand::Height(height) => coordinator.set_container_height(height),
        DaemonCommand::Layout(layout) => coordinator.set_layout(layout),
        DaemonCommand::Widget(id) => coordinator.bind_widget(id),
        DaemonCommand::RemoveWidget => coordinator.remove_widget(),
        DaemonCommand::Status => {
            let snapshot = coordinator.snapshot().await?;
            for line in report::describe_snapshot(&snapshot) {
                println!("{}", line);
            }
            Ok(())
        }
        DaemonCommand::Quit => coordinator.shutdown(),
    }
}
