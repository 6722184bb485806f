//! Package lister backed by the desktop application catalog.
//!
//! Wraps the capy-apps crate: the desktop file id is the package and the
//! `Exec` line is the component.

use capy_apps::{AppCatalog, AppWatcher, AppsError, LaunchableApp};
use capy_home::{CoordinatorHandle, LaunchableComponent, PackageLister};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

pub struct DesktopLister {
    catalog: Arc<AppCatalog>,
}

impl DesktopLister {
    pub fn new(catalog: Arc<AppCatalog>) -> Self {
        Self { catalog }
    }
}

impl PackageLister for DesktopLister {
    fn list_launchable_components(&self) -> Vec<LaunchableComponent> {
        self.catalog
            .launchable_apps()
            .into_iter()
            .map(to_component)
            .collect()
    }
}

fn to_component(app: LaunchableApp) -> LaunchableComponent {
    LaunchableComponent {
        package: Some(app.desktop_id),
        component: app.exec,
        label: app.label,
        icon: app.icon,
    }
}

/// Ask the coordinator for a rescan whenever the application directories
/// change. Keep the returned watcher alive.
pub fn watch_catalog(
    catalog: &Arc<AppCatalog>,
    debounce: Duration,
    coordinator: CoordinatorHandle,
) -> Result<AppWatcher, AppsError> {
    let icons = catalog.clone();
    capy_apps::watch_applications(catalog.application_dirs(), debounce, move || {
        entries_changed(&icons, &coordinator);
    })
}

/// Returns false if the coordinator is gone.
fn entries_changed(catalog: &AppCatalog, coordinator: &CoordinatorHandle) -> bool {
    debug!("Desktop entries changed, rescanning");
    // New packages may ship new icons.
    catalog.invalidate_icons();
    match coordinator.catalog_possibly_changed() {
        Ok(()) => true,
        Err(e) => {
            warn!("Dropping desktop entry change: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_desktop_entries_become_components() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("term.desktop"),
            "[Desktop Entry]\nType=Application\nName=Terminal\nExec=term\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("broken.desktop"),
            "[Desktop Entry]\nType=Application\nName=Broken\n",
        )
        .unwrap();

        let catalog = AppCatalog::with_directories(
            vec![dir.path().to_path_buf()],
            Vec::new(),
            None,
            None,
        );
        let lister = DesktopLister::new(Arc::new(catalog));
        let mut components = lister.list_launchable_components();
        components.sort_by(|a, b| a.package.cmp(&b.package));

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].package.as_deref(), Some("broken.desktop"));
        assert_eq!(components[0].component, None);
        assert_eq!(components[1].package.as_deref(), Some("term.desktop"));
        assert_eq!(components[1].component.as_deref(), Some("term"));
        assert_eq!(components[1].label.as_deref(), Some("Terminal"));
        assert_eq!(components[1].icon, None);
    }

    #[tokio::test]
    async fn test_change_after_shutdown_is_dropped() {
        let catalog = Arc::new(AppCatalog::with_directories(Vec::new(), Vec::new(), None, None));
        let store = Arc::new(capy_home::JsonStateStore::in_memory());
        let coordinator = capy_home::Coordinator::spawn(
            capy_home::HomeServices {
                lister: Arc::new(DesktopLister::new(catalog.clone())),
                usage_store: store.clone(),
                preferences: store,
                widget_host: Arc::new(crate::services::widgets::NoWidgetHost),
            },
            Default::default(),
        );
        assert!(entries_changed(&catalog, &coordinator));

        coordinator.shutdown().unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while coordinator.snapshot().await.is_ok() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert!(!entries_changed(&catalog, &coordinator));
    }
}
