//! Catalog scanner: builds a fresh, sorted application list from the
//! package lister.

use crate::collate::LabelCollator;
use crate::types::{AppId, ApplicationEntry, IconHandle, LaunchableComponent};
use crate::usage::UsageModel;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Platform collaborator listing every launchable component.
///
/// May block; only ever called from a background worker.
pub trait PackageLister: Send + Sync {
    fn list_launchable_components(&self) -> Vec<LaunchableComponent>;
}

/// A scan stopped at a safe point because a newer refresh was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("catalog scan cancelled")]
pub struct ScanCancelled;

/// Builds the application catalog.
pub struct CatalogScanner {
    lister: Arc<dyn PackageLister>,
    usage: Arc<UsageModel>,
    locale: Option<String>,
}

impl CatalogScanner {
    pub fn new(
        lister: Arc<dyn PackageLister>,
        usage: Arc<UsageModel>,
        locale: Option<String>,
    ) -> Self {
        Self {
            lister,
            usage,
            locale,
        }
    }

    /// Enumerate, resolve and sort every launchable application.
    ///
    /// `cancel` is checked before listing, before each entry and before
    /// returning. A cancelled scan yields no partial list.
    pub fn scan(&self, cancel: &CancellationToken) -> Result<Vec<ApplicationEntry>, ScanCancelled> {
        check(cancel)?;

        let components = self.lister.list_launchable_components();
        debug!("Package lister reported {} components", components.len());

        let mut seen = HashSet::with_capacity(components.len());
        let mut entries = Vec::with_capacity(components.len());

        for component in components {
            check(cancel)?;

            let Some(entry) = self.resolve(component) else {
                continue;
            };
            if seen.insert(entry.id.clone()) {
                entries.push(entry);
            } else {
                debug!("Skipping duplicate component {}", entry.id);
            }
        }

        let collator = LabelCollator::new(self.locale.as_deref());
        entries.sort_by(|a, b| {
            collator
                .compare(&a.label, &b.label)
                .then_with(|| a.id.cmp(&b.id))
        });

        check(cancel)?;
        info!("Catalog scan found {} applications", entries.len());
        Ok(entries)
    }

    fn resolve(&self, component: LaunchableComponent) -> Option<ApplicationEntry> {
        let LaunchableComponent {
            package,
            component,
            label,
            icon,
        } = component;

        let (Some(package), Some(component)) = (non_blank(package), non_blank(component)) else {
            debug!("Dropping launchable component without package or component id");
            return None;
        };

        let id = AppId::new(package, component);
        let record = self.usage.record(&id).unwrap_or_else(|e| {
            warn!("Failed to read usage flags for {}: {}", id, e);
            Default::default()
        });

        Some(ApplicationEntry {
            label: non_blank(label).unwrap_or_else(|| id.component.clone()),
            icon: icon.map(IconHandle::Path).unwrap_or_default(),
            disabled: record.disabled,
            sticky: record.sticky,
            id,
        })
    }
}

fn check(cancel: &CancellationToken) -> Result<(), ScanCancelled> {
    if cancel.is_cancelled() {
        Err(ScanCancelled)
    } else {
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStateStore;
    use std::path::PathBuf;

    struct FixedLister(Vec<LaunchableComponent>);

    impl PackageLister for FixedLister {
        fn list_launchable_components(&self) -> Vec<LaunchableComponent> {
            self.0.clone()
        }
    }

    fn component(package: &str, class: &str, label: Option<&str>) -> LaunchableComponent {
        LaunchableComponent {
            package: Some(package.to_string()),
            component: Some(class.to_string()),
            label: label.map(String::from),
            icon: None,
        }
    }

    fn scanner(components: Vec<LaunchableComponent>) -> (CatalogScanner, Arc<UsageModel>) {
        let usage = Arc::new(UsageModel::new(Arc::new(JsonStateStore::in_memory())));
        let scanner = CatalogScanner::new(
            Arc::new(FixedLister(components)),
            Arc::clone(&usage),
            Some("en-US".to_string()),
        );
        (scanner, usage)
    }

    #[test]
    fn test_sorted_by_collated_label() {
        let (scanner, _) = scanner(vec![
            component("c", "C", Some("calendar")),
            component("b", "B", Some("Browser")),
            component("a", "A", Some("alarm")),
        ]);

        let entries = scanner.scan(&CancellationToken::new()).unwrap();
        let labels: Vec<_> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["alarm", "Browser", "calendar"]);
    }

    #[test]
    fn test_unresolvable_components_are_dropped() {
        let (scanner, _) = scanner(vec![
            LaunchableComponent {
                package: None,
                component: Some("Orphan".to_string()),
                ..Default::default()
            },
            LaunchableComponent {
                package: Some("pkg".to_string()),
                component: None,
                ..Default::default()
            },
            component("", "Blank", Some("Blank")),
            component("ok", "Main", Some("Fine")),
        ]);

        let entries = scanner.scan(&CancellationToken::new()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, AppId::new("ok", "Main"));
    }

    #[test]
    fn test_missing_label_and_icon_use_defaults() {
        let mut with_icon = component("pkg.icon", "Iconic", Some("Iconic"));
        with_icon.icon = Some(PathBuf::from("/usr/share/icons/iconic.png"));
        let (scanner, _) = scanner(vec![
            component("pkg.nolabel", "org.NoLabel", None),
            component("pkg.blank", "org.Blank", Some("   ")),
            with_icon,
        ]);

        let entries = scanner.scan(&CancellationToken::new()).unwrap();
        let nolabel = entries.iter().find(|e| e.id.package == "pkg.nolabel").unwrap();
        assert_eq!(nolabel.label, "org.NoLabel");
        assert_eq!(nolabel.icon, IconHandle::Default);

        let blank = entries.iter().find(|e| e.id.package == "pkg.blank").unwrap();
        assert_eq!(blank.label, "org.Blank");

        let iconic = entries.iter().find(|e| e.id.package == "pkg.icon").unwrap();
        assert_eq!(
            iconic.icon,
            IconHandle::Path(PathBuf::from("/usr/share/icons/iconic.png"))
        );
    }

    #[test]
    fn test_duplicates_keep_first() {
        let (scanner, _) = scanner(vec![
            component("pkg", "Main", Some("First")),
            component("pkg", "Main", Some("Second")),
        ]);

        let entries = scanner.scan(&CancellationToken::new()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "First");
    }

    #[test]
    fn test_flags_come_from_usage_model() {
        let (scanner, usage) = scanner(vec![
            component("pinned", "Main", Some("Pinned")),
            component("hidden", "Main", Some("Hidden")),
        ]);
        usage.toggle_sticky(&AppId::new("pinned", "Main")).unwrap();
        usage.toggle_disabled(&AppId::new("hidden", "Main")).unwrap();

        let entries = scanner.scan(&CancellationToken::new()).unwrap();
        let hidden = &entries[0];
        let pinned = &entries[1];
        assert!(hidden.disabled && !hidden.sticky);
        assert!(pinned.sticky && !pinned.disabled);
    }

    #[test]
    fn test_empty_listing() {
        let (scanner, _) = scanner(Vec::new());
        assert!(scanner.scan(&CancellationToken::new()).unwrap().is_empty());
    }

    #[test]
    fn test_cancelled_scan_returns_nothing() {
        let (scanner, _) = scanner(vec![component("pkg", "Main", Some("App"))]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(scanner.scan(&cancel), Err(ScanCancelled));
    }
}
