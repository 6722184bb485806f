//! Desktop application catalog.

use crate::desktop_entry::{DesktopApp, parse_desktop_file};
use crate::icons::IconTheme;
use crate::paths::{
    IconCache, application_directories, default_icon_cache_path, icon_base_directories,
    load_icon_cache, save_icon_cache,
};
use log::{debug, info};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// A launchable application as the home screen sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchableApp {
    /// Desktop file id.
    pub desktop_id: String,
    /// `Exec` line; `None` if the entry has none.
    pub exec: Option<String>,
    pub label: Option<String>,
    pub icon: Option<PathBuf>,
}

/// Scans .desktop files and resolves their icons.
pub struct AppCatalog {
    app_dirs: Vec<PathBuf>,
    locale: Option<String>,
    icon_theme: IconTheme,
    icon_cache: RwLock<IconCache>,
    icon_cache_path: Option<PathBuf>,
    icons_indexed: RwLock<bool>,
}

impl AppCatalog {
    /// Catalog over the standard XDG, Flatpak and Snap locations.
    pub fn new(locale: Option<String>) -> Self {
        Self::with_directories(
            application_directories(),
            icon_base_directories(),
            default_icon_cache_path(),
            locale,
        )
    }

    pub fn with_directories(
        app_dirs: Vec<PathBuf>,
        icon_dirs: Vec<PathBuf>,
        icon_cache_path: Option<PathBuf>,
        locale: Option<String>,
    ) -> Self {
        let icon_cache = icon_cache_path
            .as_deref()
            .and_then(load_icon_cache)
            .unwrap_or_default();

        Self {
            app_dirs,
            locale,
            icon_theme: IconTheme::new(icon_dirs),
            icon_cache: RwLock::new(icon_cache),
            icon_cache_path,
            icons_indexed: RwLock::new(false),
        }
    }

    /// Directories scanned for .desktop files, in precedence order.
    pub fn application_dirs(&self) -> &[PathBuf] {
        &self.app_dirs
    }

    /// All parsed `Type=Application` entries. For a desktop id present in
    /// several directories the first directory wins.
    pub fn desktop_apps(&self) -> Vec<DesktopApp> {
        let mut seen: HashMap<String, DesktopApp> = HashMap::new();
        let mut order = Vec::new();

        for dir in self.app_dirs.iter().filter(|d| d.exists()) {
            let walker = walkdir::WalkDir::new(dir).follow_links(true).max_depth(3);
            for entry in walker.into_iter().filter_map(|e| e.ok()) {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("desktop") {
                    continue;
                }
                let Some(app) = parse_desktop_file(path) else {
                    continue;
                };
                if !seen.contains_key(&app.id) {
                    order.push(app.id.clone());
                    seen.insert(app.id.clone(), app);
                }
            }
        }

        order.into_iter().filter_map(|id| seen.remove(&id)).collect()
    }

    /// Every entry that should appear in the launcher.
    pub fn launchable_apps(&self) -> Vec<LaunchableApp> {
        info!("Scanning desktop entries...");
        let apps: Vec<LaunchableApp> = self
            .desktop_apps()
            .into_iter()
            .filter(DesktopApp::is_launchable)
            .map(|app| LaunchableApp {
                icon: app
                    .icon_name
                    .as_deref()
                    .and_then(|name| self.resolve_icon(name)),
                label: app.label(self.locale.as_deref()).map(String::from),
                exec: app.exec,
                desktop_id: app.id,
            })
            .collect();

        self.persist_icon_cache();
        info!("Found {} launchable apps", apps.len());
        apps
    }

    /// Resolve an icon path by name, consulting the lookup cache first.
    pub fn resolve_icon(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        let key = name.to_lowercase();
        if let Some(cached) = self
            .icon_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            // A cached path may have been uninstalled since.
            if cached.as_ref().is_none_or(|p| p.exists()) {
                return cached.clone();
            }
        }

        self.ensure_icon_index();
        let result = self.icon_theme.resolve(name);
        self.icon_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, result.clone());
        result
    }

    /// Forget cached icon lookups and rebuild the theme index on next use.
    pub fn invalidate_icons(&self) {
        self.icon_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        *self
            .icons_indexed
            .write()
            .unwrap_or_else(PoisonError::into_inner) = false;
    }

    fn ensure_icon_index(&self) {
        let mut indexed = self
            .icons_indexed
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !*indexed {
            self.icon_theme.build_index();
            *indexed = true;
        }
    }

    fn persist_icon_cache(&self) {
        let Some(path) = &self.icon_cache_path else {
            return;
        };
        let cache = self.icon_cache.read().unwrap_or_else(PoisonError::into_inner);
        debug!("Persisting {} icon lookups", cache.len());
        save_icon_cache(path, &cache);
    }
}
