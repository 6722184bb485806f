//! capy-apps: Desktop application catalog for Linux.
//!
//! - Launchable apps from .desktop files in XDG, Flatpak and Snap dirs
//! - Localized labels and icon lookup with theme inheritance
//! - Icon lookups cached to disk for fast startup
//! - Debounced watching of the application directories

mod catalog;
mod desktop_entry;
mod error;
mod icons;
mod paths;
mod watcher;

pub use catalog::{AppCatalog, LaunchableApp};
pub use desktop_entry::DesktopApp;
pub use error::AppsError;
pub use icons::IconTheme;
pub use paths::application_directories;
pub use watcher::{AppWatcher, watch_applications};
