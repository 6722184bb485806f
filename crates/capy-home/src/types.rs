//! Core data types shared by the scanner, ranking model and coordinator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// Identity of a launchable application: the (package, component) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppId {
    /// Package identifier (e.g. "firefox.desktop").
    pub package: String,
    /// Component identifier within the package (e.g. the launch command).
    pub component: String,
}

impl AppId {
    pub fn new(package: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            component: component.into(),
        }
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.component)
    }
}

/// Opaque reference to an application icon.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum IconHandle {
    /// The launcher's own icon, used whenever the platform has none.
    #[default]
    Default,
    /// Icon file resolved by the package lister.
    Path(PathBuf),
}

/// One entry of the application catalog.
///
/// Equality and hashing only consider the [`AppId`]. Use
/// [`ApplicationEntry::same_presentation`] to also compare the label.
#[derive(Clone, Debug)]
pub struct ApplicationEntry {
    pub id: AppId,
    pub label: String,
    pub icon: IconHandle,
    /// Excluded from the dock ranking.
    pub disabled: bool,
    /// Pinned into the dock regardless of usage.
    pub sticky: bool,
}

impl ApplicationEntry {
    /// True if both entries would render identically in a dock slot.
    pub fn same_presentation(&self, other: &ApplicationEntry) -> bool {
        self.id == other.id && self.label == other.label
    }
}

impl PartialEq for ApplicationEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ApplicationEntry {}

impl Hash for ApplicationEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Persisted usage counter and dock flags for one application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub usage_count: u64,
    /// Recency stamp of the last open; higher is more recent, 0 is never.
    #[serde(default)]
    pub last_used: u64,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub sticky: bool,
}

/// Raw component as reported by the package lister.
///
/// Any field may be missing; the scanner decides what to drop and what to
/// default.
#[derive(Clone, Debug, Default)]
pub struct LaunchableComponent {
    pub package: Option<String>,
    pub component: Option<String>,
    pub label: Option<String>,
    pub icon: Option<PathBuf>,
}
