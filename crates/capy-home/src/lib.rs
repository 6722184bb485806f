//! capy-home: state core of the CapyShell home screen.
//!
//! - Catalog scanning through a platform [`PackageLister`]
//! - Usage counters and the ranked dock selection
//! - Widget filler geometry from a layout selector
//! - A refresh coordinator that owns all UI-bound state and runs the
//!   blocking work on background workers
//!
//! Platform pieces (package listing, widget hosting) are collaborators
//! behind traits; the JSON state store is the default persistence.

pub mod collate;
pub mod coordinator;
pub mod dock;
pub mod error;
pub mod placement;
pub mod scanner;
pub mod store;
pub mod types;
pub mod usage;
pub mod widget;

pub use collate::{LabelCollator, locale_from_env, normalize_locale_tag};
pub use coordinator::{
    Coordinator, CoordinatorConfig, CoordinatorHandle, DOCK_HEIGHT, HomeEvent, HomeServices,
    HomeSnapshot, UsageAction,
};
pub use dock::{DOCK_CAPACITY, DockSlots, SlotChange};
pub use error::{HomeError, StoreError};
pub use placement::{
    ContainerHeight, Fillers, UnknownLayout, WidgetLayoutSelector, compute_fillers,
};
pub use scanner::{CatalogScanner, PackageLister, ScanCancelled};
pub use store::{JsonStateStore, NO_WIDGET, PreferenceStore, UsageStore};
pub use types::{AppId, ApplicationEntry, IconHandle, LaunchableComponent, UsageRecord};
pub use usage::UsageModel;
pub use widget::{ViewHandle, WidgetHost};
