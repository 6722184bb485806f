//! Persisted launcher state: per-app usage records and widget preferences.

use crate::error::StoreError;
use crate::types::{AppId, UsageRecord};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Widget id meaning "no widget".
pub const NO_WIDGET: i32 = -1;

/// Durable per-app usage counters and dock flags.
///
/// `get` on an unknown id returns the zero record; records come into
/// existence on the first `put`.
pub trait UsageStore: Send + Sync {
    fn get(&self, id: &AppId) -> Result<UsageRecord, StoreError>;
    fn put(&self, id: &AppId, record: UsageRecord) -> Result<(), StoreError>;
    /// All records known to the store.
    fn records(&self) -> Result<Vec<(AppId, UsageRecord)>, StoreError>;
}

/// Durable home screen preferences.
pub trait PreferenceStore: Send + Sync {
    fn widget_id(&self) -> Result<i32, StoreError>;
    fn set_widget_id(&self, widget_id: i32) -> Result<(), StoreError>;
    fn layout_code(&self) -> Result<i32, StoreError>;
    fn set_layout_code(&self, code: i32) -> Result<(), StoreError>;
}

/// On-disk layout of the state file.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    #[serde(default = "no_widget")]
    active_widget_id: i32,
    #[serde(default = "full_screen_code")]
    active_layout_selector: i32,
    #[serde(default)]
    per_app: Vec<AppRecordFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AppRecordFile {
    package: String,
    component: String,
    #[serde(flatten)]
    record: UsageRecord,
}

fn no_widget() -> i32 {
    NO_WIDGET
}

fn full_screen_code() -> i32 {
    crate::placement::WidgetLayoutSelector::FullScreen.code()
}

#[derive(Clone, Debug)]
struct State {
    widget_id: i32,
    layout_code: i32,
    apps: HashMap<AppId, UsageRecord>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            widget_id: no_widget(),
            layout_code: full_screen_code(),
            apps: HashMap::new(),
        }
    }
}

impl From<StateFile> for State {
    fn from(file: StateFile) -> Self {
        Self {
            widget_id: file.active_widget_id,
            layout_code: file.active_layout_selector,
            apps: file
                .per_app
                .into_iter()
                .map(|entry| (AppId::new(entry.package, entry.component), entry.record))
                .collect(),
        }
    }
}

impl State {
    fn to_file(&self) -> StateFile {
        let mut per_app: Vec<AppRecordFile> = self
            .apps
            .iter()
            .map(|(id, record)| AppRecordFile {
                package: id.package.clone(),
                component: id.component.clone(),
                record: *record,
            })
            .collect();
        // Stable file contents between runs
        per_app.sort_by(|a, b| (&a.package, &a.component).cmp(&(&b.package, &b.component)));

        StateFile {
            active_widget_id: self.widget_id,
            active_layout_selector: self.layout_code,
            per_app,
        }
    }
}

/// JSON file backed state store. Every mutation is written through.
pub struct JsonStateStore {
    path: Option<PathBuf>,
    state: RwLock<State>,
}

impl JsonStateStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match load_state(&path) {
            Ok(Some(state)) => {
                debug!("Loaded launcher state from {}", path.display());
                state
            }
            Ok(None) => State::default(),
            Err(e) => {
                warn!(
                    "Failed to read launcher state {}: {}. Starting fresh.",
                    path.display(),
                    e
                );
                State::default()
            }
        };

        Self {
            path: Some(path),
            state: RwLock::new(state),
        }
    }

    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(State::default()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply `apply` and write the result. Memory only changes once the
    /// write succeeded.
    fn update<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut State),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = state.clone();
        apply(&mut next);

        if let Some(path) = &self.path {
            save_state(path, &next)?;
        }
        *state = next;
        Ok(())
    }

    fn read<T>(&self, view: impl FnOnce(&State) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        view(&state)
    }
}

impl UsageStore for JsonStateStore {
    fn get(&self, id: &AppId) -> Result<UsageRecord, StoreError> {
        Ok(self.read(|state| state.apps.get(id).copied().unwrap_or_default()))
    }

    fn put(&self, id: &AppId, record: UsageRecord) -> Result<(), StoreError> {
        self.update(|state| {
            state.apps.insert(id.clone(), record);
        })
    }

    fn records(&self) -> Result<Vec<(AppId, UsageRecord)>, StoreError> {
        Ok(self.read(|state| {
            state
                .apps
                .iter()
                .map(|(id, record)| (id.clone(), *record))
                .collect()
        }))
    }
}

impl PreferenceStore for JsonStateStore {
    fn widget_id(&self) -> Result<i32, StoreError> {
        Ok(self.read(|state| state.widget_id))
    }

    fn set_widget_id(&self, widget_id: i32) -> Result<(), StoreError> {
        self.update(|state| state.widget_id = widget_id)
    }

    fn layout_code(&self) -> Result<i32, StoreError> {
        Ok(self.read(|state| state.layout_code))
    }

    fn set_layout_code(&self, code: i32) -> Result<(), StoreError> {
        self.update(|state| state.layout_code = code)
    }
}

fn load_state(path: &Path) -> Result<Option<State>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let file: StateFile = serde_json::from_str(&content)?;
    Ok(Some(file.into()))
}

fn save_state(path: &Path, state: &State) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(&state.to_file())?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
