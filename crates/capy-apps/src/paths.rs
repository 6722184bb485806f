//! XDG search paths and the on-disk icon cache.

use log::{debug, warn};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_DATA_DIRS: &str = "/usr/local/share:/usr/share";

fn data_home() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".local/share"))
}

fn data_dirs() -> Vec<PathBuf> {
    std::env::var("XDG_DATA_DIRS")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_DIRS.to_string())
        .split(':')
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Application directories in precedence order (user first).
pub fn application_directories() -> Vec<PathBuf> {
    let mut result = vec![data_home().join("applications")];
    result.extend(data_dirs().into_iter().map(|d| d.join("applications")));
    result.push(PathBuf::from("/var/lib/flatpak/exports/share/applications"));
    if let Some(home) = dirs::home_dir() {
        result.push(home.join(".local/share/flatpak/exports/share/applications"));
    }
    result.push(PathBuf::from("/var/lib/snapd/desktop/applications"));
    dedup(result)
}

/// Icon base directories (XDG, pixmaps, Flatpak, Snap).
pub fn icon_base_directories() -> Vec<PathBuf> {
    let mut result = vec![data_home().join("icons")];
    if let Some(home) = dirs::home_dir() {
        result.push(home.join(".icons"));
    }
    for dir in data_dirs() {
        result.push(dir.join("icons"));
        result.push(dir.join("pixmaps"));
    }
    result.push(PathBuf::from("/usr/share/pixmaps"));
    result.push(PathBuf::from("/var/lib/flatpak/exports/share/icons"));
    if let Some(home) = dirs::home_dir() {
        result.push(home.join(".local/share/flatpak/exports/share/icons"));
    }
    result.push(PathBuf::from("/var/lib/snapd/desktop/icons"));
    dedup(result)
}

fn dedup(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths.into_iter().filter(|p| seen.insert(p.clone())).collect()
}

/// Default location of the icon lookup cache.
pub fn default_icon_cache_path() -> Option<PathBuf> {
    Some(dirs::cache_dir()?.join("CapyShell").join("icon_cache.json"))
}

pub type IconCache = HashMap<String, Option<PathBuf>>;

pub fn load_icon_cache(path: &Path) -> Option<IconCache> {
    let file = fs::File::open(path).ok()?;
    match serde_json::from_reader(std::io::BufReader::new(file)) {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!("Ignoring unreadable icon cache {:?}: {}", path, e);
            None
        }
    }
}

pub fn save_icon_cache(path: &Path, cache: &IconCache) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create cache directory {:?}: {}", parent, e);
            return;
        }
    }
    let written = fs::File::create(path)
        .map_err(|e| e.to_string())
        .and_then(|file| serde_json::to_writer(file, cache).map_err(|e| e.to_string()));
    match written {
        Ok(()) => debug!("Saved {} icon lookups to {:?}", cache.len(), path),
        Err(e) => warn!("Failed to save icon cache {:?}: {}", path, e),
    }
}

/// `[Icon Theme]` group of an index.theme file.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedIconTheme {
    pub directories: Vec<String>,
    pub inherits: Vec<String>,
}

pub fn parse_icon_theme_index(theme_root: &Path) -> Option<ParsedIconTheme> {
    let content = fs::read_to_string(theme_root.join("index.theme")).ok()?;
    let mut parsed = ParsedIconTheme::default();
    let mut in_theme = false;

    let list = |v: &str| -> Vec<String> {
        v.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_theme = line.eq_ignore_ascii_case("[Icon Theme]");
            continue;
        }
        if !in_theme {
            continue;
        }
        match line.split_once('=') {
            Some((k, v)) if k.trim() == "Directories" => parsed.directories = list(v),
            Some((k, v)) if k.trim() == "Inherits" => parsed.inherits = list(v),
            _ => {}
        }
    }

    Some(parsed)
}

/// Theme lookup order: the preferred theme, Adwaita, hicolor, plus
/// everything they inherit, breadth first.
pub fn icon_theme_order(base_dirs: &[PathBuf]) -> Vec<String> {
    let mut start = Vec::new();
    if let Ok(theme) = std::env::var("GTK_THEME") {
        start.push(theme);
    }
    start.push("Adwaita".to_string());
    start.push("hicolor".to_string());
    resolve_theme_inheritance(start, base_dirs)
}

fn resolve_theme_inheritance(start: Vec<String>, base_dirs: &[PathBuf]) -> Vec<String> {
    let mut result = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from(start);

    while let Some(theme) = queue.pop_front() {
        if !visited.insert(theme.clone()) {
            continue;
        }

        // First instance of the theme wins.
        if let Some(parsed) = base_dirs
            .iter()
            .find_map(|base| parse_icon_theme_index(&base.join(&theme)))
        {
            queue.extend(parsed.inherits.into_iter().filter(|p| !visited.contains(p)));
        }
        result.push(theme);
    }

    result
}
