//! Icon theme handling and indexing.

use crate::paths::{icon_theme_order, parse_icon_theme_index};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

const ICON_EXTENSIONS: [&str; 4] = ["png", "svg", "xpm", "webp"];

/// Icon lookups across themes and base directories.
pub struct IconTheme {
    base_dirs: Vec<PathBuf>,
    /// Icon name (lowercase, no extension) -> path.
    index: RwLock<HashMap<String, PathBuf>>,
}

impl IconTheme {
    pub fn new(base_dirs: Vec<PathBuf>) -> Self {
        Self {
            base_dirs,
            index: RwLock::new(HashMap::new()),
        }
    }

    /// Build the index of all icons.
    /// Directories are walked in theme order; the first match wins.
    pub fn build_index(&self) {
        let mut index = HashMap::new();
        let search_dirs = self.search_directories();
        debug!("Scanning {} icon directories...", search_dirs.len());

        for dir in search_dirs.iter().filter(|d| d.exists()) {
            let walker = walkdir::WalkDir::new(dir).follow_links(true).max_depth(10);
            for entry in walker.into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_dir() {
                    continue;
                }
                if let Some(stem) = icon_stem(entry.path()) {
                    index.entry(stem).or_insert_with(|| entry.path().to_path_buf());
                }
            }
        }

        debug!("Indexed {} icons", index.len());
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = index;
    }

    /// Resolve an icon name (or absolute path) to a file.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.starts_with('/') {
            let path = PathBuf::from(name);
            return path.exists().then_some(path);
        }

        let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
        let lower = name.to_lowercase();

        [lower.clone(), lower.replace(' ', "-"), lower.replace('_', "-")]
            .iter()
            .find_map(|candidate| index.get(candidate).cloned())
    }

    fn search_directories(&self) -> Vec<PathBuf> {
        let mut result = Vec::new();

        for theme in icon_theme_order(&self.base_dirs) {
            for base in &self.base_dirs {
                let theme_root = base.join(&theme);
                if !theme_root.exists() {
                    continue;
                }
                match parse_icon_theme_index(&theme_root) {
                    Some(parsed) if !parsed.directories.is_empty() => {
                        result.extend(parsed.directories.iter().map(|d| theme_root.join(d)));
                    }
                    _ => result.push(theme_root),
                }
            }
        }

        // Loose icons (pixmaps, icons root).
        result.extend(self.base_dirs.iter().cloned());
        result
    }
}

fn icon_stem(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    if !ICON_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    Some(path.file_stem()?.to_str()?.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_theme_icons_win_over_loose_icons() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_path_buf();
        touch(&base.join("hicolor/48x48/apps/firefox.png"));
        touch(&base.join("firefox.xpm"));
        touch(&base.join("Org.Gnome_Files.svg"));
        touch(&base.join("notes.txt"));

        let theme = IconTheme::new(vec![base.clone()]);
        theme.build_index();

        assert_eq!(
            theme.resolve("firefox"),
            Some(base.join("hicolor/48x48/apps/firefox.png"))
        );
        assert_eq!(
            theme.resolve("org.gnome_files"),
            Some(base.join("Org.Gnome_Files.svg"))
        );
        assert_eq!(theme.resolve("notes"), None);
        assert_eq!(theme.resolve("missing"), None);
    }

    #[test]
    fn test_absolute_paths_resolve_only_if_present() {
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join("app.png");
        touch(&icon);

        let theme = IconTheme::new(Vec::new());
        let as_str = icon.to_str().unwrap();
        assert_eq!(theme.resolve(as_str), Some(icon.clone()));
        assert_eq!(theme.resolve("/definitely/not/here.png"), None);
    }
}
