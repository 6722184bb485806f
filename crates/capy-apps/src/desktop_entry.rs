//! Desktop entry parsing.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Parsed `[Desktop Entry]` group of a .desktop file.
#[derive(Clone, Debug, Default)]
pub struct DesktopApp {
    /// Desktop file id (e.g. "firefox.desktop").
    pub id: String,
    pub name: Option<String>,
    /// `Name[xx]` values keyed by the locale in brackets.
    pub localized_names: HashMap<String, String>,
    pub exec: Option<String>,
    pub icon_name: Option<String>,
    pub no_display: bool,
    pub hidden: bool,
    pub desktop_file_path: PathBuf,
}

impl DesktopApp {
    /// Whether the launcher should list this entry.
    pub fn is_launchable(&self) -> bool {
        !self.no_display && !self.hidden
    }

    /// Display name for `locale` ("de-DE", "de_DE" or "de").
    ///
    /// Tries the full tag, then the language alone, then the plain `Name`.
    pub fn label(&self, locale: Option<&str>) -> Option<&str> {
        if let Some(locale) = locale {
            let tag = locale.replace('-', "_");
            if let Some(name) = self.localized_names.get(&tag) {
                return Some(name);
            }
            let lang = tag.split('_').next().unwrap_or_default();
            if let Some(name) = self.localized_names.get(lang) {
                return Some(name);
            }
        }
        self.name.as_deref()
    }
}

/// Parse a .desktop file. Returns `None` if it cannot be read or is not
/// of `Type=Application`.
pub fn parse_desktop_file(path: &Path) -> Option<DesktopApp> {
    let content = fs::read_to_string(path).ok()?;
    let id = path.file_name()?.to_string_lossy().to_string();
    let mut app = parse_desktop_entry(&id, &content)?;
    app.desktop_file_path = path.to_path_buf();
    Some(app)
}

pub fn parse_desktop_entry(id: &str, content: &str) -> Option<DesktopApp> {
    let mut entries = HashMap::new();
    let mut localized_names = HashMap::new();
    let mut in_desktop_entry = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            in_desktop_entry = line == "[Desktop Entry]";
            continue;
        }

        if !in_desktop_entry {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        if let Some(locale) = key
            .strip_prefix("Name[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            // Drop the encoding and modifier parts ("sr_RS@latin").
            let locale = locale.split(['.', '@']).next().unwrap_or(locale);
            localized_names
                .entry(locale.to_string())
                .or_insert_with(|| value.to_string());
        } else {
            entries
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    if entries.get("Type").map(|s| s.as_str()) != Some("Application") {
        return None;
    }

    let non_empty = |key: &str| entries.get(key).filter(|v| !v.is_empty()).cloned();
    let flag = |key: &str| entries.get(key).is_some_and(|v| v == "true");

    Some(DesktopApp {
        id: id.to_string(),
        name: non_empty("Name"),
        localized_names,
        exec: non_empty("Exec"),
        icon_name: non_empty("Icon"),
        no_display: flag("NoDisplay"),
        hidden: flag("Hidden"),
        desktop_file_path: PathBuf::new(),
    })
}
