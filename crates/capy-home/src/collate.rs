//! Locale-aware label ordering.
//!
//! Collators are built per use inside the worker that needs them, never
//! shared across threads.

use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::Locale;
use log::warn;
use std::cmp::Ordering;

/// Compares display labels the way the user's locale expects.
pub struct LabelCollator {
    inner: Option<Collator>,
}

impl LabelCollator {
    /// Build a collator for a BCP-47 or POSIX locale tag.
    /// Unknown or missing tags fall back to the root collation.
    pub fn new(locale: Option<&str>) -> Self {
        let locale = locale
            .and_then(normalize_locale_tag)
            .and_then(|tag| tag.parse::<Locale>().ok())
            .unwrap_or_default();

        let inner = match Collator::try_new(&(&locale).into(), options()) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!("No collation data for '{}': {}. Using root order.", locale, e);
                Collator::try_new(&Default::default(), options()).ok()
            }
        };

        Self { inner }
    }

    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        match &self.inner {
            Some(collator) => collator.compare(left, right),
            None => left
                .to_lowercase()
                .cmp(&right.to_lowercase())
                .then_with(|| left.cmp(right)),
        }
    }
}

fn options() -> CollatorOptions {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    options
}

/// Turn "de_DE.UTF-8@euro" into "de-DE". Returns None for "C"/"POSIX".
pub fn normalize_locale_tag(raw: &str) -> Option<String> {
    let base = raw
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }

    Some(base.replace('_', "-"))
}

/// Locale of the current process from the usual POSIX variables.
pub fn locale_from_env() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
        .and_then(|value| normalize_locale_tag(&value))
}
