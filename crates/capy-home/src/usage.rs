//! Usage ranking model.
//!
//! Holds the mutation operations on the persisted usage records and ranks a
//! catalog into the dock selection. Storage lives behind [`UsageStore`].

use crate::collate::LabelCollator;
use crate::error::StoreError;
use crate::store::UsageStore;
use crate::types::{AppId, ApplicationEntry, UsageRecord};
use log::debug;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Usage counters and dock flags, ranked into the "most used" selection.
pub struct UsageModel {
    store: Arc<dyn UsageStore>,
    /// Serializes read-modify-write cycles on the store.
    write_lock: Mutex<()>,
}

impl UsageModel {
    pub fn new(store: Arc<dyn UsageStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Count one more open of `id` and mark it as the most recent.
    pub fn record_open(&self, id: &AppId) -> Result<UsageRecord, StoreError> {
        self.modify(id, |record| {
            record.usage_count = record.usage_count.saturating_add(1);
            record.last_used = self.next_stamp()?;
            Ok(())
        })
    }

    pub fn reset_usage(&self, id: &AppId) -> Result<UsageRecord, StoreError> {
        self.modify(id, |record| {
            record.usage_count = 0;
            record.last_used = 0;
            Ok(())
        })
    }

    pub fn toggle_disabled(&self, id: &AppId) -> Result<UsageRecord, StoreError> {
        self.modify(id, |record| {
            record.disabled = !record.disabled;
            Ok(())
        })
    }

    pub fn toggle_sticky(&self, id: &AppId) -> Result<UsageRecord, StoreError> {
        self.modify(id, |record| {
            record.sticky = !record.sticky;
            Ok(())
        })
    }

    /// Current record for `id` (zero record if never seen).
    pub fn record(&self, id: &AppId) -> Result<UsageRecord, StoreError> {
        self.store.get(id)
    }

    /// Rank `catalog` into at most `limit` dock entries.
    ///
    /// Disabled entries never appear. Sticky entries come first, then the
    /// rest, each group ordered by usage count, recency and collated label.
    /// Flags are taken from the store, not from the (possibly older) catalog.
    pub fn most_used(
        &self,
        catalog: &[ApplicationEntry],
        limit: usize,
        collator: &LabelCollator,
    ) -> Result<Vec<ApplicationEntry>, StoreError> {
        let records: HashMap<AppId, UsageRecord> = self.store.records()?.into_iter().collect();

        let mut sticky = Vec::new();
        let mut regular = Vec::new();

        for entry in catalog {
            let record = records.get(&entry.id).copied().unwrap_or_default();
            if record.disabled {
                continue;
            }

            let mut entry = entry.clone();
            entry.disabled = false;
            entry.sticky = record.sticky;

            if record.sticky {
                sticky.push((entry, record));
            } else {
                regular.push((entry, record));
            }
        }

        sticky.sort_by(|a, b| rank_order(a, b, collator));
        regular.sort_by(|a, b| rank_order(a, b, collator));

        let ranked: Vec<ApplicationEntry> = sticky
            .into_iter()
            .chain(regular)
            .take(limit)
            .map(|(entry, _)| entry)
            .collect();

        debug!("Ranked {} of {} apps for the dock", ranked.len(), catalog.len());
        Ok(ranked)
    }

    fn modify<F>(&self, id: &AppId, apply: F) -> Result<UsageRecord, StoreError>
    where
        F: FnOnce(&mut UsageRecord) -> Result<(), StoreError>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut record = self.store.get(id)?;
        apply(&mut record)?;
        self.store.put(id, record)?;
        Ok(record)
    }

    /// Stamp above every recorded open. Only called under `write_lock`.
    fn next_stamp(&self) -> Result<u64, StoreError> {
        let latest = self
            .store
            .records()?
            .iter()
            .map(|(_, record)| record.last_used)
            .max()
            .unwrap_or(0);
        Ok(latest + 1)
    }
}

fn rank_order(
    (a, a_record): &(ApplicationEntry, UsageRecord),
    (b, b_record): &(ApplicationEntry, UsageRecord),
    collator: &LabelCollator,
) -> Ordering {
    b_record
        .usage_count
        .cmp(&a_record.usage_count)
        .then_with(|| b_record.last_used.cmp(&a_record.last_used))
        .then_with(|| collator.compare(&a.label, &b.label))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStateStore;
    use crate::types::IconHandle;

    fn model() -> UsageModel {
        UsageModel::new(Arc::new(JsonStateStore::in_memory()))
    }

    fn entry(name: &str) -> ApplicationEntry {
        ApplicationEntry {
            id: AppId::new(format!("org.{}", name.to_lowercase()), "Main"),
            label: name.to_string(),
            icon: IconHandle::Default,
            disabled: false,
            sticky: false,
        }
    }

    fn labels(entries: &[ApplicationEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.label.as_str()).collect()
    }

    fn open(model: &UsageModel, entry: &ApplicationEntry, times: usize) {
        for _ in 0..times {
            model.record_open(&entry.id).unwrap();
        }
    }

    #[test]
    fn test_record_open_accumulates() {
        let model = model();
        let app = entry("Mail");
        open(&model, &app, 3);
        assert_eq!(model.record(&app.id).unwrap().usage_count, 3);
    }

    #[test]
    fn test_concurrent_opens_are_not_lost() {
        let model = Arc::new(model());
        let app = entry("Browser");

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let model = Arc::clone(&model);
                let id = app.id.clone();
                scope.spawn(move || {
                    for _ in 0..25 {
                        model.record_open(&id).unwrap();
                    }
                });
            }
        });

        assert_eq!(model.record(&app.id).unwrap().usage_count, 200);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let model = model();
        let app = entry("Maps");
        open(&model, &app, 4);

        let once = model.reset_usage(&app.id).unwrap();
        let twice = model.reset_usage(&app.id).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.usage_count, 0);
    }

    #[test]
    fn test_toggles_round_trip() {
        let model = model();
        let id = AppId::new("never.seen", "Main");

        assert!(model.toggle_sticky(&id).unwrap().sticky);
        assert!(!model.toggle_sticky(&id).unwrap().sticky);
        assert!(model.toggle_disabled(&id).unwrap().disabled);
        assert!(!model.toggle_disabled(&id).unwrap().disabled);
        assert_eq!(model.record(&id).unwrap().usage_count, 0);
    }

    #[test]
    fn test_most_used_orders_by_count() {
        let model = model();
        let collator = LabelCollator::new(Some("en"));
        let catalog = vec![entry("Alpha"), entry("Beta"), entry("Gamma")];
        open(&model, &catalog[2], 3);
        open(&model, &catalog[0], 1);
        open(&model, &catalog[1], 2);

        let ranked = model.most_used(&catalog, 6, &collator).unwrap();
        assert_eq!(labels(&ranked), vec!["Gamma", "Beta", "Alpha"]);
    }

    #[test]
    fn test_most_used_respects_limit_and_flags() {
        let model = model();
        let collator = LabelCollator::new(Some("en"));
        let catalog: Vec<_> = ["A", "B", "C", "D", "E", "F", "G", "H"]
            .into_iter()
            .map(entry)
            .collect();

        for (i, app) in catalog.iter().enumerate() {
            open(&model, app, 10 - i);
        }
        // Least used app pinned, most used app hidden
        model.toggle_sticky(&catalog[7].id).unwrap();
        model.toggle_disabled(&catalog[0].id).unwrap();

        let ranked = model.most_used(&catalog, 6, &collator).unwrap();
        assert_eq!(labels(&ranked), vec!["H", "B", "C", "D", "E", "F"]);
        assert!(ranked[0].sticky);
        assert!(ranked.iter().all(|e| !e.disabled));
    }

    #[test]
    fn test_disabled_sticky_is_excluded() {
        let model = model();
        let collator = LabelCollator::new(None);
        let catalog = vec![entry("One"), entry("Two")];
        model.toggle_sticky(&catalog[0].id).unwrap();
        model.toggle_disabled(&catalog[0].id).unwrap();

        let ranked = model.most_used(&catalog, 6, &collator).unwrap();
        assert_eq!(labels(&ranked), vec!["Two"]);
    }

    #[test]
    fn test_sticky_group_ordered_by_usage() {
        let model = model();
        let collator = LabelCollator::new(Some("en"));
        let catalog = vec![entry("Low"), entry("High"), entry("Plain")];
        open(&model, &catalog[1], 5);
        open(&model, &catalog[2], 9);
        model.toggle_sticky(&catalog[0].id).unwrap();
        model.toggle_sticky(&catalog[1].id).unwrap();

        let ranked = model.most_used(&catalog, 6, &collator).unwrap();
        assert_eq!(labels(&ranked), vec!["High", "Low", "Plain"]);
    }

    #[test]
    fn test_ties_prefer_recent_then_label() {
        let model = model();
        let collator = LabelCollator::new(Some("en"));
        let catalog = vec![entry("zulu"), entry("Echo"), entry("alpha"), entry("Delta")];
        open(&model, &catalog[3], 1);
        open(&model, &catalog[1], 1);

        let ranked = model.most_used(&catalog, 6, &collator).unwrap();
        assert_eq!(labels(&ranked), vec!["Echo", "Delta", "alpha", "zulu"]);
    }

    #[test]
    fn test_fewer_apps_than_slots() {
        let model = model();
        let collator = LabelCollator::new(None);
        let ranked = model.most_used(&[entry("Solo")], 6, &collator).unwrap();
        assert_eq!(ranked.len(), 1);
        assert!(model.most_used(&[], 6, &collator).unwrap().is_empty());
    }

    /// Counts full-table reads.
    struct CountingStore {
        inner: JsonStateStore,
        scans: std::sync::atomic::AtomicUsize,
    }

    impl UsageStore for CountingStore {
        fn get(&self, id: &AppId) -> Result<UsageRecord, StoreError> {
            self.inner.get(id)
        }

        fn put(&self, id: &AppId, record: UsageRecord) -> Result<(), StoreError> {
            self.inner.put(id, record)
        }

        fn records(&self) -> Result<Vec<(AppId, UsageRecord)>, StoreError> {
            self.scans.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.records()
        }
    }

    #[test]
    fn test_only_opens_read_every_record() {
        let store = Arc::new(CountingStore {
            inner: JsonStateStore::in_memory(),
            scans: Default::default(),
        });
        let model = UsageModel::new(store.clone());
        let app = entry("Notes");
        let scans = || store.scans.load(std::sync::atomic::Ordering::SeqCst);

        model.toggle_sticky(&app.id).unwrap();
        model.toggle_disabled(&app.id).unwrap();
        model.reset_usage(&app.id).unwrap();
        assert_eq!(scans(), 0);

        assert_eq!(model.record_open(&app.id).unwrap().last_used, 1);
        assert_eq!(model.record_open(&app.id).unwrap().last_used, 2);
        assert_eq!(scans(), 2);
    }
}
