//! Application directory watcher.
//!
//! Installing or removing a package touches several .desktop files in a
//! short burst; events are coalesced so the callback runs once per burst.

use crate::error::AppsError;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};
use notify::event::EventKind;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::time::Duration;

/// Keeps the watch alive. Dropping it stops the watcher thread.
pub struct AppWatcher {
    _watcher: RecommendedWatcher,
    watched: Vec<PathBuf>,
}

impl AppWatcher {
    /// Directories that are actually being watched.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

/// Watch `dirs` and call `on_change` once a burst of changes has been
/// quiet for `debounce`. Directories that do not exist are skipped.
pub fn watch_applications<F>(
    dirs: &[PathBuf],
    debounce: Duration,
    on_change: F,
) -> Result<AppWatcher, AppsError>
where
    F: Fn() + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            // The receiver is gone once the watcher thread has exited.
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )?;

    let mut watched = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            continue;
        }
        match watcher.watch(dir, RecursiveMode::Recursive) {
            Ok(()) => watched.push(dir.clone()),
            Err(e) => warn!("Failed to watch {:?}: {}", dir, e),
        }
    }
    info!("Watching {} application directories", watched.len());

    std::thread::Builder::new()
        .name("capy-apps-watch".into())
        .spawn(move || debounce_loop(rx, debounce, on_change))?;

    Ok(AppWatcher {
        _watcher: watcher,
        watched,
    })
}

fn debounce_loop<F: Fn()>(
    rx: Receiver<notify::Result<notify::Event>>,
    debounce: Duration,
    on_change: F,
) {
    while let Ok(first) = rx.recv() {
        if !is_relevant(&first) {
            continue;
        }

        // Swallow the rest of the burst.
        loop {
            match rx.recv_timeout(debounce) {
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }

        debug!("Application directories changed");
        on_change();
    }
    debug!("Application watcher stopped");
}

fn is_relevant(event: &notify::Result<notify::Event>) -> bool {
    match event {
        Ok(event) => matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ),
        Err(e) => {
            warn!("Application watcher error: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_change_triggers_callback() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();
        let watcher = watch_applications(
            &[dir.path().to_path_buf()],
            Duration::from_millis(100),
            move || {
                let _ = tx.send(());
            },
        )
        .unwrap();
        assert_eq!(watcher.watched(), [dir.path().to_path_buf()]);

        fs::write(dir.path().join("new.desktop"), "[Desktop Entry]\n").unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_burst_is_coalesced() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let _watcher = watch_applications(
            &[dir.path().to_path_buf()],
            Duration::from_millis(300),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        )
        .unwrap();

        for i in 0..5 {
            fs::write(dir.path().join(format!("app{i}.desktop")), "x").unwrap();
        }
        std::thread::sleep(Duration::from_millis(1500));

        let calls = calls.load(Ordering::SeqCst);
        assert!(calls >= 1 && calls < 5, "callback ran {calls} times");
    }

    #[test]
    fn test_missing_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = watch_applications(
            &[dir.path().join("missing")],
            Duration::from_millis(50),
            || {},
        )
        .unwrap();
        assert!(watcher.watched().is_empty());
    }
}
