use std::path::Path;

use crossbeam_channel::{Receiver, unbounded};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Watch a single config file. Every modify, create or remove event sends a
/// `()`; the caller coalesces them with `try_iter`. Dropping the returned
/// watcher stops the notifications.
pub fn watch_config(path: &Path) -> notify::Result<(RecommendedWatcher, Receiver<()>)> {
    let (tx, rx) = unbounded::<()>();
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res {
            match event.kind {
                EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any => {
                    let _ = tx.send(());
                }
                _ => {}
            }
        }
    })?;
    watcher.watch(path, RecursiveMode::NonRecursive)?;
    log::info!(target: "config", "watching {:?} for changes", path);
    Ok((watcher, rx))
}

/// Drain pending change notifications; true when at least one arrived.
pub fn changed(rx: &Receiver<()>) -> bool {
    rx.try_iter().count() > 0
}
