//! File watching for rebuild-on-change.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// The site config file changed
    ConfigChanged(PathBuf),

    /// A Markdown page was created or modified
    PageChanged(PathBuf),

    /// Some other file under the content directory changed
    ContentChanged(PathBuf),

    /// A file under the content directory was deleted
    Removed(PathBuf),
}

impl WatchEvent {
    /// Whether the site configuration must be reloaded.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::ConfigChanged(_))
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::ConfigChanged(p) | Self::PageChanged(p) | Self::ContentChanged(p) | Self::Removed(p) => p,
        }
    }
}

/// What to watch: the config file and the content directory.
#[derive(Debug, Clone)]
pub struct WatchTargets {
    pub config_file: PathBuf,
    pub content_dir: PathBuf,
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher.
    ///
    /// Paths are canonicalized so they compare equal to the absolute paths
    /// reported by the OS. Returns the watcher and a channel to receive events.
    pub fn new(
        targets: &WatchTargets,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let targets = WatchTargets {
            config_file: targets.config_file.canonicalize()?,
            content_dir: targets.content_dir.canonicalize()?,
        };

        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        watcher
            .watch(&targets.content_dir, RecursiveMode::Recursive)
            .map_err(std::io::Error::other)?;

        // Editors often replace files on save, so watch the config's directory
        if let Some(config_dir) = targets.config_file.parent() {
            watcher
                .watch(config_dir, RecursiveMode::NonRecursive)
                .map_err(std::io::Error::other)?;
        }

        // Forward classified events to the async side
        std::thread::spawn(move || {
            while let Ok(event) = sync_rx.recv() {
                for path in &event.paths {
                    if let Some(e) = classify_event(path, &event.kind, &targets) {
                        if async_tx.blocking_send(e).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(
    path: &Path,
    kind: &notify::EventKind,
    targets: &WatchTargets,
) -> Option<WatchEvent> {
    use notify::EventKind;

    if !matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return None;
    }

    if path == targets.config_file {
        return Some(WatchEvent::ConfigChanged(path.to_path_buf()));
    }

    if !path.starts_with(&targets.content_dir) {
        return None;
    }

    if matches!(kind, EventKind::Remove(_)) {
        return Some(WatchEvent::Removed(path.to_path_buf()));
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext == "md" || ext == "mdx" {
        Some(WatchEvent::PageChanged(path.to_path_buf()))
    } else {
        Some(WatchEvent::ContentChanged(path.to_path_buf()))
    }
}
