//! Off-thread loading of an external scene description.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use towerscope_core::{Result, SceneDescription, SceneGraph, ViewerError};

/// A one-shot background load, polled from the render thread.
#[derive(Debug)]
pub(crate) struct SceneLoader {
    path: PathBuf,
    receiver: Receiver<Result<SceneGraph>>,
}

impl SceneLoader {
    /// Starts reading and parsing `path` on a worker thread.
    pub(crate) fn spawn(path: &Path, default_star_count: u32) -> Self {
        let (tx, receiver) = mpsc::channel();
        let worker_tx = tx.clone();
        let worker_path = path.to_path_buf();

        log::info!("loading scene from {}", path.display());
        let spawned = std::thread::Builder::new()
            .name("towerscope-scene-loader".into())
            .spawn(move || {
                let result = SceneDescription::from_json_file(&worker_path)
                    .map(|desc| SceneGraph::from_description(desc, default_star_count));
                // The viewer may already be gone.
                let _ = worker_tx.send(result);
            });
        if let Err(e) = spawned {
            let _ = tx.send(Err(ViewerError::Io(e)));
        }

        Self {
            path: path.to_path_buf(),
            receiver,
        }
    }

    /// Returns the result once the worker has finished.
    pub(crate) fn poll(&self) -> Option<Result<SceneGraph>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.worker_died())),
        }
    }

    /// Blocks until the worker has finished.
    pub(crate) fn wait(&self) -> Result<SceneGraph> {
        self.receiver.recv().map_err(|_| self.worker_died())?
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn worker_died(&self) -> ViewerError {
        ViewerError::SceneLoad(format!(
            "loader for {} exited without a result",
            self.path.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("towerscope_{}_{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_loads_description() {
        let path = temp_file(
            "loader_ok.json",
            r#"{"elements": [{"name": "block", "shape": "box",
                "center": [0.0, 1.0, 0.0], "size": [2.0, 2.0, 2.0]}],
                "star_count": 3}"#,
        );
        let loader = SceneLoader::spawn(&path, 50);
        let scene = loader.wait().unwrap();
        assert_eq!(scene.elements().len(), 1);
        assert_eq!(scene.stars().len(), 3);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("towerscope_definitely_missing_scene.json");
        let loader = SceneLoader::spawn(&path, 50);
        assert!(loader.wait().is_err());
        assert_eq!(loader.path(), path.as_path());
    }
}
