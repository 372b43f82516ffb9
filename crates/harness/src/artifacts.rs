//! Scenario-scoped output: screenshots, step logs, diff images

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{HarnessError, HarnessResult};
use crate::visual::{CapturedImage, VisualDiff};

/// Marks a directory as harness output that a later run may clear.
pub const MARKER_FILE: &str = ".wikiqa-output";

/// Process-wide output directory, recreated once per suite.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Recreate `root` empty. Only directories that are empty or carry the
    /// marker of an earlier run are cleared; anything else is refused.
    pub fn prepare(root: impl Into<PathBuf>) -> HarnessResult<Self> {
        let root = root.into();
        if root.exists() {
            if !root.is_dir() {
                return Err(HarnessError::Config(format!(
                    "output path {} is not a directory",
                    root.display()
                )));
            }
            let owned = root.join(MARKER_FILE).is_file();
            let empty = std::fs::read_dir(&root)?.next().is_none();
            if !owned && !empty {
                return Err(HarnessError::Config(format!(
                    "refusing to clear {}: not empty and not a previous output directory",
                    root.display()
                )));
            }
            if owned {
                info!("Clearing previous artifacts in {}", root.display());
                std::fs::remove_dir_all(&root)?;
            }
        }
        std::fs::create_dir_all(&root)?;
        std::fs::write(root.join(MARKER_FILE), "")?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scenario(&self, name: &str) -> HarnessResult<ScenarioArtifacts> {
        let dir = self.root.join(sanitize(name));
        std::fs::create_dir_all(&dir)?;
        Ok(ScenarioArtifacts {
            dir,
            counter: AtomicUsize::new(0),
            diffs: AtomicUsize::new(0),
        })
    }

    pub fn results_path(&self) -> PathBuf {
        self.root.join("results.json")
    }
}

/// Files belonging to one scenario. Names never collide across scenarios.
#[derive(Debug)]
pub struct ScenarioArtifacts {
    dir: PathBuf,
    counter: AtomicUsize,
    diffs: AtomicUsize,
}

impl ScenarioArtifacts {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn steps_path(&self) -> PathBuf {
        self.dir.join("steps.jsonl")
    }

    /// `NNN-<label>-<timestamp>.png`, numbered in capture order
    pub fn next_screenshot_path(&self, label: &str) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        self.dir.join(format!("{:03}-{}-{}.png", n, sanitize(label), stamp))
    }

    pub fn save_screenshot(&self, label: &str, image: &CapturedImage) -> HarnessResult<PathBuf> {
        let path = self.next_screenshot_path(label);
        image.save(&path)?;
        debug!("Screenshot saved: {}", path.display());
        Ok(path)
    }

    /// `NNN-<label>-diff.png`, numbered in comparison order
    pub fn save_diff(&self, label: &str, diff: &VisualDiff) -> HarnessResult<PathBuf> {
        let n = self.diffs.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.join(format!("{:03}-{}-diff.png", n, sanitize(label)));
        diff.save_diff_image(&path)?;
        Ok(path)
    }
}

/// File-system safe name: alphanumerics, `-` and `_`; everything else becomes `-`.
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}
