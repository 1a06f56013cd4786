//! Allow-list cleanup of a model directory.
//!
//! Kept apart from conversion: planning only lists and classifies the direct
//! children of the directory, applying the plan is a separate step.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
    #[error("Cannot remove {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum CleanupAction {
    Keep,
    RemoveDirectory,
    RemoveStaleModel,
    RemoveArtifact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupItem {
    pub path: PathBuf,
    pub action: CleanupAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupPlan {
    pub items: Vec<CleanupItem>,
}

impl CleanupPlan {
    pub fn removals(&self) -> impl Iterator<Item = &CleanupItem> {
        self.items.iter().filter(|x| x.action != CleanupAction::Keep)
    }
}

fn classify(file_name: &str, is_dir: bool, keep: &[String]) -> CleanupAction {
    if is_dir {
        CleanupAction::RemoveDirectory
    } else if file_name.ends_with(".onnx") {
        if keep.iter().any(|k| k == file_name) {
            CleanupAction::Keep
        } else {
            CleanupAction::RemoveStaleModel
        }
    } else {
        CleanupAction::RemoveArtifact
    }
}

pub fn plan_cleanup(dir: &Path, keep: &[String]) -> Result<CleanupPlan, CleanupError> {
    if !dir.is_dir() {
        return Err(CleanupError::NotADirectory(dir.to_path_buf()));
    }
    let mut plan = CleanupPlan::default();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy();
        let action = classify(&file_name, entry.file_type().is_dir(), keep);
        plan.items.push(CleanupItem {
            path: entry.path().to_path_buf(),
            action,
        });
    }
    Ok(plan)
}

/// Removes everything the plan marks for removal, or only logs it on a dry
/// run. Returns the paths removed (or that would be removed).
pub fn apply_cleanup(plan: &CleanupPlan, dry_run: bool) -> Result<Vec<PathBuf>, CleanupError> {
    let mut removed = vec![];
    for item in plan.removals() {
        let path = &item.path;
        if dry_run {
            log::info!("Would remove {} ({})", path.display(), item.action);
        } else {
            log::info!("Removing {} ({})", path.display(), item.action);
            let result = match item.action {
                CleanupAction::RemoveDirectory => std::fs::remove_dir_all(path),
                _ => std::fs::remove_file(path),
            };
            result.map_err(|source| CleanupError::Io {
                path: path.clone(),
                source,
            })?;
        }
        removed.push(path.clone());
    }
    Ok(removed)
}
