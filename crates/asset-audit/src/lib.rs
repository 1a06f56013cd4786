//! Consistency audit between the UI's model identifiers, the build-time copy
//! manifest, and the source assets on disk.

pub mod convention;
pub mod manifest;
pub mod report;
pub mod ui;

pub use convention::AssetConvention;
pub use manifest::{ManifestEntry, MappedAsset, Mapping, parse_manifest};
pub use report::{AuditReport, ConventionViolation, MissingAsset};
pub use ui::extract_ui_ids;

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Reconciles UI identifiers against the mapping and the presence predicate.
pub fn reconcile(
    ui_ids: Vec<String>,
    mapping: &Mapping,
    convention: &AssetConvention,
    exists: impl Fn(&str) -> bool,
) -> AuditReport {
    let mut report = AuditReport {
        mappings: mapping.iter().cloned().collect(),
        ..Default::default()
    };
    for id in &ui_ids {
        match mapping.get(id) {
            None => report.missing_mapping.push(id.clone()),
            Some(asset) => {
                if !exists(&asset.src) {
                    report.missing_on_disk.push(MissingAsset {
                        id: id.clone(),
                        path: asset.src.clone(),
                    });
                }
            }
        }
    }
    for asset in mapping.iter() {
        if let Some(reason) = convention.violation(&asset.id, &asset.dest) {
            report.convention_violations.push(ConventionViolation {
                id: asset.id.clone(),
                dest: asset.dest.clone(),
                reason,
            });
        }
    }
    report.ui_ids = ui_ids;
    report
}

/// Runs the audit over in-memory sources.
pub fn audit(
    ui_source: &str,
    manifest_source: &str,
    convention: &AssetConvention,
    exists: impl Fn(&str) -> bool,
) -> AuditReport {
    let ui_ids = extract_ui_ids(ui_source);
    let mapping = Mapping::from_entries(&parse_manifest(manifest_source), convention);
    log::debug!(
        "Audit: {} UI id(s), {} mapping(s)",
        ui_ids.len(),
        mapping.len()
    );
    reconcile(ui_ids, &mapping, convention, exists)
}

fn read_source(path: &Path) -> Result<String, AuditError> {
    std::fs::read_to_string(path).map_err(|source| AuditError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs the audit over files. Relative `src` paths resolve against `asset_root`.
pub fn audit_files(
    ui_path: &Path,
    manifest_path: &Path,
    asset_root: &Path,
    convention: &AssetConvention,
) -> Result<AuditReport, AuditError> {
    let ui_source = read_source(ui_path)?;
    let manifest_source = read_source(manifest_path)?;
    Ok(audit(&ui_source, &manifest_source, convention, |src| {
        asset_root.join(src).exists()
    }))
}
