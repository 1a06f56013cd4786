use crate::manifest::MappedAsset;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingAsset {
    pub id: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConventionViolation {
    pub id: String,
    pub dest: String,
    pub reason: String,
}

/// Result of reconciling UI identifiers, manifest mappings and disk presence.
/// Mismatches are data: an empty list means that check passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub ui_ids: Vec<String>,
    pub mappings: Vec<MappedAsset>,
    pub missing_mapping: Vec<String>,
    pub missing_on_disk: Vec<MissingAsset>,
    pub convention_violations: Vec<ConventionViolation>,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.missing_mapping.is_empty()
            && self.missing_on_disk.is_empty()
            && self.convention_violations.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "UI Model IDs found: {}", self.ui_ids.len())?;
        for id in &self.ui_ids {
            writeln!(f, " - {id}")?;
        }

        writeln!(f, "\nCopy Script Mappings found: {}", self.mappings.len())?;
        for asset in &self.mappings {
            writeln!(f, " - ID: {:<30} -> SRC: {}", asset.id, asset.src)?;
        }

        writeln!(f, "\n--- Verification ---")?;
        if self.missing_mapping.is_empty() {
            writeln!(f, "\n[OK] All UI IDs have a corresponding copy entry.")?;
        } else {
            writeln!(f, "\n[!] UI IDs missing from Copy Script (Config mismatch?):")?;
            for id in &self.missing_mapping {
                writeln!(f, " - {id}")?;
            }
        }

        if self.missing_on_disk.is_empty() {
            writeln!(f, "\n[OK] All active models exist on disk.")?;
        } else {
            writeln!(f, "\n[!] Active Models missing from Local Disk:")?;
            for missing in &self.missing_on_disk {
                writeln!(f, " - ID: {} refers to {} (NOT FOUND)", missing.id, missing.path)?;
            }
        }

        if self.convention_violations.is_empty() {
            writeln!(f, "\n[OK] All copy destinations follow the loader naming convention.")
        } else {
            writeln!(f, "\n[!] Copy destinations the loader will not find:")?;
            for violation in &self.convention_violations {
                writeln!(
                    f,
                    " - ID: {} copies to {} ({})",
                    violation.id, violation.dest, violation.reason
                )?;
            }
            Ok(())
        }
    }
}
