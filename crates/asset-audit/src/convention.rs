use serde::{Deserialize, Serialize};

/// How the runtime loader turns a model identifier into a served file:
/// `<served_dir>/<id><suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConvention {
    pub suffix: String,
    pub served_dir: Option<String>,
}

impl Default for AssetConvention {
    fn default() -> Self {
        Self {
            suffix: ".onnx".to_string(),
            served_dir: None,
        }
    }
}

fn final_segment(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn parent_dir(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

impl AssetConvention {
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            served_dir: None,
        }
    }

    pub fn with_served_dir(mut self, served_dir: &str) -> Self {
        self.served_dir = Some(served_dir.trim_end_matches('/').to_string());
        self
    }

    pub fn file_name(&self, id: &str) -> String {
        format!("{id}{}", self.suffix)
    }

    /// Identifier a manifest destination is served under: its final path
    /// segment without the suffix.
    pub fn identifier_for(&self, dest: &str) -> String {
        let name = final_segment(dest);
        name.strip_suffix(self.suffix.as_str())
            .unwrap_or(name)
            .to_string()
    }

    /// Why `dest` would not be found by the loader when asked for `id`.
    pub fn violation(&self, id: &str, dest: &str) -> Option<String> {
        let expected = self.file_name(id);
        if final_segment(dest) != expected {
            return Some(format!("expected file name {expected}"));
        }
        if let Some(served_dir) = &self.served_dir {
            let parent = parent_dir(dest);
            if !parent.ends_with(served_dir.as_str()) {
                return Some(format!("expected directory ending in {served_dir}"));
            }
        }
        None
    }
}
