use regex::Regex;
use std::sync::LazyLock;

static ID_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"id:\s*(?:'([^']+)'|"([^"]+)")"#).expect("static pattern is valid")
});

/// Every quoted value following an `id:` key, in source order, duplicates kept.
pub fn extract_ui_ids(source: &str) -> Vec<String> {
    ID_KEY
        .captures_iter(source)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}
