//! Copy-manifest reader.
//!
//! The manifest is a script whose entries look like
//! `{ src: 'local_models/x-fp32.onnx', dest: 'public/models/x.onnx' },`.
//! Each line is read with this grammar:
//!
//! ```text
//! line    := item* comment?
//! item    := pair | string | other
//! pair    := ident ws* ':' ws* string
//! string  := '\'' char* '\'' | '"' char* '"' | '`' char* '`'
//! comment := "//" anything
//! ```
//!
//! A line is an entry when it holds both a `src` and a `dest` pair. Lines
//! that are not entries are skipped.

use crate::convention::AssetConvention;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub line: usize,
    pub src: String,
    pub dest: String,
}

struct LineLexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: &'a str,
}

impl<'a> LineLexer<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            chars: line.char_indices().peekable(),
            line,
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    /// Reads a string body after its opening quote. `None` when unterminated.
    fn string(&mut self, quote: char) -> Option<String> {
        let mut out = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = self.chars.next() {
                        out.push(escaped);
                    }
                }
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
        None
    }

    fn ident(&mut self, start: usize) -> &'a str {
        let mut end = start;
        while let Some((i, c)) = self
            .chars
            .next_if(|(_, c)| c.is_alphanumeric() || *c == '_' || *c == '$')
        {
            end = i + c.len_utf8();
        }
        let line = self.line;
        &line[start..end]
    }

    /// All `key: 'value'` pairs on the line, stopping at a `//` comment.
    fn pairs(mut self) -> Vec<(&'a str, String)> {
        let mut pairs = vec![];
        while let Some(&(i, c)) = self.chars.peek() {
            match c {
                '/' if self.line[i..].starts_with("//") => break,
                '\'' | '"' | '`' => {
                    self.chars.next();
                    if self.string(c).is_none() {
                        break;
                    }
                }
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    let key = self.ident(i);
                    self.skip_ws();
                    if self.chars.next_if(|(_, c)| *c == ':').is_none() {
                        continue;
                    }
                    self.skip_ws();
                    let Some(&(_, quote)) = self.chars.peek() else {
                        break;
                    };
                    if matches!(quote, '\'' | '"' | '`') {
                        self.chars.next();
                        match self.string(quote) {
                            Some(value) => pairs.push((key, value)),
                            None => break,
                        }
                    }
                }
                _ => {
                    self.chars.next();
                }
            }
        }
        pairs
    }
}

pub fn parse_manifest_line(line: &str) -> Option<(String, String)> {
    let mut src = None;
    let mut dest = None;
    for (key, value) in LineLexer::new(line).pairs() {
        match key {
            "src" => src = Some(value),
            "dest" => dest = Some(value),
            _ => {}
        }
    }
    Some((src?, dest?))
}

pub fn parse_manifest(source: &str) -> Vec<ManifestEntry> {
    let mut entries = vec![];
    for (idx, line) in source.lines().enumerate() {
        match parse_manifest_line(line) {
            Some((src, dest)) => entries.push(ManifestEntry {
                line: idx + 1,
                src,
                dest,
            }),
            None => {
                if line.contains("src:") {
                    log::debug!("Manifest line {} is not an entry: {}", idx + 1, line.trim());
                }
            }
        }
    }
    entries
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedAsset {
    pub id: String,
    pub src: String,
    pub dest: String,
}

/// Identifier → source asset, in first-seen order. A later entry with the
/// same identifier replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    assets: Vec<MappedAsset>,
    index: HashMap<String, usize>,
}

impl Mapping {
    pub fn from_entries(entries: &[ManifestEntry], convention: &AssetConvention) -> Self {
        let mut mapping = Self::default();
        for entry in entries {
            let id = convention.identifier_for(&entry.dest);
            if let Some(previous) = mapping.insert(MappedAsset {
                id: id.clone(),
                src: entry.src.clone(),
                dest: entry.dest.clone(),
            }) {
                log::warn!(
                    "Manifest line {} remaps {id} from {} to {}",
                    entry.line,
                    previous.src,
                    entry.src
                );
            }
        }
        mapping
    }

    pub fn insert(&mut self, asset: MappedAsset) -> Option<MappedAsset> {
        match self.index.get(&asset.id) {
            Some(&idx) => Some(std::mem::replace(&mut self.assets[idx], asset)),
            None => {
                self.index.insert(asset.id.clone(), self.assets.len());
                self.assets.push(asset);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&MappedAsset> {
        self.index.get(id).map(|&idx| &self.assets[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappedAsset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
