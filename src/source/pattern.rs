use super::SourceError;
use regex::Regex;
use std::path::{Component, Path};

/// A relative path glob such as `song_data/*/*/*/*`.
///
/// Each `/`-separated segment is matched against exactly one path component,
/// so the pattern also fixes the depth of the files it selects. `*` matches
/// any run of characters inside a component and `?` matches a single one.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Regex>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self, SourceError> {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                Regex::new(&segment_to_regex(segment)).map_err(|source| {
                    SourceError::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if segments.is_empty() {
            return Err(SourceError::EmptyPattern);
        }
        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether `relative` (a path below the source root) matches the pattern.
    pub fn matches(&self, relative: &Path) -> bool {
        let components: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect();
        components.len() == self.segments.len()
            && components
                .iter()
                .zip(&self.segments)
                .all(|(name, re)| re.is_match(name))
    }
}

fn segment_to_regex(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 8);
    out.push('^');
    for c in segment.chars() {
        match c {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    out
}
