//! Classifies pages into documentation sections by their first path segment.

use std::fmt;

/// Coarse grouping of pages, derived from the first slug of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    /// The main user-facing documentation.
    #[default]
    Primary,
    /// Implementation notes for contributors.
    Implementation,
}

impl Section {
    /// The path segment that selects this section.
    pub fn key(self) -> &'static str {
        match self {
            Section::Primary => "godoxy",
            Section::Implementation => "impl",
        }
    }

    /// Human-readable category name used in exported records.
    pub fn display_name(self) -> &'static str {
        category_name(self.key())
    }

    /// Parses a section key, returning `None` for unknown keys.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "godoxy" => Some(Section::Primary),
            "impl" => Some(Section::Implementation),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returns the section for a page path. Only the part before the first `/`
/// is considered; absent, empty and unknown segments fall back to
/// [`Section::Primary`].
pub fn classify(path: Option<&str>) -> Section {
    let Some(path) = path else {
        return Section::default();
    };
    let dir = path.split('/').next().unwrap_or_default();
    if dir.is_empty() {
        return Section::default();
    }
    Section::from_key(dir).unwrap_or_default()
}

/// Maps a raw section label to its display name. Labels without a display
/// name are returned unchanged.
pub fn category_name(label: &str) -> &str {
    match label {
        "godoxy" => "GoDoxy",
        "impl" => "GoDoxy Implementation",
        other => other,
    }
}
