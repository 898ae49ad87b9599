// src/gist/metadata.rs
// =============================================================================
// Plain data types that mirror the API's JSON.
//
// Both the by-id and the by-user endpoints answer with the same envelope:
//
//   { "gists": [ { "repo": "...", "owner": "...", "files": [...], ... } ] }
//
// Known keys get real struct fields. Anything else the API sends is kept
// in `extra` so callers can still get at it.
// =============================================================================

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Top-level wrapper returned by every metadata endpoint.
///
/// The by-id lookup reads it as `Envelope<Value>` so only the first entry
/// has to be a valid gist; the user listing decodes every entry.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T = GistMetadata> {
    pub gists: Vec<T>,
}

/// Descriptive data about one gist. Does not include file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GistMetadata {
    /// Canonical gist id.
    pub repo: String,
    pub owner: String,
    /// Gists created without a description come back as `null`.
    #[serde(default)]
    pub description: Option<String>,
    /// Creation time exactly as the API formats it, e.g.
    /// `2010/05/16 10:51:15 -0700`.
    pub created_at: String,
    pub public: bool,
    /// The API calls this `files`; it is only the list of names.
    #[serde(rename = "files")]
    pub filenames: Vec<String>,
    /// Keys we don't model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Contents of a gist's files, keyed by filename, in `filenames` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GistFiles {
    entries: Vec<(String, String)>,
}

impl GistFiles {
    pub(crate) fn from_entries(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Content of `name`, if the gist has a file by that name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Serialized as a JSON object, written in filename order.
impl Serialize for GistFiles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, content) in &self.entries {
            map.serialize_entry(name, content)?;
        }
        map.end()
    }
}

impl IntoIterator for GistFiles {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
