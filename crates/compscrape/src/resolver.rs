//! Resolution of a roster of company names into a worklist of profile URLs.
//!
//! The name→URL table is a JSON list of single-entry objects, e.g.
//! `[{"Acme": "https://www.linkedin.com/company/acme"}]`. Every roster name is
//! looked up in the table, the matching URLs are percent-encoded and checked
//! for a scheme, and the survivors are deduplicated in first-seen order.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use url::Url;

const DEFAULT_ROSTER: &str = include_str!("../data/default_roster.json");

/// Bytes left untouched by [`encode_url`]: the unreserved set plus the URI
/// delimiters.
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Table file '{0}' not found")]
    TableNotFound(PathBuf),
    #[error("Roster file '{0}' not found")]
    RosterNotFound(PathBuf),
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed table: {0}")]
    MalformedTable(String),
    #[error("Malformed roster: {0}")]
    MalformedRoster(String),
    #[error("No valid company URLs found")]
    EmptyWorklist,
}

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,
    #[error("URL '{url}' has no scheme: {reason}")]
    MissingScheme { url: String, reason: String },
}

fn read_file(path: &Path, not_found: fn(PathBuf) -> ResolveError) -> Result<String, ResolveError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => not_found(path.to_path_buf()),
        _ => ResolveError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// Name→URL lookup table loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct UrlTable {
    entries: Vec<(String, String)>,
}

impl UrlTable {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let path = path.as_ref();
        let raw = read_file(path, ResolveError::TableNotFound)?;
        let table = Self::from_json_str(&raw)?;
        log::info!("Loaded {} table entries from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ResolveError> {
        let value: Value = serde_json::from_str(raw)?;
        let Value::Array(items) = value else {
            return Err(ResolveError::MalformedTable(
                "expected a list of single-entry mappings".to_string(),
            ));
        };

        let mut entries = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let Value::Object(map) = item else {
                return Err(ResolveError::MalformedTable(format!(
                    "entry {} is not a mapping",
                    i
                )));
            };
            if map.len() != 1 {
                return Err(ResolveError::MalformedTable(format!(
                    "entry {} has {} keys, expected exactly one",
                    i,
                    map.len()
                )));
            }
            for (name, url) in map {
                let url = match url {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                entries.push((name, url));
            }
        }

        Ok(Self { entries })
    }

    /// Raw URL values of every entry keyed by `name`, in table order.
    pub fn lookup<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, url)| url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered list of company names to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let path = path.as_ref();
        let raw = read_file(path, ResolveError::RosterNotFound)?;
        let roster = Self::from_json_str(&raw)?;
        log::info!("Loaded {} roster names from {}", roster.len(), path.display());
        Ok(roster)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ResolveError> {
        let names: Vec<String> = serde_json::from_str(raw)
            .map_err(|e| ResolveError::MalformedRoster(format!("expected a list of names: {e}")))?;
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Roster {
    /// The built-in roster. Some spellings are unverified against the table.
    fn default() -> Self {
        Self::from_json_str(DEFAULT_ROSTER).expect("invalid embedded roster")
    }
}

/// Deduplicated URLs to fetch, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worklist {
    urls: Vec<String>,
}

impl Worklist {
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

/// Trims `raw` and percent-encodes everything except unreserved characters and
/// URI delimiters. A literal `%` is encoded too.
pub fn encode_url(raw: &str) -> String {
    utf8_percent_encode(raw.trim(), URL_ENCODE_SET).to_string()
}

/// Checks that an encoded URL parses as an absolute URL with a scheme.
pub fn validate_url(encoded: &str) -> Result<Url, UrlError> {
    if encoded.is_empty() {
        return Err(UrlError::Empty);
    }
    Url::parse(encoded).map_err(|e| UrlError::MissingScheme {
        url: encoded.to_string(),
        reason: e.to_string(),
    })
}

pub fn resolve_worklist(table: &UrlTable, roster: &Roster) -> Result<Worklist, ResolveError> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for name in roster.names() {
        let mut matched = false;
        for raw in table.lookup(name) {
            matched = true;
            let encoded = encode_url(raw);
            if let Err(e) = validate_url(&encoded) {
                log::warn!("Invalid URL skipped for '{}': {} ({})", name, raw.trim(), e);
                continue;
            }
            if seen.insert(encoded.clone()) {
                urls.push(encoded);
            } else {
                log::debug!("Duplicate URL for '{}': {}", name, encoded);
            }
        }
        if !matched {
            log::debug!("No table entry for '{}'", name);
        }
    }

    if urls.is_empty() {
        return Err(ResolveError::EmptyWorklist);
    }

    log::info!(
        "Resolved {} unique URL(s) from {} roster name(s)",
        urls.len(),
        roster.len()
    );
    Ok(Worklist { urls })
}
