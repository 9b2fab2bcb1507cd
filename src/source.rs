//! Match event sources: a local JSON file or, with the `remote` feature, a URL.
//!
//! Sources are loaded in full before tokenization starts; any failure here is
//! fatal for that match.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::schema::Event;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid event JSON in {origin}: {source}")]
    Json {
        origin: String,
        source: serde_json::Error,
    },
    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    Http { url: String, source: reqwest::Error },
    #[error("cannot fetch {0}: built without the `remote` feature")]
    RemoteDisabled(String),
}

/// Where a match's events come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSource {
    File(PathBuf),
    Url(String),
}

impl MatchSource {
    /// Interprets `http://` and `https://` strings as URLs, anything else as a path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            MatchSource::Url(s.to_string())
        } else {
            MatchSource::File(PathBuf::from(s))
        }
    }

    /// Short name used for output files: the file stem or last URL segment
    /// without its extension.
    pub fn stem(&self) -> String {
        let name = match self {
            MatchSource::File(p) => p.file_stem().map(|s| s.to_string_lossy().into_owned()),
            MatchSource::Url(u) => u
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .map(|s| s.split('.').next().unwrap_or(s).to_string()),
        };
        name.filter(|n| !n.is_empty())
            .unwrap_or_else(|| "match".to_string())
    }

    /// Loads and decodes the whole event list.
    pub fn load(&self) -> Result<Vec<Event>, SourceError> {
        let events = match self {
            MatchSource::File(path) => load_file(path)?,
            MatchSource::Url(url) => fetch(url)?,
        };
        debug!(source = %self, events = events.len(), "events loaded");
        Ok(events)
    }
}

/// Output stems shared by more than one source, in sorted order. Writing such
/// a batch into one directory would overwrite earlier matches.
pub fn duplicate_stems(sources: &[MatchSource]) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for source in sources {
        *seen.entry(source.stem()).or_default() += 1;
    }
    seen.into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|(stem, _)| stem)
        .collect()
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSource::File(p) => write!(f, "{}", p.display()),
            MatchSource::Url(u) => write!(f, "{}", u),
        }
    }
}

fn load_file(path: &Path) -> Result<Vec<Event>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| SourceError::Json {
        origin: path.display().to_string(),
        source,
    })
}

#[cfg(feature = "remote")]
fn fetch(url: &str) -> Result<Vec<Event>, SourceError> {
    let http = |source| SourceError::Http {
        url: url.to_string(),
        source,
    };
    let body = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(http)?;
    serde_json::from_str(&body).map_err(|source| SourceError::Json {
        origin: url.to_string(),
        source,
    })
}

#[cfg(not(feature = "remote"))]
fn fetch(url: &str) -> Result<Vec<Event>, SourceError> {
    Err(SourceError::RemoteDisabled(url.to_string()))
}
