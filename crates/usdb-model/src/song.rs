use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Value of the `source` field on every result produced by this system.
pub const USDB_SOURCE: &str = "USDB";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("missing query")]
    Empty,
}

/// A validated search string: trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON body accepted by the search entrypoint: `{ "query": string }`.
///
/// A missing `query` deserializes to the empty string so that it is
/// reported the same way as a blank one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

impl SearchRequest {
    pub fn search_query(&self) -> Result<SearchQuery, QueryError> {
        SearchQuery::parse(&self.query)
    }
}

/// A downloaded and extracted lyrics file, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongResult {
    pub artist: String,
    pub title: String,
    /// Full text of the first `.txt` entry in the song's archive.
    #[serde(rename = "txt")]
    pub lyrics_text: String,
    pub source: String,
}

impl SongResult {
    pub fn new(artist: impl Into<String>, title: impl Into<String>, lyrics_text: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            lyrics_text: lyrics_text.into(),
            source: USDB_SOURCE.to_string(),
        }
    }
}
