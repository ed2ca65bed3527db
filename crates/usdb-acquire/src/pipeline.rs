use crate::config::UsdbConfig;
use crate::error::UsdbError;
use crate::session::UsdbSession;
use usdb_model::{SearchQuery, SongResult};

/// Maximum number of songs returned per run.
pub const MAX_RESULTS: usize = 3;

/// Log in, search, and collect up to [`MAX_RESULTS`] lyrics files.
///
/// Candidates are processed one at a time in page order. A candidate whose
/// download or extraction fails is skipped; once the cap is reached the
/// remaining candidates are left untouched. Login and search failures abort
/// the run.
pub async fn fetch_songs(config: &UsdbConfig, query: &SearchQuery) -> Result<Vec<SongResult>, UsdbError> {
    let session = UsdbSession::login(config).await?;
    let candidates = session.search(query).await?;

    let mut results = Vec::new();
    for (index, candidate) in candidates.iter().enumerate() {
        if results.len() >= MAX_RESULTS {
            break;
        }
        tracing::info!(row = index + 1, artist = %candidate.artist, title = %candidate.title, "Processing candidate");

        match session.fetch_lyrics(candidate).await {
            Ok(lyrics) => {
                tracing::info!(artist = %candidate.artist, title = %candidate.title, "Fetched lyrics");
                results.push(SongResult::new(&candidate.artist, &candidate.title, lyrics));
            }
            Err(reason) => {
                tracing::warn!(url = %candidate.download_url, reason = %reason, "Skipping candidate");
            }
        }
    }

    tracing::info!(songs = results.len(), "Search finished");
    Ok(results)
}
