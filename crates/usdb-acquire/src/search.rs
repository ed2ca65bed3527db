use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

/// Upper bound on result rows read from one search page.
pub const MAX_ROWS: usize = 10;

/// Minimum cell count for a row to be considered a song entry.
const MIN_COLUMNS: usize = 5;

/// A search result row that may or may not yield a usable lyrics file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub artist: String,
    pub title: String,
    pub download_url: Url,
}

/// Parse the search results page into candidates, in document order.
///
/// Reads `table.songlist`, skips its header row and looks at no more than
/// [`MAX_ROWS`] data rows. A row is dropped if it has fewer than five cells
/// or if its last cell has no link.
pub fn parse_result_rows(html: &str, base_url: &Url) -> Vec<Candidate> {
    let document = Html::parse_document(html);

    let tr_sel = Selector::parse("table.songlist tr").expect("valid selector");
    let td_sel = Selector::parse("td").expect("valid selector");
    let a_sel = Selector::parse("a").expect("valid selector");

    let rows: Vec<ElementRef> = document.select(&tr_sel).skip(1).take(MAX_ROWS).collect();
    tracing::info!(rows = rows.len(), "Found result rows");

    let mut candidates = Vec::new();
    for (index, tr) in rows.into_iter().enumerate() {
        let tds: Vec<ElementRef> = tr.select(&td_sel).collect();
        if tds.len() < MIN_COLUMNS {
            tracing::debug!(row = index, cols = tds.len(), "Skipping row with too few columns");
            continue;
        }

        let artist = cell_text(tds[0]);
        let title = cell_text(tds[1]);

        let href = tds[tds.len() - 1]
            .select(&a_sel)
            .next()
            .and_then(|a| a.value().attr("href"));
        let Some(href) = href else {
            tracing::debug!(row = index, "Skipping row without download link");
            continue;
        };

        let download_url = match base_url.join(href.trim()) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(row = index, href, error = %e, "Skipping row with unusable link");
                continue;
            }
        };

        candidates.push(Candidate {
            artist,
            title,
            download_url,
        });
    }

    candidates
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
