mod extractor;
mod models;

pub use extractor::{
    extract_page, extract_saved_tracks, flatten_genres, page_count, resolve_artist_genres,
    MAX_PAGE_LIMIT,
};
pub use models::{ExtractedPage, ExtractionOutcome, SavedTrackRecord};
