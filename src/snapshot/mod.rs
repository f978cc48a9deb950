mod schema;
mod store;

pub use schema::ENRICHED_TRACKS_TABLE;
pub use store::{read_snapshot, snapshot_file_name, snapshot_path, write_snapshot};
