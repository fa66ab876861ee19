//! Reading staged snapshot files

mod reader;

pub use reader::{read_snapshot_file, read_snapshot_str, read_staged};
