//! Writing extracted attendance to disk.

pub mod csv_writer;
pub mod json;

pub use csv_writer::{append_entries, init_csv};
pub use json::{export_to_json, to_pretty_json};
