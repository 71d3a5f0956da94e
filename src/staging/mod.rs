//! Local emulation of the warehouse COPY command, used by the SQLite backend.

mod jsonpath;
mod loader;

pub use jsonpath::{parse_jsonpaths_file, JsonPath};
pub use loader::load_copy;
