//! Parsing of source-tree inputs

pub mod manifest;

pub use manifest::{parse_manifest, parse_manifest_from_dir, MANIFEST_FILE_NAME};
