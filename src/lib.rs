//! Pluck - export a Python file's third-party imports as a requirements manifest

pub mod error;
pub mod extract;
pub mod index;
pub mod manifest;
pub mod output;
pub mod stdlib;

pub use error::Error;
pub use extract::{DuplicateImport, ExtractedImports, extract_from_file, extract_imports};
pub use index::PackageIndex;
pub use manifest::{
    Classification, OverwritePolicy, Requirement, build_manifest, classify, output_base, render,
    resolve_output_path, write_manifest,
};
pub use output::{Report, print_json, print_no_modules, print_summary, warn_duplicates};
pub use stdlib::is_stdlib;
