pub mod checksum;
pub mod config;
pub mod cross;
pub mod diagnostics;
pub mod errors;
pub(crate) mod fs_util;
pub mod fetcher;
pub mod logging;
pub mod manifest;
pub mod models;
pub mod pipeline;
pub mod reporter;
pub mod schema;

// Re-export key types at crate root for convenience.
pub use checksum::{sha256_path, sha256_reader};
pub use config::ValidateOptions;
pub use cross::cross_validate;
pub use diagnostics::{Diagnostic, Severity};
pub use errors::{Result, ValidatorError};
pub use fetcher::{check_url, fetch_package, HttpFetcher, PackageFetcher};
pub use manifest::{extract, ManifestView};
pub use models::{load_metadata, MetadataRecord};
pub use pipeline::{run, run_reporting, validate_submission, Outcome};
pub use reporter::report;
pub use schema::{validate_schema, SchemaDocument};
