//! The validation pipeline.
//!
//! Order: schema check, download, checksum, manifest extraction,
//! cross-validation. Schema, transport and format failures abort with an
//! error; content discrepancies accumulate in [`Outcome::diagnostics`].

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::checksum::sha256_path;
use crate::config::ValidateOptions;
use crate::cross::{check_manifest, check_sha256};
use crate::diagnostics::{Diagnostic, Severity};
use crate::errors::{Result, ValidatorError};
use crate::fetcher::{fetch_package, PackageFetcher};
use crate::manifest::extract;
use crate::models::{load_metadata, MetadataRecord};
use crate::reporter::report;
use crate::schema::SchemaDocument;

/// Status line emitted when the metadata conforms to the schema.
pub const SCHEMA_OK: &str = "Add-on metadata matches json schema";
/// Status line emitted when the declared checksum is correct.
pub const SHA256_OK: &str = "sha256 is valid";
/// Status line emitted when every manifest field agrees with the metadata.
pub const MANIFEST_OK: &str = "Add-on metadata matches manifest";

/// Result of a pipeline run that reached the cross-validation stage.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Metadata file the run was started from.
    pub path: PathBuf,
    /// SHA-256 of the downloaded package.
    pub sha256: String,
    /// Status lines for the stages that passed, in order.
    #[serde(skip)]
    pub status: Vec<String>,
    /// Schema warnings (lenient mode) followed by content discrepancies.
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Run every stage for the metadata file at `path`.
///
/// Content discrepancies do not make this fail; pass the outcome to
/// [`report`] (or use [`validate_submission`]) for the final verdict.
pub fn run(
    path: &Path,
    options: &ValidateOptions,
    fetcher: &dyn PackageFetcher,
) -> Result<Outcome> {
    run_reporting(path, options, fetcher, &mut |_| {})
}

/// Like [`run`], but hands each status line to `on_status` as soon as its
/// stage passes, so lines from earlier stages survive a later abort.
pub fn run_reporting(
    path: &Path,
    options: &ValidateOptions,
    fetcher: &dyn PackageFetcher,
    on_status: &mut dyn FnMut(&str),
) -> Result<Outcome> {
    let mut status = Vec::new();
    let mut emit = |line: &str| {
        on_status(line);
        status.push(line.to_string());
    };
    let mut diagnostics = Vec::new();

    let raw = load_metadata(path)?;

    let schema = match &options.schema {
        Some(schema_path) => SchemaDocument::from_path(schema_path)?,
        None => SchemaDocument::embedded()?,
    };
    let violations = schema.validate(&raw);
    if violations.is_empty() {
        emit(SCHEMA_OK);
    } else if options.lenient_schema {
        tracing::warn!(
            count = violations.len(),
            "metadata does not match schema; continuing"
        );
        diagnostics.extend(violations.into_iter().map(|mut d| {
            d.severity = Severity::Warning;
            d
        }));
    } else {
        return Err(ValidatorError::SchemaViolation {
            violations: violations.iter().map(ToString::to_string).collect(),
        });
    }

    let record = MetadataRecord::from_value(&raw)?;
    tracing::debug!(url = %record.url, "metadata loaded");

    let archive = fetch_package(fetcher, &record.url, &options.scratch_dir)?;

    let digest = sha256_path(&archive)?;
    tracing::debug!(sha256 = %digest, "package digest computed");
    match check_sha256(&record, &digest) {
        Some(d) => diagnostics.push(d),
        None => emit(SHA256_OK),
    }

    let manifest = extract(&archive, &options.scratch_dir)?;

    let source = resolve_source(path);
    let manifest_diags = check_manifest(&record, &manifest, &source);
    if manifest_diags.is_empty() {
        emit(MANIFEST_OK);
    }
    diagnostics.extend(manifest_diags);

    Ok(Outcome {
        path: path.to_path_buf(),
        sha256: digest,
        status,
        diagnostics,
    })
}

/// Absolute form of the metadata path with `.` and `..` resolved in its
/// directory, so the folder-name check sees a real directory name.
///
/// The file itself is not resolved; symlinks in the directory part are.
fn resolve_source(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match (absolute.parent(), absolute.file_name()) {
        (Some(dir), Some(name)) => match dir.canonicalize() {
            Ok(dir) => dir.join(name),
            Err(_) => absolute,
        },
        _ => absolute,
    }
}

/// Run the pipeline and fail with every discrepancy if any were found.
pub fn validate_submission(
    path: &Path,
    options: &ValidateOptions,
    fetcher: &dyn PackageFetcher,
) -> Result<Outcome> {
    let outcome = run(path, options, fetcher)?;
    report(&outcome.diagnostics)?;
    Ok(outcome)
}
