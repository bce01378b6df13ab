//! Cross-checks between the metadata file, the package checksum, and the
//! package manifest.
//!
//! Every check always runs; each contributes at most one diagnostic. All
//! comparisons are exact string equality.

use std::path::Path;

use crate::diagnostics::{Diagnostic, Severity, D001, D002, D003, D004, D005, D006};
use crate::manifest::ManifestView;
use crate::models::MetadataRecord;

/// Name of the directory that contains the metadata file, or `""`.
#[must_use]
pub fn folder_name(source: &Path) -> String {
    source
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Base name of the metadata file without its extension, or `""`.
#[must_use]
pub fn file_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare the computed digest with the declared one.
#[must_use]
pub fn check_sha256(record: &MetadataRecord, digest: &str) -> Option<Diagnostic> {
    (digest != record.sha256).then(|| {
        Diagnostic::new(
            Severity::Error,
            D001,
            format!("Set sha256 to {digest} in json file"),
        )
        .with_field("sha256")
        .with_expected(digest)
    })
}

/// Compare manifest identity fields with the metadata and its location.
#[must_use]
pub fn check_manifest(
    record: &MetadataRecord,
    manifest: &ManifestView,
    source: &Path,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    if manifest.summary != record.name {
        diags.push(
            Diagnostic::new(
                Severity::Error,
                D002,
                format!("Set name to {} in json file", manifest.summary),
            )
            .with_field("name")
            .with_expected(&manifest.summary),
        );
    }

    if manifest.description != record.description {
        diags.push(
            Diagnostic::new(
                Severity::Error,
                D003,
                format!("Set description to {} in json file", manifest.description),
            )
            .with_field("description")
            .with_expected(&manifest.description),
        );
    }

    if manifest.url != record.homepage {
        diags.push(
            Diagnostic::new(
                Severity::Error,
                D004,
                format!("Set homepage to {} in json file", manifest.url),
            )
            .with_field("homepage")
            .with_expected(&manifest.url),
        );
    }

    if manifest.name != folder_name(source) {
        diags.push(
            Diagnostic::new(
                Severity::Error,
                D005,
                format!("Place jsonfile in {} folder", manifest.name),
            )
            .with_expected(&manifest.name),
        );
    }

    if manifest.version != file_stem(source) {
        diags.push(
            Diagnostic::new(
                Severity::Error,
                D006,
                format!("Rename jsonfile to {}.json", manifest.version),
            )
            .with_expected(format!("{}.json", manifest.version)),
        );
    }

    diags
}

/// Run every cross-check, in order: checksum first, then manifest fields.
#[must_use]
pub fn cross_validate(
    record: &MetadataRecord,
    digest: &str,
    manifest: &ManifestView,
    source: &Path,
) -> Vec<Diagnostic> {
    let mut diags: Vec<Diagnostic> = check_sha256(record, digest).into_iter().collect();
    diags.extend(check_manifest(record, manifest, source));
    diags
}
