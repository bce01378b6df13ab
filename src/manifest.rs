//! Package unpacking and manifest parsing.
//!
//! A package is a zip archive with a `manifest.ini` at its root. The whole
//! archive is unpacked into the scratch directory, then the manifest is
//! read into a [`ManifestView`].

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::errors::{Result, ValidatorError};
use crate::fs_util::{is_regular_dir, is_regular_file};

/// Name of the manifest file at the archive root.
pub const MANIFEST_FILE_NAME: &str = "manifest.ini";

/// Directory inside the scratch directory that receives the unpacked tree.
pub const EXTRACT_DIR_NAME: &str = "nvda-addon";

/// Manifest keys the cross-validation depends on.
pub const REQUIRED_KEYS: &[&str] = &["name", "summary", "description", "url", "version"];

/// Read-only view of a package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestView {
    pub name: String,
    pub summary: String,
    pub description: String,
    pub url: String,
    pub version: String,
    entries: BTreeMap<String, String>,
}

impl ManifestView {
    /// Parse manifest text, requiring every key in [`REQUIRED_KEYS`].
    pub fn parse(content: &str) -> Result<Self> {
        Self::from_entries(parse_entries(content)?)
    }

    /// Build a view from already-parsed entries.
    pub fn from_entries(entries: BTreeMap<String, String>) -> Result<Self> {
        let take = |key: &str| {
            entries.get(key).cloned().ok_or_else(|| {
                ValidatorError::format(format!("manifest is missing required key '{key}'"))
            })
        };
        Ok(Self {
            name: take("name")?,
            summary: take("summary")?,
            description: take("description")?,
            url: take("url")?,
            version: take("version")?,
            entries,
        })
    }

    /// Look up any top-level manifest key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Parse `key = value` manifest text into a map.
///
/// Supports `#`/`;` comment lines, single- and double-quoted values, and
/// triple-quoted values spanning several lines. A `[section]` header ends
/// the top-level keys; nothing after it is read.
pub fn parse_entries(content: &str) -> Result<BTreeMap<String, String>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut entries = BTreeMap::new();
    let mut lines = content.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            break;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(ValidatorError::format(format!(
                "manifest line {line_no}: expected 'key = value'"
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ValidatorError::format(format!(
                "manifest line {line_no}: empty key"
            )));
        }
        let value = value.trim();

        let parsed = if let Some(delim) = ["\"\"\"", "'''"]
            .into_iter()
            .find(|d| value.starts_with(d))
        {
            parse_triple_quoted(&value[3..], delim, &mut lines.by_ref().map(|(_, l)| l))
                .ok_or_else(|| {
                    ValidatorError::format(format!(
                        "manifest line {line_no}: unterminated {delim} value for '{key}'"
                    ))
                })?
        } else {
            parse_single_line(value).ok_or_else(|| {
                ValidatorError::format(format!(
                    "manifest line {line_no}: unterminated quote in value for '{key}'"
                ))
            })?
        };

        if entries.insert(key.to_string(), parsed).is_some() {
            return Err(ValidatorError::format(format!(
                "manifest line {line_no}: duplicate key '{key}'"
            )));
        }
    }
    Ok(entries)
}

/// Unquote a value that fits on one line. `None` on an unterminated quote.
fn parse_single_line(value: &str) -> Option<String> {
    let mut chars = value.chars();
    match chars.next() {
        Some(q @ ('"' | '\'')) => {
            let rest = chars.as_str();
            let end = rest.find(q)?;
            Some(rest[..end].to_string())
        }
        _ => {
            // Any `#` in an unquoted value starts a comment; quote values
            // that need one.
            let end = value.find('#').unwrap_or(value.len());
            Some(value[..end].trim_end().to_string())
        }
    }
}

/// Collect a triple-quoted value starting right after the opening delimiter.
fn parse_triple_quoted<'a>(
    first: &str,
    delim: &str,
    rest: &mut dyn Iterator<Item = &'a str>,
) -> Option<String> {
    if let Some(end) = first.find(delim) {
        return Some(first[..end].to_string());
    }
    let mut parts = vec![first.to_string()];
    for line in rest {
        if let Some(end) = line.find(delim) {
            parts.push(line[..end].to_string());
            return Some(parts.join("\n"));
        }
        parts.push(line.to_string());
    }
    None
}

/// Unpack every entry of the zip archive at `archive` into `dest`.
///
/// `dest` is emptied first. Entries whose names would land outside `dest`
/// are rejected. Returns the relative paths of the files written.
pub fn unpack_archive(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    if dest.exists() {
        if !is_regular_dir(dest) {
            return Err(ValidatorError::format(format!(
                "extraction target {} is not a directory",
                dest.display()
            )));
        }
        fs::remove_dir_all(dest)?;
    }
    fs::create_dir_all(dest)?;

    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|e| {
        ValidatorError::format(format!("corrupt archive {}: {e}", archive.display()))
    })?;

    let mut written = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| ValidatorError::format(format!("corrupt archive entry #{i}: {e}")))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(ValidatorError::format(format!(
                "archive entry escapes extraction directory: {}",
                entry.name()
            )));
        };
        let out = dest.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut target = File::create(&out)?;
        io::copy(&mut entry, &mut target).map_err(|e| {
            ValidatorError::format(format!(
                "corrupt archive entry {}: {e}",
                relative.display()
            ))
        })?;
        written.push(relative);
    }
    tracing::debug!(files = written.len(), dest = %dest.display(), "archive unpacked");
    Ok(written)
}

/// Unpack `archive` under `scratch_dir` and read its manifest.
pub fn extract(archive: &Path, scratch_dir: &Path) -> Result<ManifestView> {
    let expanded = scratch_dir.join(EXTRACT_DIR_NAME);
    unpack_archive(archive, &expanded)?;

    let manifest_path = expanded.join(MANIFEST_FILE_NAME);
    if !is_regular_file(&manifest_path) {
        return Err(ValidatorError::format(format!(
            "{MANIFEST_FILE_NAME} not found at the root of the archive"
        )));
    }
    let content = fs::read_to_string(&manifest_path).map_err(|e| {
        ValidatorError::format(format!("{MANIFEST_FILE_NAME} is unreadable: {e}"))
    })?;
    ManifestView::parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    const MANIFEST: &str = "name = myaddon\n\
        summary = \"MyAddon\"\n\
        description = \"\"\"D\"\"\"\n\
        author = \"Someone <someone@example.com>\"\n\
        url = https://h\n\
        version = 1.0\n";

    fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, content) in files {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    // ── parser ──────────────────────────────────────────────────────

    #[test]
    fn parse_reads_required_keys() {
        let m = ManifestView::parse(MANIFEST).unwrap();
        assert_eq!(m.name, "myaddon");
        assert_eq!(m.summary, "MyAddon");
        assert_eq!(m.description, "D");
        assert_eq!(m.url, "https://h");
        assert_eq!(m.version, "1.0");
        assert_eq!(m.get("author"), Some("Someone <someone@example.com>"));
    }

    #[test]
    fn parse_multiline_triple_quoted() {
        let text = "description = \"\"\"first\nsecond\nthird\"\"\"\nname = x\n";
        let entries = parse_entries(text).unwrap();
        assert_eq!(entries["description"], "first\nsecond\nthird");
        assert_eq!(entries["name"], "x");
    }

    #[test]
    fn parse_single_quoted_and_comments() {
        let text = "# comment\n; other comment\n\nsummary = 'Quoted # not comment'\nurl = https://h # trailing\n";
        let entries = parse_entries(text).unwrap();
        assert_eq!(entries["summary"], "Quoted # not comment");
        assert_eq!(entries["url"], "https://h");
    }

    #[test]
    fn parse_hash_in_unquoted_value_starts_comment() {
        let entries = parse_entries("url = https://h/#anchor\nversion = 1.0#beta\n").unwrap();
        assert_eq!(entries["url"], "https://h/");
        assert_eq!(entries["version"], "1.0");
    }

    #[test]
    fn parse_quoted_value_keeps_hash() {
        let entries = parse_entries("url = \"https://h/#anchor\"\n").unwrap();
        assert_eq!(entries["url"], "https://h/#anchor");
    }

    #[test]
    fn parse_stops_at_section_header() {
        let text = "name = x\n[translations]\nname = y\n";
        let entries = parse_entries(text).unwrap();
        assert_eq!(entries["name"], "x");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn parse_strips_byte_order_mark() {
        let entries = parse_entries("\u{feff}name = x\n").unwrap();
        assert_eq!(entries["name"], "x");
    }

    #[test]
    fn parse_rejects_line_without_equals() {
        let err = parse_entries("name = x\nthis is junk\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn parse_rejects_duplicate_key() {
        assert!(parse_entries("name = x\nname = y\n").is_err());
    }

    #[test]
    fn parse_rejects_unterminated_triple_quote() {
        assert!(parse_entries("description = \"\"\"open\nstill open\n").is_err());
    }

    #[test]
    fn parse_rejects_unterminated_quote() {
        assert!(parse_entries("summary = \"open\n").is_err());
    }

    #[test]
    fn missing_required_key_is_format_error() {
        let text = MANIFEST.replace("version = 1.0\n", "");
        let err = ManifestView::parse(&text).unwrap_err();
        assert!(matches!(err, ValidatorError::Format { .. }));
        assert!(err.to_string().contains("version"));
    }

    // ── extraction ──────────────────────────────────────────────────

    #[test]
    fn extract_reads_root_manifest() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("addon.nvda-addon");
        write_zip(
            &archive,
            &[
                (MANIFEST_FILE_NAME, MANIFEST),
                ("globalPlugins/myaddon/__init__.py", "pass\n"),
            ],
        );
        let m = extract(&archive, dir.path()).unwrap();
        assert_eq!(m.version, "1.0");
        let unpacked = dir.path().join(EXTRACT_DIR_NAME);
        assert!(unpacked.join("globalPlugins/myaddon/__init__.py").is_file());
    }

    #[test]
    fn extract_without_manifest_is_format_error() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("addon.nvda-addon");
        write_zip(&archive, &[("readme.txt", "hi")]);
        let err = extract(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, ValidatorError::Format { .. }));
        assert!(err.to_string().contains(MANIFEST_FILE_NAME));
    }

    #[test]
    fn nested_manifest_does_not_count() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("addon.nvda-addon");
        write_zip(&archive, &[("inner/manifest.ini", MANIFEST)]);
        assert!(extract(&archive, dir.path()).is_err());
    }

    #[test]
    fn corrupt_archive_is_format_error() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("addon.nvda-addon");
        fs::write(&archive, b"this is not a zip file").unwrap();
        let err = extract(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, ValidatorError::Format { .. }));
    }

    #[test]
    fn stale_files_are_cleared_before_unpacking() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.nvda-addon");
        write_zip(&first, &[(MANIFEST_FILE_NAME, MANIFEST)]);
        extract(&first, dir.path()).unwrap();

        let second = dir.path().join("second.nvda-addon");
        write_zip(&second, &[("readme.txt", "no manifest here")]);
        assert!(extract(&second, dir.path()).is_err());
    }

    #[test]
    fn unpack_rejects_escaping_entry() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("evil.nvda-addon");
        write_zip(&archive, &[("../escape.txt", "x")]);
        let err = unpack_archive(&archive, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, ValidatorError::Format { .. }));
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[test]
    fn unpack_lists_written_files() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("a.nvda-addon");
        write_zip(&archive, &[("a.txt", "a"), ("sub/b.txt", "b")]);
        let files = unpack_archive(&archive, &dir.path().join("out")).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.contains(&PathBuf::from("sub/b.txt")));
    }
}
