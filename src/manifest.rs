//! Classification and manifest export
//!
//! Takes the extractor's module set, drops standard-library names,
//! annotates the rest with installed versions, and writes the sorted
//! manifest. Output-path collisions are resolved through an explicit
//! policy plus a caller-supplied confirmation callback, so nothing in
//! here touches a terminal.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::index::PackageIndex;
use crate::stdlib::is_stdlib;

/// Where a discovered module comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Ships with the language distribution; excluded from the manifest.
    Stdlib,
    /// Installed locally with a discoverable version.
    Installed(String),
    /// Not found locally; emitted unpinned so it can be installed manually.
    Unresolved,
}

/// Classify one module against the stdlib table and the package index.
pub fn classify(module: &str, index: &PackageIndex) -> Classification {
    if is_stdlib(module) {
        return Classification::Stdlib;
    }
    match index.version_of(module) {
        Some(version) => Classification::Installed(version.to_string()),
        None => Classification::Unresolved,
    }
}

/// One line of the exported manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}=={}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Classify a module set into manifest entries, dropping stdlib names.
///
/// The input set iterates in byte order, so entries come out sorted.
pub fn build_manifest(modules: &BTreeSet<String>, index: &PackageIndex) -> Vec<Requirement> {
    modules
        .iter()
        .filter_map(|name| match classify(name, index) {
            Classification::Stdlib => None,
            Classification::Installed(version) => Some(Requirement {
                name: name.clone(),
                version: Some(version),
            }),
            Classification::Unresolved => Some(Requirement {
                name: name.clone(),
                version: None,
            }),
        })
        .collect()
}

/// Render manifest lines, one entry per line, trailing newline included.
pub fn render(requirements: &[Requirement]) -> String {
    let mut out = String::new();
    for requirement in requirements {
        out.push_str(&requirement.to_string());
        out.push('\n');
    }
    out
}

/// Write the manifest to `path`.
pub fn write_manifest(path: &Path, requirements: &[Requirement]) -> Result<(), Error> {
    fs::write(path, render(requirements)).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// How to handle an existing file at the output path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Ask the caller's `confirm` callback before overwriting; a declined
    /// overwrite falls back to auto-numbering.
    #[default]
    Ask,
    /// Overwrite in place.
    Overwrite,
    /// Pick the first unused `stemN.ext` name.
    AutoNumber,
}

/// Base output path before collision handling.
///
/// `alongside` places the manifest in the source file's directory;
/// otherwise the name resolves against the current directory.
pub fn output_base(source: &Path, output_name: &str, alongside: bool) -> PathBuf {
    if alongside {
        match source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(output_name),
            _ => PathBuf::from(output_name),
        }
    } else {
        PathBuf::from(output_name)
    }
}

/// Resolve the final output path for `base` under `policy`.
///
/// `confirm` is only consulted for [`OverwritePolicy::Ask`], and only
/// when `base` already exists.
pub fn resolve_output_path(
    base: &Path,
    policy: OverwritePolicy,
    mut confirm: impl FnMut(&Path) -> bool,
) -> PathBuf {
    if !base.exists() {
        return base.to_path_buf();
    }
    match policy {
        OverwritePolicy::Overwrite => base.to_path_buf(),
        OverwritePolicy::AutoNumber => numbered(base),
        OverwritePolicy::Ask => {
            if confirm(base) {
                base.to_path_buf()
            } else {
                numbered(base)
            }
        }
    }
}

/// First unused `stemN.ext` next to `base`.
fn numbered(base: &Path) -> PathBuf {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("requirements");
    let extension = base.extension().and_then(|s| s.to_str());

    let mut n: u32 = 1;
    loop {
        let name = match extension {
            Some(ext) => format!("{stem}{n}.{ext}"),
            None => format!("{stem}{n}"),
        };
        let candidate = base.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn index_with(dir_name: &str) -> (TempDir, PackageIndex) {
        let site = TempDir::new().unwrap();
        fs::create_dir_all(site.path().join(format!("{dir_name}.dist-info"))).unwrap();
        let index = PackageIndex::scan(&[site.path().to_path_buf()]);
        (site, index)
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_stdlib() {
        assert_eq!(
            classify("os", &PackageIndex::empty()),
            Classification::Stdlib
        );
    }

    #[test]
    fn test_classify_installed() {
        let (_site, index) = index_with("requests-2.31.0");
        assert_eq!(
            classify("requests", &index),
            Classification::Installed("2.31.0".to_string())
        );
    }

    #[test]
    fn test_classify_unresolved() {
        assert_eq!(
            classify("numpy", &PackageIndex::empty()),
            Classification::Unresolved
        );
    }

    #[test]
    fn test_build_manifest_excludes_stdlib() {
        let manifest = build_manifest(&set(&["os", "requests", "numpy"]), &PackageIndex::empty());
        let names: Vec<&str> = manifest.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["numpy", "requests"]);
    }

    #[test]
    fn test_build_manifest_pins_installed_versions() {
        let (_site, index) = index_with("requests-2.31.0");
        let manifest = build_manifest(&set(&["requests", "numpy"]), &index);
        assert_eq!(manifest[1].to_string(), "requests==2.31.0");
        assert_eq!(manifest[0].to_string(), "numpy");
    }

    #[test]
    fn test_render_has_trailing_newline() {
        let manifest = build_manifest(&set(&["numpy", "requests"]), &PackageIndex::empty());
        assert_eq!(render(&manifest), "numpy\nrequests\n");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_sort_is_case_sensitive() {
        let manifest = build_manifest(&set(&["apple", "Zebra"]), &PackageIndex::empty());
        let names: Vec<&str> = manifest.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Zebra", "apple"]);
    }

    #[test]
    fn test_write_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("requirements.txt");
        let manifest = build_manifest(&set(&["numpy"]), &PackageIndex::empty());

        write_manifest(&path, &manifest).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "numpy\n");
    }

    #[test]
    fn test_write_manifest_bad_path() {
        let manifest = build_manifest(&set(&["numpy"]), &PackageIndex::empty());
        let err = write_manifest(Path::new("/nonexistent/dir/requirements.txt"), &manifest)
            .unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn test_output_base_default_is_bare_name() {
        let base = output_base(Path::new("project/script.py"), "requirements.txt", false);
        assert_eq!(base, PathBuf::from("requirements.txt"));
    }

    #[test]
    fn test_output_base_alongside_source() {
        let base = output_base(Path::new("project/script.py"), "requirements.txt", true);
        assert_eq!(base, PathBuf::from("project/requirements.txt"));
    }

    #[test]
    fn test_output_base_alongside_bare_source() {
        let base = output_base(Path::new("script.py"), "requirements.txt", true);
        assert_eq!(base, PathBuf::from("requirements.txt"));
    }

    #[test]
    fn test_resolve_no_collision_keeps_base() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("requirements.txt");
        let resolved = resolve_output_path(&base, OverwritePolicy::Ask, |_| {
            panic!("confirm must not run without a collision")
        });
        assert_eq!(resolved, base);
    }

    #[test]
    fn test_resolve_overwrite() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("requirements.txt");
        fs::write(&base, "old\n").unwrap();

        let resolved = resolve_output_path(&base, OverwritePolicy::Overwrite, |_| {
            panic!("confirm must not run for the quiet policy")
        });
        assert_eq!(resolved, base);
    }

    #[test]
    fn test_resolve_auto_number() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("requirements.txt");
        fs::write(&base, "old\n").unwrap();
        fs::write(dir.path().join("requirements1.txt"), "older\n").unwrap();

        let resolved = resolve_output_path(&base, OverwritePolicy::AutoNumber, |_| false);
        assert_eq!(resolved, dir.path().join("requirements2.txt"));
    }

    #[test]
    fn test_resolve_ask_accepted_overwrites() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("requirements.txt");
        fs::write(&base, "old\n").unwrap();

        let resolved = resolve_output_path(&base, OverwritePolicy::Ask, |_| true);
        assert_eq!(resolved, base);
    }

    #[test]
    fn test_resolve_ask_declined_numbers() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("requirements.txt");
        fs::write(&base, "old\n").unwrap();

        let resolved = resolve_output_path(&base, OverwritePolicy::Ask, |_| false);
        assert_eq!(resolved, dir.path().join("requirements1.txt"));
    }

    #[test]
    fn test_numbered_respects_custom_name() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("deps.txt");
        fs::write(&base, "old\n").unwrap();

        let resolved = resolve_output_path(&base, OverwritePolicy::AutoNumber, |_| false);
        assert_eq!(resolved, dir.path().join("deps1.txt"));
    }
}
