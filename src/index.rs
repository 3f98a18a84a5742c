//! Installed-package lookup against site-packages metadata
//!
//! Resolves module names to installed versions by scanning the local
//! environment's `site-packages` directories for `*.dist-info` entries.
//! Discovery asks the local interpreter for its site paths; when no
//! interpreter is available the index is empty and every third-party
//! module is exported unpinned.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const SITE_QUERY: &str =
    "import site\nfor p in site.getsitepackages() + [site.getusersitepackages()]:\n    print(p)\n";

/// Map of normalized distribution names to installed versions.
#[derive(Debug, Default)]
pub struct PackageIndex {
    versions: HashMap<String, String>,
}

impl PackageIndex {
    /// An index that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the index for the local environment.
    pub fn discover() -> Self {
        Self::scan(&site_packages_roots())
    }

    /// Build an index from explicit site-packages roots.
    ///
    /// Unreadable roots are skipped; a root with no `*.dist-info`
    /// entries contributes nothing.
    pub fn scan(roots: &[PathBuf]) -> Self {
        let mut versions = HashMap::new();

        for root in roots {
            let Ok(entries) = fs::read_dir(root) else {
                continue;
            };
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                let Some(name) = file_name.to_str() else {
                    continue;
                };
                let Some(stem) = name.strip_suffix(".dist-info") else {
                    continue;
                };
                if let Some((dist, version)) = parse_dist_info(stem, &entry.path()) {
                    versions.insert(normalize(&dist), version);
                }
            }
        }

        Self { versions }
    }

    /// Installed version for a module name, if the distribution is present.
    pub fn version_of(&self, module: &str) -> Option<&str> {
        self.versions.get(&normalize(module)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Name and version for one `*.dist-info` directory.
///
/// The directory name carries an escaped distribution name
/// (`Flask_Cors-4.0.0`); the `METADATA` header carries the canonical one
/// and wins when present.
fn parse_dist_info(stem: &str, dir: &Path) -> Option<(String, String)> {
    let (mut dist, mut version) = match stem.split_once('-') {
        Some((d, v)) => (d.to_string(), v.to_string()),
        None => (stem.to_string(), String::new()),
    };

    if let Ok(metadata) = fs::read_to_string(dir.join("METADATA")) {
        for line in metadata.lines() {
            if line.is_empty() {
                break;
            }
            if let Some(value) = line.strip_prefix("Name:") {
                dist = value.trim().to_string();
            } else if let Some(value) = line.strip_prefix("Version:") {
                version = value.trim().to_string();
            }
        }
    }

    if dist.is_empty() || version.is_empty() {
        return None;
    }
    Some((dist, version))
}

/// PEP-503-style name normalization so `flask_cors` finds `Flask-Cors`:
/// lowercase, runs of `-`, `_`, and `.` fold to a single `-`.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars() {
        if c == '-' || c == '_' || c == '.' {
            pending_sep = !out.is_empty();
        } else {
            if pending_sep {
                out.push('-');
                pending_sep = false;
            }
            out.push(c.to_ascii_lowercase());
        }
    }

    out
}

fn site_packages_roots() -> Vec<PathBuf> {
    for python in ["python3", "python"] {
        let Ok(output) = Command::new(python).args(["-c", SITE_QUERY]).output() else {
            continue;
        };
        if !output.status.success() {
            continue;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let roots: Vec<PathBuf> = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect();
        if !roots.is_empty() {
            return roots;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_dist_info(root: &Path, dir_name: &str, metadata: Option<&str>) {
        let dir = root.join(format!("{dir_name}.dist-info"));
        fs::create_dir_all(&dir).unwrap();
        if let Some(content) = metadata {
            fs::write(dir.join("METADATA"), content).unwrap();
        }
    }

    #[test]
    fn test_scan_reads_directory_names() {
        let site = TempDir::new().unwrap();
        add_dist_info(site.path(), "requests-2.31.0", None);

        let index = PackageIndex::scan(&[site.path().to_path_buf()]);
        assert_eq!(index.version_of("requests"), Some("2.31.0"));
    }

    #[test]
    fn test_metadata_overrides_directory_name() {
        let site = TempDir::new().unwrap();
        add_dist_info(
            site.path(),
            "Flask_Cors-0.0.0",
            Some("Metadata-Version: 2.1\nName: Flask-Cors\nVersion: 4.0.0\n\nDescription body\n"),
        );

        let index = PackageIndex::scan(&[site.path().to_path_buf()]);
        assert_eq!(index.version_of("flask_cors"), Some("4.0.0"));
    }

    #[test]
    fn test_lookup_normalizes_module_name() {
        let site = TempDir::new().unwrap();
        add_dist_info(site.path(), "Flask_Cors-4.0.0", None);

        let index = PackageIndex::scan(&[site.path().to_path_buf()]);
        assert_eq!(index.version_of("flask_cors"), Some("4.0.0"));
        assert_eq!(index.version_of("FLASK.CORS"), Some("4.0.0"));
    }

    #[test]
    fn test_unknown_module_unresolved() {
        let site = TempDir::new().unwrap();
        add_dist_info(site.path(), "requests-2.31.0", None);

        let index = PackageIndex::scan(&[site.path().to_path_buf()]);
        assert_eq!(index.version_of("numpy"), None);
    }

    #[test]
    fn test_missing_root_is_skipped() {
        let index = PackageIndex::scan(&[PathBuf::from("/nonexistent/site-packages")]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_non_dist_info_entries_ignored() {
        let site = TempDir::new().unwrap();
        fs::create_dir_all(site.path().join("requests")).unwrap();
        fs::write(site.path().join("six.py"), "").unwrap();

        let index = PackageIndex::scan(&[site.path().to_path_buf()]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_versionless_entry_ignored() {
        let site = TempDir::new().unwrap();
        add_dist_info(site.path(), "brokenpkg", None);

        let index = PackageIndex::scan(&[site.path().to_path_buf()]);
        assert_eq!(index.version_of("brokenpkg"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Flask-Cors"), "flask-cors");
        assert_eq!(normalize("flask_cors"), "flask-cors");
        assert_eq!(normalize("zope.interface"), "zope-interface");
        assert_eq!(normalize("a--__b"), "a-b");
        assert_eq!(normalize("requests"), "requests");
    }
}
