//! Import statement extraction from Python source
//!
//! Line-level pattern matching over the two syntactic forms
//! (`import a, b` and `from a.b import c`). This is a syntactic
//! approximation, not a parser: multi-line, conditional, and dynamic
//! imports are not recognized.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::Error;

static IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*import\s+([\w.,\s]+)").expect("IMPORT_LINE regex is invalid")
});

static FROM_IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*from\s+([\w.]+)\s+import\s").expect("FROM_IMPORT_LINE regex is invalid")
});

/// A module imported again after its first appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateImport {
    pub line: usize,
    pub name: String,
}

/// Result of scanning one source file.
#[derive(Debug, Default)]
pub struct ExtractedImports {
    /// Unique top-level module names, in sorted order.
    pub modules: BTreeSet<String>,
    /// Re-imports noticed on later lines, in file order.
    pub duplicates: Vec<DuplicateImport>,
}

impl ExtractedImports {
    fn record(&mut self, name: &str, line: usize) {
        if name.is_empty() {
            return;
        }
        if self.modules.contains(name) {
            self.duplicates.push(DuplicateImport {
                line,
                name: name.to_string(),
            });
        } else {
            self.modules.insert(name.to_string());
        }
    }
}

/// Extract top-level module names from Python source text.
///
/// `import a.b as x, c` yields `a` and `c`; `from a.b import c` yields
/// `a`. Relative imports (`from . import x`) reference the scanned
/// project itself and are skipped.
pub fn extract_imports(content: &str) -> ExtractedImports {
    let mut found = ExtractedImports::default();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(caps) = IMPORT_LINE.captures(line) {
            if let Some(list) = caps.get(1) {
                for item in list.as_str().split(',') {
                    found.record(root_module(item), line_no);
                }
            }
        } else if let Some(caps) = FROM_IMPORT_LINE.captures(line) {
            if let Some(path) = caps.get(1) {
                found.record(root_module(path.as_str()), line_no);
            }
        }
    }

    found
}

/// Scan a Python source file.
///
/// A missing file surfaces as [`Error::FileNotFound`] rather than a raw
/// io error so the CLI can report it in one line.
pub fn extract_from_file(path: &Path) -> Result<ExtractedImports, Error> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(extract_imports(&content))
}

/// First dot-separated segment of an import item, alias stripped.
fn root_module(item: &str) -> &str {
    let name = item.trim().split_whitespace().next().unwrap_or("");
    name.split('.').next().unwrap_or("")
}
