//! Console and JSON reporting

use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::extract::{DuplicateImport, ExtractedImports};
use crate::index::PackageIndex;
use crate::manifest::{Classification, Requirement, classify};

/// Machine-readable run report for `--json`.
#[derive(Debug, Serialize)]
pub struct Report {
    pub file: String,
    /// Absent when nothing was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub modules: Vec<ModuleReport>,
    pub duplicates: Vec<DuplicateImport>,
}

#[derive(Debug, Serialize)]
pub struct ModuleReport {
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Report {
    pub fn new(
        file: &Path,
        output: Option<&Path>,
        found: &ExtractedImports,
        index: &PackageIndex,
    ) -> Self {
        let modules = found
            .modules
            .iter()
            .map(|name| {
                let (kind, version) = match classify(name, index) {
                    Classification::Stdlib => ("stdlib", None),
                    Classification::Installed(version) => ("installed", Some(version)),
                    Classification::Unresolved => ("unresolved", None),
                };
                ModuleReport {
                    name: name.clone(),
                    kind,
                    version,
                }
            })
            .collect();

        Self {
            file: file.display().to_string(),
            output: output.map(|p| p.display().to_string()),
            modules,
            duplicates: found.duplicates.clone(),
        }
    }
}

/// Print the run report as pretty-printed JSON to stdout.
pub fn print_json(report: &Report) -> io::Result<()> {
    let json =
        serde_json::to_string_pretty(report).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    println!("{}", json);
    Ok(())
}

fn color_choice(use_color: bool) -> ColorChoice {
    if use_color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Print duplicate-import advisories to stderr.
pub fn warn_duplicates(duplicates: &[DuplicateImport], use_color: bool) -> io::Result<()> {
    if duplicates.is_empty() {
        return Ok(());
    }
    let mut stderr = StandardStream::stderr(color_choice(use_color));

    let mut warn = ColorSpec::new();
    warn.set_fg(Some(Color::Yellow)).set_bold(true);

    for duplicate in duplicates {
        stderr.set_color(&warn)?;
        write!(stderr, "warning")?;
        stderr.reset()?;
        writeln!(
            stderr,
            ": duplicate import '{}' on line {}",
            duplicate.name, duplicate.line
        )?;
    }
    Ok(())
}

/// Print the human summary after a successful export.
pub fn print_summary(requirements: &[Requirement], output: &Path, use_color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(use_color));

    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    let mut path_color = ColorSpec::new();
    path_color.set_fg(Some(Color::Cyan));

    write!(stdout, "Exported ")?;
    stdout.set_color(&bold)?;
    write!(stdout, "{}", requirements.len())?;
    stdout.reset()?;
    let plural = if requirements.len() == 1 { "" } else { "s" };
    write!(stdout, " module{} to ", plural)?;
    stdout.set_color(&path_color)?;
    write!(stdout, "{}", output.display())?;
    stdout.reset()?;
    writeln!(stdout)?;
    Ok(())
}

/// Notice for a scan that found nothing worth exporting.
pub fn print_no_modules(file: &Path, found: &ExtractedImports, use_color: bool) -> io::Result<()> {
    let mut stderr = StandardStream::stderr(color_choice(use_color));

    let what = if found.modules.is_empty() {
        "no import statements"
    } else {
        "no third-party modules"
    };

    let mut notice = ColorSpec::new();
    notice.set_fg(Some(Color::Yellow));
    stderr.set_color(&notice)?;
    write!(stderr, "{} found in '{}'", what, file.display())?;
    stderr.reset()?;
    writeln!(stderr, "; nothing exported")?;
    Ok(())
}
