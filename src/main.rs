//! CLI entry point for pluck

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use pluck::{
    OverwritePolicy, PackageIndex, Report, build_manifest, extract_from_file, output_base,
    print_json, print_no_modules, print_summary, resolve_output_path, warn_duplicates,
    write_manifest,
};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            // Respect FORCE_COLOR environment variable
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            // Respect TERM=dumb
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            // Check if stdout is a TTY
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pluck")]
#[command(about = "Export a Python file's third-party imports as a requirements manifest")]
#[command(version)]
struct Args {
    /// Python source file to scan
    file: PathBuf,

    /// Output file name
    #[arg(short, long, default_value = "requirements.txt")]
    output: String,

    /// Overwrite an existing output file without asking
    #[arg(short, long, conflicts_with = "auto_number")]
    quiet: bool,

    /// On collision, write to the first unused "requirements<N>.txt"
    #[arg(short = 'a', long = "auto-number")]
    auto_number: bool,

    /// Write the manifest next to the source file instead of the current directory
    #[arg(short = 's', long = "alongside")]
    alongside: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Report modules and classifications as JSON instead of the human summary
    #[arg(long = "json")]
    json: bool,
}

impl Args {
    fn overwrite_policy(&self) -> OverwritePolicy {
        if self.quiet {
            OverwritePolicy::Overwrite
        } else if self.auto_number {
            OverwritePolicy::AutoNumber
        } else {
            OverwritePolicy::Ask
        }
    }
}

/// Stdin-backed confirmation used for the default Ask policy.
///
/// A closed or non-interactive stdin reads as a decline, which falls
/// back to auto-numbering.
fn ask_overwrite(path: &Path) -> bool {
    eprint!("pluck: '{}' exists, overwrite? [y/N] ", path.display());
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn run(args: &Args) -> io::Result<()> {
    let use_color = should_use_color(args.color);

    let found = match extract_from_file(&args.file) {
        Ok(found) => found,
        Err(e) => {
            eprintln!("pluck: {}", e);
            process::exit(1);
        }
    };

    warn_duplicates(&found.duplicates, use_color)?;

    let index = PackageIndex::discover();
    let requirements = build_manifest(&found.modules, &index);

    if requirements.is_empty() {
        if args.json {
            print_json(&Report::new(&args.file, None, &found, &index))?;
        } else {
            print_no_modules(&args.file, &found, use_color)?;
        }
        return Ok(());
    }

    let base = output_base(&args.file, &args.output, args.alongside);
    let path = resolve_output_path(&base, args.overwrite_policy(), ask_overwrite);

    if let Err(e) = write_manifest(&path, &requirements) {
        eprintln!("pluck: {}", e);
        process::exit(1);
    }

    if args.json {
        print_json(&Report::new(&args.file, Some(&path), &found, &index))?;
    } else {
        print_summary(&requirements, &path, use_color)?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("pluck: error writing output: {}", e);
        process::exit(1);
    }
}
