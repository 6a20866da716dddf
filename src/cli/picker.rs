//! Interactive comparables-file picker.
//!
//! Used when `comps adjust` or `comps analyze` is run without `-f`. clap still
//! owns every flag; the picker only fills in the input path.
//!
//! Candidates are the `*.csv` files under the working directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// How deep below the working directory to look for CSV files.
const SEARCH_DEPTH: usize = 3;

const NO_FILE_HINT: &str = "Pass a comparables file with `comps adjust -f <file.csv>`.";

/// List the CSV files under the working directory and let the user choose one.
///
/// A number picks from the list, anything else is taken as a path, `q` quits.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::new(2, format!("No .csv files found here. {NO_FILE_HINT}")));
    }

    println!("Comparables files:");
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, display_path(path));
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Pick a file [1-{}], enter a path, or q to quit: ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let Some(line) = lines.next() else {
            return Err(AppError::new(2, format!("No input received. {NO_FILE_HINT}")));
        };
        let line = line.map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        match resolve_choice(line.trim(), &files) {
            Choice::Quit => return Err(AppError::new(2, "Canceled.")),
            Choice::Picked(path) => return Ok(path),
            Choice::Retry(reason) => println!("{reason}"),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Choice {
    Quit,
    Picked(PathBuf),
    Retry(String),
}

fn resolve_choice(input: &str, files: &[PathBuf]) -> Choice {
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    if let Ok(n) = input.parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| files.get(i)) {
            Some(path) => Choice::Picked(path.clone()),
            None => Choice::Retry(format!("No file #{n}; choose 1-{}.", files.len())),
        };
    }
    match validate_csv_path(Path::new(input)) {
        Ok(path) => Choice::Picked(path),
        Err(err) => Choice::Retry(err.to_string()),
    }
}

/// Check that `path` is an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if !path.is_file() {
        return Err(AppError::new(2, format!("Not a file: {}", path.display())));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file, got {}.", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// `*.csv` files under `root`, sorted by display path.
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk(root, 0, &mut out);
    out.sort_by_key(|p| display_path(p));
    out
}

fn walk(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > SEARCH_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            if !is_ignored_dir(&path) {
                walk(&path, depth + 1, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn is_ignored_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name.starts_with('.') || matches!(name, "target" | "node_modules")
}

fn display_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}
