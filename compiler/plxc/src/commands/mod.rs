//! Command implementations for the `plx` binary.
//!
//! Each command writes its report to a caller-supplied writer and returns an
//! [`Outcome`]; per-file failures are collected rather than aborting the run.

mod events;
mod loc;
mod xref;

use std::fs;
use std::path::{Path, PathBuf};

use plx_lexer::XrefLexer;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::CliConfig;
use crate::error::CliError;

pub use events::run_events;
pub use loc::{run_loc, FileLoc, LocReport, LocTotals};
pub use xref::run_xref;

/// A Perl file picked up from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path used in reports and output file names.
    pub relative: PathBuf,
}

/// Result of a multi-file command.
#[derive(Debug, Default)]
pub struct Outcome {
    pub processed: usize,
    pub failures: Vec<CliError>,
}

impl Outcome {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Expand command-line paths into the files to scan.
///
/// Files named explicitly are always included. Directories are walked
/// recursively, skipping hidden entries and keeping files whose extension is
/// in `config.extensions`. The result is sorted by relative path.
pub fn collect_sources(paths: &[PathBuf], config: &CliConfig) -> Result<Vec<SourceFile>, CliError> {
    let mut files = Vec::new();
    for path in paths {
        let meta = fs::metadata(path).map_err(|e| CliError::io(path, e))?;
        if meta.is_dir() {
            visit_dir(path, path, config, &mut files)?;
        } else {
            let relative = path
                .file_name()
                .map_or_else(|| path.clone(), PathBuf::from);
            files.push(SourceFile {
                path: path.clone(),
                relative,
            });
        }
    }
    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    debug!(count = files.len(), "collected source files");
    Ok(files)
}

fn visit_dir(
    dir: &Path,
    root: &Path,
    config: &CliConfig,
    files: &mut Vec<SourceFile>,
) -> Result<(), CliError> {
    let entries = fs::read_dir(dir).map_err(|e| CliError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CliError::io(dir, e))?;
        let path = entry.path();

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        if path.is_dir() {
            visit_dir(&path, root, config, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| config.wants_extension(ext))
        {
            let relative = path.strip_prefix(root).map_or_else(|_| path.clone(), Path::to_path_buf);
            files.push(SourceFile { path, relative });
        }
    }
    Ok(())
}

/// Read a source file, replacing invalid UTF-8.
pub fn read_source(path: &Path) -> Result<String, CliError> {
    let bytes = fs::read(path).map_err(|e| CliError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Scan every file on a dedicated pool of `jobs` workers.
///
/// Each worker reuses one [`XrefLexer`]. Results come back in input order.
pub(crate) fn scan_files<T, F>(
    files: &[SourceFile],
    jobs: usize,
    work: F,
) -> Result<Vec<Result<T, CliError>>, CliError>
where
    T: Send,
    F: Fn(&mut XrefLexer, &SourceFile, &str) -> Result<T, CliError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
    debug!(threads = pool.current_num_threads(), files = files.len(), "scanning");
    Ok(pool.install(|| {
        files
            .par_iter()
            .map_init(XrefLexer::new, |lexer, file| {
                let source = read_source(&file.path)?;
                work(lexer, file, &source)
            })
            .collect()
    }))
}

/// Split scan results into successes and an [`Outcome`], logging failures.
pub(crate) fn partition<T>(results: Vec<Result<T, CliError>>) -> (Vec<T>, Outcome) {
    let mut done = Vec::with_capacity(results.len());
    let mut outcome = Outcome::default();
    for result in results {
        match result {
            Ok(value) => {
                done.push(value);
                outcome.processed += 1;
            }
            Err(err) => {
                warn!("{err}");
                outcome.failures.push(err);
            }
        }
    }
    (done, outcome)
}
