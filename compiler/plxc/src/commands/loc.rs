//! `plx loc`: line and line-of-code counts.

use std::io::Write;
use std::path::PathBuf;

use plx_lexer::{EventLog, ScanSummary};
use serde::Serialize;

use super::{collect_sources, partition, scan_files, Outcome};
use crate::config::CliConfig;
use crate::error::CliError;

/// Counts for one file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileLoc {
    pub path: String,
    #[serde(flatten)]
    pub summary: ScanSummary,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LocTotals {
    pub files: usize,
    pub lines: u64,
    pub lines_of_code: u64,
}

/// Full `loc` report, as serialized with `--json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LocReport {
    pub files: Vec<FileLoc>,
    pub total: LocTotals,
}

impl LocReport {
    fn new(files: Vec<FileLoc>) -> Self {
        let total = files.iter().fold(
            LocTotals {
                files: files.len(),
                ..LocTotals::default()
            },
            |mut total, file| {
                total.lines += u64::from(file.summary.lines);
                total.lines_of_code += u64::from(file.summary.lines_of_code);
                total
            },
        );
        LocReport { files, total }
    }

    fn write_table(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "{:>8} {:>8}  file", "lines", "code")?;
        for file in &self.files {
            writeln!(
                out,
                "{:>8} {:>8}  {}",
                file.summary.lines, file.summary.lines_of_code, file.path
            )?;
        }
        writeln!(
            out,
            "{:>8} {:>8}  total ({} files)",
            self.total.lines, self.total.lines_of_code, self.total.files
        )
    }
}

/// Count lines in every file, printing a table or JSON.
pub fn run_loc(
    paths: &[PathBuf],
    config: &CliConfig,
    out: &mut impl Write,
) -> Result<Outcome, CliError> {
    let files = collect_sources(paths, config)?;
    let results = scan_files(&files, config.jobs, |lexer, file, source| {
        let summary = lexer.scan(source, &mut EventLog::new());
        Ok(FileLoc {
            path: file.relative.display().to_string(),
            summary,
        })
    })?;

    let (counts, outcome) = partition(results);
    let report = LocReport::new(counts);
    if config.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        report.write_table(out)?;
    }
    Ok(outcome)
}
