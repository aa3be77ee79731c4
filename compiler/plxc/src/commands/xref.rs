//! `plx xref`: cross-referenced HTML.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use plx_lexer::HtmlWriter;

use super::{collect_sources, partition, scan_files, Outcome};
use crate::config::CliConfig;
use crate::error::CliError;

/// Render every file as HTML.
///
/// With `out_dir` set, each file is written to `out_dir/<relative>.html`;
/// otherwise the pages go to `out` in order, separated by a comment naming
/// the file when there is more than one.
pub fn run_xref(
    paths: &[PathBuf],
    config: &CliConfig,
    out: &mut impl Write,
) -> Result<Outcome, CliError> {
    let files = collect_sources(paths, config)?;
    let out_dir = config.out_dir.as_deref();

    let results = scan_files(&files, config.jobs, |lexer, file, source| {
        let mut html = HtmlWriter::new();
        lexer.scan(source, &mut html);
        let html = html.finish();
        match out_dir {
            Some(dir) => {
                write_page(&html_path(dir, &file.relative), &html)?;
                Ok((file.relative.clone(), None))
            }
            None => Ok((file.relative.clone(), Some(html))),
        }
    })?;

    let (pages, outcome) = partition(results);
    let labelled = pages.len() > 1;
    for (relative, html) in pages {
        let Some(html) = html else { continue };
        if labelled {
            writeln!(out, "<!-- {} -->", relative.display())?;
        }
        out.write_all(html.as_bytes())?;
    }
    Ok(outcome)
}

fn html_path(dir: &Path, relative: &Path) -> PathBuf {
    let mut name = dir.join(relative).into_os_string();
    name.push(".html");
    PathBuf::from(name)
}

fn write_page(target: &Path, html: &str) -> Result<(), CliError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
    }
    fs::write(target, html).map_err(|e| CliError::io(target, e))
}
