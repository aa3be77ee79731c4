//! `plx events`: the raw markup stream as JSON lines.

use std::io::Write;
use std::path::PathBuf;

use plx_lexer::xref_events;

use super::{read_source, Outcome};
use crate::error::CliError;

/// Dump the events for a single file, one JSON object per line.
pub fn run_events(paths: &[PathBuf], out: &mut impl Write) -> Result<Outcome, CliError> {
    let [path] = paths else {
        return Err(CliError::Usage(
            "events takes exactly one file".to_string(),
        ));
    };
    let source = read_source(path)?;
    for event in xref_events(&source) {
        serde_json::to_writer(&mut *out, &event)?;
        writeln!(out)?;
    }
    Ok(Outcome {
        processed: 1,
        failures: Vec::new(),
    })
}
