//! Command-line configuration.

use std::path::PathBuf;

use crate::error::CliError;

/// File extensions scanned when walking a directory.
pub const DEFAULT_EXTENSIONS: &[&str] = &["pl", "pm", "t", "cgi"];

/// Environment variable supplying the default worker count.
pub const JOBS_ENV: &str = "PLX_JOBS";

/// Options shared by the multi-file commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    /// Worker threads; 0 lets rayon choose.
    pub jobs: usize,
    /// Where `xref` writes `.html` files; stdout when unset.
    pub out_dir: Option<PathBuf>,
    /// Extensions (without the dot) picked up from directories.
    pub extensions: Vec<String>,
    /// Machine-readable output for `loc`.
    pub json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            jobs: 0,
            out_dir: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect(),
            json: false,
        }
    }
}

impl CliConfig {
    /// Apply the `PLX_JOBS` value, if any.
    pub fn with_jobs_env(mut self, value: Option<&str>) -> Result<Self, CliError> {
        if let Some(value) = value {
            self.jobs = parse_count(JOBS_ENV, value)?;
        }
        Ok(self)
    }

    /// Parse command arguments into this configuration, returning the
    /// positional paths.
    pub fn parse_args(mut self, args: &[String]) -> Result<(Self, Vec<PathBuf>), CliError> {
        let mut paths = Vec::new();
        for arg in args {
            if let Some(jobs) = arg.strip_prefix("--jobs=") {
                self.jobs = parse_count("--jobs", jobs)?;
            } else if let Some(jobs) = arg.strip_prefix("-j") {
                self.jobs = parse_count("-j", jobs)?;
            } else if let Some(dir) = arg.strip_prefix("--out-dir=") {
                self.out_dir = Some(PathBuf::from(dir));
            } else if let Some(exts) = arg.strip_prefix("--ext=") {
                self.extensions = exts
                    .split(',')
                    .map(|ext| ext.trim().trim_start_matches('.').to_string())
                    .filter(|ext| !ext.is_empty())
                    .collect();
            } else if arg == "--json" {
                self.json = true;
            } else if arg.starts_with('-') && arg != "-" {
                return Err(CliError::Usage(format!("unknown option '{arg}'")));
            } else {
                paths.push(PathBuf::from(arg));
            }
        }
        Ok((self, paths))
    }

    /// Whether a directory entry with this extension should be scanned.
    pub fn wants_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|wanted| wanted.eq_ignore_ascii_case(ext))
    }
}

fn parse_count(option: &'static str, value: &str) -> Result<usize, CliError> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::InvalidNumber {
            option,
            value: value.to_string(),
        })
}
