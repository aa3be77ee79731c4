//! `plx`: Perl cross-reference tool.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use plxc::commands::{run_events, run_loc, run_xref, Outcome};
use plxc::config::JOBS_ENV;
use plxc::{init_tracing, CliConfig, CliError};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    let result = match command {
        "xref" | "events" | "loc" => run(command, &args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        "version" | "--version" | "-V" => {
            println!("plx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => Err(CliError::Usage(format!("unknown command '{command}'"))),
    };

    match result {
        Ok(outcome) => {
            for failure in &outcome.failures {
                eprintln!("error: {failure}");
            }
            if outcome.has_failures() {
                eprintln!(
                    "{} of {} files failed",
                    outcome.failures.len(),
                    outcome.processed + outcome.failures.len()
                );
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            if let CliError::Usage(_) = err {
                eprintln!();
                print_usage();
            }
            std::process::exit(err.exit_code());
        }
    }
}

fn run(command: &str, args: &[String]) -> Result<Outcome, CliError> {
    let env_jobs = std::env::var(JOBS_ENV).ok();
    let (config, paths) = CliConfig::default()
        .with_jobs_env(env_jobs.as_deref())?
        .parse_args(args)?;

    let paths = if paths.is_empty() && command != "events" {
        vec![PathBuf::from(".")]
    } else {
        paths
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let outcome = match command {
        "xref" => run_xref(&paths, &config, &mut out),
        "events" => run_events(&paths, &mut out),
        _ => run_loc(&paths, &config, &mut out),
    }?;
    out.flush()?;
    Ok(outcome)
}

fn print_usage() {
    println!("plx - Perl cross-reference tool");
    println!();
    println!("Usage: plx <command> [options] [paths...]");
    println!();
    println!("Commands:");
    println!("  xref [paths...]     Render files as cross-referenced HTML");
    println!("  events <file>       Print the markup events for one file as JSON lines");
    println!("  loc [paths...]      Count lines and lines of code");
    println!("  help                Show this message");
    println!("  version             Show the version");
    println!();
    println!("Options:");
    println!("  --jobs=<n>, -j<n>   Worker threads (default: {JOBS_ENV} or one per core)");
    println!("  --out-dir=<dir>     xref: write <dir>/<file>.html instead of stdout");
    println!("  --ext=<a,b,...>     Extensions to pick up from directories (default: pl,pm,t,cgi)");
    println!("  --json              loc: print a JSON report");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=plx_lexer=trace) for diagnostic logging.");
}
