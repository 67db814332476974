//! # sudbwrite
//!
//! Builds a header catalog while the trace stream passes through untouched.
//!
//! ## Usage
//!
//! ```bash
//! # catalog the traces flowing into line1.su
//! suplane | sudbwrite dbpath=line1.db datapath=line1.su > line1.su
//!
//! # index two extra header fields and stop after 500 records
//! sudbwrite dbpath=shots.db datapath=shots.su columns=swdep,gwdep max=500 \
//!     input=shots.su output=/dev/null
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use eyre::{bail, Result, WrapErr};
use tracing_subscriber::EnvFilter;

use sudb::headers::HeaderCatalog;
use sudb::params::Params;
use sudb::pipeline::{BuildConfig, CatalogBuilder};
use sudb::su::{SuReader, SuWriter, TraceSink, TraceSource};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let params = Params::from_args(std::env::args());
    init_logging(&params);

    if !params.has("dbpath") {
        print_usage();
        bail!("missing dbpath= parameter");
    }

    let columns: Vec<String> = params
        .string("columns", "")
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let config = BuildConfig {
        db_path: PathBuf::from(params.string("dbpath", "")),
        data_path: params.string("datapath", "data.su"),
        columns,
        segytape: params.boolean("segytape", false),
        fortran: params.boolean("fortran", false),
        comment: params.string("comment", ""),
        max: params.int("max", 0).max(0) as u64,
    };

    let input: Box<dyn Read> = match params.get("input") {
        Some(path) if !path.is_empty() => Box::new(
            File::open(path).wrap_err_with(|| format!("failed to open input {path}"))?,
        ),
        _ => Box::new(io::stdin()),
    };
    let output: Box<dyn Write> = match params.get("output") {
        Some(path) if !path.is_empty() => Box::new(
            File::create(path).wrap_err_with(|| format!("failed to create output {path}"))?,
        ),
        _ => Box::new(io::stdout()),
    };

    let catalog = HeaderCatalog::standard();
    let mut builder = CatalogBuilder::new(config, &catalog)?;
    let mut source = SuReader::new(BufReader::new(input), &catalog)?;
    let mut sink = SuWriter::new(BufWriter::new(output));

    loop {
        match source.next_trace()? {
            None => break,
            Some(trace) => {
                if !builder.process(trace)? {
                    break;
                }
                sink.put_trace(trace)?;
            }
        }
    }
    sink.flush()?;
    builder.finish()?;
    Ok(())
}

fn init_logging(params: &Params) {
    let level = match params.int("verbose", 1) {
        i64::MIN..=0 => "warn",
        1..=3 => "info",
        4..=5 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("sudb={level},warn"))),
        )
        .init();
}

fn print_usage() {
    eprintln!("sudbwrite - index a trace stream into a header catalog");
    eprintln!();
    eprintln!("Traces flow from input to output unchanged while their headers are");
    eprintln!("collected into a new SQLite catalog for later selection.");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    sudbwrite dbpath=<file> [PARAMETERS] < in.su > out.su");
    eprintln!();
    eprintln!("PARAMETERS:");
    eprintln!("    dbpath=      catalog file to create (must not already exist)");
    eprintln!("    datapath=    data file recorded in the catalog; point it at the");
    eprintln!("                 file the output stream is being written to");
    eprintln!("                 (default data.su)");
    eprintln!("    columns=     comma-separated header fields to index beyond the");
    eprintln!("                 default set");
    eprintln!("    segytape=    data file is a SEG-Y tape image (default 0)");
    eprintln!("    fortran=     records carry Fortran length delimiters (default 0)");
    eprintln!("    comment=     free-form text stored with the catalog");
    eprintln!("    max=         stop after this many records (default 0, no limit)");
    eprintln!("    input=       read traces from a file instead of stdin");
    eprintln!("    output=      write traces to a file instead of stdout");
    eprintln!("    verbose=     log level 0-6 (default 1; RUST_LOG overrides)");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("    sudbwrite dbpath=line1.db datapath=line1.su < raw.su > line1.su");
    eprintln!("    sudbwrite dbpath=tape.db datapath=tape.segy segytape=1 \\");
    eprintln!("        input=tape_headers.su output=/dev/null");
}
