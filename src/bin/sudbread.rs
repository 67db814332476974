//! # sudbread
//!
//! Replays cataloged traces in selection order.
//!
//! ## Usage
//!
//! ```bash
//! # every trace of one catalog, in recorded order
//! sudbread paths=line1.db > line1.su
//!
//! # gathers 100-200 from two lines, shot-sorted within each gather
//! sudbread paths=line1.db,line2.db select='cdp+(100:200)|fldr+' > gathers.su
//!
//! # corrected geometry from the catalog overrides the stored headers
//! sudbread paths=line1.db overrides=sx,sy,gx,gy > fixed.su
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};

use eyre::{bail, Result, WrapErr};
use tracing_subscriber::EnvFilter;

use sudb::params::Params;
use sudb::pipeline::{CatalogRetriever, RetrieveConfig};
use sudb::selection::{parse_path_spec, Selection};
use sudb::su::SuWriter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let params = Params::from_args(std::env::args());
    init_logging(&params);

    if !params.has("paths") {
        print_usage();
        bail!("missing paths= parameter");
    }
    let paths = parse_path_spec(&params.string("paths", ""))?;

    let selection = match params.get("select") {
        Some(text) if !text.trim().is_empty() => Selection::parse(text)?,
        _ => Selection::unconstrained(),
    };

    let overrides: Vec<String> = params
        .string("overrides", "")
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let config = RetrieveConfig {
        paths,
        selection,
        overrides,
        byteswap: params.has("byteswap").then(|| params.boolean("byteswap", false)),
        ibm_floats: params.has("ibmfloat").then(|| params.boolean("ibmfloat", true)),
    };

    let output: Box<dyn Write> = match params.get("output") {
        Some(path) if !path.is_empty() => Box::new(
            File::create(path).wrap_err_with(|| format!("failed to create output {path}"))?,
        ),
        _ => Box::new(io::stdout()),
    };

    let mut retriever = CatalogRetriever::new(config)?;
    let mut sink = SuWriter::new(BufWriter::new(output));
    retriever.run(&mut sink)?;
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
    eprintln!("sudbread - retrieve cataloged traces by selection");
    eprintln!();
    eprintln!("Compiles a selection into SQL over one or more catalogs and replays");
    eprintln!("the matching records from the data files in query order.");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    sudbread paths=<db>[,<db>...] [PARAMETERS] > out.su");
    eprintln!();
    eprintln!("PARAMETERS:");
    eprintln!("    paths=       comma-separated catalogs; append (file) to read the");
    eprintln!("                 data from somewhere other than the recorded path,");
    eprintln!("                 e.g. paths=line1.db(/mnt/line1.su),line2.db");
    eprintln!("    select=      selection, e.g. 'cdp+(100:200)|fldr-' or");
    eprintln!("                 'ep(1:10)/ep(20:30)' for two sequential groups");
    eprintln!("    overrides=   comma-separated columns whose cataloged values");
    eprintln!("                 replace the stored header values on output");
    eprintln!("    byteswap=    force the byte swap decision for the data files");
    eprintln!("    ibmfloat=    decode swapped samples as IBM floats (default 1 for");
    eprintln!("                 tape data, 0 otherwise)");
    eprintln!("    output=      write traces to a file instead of stdout");
    eprintln!("    verbose=     log level 0-6 (default 1; RUST_LOG overrides)");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("    sudbread paths=line1.db select='fldr(7001:7500:3)' > shots.su");
    eprintln!("    sudbread paths=a.db,b.db select='cdp+' output=merged.su");
}
