//! # mag2yaml
//!
//! Magic Cell Hierarchy to Mag21 YAML Schema Converter
//!

use clap::Parser;
use log::info;
use std::error::Error;

use mag21::{
    summarize, CellParser, Composition, DesignCache, Diagnostic, DiagnosticSink, LogSink,
    MagLibrary, ParseOptions, SerdeFile, SerializationFormat, PLOT_PADDING,
};

// => The doc-comment on `ProgramOptions` here is displayed by the `clap`-generated help docs =>

/// Magic Cell Hierarchy to Mag21 YAML Schema Converter
#[derive(Parser)]
struct ProgramOptions {
    /// Top-Level Magic (.mag) Input File
    #[clap(short = 'i', long)]
    input: String,
    /// Output File
    #[clap(short = 'o', long)]
    output: String,
    /// Output Format (yaml, json or toml). Inferred from the output file extension if not provided.
    #[clap(short = 'f', long, value_parser = parse_format)]
    format: Option<SerializationFormat>,
    /// Parse-Options File (toml, yaml or json)
    #[clap(short = 'c', long)]
    config: Option<String>,
    /// Write the flattened layout, rather than the cell library
    #[clap(long)]
    flatten: bool,
    /// Transform Composition Mode for flattening (chained or single-level)
    #[clap(long, value_parser = parse_composition, default_value = "chained")]
    composition: Composition,
    /// Verbose Output Mode
    #[clap(short, long)]
    verbose: bool,
}

/// The main entry point.
/// All logic is offloaded to `_main` for sake of testing.
fn main() -> Result<(), Box<dyn Error>> {
    let options = ProgramOptions::parse();
    let level = if options.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    _main(&options)
}

/// All the real logic, with `ProgramOptions` argument for sake of testing
fn _main(options: &ProgramOptions) -> Result<(), Box<dyn Error>> {
    let fmt = match options.format {
        Some(fmt) => fmt,
        None => SerializationFormat::from_path(&options.output).unwrap_or(SerializationFormat::Yaml),
    };
    let parse_options = match &options.config {
        Some(config) => ParseOptions::open_any(config)?,
        None => ParseOptions::default(),
    };

    // Parse the hierarchy, collecting diagnostics
    let mut cache = DesignCache::new();
    let mut diags: Vec<Diagnostic> = Vec::new();
    let top = CellParser::new(&mut cache)
        .with_options(parse_options)
        .with_diagnostics(&mut diags)
        .parse(&options.input, ".")?;
    info!("parsed {} cells from {:?}", cache.designs().count(), &options.input);

    // Forward everything we collected to the logger, and summarize
    let mut sink = LogSink;
    for diag in diags.iter() {
        sink.report(diag.clone());
    }
    if options.verbose {
        for (kind, count) in summarize(&diags) {
            println!("{:?}: {}", kind, count);
        }
    }

    // And store the library or flattened layout
    if options.flatten {
        let flat = top.flatten(options.composition);
        if options.verbose {
            let bounds = flat.plot_bounds(PLOT_PADDING);
            println!("plot bounds: {:?} to {:?}, size {:?}", bounds.p0, bounds.p1, bounds.size());
        }
        flat.save(fmt, &options.output)?;
    } else {
        MagLibrary::from_design(&top)?.save(fmt, &options.output)?;
    }
    if options.verbose {
        println!("wrote {:?}", &options.output);
    }
    Ok(())
}

/// Parse a [SerializationFormat] command-line argument
fn parse_format(s: &str) -> Result<SerializationFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "json" => Ok(SerializationFormat::Json),
        "yaml" | "yml" => Ok(SerializationFormat::Yaml),
        "toml" => Ok(SerializationFormat::Toml),
        _ => Err(format!("unknown format `{}`, expected yaml, json or toml", s)),
    }
}
/// Parse a [Composition] command-line argument
fn parse_composition(s: &str) -> Result<Composition, String> {
    match s {
        "chained" => Ok(Composition::Chained),
        "single-level" => Ok(Composition::SingleLevel),
        _ => Err(format!("unknown composition `{}`, expected chained or single-level", s)),
    }
}
