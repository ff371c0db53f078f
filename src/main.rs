use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use miette::{IntoDiagnostic, WrapErr};
use stix_patterns::{parse_with, ParserOptions};

#[derive(Parser, Debug)]
#[command(name = "stix-pattern")]
#[command(about = "Parse STIX patterns and print their syntax tree")]
#[command(version)]
struct Args {
    /// Patterns to parse
    patterns: Vec<String>,

    /// Read patterns from a file, one per line ('-' for stdin)
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// What to print for each pattern that parses
    #[arg(short, long, value_enum, default_value_t = Output::Canonical)]
    output: Output,

    /// Deepest accepted nesting of brackets and parentheses
    #[arg(long, value_name = "N", default_value_t = stix_patterns::parser::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Longest accepted pattern in bytes
    #[arg(long, value_name = "BYTES")]
    max_len: Option<usize>,

    /// Most operators and qualifiers accepted in one pattern
    #[arg(long, value_name = "N", default_value_t = stix_patterns::parser::DEFAULT_MAX_OPERATORS)]
    max_operators: usize,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Output {
    /// Canonical pattern text
    Canonical,
    /// The syntax tree as nested Rust debug output
    Tree,
    /// One line per leaf comparison
    Comparisons,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str().to_lowercase()),
    )
    .target(env_logger::Target::Stderr)
    .init();
}

fn read_patterns(path: &Path) -> miette::Result<Vec<String>> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .into_diagnostic()
            .wrap_err("failed to read patterns from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?
    };

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn main() -> miette::Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut patterns = args.patterns.clone();
    if let Some(path) = &args.file {
        patterns.extend(read_patterns(path)?);
    }
    if patterns.is_empty() {
        miette::bail!("no patterns given; pass them as arguments or with --file");
    }

    let options = ParserOptions::new()
        .max_depth(args.max_depth)
        .max_operators(args.max_operators)
        .max_input_len(args.max_len.or(ParserOptions::default().max_input_len));

    let mut failures = 0;
    for pattern in &patterns {
        match parse_with(pattern, &options) {
            Ok(tree) => match args.output {
                Output::Canonical => println!("{}", tree),
                Output::Tree => println!("{:#?}", tree),
                Output::Comparisons => {
                    for comparison in tree.comparisons() {
                        println!("{}", comparison);
                    }
                }
            },
            Err(err) => {
                failures += 1;
                eprintln!("{:?}", miette::Report::new(err.with_source(pattern.as_str())));
            }
        }
    }

    info!(
        "parsed {} of {} patterns",
        patterns.len() - failures,
        patterns.len()
    );

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
