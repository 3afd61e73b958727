use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

mod config;

#[derive(Parser, Debug)]
#[command(name = "css-treeshake")]
#[command(about = "Remove CSS rules whose selectors use classes a document never uses", long_about = None)]
pub struct Cli {
    /// Stylesheet to shake, or '-' for stdin.
    #[arg(default_value = "-")]
    input: PathBuf,

    /// JSON options file (`used`, `ignore`, `allowIds`, ...).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Used class names (repeatable, comma-separated).
    #[arg(long, value_name = "CLASSES", value_delimiter = ',', action = clap::ArgAction::Append)]
    used: Vec<String>,

    /// File of whitespace-separated used class names (repeatable).
    #[arg(long, value_name = "PATH")]
    used_file: Vec<PathBuf>,

    /// Selector, compound selector or simple selector never to remove (repeatable).
    #[arg(long, value_name = "SELECTOR")]
    ignore: Vec<String>,

    /// Regular expression for selectors never to remove (repeatable).
    #[arg(long, value_name = "REGEX")]
    ignore_pattern: Vec<String>,

    /// Keep selectors containing ids.
    #[arg(long)]
    allow_ids: bool,

    /// Keep selectors that mention no class at all.
    #[arg(long)]
    allow_non_class_selectors: bool,

    /// Keep compound selectors that mention no class, e.g. `body` in `body .a`.
    #[arg(long)]
    allow_non_class_combinators: bool,

    /// Write the shaken stylesheet here instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Write a JSON report of everything removed.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Enable verbose (info-level) logging to stderr.
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Enable debug-level logging to stderr.
    #[arg(long)]
    debug: bool,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    match run(&cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            std::process::ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = config::load_options(cli)?;
    let filter_config = options.resolve().context("invalid options")?;

    let input = read_input(&cli.input)?;
    let mut sheet = css::parse_stylesheet(&input)
        .with_context(|| format!("parse stylesheet {}", cli.input.display()))?;
    let report = treeshake::shake(&mut sheet, &filter_config)?;

    let output = sheet.to_string();
    match &cli.output {
        Some(path) => std::fs::write(path, &output)
            .with_context(|| format!("write output {}", path.display()))?,
        None => io::stdout()
            .write_all(output.as_bytes())
            .context("write output to stdout")?,
    }

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report).context("serialize report")?;
        std::fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
        debug!(path = %path.display(), "report written");
    }

    info!(
        selectors_removed = report.selector_count(),
        keyframes_removed = report.keyframes_count(),
        "done"
    );
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        info!("Reading stylesheet from stdin");
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read stylesheet from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("read stylesheet {}", path.display()))
    }
}

fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}
