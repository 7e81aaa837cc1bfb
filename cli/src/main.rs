mod error_formatter;
mod formatter;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use formatter::Formatter;
use std::fs;
use std::path::{Path, PathBuf};
use tally::{DateFormat, DateLocale, Engine, FormatOptions, RenderNode};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "A notepad calculator: numbers, units, money, dates and equations in plain text.")]
#[command(
    long_about = "Tally evaluates notepad documents line by line. Each line may be a comment, an assignment,\nan expression, a percentage phrase, a date calculation or an equation to solve.\nEnd a line with => to show the value of an assignment."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a notepad file and show one result per line
    ///
    /// Lines are evaluated top to bottom; later lines see earlier assignments.
    /// Lines that fail are shown with their error and do not stop the document.
    Run {
        /// The notepad file to evaluate
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Evaluate lines given on the command line, in order, as one document
    ///
    /// Example: tally eval "price = \$40" "price * 3 =>"
    Eval {
        /// Lines to evaluate
        #[arg(required = true)]
        lines: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Decimal places shown before trailing zeros are trimmed
    #[arg(short, long, default_value_t = 6)]
    precision: u32,
    /// How dates are written
    #[arg(long, value_enum, default_value_t = DateStyle::Iso)]
    date_format: DateStyle,
    /// Field order for ambiguous numeric dates like 03/04/2024
    #[arg(long, value_enum, default_value_t = Locale::Us)]
    locale: Locale,
    /// Print render nodes as JSON instead of a table
    #[arg(long)]
    json: bool,
    /// Log evaluator decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum DateStyle {
    Iso,
    Us,
    Eu,
    Long,
}

#[derive(Clone, Copy, ValueEnum)]
enum Locale {
    Us,
    Eu,
}

impl OutputArgs {
    fn format_options(&self) -> FormatOptions {
        FormatOptions {
            precision: self.precision,
            date_format: match self.date_format {
                DateStyle::Iso => DateFormat::Iso,
                DateStyle::Us => DateFormat::Us,
                DateStyle::Eu => DateFormat::Eu,
                DateStyle::Long => DateFormat::Long,
            },
            date_locale: match self.locale {
                Locale::Us => DateLocale::Us,
                Locale::Eu => DateLocale::Eu,
            },
            ..FormatOptions::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let verbose = match &cli.command {
        Commands::Run { output, .. } | Commands::Eval { output, .. } => output.verbose,
    };
    init_tracing(verbose);

    let result = match &cli.command {
        Commands::Run { file, output } => run_command(file, output),
        Commands::Eval { lines, output } => eval_command(lines, output),
    };

    if let Err(e) = result {
        if let Some(tally_err) = e.downcast_ref::<tally::TallyError>() {
            eprintln!("{}", error_formatter::format_error(tally_err, "document"));
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(file: &Path, output: &OutputArgs) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("Cannot read {}", file.display()))?;
    debug!(file = %file.display(), bytes = text.len(), "evaluating notepad");
    let mut engine = Engine::new().with_format(output.format_options());
    let nodes = engine.evaluate_document(&text)?;
    print_nodes(&nodes, output, &file.to_string_lossy())
}

fn eval_command(lines: &[String], output: &OutputArgs) -> Result<()> {
    let mut engine = Engine::new().with_format(output.format_options());
    let nodes: Vec<RenderNode> = lines.iter().map(|line| engine.evaluate_line(line)).collect();
    print_nodes(&nodes, output, "eval")
}

fn print_nodes(nodes: &[RenderNode], output: &OutputArgs, source_id: &str) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(nodes)?);
        return Ok(());
    }
    print!("{}", Formatter::default().format_nodes(nodes));
    for report in error_formatter::parse_reports(nodes, source_id) {
        eprintln!("{}", report);
    }
    Ok(())
}
