mod commands;
mod input;
mod logging;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analysis::AnalysisArgs;
use commands::export::ExportArgs;
use commands::report::ReportArgs;
use commands::scenarios::CompareArgs;

/// Phased property payment schedules
#[derive(Parser)]
#[command(
    name = "payplan",
    version,
    about = "Phased property payment schedules",
    long_about = "Build a payment schedule from a phased plan (dated balloon payments and \
                  recurring amortisation segments), then total it and discount it to an NPV. \
                  Input is a JSON or YAML analysis file, piped JSON, or individual flags."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log verbosity on stderr (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the payment schedule with totals and NPV
    Schedule(AnalysisArgs),
    /// Evaluate a plan: totals and NPV only
    Npv(AnalysisArgs),
    /// Write the full schedule to a CSV file
    Export(ExportArgs),
    /// Write the text investment report (first 30 payments)
    Report(ReportArgs),
    /// Compare several saved analyses side by side
    Compare(CompareArgs),
    /// Print the default three-phase plan
    DefaultPlan,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Npv(args) => commands::npv::run_npv(args),
        Commands::Export(args) => commands::export::run_export(args),
        Commands::Report(args) => commands::report::run_report(args),
        Commands::Compare(args) => commands::scenarios::run_compare(args),
        Commands::DefaultPlan => commands::schedule::run_default_plan(),
        Commands::Version => {
            println!("payplan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
