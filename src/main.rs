use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*};

mod assignment;
mod commands;
mod config;
mod consolidate;
mod course_totals;
mod discover;
mod error;
mod export_pdf;
mod gradebook_config;
mod layout;
mod roster;
mod rubric_csv;
mod scrape_rubric;
mod spreadsheet;
mod types;
mod util;
mod write_workbook;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: SubCommand,
}

#[derive(Debug, Subcommand)]
enum SubCommand {
    /// Merge Moodle rubric exports into one styled workbook
    Consolidate {
        /// Directory containing the XLSX exports
        #[arg(long, default_value = ".")]
        input_dir: Utf8PathBuf,
        /// Path for the consolidated workbook
        #[arg(long, default_value = "consolidated.xlsx")]
        output: Utf8PathBuf,
        /// Path for the PDF copy (defaults to the workbook path with .pdf)
        #[arg(long)]
        pdf: Option<Utf8PathBuf>,
        /// Skip the PDF export
        #[arg(long)]
        no_pdf: bool,
        /// JSON settings file (defaults to gradebook.json in the input directory)
        #[arg(long)]
        config: Option<Utf8PathBuf>,
        /// Title for the banner row
        #[arg(long)]
        course_name: Option<String>,
        /// Overwrite existing outputs without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Show which exports and rubric CSVs would be consolidated
    ListInputs {
        #[arg(long, default_value = ".")]
        input_dir: Utf8PathBuf,
    },
    /// Write the rubric label CSV from a saved Moodle grading page
    ScrapeRubric {
        html: Utf8PathBuf,
        /// Assignment name used for the CSV file name (defaults to the page heading)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = ".")]
        out_dir: Utf8PathBuf,
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    let cli = Args::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(fmt::layer().without_time().with_target(false))
        .with(level)
        .init();

    let ok = match cli.command {
        SubCommand::Consolidate {
            input_dir,
            output,
            pdf,
            no_pdf,
            config,
            course_name,
            yes,
        } => commands::consolidate(commands::ConsolidateArgs {
            input_dir: input_dir.as_std_path(),
            output: output.as_std_path(),
            pdf: pdf.as_ref().map(|p| p.as_std_path()),
            no_pdf,
            config: config.as_ref().map(|p| p.as_std_path()),
            course_name,
            assume_yes: yes,
        }),
        SubCommand::ListInputs { input_dir } => commands::list_inputs(input_dir.as_std_path()),
        SubCommand::ScrapeRubric {
            html,
            name,
            out_dir,
            yes,
        } => commands::scrape_rubric(
            html.as_std_path(),
            name.as_deref(),
            out_dir.as_std_path(),
            yes,
        ),
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
