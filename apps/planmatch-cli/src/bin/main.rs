use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use planmatch_cli::{collect_inputs, read_uploads, render_outcomes, render_preview, render_query};
use planmatch_core::config::Config;
use planmatch_core::ingest::{ingest_batch, FileStatus};
use planmatch_core::validator::ExpectedFileSet;
use planmatch_embed::SharedEmbedder;
use planmatch_search::run_query;

#[derive(Parser, Debug)]
#[command(name = "planmatch", about = "Find planning entries with a similar affair title")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the file names that are recognized.
    Files,
    /// Load files and report which ones were accepted.
    Load {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show the first rows of a planning file.
    Preview {
        file: PathBuf,
        #[arg(long, default_value_t = 20)]
        rows: usize,
    },
    /// Search the affair titles of the given files.
    Query {
        title: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Config::load()?.settings()?;
    let expected = ExpectedFileSet::from_settings(&settings.files, settings.schema);

    match cli.command {
        Command::Files => {
            for name in expected.names() {
                println!("{name}");
            }
        }
        Command::Load { paths } => {
            let uploads = read_uploads(&collect_inputs(&paths)?)?;
            let report = ingest_batch(uploads, &expected);
            print!("{}", render_outcomes(&report));
        }
        Command::Preview { file, rows } => {
            let uploads = read_uploads(std::slice::from_ref(&file))?;
            let report = ingest_batch(uploads, &expected);
            let Some(outcome) = report.outcomes.first() else { bail!("nothing to preview") };
            match (&outcome.status, report.tables.get(&outcome.filename)) {
                (FileStatus::Accepted { .. }, Some(table)) => print!("{}", render_preview(table, rows)),
                _ => {
                    print!("{}", render_outcomes(&report));
                    bail!("{} cannot be previewed", outcome.filename);
                }
            }
        }
        Command::Query { title, paths, json } => {
            if title.trim().is_empty() {
                bail!("the title to compare must not be empty");
            }
            let uploads = read_uploads(&collect_inputs(&paths)?)?;
            let ingest = ingest_batch(uploads, &expected);
            if !json {
                print!("{}", render_outcomes(&ingest));
            }

            let embedder = SharedEmbedder::from_settings(settings.embedding.clone());
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            spinner.set_message("computing similarities…");
            spinner.enable_steady_tick(Duration::from_millis(100));
            let report = run_query(&embedder, &title, &ingest.tables);
            spinner.finish_and_clear();
            let report = report?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_query(&report));
            }
        }
    }
    Ok(())
}
