use std::path::PathBuf;

use clap::Parser;
use sheet2db::convert;
use sheet2db::{ConvertError, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let workbooks = resolve_inputs(&cli)?;
    if let Some(dir) = &cli.output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let outcomes = convert::convert_all(&workbooks, cli.output_dir.as_deref());
    let failed = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.is_err())
        .count();
    if failed == 0 {
        println!("All conversions completed successfully!");
    } else {
        println!(
            "Conversions finished: {} of {} workbooks failed.",
            failed,
            outcomes.len()
        );
    }
    Ok(())
}

fn resolve_inputs(cli: &Cli) -> Result<Vec<PathBuf>> {
    if cli.workbooks.is_empty() {
        let found = convert::discover_workbooks(&cli.data_dir)?;
        if found.is_empty() {
            return Err(ConvertError::NoWorkbooks(cli.data_dir.clone()));
        }
        return Ok(found);
    }

    let mut resolved = Vec::with_capacity(cli.workbooks.len());
    for path in &cli.workbooks {
        if path.is_file() {
            resolved.push(path.clone());
        } else {
            warn!(input = %path.display(), "input file not found, skipping");
        }
    }
    if resolved.is_empty() {
        return Err(ConvertError::MissingInput(cli.workbooks[0].clone()));
    }
    Ok(resolved)
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ConvertError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert every sheet of Excel workbooks into SQLite tables."
)]
struct Cli {
    /// Workbooks to convert. When omitted, every .xlsx file in the data
    /// directory is converted.
    #[arg(value_name = "WORKBOOK")]
    workbooks: Vec<PathBuf>,

    /// Directory searched for workbooks when none are given.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory receiving the databases. Defaults to each workbook's own
    /// directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}
