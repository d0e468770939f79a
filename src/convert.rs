use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, instrument, warn};

use crate::error::{ConvertError, Result};
use crate::identifier;
use crate::io::excel_read::ExcelSource;
use crate::io::sqlite_write::Database;
use crate::model::Table;

/// Extension of the workbooks picked up by discovery.
pub const WORKBOOK_EXTENSION: &str = "xlsx";
/// Extension given to derived database files.
pub const DATABASE_EXTENSION: &str = "db";

/// Summary of one table written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub sheet_name: String,
    pub table_name: String,
    pub columns: Vec<String>,
    pub row_count: usize,
}

/// A sheet that was skipped because it could not be read or written.
#[derive(Debug)]
pub struct SheetFailure {
    pub sheet_name: String,
    pub error: ConvertError,
}

/// Outcome of converting one workbook.
#[derive(Debug)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub tables: Vec<TableSummary>,
    pub failures: Vec<SheetFailure>,
}

/// Derives the database path for a workbook: same location and stem, `.db`
/// extension.
pub fn default_destination(source: &Path) -> PathBuf {
    source.with_extension(DATABASE_EXTENSION)
}

/// Converts every sheet of the workbook at `source` into a table of the
/// SQLite database at `destination`, replacing same-named tables.
///
/// A sheet that fails is logged and recorded in the report; the remaining
/// sheets are still converted. Only failures to open the workbook or the
/// database abort the conversion.
#[instrument(level = "info", skip_all, fields(input = %source.display()))]
pub fn convert_workbook(source: &Path, destination: Option<&Path>) -> Result<ConversionReport> {
    if !source.exists() {
        return Err(ConvertError::MissingInput(source.to_path_buf()));
    }
    let destination = destination
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_destination(source));
    if destination == source {
        return Err(ConvertError::DestinationIsSource(destination));
    }

    info!(output = %destination.display(), "converting workbook");
    let mut workbook = ExcelSource::open(source)?;
    let sheet_names = workbook.sheet_names();
    info!(sheet_count = sheet_names.len(), sheets = ?sheet_names, "found sheets");

    let mut database = Database::open(&destination)?;
    let mut report = ConversionReport {
        source: source.to_path_buf(),
        destination,
        tables: Vec::new(),
        failures: Vec::new(),
    };
    let mut written_tables = HashSet::new();

    for sheet_name in sheet_names {
        info!(sheet = %sheet_name, "processing sheet");
        match convert_sheet(&mut workbook, &mut database, &sheet_name) {
            Ok(summary) => {
                if !written_tables.insert(summary.table_name.to_lowercase()) {
                    warn!(
                        sheet = %sheet_name,
                        table = %summary.table_name,
                        "table name already used by an earlier sheet, replacing it"
                    );
                }
                report.tables.push(summary);
            }
            Err(error) => {
                error!(sheet = %sheet_name, %error, "error processing sheet");
                report.failures.push(SheetFailure { sheet_name, error });
            }
        }
    }

    database.close()?;
    info!(
        output = %report.destination.display(),
        tables = report.tables.len(),
        failed_sheets = report.failures.len(),
        "conversion complete"
    );
    Ok(report)
}

fn convert_sheet(
    workbook: &mut ExcelSource,
    database: &mut Database,
    sheet_name: &str,
) -> Result<TableSummary> {
    let sheet = workbook.read_sheet(sheet_name)?;
    let table_name = identifier::normalize(Some(sheet.name.as_str()));

    let labels: Vec<Option<&str>> = sheet
        .columns
        .iter()
        .map(|column| column.label.as_deref())
        .collect();
    info!(columns = ?labels, "original columns");
    let names = identifier::resolve_columns(labels);
    info!(columns = ?names, "final columns");

    let table = Table::from_sheet(table_name, sheet, names);
    database.replace_table(&table)?;
    info!(
        table = %table.name,
        rows = table.row_count,
        columns = table.columns.len(),
        "created table"
    );

    Ok(TableSummary {
        sheet_name: sheet_name.to_string(),
        columns: table
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        table_name: table.name,
        row_count: table.row_count,
    })
}

/// Converts each workbook in turn into its derived database, placed in
/// `output_dir` when given.
///
/// A workbook that cannot be converted is logged and does not stop the
/// remaining ones; its error is returned in place of a report.
pub fn convert_all(
    workbooks: &[PathBuf],
    output_dir: Option<&Path>,
) -> Vec<(PathBuf, Result<ConversionReport>)> {
    workbooks
        .iter()
        .map(|workbook| {
            let destination = output_dir.map(|dir| destination_in(dir, workbook));
            let outcome = convert_workbook(workbook, destination.as_deref());
            match &outcome {
                Ok(report) => info!(
                    input = %report.source.display(),
                    output = %report.destination.display(),
                    failed_sheets = report.failures.len(),
                    "workbook converted"
                ),
                Err(error) => {
                    error!(input = %workbook.display(), %error, "failed to convert workbook")
                }
            }
            (workbook.clone(), outcome)
        })
        .collect()
}

fn destination_in(dir: &Path, workbook: &Path) -> PathBuf {
    let file_name = default_destination(workbook);
    match file_name.file_name() {
        Some(name) => dir.join(name),
        None => dir.join(file_name),
    }
}

/// Lists the `.xlsx` files directly inside `dir`, sorted by path.
pub fn discover_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{escaped}/*.{WORKBOOK_EXTENSION}");
    debug!(%pattern, "discovering workbooks");

    let mut workbooks = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|error| ConvertError::Io(error.into()))?;
        if path.is_file() {
            workbooks.push(path);
        }
    }
    workbooks.sort();
    Ok(workbooks)
}
