use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{DataType, Range, Reader, Sheets, open_workbook_auto};

use crate::error::{ConvertError, Result};
use crate::model::{CellValue, Sheet, SheetColumn};

/// Format used for date and datetime cells, matching SQLite's date functions.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An opened workbook (xlsx, xlsm, xlsb, xls or ods) whose sheets can be read
/// one by one.
pub struct ExcelSource {
    workbook: Sheets<BufReader<File>>,
}

impl ExcelSource {
    /// Opens the workbook, picking the reader from the file extension. Fails
    /// if the file is unreadable or not a workbook of that format.
    pub fn open(path: &Path) -> Result<Self> {
        let workbook = open_workbook_auto(path)?;
        Ok(Self { workbook })
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// Reads a sheet into columns, taking header labels from the first row.
    ///
    /// Blank and repeated headers are kept as they are; callers decide how to
    /// name such columns.
    pub fn read_sheet(&mut self, name: &str) -> Result<Sheet> {
        let range = self
            .workbook
            .worksheet_range(name)
            .ok_or_else(|| ConvertError::MissingSheet(name.to_string()))?
            .map_err(ConvertError::from)?;
        sheet_from_range(name, &range)
    }
}

/// Builds a sheet from a used range. The range starts at the first used cell,
/// so empty leading columns are restored as blank columns from column A.
fn sheet_from_range(name: &str, range: &Range<DataType>) -> Result<Sheet> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ConvertError::EmptySheet(name.to_string()))?;

    let leading = range.start().map_or(0, |(_, col)| col as usize);
    let data_rows = range.height().saturating_sub(1);

    let mut columns: Vec<SheetColumn> = (0..leading)
        .map(|_| SheetColumn {
            label: None,
            values: vec![CellValue::Null; data_rows],
        })
        .collect();
    columns.extend(header.iter().map(|cell| SheetColumn {
        label: cell_to_label(cell),
        values: Vec::with_capacity(data_rows),
    }));

    let mut row_count = 0;
    for row in rows {
        for (column, cell) in columns[leading..].iter_mut().zip(row) {
            column.values.push(cell_to_value(cell));
        }
        row_count += 1;
    }

    Ok(Sheet {
        name: name.to_string(),
        columns,
        row_count,
    })
}

fn cell_to_label(cell: &DataType) -> Option<String> {
    match cell {
        DataType::Empty => None,
        DataType::String(value) => Some(value.clone()),
        DataType::Float(value) if is_integral(*value) => Some((*value as i64).to_string()),
        DataType::DateTime(_) => Some(match cell.as_datetime() {
            Some(datetime) => datetime.format(TIMESTAMP_FORMAT).to_string(),
            None => cell.to_string(),
        }),
        other => Some(other.to_string()),
    }
}

fn cell_to_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Null,
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Int(value) => CellValue::Integer(*value),
        DataType::Float(value) if is_integral(*value) => CellValue::Integer(*value as i64),
        DataType::Float(value) => CellValue::Real(*value),
        DataType::Bool(value) => CellValue::Boolean(*value),
        DataType::DateTime(_) => match cell.as_datetime() {
            Some(datetime) => CellValue::Timestamp(datetime.format(TIMESTAMP_FORMAT).to_string()),
            None => CellValue::Text(cell.to_string()),
        },
        other => CellValue::Text(other.to_string()),
    }
}

/// Whole floats within the range where `f64` represents integers exactly.
fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_leading_columns_are_kept() {
        let mut range = Range::new((0, 1), (2, 2));
        range.set_value((0, 1), DataType::String("B".into()));
        range.set_value((0, 2), DataType::String("C".into()));
        range.set_value((1, 1), DataType::Float(1.0));
        range.set_value((2, 2), DataType::String("x".into()));

        let sheet = sheet_from_range("Offset", &range).expect("sheet read");

        assert_eq!(sheet.row_count, 2);
        let labels: Vec<Option<&str>> = sheet
            .columns
            .iter()
            .map(|column| column.label.as_deref())
            .collect();
        assert_eq!(labels, vec![None, Some("B"), Some("C")]);
        assert_eq!(sheet.columns[0].values, vec![CellValue::Null, CellValue::Null]);
        assert_eq!(
            sheet.columns[1].values,
            vec![CellValue::Integer(1), CellValue::Null]
        );
        assert_eq!(
            sheet.columns[2].values,
            vec![CellValue::Null, CellValue::Text("x".into())]
        );
    }

    #[test]
    fn date_headers_use_their_calendar_form() {
        assert_eq!(
            cell_to_label(&DataType::DateTime(45322.0)).as_deref(),
            Some("2024-01-31 00:00:00")
        );
        assert_eq!(
            cell_to_label(&DataType::Float(2024.0)).as_deref(),
            Some("2024")
        );
        assert_eq!(cell_to_label(&DataType::Empty), None);
    }

    #[test]
    fn empty_range_is_an_empty_sheet() {
        let range: Range<DataType> = Range::empty();
        assert!(matches!(
            sheet_from_range("Blank", &range),
            Err(ConvertError::EmptySheet(_))
        ));
    }
}
