/// A single cell value as read from a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank cell.
    Null,
    /// Whole number, including floats without a fractional part.
    Integer(i64),
    /// Floating point number.
    Real(f64),
    /// Plain string, also used for values the reader cannot type.
    Text(String),
    /// Boolean cell.
    Boolean(bool),
    /// Date or datetime rendered as `YYYY-MM-DD HH:MM:SS`.
    Timestamp(String),
}

/// Declared SQLite column type inferred from the values of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Timestamp,
}

impl SqlType {
    /// Infers the narrowest declared type able to hold every non-null value.
    ///
    /// Booleans are stored as 0/1 integers. Columns without any value, or
    /// mixing incompatible kinds, fall back to `TEXT`.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> SqlType {
        let mut inferred: Option<SqlType> = None;
        let mut booleans_only = true;

        for value in values {
            let current = match value {
                CellValue::Null => continue,
                CellValue::Integer(_) => SqlType::Integer,
                CellValue::Real(_) => SqlType::Real,
                CellValue::Boolean(_) => SqlType::Integer,
                CellValue::Text(_) => SqlType::Text,
                CellValue::Timestamp(_) => SqlType::Timestamp,
            };
            let is_boolean = matches!(value, CellValue::Boolean(_));

            inferred = Some(match inferred {
                None => {
                    booleans_only = is_boolean;
                    current
                }
                Some(previous) => {
                    if booleans_only != is_boolean {
                        return SqlType::Text;
                    }
                    match (previous, current) {
                        (lhs, rhs) if lhs == rhs => lhs,
                        (SqlType::Integer, SqlType::Real) | (SqlType::Real, SqlType::Integer) => {
                            SqlType::Real
                        }
                        _ => return SqlType::Text,
                    }
                }
            });
        }

        inferred.unwrap_or(SqlType::Text)
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Timestamp => "TIMESTAMP",
        }
    }
}

/// One column of a worksheet as read from the workbook, before renaming.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetColumn {
    /// Header label from the first row, `None` when the cell is blank.
    pub label: Option<String>,
    pub values: Vec<CellValue>,
}

/// A worksheet read into ordered columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<SheetColumn>,
    pub row_count: usize,
}

/// A column ready to be written, keyed by its final identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    pub values: Vec<CellValue>,
}

/// A worksheet after normalization, ready to replace a database table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub row_count: usize,
}

impl Table {
    /// Builds a table from a sheet, renaming columns to `names` in order.
    ///
    /// `names` must hold one identifier per sheet column.
    pub fn from_sheet(name: String, sheet: Sheet, names: Vec<String>) -> Self {
        let columns = sheet
            .columns
            .into_iter()
            .zip(names)
            .map(|(column, identifier)| Column {
                sql_type: SqlType::infer(&column.values),
                name: identifier,
                values: column.values,
            })
            .collect();

        Table {
            name,
            columns,
            row_count: sheet.row_count,
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|column| column.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_numeric_types() {
        let ints = [CellValue::Integer(1), CellValue::Null, CellValue::Integer(3)];
        assert_eq!(SqlType::infer(&ints), SqlType::Integer);

        let mixed = [CellValue::Integer(1), CellValue::Real(2.5)];
        assert_eq!(SqlType::infer(&mixed), SqlType::Real);
    }

    #[test]
    fn booleans_are_integers_unless_mixed() {
        let flags = [CellValue::Boolean(true), CellValue::Boolean(false)];
        assert_eq!(SqlType::infer(&flags), SqlType::Integer);

        let mixed = [CellValue::Boolean(true), CellValue::Integer(4)];
        assert_eq!(SqlType::infer(&mixed), SqlType::Text);
    }

    #[test]
    fn empty_and_heterogeneous_columns_are_text() {
        assert_eq!(SqlType::infer(&[CellValue::Null]), SqlType::Text);
        let mixed = [
            CellValue::Timestamp("2024-01-01 00:00:00".into()),
            CellValue::Integer(2),
        ];
        assert_eq!(SqlType::infer(&mixed), SqlType::Text);
    }
}
