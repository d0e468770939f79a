use std::path::Path;

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::model::{CellValue, Table};

/// A single-file SQLite database receiving one table per worksheet.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database at `path`, creating the file if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Drops any table named like `table` and recreates it with its rows.
    ///
    /// The whole replacement runs in one transaction: on error the previous
    /// table, if any, is left untouched.
    pub fn replace_table(&mut self, table: &Table) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            &format!("DROP TABLE IF EXISTS {}", quote_identifier(&table.name)),
            [],
        )?;
        tx.execute(&create_table_sql(table), [])?;

        {
            let mut insert = tx.prepare(&insert_sql(table))?;
            for row in 0..table.row_count {
                let cells = table.columns.iter().map(|column| &column.values[row]);
                insert.execute(params_from_iter(cells))?;
            }
        }

        tx.commit()?;
        debug!(table = %table.name, rows = table.row_count, "table replaced");
        Ok(())
    }

    /// Flushes and closes the connection.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, error)| ConvertError::from(error))
    }
}

fn create_table_sql(table: &Table) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            format!(
                "{} {}",
                quote_identifier(&column.name),
                column.sql_type.as_sql()
            )
        })
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        quote_identifier(&table.name),
        columns.join(", ")
    )
}

fn insert_sql(table: &Table) -> String {
    let names: Vec<String> = table
        .columns
        .iter()
        .map(|column| quote_identifier(&column.name))
        .collect();
    let placeholders = vec!["?"; table.columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(&table.name),
        names.join(", "),
        placeholders
    )
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
            CellValue::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            CellValue::Real(value) => ToSqlOutput::Owned(Value::Real(*value)),
            CellValue::Boolean(value) => ToSqlOutput::Owned(Value::Integer(i64::from(*value))),
            CellValue::Text(value) | CellValue::Timestamp(value) => {
                ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes()))
            }
        })
    }
}
