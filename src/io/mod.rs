pub mod excel_read;
pub mod sqlite_write;
