//! Core library for the sheet2db command line application.
//!
//! Every worksheet of an Excel workbook becomes one table of a SQLite
//! database. Sheet and column labels are turned into safe identifiers by
//! [`identifier`], the workbook and database adapters live under [`io`], the
//! in-memory tables inside [`model`], and the per-workbook orchestration in
//! [`convert`].

pub mod convert;
pub mod error;
pub mod identifier;
pub mod io;
pub mod model;

pub use error::{ConvertError, Result};
