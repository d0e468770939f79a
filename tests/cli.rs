use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use rusqlite::Connection;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

fn run_cli(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sheet2db"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "info")
        .output()
        .expect("binary ran")
}

fn write_workbook_with_blank_sheet(path: &Path) {
    let mut workbook = Workbook::new();
    let orders = workbook.add_worksheet();
    orders.set_name("Orders").expect("sheet named");
    orders.write_string(0, 0, "Order Id").expect("header written");
    orders.write_number(1, 0, 1.0).expect("cell written");
    orders.write_number(2, 0, 2.0).expect("cell written");
    let blank = workbook.add_worksheet();
    blank.set_name("Empty").expect("sheet named");
    workbook.save(path).expect("workbook saved");
}

#[test]
fn no_workbooks_found_exits_with_failure() {
    let temp_dir = tempdir().expect("temporary directory");

    let output = run_cli(temp_dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no Excel files found"), "stderr: {stderr}");
}

#[test]
fn unresolvable_paths_exit_with_failure() {
    let temp_dir = tempdir().expect("temporary directory");

    let output = run_cli(temp_dir.path(), &["missing.xlsx", "also_missing.xlsx"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input file not found"), "stderr: {stderr}");
}

#[test]
fn sheet_failure_still_completes_successfully() {
    let temp_dir = tempdir().expect("temporary directory");
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).expect("data directory");
    write_workbook_with_blank_sheet(&data_dir.join("orders.xlsx"));

    let output = run_cli(temp_dir.path(), &[]);

    assert!(output.status.success(), "status: {:?}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("All conversions completed successfully!"),
        "stdout: {stdout}"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error processing sheet"), "stderr: {stderr}");

    let conn = Connection::open(data_dir.join("orders.db")).expect("database opened");
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM Orders", [], |row| row.get(0))
        .expect("rows counted");
    assert_eq!(rows, 2);
}

#[test]
fn missing_paths_are_skipped_when_others_resolve() {
    let temp_dir = tempdir().expect("temporary directory");
    let out_dir = temp_dir.path().join("out");
    write_workbook_with_blank_sheet(&temp_dir.path().join("orders.xlsx"));

    let output = run_cli(
        temp_dir.path(),
        &["missing.xlsx", "orders.xlsx", "--output-dir", "out"],
    );

    assert!(output.status.success(), "status: {:?}", output.status);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input file not found, skipping"), "stderr: {stderr}");
    assert!(out_dir.join("orders.db").exists());
    assert!(!temp_dir.path().join("missing.db").exists());
}

#[test]
fn failed_workbook_is_counted_in_the_completion_line() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(temp_dir.path().join("broken.xlsx"), b"garbage").expect("file written");
    write_workbook_with_blank_sheet(&temp_dir.path().join("orders.xlsx"));

    let output = run_cli(temp_dir.path(), &["broken.xlsx", "orders.xlsx"]);

    assert!(output.status.success(), "status: {:?}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("1 of 2 workbooks failed"),
        "stdout: {stdout}"
    );
    assert!(temp_dir.path().join("orders.db").exists());
}
