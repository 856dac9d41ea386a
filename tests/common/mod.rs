#![allow(dead_code)]

use std::io::Error;
use std::path::Path;
use tempfile::NamedTempFile;

pub const SCRIPT_HEADER: [&str; 6] = ["event", "amount", "token", "status", "payload", "reason"];

/// A script row with only the event column set.
pub fn row(event: &str) -> [String; 6] {
    [event, "", "", "", "", ""].map(String::from)
}

pub fn auth_requested(amount: &str) -> [String; 6] {
    let mut r = row("auth_requested");
    r[1] = amount.to_string();
    r
}

pub fn approve(payload: &str) -> [String; 6] {
    let mut r = row("approve");
    r[4] = payload.to_string();
    r
}

pub fn process_completed(amount: &str, status: &str, payload: &str) -> [String; 6] {
    let mut r = row("process_completed");
    r[1] = amount.to_string();
    r[3] = status.to_string();
    r[4] = payload.to_string();
    r
}

pub fn disconnected(reason: &str) -> [String; 6] {
    let mut r = row("disconnected");
    r[5] = reason.to_string();
    r
}

pub fn write_script(path: &Path, rows: &[[String; 6]]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(SCRIPT_HEADER)?;
    for r in rows {
        wtr.write_record(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `rows` to a fresh temporary script file.
pub fn script(rows: &[[String; 6]]) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    write_script(file.path(), rows).unwrap();
    file
}

/// The happy path: start, connect, authorize, approve, settle.
pub fn success_script() -> Vec<[String; 6]> {
    vec![
        row("start"),
        row("connected"),
        auth_requested("1.00"),
        approve("dummyPayload"),
        row("process_started"),
        process_completed("1.00", "success", "receipt-1"),
    ]
}
