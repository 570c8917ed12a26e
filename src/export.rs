//! Tabular and JSON output for parsed neighbor records.
//!
//! CSV output has a fixed five-column layout. `port_id` and
//! `management_address` are parsed but never written to CSV; use
//! [`write_json`] when every field is needed.

use std::io::{self, Write};

use crate::neighbor::NeighborRecord;

/// CSV header, in column order.
pub const CSV_COLUMNS: [&str; 5] = [
    "device_id",
    "ip_address",
    "platform",
    "capabilities",
    "interface",
];

/// Cells of one CSV row, in [`CSV_COLUMNS`] order. Missing values are empty.
pub fn csv_row(record: &NeighborRecord) -> [&str; 5] {
    [
        record.device_id.as_str(),
        record.ip_address.as_deref().unwrap_or_default(),
        record.platform.as_deref().unwrap_or_default(),
        record.capabilities.as_deref().unwrap_or_default(),
        record.interface.as_deref().unwrap_or_default(),
    ]
}

fn write_cell<W: Write>(writer: &mut W, cell: &str) -> io::Result<()> {
    if cell.contains([',', '"', '\r', '\n']) {
        write!(writer, "\"{}\"", cell.replace('"', "\"\""))
    } else {
        writer.write_all(cell.as_bytes())
    }
}

fn write_row<W: Write>(writer: &mut W, cells: &[&str]) -> io::Result<()> {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        write_cell(writer, cell)?;
    }
    writer.write_all(b"\r\n")
}

/// Writes a header row followed by one row per record.
pub fn write_csv<W: Write>(records: &[NeighborRecord], mut writer: W) -> io::Result<()> {
    write_row(&mut writer, &CSV_COLUMNS)?;
    for record in records {
        write_row(&mut writer, &csv_row(record))?;
    }
    writer.flush()
}

/// Renders records as CSV text.
pub fn to_csv_string(records: &[NeighborRecord]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_csv(records, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Writes records as a JSON array with every parsed field.
pub fn write_json<W: Write>(
    records: &[NeighborRecord],
    writer: W,
    pretty: bool,
) -> serde_json::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, records)
    } else {
        serde_json::to_writer(writer, records)
    }
}
