//! Flat CSV export of extracted records.
//!
//! Column order is fixed; absent fields become empty cells.

use std::io::{self, Write};

use crate::locator::LocationRecord;

pub const CSV_HEADERS: [&str; 8] = [
    "Name",
    "Street",
    "City",
    "Region",
    "Postal",
    "Phone",
    "Latitude",
    "Longitude",
];

const LINE_END: &str = "\r\n";

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn format_row<S: AsRef<str>>(row: &[S]) -> String {
    let mut line = String::new();
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            line.push('"');
            line.push_str(&cell.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(cell);
        }
    }
    line.push_str(LINE_END);
    line
}

/// Flatten one record into the eight export columns.
#[must_use]
pub fn record_row(record: &LocationRecord) -> [String; 8] {
    let cell = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        cell(&record.name),
        cell(&record.address.street),
        cell(&record.address.city),
        cell(&record.address.region),
        cell(&record.address.postal),
        cell(&record.phone),
        cell(&record.latitude),
        cell(&record.longitude),
    ]
}

/// Write the header row followed by one row per record.
///
/// # Errors
///
/// Propagates any I/O error from `writer`.
pub fn write_csv<W: Write>(mut writer: W, records: &[LocationRecord]) -> io::Result<()> {
    writer.write_all(to_csv_string(records).as_bytes())?;
    writer.flush()
}

/// Render the export as a string.
#[must_use]
pub fn to_csv_string(records: &[LocationRecord]) -> String {
    let mut csv = format_row(&CSV_HEADERS);
    for record in records {
        csv.push_str(&format_row(&record_row(record)));
    }
    csv
}
