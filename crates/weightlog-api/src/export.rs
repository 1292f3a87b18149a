// SPDX-License-Identifier: Apache-2.0

use weightlog_model::ExportRow;

pub const CSV_HEADER: &str = "date,weightKg,note";

/// Renders export rows as RFC 4180 CSV with a header line.
#[must_use]
pub fn export_csv(rows: &[ExportRow]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + rows.len() * 48);
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");
    for row in rows {
        out.push_str(&row.date);
        out.push(',');
        out.push_str(&row.weight_kg.to_string());
        out.push(',');
        push_field(&mut out, &row.note);
        out.push_str("\r\n");
    }
    out
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, kg: f64, note: &str) -> ExportRow {
        ExportRow {
            date: date.to_string(),
            weight_kg: kg,
            note: note.to_string(),
        }
    }

    #[test]
    fn empty_export_is_header_only() {
        assert_eq!(export_csv(&[]), "date,weightKg,note\r\n");
    }

    #[test]
    fn notes_are_quoted_when_needed() {
        let csv = export_csv(&[
            row("2024-01-01T08:00:00.000Z", 80.5, ""),
            row("2024-01-02T08:00:00.000Z", 80.0, "big dinner, \"oops\""),
        ]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[1], "2024-01-01T08:00:00.000Z,80.5,");
        assert_eq!(lines[2], "2024-01-02T08:00:00.000Z,80,\"big dinner, \"\"oops\"\"\"");
    }
}
