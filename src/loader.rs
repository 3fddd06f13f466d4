use crate::error::{ReportError, Result};
use crate::types::Table;
use crate::util::decode_latin1;
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    pub encoding: TextEncoding,
}

/// Read the returns CSV at `path` into a [`Table`].
///
/// The FSA exports are not reliably UTF-8, so bytes that fail UTF-8
/// validation are decoded as Latin-1 instead. Rows that cannot be parsed or
/// that are wider than the header are skipped and counted.
pub fn load_table(path: impl AsRef<Path>) -> Result<(Table, LoadReport)> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let (text, encoding) = match String::from_utf8(bytes) {
        Ok(s) => (s, TextEncoding::Utf8),
        Err(e) => (decode_latin1(e.as_bytes()), TextEncoding::Latin1),
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    debug!(path = %path.display(), ?encoding, bytes = text.len(), "Decoded input");

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(ReportError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut source_rows: Vec<usize> = Vec::new();

    for result in rdr.records() {
        total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = total_rows, error = %e, "Skipping unparseable row");
                parse_errors += 1;
                continue;
            }
        };
        if record.len() > columns.len() {
            warn!(
                row = total_rows,
                fields = record.len(),
                expected = columns.len(),
                "Skipping row wider than header"
            );
            parse_errors += 1;
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
        source_rows.push(total_rows);
    }

    let report = LoadReport {
        total_rows,
        parse_errors,
        encoding,
    };
    Ok((Table::with_source_rows(columns, rows, source_rows), report))
}
