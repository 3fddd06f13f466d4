use crate::error::Result;
use crate::types::Frame;
use crate::util::format_number;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};
use tracing::debug;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = rows.len(), "Wrote CSV");
    Ok(())
}

/// Writes the index as the first column, named after the index axis.
pub fn write_frame_csv(path: &Path, frame: &Frame) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let index_name = frame.index_name.as_deref().unwrap_or("");
    wtr.write_record(std::iter::once(index_name).chain(frame.columns.iter().map(String::as_str)))?;
    for (label, row) in frame.index.iter().zip(&frame.values) {
        let mut record = vec![label.clone()];
        record.extend(row.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = frame.index.len(), "Wrote CSV");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

fn frame_preview(frame: &Frame, max_rows: usize) -> Option<String> {
    if frame.index.is_empty() {
        return None;
    }
    let mut builder = Builder::default();
    let index_name = frame.index_name.clone().unwrap_or_default();
    builder.push_record(std::iter::once(index_name).chain(frame.columns.iter().cloned()));
    for (label, row) in frame.index.iter().zip(&frame.values).take(max_rows) {
        builder.push_record(
            std::iter::once(label.clone()).chain(row.iter().map(|v| format_number(*v, 2))),
        );
    }
    let mut table = builder.build();
    table.with(Style::markdown());
    Some(table.to_string())
}

pub fn preview_frame(frame: &Frame, max_rows: usize) {
    match frame_preview(frame, max_rows) {
        Some(table_str) => println!("{}\n", table_str),
        None => println!("(no rows)\n"),
    }
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScatterPoint;

    fn sample_frame() -> Frame {
        Frame {
            index_name: Some("LA Name".to_string()),
            columns_name: None,
            index: vec!["Anytown".to_string(), "Bigcity".to_string()],
            columns: vec!["Total".to_string()],
            values: vec![vec![15.0], vec![1234.5]],
        }
    }

    #[test]
    fn test_write_frame_csv_puts_index_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.csv");
        write_frame_csv(&path, &sample_frame()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "LA Name,Total\nAnytown,15\nBigcity,1234.5\n");
    }

    #[test]
    fn test_write_csv_uses_serde_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        let points = vec![ScatterPoint { la_name: "Anytown".into(), x: 3.0, y: 55.0 }];
        write_csv(&path, &points).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("LA Name,SeizureActions,OtherEnforcementActions\n"));
        assert!(contents.contains("Anytown,3.0,55.0"));
    }

    #[test]
    fn test_write_json_is_pretty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &serde_json::json!({ "rows_loaded": 2 })).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "{\n  \"rows_loaded\": 2\n}");
    }

    #[test]
    fn test_frame_preview_limits_rows() {
        let preview = frame_preview(&sample_frame(), 1).unwrap();
        assert!(preview.contains("Anytown"));
        assert!(preview.contains("15.00"));
        assert!(!preview.contains("Bigcity"));
    }
}
