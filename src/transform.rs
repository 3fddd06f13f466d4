use crate::error::{ReportError, Result};
use crate::types::{Frame, InvalidValuePolicy, Table};
use crate::util::parse_f64_safe;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub input_rows: usize,
    pub groups: usize,
    pub missing_keys: usize,
    pub coerced_cells: usize,
    pub skipped_rows: usize,
}

/// Keep only `columns` (source name, alias), in that order, renamed to
/// their aliases.
pub fn project(table: &Table, columns: &[(&str, &str)]) -> Result<Table> {
    let mut positions = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();
    for (source, _) in columns {
        match table.column_index(source) {
            Some(i) => positions.push(i),
            None => missing.push(source.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(ReportError::MissingColumns(missing));
    }

    let header = columns.iter().map(|(_, alias)| alias.to_string()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| positions.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Ok(Table::with_source_rows(
        header,
        rows,
        table.source_rows().to_vec(),
    ))
}

/// Group rows by the `key` column and sum every column in `numeric`.
///
/// Keys are compared verbatim and come out sorted. Rows with an empty key
/// are left out. Empty numeric cells count as zero; any other unparseable
/// cell is handled according to `policy`. Columns that are neither the key
/// nor listed in `numeric` do not appear in the result.
pub fn group_sum(
    table: &Table,
    key: &str,
    numeric: &[&str],
    policy: InvalidValuePolicy,
) -> Result<(Frame, GroupStats)> {
    let key_idx = table
        .column_index(key)
        .ok_or_else(|| ReportError::MissingColumns(vec![key.to_string()]))?;
    let mut value_idx = Vec::with_capacity(numeric.len());
    let mut missing = Vec::new();
    for name in numeric {
        match table.column_index(name) {
            Some(i) => value_idx.push(i),
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(ReportError::MissingColumns(missing));
    }

    for (i, name) in table.columns().iter().enumerate() {
        if i != key_idx && !value_idx.contains(&i) {
            debug!(column = %name, "Dropping non-numeric column from aggregation");
        }
    }

    let mut stats = GroupStats {
        input_rows: table.len(),
        ..GroupStats::default()
    };
    let mut sums: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    'rows: for (row_no, row) in table.rows().iter().enumerate() {
        let group = &row[key_idx];
        if group.is_empty() {
            stats.missing_keys += 1;
            continue;
        }

        let mut parsed = Vec::with_capacity(value_idx.len());
        let mut coerced = 0usize;
        for (&i, name) in value_idx.iter().zip(numeric) {
            let cell = row[i].as_str();
            if cell.trim().is_empty() {
                parsed.push(0.0);
                continue;
            }
            match parse_f64_safe(Some(cell)) {
                Some(v) => parsed.push(v),
                None => match policy {
                    InvalidValuePolicy::Error => {
                        return Err(ReportError::InvalidNumber {
                            column: name.to_string(),
                            row: table.source_row(row_no),
                            value: cell.to_string(),
                        });
                    }
                    InvalidValuePolicy::Zero => {
                        coerced += 1;
                        parsed.push(0.0);
                    }
                    InvalidValuePolicy::SkipRow => {
                        debug!(row = table.source_row(row_no), column = %name, value = cell, "Skipping row");
                        stats.skipped_rows += 1;
                        continue 'rows;
                    }
                },
            }
        }
        stats.coerced_cells += coerced;

        let acc = sums
            .entry(group.clone())
            .or_insert_with(|| vec![0.0; value_idx.len()]);
        for (total, v) in acc.iter_mut().zip(parsed) {
            *total += v;
        }
    }

    if stats.coerced_cells > 0 {
        warn!(cells = stats.coerced_cells, "Counted non-numeric cells as zero");
    }
    if stats.skipped_rows > 0 {
        warn!(rows = stats.skipped_rows, "Skipped rows with non-numeric cells");
    }
    stats.groups = sums.len();

    let (index, values) = sums.into_iter().unzip();
    let frame = Frame {
        index_name: Some(key.to_string()),
        columns_name: None,
        index,
        columns: numeric.iter().map(|c| c.to_string()).collect(),
        values,
    };
    Ok((frame, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_project_follows_requested_order() {
        let t = table(&["c", "a", "b"], &[&["3", "1", "2"]]);
        let p = project(&t, &[("a", "Alpha"), ("b", "Beta"), ("c", "Gamma")]).unwrap();

        assert_eq!(p.columns(), ["Alpha", "Beta", "Gamma"]);
        assert_eq!(p.rows()[0], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_project_reports_missing_columns() {
        let t = table(&["a"], &[]);
        let err = project(&t, &[("a", "A"), ("x", "X"), ("y", "Y")]).unwrap_err();
        match err {
            ReportError::MissingColumns(cols) => assert_eq!(cols, vec!["x", "y"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_group_sum_adds_duplicate_keys() {
        let t = table(
            &["LA Name", "Total"],
            &[&["Anytown", "10"], &["Otherville", "7"], &["Anytown", "5"]],
        );
        let (frame, stats) =
            group_sum(&t, "LA Name", &["Total"], InvalidValuePolicy::Error).unwrap();

        assert_eq!(frame.index, vec!["Anytown", "Otherville"]);
        assert_eq!(frame.row("Anytown"), Some(&[15.0][..]));
        assert_eq!(frame.row("Otherville"), Some(&[7.0][..]));
        assert_eq!(stats.groups, 2);
    }

    #[test]
    fn test_group_keys_are_not_normalized() {
        let t = table(
            &["LA Name", "Total"],
            &[&["Anytown", "1"], &["anytown", "2"], &["Anytown ", "4"]],
        );
        let (frame, _) = group_sum(&t, "LA Name", &["Total"], InvalidValuePolicy::Error).unwrap();

        assert_eq!(frame.index.len(), 3);
        assert_eq!(frame.row("Anytown "), Some(&[4.0][..]));
    }

    #[test]
    fn test_text_columns_are_dropped() {
        let t = table(
            &["Country", "LA Name", "Total"],
            &[&["England", "Anytown", "3"], &["Wales", "Anytown", "4"]],
        );
        let (frame, _) = group_sum(&t, "LA Name", &["Total"], InvalidValuePolicy::Error).unwrap();

        assert_eq!(frame.columns, vec!["Total"]);
        assert_eq!(frame.values, vec![vec![7.0]]);
    }

    #[test]
    fn test_empty_cells_and_keys() {
        let t = table(
            &["LA Name", "Total"],
            &[&["Anytown", ""], &["", "9"], &["Anytown", "2"]],
        );
        let (frame, stats) =
            group_sum(&t, "LA Name", &["Total"], InvalidValuePolicy::Error).unwrap();

        assert_eq!(frame.index, vec!["Anytown"]);
        assert_eq!(frame.values, vec![vec![2.0]]);
        assert_eq!(stats.missing_keys, 1);
    }

    #[test]
    fn test_invalid_value_policies() {
        let t = table(
            &["LA Name", "Total", "Pct"],
            &[&["Anytown", "4", "NR"], &["Anytown", "6", "50"]],
        );

        let err = group_sum(&t, "LA Name", &["Total", "Pct"], InvalidValuePolicy::Error)
            .unwrap_err();
        match err {
            ReportError::InvalidNumber { column, row, value } => {
                assert_eq!((column.as_str(), row, value.as_str()), ("Pct", 1, "NR"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let (frame, stats) =
            group_sum(&t, "LA Name", &["Total", "Pct"], InvalidValuePolicy::Zero).unwrap();
        assert_eq!(frame.values, vec![vec![10.0, 50.0]]);
        assert_eq!(stats.coerced_cells, 1);

        let (frame, stats) =
            group_sum(&t, "LA Name", &["Total", "Pct"], InvalidValuePolicy::SkipRow).unwrap();
        assert_eq!(frame.values, vec![vec![6.0, 50.0]]);
        assert_eq!(stats.skipped_rows, 1);
    }

    #[test]
    fn test_transpose_twice_is_identity() {
        let t = table(
            &["LA Name", "A", "B", "C"],
            &[&["X", "1", "2", "3"], &["Y", "4", "5", "6"]],
        );
        let (frame, _) =
            group_sum(&t, "LA Name", &["A", "B", "C"], InvalidValuePolicy::Error).unwrap();
        let flipped = frame.transpose();

        assert_eq!(flipped.index, vec!["A", "B", "C"]);
        assert_eq!(flipped.columns, vec!["X", "Y"]);
        assert_eq!(flipped.column("Y"), Some(vec![4.0, 5.0, 6.0]));
        assert_eq!(flipped.transpose(), frame);
    }

    #[test]
    fn test_invalid_number_reports_file_row_after_skipped_rows() {
        // Row 1 of the file was dropped by the loader, so "NR" is data row 2.
        let t = Table::with_source_rows(
            vec!["LA Name".to_string(), "Total".to_string()],
            vec![vec!["B".to_string(), "NR".to_string()]],
            vec![2],
        );
        let projected = project(&t, &[("LA Name", "LA Name"), ("Total", "Total")]).unwrap();
        assert_eq!(projected.source_rows(), [2]);

        let err = group_sum(&projected, "LA Name", &["Total"], InvalidValuePolicy::Error)
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidNumber { row: 2, .. }));
    }
}
