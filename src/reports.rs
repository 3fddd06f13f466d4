// Per-chart views over the loaded returns. Each view is a pure function of
// the shared table, so the dataset is read once and never mutated.
use crate::error::Result;
use crate::schema::{
    self, ColumnSpec, GROUP_KEY, IMPROVEMENT_NOTICES, LINE_COLUMNS, PROSECUTIONS,
    SCATTER_COLUMNS, SEIZURE, SIMPLE_CAUTIONS, STACKED_BAR_COLUMNS, WRITTEN_WARNINGS,
};
use crate::transform::{group_sum, project, GroupStats};
use crate::types::{Frame, InvalidValuePolicy, ScatterPoint, Table};
use tracing::debug;

fn grouped(
    table: &Table,
    specs: &[ColumnSpec],
    policy: InvalidValuePolicy,
) -> Result<(Frame, GroupStats)> {
    let projected = project(table, &schema::projection(specs))?;
    let (frame, stats) = group_sum(&projected, GROUP_KEY, &schema::numeric_aliases(specs), policy)?;
    debug!(
        rows = stats.input_rows,
        groups = stats.groups,
        missing_keys = stats.missing_keys,
        "Grouped by local authority"
    );
    Ok((frame, stats))
}

/// Totals per local authority, transposed so that each authority is a
/// column and each metric a row. One line is drawn per column.
pub fn line_chart_view(table: &Table, policy: InvalidValuePolicy) -> Result<Frame> {
    let (frame, _) = grouped(table, LINE_COLUMNS, policy)?;
    Ok(frame.transpose())
}

/// Intervention percentages for bands A, B and C per local authority.
pub fn stacked_bar_view(table: &Table, policy: InvalidValuePolicy) -> Result<Frame> {
    let (frame, _) = grouped(table, STACKED_BAR_COLUMNS, policy)?;
    Ok(frame)
}

/// One point per local authority: seizures against the other four kinds of
/// enforcement action added together.
pub fn scatter_view(table: &Table, policy: InvalidValuePolicy) -> Result<Vec<ScatterPoint>> {
    let (frame, _) = grouped(table, SCATTER_COLUMNS, policy)?;
    let column = |spec: &ColumnSpec| {
        frame
            .column(spec.alias)
            .unwrap_or_else(|| vec![0.0; frame.index.len()])
    };
    let seizures = column(&SEIZURE);
    let others: Vec<Vec<f64>> = [SIMPLE_CAUTIONS, IMPROVEMENT_NOTICES, WRITTEN_WARNINGS, PROSECUTIONS]
        .iter()
        .map(column)
        .collect();

    let points = frame
        .index
        .iter()
        .enumerate()
        .map(|(i, la_name)| ScatterPoint {
            la_name: la_name.clone(),
            x: seizures[i],
            y: others.iter().map(|c| c[i]).sum(),
        })
        .collect();
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{full_header, PCT_A, PCT_A_TO_C, PCT_B, PCT_C, TOTAL_ESTABLISHMENTS};

    /// Builds a full-schema table where each row sets only the named columns.
    fn table(rows: &[&[(&str, &str)]]) -> Table {
        let header = full_header();
        let rows = rows
            .iter()
            .map(|cells| {
                header
                    .iter()
                    .map(|col| {
                        cells
                            .iter()
                            .find(|(name, _)| name == col)
                            .map(|(_, v)| v.to_string())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        Table::new(header, rows)
    }

    #[test]
    fn test_stacked_bar_single_rows_pass_through() {
        let t = table(&[
            &[("LA Name", "A"), (PCT_A.source, "50"), (PCT_B.source, "30"), (PCT_C.source, "20")],
            &[("LA Name", "B"), (PCT_A.source, "60"), (PCT_B.source, "20"), (PCT_C.source, "20")],
        ]);
        let frame = stacked_bar_view(&t, InvalidValuePolicy::Error).unwrap();

        assert_eq!(frame.index, vec!["A", "B"]);
        assert_eq!(frame.columns, vec![PCT_A.alias, PCT_B.alias, PCT_C.alias]);
        assert_eq!(frame.row("A"), Some(&[50.0, 30.0, 20.0][..]));
        assert_eq!(frame.row("B"), Some(&[60.0, 20.0, 20.0][..]));
    }

    #[test]
    fn test_line_view_has_one_column_per_authority() {
        let t = table(&[
            &[("Country", "England"), ("LA Name", "Anytown"), (TOTAL_ESTABLISHMENTS.source, "10")],
            &[("Country", "England"), ("LA Name", "Anytown"), (TOTAL_ESTABLISHMENTS.source, "5")],
            &[("Country", "Wales"), ("LA Name", "Cardiff"), (PCT_A_TO_C.source, "90")],
        ]);
        let frame = line_chart_view(&t, InvalidValuePolicy::Error).unwrap();

        assert_eq!(frame.columns, vec!["Anytown", "Cardiff"]);
        assert_eq!(frame.index.len(), 6);
        assert!(!frame.index.iter().any(|m| m == "Country"));
        assert_eq!(frame.row(TOTAL_ESTABLISHMENTS.alias), Some(&[15.0, 0.0][..]));
        assert_eq!(frame.row(PCT_A_TO_C.alias), Some(&[0.0, 90.0][..]));
    }

    #[test]
    fn test_scatter_sums_other_actions() {
        let t = table(&[
            &[
                ("LA Name", "Anytown"),
                (SEIZURE.source, "2"),
                (SIMPLE_CAUTIONS.source, "1"),
                (IMPROVEMENT_NOTICES.source, "3"),
                (WRITTEN_WARNINGS.source, "40"),
                (PROSECUTIONS.source, "1"),
            ],
            &[("LA Name", "Anytown"), (SEIZURE.source, "1"), (WRITTEN_WARNINGS.source, "10")],
            &[("LA Name", "Bigcity"), (IMPROVEMENT_NOTICES.source, "7")],
        ]);
        let points = scatter_view(&t, InvalidValuePolicy::Error).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].la_name, "Anytown");
        assert_eq!((points[0].x, points[0].y), (3.0, 55.0));
        assert_eq!((points[1].x, points[1].y), (0.0, 7.0));
    }

    #[test]
    fn test_views_of_empty_table_are_empty() {
        let t = table(&[]);
        assert!(stacked_bar_view(&t, InvalidValuePolicy::Error).unwrap().is_empty());
        assert!(scatter_view(&t, InvalidValuePolicy::Error).unwrap().is_empty());
        assert!(line_chart_view(&t, InvalidValuePolicy::Error)
            .unwrap()
            .columns
            .is_empty());
    }
}
