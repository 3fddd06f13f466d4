// Column names of the FSA local authority enforcement returns and the
// display aliases the charts use for them.
//
// Every chart projects from this list, so the header is checked against it
// once right after loading instead of at each projection.
use crate::error::{ReportError, Result};
use crate::types::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Numeric,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub source: &'static str,
    pub alias: &'static str,
    pub kind: ColumnKind,
}

const fn text(source: &'static str, alias: &'static str) -> ColumnSpec {
    ColumnSpec { source, alias, kind: ColumnKind::Text }
}

const fn numeric(source: &'static str, alias: &'static str) -> ColumnSpec {
    ColumnSpec { source, alias, kind: ColumnKind::Numeric }
}

pub const COUNTRY: ColumnSpec = text("Country", "Country");
pub const LA_NAME: ColumnSpec = text("LA Name", "LA Name");
pub const TOTAL_ESTABLISHMENTS: ColumnSpec = numeric(
    "Total number of establishments (including not yet rated and outside)(1)",
    "Total establishments",
);
pub const SEIZURE: ColumnSpec = numeric(
    "Total number of establishments subject to formal enforcement action - Seizure, detention and surrender of food",
    "Enforcement actions",
);
pub const SIMPLE_CAUTIONS: ColumnSpec = numeric(
    "Total number of establishments subject to formal enforcement actions - Simple cautions",
    "Simple cautions",
);
pub const IMPROVEMENT_NOTICES: ColumnSpec = numeric(
    "Total number of establishments subject to formal enforcement actions - Improvement notices",
    "Improvement notices",
);
pub const WRITTEN_WARNINGS: ColumnSpec = numeric(
    "Total number of establishments subject to Written warnings",
    "Written warnings",
);
pub const PROSECUTIONS: ColumnSpec = numeric(
    "Total number of establishments subject to formal enforcement action - Prosecutions concluded",
    "Prosecutions concluded",
);
pub const PCT_A_TO_C: ColumnSpec = numeric(
    "Total % of interventions achieved (premises rated A-C)",
    "% interventions achieved (A-C)",
);
pub const PCT_A: ColumnSpec = numeric(
    "Total % of interventions achieved - premises rated A",
    "% interventions achieved (A)",
);
pub const PCT_B: ColumnSpec = numeric(
    "Total % of interventions achieved - premises rated B",
    "% interventions achieved (B)",
);
pub const PCT_C: ColumnSpec = numeric(
    "Total % of interventions achieved - premises rated C",
    "% interventions achieved (C)",
);

/// Grouping key shared by all three charts.
pub const GROUP_KEY: &str = LA_NAME.alias;

pub const LINE_COLUMNS: &[ColumnSpec] = &[
    COUNTRY,
    LA_NAME,
    TOTAL_ESTABLISHMENTS,
    SEIZURE,
    PCT_A_TO_C,
    PCT_A,
    PCT_B,
    PCT_C,
];

pub const STACKED_BAR_COLUMNS: &[ColumnSpec] = &[LA_NAME, PCT_A, PCT_B, PCT_C];

pub const SCATTER_COLUMNS: &[ColumnSpec] = &[
    LA_NAME,
    SEIZURE,
    SIMPLE_CAUTIONS,
    IMPROVEMENT_NOTICES,
    WRITTEN_WARNINGS,
    PROSECUTIONS,
];

/// Every source column any chart reads, in first-use order.
pub const REQUIRED_COLUMNS: &[ColumnSpec] = &[
    COUNTRY,
    LA_NAME,
    TOTAL_ESTABLISHMENTS,
    SEIZURE,
    SIMPLE_CAUTIONS,
    IMPROVEMENT_NOTICES,
    WRITTEN_WARNINGS,
    PROSECUTIONS,
    PCT_A_TO_C,
    PCT_A,
    PCT_B,
    PCT_C,
];

/// `(source, alias)` pairs for the projector.
pub fn projection(specs: &[ColumnSpec]) -> Vec<(&'static str, &'static str)> {
    specs.iter().map(|c| (c.source, c.alias)).collect()
}

/// Aliases of the numeric columns in `specs`, in order.
pub fn numeric_aliases(specs: &[ColumnSpec]) -> Vec<&'static str> {
    specs
        .iter()
        .filter(|c| c.kind == ColumnKind::Numeric)
        .map(|c| c.alias)
        .collect()
}

/// Reports every required column absent from the table's header.
pub fn validate(table: &Table) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| table.column_index(c.source).is_none())
        .map(|c| c.source.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReportError::MissingColumns(missing))
    }
}

/// Header containing every required column, used by tests to build fixtures.
#[cfg(test)]
pub fn full_header() -> Vec<String> {
    REQUIRED_COLUMNS.iter().map(|c| c.source.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_full_header() {
        let table = Table::new(full_header(), vec![]);
        assert!(validate(&table).is_ok());
    }

    #[test]
    fn test_validate_lists_every_missing_column() {
        let header: Vec<String> = full_header()
            .into_iter()
            .filter(|c| c != "Country" && c != PCT_B.source)
            .collect();
        let err = validate(&Table::new(header, vec![])).unwrap_err();
        match err {
            ReportError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Country".to_string(), PCT_B.source.to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_numeric_aliases_skip_text_columns() {
        let aliases = numeric_aliases(LINE_COLUMNS);
        assert_eq!(aliases.len(), 6);
        assert!(!aliases.contains(&"Country"));
        assert!(!aliases.contains(&GROUP_KEY));
    }

    #[test]
    fn test_every_chart_column_is_required() {
        for spec in LINE_COLUMNS.iter().chain(STACKED_BAR_COLUMNS).chain(SCATTER_COLUMNS) {
            assert!(REQUIRED_COLUMNS.iter().any(|c| c.source == spec.source));
        }
    }
}
