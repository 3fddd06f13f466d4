use serde::Serialize;
use tabled::Tabled;

/// Raw CSV contents: a header plus rows of text cells of the same width.
///
/// Each row remembers its 1-based data row number in the source file, which
/// differs from its position once the loader has skipped rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    source_rows: Vec<usize>,
}

impl Table {
    /// Builds a table numbering rows 1, 2, 3... and padding short rows with
    /// empty cells.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let source_rows = (1..=rows.len()).collect();
        Self::with_source_rows(columns, rows, source_rows)
    }

    /// Like [`Table::new`] with explicit source row numbers, one per row.
    pub fn with_source_rows(
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        source_rows: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(rows.len(), source_rows.len());
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            columns,
            rows,
            source_rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    /// Source file data row number of the row at `position`.
    pub fn source_row(&self, position: usize) -> usize {
        self.source_rows
            .get(position)
            .copied()
            .unwrap_or(position + 1)
    }
}

/// A numeric table with string row labels.
///
/// `values[row][col]` lines up with `index[row]` and `columns[col]`. The
/// optional axis names travel with their axis when the frame is transposed.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index_name: Option<String>,
    pub columns_name: Option<String>,
    pub index: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[cfg(test)]
    pub fn row(&self, label: &str) -> Option<&[f64]> {
        let i = self.index.iter().position(|l| l == label)?;
        Some(&self.values[i])
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let j = self.columns.iter().position(|c| c == name)?;
        Some(self.values.iter().map(|row| row[j]).collect())
    }

    /// Swaps the row and column axes, including their names.
    pub fn transpose(&self) -> Frame {
        let values = (0..self.columns.len())
            .map(|j| self.values.iter().map(|row| row[j]).collect())
            .collect();
        Frame {
            index_name: self.columns_name.clone(),
            columns_name: self.index_name.clone(),
            index: self.columns.clone(),
            columns: self.index.clone(),
            values,
        }
    }
}

/// What to do with a non-empty cell that does not parse as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidValuePolicy {
    /// Abort the chart.
    #[default]
    Error,
    /// Count the cell as zero.
    Zero,
    /// Drop the whole row before grouping.
    SkipRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Line,
    StackedBar,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Line, ChartKind::StackedBar, ChartKind::Scatter];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::StackedBar => "stacked_bar",
            ChartKind::Scatter => "scatter",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Line => "Local Authority Food Law Enforcement Returns",
            ChartKind::StackedBar => "Interventions Achieved by Local Authority",
            ChartKind::Scatter => "Number of Enforcement",
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ScatterPoint {
    #[serde(rename = "LA Name")]
    #[tabled(rename = "LA Name")]
    pub la_name: String,
    #[serde(rename = "SeizureActions")]
    #[tabled(rename = "SeizureActions")]
    pub x: f64,
    #[serde(rename = "OtherEnforcementActions")]
    #[tabled(rename = "OtherEnforcementActions")]
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct ChartOutcome {
    pub chart: ChartKind,
    pub status: &'static str,
    pub groups: usize,
    pub svg: Option<String>,
    pub data: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub rows_loaded: usize,
    pub on_invalid: InvalidValuePolicy,
    pub charts: Vec<ChartOutcome>,
}
