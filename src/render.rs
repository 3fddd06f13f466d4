// SVG rendering of the three chart views with `plotters`.
//
// Each builder draws one finished chart into the file at `path`. A view
// with no local authorities in it is refused with
// [`ReportError::EmptyChart`] and nothing is written.

use crate::error::{ReportError, Result};
use crate::types::{ChartKind, Frame, ScatterPoint};
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

const LINE_SIZE: (u32, u32) = (1200, 5000);
const STACKED_BAR_SIZE: (u32, u32) = (4000, 600);
const SCATTER_SIZE: (u32, u32) = (1000, 600);

fn draw_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Render(e.to_string())
}

/// Axis range covering zero and every finite value, padded above.
fn value_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((hi - lo) * 0.05).max(1.0);
    let lo = if lo < 0.0 { lo - pad } else { lo };
    lo..hi + pad
}

fn category_label(labels: &[String], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

/// One line per frame column across the frame's rows.
///
/// Expects the transposed view: rows are metrics, columns are local
/// authorities, so the legend names each authority.
pub fn render_line_chart(frame: &Frame, path: &Path) -> Result<()> {
    if frame.columns.is_empty() || frame.index.is_empty() {
        return Err(ReportError::EmptyChart(ChartKind::Line.name()));
    }
    let metrics = &frame.index;

    let root = SVGBackend::new(path, LINE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(ChartKind::Line.title(), ("sans-serif", 40).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(
            (0..metrics.len()).into_segmented(),
            value_range(frame.values.iter().flatten().copied()),
        )
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(metrics.len() + 1)
        .x_label_formatter(&|v| category_label(metrics, v))
        .x_desc("Different Establishment over year 2003-2017")
        .y_desc("Count / Percentage")
        .draw()
        .map_err(draw_err)?;

    for (j, la_name) in frame.columns.iter().enumerate() {
        let color = Palette99::pick(j).to_rgba();
        let series = frame
            .values
            .iter()
            .enumerate()
            .map(|(i, row)| (SegmentValue::CenterOf(i), row[j]));
        chart
            .draw_series(LineSeries::new(series, color.stroke_width(2)))
            .map_err(draw_err)?
            .label(la_name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

/// One bar per frame row with the row's values stacked bottom to top in
/// column order.
pub fn render_stacked_bar_chart(frame: &Frame, path: &Path) -> Result<()> {
    if frame.is_empty() {
        return Err(ReportError::EmptyChart(ChartKind::StackedBar.name()));
    }
    let names = &frame.index;
    let totals = frame.values.iter().map(|row| row.iter().sum::<f64>());

    let root = SVGBackend::new(path, STACKED_BAR_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(ChartKind::StackedBar.title(), ("sans-serif", 30).into_font())
        .margin(20)
        .x_label_area_size(220)
        .y_label_area_size(80)
        .build_cartesian_2d((0..names.len()).into_segmented(), value_range(totals))
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len() + 1)
        .x_label_style(
            ("sans-serif", 10)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_label_formatter(&|v| category_label(names, v))
        .x_desc("Local Authority")
        .y_desc("Percentage of Premises")
        .draw()
        .map_err(draw_err)?;

    let mut base = vec![0.0f64; names.len()];
    for (j, column) in frame.columns.iter().enumerate() {
        let color = Palette99::pick(j).to_rgba();
        let bars: Vec<_> = frame
            .values
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let bottom = base[i];
                let top = bottom + row[j];
                base[i] = top;
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), bottom), (SegmentValue::Exact(i + 1), top)],
                    color.filled(),
                );
                bar.set_margin(0, 0, 2, 2);
                bar
            })
            .collect();
        chart
            .draw_series(bars)
            .map_err(draw_err)?
            .label(column.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

pub fn render_scatter_chart(points: &[ScatterPoint], path: &Path) -> Result<()> {
    if points.is_empty() {
        return Err(ReportError::EmptyChart(ChartKind::Scatter.name()));
    }

    let root = SVGBackend::new(path, SCATTER_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(ChartKind::Scatter.title(), ("sans-serif", 30).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            value_range(points.iter().map(|p| p.x)),
            value_range(points.iter().map(|p| p.y)),
        )
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Number of Establishments Subject to Formal Enforcement Action")
        .y_desc("Number of Enforcement Actions Taken")
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|p| Circle::new((p.x, p.y), 4, BLUE.mix(0.7).filled())),
        )
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}
