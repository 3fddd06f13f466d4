// Entry point and high-level CLI flow.
//
// - Option [1] loads the enforcement returns CSV and checks its columns.
// - Option [2] renders every selected chart from the loaded table. Each
//   chart runs on its own: a failure is reported and the others still run.
// - After generating charts, the user can go back to the menu or exit.
// - `--batch` loads and generates once without the menu.
mod error;
mod loader;
mod output;
mod render;
mod reports;
mod schema;
mod transform;
mod types;
mod util;

use anyhow::{bail, Context};
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use types::{ChartKind, ChartOutcome, InvalidValuePolicy, RunSummary, Table};

#[derive(Parser, Debug)]
#[command(name = "food_law_charts")]
#[command(about = "Charts from UK local authority food law enforcement returns", long_about = None)]
struct Cli {
    /// Enforcement returns CSV to read
    #[arg(
        short,
        long,
        env = "FOOD_LAW_CSV",
        default_value = "2019-20-enforcement-data-food-standards.csv"
    )]
    input: PathBuf,

    /// Directory the SVG charts, CSV data and summary.json are written to
    #[arg(short, long, env = "FOOD_LAW_OUT_DIR", default_value = "charts")]
    out_dir: PathBuf,

    /// What to do with a numeric cell that is not a number
    #[arg(long, value_enum, default_value_t = InvalidValuePolicy::Error)]
    on_invalid: InvalidValuePolicy,

    /// Chart to draw; repeat for several (default: all three)
    #[arg(short, long = "chart", value_enum)]
    charts: Vec<ChartKind>,

    /// Load and generate once, without the interactive menu
    #[arg(long, default_value_t = false)]
    batch: bool,
}

impl Cli {
    fn selected_charts(&self) -> Vec<ChartKind> {
        if self.charts.is_empty() {
            ChartKind::ALL.to_vec()
        } else {
            self.charts.clone()
        }
    }
}

// The table is loaded once and shared read-only by every chart run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Arc<Table>>,
}

fn app_state() -> std::sync::MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Print a prompt and read one trimmed line. `None` means stdin is closed.
fn prompt(text: &str) -> Option<String> {
    print!("{}", text);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask whether to go back to the chart selection menu.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = prompt("Back to Chart Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the CSV and check it has every column the charts
/// need. On success the table replaces whatever was loaded before.
fn handle_load(path: &Path) -> anyhow::Result<()> {
    let (table, report) = loader::load_table(path)?;
    schema::validate(&table).with_context(|| format!("unexpected layout in {}", path.display()))?;

    info!(
        path = %path.display(),
        rows = table.len(),
        parse_errors = report.parse_errors,
        encoding = ?report.encoding,
        "Loaded enforcement returns"
    );
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        util::format_int(report.total_rows),
        util::format_int(table.len())
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            util::format_int(report.parse_errors)
        );
    }
    if table.is_empty() {
        warn!(path = %path.display(), "File has a header but no data rows");
    }
    if report.encoding == loader::TextEncoding::Latin1 {
        println!("Info: file is not UTF-8; decoded as Latin-1.");
    }
    println!();

    app_state().data = Some(Arc::new(table));
    Ok(())
}

/// Build one chart: derive its view, render the SVG, then export the data
/// behind it.
fn generate_chart(
    kind: ChartKind,
    table: &Table,
    out_dir: &Path,
    policy: InvalidValuePolicy,
) -> error::Result<ChartOutcome> {
    let svg = out_dir.join(format!("{}.svg", kind.name()));
    let data = out_dir.join(format!("{}.csv", kind.name()));

    println!("{}", kind.title());
    let groups = match kind {
        ChartKind::Line => {
            let frame = reports::line_chart_view(table, policy)?;
            output::preview_frame(&frame, 6);
            render::render_line_chart(&frame, &svg)?;
            output::write_frame_csv(&data, &frame)?;
            frame.columns.len()
        }
        ChartKind::StackedBar => {
            let frame = reports::stacked_bar_view(table, policy)?;
            output::preview_frame(&frame, 3);
            render::render_stacked_bar_chart(&frame, &svg)?;
            output::write_frame_csv(&data, &frame)?;
            frame.index.len()
        }
        ChartKind::Scatter => {
            let points = reports::scatter_view(table, policy)?;
            output::preview_table_rows(&points, 3);
            render::render_scatter_chart(&points, &svg)?;
            output::write_csv(&data, &points)?;
            points.len()
        }
    };
    println!("(Chart saved to {}, data to {})\n", svg.display(), data.display());

    Ok(ChartOutcome {
        chart: kind,
        status: "ok",
        groups,
        svg: Some(svg.display().to_string()),
        data: Some(data.display().to_string()),
        error: None,
    })
}

/// Generate each chart in turn. A failing chart is logged and recorded as
/// `failed`; the remaining charts still run.
fn run_charts(
    table: &Table,
    kinds: &[ChartKind],
    out_dir: &Path,
    policy: InvalidValuePolicy,
) -> Vec<ChartOutcome> {
    kinds
        .iter()
        .map(|&kind| match generate_chart(kind, table, out_dir, policy) {
            Ok(outcome) => {
                info!(chart = kind.name(), groups = outcome.groups, "Chart written");
                outcome
            }
            Err(e) => {
                error!(chart = kind.name(), error = %e, "Chart failed");
                println!("Error: {}\n", e);
                ChartOutcome {
                    chart: kind,
                    status: "failed",
                    groups: 0,
                    svg: None,
                    data: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect()
}

/// Write `summary.json` into `out_dir` and return how many charts failed.
fn write_summary(out_dir: &Path, summary: &RunSummary) -> anyhow::Result<usize> {
    let failed = summary.charts.iter().filter(|o| o.error.is_some()).count();
    let summary_path = out_dir.join("summary.json");
    output::write_json(&summary_path, summary)?;
    println!(
        "Summary ({}): {} of {} charts written.\n",
        summary_path.display(),
        summary.charts.len() - failed,
        summary.charts.len()
    );
    Ok(failed)
}

/// Batch runs fail as a whole when any chart failed.
fn batch_status(failed: usize) -> anyhow::Result<()> {
    if failed > 0 {
        bail!("{} chart(s) failed", failed);
    }
    Ok(())
}

/// Handle option [2]: draw every selected chart and write `summary.json`.
///
/// Returns how many charts failed.
fn handle_generate_charts(cli: &Cli) -> anyhow::Result<usize> {
    let Some(table) = app_state().data.clone() else {
        bail!("no data loaded; load the CSV file first (option 1)");
    };
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("cannot create {}", cli.out_dir.display()))?;

    println!("Generating charts...\n");
    let charts = run_charts(&table, &cli.selected_charts(), &cli.out_dir, cli.on_invalid);
    let summary = RunSummary {
        input: cli.input.display().to_string(),
        rows_loaded: table.len(),
        on_invalid: cli.on_invalid,
        charts,
    };
    write_summary(&cli.out_dir, &summary)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    if cli.batch {
        handle_load(&cli.input)?;
        let failed = handle_generate_charts(&cli)?;
        return batch_status(failed);
    }

    loop {
        println!("Food Law Enforcement Charts ({}):", cli.input.display());
        println!("[1] Load the file");
        println!("[2] Generate Charts\n");
        let Some(choice) = prompt("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Err(e) = handle_load(&cli.input) {
                    error!(error = %e, "Load failed");
                    eprintln!("Failed to load file: {:#}\n", e);
                }
            }
            "2" => {
                println!();
                match handle_generate_charts(&cli) {
                    Ok(failed) if failed > 0 => warn!(failed, "Some charts failed"),
                    Ok(_) => {}
                    Err(e) => println!("Error: {:#}\n", e),
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
    Ok(())
}
