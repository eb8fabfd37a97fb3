//! `inspect-export` stage: read the reference platform's spreadsheet export,
//! print an overview, and save it as CSV plus a text summary.
//!
//! Three readers are tried in order: xlsx, legacy xls, then format
//! auto-detection. Only the first sheet is read.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use calamine::{open_workbook, open_workbook_auto, Data, Range, Reader, Xls, Xlsx};
use comfy_table::Table;
use tracing::{info, warn};

use reentry_core::analysis::{mean, percentile, sorted};

use crate::config::AnalysisConfig;
use crate::reporting::console::{align_numbers, banner, print_banner, table};
use crate::reporting::write_csv;

pub const INFO_FILE: &str = "tradingview_info.txt";

const HEAD_ROWS: usize = 10;
const TAIL_ROWS: usize = 5;
const INFO_ROWS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    Xlsx,
    Xls,
    Auto,
}

impl ReadStrategy {
    pub const ALL: [ReadStrategy; 3] = [ReadStrategy::Xlsx, ReadStrategy::Xls, ReadStrategy::Auto];

    pub fn name(self) -> &'static str {
        match self {
            ReadStrategy::Xlsx => "xlsx reader",
            ReadStrategy::Xls => "xls reader",
            ReadStrategy::Auto => "format auto-detection",
        }
    }

    fn read(self, path: &Path) -> Result<Range<Data>> {
        fn first<R: Reader<std::io::BufReader<std::fs::File>>>(mut wb: R) -> Result<Range<Data>>
        where
            R::Error: std::error::Error + Send + Sync + 'static,
        {
            match wb.worksheet_range_at(0) {
                Some(range) => Ok(range?),
                None => bail!("workbook has no sheets"),
            }
        }
        match self {
            ReadStrategy::Xlsx => first(open_workbook::<Xlsx<_>, _>(path)?),
            ReadStrategy::Xls => first(open_workbook::<Xls<_>, _>(path)?),
            ReadStrategy::Auto => first(open_workbook_auto(path)?),
        }
    }
}

/// The first sheet: a header row and data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl Sheet {
    /// First row is the header; short rows are padded with `Empty`.
    pub fn from_rows(mut rows: Vec<Vec<Data>>) -> Self {
        if rows.is_empty() {
            return Self {
                columns: Vec::new(),
                rows,
            };
        }
        let header = rows.remove(0);
        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => format!("Unnamed: {i}"),
                other => other.to_string(),
            })
            .collect();
        for row in &mut rows {
            row.resize(columns.len(), Data::Empty);
        }
        Self { columns, rows }
    }

    pub fn from_range(range: &Range<Data>) -> Self {
        Self::from_rows(range.rows().map(|r| r.to_vec()).collect())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Numeric values of a column, or `None` if it holds any text.
    pub fn numeric_column(&self, col: usize) -> Option<Vec<f64>> {
        let mut values = Vec::new();
        for row in &self.rows {
            match &row[col] {
                Data::Int(i) => values.push(*i as f64),
                Data::Float(f) => values.push(*f),
                Data::Empty => {}
                _ => return None,
            }
        }
        (!values.is_empty()).then_some(values)
    }

    pub fn column_kind(&self, col: usize) -> &'static str {
        if self.rows.iter().all(|r| matches!(r[col], Data::Empty)) {
            "empty"
        } else if self.numeric_column(col).is_some() {
            "numeric"
        } else {
            "text"
        }
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(cell_text))?;
        }
        let data = wtr.into_inner().context("failed to flush CSV writer")?;
        String::from_utf8(data).context("CSV output is not valid UTF-8")
    }

    fn rows_table<'a>(&self, rows: impl Iterator<Item = &'a Vec<Data>>) -> Table {
        let mut t = table(self.columns.iter().map(String::as_str));
        for row in rows {
            t.add_row(row.iter().map(cell_text).collect::<Vec<_>>());
        }
        t
    }

    pub fn head(&self, n: usize) -> Table {
        self.rows_table(self.rows.iter().take(n))
    }

    pub fn tail(&self, n: usize) -> Table {
        let skip = self.rows.len().saturating_sub(n);
        self.rows_table(self.rows.iter().skip(skip))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// count / mean / std / min / quartiles / max of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN for a single value.
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

pub fn describe(sheet: &Sheet) -> Vec<ColumnSummary> {
    (0..sheet.columns.len())
        .filter_map(|col| {
            let values = sorted(&sheet.numeric_column(col)?);
            let n = values.len();
            let m = mean(&values);
            let std = if n > 1 {
                (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
            } else {
                f64::NAN
            };
            Some(ColumnSummary {
                column: sheet.columns[col].clone(),
                count: n,
                mean: m,
                std,
                min: values[0],
                p25: percentile(&values, 25.0),
                median: percentile(&values, 50.0),
                p75: percentile(&values, 75.0),
                max: values[n - 1],
            })
        })
        .collect()
}

fn describe_table(summaries: &[ColumnSummary]) -> Table {
    let mut t = table(["Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]);
    for s in summaries {
        t.add_row(vec![
            s.column.clone(),
            s.count.to_string(),
            format!("{:.4}", s.mean),
            format!("{:.4}", s.std),
            format!("{:.4}", s.min),
            format!("{:.4}", s.p25),
            format!("{:.4}", s.median),
            format!("{:.4}", s.p75),
            format!("{:.4}", s.max),
        ]);
    }
    align_numbers(&mut t);
    t
}

/// Try every reader in turn; the error lists each failure.
pub fn read_first_sheet(path: &Path) -> Result<(Sheet, ReadStrategy)> {
    let mut failures = Vec::new();
    for strategy in ReadStrategy::ALL {
        match strategy.read(path) {
            Ok(range) => {
                println!("Read with {}", strategy.name());
                return Ok((Sheet::from_range(&range), strategy));
            }
            Err(e) => {
                warn!(strategy = strategy.name(), error = %e, "spreadsheet read failed");
                failures.push(format!("{}: {e}", strategy.name()));
            }
        }
    }
    bail!(
        "could not read {} with any reader ({})",
        path.display(),
        failures.join("; ")
    )
}

/// Text summary written next to the reports.
pub fn info_text(sheet: &Sheet, summaries: &[ColumnSummary]) -> String {
    let (rows, cols) = sheet.shape();
    let mut s = String::new();
    let _ = writeln!(s, "{}\n", banner("Reference Export Analysis"));
    let _ = writeln!(s, "Shape: ({rows}, {cols})");
    let _ = writeln!(s, "Rows: {rows}");
    let _ = writeln!(s, "Columns: {cols}\n");
    let _ = writeln!(s, "Column names:");
    for (i, c) in sheet.columns.iter().enumerate() {
        let _ = writeln!(s, "  {i}: {c} ({})", sheet.column_kind(i));
    }
    let _ = writeln!(s, "\nFirst {INFO_ROWS} rows:\n{}\n", sheet.head(INFO_ROWS));
    let _ = writeln!(s, "Basic statistics:\n{}", describe_table(summaries));
    s
}

pub fn run(config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let path = &config.paths.reference_export;
    print_banner("Reference export inspection");
    println!("Reading {}", path.display());

    let (sheet, strategy) = read_first_sheet(path)?;
    info!(path = %path.display(), reader = strategy.name(), "spreadsheet loaded");

    let (rows, cols) = sheet.shape();
    println!("\nShape: ({rows}, {cols})");
    println!("\nColumn names:");
    for (i, c) in sheet.columns.iter().enumerate() {
        println!("  {i}: {c} ({})", sheet.column_kind(i));
    }
    println!("\nFirst {HEAD_ROWS} rows:\n{}", sheet.head(HEAD_ROWS));
    println!("\nLast {TAIL_ROWS} rows:\n{}", sheet.tail(TAIL_ROWS));
    let summaries = describe(&sheet);
    println!("\nBasic statistics:\n{}", describe_table(&summaries));

    let mut written = Vec::new();
    let csv_path = &config.paths.reference_export_csv;
    write_csv(csv_path, &sheet.to_csv()?)?;
    println!("\nSaved to: {}", csv_path.display());
    written.push(csv_path.clone());

    let info_path = config.paths.reports_dir.join(INFO_FILE);
    std::fs::create_dir_all(&config.paths.reports_dir).with_context(|| {
        format!("failed to create {}", config.paths.reports_dir.display())
    })?;
    std::fs::write(&info_path, info_text(&sheet, &summaries))
        .with_context(|| format!("failed to write {}", info_path.display()))?;
    println!("Saved detailed info to: {}", info_path.display());
    written.push(info_path);

    Ok(written)
}
