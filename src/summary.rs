//! Pivoted model × solver timing table and the console summary.

use crate::record::ResultRecord;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::Write as _;

/// Shown instead of a timing for anything that did not succeed.
pub const UNSOLVED_LABEL: &str = "FAIL/TIMEOUT";

/// A table cell: a measured time or the "no measurement" sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    Solved(f64),
    Unsolved,
}

impl Timing {
    pub fn seconds(self) -> Option<f64> {
        match self {
            Timing::Solved(s) => Some(s),
            Timing::Unsolved => None,
        }
    }

    pub fn is_solved(self) -> bool {
        matches!(self, Timing::Solved(_))
    }

    /// Spelling used in the CSV file. Seconds keep a decimal point and round-trip.
    pub fn csv_value(self) -> String {
        match self {
            Timing::Solved(s) => format!("{:?}", s),
            Timing::Unsolved => "inf".to_string(),
        }
    }

    pub fn display_value(self) -> String {
        match self {
            Timing::Solved(s) => format!("{:.2}", s),
            Timing::Unsolved => UNSOLVED_LABEL.to_string(),
        }
    }
}

/// Unsolved sorts after every measured time.
impl PartialOrd for Timing {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Timing::Solved(a), Timing::Solved(b)) => a.partial_cmp(b),
            (Timing::Solved(_), Timing::Unsolved) => Some(Ordering::Less),
            (Timing::Unsolved, Timing::Solved(_)) => Some(Ordering::Greater),
            (Timing::Unsolved, Timing::Unsolved) => Some(Ordering::Equal),
        }
    }
}

impl Serialize for Timing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Timing::Solved(s) => serializer.serialize_f64(*s),
            Timing::Unsolved => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub model: String,
    pub cells: Vec<Timing>,
}

/// Rows follow first-seen model order; columns follow the solver list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub solvers: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

/// Per-solver success counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessRate {
    pub solver: String,
    pub successes: usize,
    pub total: usize,
}

impl SuccessRate {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successes as f64 / self.total as f64 * 100.0
        }
    }
}

impl std::fmt::Display for SuccessRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:15}: {:2}/{} ({:5.1}%)",
            self.solver,
            self.successes,
            self.total,
            self.percent()
        )
    }
}

impl SummaryTable {
    /// Fold records into the pivot. Any pair without a success record is `Unsolved`.
    pub fn from_records(solvers: &[String], records: &[ResultRecord]) -> Self {
        let mut solvers: Vec<String> = solvers.to_vec();
        for rec in records {
            if !solvers.contains(&rec.solver) {
                solvers.push(rec.solver.clone());
            }
        }

        let mut rows: Vec<SummaryRow> = Vec::new();
        for rec in records {
            let row_idx = match rows.iter().position(|r| r.model == rec.model) {
                Some(idx) => idx,
                None => {
                    rows.push(SummaryRow {
                        model: rec.model.clone(),
                        cells: vec![Timing::Unsolved; solvers.len()],
                    });
                    rows.len() - 1
                }
            };
            let Some(col) = solvers.iter().position(|s| *s == rec.solver) else {
                continue;
            };
            rows[row_idx].cells[col] = match (rec.is_success(), rec.time) {
                (true, Some(t)) => Timing::Solved(t),
                _ => Timing::Unsolved,
            };
        }

        Self { solvers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, model: &str, solver: &str) -> Timing {
        let col = self.solvers.iter().position(|s| s == solver);
        let row = self.rows.iter().find(|r| r.model == model);
        match (row, col) {
            (Some(row), Some(col)) => row.cells[col],
            _ => Timing::Unsolved,
        }
    }

    pub fn success_rates(&self) -> Vec<SuccessRate> {
        let total = self.rows.len();
        self.solvers
            .iter()
            .enumerate()
            .map(|(col, solver)| SuccessRate {
                solver: solver.clone(),
                successes: self.rows.iter().filter(|r| r.cells[col].is_solved()).count(),
                total,
            })
            .collect()
    }

    /// Write the pivot as CSV: blank corner, solver header, one record per model.
    pub fn write_csv<W: std::io::Write>(&self, writer: &mut csv::Writer<W>) -> csv::Result<()> {
        let mut header = vec![""];
        header.extend(self.solvers.iter().map(String::as_str));
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.model.clone()];
            record.extend(row.cells.iter().map(|c| c.csv_value()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Aligned text table with unsolved cells spelled `FAIL/TIMEOUT`.
    pub fn render(&self) -> String {
        let label_width = self.rows.iter().map(|r| width(&r.model)).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .solvers
            .iter()
            .enumerate()
            .map(|(col, solver)| {
                self.rows
                    .iter()
                    .map(|r| width(&r.cells[col].display_value()))
                    .chain(std::iter::once(width(solver)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let _ = write!(out, "{:<label_width$}", "");
        for (solver, w) in self.solvers.iter().zip(&widths) {
            let _ = write!(out, "  {:>w$}", solver, w = *w);
        }
        out.push('\n');

        for row in &self.rows {
            let _ = write!(out, "{:<label_width$}", row.model);
            for (cell, w) in row.cells.iter().zip(&widths) {
                let _ = write!(out, "  {:>w$}", cell.display_value(), w = *w);
            }
            out.push('\n');
        }
        out
    }
}

/// Display width in chars; `{:>w$}` pads by chars too.
fn width(text: &str) -> usize {
    text.chars().count()
}
