// Text presenters for valuation results: aligned table, TSV, run summary.

use std::fmt::Write;

use clap::ValueEnum;
use gridcast_core::player::Position;
use gridcast_core::report::{sort_by_price, RunSummary, ValuationRecord};
use gridcast_core::valuation::price::BudgetReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Grouped by position, best projection first.
    Points,
    /// League-wide, most expensive first.
    Price,
}

/// Which records to show and in what order.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub position: Option<Position>,
    pub sort: SortKey,
    pub limit: Option<usize>,
}

/// clap value parser for `--position`.
pub fn parse_position(s: &str) -> Result<Position, String> {
    Position::from_str_pos(s).ok_or_else(|| format!("unknown position '{s}' (expected QB, RB, WR or TE)"))
}

/// Apply the position filter, ordering and limit. Records arrive grouped by
/// position in rank order, which is already the `points` order.
pub fn select(mut records: Vec<ValuationRecord>, view: &View) -> Vec<ValuationRecord> {
    if let Some(pos) = view.position {
        records.retain(|r| r.position == pos);
    }
    if view.sort == SortKey::Price {
        sort_by_price(&mut records);
    }
    if let Some(limit) = view.limit {
        records.truncate(limit);
    }
    records
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

pub fn render_table(records: &[ValuationRecord], budget: &BudgetReport) -> String {
    let name_width = records
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Player".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<name_width$}  {:<3} {:<4} {:>4} {:<9} {:>8} {:>8} {:>8} {:>8}",
        "Player", "Pos", "Team", "Rank", "Role", "Points", "StartVBD", "BenchVBD", "Price"
    );

    let mut previous: Option<Position> = None;
    for record in records {
        if previous.is_some_and(|p| p != record.position) {
            out.push('\n');
        }
        previous = Some(record.position);

        let _ = writeln!(
            out,
            "{:<name_width$}  {:<3} {:<4} {:>4} {:<9} {:>8.1} {:>8.1} {:>8.1} {:>8}",
            record.name,
            record.position,
            record.team,
            record.position_rank,
            record.role.as_str(),
            record.projected_points,
            record.starter_vbd,
            record.bench_vbd,
            format!("${:.2}", record.price),
        );
    }

    out.push('\n');
    out.push_str(&budget_line(budget));
    out.push('\n');
    out
}

pub fn budget_line(budget: &BudgetReport) -> String {
    let mut line = format!(
        "Allocated ${:.2} of ${:.2} available (margin {:+.4}%)",
        budget.allocated,
        budget.available_budget,
        budget.margin * 100.0
    );
    if budget.clamped > 0 {
        let _ = write!(line, "; {} negative prices clamped to $0", budget.clamped);
    }
    line
}

// ---------------------------------------------------------------------------
// TSV
// ---------------------------------------------------------------------------

pub fn render_tsv(records: &[ValuationRecord]) -> String {
    let mut out = String::from("name\tposition\tteam\tprojectedPoints\tstarterVBD\tbenchVBD\tprice\n");
    for r in records {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
            r.name, r.position, r.team, r.projected_points, r.starter_vbd, r.bench_vbd, r.price
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Summary block
// ---------------------------------------------------------------------------

pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Pos  Starters  Rostered  StartBase  BenchBase");
    for p in &summary.positions {
        let _ = writeln!(
            out,
            "{:<4} {:>8}  {:>8}  {:>9}  {:>9}",
            p.position,
            p.starters,
            p.rostered,
            baseline_cell(p.starter_baseline),
            baseline_cell(p.bench_baseline),
        );
    }
    let _ = writeln!(out, "K    {:>8}", summary.kickers);
    let _ = writeln!(out, "DEF  {:>8}", summary.defenses);
    if !summary.flex.is_empty() {
        let _ = writeln!(out, "Flex: {}", summary.flex.join(", "));
    }

    let f = &summary.factors;
    let _ = writeln!(
        out,
        "Starter budget ${:.2} at ${:.4}/pt (starter VBD {:.1})",
        f.starter_budget, f.starter_pf, f.total_starter_vbd
    );
    let _ = writeln!(
        out,
        "Bench budget ${:.2} at ${:.4}/pt (bench VBD {:.1})",
        f.bench_budget, f.bench_pf, f.total_bench_vbd
    );
    out
}

fn baseline_cell(baseline: Option<f64>) -> String {
    match baseline {
        Some(points) => format!("{points:.1}"),
        None => "-".into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use gridcast_core::report::Role;

    fn record(name: &str, position: Position, rank: usize, points: f64, price: f64) -> ValuationRecord {
        ValuationRecord {
            name: name.into(),
            position,
            team: "TST".into(),
            position_rank: rank,
            role: Role::Starter,
            projected_points: points,
            starter_vbd: 0.0,
            bench_vbd: 0.0,
            price,
        }
    }

    fn sample() -> Vec<ValuationRecord> {
        vec![
            record("QB1", Position::Quarterback, 1, 320.0, 18.0),
            record("QB2", Position::Quarterback, 2, 300.0, 9.0),
            record("RB1", Position::RunningBack, 1, 260.0, 55.0),
            record("RB2", Position::RunningBack, 2, 230.0, 31.0),
            record("WR1", Position::WideReceiver, 1, 240.0, 42.0),
        ]
    }

    fn budget() -> BudgetReport {
        BudgetReport {
            allocated: 155.0,
            available_budget: 155.0,
            margin: 0.0,
            clamped: 0,
        }
    }

    #[test]
    fn position_filter_keeps_rank_order() {
        let view = View {
            position: Some(Position::RunningBack),
            sort: SortKey::Points,
            limit: None,
        };
        let names: Vec<String> = select(sample(), &view).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["RB1", "RB2"]);
    }

    #[test]
    fn price_sort_with_limit() {
        let view = View {
            position: None,
            sort: SortKey::Price,
            limit: Some(3),
        };
        let names: Vec<String> = select(sample(), &view).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["RB1", "WR1", "RB2"]);
    }

    #[test]
    fn parse_position_accepts_lowercase() {
        assert_eq!(parse_position("te"), Ok(Position::TightEnd));
        assert!(parse_position("K").is_err());
    }

    #[test]
    fn table_has_header_rows_and_budget_line() {
        let out = render_table(&sample(), &budget());
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("Player"));
        assert!(lines[1].starts_with("QB1"));
        assert!(out.contains("$55.00"));
        assert!(out.contains("Allocated $155.00 of $155.00 available"));
        // A blank separator between position groups: 5 records + 2 gaps + header + gap + budget.
        assert_eq!(lines.len(), 10);
    }

    #[test]
    fn tsv_has_one_line_per_record() {
        let out = render_tsv(&sample());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "RB1\tRB\tTST\t260.00\t0.00\t0.00\t55.00");
    }

    #[test]
    fn budget_line_mentions_clamped_prices() {
        let mut report = budget();
        report.clamped = 2;
        assert!(budget_line(&report).ends_with("2 negative prices clamped to $0"));
    }
}
