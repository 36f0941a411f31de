//! Plain-text summaries for the terminal

use crate::matcher::RepeatSummary;
use crate::report::ExceptionReport;
use crate::survey::{Category, Level};
use crate::trend::{TrendDecision, TrendTable};
use crate::wear_summary::WearStats;
use std::fmt::Write;

const RULE: &str = "--------------- ------ ------ ------ -------";

/// Per-category level counts of one exception report
pub fn report_text(report: &ExceptionReport) -> String {
    let mut out = String::new();
    let ctx = &report.context;
    let _ = writeln!(
        out,
        "{} {} {} {}: {} exceptions",
        ctx.date,
        ctx.line,
        ctx.section,
        ctx.track,
        report.total()
    );
    let _ = writeln!(out, "category            L1     L2     L3   total");
    let _ = writeln!(out, "{RULE}");

    for category in Category::ALL {
        let rows = report.table(category);
        let count = |level: Level| rows.iter().filter(|r| r.level == level).count();
        let _ = writeln!(
            out,
            "{:<15} {:>6} {:>6} {:>6} {:>7}",
            category.to_string(),
            count(Level::L1),
            count(Level::L2),
            count(Level::L3),
            rows.len()
        );
    }
    let _ = writeln!(out, "{RULE}");
    if !report.rejected_heights.is_empty() {
        let _ = writeln!(
            out,
            "{} locations rejected by the height floor",
            report.rejected_heights.len()
        );
    }
    out
}

pub fn repeat_text(summary: &RepeatSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} repeated exceptions across {} reports",
        summary.rows.len(),
        summary.reports
    );
    for (row, previous) in summary.rows.iter().zip(&summary.previous) {
        let chain: Vec<&str> = previous.previous.iter().flatten().map(String::as_str).collect();
        let _ = writeln!(
            out,
            "{:<32} {:<12} {:<3} {:>10.2} {:>10.2}  {}",
            row.id,
            row.exception_type,
            row.level.to_string(),
            row.start_m,
            row.end_m,
            chain.join(" <- ")
        );
    }
    out
}

pub fn trend_text(table: &TrendTable) -> String {
    let mut out = String::new();
    let decided = |d: TrendDecision| table.rows.iter().filter(|r| r.result == d).count();
    let _ = writeln!(
        out,
        "{} reviewed: {} confirmed, {} to verify, {} dismissed",
        table.rows.len(),
        decided(TrendDecision::ConfirmedValidL2),
        decided(TrendDecision::VerifyOnSite),
        decided(TrendDecision::NoActionRequired)
    );
    for row in &table.rows {
        let _ = writeln!(
            out,
            "{:<32} latest {:>6.2}  fit {:>6.2}  slope {:>8.4}/day  {}",
            row.record.id,
            row.record.max_value,
            row.fit.at(0.0),
            row.fit.slope,
            row.result
        );
    }
    out
}

pub fn wear_text(stats: &[WearStats]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "tension length   count    mean   -1sd   -2sd   -3sd");
    for s in stats {
        let _ = writeln!(
            out,
            "{:<15} {:>6} {:>7.3} {:>6.3} {:>6.3} {:>6.3}",
            s.tension_length, s.count, s.mean, s.minus_1sd, s.minus_2sd, s.minus_3sd
        );
    }
    out
}
