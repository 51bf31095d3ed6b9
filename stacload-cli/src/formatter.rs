//! Terminal output helpers

use colored::*;
use stacload_core::{MetricsReport, RecordedOutcome, RunSummary};

pub fn print_success(message: &str) {
    println!("{} {}", "✓".bright_green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".bright_red().bold(), message.bright_red());
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".bright_yellow().bold(), message.bright_yellow());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".bright_blue().bold(), message);
}

/// Print a boxed table; cells are padded before coloring
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        print_info("No data to display");
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    print_separator(&widths, '┌', '┬', '┐');
    print!("│");
    for (header, width) in headers.iter().zip(&widths) {
        print!(" {} │", format!("{:width$}", header, width = *width).bright_cyan().bold());
    }
    println!();
    print_separator(&widths, '├', '┼', '┤');

    for row in rows {
        print!("│");
        for (cell, width) in row.iter().zip(&widths) {
            print!(" {:width$} │", cell, width = *width);
        }
        println!();
    }
    print_separator(&widths, '└', '┴', '┘');
}

fn print_separator(widths: &[usize], left: char, middle: char, right: char) {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    println!("{}{}{}", left, segments.join(&middle.to_string()), right);
}

/// Per-label rows of a metrics report
pub fn report_rows(report: &MetricsReport) -> Vec<Vec<String>> {
    report
        .labels
        .iter()
        .map(|label| {
            vec![
                label.label.clone(),
                label.requests.to_string(),
                format!("{} ({:.1}%)", label.failures, label.failure_rate() * 100.0),
                format!("{:.1}", label.latency.mean_ms),
                format!("{:.1}", label.latency.p50_ms),
                format!("{:.1}", label.latency.p95_ms),
                format!("{:.1}", label.latency.p99_ms),
                format!("{:.1}", label.latency.max_ms),
            ]
        })
        .collect()
}

pub fn print_run_summary(summary: &RunSummary) {
    let report = &summary.report;

    println!();
    print_table(
        &[
            "label", "requests", "failures", "mean ms", "p50 ms", "p95 ms", "p99 ms", "max ms",
        ],
        &report_rows(report),
    );
    println!();

    println!(
        "{} requests in {:.1}s ({:.1} req/s), {} users, {} scenario runs, seed {}",
        report.total_requests.to_string().bold(),
        report.elapsed_secs,
        report.requests_per_second,
        summary.users.len(),
        summary.iterations(),
        summary.seed
    );

    if report.total_failures == 0 {
        print_success("No failed requests");
    } else {
        print_warning(&format!(
            "{} of {} requests failed",
            report.total_failures, report.total_requests
        ));
    }
    if summary.empty_dependencies() > 0 {
        print_info(&format!(
            "{} scenario runs skipped for missing data",
            summary.empty_dependencies()
        ));
    }
    if summary.stopped_early {
        print_info("Run was stopped before every user finished its iterations");
    }
}

pub fn outcome_rows(outcomes: &[RecordedOutcome]) -> Vec<Vec<String>> {
    outcomes
        .iter()
        .map(|outcome| {
            let status = match outcome.status {
                0 => "no response".to_string(),
                status => status.to_string(),
            };
            vec![
                outcome.label.clone(),
                status,
                format!("{:.1}", outcome.duration.as_secs_f64() * 1000.0),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacload_core::{MetricsCollector, MetricsSink};
    use std::time::Duration;

    #[test]
    fn test_report_rows() {
        let collector = MetricsCollector::new();
        collector.record("get-item", 200, Duration::from_millis(10));
        collector.record("get-item", 500, Duration::from_millis(30));

        let rows = report_rows(&collector.report());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "get-item");
        assert_eq!(rows[0][1], "2");
        assert_eq!(rows[0][2], "1 (50.0%)");
    }

    #[test]
    fn test_outcome_rows_name_transport_failures() {
        let rows = outcome_rows(&[
            RecordedOutcome::new("get-collections", 0, Duration::from_millis(3)),
            RecordedOutcome::new("get-landing", 200, Duration::from_millis(12)),
        ]);
        assert_eq!(rows[0][1], "no response");
        assert_eq!(rows[1][1], "200");
        assert_eq!(rows[1][2], "12.0");
    }
}
