//! Summary output for the pubsync CLI

use console::style;
use pubsync_sync::RunReport;
use pubsync_types::ChangeAction;
use std::time::Duration;

/// Print the outcome of a publishing run
pub fn print_report(report: &RunReport) {
    let stats = &report.stats;

    println!();
    let title = if report.dry_run {
        "Planned Changes (dry run):"
    } else {
        "Publish Summary:"
    };
    println!("{}", style(title).bold().underlined());
    println!("  Added: {}", style(stats.added).green());
    println!("  Updated: {}", style(stats.updated).green());
    println!("  Removed: {}", style(stats.removed).green());
    println!("  Unchanged: {}", style(stats.unchanged).dim());
    println!("  Excluded: {}", style(stats.excluded).dim());
    println!(
        "  Uploaded: {}",
        style(format_bytes(stats.bytes_uploaded)).cyan()
    );
    println!(
        "  Duration: {}",
        style(format_duration(report.duration)).blue()
    );

    match &report.failure {
        Some(failure) => {
            println!();
            println!("{} {}", style("✗").red().bold(), style(failure).red());
            if !report.applied.is_empty() {
                println!(
                    "  {} applied before the failure",
                    describe_applied(report)
                );
            }
        }
        None if stats.operations() == 0 => {
            println!();
            println!("{} Site is up to date", style("✓").green().bold());
        }
        None => {
            println!();
            println!("{} {}", style("✓").green().bold(), describe_applied(report));
        }
    }
}

fn describe_applied(report: &RunReport) -> String {
    let count = |action: ChangeAction| {
        report
            .applied
            .iter()
            .filter(|change| change.action == action)
            .count()
    };
    format!(
        "{} added, {} updated, {} removed",
        count(ChangeAction::Add),
        count(ChangeAction::Update),
        count(ChangeAction::Remove)
    )
}

/// Format a byte count as a human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format a duration as a human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
