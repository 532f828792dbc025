use colored::Colorize;
use serde::Serialize;
use ugs_core::FetchReport;

/// Output preferences shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    /// Print a list of records as YAML, or JSON when `--json` is set
    pub fn records<T: Serialize>(&self, records: &[T]) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(records)?);
            return Ok(());
        }
        if records.is_empty() {
            if !self.quiet {
                println!("{}", "No results".dimmed());
            }
            return Ok(());
        }
        print!("{}", serde_yaml::to_string(records)?);
        Ok(())
    }

    /// Informational line, suppressed by `--quiet` and `--json`
    pub fn info(&self, message: impl AsRef<str>) {
        if !self.quiet && !self.json {
            println!("{}", message.as_ref());
        }
    }

    pub fn reports(&self, reports: &[FetchReport]) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(reports)?);
            return Ok(());
        }
        for report in reports {
            print_report(report, self.quiet);
        }
        Ok(())
    }
}

/// Grouped, human readable form of a fetch report
pub fn render_report(report: &FetchReport, quiet: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", report.service.bold()));

    let groups = [
        ("create", "Created", &report.created),
        ("update", "Updated", &report.updated),
        ("delete", "Deleted", &report.deleted),
    ];
    for (verb, past, items) in groups {
        if items.is_empty() {
            continue;
        }
        let heading = if report.dry_run {
            format!("Would {}:", verb)
        } else {
            format!("{}:", past)
        };
        out.push_str(&format!("{}\n", heading.green()));
        for item in items {
            out.push_str(&format!("    {}\n", item));
        }
    }

    if !quiet && !report.unchanged.is_empty() {
        out.push_str(&format!("{}\n", "Unchanged:".dimmed()));
        for item in &report.unchanged {
            out.push_str(&format!("    {}\n", item));
        }
    }

    if !report.errors.is_empty() {
        out.push_str(&format!("{}\n", "Errors:".red()));
        for error in &report.errors {
            out.push_str(&format!("    {}: {}\n", error.item, error.message));
        }
    }

    out.push_str(&format!("{}\n", summary_line(report)));
    out
}

fn summary_line(report: &FetchReport) -> String {
    let (created, updated, deleted) = if report.dry_run {
        ("to create", "to update", "to delete")
    } else {
        ("created", "updated", "deleted")
    };
    format!(
        "{} {}, {} {}, {} {}, {} unchanged, {} failed",
        report.created.len(),
        created,
        report.updated.len(),
        updated,
        report.deleted.len(),
        deleted,
        report.unchanged.len(),
        report.errors.len()
    )
}

pub fn print_report(report: &FetchReport, quiet: bool) {
    print!("{}", render_report(report, quiet));
}
