//! Output formatters for dashboards and response listings

use crate::config::{OutputConfig, OutputFormat};
use crate::dashboard::{Bar, DashboardReport, ViewOutcome};
use crate::error::{Result, SurveyError};
use crate::output::chart::{bar, fit_label, format_score};
use crate::output::report::ResponseListing;
use colored::{Color, Colorize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const BAR_WIDTH: usize = 30;
const LABEL_WIDTH: usize = 36;

pub trait OutputFormatter {
    fn format_dashboard(&self, report: &DashboardReport) -> Result<String>;
    fn format_responses(&self, listing: &ResponseListing) -> Result<String>;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn fmt_err(e: std::fmt::Error) -> SurveyError {
    SurveyError::OutputFormatting(e.to_string())
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Cyan,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64, threshold: f64) -> String {
        let (badge, color) = if score >= threshold {
            ("STRONG", Color::Green)
        } else if score >= threshold * 0.75 {
            ("PARTIAL", Color::Yellow)
        } else {
            ("WEAK", Color::Red)
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_unavailable(&self, message: &str) -> String {
        format!("{} {}\n", self.colorize("ℹ", Color::Blue), message)
    }

    fn format_bar_line(&self, label: &str, score: f64, threshold: f64) -> String {
        let rendered = bar(score, threshold, BAR_WIDTH);
        let color = if score >= threshold { Color::Green } else { Color::Yellow };
        format!(
            "  {} {} {:.2}\n",
            fit_label(label, LABEL_WIDTH),
            self.colorize(&rendered, color),
            score
        )
    }

    fn format_bars(&self, bars: &[&Bar], threshold: f64) -> String {
        let mut out = String::new();
        for b in bars {
            out.push_str(&self.format_bar_line(&b.label, b.score, threshold));
        }
        out.push_str(&format!(
            "  {} {} threshold {:.2}\n",
            " ".repeat(LABEL_WIDTH),
            self.colorize("┆", Color::BrightBlack),
            threshold
        ));
        out
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_dashboard(&self, report: &DashboardReport) -> Result<String> {
        let mut output = String::new();
        let threshold = report.threshold;

        output.push_str(&self.format_header("📊 SEMANTIC ANALYSIS RESULTS", 1));
        writeln!(
            output,
            "Generated: {} | Source: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S"),
            report.source
        )
        .map_err(fmt_err)?;

        // Headline metrics
        output.push_str(&self.format_header("Overview", 2));
        let metrics = &report.metrics;
        let coverage_line = match metrics.global_coverage {
            Some(coverage) => writeln!(
                output,
                "Global coverage score: {:.2} {}",
                coverage,
                self.format_score_badge(coverage, threshold)
            ),
            None => writeln!(output, "Global coverage score: —"),
        };
        coverage_line.map_err(fmt_err)?;
        let job_line = match &metrics.top_job {
            Some(job) => writeln!(
                output,
                "Recommended job #1:    {} ({:.2})",
                self.colorize(&job.title, Color::Cyan),
                job.score
            ),
            None => writeln!(output, "Recommended job #1:    —"),
        };
        job_line.map_err(fmt_err)?;
        writeln!(
            output,
            "Competencies detected: {}/{}",
            metrics.matched_competencies, metrics.total_competencies
        )
        .map_err(fmt_err)?;
        writeln!(
            output,
            "{}",
            self.colorize(
                &format!("Reading: average of blocks. ≥ {:.2} = good alignment.", threshold),
                Color::BrightBlack
            )
        )
        .map_err(fmt_err)?;

        output.push_str(&self.format_header("Coverage by block", 2));
        match &report.block_coverage {
            ViewOutcome::Ready(radar) => {
                let axes: Vec<&Bar> = radar.axes.iter().collect();
                output.push_str(&self.format_bars(&axes, radar.threshold));
            }
            ViewOutcome::Unavailable(message) => output.push_str(&self.format_unavailable(message)),
        }

        output.push_str(&self.format_header("Top competencies by similarity", 2));
        match &report.top_competencies {
            ViewOutcome::Ready(top) => {
                writeln!(output, "Showing {} of the best matches", top.ranked.len()).map_err(fmt_err)?;
                for row in top.chart_order() {
                    output.push_str(&self.format_bar_line(
                        &row.text,
                        row.score.unwrap_or(0.0),
                        threshold,
                    ));
                }
                if self.detailed {
                    output.push_str(&self.format_header("Detailed table", 3));
                    for (i, row) in top.ranked.iter().enumerate() {
                        writeln!(
                            output,
                            "  {:>2}. {:<8} {:<40} {:>5}  {}",
                            i + 1,
                            row.id.as_deref().unwrap_or("-"),
                            row.text,
                            format_score(row.score),
                            row.block.as_deref().unwrap_or("")
                        )
                        .map_err(fmt_err)?;
                    }
                }
            }
            ViewOutcome::Unavailable(message) => output.push_str(&self.format_unavailable(message)),
        }

        output.push_str(&self.format_header("Detail by block", 2));
        match &report.block_detail {
            ViewOutcome::Ready(detail) => {
                writeln!(
                    output,
                    "Block: {} (available: {})",
                    self.colorize(&detail.selected, Color::Cyan),
                    detail.blocks.join(", ")
                )
                .map_err(fmt_err)?;
                for row in &detail.rows {
                    output.push_str(&self.format_bar_line(
                        &row.text,
                        row.score.unwrap_or(0.0),
                        threshold,
                    ));
                }
            }
            ViewOutcome::Unavailable(message) => output.push_str(&self.format_unavailable(message)),
        }

        output.push_str(&self.format_header("Job recommendations", 2));
        match &report.job_recommendations {
            ViewOutcome::Ready(jobs) => {
                let chart: Vec<&Bar> = jobs.ranked.iter().rev().collect();
                output.push_str(&self.format_bars(&chart, jobs.threshold));
                output.push('\n');
                for job in &jobs.ranked {
                    writeln!(output, "  • {} — {:.2}", job.label, job.score).map_err(fmt_err)?;
                }
            }
            ViewOutcome::Unavailable(message) => output.push_str(&self.format_unavailable(message)),
        }

        Ok(output)
    }

    fn format_responses(&self, listing: &ResponseListing) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.format_header("📊 Previous Responses", 1));

        if listing.is_empty() {
            output.push_str(&self.format_unavailable("No responses have been recorded yet."));
            return Ok(output);
        }

        writeln!(
            output,
            "{} response(s) in {}, showing {}",
            listing.total,
            listing.location,
            listing.records.len()
        )
        .map_err(fmt_err)?;

        for record in &listing.records {
            writeln!(
                output,
                "\n{}  {}  Git {}/5  Presentation {}/5",
                self.colorize(&record.timestamp, Color::BrightBlack),
                self.colorize(&record.full_name(), Color::Cyan),
                record.git_level,
                record.presentation_level
            )
            .map_err(fmt_err)?;

            if self.detailed {
                for (column, answer) in record.answers() {
                    writeln!(output, "  {}: {}", column, answer.replace('\n', " ")).map_err(fmt_err)?;
                }
            }
        }

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_dashboard(&self, report: &DashboardReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_responses(&self, listing: &ResponseListing) -> Result<String> {
        self.to_json(listing)
    }
}

impl MarkdownFormatter {
    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', "<br>")
    }

    fn unavailable(message: &str) -> String {
        format!("> ℹ️ {}\n", message)
    }

    fn bar_table(rows: &[(&str, Option<f64>)], threshold: f64) -> String {
        let mut out = String::from("| Label | Score | |\n|---|---:|---|\n");
        for (label, score) in rows {
            out.push_str(&format!(
                "| {} | {} | `{}` |\n",
                Self::escape_cell(label),
                format_score(*score),
                bar(score.unwrap_or(0.0), threshold, 20)
            ));
        }
        out.push_str(&format!("\n_Threshold {:.2}, marked `┆` in each bar._\n", threshold));
        out
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_dashboard(&self, report: &DashboardReport) -> Result<String> {
        let mut md = String::new();
        let threshold = report.threshold;

        md.push_str("# Semantic Analysis Results\n\n");
        md.push_str(&format!(
            "_Generated {} from `{}`_\n\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S"),
            report.source
        ));

        md.push_str("## Overview\n\n| Metric | Value |\n|---|---|\n");
        md.push_str(&format!(
            "| Global coverage score | {} |\n",
            format_score(report.metrics.global_coverage)
        ));
        let top_job = report
            .metrics
            .top_job
            .as_ref()
            .map_or_else(|| "—".to_string(), |j| format!("{} ({:.2})", Self::escape_cell(&j.title), j.score));
        md.push_str(&format!("| Recommended job #1 | {} |\n", top_job));
        md.push_str(&format!(
            "| Competencies detected | {}/{} |\n\n",
            report.metrics.matched_competencies, report.metrics.total_competencies
        ));
        md.push_str(&format!(
            "Reading: average of blocks. ≥ {:.2} = good alignment.\n\n",
            threshold
        ));

        md.push_str("## Coverage by block\n\n");
        match &report.block_coverage {
            ViewOutcome::Ready(radar) => {
                let rows: Vec<(&str, Option<f64>)> =
                    radar.axes.iter().map(|a| (a.label.as_str(), Some(a.score))).collect();
                md.push_str(&Self::bar_table(&rows, radar.threshold));
            }
            ViewOutcome::Unavailable(message) => md.push_str(&Self::unavailable(message)),
        }

        md.push_str("\n## Top competencies by similarity\n\n");
        match &report.top_competencies {
            ViewOutcome::Ready(top) => {
                let rows: Vec<(&str, Option<f64>)> =
                    top.chart_order().into_iter().map(|r| (r.text.as_str(), r.score)).collect();
                md.push_str(&Self::bar_table(&rows, threshold));
            }
            ViewOutcome::Unavailable(message) => md.push_str(&Self::unavailable(message)),
        }

        md.push_str("\n## Detail by block\n\n");
        match &report.block_detail {
            ViewOutcome::Ready(detail) => {
                md.push_str(&format!("**{}** (available: {})\n\n", detail.selected, detail.blocks.join(", ")));
                let rows: Vec<(&str, Option<f64>)> =
                    detail.rows.iter().map(|r| (r.text.as_str(), r.score)).collect();
                md.push_str(&Self::bar_table(&rows, threshold));
            }
            ViewOutcome::Unavailable(message) => md.push_str(&Self::unavailable(message)),
        }

        md.push_str("\n## Job recommendations\n\n");
        match &report.job_recommendations {
            ViewOutcome::Ready(jobs) => {
                let rows: Vec<(&str, Option<f64>)> =
                    jobs.ranked.iter().rev().map(|j| (j.label.as_str(), Some(j.score))).collect();
                md.push_str(&Self::bar_table(&rows, jobs.threshold));
            }
            ViewOutcome::Unavailable(message) => md.push_str(&Self::unavailable(message)),
        }

        Ok(md)
    }

    fn format_responses(&self, listing: &ResponseListing) -> Result<String> {
        let mut md = String::from("# Previous Responses\n\n");
        if listing.is_empty() {
            md.push_str(&Self::unavailable("No responses have been recorded yet."));
            return Ok(md);
        }

        md.push_str("| Timestamp | Name | Git | Presentation | Reflection |\n|---|---|---:|---:|---|\n");
        for record in &listing.records {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                record.timestamp,
                Self::escape_cell(&record.full_name()),
                record.git_level,
                record.presentation_level,
                Self::escape_cell(&record.reflection)
            ));
        }
        Ok(md)
    }
}

impl ReportGenerator {
    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter,
        }
    }

    pub fn from_config(config: &OutputConfig, detailed: bool) -> Self {
        Self::with_options(config.color_output, detailed, config.pretty_json)
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn dashboard(&self, report: &DashboardReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_dashboard(report)
    }

    pub fn responses(&self, listing: &ResponseListing, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_responses(listing)
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(file_path, content)?;
    Ok(())
}

/// A `--save` target naming a directory gets a timestamped file name inside it.
pub fn resolve_save_path(target: &Path, format: OutputFormat, stem: &str) -> PathBuf {
    let names_directory = target.is_dir()
        || target
            .as_os_str()
            .to_string_lossy()
            .ends_with(std::path::MAIN_SEPARATOR);
    if names_directory {
        target.join(suggest_filename(format, stem, true))
    } else {
        target.to_path_buf()
    }
}

pub fn suggest_filename(format: OutputFormat, stem: &str, timestamp: bool) -> String {
    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}{}.txt", stem, timestamp_suffix),
        OutputFormat::Json => format!("{}{}.json", stem, timestamp_suffix),
        OutputFormat::Markdown => format!("{}{}.md", stem, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardOptions, DashboardReport};
    use crate::ledger::record::ResponseLedger;
    use crate::results::loader::LoadedArtifacts;
    use crate::results::table::ScoreTable;

    fn report() -> DashboardReport {
        let artifacts = LoadedArtifacts {
            competencies: ScoreTable::from_csv(
                "CompetencyID,CompetencyText,Score\nC1,Python | pandas,0.8\nC2,SQL,0.1\n",
            )
            .unwrap(),
            blocks: ScoreTable::from_csv("BlockName,Score\nData,0.75\nML,0.85\n").unwrap(),
            jobs: ScoreTable::from_csv("JobTitle,JobScore\nData Scientist,0.74\n").unwrap(),
            summary: None,
            block_names_joined: false,
        };
        DashboardReport::build(&artifacts, &DashboardOptions::default(), "fixtures")
    }

    #[test]
    fn test_console_degrades_per_view() {
        let text = ConsoleFormatter::new(false, true).format_dashboard(&report()).unwrap();
        assert!(text.contains("Global coverage score: 0.80 [STRONG]"));
        assert!(text.contains("Data Scientist (0.74)"));
        assert!(text.contains("Competencies detected: 2/2"));
        // Two blocks: radar unavailable, rest still rendered
        assert!(text.contains("at least 3 blocks"));
        assert!(text.contains("No 'BlockName' column"));
        assert!(text.contains("• Data Scientist — 0.74"));
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let md = MarkdownFormatter.format_dashboard(&report()).unwrap();
        assert!(md.contains("Python \\| pandas"));
        assert!(md.contains("## Job recommendations"));
    }

    #[test]
    fn test_json_has_view_status() {
        let json = JsonFormatter::new(false).format_dashboard(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["block_coverage"]["status"], "unavailable");
        assert_eq!(value["top_competencies"]["status"], "ready");
    }

    #[test]
    fn test_empty_listing_message() {
        let listing = ResponseListing::from_ledger(&ResponseLedger::new(), "responses.csv", None);
        let text = ReportGenerator::with_options(false, false, true)
            .responses(&listing, OutputFormat::Console)
            .unwrap();
        assert!(text.contains("No responses have been recorded yet."));
    }

    #[test]
    fn test_markdown_follows_chart_order_with_threshold() {
        let md = MarkdownFormatter.format_dashboard(&report()).unwrap();
        let top = md.split("## Top competencies by similarity").nth(1).unwrap();
        let top = top.split("## Detail by block").next().unwrap();
        let sql = top.find("| SQL |").unwrap();
        let python = top.find("| Python \\| pandas |").unwrap();
        assert!(sql < python, "lowest score first, best at the bottom");
        assert!(top.contains("_Threshold 0.70"));

        let jobs = md.split("## Job recommendations").nth(1).unwrap();
        assert!(jobs.contains("| Data Scientist | 0.74 | `"));
        assert!(jobs.contains("_Threshold 0.70"));
    }

    #[test]
    fn test_save_into_directory_gets_suggested_name() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_save_path(dir.path(), OutputFormat::Markdown, "dashboard");
        assert_eq!(resolved.parent().unwrap(), dir.path());
        let name = resolved.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("dashboard_") && name.ends_with(".md"));

        let file = dir.path().join("report.json");
        assert_eq!(resolve_save_path(&file, OutputFormat::Json, "dashboard"), file);
    }

    #[test]
    fn test_suggested_names() {
        assert_eq!(suggest_filename(OutputFormat::Markdown, "dashboard", false), "dashboard.md");
        assert!(suggest_filename(OutputFormat::Json, "dashboard", true).ends_with(".json"));
    }
}
