//! Headline metrics

use crate::results::loader::Summary;
use crate::results::table::ScoreTable;
use serde::Serialize;

/// Job score columns, in order of preference.
pub const JOB_SCORE_COLUMNS: [&str; 3] = ["JobScore", "Score", "FinalScore"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopJob {
    pub title: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub global_coverage: Option<f64>,
    pub top_job: Option<TopJob>,
    pub matched_competencies: usize,
    pub total_competencies: usize,
}

/// Summary value when present, else the mean block score.
pub fn global_coverage(summary: Option<&Summary>, blocks: &ScoreTable) -> Option<f64> {
    summary
        .and_then(|s| s.final_coverage)
        .or_else(|| blocks.mean("Score"))
}

/// Columns used to rank jobs: the preferred score column and the title column.
pub fn job_columns(jobs: &ScoreTable) -> Option<(&'static str, String)> {
    let score = jobs.first_present(&JOB_SCORE_COLUMNS)?;
    let title = if jobs.has_column("JobTitle") {
        "JobTitle".to_string()
    } else {
        jobs.first_column()?.to_string()
    };
    Some((score, title))
}

/// Highest scoring job; the earliest row wins a tie.
pub fn top_job(jobs: &ScoreTable) -> Option<TopJob> {
    let (score_column, title_column) = job_columns(jobs)?;
    let best = *jobs.rows_sorted_by(score_column, true).first()?;
    let score = jobs.number(best, jobs.column(score_column)?)?;
    Some(TopJob {
        title: jobs.text(best, &title_column).unwrap_or_default().to_string(),
        score,
    })
}

/// Competencies with a positive score, and the total row count.
pub fn matched_competencies(competencies: &ScoreTable) -> (usize, usize) {
    let matched = competencies
        .numbers("Score")
        .into_iter()
        .filter(|s| matches!(s, Some(v) if *v > 0.0))
        .count();
    (matched, competencies.len())
}

pub fn headline_metrics(
    summary: Option<&Summary>,
    competencies: &ScoreTable,
    blocks: &ScoreTable,
    jobs: &ScoreTable,
) -> HeadlineMetrics {
    let (matched, total) = matched_competencies(competencies);
    HeadlineMetrics {
        global_coverage: global_coverage(summary, blocks),
        top_job: top_job(jobs),
        matched_competencies: matched,
        total_competencies: total,
    }
}
