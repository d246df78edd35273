//! Chart views. Each one either has its data or explains why it cannot render.

use crate::dashboard::metrics::job_columns;
use crate::results::table::ScoreTable;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ViewOutcome<T> {
    Ready(T),
    Unavailable(String),
}

impl<T> ViewOutcome<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewOutcome::Ready(view) => Some(view),
            ViewOutcome::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewOutcome::Ready(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarView {
    /// One axis per block, scores clipped to [0, 1]
    pub axes: Vec<Bar>,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCompetencies {
    pub requested: usize,
    /// Highest score first
    pub ranked: Vec<CompetencyRow>,
}

impl TopCompetencies {
    /// Bar chart order: lowest first so the best ends up on top.
    pub fn chart_order(&self) -> Vec<&CompetencyRow> {
        self.ranked.iter().rev().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencyRow {
    pub id: Option<String>,
    pub text: String,
    pub score: Option<f64>,
    pub block: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockDrilldown {
    pub blocks: Vec<String>,
    pub selected: String,
    /// Lowest score first
    pub rows: Vec<CompetencyRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopJobs {
    pub score_column: String,
    /// Highest score first
    pub ranked: Vec<Bar>,
    pub threshold: f64,
}

/// Bounds and default for the top-N competency view.
#[derive(Debug, Clone, Copy)]
pub struct TopNBounds {
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

impl Default for TopNBounds {
    fn default() -> Self {
        Self { min: 5, max: 35, default: 10 }
    }
}

impl TopNBounds {
    /// Requested N, or `min(default, rows)`, clamped to the bounds.
    /// Inverted bounds are read in order instead of panicking.
    pub fn resolve(&self, requested: Option<usize>, rows: usize) -> usize {
        let (low, high) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        requested
            .unwrap_or_else(|| self.default.min(rows))
            .clamp(low, high)
    }
}

fn competency_row(table: &ScoreTable, row: usize) -> CompetencyRow {
    let id = table.text(row, "CompetencyID").map(str::to_string);
    let text = table
        .text(row, "CompetencyText")
        .map(str::to_string)
        .or_else(|| id.clone())
        .unwrap_or_default();
    CompetencyRow {
        id,
        text,
        score: table.column("Score").and_then(|c| table.number(row, c)),
        block: table.text(row, "BlockName").map(str::to_string),
    }
}

pub fn radar_view(blocks: &ScoreTable, threshold: f64) -> ViewOutcome<RadarView> {
    if !blocks.has_columns(&["BlockName", "Score"]) || blocks.len() < 3 {
        return ViewOutcome::Unavailable(
            "block_scores.csv needs 'BlockName' and 'Score' columns and at least 3 blocks."
                .to_string(),
        );
    }

    let scores = blocks.numbers("Score");
    let axes = (0..blocks.len())
        .map(|row| Bar {
            label: blocks.text(row, "BlockName").unwrap_or_default().to_string(),
            score: scores[row].unwrap_or(0.0).clamp(0.0, 1.0),
        })
        .collect();

    ViewOutcome::Ready(RadarView { axes, threshold })
}

pub fn top_competencies(
    competencies: &ScoreTable,
    requested: Option<usize>,
    bounds: &TopNBounds,
) -> ViewOutcome<TopCompetencies> {
    if !competencies.has_columns(&["CompetencyText", "Score"]) {
        return ViewOutcome::Unavailable(
            "competency_scores.csv needs 'CompetencyText' and 'Score' columns.".to_string(),
        );
    }

    let n = bounds.resolve(requested, competencies.len());
    let ranked = competencies
        .rows_sorted_by("Score", true)
        .into_iter()
        .take(n)
        .map(|row| competency_row(competencies, row))
        .collect();

    ViewOutcome::Ready(TopCompetencies { requested: n, ranked })
}

/// Distinct non-empty block names in first-seen order.
pub fn block_names(competencies: &ScoreTable) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in 0..competencies.len() {
        if let Some(name) = competencies.text(row, "BlockName") {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

pub fn block_drilldown(
    competencies: &ScoreTable,
    selected: Option<&str>,
) -> ViewOutcome<BlockDrilldown> {
    if !competencies.has_column("BlockName") {
        return ViewOutcome::Unavailable(
            "No 'BlockName' column; provide data/competencies.csv to join it in.".to_string(),
        );
    }

    let blocks = block_names(competencies);
    let Some(first) = blocks.first() else {
        return ViewOutcome::Unavailable("No 'BlockName' values found.".to_string());
    };

    let selected = match selected {
        Some(name) if blocks.iter().any(|b| b == name) => name.to_string(),
        Some(name) => {
            return ViewOutcome::Unavailable(format!(
                "Unknown block '{}'. Available: {}",
                name,
                blocks.join(", ")
            ))
        }
        None => first.clone(),
    };

    let rows = competencies
        .rows_sorted_by("Score", false)
        .into_iter()
        .filter(|&row| competencies.text(row, "BlockName") == Some(selected.as_str()))
        .map(|row| competency_row(competencies, row))
        .collect();

    ViewOutcome::Ready(BlockDrilldown { blocks, selected, rows })
}

pub fn top_jobs(jobs: &ScoreTable, limit: usize, threshold: f64) -> ViewOutcome<TopJobs> {
    let Some((score_column, title_column)) = job_columns(jobs) else {
        return ViewOutcome::Unavailable("Job score column missing in job_scores.csv.".to_string());
    };
    let Some(score_index) = jobs.column(score_column) else {
        return ViewOutcome::Unavailable("Job score column missing in job_scores.csv.".to_string());
    };

    let ranked = jobs
        .rows_sorted_by(score_column, true)
        .into_iter()
        .take(limit)
        .filter_map(|row| {
            let score = jobs.number(row, score_index)?;
            Some(Bar {
                label: jobs.text(row, &title_column).unwrap_or_default().to_string(),
                score,
            })
        })
        .collect();

    ViewOutcome::Ready(TopJobs {
        score_column: score_column.to_string(),
        ranked,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> ScoreTable {
        ScoreTable::from_csv(csv).unwrap()
    }

    fn competencies(rows: usize) -> ScoreTable {
        let mut csv = String::from("CompetencyID,CompetencyText,Score,BlockName\n");
        for i in 0..rows {
            let block = if i % 2 == 0 { "Data" } else { "ML" };
            csv.push_str(&format!("C{i},Skill {i},{:.2},{block}\n", (i as f64) / 100.0));
        }
        table(&csv)
    }

    #[test]
    fn test_radar_needs_three_blocks() {
        let two = table("BlockName,Score\nA,0.5\nB,0.6\n");
        assert!(!radar_view(&two, 0.7).is_ready());

        let three = table("BlockName,Score\nA,1.4\nB,-0.2\nC,0.5\n");
        let radar = radar_view(&three, 0.7);
        let view = radar.ready().unwrap();
        let scores: Vec<f64> = view.axes.iter().map(|a| a.score).collect();
        assert_eq!(scores, vec![1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_top_five_is_descending_and_chart_ascending() {
        let outcome = top_competencies(&competencies(12), Some(5), &TopNBounds::default());
        let view = outcome.ready().unwrap();
        assert_eq!(view.ranked.len(), 5);
        assert_eq!(view.ranked[0].text, "Skill 11");
        assert_eq!(view.ranked[4].text, "Skill 7");
        assert_eq!(view.chart_order()[0].text, "Skill 7");
    }

    #[test]
    fn test_top_n_with_fewer_rows() {
        let outcome = top_competencies(&competencies(3), Some(5), &TopNBounds::default());
        assert_eq!(outcome.ready().unwrap().ranked.len(), 3);
    }

    #[test]
    fn test_top_n_bounds() {
        let bounds = TopNBounds::default();
        assert_eq!(bounds.resolve(None, 40), 10);
        assert_eq!(bounds.resolve(None, 3), 5);
        assert_eq!(bounds.resolve(Some(100), 40), 35);
        assert_eq!(bounds.resolve(Some(1), 40), 5);
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        let bounds = TopNBounds { min: 10, max: 5, default: 10 };
        assert_eq!(bounds.resolve(None, 3), 5);
        assert_eq!(bounds.resolve(Some(7), 40), 7);
        assert_eq!(bounds.resolve(Some(50), 40), 10);
    }

    #[test]
    fn test_block_order_is_first_seen() {
        let comp = table("CompetencyText,Score,BlockName\na,0.1,NLP\nb,0.2,\nc,0.3,Data\nd,0.4,NLP\n");
        assert_eq!(block_names(&comp), vec!["NLP", "Data"]);
    }

    #[test]
    fn test_drilldown_sorts_ascending() {
        let comp = table("CompetencyText,Score,BlockName\na,0.9,NLP\nb,0.2,Data\nc,0.3,NLP\n");
        let outcome = block_drilldown(&comp, None);
        let view = outcome.ready().unwrap();
        assert_eq!(view.selected, "NLP");
        let texts: Vec<&str> = view.rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a"]);

        assert!(!block_drilldown(&comp, Some("Vision")).is_ready());
        assert!(!block_drilldown(&table("CompetencyText,Score\na,0.1\n"), None).is_ready());
    }

    #[test]
    fn test_top_jobs_limit_and_fallback_title() {
        let jobs = table("Role,FinalScore\nA,0.1\nB,0.9\nC,0.5\nD,0.3\nE,0.7\nF,0.2\n");
        let outcome = top_jobs(&jobs, 5, 0.7);
        let view = outcome.ready().unwrap();
        let labels: Vec<&str> = view.ranked.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["B", "E", "C", "D", "F"]);
        assert_eq!(view.score_column, "FinalScore");

        assert!(!top_jobs(&table("JobTitle\nA\n"), 5, 0.7).is_ready());
    }
}
