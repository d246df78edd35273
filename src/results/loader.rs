//! Loading and enrichment of the engine's score artifacts

use crate::config::ArtifactConfig;
use crate::error::{Result, SurveyError};
use crate::results::source::ArtifactSource;
use crate::results::table::ScoreTable;
use log::{info, warn};
use serde::Serialize;
use std::path::Path;

/// Relative locations of the five artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub competency_scores: String,
    pub block_scores: String,
    pub job_scores: String,
    pub summary: String,
    pub competency_reference: String,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            competency_scores: "outputs/competency_scores.csv".to_string(),
            block_scores: "outputs/block_scores.csv".to_string(),
            job_scores: "outputs/job_scores.csv".to_string(),
            summary: "outputs/results/summary.json".to_string(),
            competency_reference: "data/competencies.csv".to_string(),
        }
    }
}

impl From<&ArtifactConfig> for ArtifactPaths {
    fn from(config: &ArtifactConfig) -> Self {
        Self {
            competency_scores: config.competency_scores.clone(),
            block_scores: config.block_scores.clone(),
            job_scores: config.job_scores.clone(),
            summary: config.summary.clone(),
            competency_reference: config.competency_reference.clone(),
        }
    }
}

/// Precomputed summary written by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub final_coverage: Option<f64>,
}

impl Summary {
    /// Parse `summary.json`; `final_coverage` wins over `final_coverage_score`.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let final_coverage = ["final_coverage", "final_coverage_score"]
            .iter()
            .find_map(|key| value.get(*key).and_then(serde_json::Value::as_f64));
        Ok(Self { final_coverage })
    }
}

/// Everything the dashboard needs.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub competencies: ScoreTable,
    pub blocks: ScoreTable,
    pub jobs: ScoreTable,
    pub summary: Option<Summary>,
    /// True when `BlockName` was joined in from the reference table
    pub block_names_joined: bool,
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Fetch all artifacts. Fails with `MissingArtifacts` if any score table is absent.
pub async fn load_artifacts<S: ArtifactSource + Sync>(
    source: &S,
    paths: &ArtifactPaths,
) -> Result<LoadedArtifacts> {
    info!("Loading results from {}", source.describe());

    let (competencies, blocks, jobs, summary, reference) = tokio::join!(
        source.fetch(&paths.competency_scores),
        source.fetch(&paths.block_scores),
        source.fetch(&paths.job_scores),
        source.fetch(&paths.summary),
        source.fetch(&paths.competency_reference),
    );
    let (competencies, blocks, jobs, summary, reference) =
        (competencies?, blocks?, jobs?, summary?, reference?);

    let missing: Vec<String> = [
        (&competencies, &paths.competency_scores),
        (&blocks, &paths.block_scores),
        (&jobs, &paths.job_scores),
    ]
    .iter()
    .filter(|(content, _)| content.as_deref().map_or(true, |c| c.trim().is_empty()))
    .map(|(_, path)| file_name(path))
    .collect();

    let (Some(competencies), Some(blocks), Some(jobs)) = (competencies, blocks, jobs) else {
        return Err(SurveyError::MissingArtifacts(missing));
    };
    if !missing.is_empty() {
        return Err(SurveyError::MissingArtifacts(missing));
    }

    let mut competencies = ScoreTable::from_csv(&competencies)?;
    let blocks = ScoreTable::from_csv(&blocks)?;
    let jobs = ScoreTable::from_csv(&jobs)?;

    let summary = summary.and_then(|text| match Summary::from_json(&text) {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("Ignoring unreadable summary {}: {}", paths.summary, e);
            None
        }
    });

    let mut block_names_joined = false;
    if let Some(reference) = reference {
        if !competencies.has_column("BlockName") && competencies.has_column("CompetencyID") {
            match ScoreTable::from_csv(&reference) {
                Ok(reference) if reference.has_columns(&["CompetencyID", "BlockName"]) => {
                    competencies = competencies.left_join(&reference, "CompetencyID", "BlockName");
                    block_names_joined = true;
                }
                Ok(_) => warn!(
                    "{} lacks CompetencyID/BlockName, skipping block enrichment",
                    paths.competency_reference
                ),
                Err(e) => warn!("Ignoring unreadable {}: {}", paths.competency_reference, e),
            }
        }
    }

    Ok(LoadedArtifacts {
        competencies,
        blocks,
        jobs,
        summary,
        block_names_joined,
    })
}
