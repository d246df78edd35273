//! Dashboard over the engine's results: headline metrics and chart views

pub mod metrics;
pub mod views;

use crate::config::DashboardConfig;
use crate::results::loader::LoadedArtifacts;
use chrono::{DateTime, Local};
use serde::Serialize;

pub use metrics::{HeadlineMetrics, TopJob};
pub use views::{
    Bar, BlockDrilldown, CompetencyRow, RadarView, TopCompetencies, TopJobs, TopNBounds,
    ViewOutcome,
};

/// Score at or above which alignment counts as strong.
pub const DEFAULT_THRESHOLD: f64 = 0.70;

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub threshold: f64,
    pub top_n: Option<usize>,
    pub top_n_bounds: TopNBounds,
    pub block: Option<String>,
    pub top_jobs: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            top_n: None,
            top_n_bounds: TopNBounds::default(),
            block: None,
            top_jobs: 5,
        }
    }
}

impl From<&DashboardConfig> for DashboardOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            threshold: config.threshold,
            top_n: None,
            top_n_bounds: TopNBounds {
                min: config.min_top_n,
                max: config.max_top_n,
                default: config.default_top_n,
            },
            block: None,
            top_jobs: config.top_jobs,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Local>,
    pub source: String,
    pub threshold: f64,
    pub metrics: HeadlineMetrics,
    pub block_coverage: ViewOutcome<RadarView>,
    pub top_competencies: ViewOutcome<TopCompetencies>,
    pub block_detail: ViewOutcome<BlockDrilldown>,
    pub job_recommendations: ViewOutcome<TopJobs>,
}

impl DashboardReport {
    pub fn build(artifacts: &LoadedArtifacts, options: &DashboardOptions, source: &str) -> Self {
        let metrics = metrics::headline_metrics(
            artifacts.summary.as_ref(),
            &artifacts.competencies,
            &artifacts.blocks,
            &artifacts.jobs,
        );

        Self {
            generated_at: Local::now(),
            source: source.to_string(),
            threshold: options.threshold,
            metrics,
            block_coverage: views::radar_view(&artifacts.blocks, options.threshold),
            top_competencies: views::top_competencies(
                &artifacts.competencies,
                options.top_n,
                &options.top_n_bounds,
            ),
            block_detail: views::block_drilldown(&artifacts.competencies, options.block.as_deref()),
            job_recommendations: views::top_jobs(&artifacts.jobs, options.top_jobs, options.threshold),
        }
    }
}
