//! Integration tests for the competency survey

use chrono::NaiveDate;
use competency_survey::config::{Config, OutputFormat};
use competency_survey::dashboard::{DashboardOptions, DashboardReport};
use competency_survey::error::SurveyError;
use competency_survey::form::{FormInput, FormState, TextField};
use competency_survey::ledger::{LedgerBackend, LocalLedgerStore, ResponseStore, LEDGER_HEADER};
use competency_survey::output::{ReportGenerator, ResponseListing};
use competency_survey::results::{load_artifacts, ArtifactPaths, LocalArtifactSource};
use std::fs;
use std::path::Path;

fn complete_input() -> FormInput {
    FormInput {
        first_name: Some("Ana".to_string()),
        last_name: Some("Lee".to_string()),
        programming: Some("Python daily, some Rust".to_string()),
        data_analysis: Some("pandas, then plots".to_string()),
        ml_projects: Some("Churn prediction with gradient boosting".to_string()),
        ml_problem: Some("Baseline first, then iterate on features".to_string()),
        nlp: Some("Sentence embeddings and topic models".to_string()),
        data_pipeline: Some("Airflow DAGs loading a warehouse".to_string()),
        sharing_results: Some("Short notebooks and a dashboard".to_string()),
        reflection: Some("Curiosity and patience".to_string()),
        git_level: Some(4),
        presentation_level: Some(2),
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[tokio::test]
async fn test_submission_appends_to_header_only_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("responses.csv");
    fs::write(&path, format!("{}\n", LEDGER_HEADER.join(","))).unwrap();
    let store = LocalLedgerStore::new(&path);

    let mut form = FormState::new();
    form.apply(&complete_input()).unwrap();
    let submitted_at = NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let outcome = form.submit_at(&store, submitted_at).await.unwrap();
    assert_eq!(outcome.receipt.records, 1);
    assert!(form.is_pristine());

    let ledger = store.load().await.unwrap();
    assert_eq!(ledger.len(), 1);
    let record = ledger.last().unwrap();
    assert_eq!(record.first_name, "Ana");
    assert_eq!(record.last_name, "Lee");
    assert_eq!(record.git_level, 4);
    assert_eq!(record.presentation_level, 2);
    assert_eq!(record.timestamp, "2025-03-01 10:00:00");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Timestamp,"));
    assert_eq!(text.lines().count(), 2);
}

#[tokio::test]
async fn test_blank_field_leaves_ledger_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLedgerStore::new(dir.path().join("responses.csv"));

    let mut input = complete_input();
    input.nlp = Some("   ".to_string());
    input.reflection = None;

    let mut form = FormState::new();
    form.apply(&input).unwrap();
    let err = form.submit(&store).await.unwrap_err();

    match err {
        SurveyError::Validation { missing } => {
            assert_eq!(missing.len(), 2);
            assert!(missing.contains(&TextField::Nlp.label().to_string()));
            assert!(missing.contains(&TextField::Reflection.label().to_string()));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(!dir.path().join("responses.csv").exists());
    assert_eq!(form.text(TextField::FirstName), "Ana");
}

#[tokio::test]
async fn test_configured_backend_lists_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.storage.local_path = dir.path().join("ledger").join("responses.csv");
    config.output.color_output = false;
    let backend = LedgerBackend::from_config(&config, None).unwrap();

    for (first, day) in [("Ana", 1), ("Ben", 3), ("Cleo", 2)] {
        let mut form = FormState::new();
        let mut input = complete_input();
        input.first_name = Some(first.to_string());
        form.apply(&input).unwrap();
        let at = NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        form.submit_at(&backend, at).await.unwrap();
    }

    let ledger = backend.load().await.unwrap();
    let listing = ResponseListing::from_ledger(&ledger, backend.location(), Some(2));
    assert_eq!(listing.total, 3);
    assert_eq!(listing.records[0].first_name, "Ben");
    assert_eq!(listing.records[1].first_name, "Cleo");

    let generator = ReportGenerator::from_config(&config.output, false);
    let json = generator.responses(&listing, OutputFormat::Json).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["total"], 3);
}

#[tokio::test]
async fn test_dashboard_from_local_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "outputs/competency_scores.csv",
        "CompetencyID,CompetencyText,Score\n\
         C1,Write SQL queries,0.91\n\
         C2,Train supervised models,0.55\n\
         C3,Build ETL pipelines,0.78\n\
         C4,Present findings,0.00\n\
         C5,Version control with Git,0.66\n\
         C6,Text preprocessing,0.81\n",
    );
    write(
        root,
        "outputs/block_scores.csv",
        "BlockName,Score\nData Engineering,0.80\nMachine Learning,0.60\nCommunication,0.40\n",
    );
    write(
        root,
        "outputs/job_scores.csv",
        "JobTitle,JobScore\nData Analyst,0.72\nData Engineer,0.81\nML Engineer,0.81\n",
    );
    write(
        root,
        "data/competencies.csv",
        "CompetencyID,BlockName\nC1,Data Engineering\nC2,Machine Learning\nC3,Data Engineering\n\
         C4,Communication\nC5,Communication\nC6,Machine Learning\n",
    );

    let source = LocalArtifactSource::new(root);
    let artifacts = load_artifacts(&source, &ArtifactPaths::default()).await.unwrap();
    assert!(artifacts.block_names_joined);
    assert!(artifacts.summary.is_none());

    let options = DashboardOptions {
        top_n: Some(5),
        block: Some("Data Engineering".to_string()),
        ..DashboardOptions::default()
    };
    let report = DashboardReport::build(&artifacts, &options, "fixtures");

    let coverage = report.metrics.global_coverage.unwrap();
    assert!((coverage - 0.60).abs() < 1e-9);
    let top_job = report.metrics.top_job.as_ref().unwrap();
    assert_eq!(top_job.title, "Data Engineer");
    assert_eq!(report.metrics.matched_competencies, 5);
    assert_eq!(report.metrics.total_competencies, 6);

    let top = report.top_competencies.ready().unwrap();
    assert_eq!(top.ranked.len(), 5);
    assert_eq!(top.ranked[0].text, "Write SQL queries");
    assert_eq!(top.chart_order().last().unwrap().text, "Write SQL queries");

    let detail = report.block_detail.ready().unwrap();
    assert_eq!(detail.selected, "Data Engineering");
    let ids: Vec<_> = detail.rows.iter().filter_map(|r| r.id.as_deref()).collect();
    assert_eq!(ids, vec!["C3", "C1"]);

    assert!(report.block_coverage.is_ready());
    let jobs = report.job_recommendations.ready().unwrap();
    assert_eq!(jobs.ranked[0].label, "Data Engineer");

    let markdown = ReportGenerator::with_options(false, true, true)
        .dashboard(&report, OutputFormat::Markdown)
        .unwrap();
    assert!(markdown.contains("Data Engineer"));
}

#[tokio::test]
async fn test_summary_overrides_block_mean() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "outputs/competency_scores.csv", "CompetencyID,CompetencyText,Score\nC1,SQL,0.5\n");
    write(root, "outputs/block_scores.csv", "BlockName,Score\nA,0.2\nB,0.4\n");
    write(root, "outputs/job_scores.csv", "JobTitle,Score\nAnalyst,0.3\n");
    write(root, "outputs/results/summary.json", r#"{"final_coverage": 0.64}"#);

    let artifacts = load_artifacts(&LocalArtifactSource::new(root), &ArtifactPaths::default())
        .await
        .unwrap();
    let report = DashboardReport::build(&artifacts, &DashboardOptions::default(), "fixtures");

    assert_eq!(report.metrics.global_coverage, Some(0.64));
    assert!(!report.block_coverage.is_ready());
    assert!(!report.block_detail.is_ready());
}

#[tokio::test]
async fn test_missing_artifacts_are_named() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "outputs/block_scores.csv", "BlockName,Score\nA,0.5\n");

    let err = load_artifacts(&LocalArtifactSource::new(dir.path()), &ArtifactPaths::default())
        .await
        .unwrap_err();
    match err {
        SurveyError::MissingArtifacts(files) => {
            assert_eq!(files, vec!["competency_scores.csv", "job_scores.csv"]);
        }
        other => panic!("expected missing artifacts, got {other:?}"),
    }
}
