//! Form state, validation and submission

use crate::error::{Result, SurveyError};
use crate::form::fields::{Rating, RatingField, TextField};
use crate::ledger::record::{ResponseRecord, TIMESTAMP_FORMAT};
use crate::ledger::store::{AppendReceipt, ResponseStore};
use chrono::NaiveDateTime;
use log::{info, warn};
use serde::Deserialize;
use std::path::Path;

/// Partial answers, as read from an answers file or command-line flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub programming: Option<String>,
    pub data_analysis: Option<String>,
    pub ml_projects: Option<String>,
    pub ml_problem: Option<String>,
    pub nlp: Option<String>,
    pub data_pipeline: Option<String>,
    pub sharing_results: Option<String>,
    pub reflection: Option<String>,
    pub git_level: Option<u8>,
    pub presentation_level: Option<u8>,
}

impl FormInput {
    /// Read answers from a `.toml` or `.json` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                SurveyError::InvalidInput(format!("Answers file {}: {}", path.display(), e))
            }),
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Err(SurveyError::InvalidInput(format!(
                "Answers file must be .toml or .json: {}",
                path.display()
            ))),
        }
    }

    /// Values from `overrides` win where present.
    pub fn merge(self, overrides: FormInput) -> FormInput {
        FormInput {
            first_name: overrides.first_name.or(self.first_name),
            last_name: overrides.last_name.or(self.last_name),
            programming: overrides.programming.or(self.programming),
            data_analysis: overrides.data_analysis.or(self.data_analysis),
            ml_projects: overrides.ml_projects.or(self.ml_projects),
            ml_problem: overrides.ml_problem.or(self.ml_problem),
            nlp: overrides.nlp.or(self.nlp),
            data_pipeline: overrides.data_pipeline.or(self.data_pipeline),
            sharing_results: overrides.sharing_results.or(self.sharing_results),
            reflection: overrides.reflection.or(self.reflection),
            git_level: overrides.git_level.or(self.git_level),
            presentation_level: overrides.presentation_level.or(self.presentation_level),
        }
    }

    fn text(&self, field: TextField) -> Option<&String> {
        match field {
            TextField::FirstName => self.first_name.as_ref(),
            TextField::LastName => self.last_name.as_ref(),
            TextField::Programming => self.programming.as_ref(),
            TextField::DataAnalysis => self.data_analysis.as_ref(),
            TextField::MlProjects => self.ml_projects.as_ref(),
            TextField::MlProblem => self.ml_problem.as_ref(),
            TextField::Nlp => self.nlp.as_ref(),
            TextField::DataPipeline => self.data_pipeline.as_ref(),
            TextField::SharingResults => self.sharing_results.as_ref(),
            TextField::Reflection => self.reflection.as_ref(),
        }
    }
}

/// Current values of every form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    text: [String; 10],
    git_level: Rating,
    presentation_level: Rating,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            text: Default::default(),
            git_level: Rating::DEFAULT,
            presentation_level: Rating::DEFAULT,
        }
    }
}

/// A persisted submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub record: ResponseRecord,
    pub receipt: AppendReceipt,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the form from partial input. Ratings are range-checked here.
    pub fn apply(&mut self, input: &FormInput) -> Result<()> {
        for field in TextField::ALL {
            if let Some(value) = input.text(field) {
                self.set_text(field, value.clone());
            }
        }
        if let Some(level) = input.git_level {
            self.set_rating(RatingField::GitLevel, Rating::new(level)?);
        }
        if let Some(level) = input.presentation_level {
            self.set_rating(RatingField::PresentationLevel, Rating::new(level)?);
        }
        Ok(())
    }

    pub fn set_text(&mut self, field: TextField, value: impl Into<String>) {
        self.text[field.index()] = value.into();
    }

    pub fn text(&self, field: TextField) -> &str {
        &self.text[field.index()]
    }

    pub fn set_rating(&mut self, field: RatingField, rating: Rating) {
        match field {
            RatingField::GitLevel => self.git_level = rating,
            RatingField::PresentationLevel => self.presentation_level = rating,
        }
    }

    pub fn rating(&self, field: RatingField) -> Rating {
        match field {
            RatingField::GitLevel => self.git_level,
            RatingField::PresentationLevel => self.presentation_level,
        }
    }

    /// Labels of the required fields that are blank after trimming, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        TextField::ALL
            .iter()
            .filter(|field| self.text(**field).trim().is_empty())
            .map(|field| field.label())
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SurveyError::Validation {
                missing: missing.into_iter().map(str::to_string).collect(),
            })
        }
    }

    /// Build the record exactly as entered; text is not trimmed.
    pub fn build_record(&self, submitted_at: NaiveDateTime) -> ResponseRecord {
        ResponseRecord {
            timestamp: submitted_at.format(TIMESTAMP_FORMAT).to_string(),
            first_name: self.text(TextField::FirstName).to_string(),
            last_name: self.text(TextField::LastName).to_string(),
            programming: self.text(TextField::Programming).to_string(),
            data_analysis: self.text(TextField::DataAnalysis).to_string(),
            ml_projects: self.text(TextField::MlProjects).to_string(),
            ml_problem: self.text(TextField::MlProblem).to_string(),
            nlp: self.text(TextField::Nlp).to_string(),
            data_pipeline: self.text(TextField::DataPipeline).to_string(),
            sharing_results: self.text(TextField::SharingResults).to_string(),
            git_level: self.git_level.value(),
            presentation_level: self.presentation_level.value(),
            reflection: self.text(TextField::Reflection).to_string(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_pristine(&self) -> bool {
        *self == Self::default()
    }

    /// Validate, persist with the current local time, then clear the form.
    pub async fn submit<S: ResponseStore>(&mut self, store: &S) -> Result<SubmitOutcome> {
        let now = chrono::Local::now().naive_local();
        self.submit_at(store, now).await
    }

    pub async fn submit_at<S: ResponseStore>(
        &mut self,
        store: &S,
        submitted_at: NaiveDateTime,
    ) -> Result<SubmitOutcome> {
        if let Err(e) = self.validate() {
            warn!("Submission rejected: {}", e);
            return Err(e);
        }

        let record = self.build_record(submitted_at);
        let receipt = store.append(record.clone()).await?;
        info!(
            "Stored response from {} ({} total)",
            record.full_name(),
            receipt.records
        );

        self.reset();
        Ok(SubmitOutcome { record, receipt })
    }
}
