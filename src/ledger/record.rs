//! Survey response records and the CSV ledger that holds them

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Fixed column order of the ledger file.
pub const LEDGER_HEADER: [&str; 13] = [
    "Timestamp",
    "First_Name",
    "Last_Name",
    "Programming",
    "Data_Analysis",
    "ML_Projects",
    "ML_Problem",
    "NLP",
    "Data_Pipeline",
    "Sharing_Results",
    "Git_Level",
    "Presentation_Level",
    "Reflection",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One submitted survey response. Field order follows `LEDGER_HEADER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "First_Name")]
    pub first_name: String,
    #[serde(rename = "Last_Name")]
    pub last_name: String,
    #[serde(rename = "Programming")]
    pub programming: String,
    #[serde(rename = "Data_Analysis")]
    pub data_analysis: String,
    #[serde(rename = "ML_Projects")]
    pub ml_projects: String,
    #[serde(rename = "ML_Problem")]
    pub ml_problem: String,
    #[serde(rename = "NLP")]
    pub nlp: String,
    #[serde(rename = "Data_Pipeline")]
    pub data_pipeline: String,
    #[serde(rename = "Sharing_Results")]
    pub sharing_results: String,
    #[serde(rename = "Git_Level")]
    pub git_level: u8,
    #[serde(rename = "Presentation_Level")]
    pub presentation_level: u8,
    #[serde(rename = "Reflection")]
    pub reflection: String,
}

impl ResponseRecord {
    /// Free-text answers paired with their ledger column.
    pub fn answers(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Programming", self.programming.as_str()),
            ("Data_Analysis", self.data_analysis.as_str()),
            ("ML_Projects", self.ml_projects.as_str()),
            ("ML_Problem", self.ml_problem.as_str()),
            ("NLP", self.nlp.as_str()),
            ("Data_Pipeline", self.data_pipeline.as_str()),
            ("Sharing_Results", self.sharing_results.as_str()),
            ("Reflection", self.reflection.as_str()),
        ]
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Append-only sequence of responses in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseLedger {
    records: Vec<ResponseRecord>,
}

impl ResponseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ResponseRecord>) -> Self {
        Self { records }
    }

    /// Parse ledger text. Empty and header-only input both give an empty ledger.
    pub fn from_csv(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let records = reader
            .deserialize::<ResponseRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { records })
    }

    /// Serialize the whole ledger. The header is always written.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(LEDGER_HEADER)?;
        for record in &self.records {
            writer.serialize(record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| crate::error::SurveyError::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| crate::error::SurveyError::Decode(format!("Ledger is not UTF-8: {}", e)))
    }

    pub fn append(&mut self, record: ResponseRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&ResponseRecord> {
        self.records.last()
    }

    /// Newest first. Storage order is left untouched.
    pub fn sorted_for_display(&self) -> Vec<&ResponseRecord> {
        let mut view: Vec<&ResponseRecord> = self.records.iter().collect();
        view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        view
    }
}
