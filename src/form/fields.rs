//! Field definitions of the skills questionnaire

use crate::error::{Result, SurveyError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Required text fields, in the order the form presents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    FirstName,
    LastName,
    Programming,
    DataAnalysis,
    MlProjects,
    MlProblem,
    Nlp,
    DataPipeline,
    SharingResults,
    Reflection,
}

impl TextField {
    pub const ALL: [TextField; 10] = [
        TextField::FirstName,
        TextField::LastName,
        TextField::Programming,
        TextField::DataAnalysis,
        TextField::MlProjects,
        TextField::MlProblem,
        TextField::Nlp,
        TextField::DataPipeline,
        TextField::SharingResults,
        TextField::Reflection,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in validation messages.
    pub fn label(self) -> &'static str {
        match self {
            TextField::FirstName => "First Name",
            TextField::LastName => "Last Name",
            TextField::Programming => "Programming",
            TextField::DataAnalysis => "Data Analysis",
            TextField::MlProjects => "ML Projects",
            TextField::MlProblem => "ML Problem",
            TextField::Nlp => "NLP",
            TextField::DataPipeline => "Data Pipeline",
            TextField::SharingResults => "Sharing Results",
            TextField::Reflection => "Reflection",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            TextField::FirstName => "First Name",
            TextField::LastName => "Last Name",
            TextField::Programming => "Describe your experience with programming.",
            TextField::DataAnalysis => "Explain how you typically analyze a dataset.",
            TextField::MlProjects => "Tell us about a project where you applied ML techniques.",
            TextField::MlProblem => "How would you approach designing a churn prediction model?",
            TextField::Nlp => "Have you ever worked with text data (NLP)?",
            TextField::DataPipeline => "Explain a time when you built a data pipeline.",
            TextField::SharingResults => "How do you share your analysis results?",
            TextField::Reflection => "In your opinion, what makes someone strong in Data Science?",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            TextField::FirstName => "Enter your first name",
            TextField::LastName => "Enter your last name",
            TextField::Programming => {
                "Ex: I mostly use Python and SQL, and I work with Git and OOP concepts."
            }
            TextField::DataAnalysis => {
                "Ex: I clean the data, perform EDA, visualize distributions, and calculate statistics."
            }
            TextField::MlProjects => {
                "Ex: I built a regression model using scikit-learn and evaluated it with cross-validation."
            }
            TextField::MlProblem => {
                "Ex: I would perform feature engineering, select a model, train, and evaluate it."
            }
            TextField::Nlp => {
                "Ex: I tokenized text, used embeddings, transformers, sentiment analysis, and NER."
            }
            TextField::DataPipeline => {
                "Ex: I implemented an ETL pipeline using Airflow for batch processing."
            }
            TextField::SharingResults => {
                "Ex: I create dashboards, visualizations, and prepare presentations to explain insights."
            }
            TextField::Reflection => {
                "Ex: Strong problem-solving, communication skills, and mastery of tools."
            }
        }
    }

    /// Single-line inputs as opposed to free-text areas.
    pub fn is_short(self) -> bool {
        matches!(self, TextField::FirstName | TextField::LastName)
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatingField {
    GitLevel,
    PresentationLevel,
}

impl RatingField {
    pub const ALL: [RatingField; 2] = [RatingField::GitLevel, RatingField::PresentationLevel];

    pub fn label(self) -> &'static str {
        match self {
            RatingField::GitLevel => "Git & Collaboration",
            RatingField::PresentationLevel => "Presentation Skills",
        }
    }
}

/// Self-assessed level on a 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const DEFAULT: Rating = Rating(3);

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(SurveyError::InvalidInput(format!(
                "rating must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Rating {
    type Error = SurveyError;

    fn try_from(value: u8) -> Result<Self> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}
