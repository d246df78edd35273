//! Competency survey library

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod embeddings;
pub mod error;
pub mod form;
pub mod ledger;
pub mod output;
pub mod results;

pub use error::{Result, SurveyError};
pub use config::Config;
