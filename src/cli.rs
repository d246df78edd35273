//! CLI interface for the competency survey

use crate::config::{ArtifactSourceKind, OutputFormat, StorageBackend};
use crate::form::FormInput;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "competency-survey")]
#[command(about = "Skills survey collection and semantic coverage dashboard")]
#[command(long_about = "Collect free-text skills questionnaires into a CSV ledger (local or on GitHub) and render the competency, block and job scores produced by the semantic engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in and submit the skills questionnaire
    Submit {
        /// Answers file (TOML or JSON)
        #[arg(short, long)]
        answers: Option<PathBuf>,

        #[command(flatten)]
        fields: FieldArgs,

        /// Prompt for fields left blank
        #[arg(short, long)]
        interactive: bool,

        /// Storage backend: local, remote
        #[arg(short, long)]
        store: Option<String>,
    },

    /// List previous responses, newest first
    Responses {
        /// Show at most this many responses
        #[arg(short, long)]
        limit: Option<usize>,

        /// Storage backend: local, remote
        #[arg(short, long)]
        store: Option<String>,

        /// Include every answer
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Render the semantic analysis results
    Dashboard {
        /// Artifact source: local, remote
        #[arg(long)]
        source: Option<String>,

        /// Root directory of local artifacts
        #[arg(long)]
        root: Option<PathBuf>,

        /// Number of top competencies to show (5-35)
        #[arg(short, long)]
        top: Option<usize>,

        /// Block to drill into
        #[arg(short, long)]
        block: Option<String>,

        /// Show detailed tables
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Encode texts with a sentence embedding model
    Embed {
        /// Model name or Hugging Face repo ID
        #[arg(short, long)]
        model: Option<String>,

        /// Encode the free-text answers of every recorded response
        #[arg(long)]
        from_ledger: bool,

        /// Texts to encode
        texts: Vec<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Per-field answers; these override the answers file.
#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub programming: Option<String>,
    #[arg(long)]
    pub data_analysis: Option<String>,
    #[arg(long)]
    pub ml_projects: Option<String>,
    #[arg(long)]
    pub ml_problem: Option<String>,
    #[arg(long)]
    pub nlp: Option<String>,
    #[arg(long)]
    pub data_pipeline: Option<String>,
    #[arg(long)]
    pub sharing_results: Option<String>,
    #[arg(long)]
    pub reflection: Option<String>,
    /// Git & Collaboration (1-5)
    #[arg(long)]
    pub git_level: Option<u8>,
    /// Presentation Skills (1-5)
    #[arg(long)]
    pub presentation_level: Option<u8>,
}

impl From<FieldArgs> for FormInput {
    fn from(args: FieldArgs) -> Self {
        FormInput {
            first_name: args.first_name,
            last_name: args.last_name,
            programming: args.programming,
            data_analysis: args.data_analysis,
            ml_projects: args.ml_projects,
            ml_problem: args.ml_problem,
            nlp: args.nlp,
            data_pipeline: args.data_pipeline,
            sharing_results: args.sharing_results,
            reflection: args.reflection,
            git_level: args.git_level,
            presentation_level: args.presentation_level,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

pub fn parse_storage_backend(backend: &str) -> Result<StorageBackend, String> {
    match backend.to_lowercase().as_str() {
        "local" => Ok(StorageBackend::Local),
        "remote" | "github" => Ok(StorageBackend::Remote),
        _ => Err(format!("Invalid storage backend: {}. Supported: local, remote", backend)),
    }
}

pub fn parse_artifact_source(source: &str) -> Result<ArtifactSourceKind, String> {
    match source.to_lowercase().as_str() {
        "local" => Ok(ArtifactSourceKind::Local),
        "remote" | "github" => Ok(ArtifactSourceKind::Remote),
        _ => Err(format!("Invalid artifact source: {}. Supported: local, remote", source)),
    }
}
