//! Competency survey: skills questionnaire collection and coverage dashboard

use clap::Parser;
use competency_survey::cli::{self, Cli, Commands, ConfigAction, FieldArgs};
use competency_survey::config::{ArtifactSourceKind, Config, OutputFormat, StorageBackend};
use competency_survey::dashboard::{DashboardOptions, DashboardReport};
use competency_survey::embeddings::ModelCache;
use competency_survey::error::{Result, SurveyError};
use competency_survey::form::{prompt, FormInput, FormState, TextField};
use competency_survey::ledger::{LedgerBackend, ResponseStore};
use competency_survey::output::{
    resolve_save_path, save_report_to_file, ReportGenerator, ResponseListing,
};
use competency_survey::results::{
    load_artifacts, ArtifactPaths, ArtifactSource, LoadedArtifacts, LocalArtifactSource,
    RemoteArtifactSource,
};
use log::{error, info};
use std::path::PathBuf;
use std::process;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_file: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Submit {
            answers,
            fields,
            interactive,
            store,
        } => submit(&config, answers, fields, interactive, store).await,

        Commands::Responses {
            limit,
            store,
            detailed,
            output,
        } => {
            let format = output_format(output.as_deref(), &config)?;
            let backend = LedgerBackend::from_config(&config, storage_backend(store.as_deref())?)?;
            let ledger = backend.load().await.map_err(generic_transport_failure)?;

            let listing = ResponseListing::from_ledger(&ledger, backend.location(), limit);
            let generator = ReportGenerator::from_config(&config.output, detailed);
            println!("{}", generator.responses(&listing, format)?);
            Ok(())
        }

        Commands::Dashboard {
            source,
            root,
            top,
            block,
            detailed,
            output,
            save,
        } => {
            let format = output_format(output.as_deref(), &config)?;
            let kind = match source.as_deref() {
                Some(s) => cli::parse_artifact_source(s).map_err(SurveyError::InvalidInput)?,
                None => config.artifacts.source,
            };
            let paths = ArtifactPaths::from(&config.artifacts);

            let (artifacts, described) = match kind {
                ArtifactSourceKind::Local => {
                    let root = root.unwrap_or_else(|| config.artifacts.local_root.clone());
                    load_with(&LocalArtifactSource::new(root), &paths).await?
                }
                ArtifactSourceKind::Remote => {
                    let source = RemoteArtifactSource::new(
                        config.artifacts.raw_base_url.clone(),
                        config.storage.github.timeout_secs,
                    )?;
                    load_with(&source, &paths).await?
                }
            };

            let mut options = DashboardOptions::from(&config.dashboard);
            options.top_n = top;
            options.block = block;

            let report = DashboardReport::build(&artifacts, &options, &described);
            let generator = ReportGenerator::from_config(&config.output, detailed);
            let rendered = generator.dashboard(&report, format)?;

            match save {
                Some(target) => {
                    let path = resolve_save_path(&target, format, "dashboard");
                    save_report_to_file(&rendered, &path)?;
                    println!("📄 Dashboard saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
            Ok(())
        }

        Commands::Embed {
            model,
            from_ledger,
            texts,
            save,
        } => {
            let mut texts = texts;
            if from_ledger {
                let backend = LedgerBackend::from_config(&config, None)?;
                let ledger = backend.load().await.map_err(generic_transport_failure)?;
                texts.extend(ledger.records().iter().flat_map(|record| {
                    record
                        .answers()
                        .into_iter()
                        .map(|(_, answer)| answer.trim().to_string())
                        .filter(|answer| !answer.is_empty())
                }));
            }
            if texts.is_empty() {
                return Err(SurveyError::InvalidInput(
                    "Nothing to embed: pass texts or --from-ledger".to_string(),
                ));
            }

            info!("Embedding {} texts", texts.len());
            let mut cache = ModelCache::new(config.embeddings.default_model.clone());
            let batch = cache.embed_texts(&texts, model.as_deref())?;

            let rendered = if config.output.pretty_json {
                serde_json::to_string_pretty(&batch)?
            } else {
                serde_json::to_string(&batch)?
            };
            match save {
                Some(target) => {
                    let path = resolve_save_path(&target, OutputFormat::Json, "embeddings");
                    save_report_to_file(&rendered, &path)?;
                    println!(
                        "🧠 {} embeddings ({} dimensions) saved to {}",
                        batch.embeddings.len(),
                        batch.dimension,
                        path.display()
                    );
                }
                None => println!("{}", rendered),
            }
            Ok(())
        }

        Commands::Config { action } => {
            let path = config_file.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration ({})\n", path.display());
                    let text = toml::to_string_pretty(&config).map_err(|e| {
                        SurveyError::Configuration(format!("Failed to serialize config: {}", e))
                    })?;
                    println!("{}", text);
                }

                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    Config::default().save_to(&path)?;
                    println!("✅ Configuration reset successfully!");
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
            Ok(())
        }
    }
}

async fn submit(
    config: &Config,
    answers: Option<PathBuf>,
    fields: FieldArgs,
    interactive: bool,
    store: Option<String>,
) -> Result<()> {
    let from_file = match &answers {
        Some(path) => FormInput::from_file(path)?,
        None => FormInput::default(),
    };
    let input = from_file.merge(FormInput::from(fields));

    let mut form = FormState::new();
    form.apply(&input)?;

    if interactive {
        println!("📝 Skills questionnaire\n");
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        prompt::fill_interactively(&mut form, &mut stdin.lock(), &mut stdout.lock())?;
    }

    let backend = LedgerBackend::from_config(config, storage_backend(store.as_deref())?)?;
    println!("💾 Saving response to {}", backend.location());

    match form.submit(&backend).await {
        Ok(outcome) => {
            println!("✅ Thank you {}! Your answers were recorded.", outcome.record.first_name);
            println!(
                "   Ledger now holds {} responses ({})",
                outcome.receipt.records, outcome.receipt.location
            );
            if outcome.receipt.attempts > 1 {
                info!("Write succeeded after {} attempts", outcome.receipt.attempts);
            }
            Ok(())
        }
        Err(SurveyError::Validation { missing }) => {
            println!("⚠️  Please fill in all required fields:");
            for label in &missing {
                println!("  • {}", label);
            }
            Err(SurveyError::Validation { missing })
        }
        Err(e) => {
            println!(
                "❌ Your answers for {} {} were not saved.",
                form.text(TextField::FirstName),
                form.text(TextField::LastName)
            );
            Err(generic_transport_failure(e))
        }
    }
}

async fn load_with<S: ArtifactSource + Sync>(
    source: &S,
    paths: &ArtifactPaths,
) -> Result<(LoadedArtifacts, String)> {
    let artifacts = load_artifacts(source, paths).await?;
    Ok((artifacts, source.describe()))
}

fn output_format(flag: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(f) => cli::parse_output_format(f).map_err(SurveyError::InvalidInput),
        None => Ok(config.output.format),
    }
}

fn storage_backend(flag: Option<&str>) -> Result<Option<StorageBackend>> {
    flag.map(|s| cli::parse_storage_backend(s).map_err(SurveyError::InvalidInput))
        .transpose()
}

/// Network failures get a generic message on stdout; the detail goes to the log.
fn generic_transport_failure(err: SurveyError) -> SurveyError {
    if let SurveyError::Transport(_) = &err {
        println!("❌ Could not reach the storage service, please try again later.");
    }
    err
}
