//! SPR Experiment - Entry Point
//!
//! Loads stimuli, builds the participant's trial sequence, runs it in the
//! terminal and saves the results.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use spr_experiment::core::error::{Result, SprError};
use spr_experiment::core::{parse_start_time, ExperimentConfig, SessionContext, SessionSeed};
use spr_experiment::loader::StimulusLoader;
use spr_experiment::results::{self, SessionResult, SubmitOutcome, Submitter};
use spr_experiment::runner::{ExperimentRunner, ScriptedPresenter, TerminalPresenter};
use spr_experiment::schedule::{TrialPlan, TrialSequenceBuilder};

/// Self-paced reading experiment
#[derive(Parser, Debug)]
#[command(name = "spr-experiment")]
#[command(about = "Run self-paced reading experiments with reproducible trial order")]
struct Cli {
    /// Experiment config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the full trial sequence for a participant as JSON
    Plan {
        #[arg(long)]
        participant: String,

        /// Stimulus file, relative to the configured stimuli directory
        #[arg(long)]
        stimuli: Option<String>,

        /// ISO-8601 start time (defaults to now)
        #[arg(long)]
        start_time: Option<String>,

        /// Use this seed instead of deriving one
        #[arg(long)]
        seed: Option<u32>,
    },

    /// Print the seed for a participant id and start time
    Seed {
        #[arg(long)]
        participant: String,

        /// RFC 3339 start time, any offset or precision
        #[arg(long)]
        start_time: String,
    },

    /// Run the experiment in this terminal
    Run {
        #[arg(long)]
        participant: String,

        #[arg(long)]
        stimuli: Option<String>,

        #[arg(long)]
        seed: Option<u32>,

        /// Skip the terminal and read every word in this many milliseconds
        #[arg(long)]
        headless: Option<f64>,
    },

    /// Resubmit a saved .jsonl result file
    Submit {
        file: PathBuf,

        /// Overrides the configured save endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// List the configured stimulus files
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal presenter owns the screen during a run
    let level = match &cli.command {
        Command::Run { headless: None, .. } => tracing::Level::WARN,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    config.validate().map_err(SprError::InvalidConfig)?;

    let rt = Runtime::new()?;

    match cli.command {
        Command::Plan {
            participant,
            stimuli,
            start_time,
            seed,
        } => {
            let start = match start_time {
                Some(raw) => parse_start_time(&raw)?,
                None => Utc::now(),
            };
            let session = open_session(&config, &participant, stimuli, start, seed)?;
            let plan = rt.block_on(build_plan(&config, &session))?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Seed {
            participant,
            start_time,
        } => {
            println!("{}", SessionSeed::for_start(&participant, parse_start_time(&start_time)?));
        }
        Command::Run {
            participant,
            stimuli,
            seed,
            headless,
        } => {
            let mut session = open_session(&config, &participant, stimuli, Utc::now(), seed)?;
            let plan = rt.block_on(build_plan(&config, &session))?;

            let records = match headless {
                Some(word_ms) => ExperimentRunner::new(ScriptedPresenter::new(word_ms)).run_plan(&plan)?,
                None => {
                    let presenter = TerminalPresenter::new(config.keys.clone())?;
                    ExperimentRunner::new(presenter).run_plan(&plan)?
                }
            };

            session.finish(Utc::now());
            let result = SessionResult::new(&session, records)?;
            println!("{}", result.summary());
            save_result(&rt, &config, &result)?;
        }
        Command::Submit { file, endpoint } => {
            let endpoint = endpoint
                .or_else(|| config.save_endpoint.clone())
                .ok_or_else(|| SprError::InvalidConfig("no save endpoint configured".into()))?;
            let submitter = Submitter::new(endpoint, Duration::from_secs(config.request_timeout_secs))?;

            for result in results::read_jsonl(&file)? {
                let outcome = rt.block_on(submitter.try_submit(&result));
                report_outcome(&result.user_id, &outcome);
            }
        }
        Command::List => {
            if config.available_stimuli.is_empty() {
                println!("No stimulus files configured");
            }
            for entry in &config.available_stimuli {
                println!("{:<24} {}", entry.filename, entry.name);
            }
        }
    }

    Ok(())
}

fn open_session(
    config: &ExperimentConfig,
    participant: &str,
    stimuli: Option<String>,
    start: DateTime<Utc>,
    seed: Option<u32>,
) -> Result<SessionContext> {
    let stimuli = stimuli
        .or_else(|| config.available_stimuli.first().map(|e| e.filename.clone()))
        .ok_or_else(|| SprError::InvalidSession("no stimuli file selected or configured".into()))?;
    if !config.available_stimuli.is_empty() && config.stimulus_entry(&stimuli).is_none() {
        tracing::warn!("{} is not among the configured stimulus files", stimuli);
    }

    let session = SessionContext::begin(participant, &stimuli, start)?;
    Ok(match seed {
        Some(seed) => session.with_seed(SessionSeed(seed)),
        None => session,
    })
}

async fn build_plan(config: &ExperimentConfig, session: &SessionContext) -> Result<TrialPlan> {
    let loader = StimulusLoader::from_config(config)?;
    let (bundle, report) = loader.load_bundle(&session.stimuli_file).await;
    for failure in &report.failures {
        eprintln!("Warning: {} could not be loaded ({}), using fallback", failure.source, failure.reason);
    }

    let builder = TrialSequenceBuilder::from_config(config);
    Ok(builder.build_plan(&bundle.main, &bundle.fillers, &bundle.practice, session.seed))
}

fn save_result(rt: &Runtime, config: &ExperimentConfig, result: &SessionResult) -> Result<()> {
    let report = rt.block_on(results::save_session(config, result, Utc::now()));

    if let Some(paths) = &report.files {
        println!("Saved {} and {}", paths.csv.display(), paths.jsonl.display());
    }
    if let Some(outcome) = &report.outcome {
        report_outcome(&result.user_id, outcome);
    }
    match report.file_error {
        Some(reason) if !report.is_saved() => Err(SprError::InvalidSession(format!(
            "results for {} were not saved: {}",
            result.user_id, reason
        ))),
        _ => Ok(()),
    }
}

fn report_outcome(user_id: &str, outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Saved { status } => println!("Data saved for {} (status {})", user_id, status),
        SubmitOutcome::Failed { reason } => {
            println!("Save failed for {}: {}", user_id, reason);
            println!("Retry with: spr-experiment submit <file.jsonl>");
        }
    }
}
