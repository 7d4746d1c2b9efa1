//! strip-check - Length feedback for structure strip exercises
//!
//! Loads an exercise definition and the learner's texts, evaluates every
//! section against the weighted length band and prints the feedback the
//! configured mode would show.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use strip_common::config::{
    resolve_exercise_path, Answers, ExerciseConfig, FeedbackMode, EXERCISE_ENV_VAR,
};
use strip_cli::{
    build_identification, render_json, render_text, run_check, DEFAULT_LOG_FILTER,
};
use tracing::info;

/// Command-line arguments for strip-check
#[derive(Parser, Debug)]
#[command(name = "strip-check")]
#[command(about = "Check section lengths of a structure strip exercise")]
#[command(version)]
struct Args {
    /// Exercise definition (TOML); falls back to $STRIP_EXERCISE, the user
    /// config directory, then ./exercise.toml
    #[arg(short, long)]
    exercise: Option<PathBuf>,

    /// Learner texts (TOML with `texts = [...]`, one per section)
    #[arg(short, long)]
    answers: Option<PathBuf>,

    /// Override the configured feedback mode
    /// (continuously, on_request, while_typing, none)
    #[arg(short, long)]
    mode: Option<FeedbackMode>,

    /// Only show the status of this section (continuous modes)
    #[arg(long)]
    focus: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for feedback/JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    info!("Starting {}", build_identification());

    let args = Args::parse();

    let exercise_path = resolve_exercise_path(args.exercise.as_deref(), EXERCISE_ENV_VAR);
    let config = ExerciseConfig::load(&exercise_path)
        .with_context(|| format!("Failed to load exercise {}", exercise_path.display()))?;

    let mut set = config
        .segment_set()
        .context("Invalid exercise sections")?;

    if let Some(path) = &args.answers {
        Answers::load(path)
            .and_then(|answers| answers.apply(&mut set))
            .with_context(|| format!("Failed to apply answers from {}", path.display()))?;
        info!("Applied answers from {}", path.display());
    }

    let mode = args.mode.unwrap_or(config.behaviour.feedback_mode);
    info!("Evaluating {} sections ({} feedback)", set.len(), mode);

    let output = run_check(&config, &set, mode, args.focus).context("Evaluation failed")?;

    if args.json {
        println!("{}", render_json(&output).context("Failed to serialize output")?);
    } else {
        println!("{}", render_text(&output));
    }

    Ok(())
}
