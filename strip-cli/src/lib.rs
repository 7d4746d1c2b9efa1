//! # strip-check library
//!
//! Host side of the structure strip exercise for the terminal: evaluates a
//! loaded exercise in the selected feedback mode and renders the result as
//! plain text or JSON.

use serde::Serialize;
use strip_common::config::{ExerciseConfig, FeedbackMode};
use strip_common::feedback::{evaluate, Verdict};
use strip_common::report::{status_lines, Report, StatusLine};
use strip_common::segments::SegmentSet;
use strip_common::{Error, Result};
use tracing::{debug, warn};

/// Log filter used when `RUST_LOG` is unset
///
/// Covers the binary, this library and the engine crate.
pub const DEFAULT_LOG_FILTER: &str = "strip_check=info,strip_cli=info,strip_common=warn";

/// Shown when the exercise disables length feedback
pub const FEEDBACK_DISABLED: &str = "Length feedback is disabled for this exercise.";

/// Everything one check produced, in the shape the selected mode presents it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutput {
    pub mode: FeedbackMode,
    pub answer_given: bool,
    pub verdicts: Vec<Verdict>,
    /// Set for on-request feedback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    /// Set for continuous and while-typing feedback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<StatusLine>>,
}

/// Version and build information captured by `build.rs`
pub fn build_identification() -> String {
    format!(
        "strip-check v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}

/// Evaluate the current texts in `mode`
///
/// `focus` restricts continuous statuses to one segment, the way the
/// while-typing presentation only shows the section being edited.
pub fn run_check(
    config: &ExerciseConfig,
    set: &SegmentSet,
    mode: FeedbackMode,
    focus: Option<usize>,
) -> Result<CheckOutput> {
    let Some(options) = config.evaluation_options_for(mode) else {
        debug!("Feedback mode is none, skipping evaluation");
        return Ok(CheckOutput {
            mode,
            answer_given: set.answer_given(),
            verdicts: Vec::new(),
            report: None,
            statuses: None,
        });
    };

    let verdicts = evaluate(set, &options)?;

    let (report, statuses) = if mode.is_continuous() {
        let mut lines = status_lines(&verdicts);
        if let Some(id) = focus {
            if set.get(id).is_none() {
                return Err(Error::NotFound(format!("segment {}", id)));
            }
            lines.retain(|line| line.segment_id == id);
        }
        (None, Some(lines))
    } else {
        if focus.is_some() {
            warn!("--focus only applies to continuous feedback, ignoring");
        }
        (Some(Report::assemble(&verdicts, &config.l10n.all_good)), None)
    };

    Ok(CheckOutput {
        mode,
        answer_given: set.answer_given(),
        verdicts,
        report,
        statuses,
    })
}

/// Plain-text rendering for the terminal
pub fn render_text(output: &CheckOutput) -> String {
    if let Some(report) = &output.report {
        return report.render_text();
    }

    match &output.statuses {
        Some(lines) => lines
            .iter()
            .map(|line| {
                if line.text.is_empty() {
                    format!("{}:", line.title)
                } else {
                    format!("{}: {}", line.title, line.text)
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        None => FEEDBACK_DISABLED.to_string(),
    }
}

/// Pretty-printed JSON rendering
pub fn render_json(output: &CheckOutput) -> serde_json::Result<String> {
    serde_json::to_string_pretty(output)
}
