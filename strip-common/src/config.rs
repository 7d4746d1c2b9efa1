//! Exercise configuration loading and path resolution
//!
//! An exercise is described by one TOML document:
//!
//! ```toml
//! [behaviour]
//! slack = 10
//! text_length_min = 200
//! text_length_max = 2000
//! feedback_mode = "on_request"
//!
//! [l10n]
//! all_good = "All sections have a good length."
//! too_long = "@title is too long: remove about @chars characters."
//! too_short = "@title is too short: add about @chars characters."
//!
//! [[sections]]
//! title = "Introduction"
//! weight = 1
//! ```
//!
//! Missing `[behaviour]` and `[l10n]` tables fall back to built-in
//! defaults; at least one section is required.

use crate::feedback::{EvaluationOptions, FeedbackTemplates, LengthBounds, RoundingMode};
use crate::segments::{Segment, SegmentSet};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the exercise file
pub const EXERCISE_ENV_VAR: &str = "STRIP_EXERCISE";

/// File name used for the per-user and working-directory fallbacks
pub const EXERCISE_FILE_NAME: &str = "exercise.toml";

const DEFAULT_SLACK_PERCENT: f64 = 10.0;
const DEFAULT_ALL_GOOD: &str = "All sections have a good length.";
const DEFAULT_ALRIGHT: &str = "@title has a good length.";
const DEFAULT_TOO_LONG: &str = "@title is too long: remove about @chars characters.";
const DEFAULT_TOO_SHORT: &str = "@title is too short: add about @chars characters.";

/// When the learner sees length feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackMode {
    /// Status for every segment, refreshed on each change
    Continuously,
    /// Aggregated report when the learner asks for it
    #[default]
    #[serde(alias = "onRequest")]
    OnRequest,
    /// Continuous status, shown only for the segment being edited
    #[serde(alias = "whileTyping")]
    WhileTyping,
    /// No length feedback
    None,
}

impl FeedbackMode {
    /// Evaluator options for this mode, `None` when feedback is disabled
    ///
    /// Both evaluating styles receive the configured length bounds.
    pub fn evaluation_options(
        &self,
        behaviour: &Behaviour,
        l10n: &L10n,
    ) -> Option<EvaluationOptions> {
        let rounding = match self {
            FeedbackMode::Continuously | FeedbackMode::WhileTyping => RoundingMode::Nearest,
            FeedbackMode::OnRequest => RoundingMode::CeilFloor,
            FeedbackMode::None => return None,
        };

        let alright = match self {
            FeedbackMode::OnRequest => l10n.alright.clone(),
            _ => Some(
                l10n.alright
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ALRIGHT.to_string()),
            ),
        };

        Some(EvaluationOptions {
            slack_percent: behaviour.slack,
            templates: FeedbackTemplates {
                alright,
                too_long: l10n.too_long.clone(),
                too_short: l10n.too_short.clone(),
            },
            rounding,
            length_bounds: behaviour.length_bounds(),
        })
    }

    /// True for the modes that show a status per segment
    pub fn is_continuous(&self) -> bool {
        matches!(self, FeedbackMode::Continuously | FeedbackMode::WhileTyping)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackMode::Continuously => "continuously",
            FeedbackMode::OnRequest => "on_request",
            FeedbackMode::WhileTyping => "while_typing",
            FeedbackMode::None => "none",
        }
    }
}

impl std::str::FromStr for FeedbackMode {
    type Err = Error;

    /// Accepts snake_case, camelCase and kebab-case spellings
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "continuously" | "continuous" => Ok(FeedbackMode::Continuously),
            "onrequest" => Ok(FeedbackMode::OnRequest),
            "whiletyping" => Ok(FeedbackMode::WhileTyping),
            "none" | "off" => Ok(FeedbackMode::None),
            _ => Err(Error::Config(format!("unknown feedback mode '{}'", s))),
        }
    }
}

impl std::fmt::Display for FeedbackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Global exercise behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Behaviour {
    /// Tolerance in percent around the target length
    #[serde(default = "default_slack")]
    pub slack: f64,

    /// Minimum length of the whole text, in characters
    #[serde(default)]
    pub text_length_min: Option<u32>,

    /// Maximum length of the whole text, in characters
    #[serde(default)]
    pub text_length_max: Option<u32>,

    #[serde(default)]
    pub feedback_mode: FeedbackMode,
}

impl Behaviour {
    pub fn length_bounds(&self) -> LengthBounds {
        LengthBounds::new(self.text_length_min, self.text_length_max)
    }
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            slack: DEFAULT_SLACK_PERCENT,
            text_length_min: None,
            text_length_max: None,
            feedback_mode: FeedbackMode::default(),
        }
    }
}

fn default_slack() -> f64 {
    DEFAULT_SLACK_PERCENT
}

/// Localized feedback texts (already translated by the host)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct L10n {
    #[serde(default = "default_all_good")]
    pub all_good: String,

    #[serde(default)]
    pub alright: Option<String>,

    #[serde(default = "default_too_long")]
    pub too_long: String,

    #[serde(default = "default_too_short")]
    pub too_short: String,
}

impl Default for L10n {
    fn default() -> Self {
        Self {
            all_good: default_all_good(),
            alright: None,
            too_long: default_too_long(),
            too_short: default_too_short(),
        }
    }
}

fn default_all_good() -> String {
    DEFAULT_ALL_GOOD.to_string()
}

fn default_too_long() -> String {
    DEFAULT_TOO_LONG.to_string()
}

fn default_too_short() -> String {
    DEFAULT_TOO_SHORT.to_string()
}

/// One section as configured by the exercise author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_weight")]
    pub weight: u32,

    #[serde(default)]
    pub color_background: Option<String>,

    #[serde(default)]
    pub color_text: Option<String>,

    /// Text the section is prefilled with
    #[serde(default)]
    pub previous_text: Option<String>,
}

fn default_weight() -> u32 {
    1
}

/// Complete exercise description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseConfig {
    #[serde(default)]
    pub behaviour: Behaviour,

    #[serde(default)]
    pub l10n: L10n,

    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

impl ExerciseConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ExerciseConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate an exercise file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(
            "Loaded exercise from {} ({} sections, mode {})",
            path.display(),
            config.sections.len(),
            config.behaviour.feedback_mode
        );
        Ok(config)
    }

    /// Reject configurations the evaluator can't work with
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(Error::Config("exercise has no sections".to_string()));
        }
        if let Some(section) = self.sections.iter().find(|s| s.weight == 0) {
            return Err(Error::Config(format!(
                "section '{}' has weight 0; weights must be positive",
                section.title
            )));
        }

        let slack = self.behaviour.slack;
        if !slack.is_finite() || slack < 0.0 {
            return Err(Error::Config(format!(
                "slack must be a non-negative percentage, got {}",
                slack
            )));
        }

        let bounds = self.behaviour.length_bounds();
        if bounds.max == Some(0) {
            return Err(Error::Config(
                "text_length_max must be positive; omit it for no maximum".to_string(),
            ));
        }
        if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
            if min > max {
                return Err(Error::Config(format!(
                    "text_length_min ({}) exceeds text_length_max ({})",
                    min, max
                )));
            }
        }

        Ok(())
    }

    /// Build the segment set, seeded with each section's previous text
    pub fn segment_set(&self) -> Result<SegmentSet> {
        let segments = self
            .sections
            .iter()
            .enumerate()
            .map(|(id, section)| Segment {
                id,
                title: section.title.clone(),
                weight: section.weight,
                text: section.previous_text.clone().unwrap_or_default(),
                description: section.description.clone(),
                color_background: section.color_background.clone(),
                color_text: section.color_text.clone(),
                previous_text: section.previous_text.clone(),
            })
            .collect();
        SegmentSet::new(segments)
    }

    /// Evaluator options for the configured feedback mode
    pub fn evaluation_options(&self) -> Option<EvaluationOptions> {
        self.evaluation_options_for(self.behaviour.feedback_mode)
    }

    /// Evaluator options for an explicit mode (host override)
    pub fn evaluation_options_for(&self, mode: FeedbackMode) -> Option<EvaluationOptions> {
        mode.evaluation_options(&self.behaviour, &self.l10n)
    }
}

/// Learner texts supplied by the host, one per section in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answers {
    #[serde(default)]
    pub texts: Vec<String>,
}

impl Answers {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Copy texts into the set; segments without an answer keep their text
    pub fn apply(&self, set: &mut SegmentSet) -> Result<()> {
        if self.texts.len() > set.len() {
            return Err(Error::Config(format!(
                "{} answers given for {} sections",
                self.texts.len(),
                set.len()
            )));
        }
        let ids: Vec<usize> = set.segments().iter().map(|s| s.id).collect();
        for (id, text) in ids.into_iter().zip(&self.texts) {
            set.set_text(id, text.clone())?;
        }
        Ok(())
    }
}

/// Exercise file resolution, in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Per-user config directory (`<config_dir>/structure-strip/exercise.toml`)
/// 4. `exercise.toml` in the working directory (fallback)
pub fn resolve_exercise_path(cli_arg: Option<&Path>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
        warn!("{} is set but empty, ignoring", env_var_name);
    }

    // Priority 3: Per-user config directory
    if let Some(path) = user_exercise_path() {
        if path.exists() {
            return path;
        }
    }

    // Priority 4: Working directory
    PathBuf::from(EXERCISE_FILE_NAME)
}

/// Per-user exercise file location, if the platform has a config directory
pub fn user_exercise_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("structure-strip").join(EXERCISE_FILE_NAME))
}
