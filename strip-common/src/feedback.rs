//! Length feedback evaluator
//!
//! Classifies every segment's text length against a band derived from the
//! reference segment:
//!
//! 1. `reference_length = max(len(reference), reference.weight / weight_gcd)`
//! 2. Optional clamping of `reference_length` into
//!    `[min * reference_share, max * reference_share]`; a clamped band
//!    carries no slack
//! 3. `normalized_reference = reference_length / reference.weight`
//! 4. `band = normalized_reference * (1 ± slack / 100)`
//! 5. Each segment's `len / weight` is compared with the band and the
//!    distance is converted back into a character gap
//!
//! Continuous and on-request feedback share this evaluator and differ only
//! in their [`EvaluationOptions`].

use crate::segments::{Segment, SegmentSet};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Placeholder replaced with the segment title
pub const TITLE_PLACEHOLDER: &str = "@title";
/// Placeholder replaced with the computed character gap
pub const CHARS_PLACEHOLDER: &str = "@chars";

/// How fractional character gaps become whole characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Nearest integer in both directions (continuous feedback)
    #[default]
    Nearest,
    /// Floor for too-long gaps, ceil for too-short gaps (on-request feedback)
    ///
    /// Never asks the learner to add fewer characters than needed or to
    /// remove more than needed.
    CeilFloor,
}

impl RoundingMode {
    fn too_long_gap(&self, excess: f64) -> u64 {
        let gap = match self {
            RoundingMode::Nearest => excess.round(),
            RoundingMode::CeilFloor => excess.floor(),
        };
        gap.max(0.0) as u64
    }

    fn too_short_gap(&self, shortfall: f64) -> u64 {
        let gap = match self {
            RoundingMode::Nearest => shortfall.round(),
            RoundingMode::CeilFloor => shortfall.ceil(),
        };
        gap.max(0.0) as u64
    }
}

/// Localized message templates containing `@title` / `@chars` tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackTemplates {
    /// Message for segments inside the band; `None` drops them from reports
    pub alright: Option<String>,
    pub too_long: String,
    pub too_short: String,
}

/// Absolute text length bounds for the whole exercise
///
/// Scaled by the reference share, they keep the band anchored when the
/// reference text is far outside the configured range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl LengthBounds {
    pub fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// No clamping at all
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Everything the evaluator needs besides the segments themselves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOptions {
    /// Tolerance around the normalized reference, in percent
    pub slack_percent: f64,
    pub templates: FeedbackTemplates,
    pub rounding: RoundingMode,
    #[serde(default)]
    pub length_bounds: LengthBounds,
}

impl EvaluationOptions {
    /// Options for feedback refreshed on every change
    pub fn continuous(
        slack_percent: f64,
        alright: impl Into<String>,
        too_long: impl Into<String>,
        too_short: impl Into<String>,
    ) -> Self {
        Self {
            slack_percent,
            templates: FeedbackTemplates {
                alright: Some(alright.into()),
                too_long: too_long.into(),
                too_short: too_short.into(),
            },
            rounding: RoundingMode::Nearest,
            length_bounds: LengthBounds::unbounded(),
        }
    }

    /// Options for feedback the learner asks for explicitly
    pub fn on_request(
        slack_percent: f64,
        alright: Option<String>,
        too_long: impl Into<String>,
        too_short: impl Into<String>,
    ) -> Self {
        Self {
            slack_percent,
            templates: FeedbackTemplates {
                alright,
                too_long: too_long.into(),
                too_short: too_short.into(),
            },
            rounding: RoundingMode::CeilFloor,
            length_bounds: LengthBounds::unbounded(),
        }
    }

    pub fn with_length_bounds(mut self, bounds: LengthBounds) -> Self {
        self.length_bounds = bounds;
        self
    }
}

/// Acceptable normalized-length interval for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeedbackBand {
    pub min: f64,
    pub max: f64,
}

impl FeedbackBand {
    /// Derive the band from the reference segment's current text.
    ///
    /// # Errors
    /// [`Error::InvalidWeight`] if the weight gcd is 0.
    pub fn compute(set: &SegmentSet, options: &EvaluationOptions) -> Result<Self> {
        let weight_gcd = set.weight_gcd();
        if weight_gcd == 0 {
            return Err(Error::InvalidWeight("weight gcd is 0".to_string()));
        }

        let reference = set.reference_segment();
        let reference_weight = reference.weight as f64;
        let share = set.reference_share();

        let mut slack = options.slack_percent;
        if !slack.is_finite() || slack < 0.0 {
            warn!("Slack {} is not a non-negative number, using 0", slack);
            slack = 0.0;
        }

        // One weight unit is the smallest reference length worth measuring
        let mut reference_length =
            (reference.text_length() as f64).max(reference_weight / weight_gcd as f64);

        if let Some(min) = options.length_bounds.min {
            let floor = min as f64 * share;
            if reference_length < floor {
                reference_length = floor;
                slack = 0.0;
            }
        }
        if let Some(max) = options.length_bounds.max {
            let ceiling = max as f64 * share;
            if reference_length > ceiling {
                reference_length = ceiling;
                slack = 0.0;
            }
        }

        let normalized_reference = reference_length / reference_weight;
        let band = Self {
            min: normalized_reference * (1.0 - slack / 100.0),
            max: normalized_reference * (1.0 + slack / 100.0),
        };

        debug!(
            reference = reference.id,
            reference_length,
            slack,
            band_min = band.min,
            band_max = band.max,
            "Computed feedback band"
        );

        Ok(band)
    }

    /// Classify one segment against the band
    pub fn classify(&self, segment: &Segment, rounding: RoundingMode) -> VerdictKind {
        let normalized = segment.normalized_length();
        let weight = segment.weight as f64;

        if normalized > self.max {
            let gap = rounding.too_long_gap((normalized - self.max) * weight);
            if gap == 0 {
                VerdictKind::Suppressed
            } else {
                VerdictKind::TooLong { gap }
            }
        } else if normalized < self.min {
            VerdictKind::TooShort {
                gap: rounding.too_short_gap((self.min - normalized) * weight),
            }
        } else {
            VerdictKind::Alright
        }
    }
}

/// Classification of one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerdictKind {
    /// Text should grow by `gap` characters
    TooShort { gap: u64 },
    /// Text should shrink by `gap` characters
    TooLong { gap: u64 },
    Alright,
    /// Overage rounded to zero characters; no feedback at all
    Suppressed,
}

/// Verdict and rendered message for one segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub segment_id: usize,
    pub title: String,
    #[serde(flatten)]
    pub kind: VerdictKind,
    /// `None` for suppressed verdicts and alright verdicts without a template
    pub message: Option<String>,
}

impl Verdict {
    /// Gap in characters, 0 for alright/suppressed
    pub fn gap(&self) -> u64 {
        match self.kind {
            VerdictKind::TooShort { gap } | VerdictKind::TooLong { gap } => gap,
            VerdictKind::Alright | VerdictKind::Suppressed => 0,
        }
    }
}

/// Evaluate every segment, in segment order.
///
/// Pure function of the set and options; safe to call on every keystroke.
///
/// # Errors
/// [`Error::InvalidWeight`] if the weight gcd is 0.
pub fn evaluate(set: &SegmentSet, options: &EvaluationOptions) -> Result<Vec<Verdict>> {
    let band = FeedbackBand::compute(set, options)?;
    let templates = &options.templates;

    let verdicts = set
        .segments()
        .iter()
        .map(|segment| {
            let kind = band.classify(segment, options.rounding);
            trace!(segment = segment.id, ?kind, "Classified segment");

            let message = match kind {
                VerdictKind::TooShort { gap } => {
                    Some(fill_template(&templates.too_short, &segment.title, gap))
                }
                VerdictKind::TooLong { gap } => {
                    Some(fill_template(&templates.too_long, &segment.title, gap))
                }
                VerdictKind::Alright => templates
                    .alright
                    .as_deref()
                    .map(|t| fill_template(t, &segment.title, 0)),
                VerdictKind::Suppressed => None,
            };

            Verdict {
                segment_id: segment.id,
                title: segment.title.clone(),
                kind,
                message,
            }
        })
        .collect();

    Ok(verdicts)
}

/// Replace every `@title` and `@chars` token in a single pass.
///
/// Substituted text is never rescanned, so a title containing `@chars`
/// stays intact.
///
/// # Examples
/// ```
/// use strip_common::feedback::fill_template;
///
/// let text = fill_template("@title: remove @chars (@chars!)", "Body", 12);
/// assert_eq!(text, "Body: remove 12 (12!)");
/// ```
pub fn fill_template(template: &str, title: &str, chars: u64) -> String {
    let mut out = String::with_capacity(template.len() + title.len());
    let mut rest = template;

    while let Some(pos) = rest.find('@') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix(TITLE_PLACEHOLDER) {
            out.push_str(title);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(CHARS_PLACEHOLDER) {
            out.push_str(&chars.to_string());
            rest = after;
        } else {
            out.push('@');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: usize, weight: u32, text: &str) -> Segment {
        Segment::new(id, format!("S{}", id), weight).with_text(text)
    }

    fn continuous(slack: f64) -> EvaluationOptions {
        EvaluationOptions::continuous(slack, "@title ok", "@title -@chars", "@title +@chars")
    }

    #[test]
    fn test_fill_template_replaces_all_occurrences() {
        let text = fill_template("@title @title @chars @chars", "Intro", 3);
        assert_eq!(text, "Intro Intro 3 3");
    }

    #[test]
    fn test_fill_template_keeps_unknown_tokens() {
        assert_eq!(fill_template("mail@host @count", "T", 1), "mail@host @count");
        assert_eq!(fill_template("trailing @", "T", 1), "trailing @");
    }

    #[test]
    fn test_fill_template_does_not_rescan_title() {
        assert_eq!(fill_template("@title has @chars", "@chars", 4), "@chars has 4");
    }

    #[test]
    fn test_rounding_modes() {
        assert_eq!(RoundingMode::Nearest.too_long_gap(2.5), 3);
        assert_eq!(RoundingMode::Nearest.too_short_gap(2.4), 2);
        assert_eq!(RoundingMode::CeilFloor.too_long_gap(2.9), 2);
        assert_eq!(RoundingMode::CeilFloor.too_short_gap(2.1), 3);
    }

    #[test]
    fn test_band_floor_for_empty_reference() {
        // weight 3 / gcd 1 gives a reference length of 3, normalized 1.0
        let set = SegmentSet::new(vec![segment(0, 1, ""), segment(1, 3, "")]).unwrap();
        let band = FeedbackBand::compute(&set, &continuous(10.0)).unwrap();
        assert!((band.min - 0.9).abs() < 1e-9);
        assert!((band.max - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_band_follows_reference_text() {
        let set = SegmentSet::new(vec![segment(0, 1, ""), segment(1, 2, "abcdefghij")]).unwrap();
        let band = FeedbackBand::compute(&set, &continuous(0.0)).unwrap();
        assert!((band.min - 5.0).abs() < 1e-9);
        assert!((band.max - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_clamped_below_min() {
        // share = 2/3, min 30 → floor 20 chars for the reference, slack dropped
        let set = SegmentSet::new(vec![segment(0, 1, ""), segment(1, 2, "abc")]).unwrap();
        let options = continuous(10.0).with_length_bounds(LengthBounds::new(Some(30), None));
        let band = FeedbackBand::compute(&set, &options).unwrap();
        assert!((band.min - 10.0).abs() < 1e-9);
        assert!((band.max - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_clamped_above_max() {
        // equal weights: the first segment is the reference
        let set =
            SegmentSet::new(vec![segment(0, 1, &"x".repeat(50)), segment(1, 1, "")]).unwrap();
        let options = continuous(20.0).with_length_bounds(LengthBounds::new(None, Some(40)));
        let band = FeedbackBand::compute(&set, &options).unwrap();
        // share = 1/2 → ceiling of 20 characters
        assert!((band.min - 20.0).abs() < 1e-9);
        assert!((band.max - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_band_inside_bounds_keeps_slack() {
        let set = SegmentSet::new(vec![segment(0, 1, &"y".repeat(10))]).unwrap();
        let options = continuous(10.0).with_length_bounds(LengthBounds::new(Some(5), Some(20)));
        let band = FeedbackBand::compute(&set, &options).unwrap();
        assert!((band.min - 9.0).abs() < 1e-9);
        assert!((band.max - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_slack_treated_as_zero() {
        let set = SegmentSet::new(vec![segment(0, 1, "abcd")]).unwrap();
        let band = FeedbackBand::compute(&set, &continuous(-50.0)).unwrap();
        assert_eq!(band.min, band.max);
    }

    #[test]
    fn test_too_long_gap_in_both_rounding_modes() {
        // ref 10 chars at weight 1, slack 0 → band [10, 10]; 13 chars is 3 over
        let set = SegmentSet::new(vec![
            segment(0, 1, &"r".repeat(10)),
            segment(1, 1, &"x".repeat(13)),
        ])
        .unwrap();
        let nearest = evaluate(&set, &continuous(0.0)).unwrap();
        assert_eq!(nearest[1].kind, VerdictKind::TooLong { gap: 3 });
        assert_eq!(nearest[1].message.as_deref(), Some("S1 -3"));

        let options = EvaluationOptions::on_request(0.0, None, "-@chars", "+@chars");
        let floor = evaluate(&set, &options).unwrap();
        assert_eq!(floor[1].kind, VerdictKind::TooLong { gap: 3 });
    }

    #[test]
    fn test_suppressed_has_no_message() {
        // band max = 1.1; "Hi" exceeds it by 0.9 characters, floored to 0
        let set = SegmentSet::new(vec![segment(0, 1, "Hi"), segment(1, 3, "")]).unwrap();
        let options = EvaluationOptions::on_request(10.0, None, "-@chars", "+@chars");
        let verdicts = evaluate(&set, &options).unwrap();
        assert_eq!(verdicts[0].kind, VerdictKind::Suppressed);
        assert_eq!(verdicts[0].message, None);
        assert_eq!(verdicts[0].gap(), 0);
    }

    #[test]
    fn test_too_short_gap_may_round_to_zero() {
        // slack 7 → band min 9.3; 9 chars fall 0.3 short
        let set = SegmentSet::new(vec![
            segment(0, 1, &"r".repeat(10)),
            segment(1, 1, &"x".repeat(9)),
        ])
        .unwrap();

        let nearest = evaluate(&set, &continuous(7.0)).unwrap();
        assert_eq!(nearest[1].kind, VerdictKind::TooShort { gap: 0 });
        assert_eq!(nearest[1].message.as_deref(), Some("S1 +0"));

        let options = EvaluationOptions::on_request(7.0, None, "-@chars", "+@chars");
        let ceil = evaluate(&set, &options).unwrap();
        assert_eq!(ceil[1].kind, VerdictKind::TooShort { gap: 1 });
    }

    #[test]
    fn test_alright_without_template_has_no_message() {
        let set = SegmentSet::new(vec![segment(0, 1, "abcde")]).unwrap();
        let options = EvaluationOptions::on_request(10.0, None, "-@chars", "+@chars");
        let verdicts = evaluate(&set, &options).unwrap();
        assert_eq!(verdicts[0].kind, VerdictKind::Alright);
        assert_eq!(verdicts[0].message, None);
    }

    #[test]
    fn test_alright_template_gets_title() {
        let set = SegmentSet::new(vec![segment(0, 1, "abcde")]).unwrap();
        let verdicts = evaluate(&set, &continuous(10.0)).unwrap();
        assert_eq!(verdicts[0].message.as_deref(), Some("S0 ok"));
    }

    #[test]
    fn test_verdict_serializes_with_status_tag() {
        let verdict = Verdict {
            segment_id: 2,
            title: "Body".to_string(),
            kind: VerdictKind::TooShort { gap: 7 },
            message: Some("Body +7".to_string()),
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["status"], "too_short");
        assert_eq!(json["gap"], 7);
        assert_eq!(json["segment_id"], 2);
    }
}
