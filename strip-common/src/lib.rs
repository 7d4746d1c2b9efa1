//! # Structure Strip Common Library
//!
//! Length feedback engine for the structure strip writing exercise:
//! - Segment weighting model (reference segment, weight share, weight gcd)
//! - Feedback evaluator (per-segment too-short / too-long verdicts)
//! - Report assembly for continuous and on-request feedback
//! - Exercise configuration loading
//! - Numeric utilities

pub mod config;
pub mod error;
pub mod feedback;
pub mod numeric;
pub mod report;
pub mod segments;

pub use error::{Error, Result};
pub use feedback::{
    evaluate, EvaluationOptions, FeedbackTemplates, LengthBounds, RoundingMode, Verdict,
    VerdictKind,
};
pub use report::{Report, StatusLine};
pub use segments::{Segment, SegmentSet};
