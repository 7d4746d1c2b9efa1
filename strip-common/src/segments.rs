//! Segment weighting model
//!
//! Holds the weight and current text of every segment and derives the
//! values the feedback evaluator anchors on:
//! - reference segment (highest weight, first wins on ties)
//! - reference share (reference weight / total weight)
//! - weight gcd (resolution of one "weight unit")
//!
//! Weights are fixed once the set is built, so the derived values are
//! computed at construction. Text belongs to the host and changes through
//! [`SegmentSet::set_text`].

use crate::numeric::gcd_all;
use crate::{Error, Result};
use serde::Serialize;

/// One labeled text-entry region of the exercise
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Display position, unique within the set
    pub id: usize,
    pub title: String,
    /// Relative importance, always > 0
    pub weight: u32,
    /// Current learner text
    pub text: String,

    // Presentation data carried through for the host
    pub description: Option<String>,
    pub color_background: Option<String>,
    pub color_text: Option<String>,
    /// Text the segment starts with (and returns to on reset)
    pub previous_text: Option<String>,
}

impl Segment {
    /// Create a segment with empty text and no presentation data
    pub fn new(id: usize, title: impl Into<String>, weight: u32) -> Self {
        Self {
            id,
            title: title.into(),
            weight,
            text: String::new(),
            description: None,
            color_background: None,
            color_text: None,
            previous_text: None,
        }
    }

    /// Builder-style text setter, mostly for tests and seeding
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Text length in characters (Unicode scalar values)
    pub fn text_length(&self) -> usize {
        self.text.chars().count()
    }

    /// Text length divided by weight
    pub fn normalized_length(&self) -> f64 {
        self.text_length() as f64 / self.weight as f64
    }
}

/// Ordered, non-empty collection of segments with derived weight data
#[derive(Debug, Clone)]
pub struct SegmentSet {
    segments: Vec<Segment>,
    reference_index: usize,
    reference_share: f64,
    weight_gcd: u32,
}

impl SegmentSet {
    /// Validate segments and compute reference segment, share and gcd.
    ///
    /// # Errors
    /// [`Error::Config`] if the list is empty, a weight is 0, or two
    /// segments share an id.
    pub fn new(segments: Vec<Segment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::Config("at least one segment is required".to_string()));
        }

        for (pos, segment) in segments.iter().enumerate() {
            if segment.weight == 0 {
                return Err(Error::Config(format!(
                    "segment '{}' has weight 0; weights must be positive",
                    segment.title
                )));
            }
            if segments[..pos].iter().any(|s| s.id == segment.id) {
                return Err(Error::Config(format!("duplicate segment id {}", segment.id)));
            }
        }

        // Strict comparison keeps the first maximum
        let mut reference_index = 0;
        for (pos, segment) in segments.iter().enumerate() {
            if segment.weight > segments[reference_index].weight {
                reference_index = pos;
            }
        }

        let total_weight: u64 = segments.iter().map(|s| s.weight as u64).sum();
        let reference_share = segments[reference_index].weight as f64 / total_weight as f64;

        let weights: Vec<u32> = segments.iter().map(|s| s.weight).collect();
        let weight_gcd = gcd_all(&weights);

        Ok(Self {
            segments,
            reference_index,
            reference_share,
            weight_gcd,
        })
    }

    /// Segment with the highest weight
    pub fn reference_segment(&self) -> &Segment {
        &self.segments[self.reference_index]
    }

    /// Reference weight as a fraction of the total weight, in (0, 1]
    pub fn reference_share(&self) -> f64 {
        self.reference_share
    }

    /// Greatest common divisor across all weights
    pub fn weight_gcd(&self) -> u32 {
        self.weight_gcd
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Replace the learner text of one segment
    pub fn set_text(&mut self, id: usize, text: impl Into<String>) -> Result<()> {
        let segment = self
            .segments
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("segment {}", id)))?;
        segment.text = text.into();
        Ok(())
    }

    /// Restore every segment to its previous text (or empty)
    pub fn reset_texts(&mut self) {
        for segment in &mut self.segments {
            segment.text = segment.previous_text.clone().unwrap_or_default();
        }
    }

    /// True once any segment holds non-whitespace text
    pub fn answer_given(&self) -> bool {
        self.segments.iter().any(|s| !s.text.trim().is_empty())
    }

    /// All segment texts in display order, joined by `separator`
    pub fn full_text(&self, separator: &str) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}
