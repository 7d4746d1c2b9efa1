//! Report assembly
//!
//! Two consumers read verdicts:
//! - continuous feedback shows one status per segment, every segment,
//!   with a blank status for suppressed verdicts
//! - on-request feedback aggregates the messages into one report that
//!   falls back to an "all good" message when nothing needs attention

use crate::feedback::{Verdict, VerdictKind};
use serde::Serialize;

/// Aggregated on-request feedback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "messages", rename_all = "snake_case")]
pub enum Report {
    /// No segment produced a message
    AllGood(String),
    /// Exactly one message, rendered as a paragraph
    Paragraph(String),
    /// Several messages in segment order, rendered as a list
    List(Vec<String>),
}

impl Report {
    /// Assemble the on-request report from verdicts in segment order
    ///
    /// Suppressed verdicts and verdicts without a message are dropped.
    pub fn assemble(verdicts: &[Verdict], all_good: &str) -> Self {
        let mut messages: Vec<String> = verdicts
            .iter()
            .filter(|v| v.kind != VerdictKind::Suppressed)
            .filter_map(|v| v.message.clone())
            .collect();

        match messages.len() {
            0 => Report::AllGood(all_good.to_string()),
            1 => Report::Paragraph(messages.remove(0)),
            _ => Report::List(messages),
        }
    }

    pub fn messages(&self) -> Vec<&str> {
        match self {
            Report::AllGood(text) | Report::Paragraph(text) => vec![text.as_str()],
            Report::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_all_good(&self) -> bool {
        matches!(self, Report::AllGood(_))
    }

    /// Plain-text rendering: paragraphs as-is, lists as `- ` items
    pub fn render_text(&self) -> String {
        match self {
            Report::AllGood(text) | Report::Paragraph(text) => text.clone(),
            Report::List(items) => items
                .iter()
                .map(|item| format!("- {}", item))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render_text())
    }
}

/// Status shown next to one segment in continuous feedback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusLine {
    pub segment_id: usize,
    pub title: String,
    #[serde(flatten)]
    pub kind: VerdictKind,
    /// Empty for suppressed verdicts
    pub text: String,
}

/// One status per segment, no aggregation
pub fn status_lines(verdicts: &[Verdict]) -> Vec<StatusLine> {
    verdicts
        .iter()
        .map(|v| StatusLine {
            segment_id: v.segment_id,
            title: v.title.clone(),
            kind: v.kind,
            text: v.message.clone().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(id: usize, kind: VerdictKind, message: Option<&str>) -> Verdict {
        Verdict {
            segment_id: id,
            title: format!("S{}", id),
            kind,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_report_falls_back_to_all_good() {
        let verdicts = vec![
            verdict(0, VerdictKind::Alright, None),
            verdict(1, VerdictKind::Suppressed, None),
        ];
        let report = Report::assemble(&verdicts, "All good");
        assert_eq!(report, Report::AllGood("All good".to_string()));
        assert!(report.is_all_good());
    }

    #[test]
    fn test_single_message_is_paragraph() {
        let verdicts = vec![
            verdict(0, VerdictKind::Alright, None),
            verdict(1, VerdictKind::TooShort { gap: 4 }, Some("S1 needs 4 more")),
        ];
        let report = Report::assemble(&verdicts, "All good");
        assert_eq!(report, Report::Paragraph("S1 needs 4 more".to_string()));
        assert_eq!(report.render_text(), "S1 needs 4 more");
    }

    #[test]
    fn test_multiple_messages_keep_segment_order() {
        let verdicts = vec![
            verdict(0, VerdictKind::TooLong { gap: 2 }, Some("first")),
            verdict(1, VerdictKind::Alright, Some("fine")),
            verdict(2, VerdictKind::TooShort { gap: 1 }, Some("third")),
        ];
        let report = Report::assemble(&verdicts, "All good");
        assert_eq!(report.messages(), vec!["first", "fine", "third"]);
        assert_eq!(report.render_text(), "- first\n- fine\n- third");
    }

    #[test]
    fn test_status_lines_cover_every_segment() {
        let verdicts = vec![
            verdict(0, VerdictKind::Alright, Some("ok")),
            verdict(1, VerdictKind::Suppressed, None),
            verdict(2, VerdictKind::TooLong { gap: 3 }, Some("cut 3")),
        ];
        let lines = status_lines(&verdicts);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "ok");
        assert_eq!(lines[1].text, "");
        assert_eq!(lines[2].text, "cut 3");
    }

    #[test]
    fn test_report_serializes_kind() {
        let report = Report::List(vec!["a".to_string(), "b".to_string()]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "list");
        assert_eq!(json["messages"][1], "b");
    }
}
