//! Transcript types and text renderings.

use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

/// A segment of transcribed speech
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Transcribed text
    pub text: String,
}

impl TranscriptSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Metadata about the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    /// Where the audio came from (file name or URL)
    pub source: String,
    /// When the transcript was produced (ISO 8601)
    pub created_at: String,
    /// Audio duration in seconds
    pub duration_secs: f64,
    /// Model used for transcription
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Language detected/used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Whether the output was translated to English
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub translated: bool,
}

/// Complete transcript for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub metadata: TranscriptMetadata,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(source: String, duration_secs: f64) -> Self {
        Self {
            metadata: TranscriptMetadata {
                source,
                created_at: chrono::Utc::now().to_rfc3339(),
                duration_secs,
                model: None,
                language: None,
                translated: false,
            },
            segments: Vec::new(),
        }
    }

    pub fn add_segment(&mut self, segment: TranscriptSegment) {
        self.segments.push(segment);
    }

    /// Get full text (all segments concatenated)
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Export to pretty-printed JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Export to plain text with per-segment timestamps
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        for segment in &self.segments {
            let _ = writeln!(
                output,
                "[{}] {}",
                format_timestamp(segment.start),
                segment.text
            );
        }
        output
    }
}

/// Format timestamp for text output (MM:SS, HH:MM:SS past an hour)
fn format_timestamp(seconds: f64) -> String {
    let total_secs = seconds as u64;
    let secs = total_secs % 60;
    let mins = total_secs / 60;

    if mins >= 60 {
        let hours = mins / 60;
        let mins = mins % 60;
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transcript {
        let mut t = Transcript::new("clip.mp3".to_string(), 10.0);
        t.add_segment(TranscriptSegment {
            start: 0.0,
            end: 2.5,
            text: "Hello world".to_string(),
        });
        t.add_segment(TranscriptSegment {
            start: 2.5,
            end: 4.0,
            text: "again".to_string(),
        });
        t
    }

    #[test]
    fn test_full_text_joins_segments() {
        assert_eq!(sample().full_text(), "Hello world again");
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.2), "01:05");
        assert_eq!(format_timestamp(3661.5), "01:01:01");
    }

    #[test]
    fn test_text_rendering() {
        let text = sample().to_text();
        assert!(text.contains("[00:00] Hello world"));
        assert!(text.contains("[00:02] again"));
    }

    #[test]
    fn test_json_roundtrip() {
        let t = sample();
        let json = t.to_json_pretty().unwrap();
        let back: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(back.full_text(), t.full_text());
        assert_eq!(back.metadata.source, "clip.mp3");
    }

    #[test]
    fn test_segment_duration() {
        let seg = TranscriptSegment {
            start: 1.0,
            end: 3.5,
            text: String::new(),
        };
        assert!((seg.duration() - 2.5).abs() < f64::EPSILON);
    }
}
