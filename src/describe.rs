//! Description previews and transcript segmentation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::types::MediaType;

pub const DEFAULT_PREVIEW_LENGTH: usize = 500;
pub const ELLIPSIS: &str = "...";

// Capitalised words, optional "(Role)", then a colon: "Gary Jordan (Host):"
static SPEAKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)*(?:\s+\([A-Za-z\s]+\))?)\s*:").expect("speaker regex")
});

/// One attributed (or unattributed, when `speaker` is empty) block of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSegment {
    pub speaker: String,
    pub content: String,
}

impl TextSegment {
    pub fn plain(content: impl Into<String>) -> Self { Self { speaker: String::new(), content: content.into() } }
}

/// First `max_length` characters plus an ellipsis; short text is returned as is.
/// Cuts mid-word.
pub fn format_preview(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
    }
}

/// Splits a dialogue transcript at speaker labels. Text without labels comes
/// back as a single unattributed segment; this never fails.
pub fn format_transcript(text: &str) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut speaker = String::new();
    let mut cursor = 0;

    for caps in SPEAKER.captures_iter(text) {
        let Some(label) = caps.get(0) else { continue };
        if is_inside_url(text, label.start(), label.end()) {
            continue;
        }
        push_segment(&mut segments, std::mem::take(&mut speaker), &text[cursor..label.start()]);
        speaker = caps.get(1).map_or("", |g| g.as_str()).trim().to_string();
        cursor = label.end();
    }
    push_segment(&mut segments, speaker, &text[cursor..]);
    segments
}

pub fn format_regular(text: &str) -> Vec<TextSegment> { vec![TextSegment::plain(text)] }

/// Audio descriptions are transcripts; everything else is plain text.
pub fn format_description(text: &str, media_type: Option<MediaType>) -> Vec<TextSegment> {
    match media_type {
        Some(MediaType::Audio) => format_transcript(text),
        _ => format_regular(text),
    }
}

fn push_segment(out: &mut Vec<TextSegment>, speaker: String, content: &str) {
    let content = content.trim();
    if !content.is_empty() {
        out.push(TextSegment { speaker, content: content.to_string() });
    }
}

// "Https://..." would otherwise read as speaker "Https", and labels inside a
// URL token ("https://host/Name:") are not speakers either.
fn is_inside_url(text: &str, start: usize, end: usize) -> bool {
    if text[end..].starts_with("//") {
        return true;
    }
    let prefix = &text[..start];
    let token = prefix.rsplit(char::is_whitespace).next().unwrap_or(prefix).to_ascii_lowercase();
    token.contains("http://") || token.contains("https://")
}

/// Collapsible description for one result item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionView {
    pub preview: String,
    pub segments: Vec<TextSegment>,
    pub truncated: bool,
    pub expanded: bool,
}

impl DescriptionView {
    pub fn new(text: &str, media_type: Option<MediaType>, max_length: usize) -> Self {
        Self {
            preview: format_preview(text, max_length),
            segments: format_description(text, media_type),
            truncated: text.chars().count() > max_length,
            expanded: false,
        }
    }

    /// Expands or collapses; text that fits the preview never expands.
    pub fn toggle(mut self) -> Self {
        if self.truncated {
            self.expanded = !self.expanded;
        }
        self
    }

    /// Affordance label, only for truncated text.
    pub fn toggle_label(&self) -> Option<&'static str> {
        match (self.truncated, self.expanded) {
            (false, _) => None,
            (true, false) => Some("Read more"),
            (true, true) => Some("Show less"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACE: &str = "Gary Jordan (Host): Welcome everyone to our live launch broadcast of NASA's PACE mission. \
        Today we're going to witness a remarkable achievement. Kelly Haston: Thank you Gary. \
        I'm excited to guide you through this historic launch.";

    #[test]
    fn preview_keeps_short_text() {
        let text = "a".repeat(500);
        assert_eq!(format_preview(&text, 500), text);
        assert_eq!(format_preview("", 500), "");
    }

    #[test]
    fn preview_cuts_by_characters() {
        let text = "é".repeat(501);
        let preview = format_preview(&text, 500);
        assert_eq!(preview.chars().count(), 503);
        assert!(preview.ends_with(ELLIPSIS));
        assert_eq!(format_preview("hello world", 7), "hello w...");
    }

    #[test]
    fn transcript_splits_on_speakers() {
        let segs = format_transcript(PACE);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].speaker, "Gary Jordan (Host)");
        assert!(segs[0].content.starts_with("Welcome everyone"));
        assert!(segs[0].content.ends_with("remarkable achievement."));
        assert_eq!(segs[1].speaker, "Kelly Haston");
        assert_eq!(segs[1].content, "Thank you Gary. I'm excited to guide you through this historic launch.");
    }

    #[test]
    fn transcript_without_speakers_is_one_trimmed_segment() {
        let segs = format_transcript("  just a plain description, no labels here.  ");
        assert_eq!(segs, vec![TextSegment::plain("just a plain description, no labels here.")]);
    }

    #[test]
    fn text_before_first_speaker_is_unattributed() {
        let segs = format_transcript("Recorded live. Host: Hello. Guest: Hi.");
        assert_eq!(segs[0], TextSegment::plain("Recorded live."));
        assert_eq!(segs[1].speaker, "Host");
        assert_eq!(segs[2], TextSegment { speaker: "Guest".into(), content: "Hi.".into() });
    }

    #[test]
    fn urls_are_not_speakers() {
        let segs = format_transcript("Listen at https://www.nasa.gov/Podcasts: more. Also Https://example.com");
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].speaker, "");
    }

    #[test]
    fn empty_speaker_turns_are_dropped() {
        let segs = format_transcript("Host: Guest: Hello there.");
        assert_eq!(segs, vec![TextSegment { speaker: "Guest".into(), content: "Hello there.".into() }]);
        assert!(format_transcript("   ").is_empty());
    }

    #[test]
    fn regular_text_is_a_single_segment() {
        let segs = format_description("Host: not parsed for images", Some(MediaType::Image));
        assert_eq!(segs, vec![TextSegment::plain("Host: not parsed for images")]);
        assert_eq!(format_description(PACE, Some(MediaType::Audio)).len(), 2);
    }

    #[test]
    fn description_toggle_only_when_truncated() {
        let short = DescriptionView::new("short", Some(MediaType::Image), 500);
        assert!(!short.truncated);
        assert_eq!(short.toggle_label(), None);
        assert!(!short.clone().toggle().expanded);

        let long = DescriptionView::new(&"x".repeat(600), Some(MediaType::Image), 500);
        assert!(long.truncated);
        assert_eq!(long.toggle_label(), Some("Read more"));
        let open = long.toggle();
        assert!(open.expanded);
        assert_eq!(open.toggle_label(), Some("Show less"));
        assert!(!open.toggle().expanded);
    }
}
