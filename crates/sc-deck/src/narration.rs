//! Tutor-style narration built from a slide's title, content and notes.

use sc_core::Slide;

/// Content sentences this short are skipped.
const MIN_SENTENCE_CHARS: usize = 10;
/// Notes this short are not worth reading out.
const MIN_NOTES_CHARS: usize = 20;

/// Fill `slide.narration_text`.
pub fn narrate(slide: &mut Slide) {
    slide.narration_text = explain(slide);
}

/// The narration for `slide`.
///
/// Falls back to the slide's combined text when nothing substantial was
/// found, so the result is empty only for an empty slide.
pub fn explain(slide: &Slide) -> String {
    let mut parts: Vec<String> = Vec::new();

    if slide.slide_number == 1 {
        parts.push("Welcome! Let me explain this presentation to you".into());
    }

    let title = slide.title.trim();
    if !title.is_empty() {
        parts.push(format!("On this slide, we're discussing {}", title.to_lowercase()));
    }

    for sentence in slide.content.split('.').map(str::trim) {
        if sentence.chars().count() > MIN_SENTENCE_CHARS {
            parts.push(format!("{}{sentence}", lead_in(sentence)));
        }
    }

    let notes = slide.speaker_notes.trim();
    if notes.chars().count() > MIN_NOTES_CHARS {
        parts.push(format!("Additional context: {notes}"));
    }

    if parts.is_empty() {
        return slide.combined_text();
    }

    let mut text = parts
        .iter()
        .map(|p| p.trim_end_matches('.'))
        .collect::<Vec<_>>()
        .join(". ");
    text.push('.');
    text
}

/// Keywords are plain substring matches, so "scan" counts as "can".
fn lead_in(sentence: &str) -> &'static str {
    let lower = sentence.to_lowercase();
    if lower.contains("system") {
        "Let me explain: "
    } else if lower.contains("leverages") || lower.contains("uses") {
        "Here's how it works: "
    } else if lower.contains("can") || lower.contains("will") {
        "The key benefits are: "
    } else {
        "To elaborate: "
    }
}
