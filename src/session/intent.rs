//! Command interpretation
//!
//! Maps a finalized transcript to an intent via case-insensitive substring
//! match against a fixed bilingual phrase table. Command phrases are checked
//! before the free-text fallback so "stop camera" with the camera on is a
//! command, not a question about the scene.

use crate::frame::CaptureKind;
use crate::language::Language;

/// Navigation destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Home,
    Assistant,
    Analyzer,
}

/// A normalized user command derived from spoken text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    NavigateHome,
    NavigateTo(NavTarget),
    StartCapture(CaptureKind),
    StopCapture(CaptureKind),
    CaptureAndAnalyze { question: Option<String> },
    Emergency,
    FreeFormQuestion(String),
    Unrecognized,
}

/// Phrase sets for one language
struct PhraseTable {
    home: &'static [&'static str],
    assistant: &'static [&'static str],
    analyzer: &'static [&'static str],
    start_capture: &'static [&'static str],
    stop_capture: &'static [&'static str],
    capture_analyze: &'static [&'static str],
    emergency: &'static [&'static str],
}

static ENGLISH: PhraseTable = PhraseTable {
    home: &["go back", "go home"],
    assistant: &["go to gpt", "go to assistant"],
    analyzer: &["go to scan", "video analyzer"],
    start_capture: &["start camera", "open camera"],
    stop_capture: &["stop camera", "close camera"],
    capture_analyze: &["take picture", "snap photo", "analyze"],
    emergency: &["emergency"],
};

static TAMIL: PhraseTable = PhraseTable {
    home: &["பின்னால் செல்", "முகப்புக்கு செல்"],
    assistant: &["உதவியாளருக்குச் செல்", "உதவியாளரிடம் செல்"],
    analyzer: &["ஸ்கேனுக்குச் செல்", "வீடியோ பகுப்பாய்வி"],
    start_capture: &["கேமராவைத் தொடங்கு", "கேமராவைத் திற"],
    stop_capture: &["கேமராவை நிறுத்து", "கேமராவை மூடு"],
    capture_analyze: &["படம் எடு", "படம் பிடி", "பகுப்பாய்வு செய்"],
    emergency: &["அவசரம்"],
};

fn table(language: Language) -> &'static PhraseTable {
    match language {
        Language::English => &ENGLISH,
        Language::Tamil => &TAMIL,
    }
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

/// Interpret a finalized transcript
///
/// `active_source` is the session's current capture source; it decides both
/// which source "stop camera" targets and whether an unmatched transcript
/// becomes a question about the current frame.
///
/// Emergency phrases win over everything else in the transcript. Remaining
/// priority: home > assistant > analyzer > start > stop > capture+analyze >
/// fallback.
#[must_use]
pub fn interpret(
    transcript: &str,
    active_source: Option<CaptureKind>,
    language: Language,
) -> Intent {
    let text = transcript.trim().to_lowercase();
    if text.is_empty() {
        return Intent::Unrecognized;
    }

    let table = table(language);

    if contains_any(&text, table.emergency) {
        return Intent::Emergency;
    }
    if contains_any(&text, table.home) {
        return Intent::NavigateHome;
    }
    if contains_any(&text, table.assistant) {
        return Intent::NavigateTo(NavTarget::Assistant);
    }
    if contains_any(&text, table.analyzer) {
        return Intent::NavigateTo(NavTarget::Analyzer);
    }
    if contains_any(&text, table.start_capture) {
        return Intent::StartCapture(CaptureKind::Local);
    }
    if contains_any(&text, table.stop_capture) {
        // "stop camera" can only mean the camera that is on
        return Intent::StopCapture(active_source.unwrap_or(CaptureKind::Local));
    }
    if contains_any(&text, table.capture_analyze) {
        return Intent::CaptureAndAnalyze { question: None };
    }

    if active_source.is_some() {
        tracing::debug!(transcript = %transcript.trim(), "unmatched transcript treated as question");
        Intent::FreeFormQuestion(transcript.trim().to_string())
    } else {
        Intent::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emergency_wins_regardless_of_other_content() {
        let intent = interpret(
            "go home there is an emergency please",
            Some(CaptureKind::Local),
            Language::English,
        );
        assert_eq!(intent, Intent::Emergency);

        let intent = interpret("அவசரம் கேமராவை நிறுத்து", None, Language::Tamil);
        assert_eq!(intent, Intent::Emergency);
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert_eq!(
            interpret("Please GO BACK now", None, Language::English),
            Intent::NavigateHome
        );
        assert_eq!(
            interpret("could you Take Picture", Some(CaptureKind::Local), Language::English),
            Intent::CaptureAndAnalyze { question: None }
        );
    }

    #[test]
    fn command_phrases_beat_the_question_fallback() {
        // With the camera on, "stop camera" must not become a question
        let intent = interpret("stop camera", Some(CaptureKind::Local), Language::English);
        assert_eq!(intent, Intent::StopCapture(CaptureKind::Local));
    }

    #[test]
    fn stop_targets_the_active_source() {
        let intent = interpret("close camera", Some(CaptureKind::Remote), Language::English);
        assert_eq!(intent, Intent::StopCapture(CaptureKind::Remote));
    }

    #[test]
    fn navigation_priority_over_capture() {
        let intent = interpret("go home and take picture", None, Language::English);
        assert_eq!(intent, Intent::NavigateHome);
    }

    #[test]
    fn unmatched_with_active_source_becomes_question() {
        let intent = interpret(
            "is there a dog in front of me",
            Some(CaptureKind::Local),
            Language::English,
        );
        assert_eq!(
            intent,
            Intent::FreeFormQuestion("is there a dog in front of me".to_string())
        );
    }

    #[test]
    fn unmatched_without_source_is_unrecognized() {
        let intent = interpret("is there a dog in front of me", None, Language::English);
        assert_eq!(intent, Intent::Unrecognized);
    }

    #[test]
    fn empty_transcript_is_unrecognized() {
        assert_eq!(interpret("   ", None, Language::English), Intent::Unrecognized);
    }

    #[test]
    fn tamil_commands_match() {
        assert_eq!(
            interpret("கேமராவைத் தொடங்கு", None, Language::Tamil),
            Intent::StartCapture(CaptureKind::Local)
        );
        assert_eq!(
            interpret("தயவுசெய்து படம் எடு", Some(CaptureKind::Local), Language::Tamil),
            Intent::CaptureAndAnalyze { question: None }
        );
        assert_eq!(
            interpret("முகப்புக்கு செல்", None, Language::Tamil),
            Intent::NavigateHome
        );
    }

    #[test]
    fn assistant_navigation_matches_both_phrasings() {
        assert_eq!(
            interpret("go to gpt", None, Language::English),
            Intent::NavigateTo(NavTarget::Assistant)
        );
        assert_eq!(
            interpret("go to assistant", None, Language::English),
            Intent::NavigateTo(NavTarget::Assistant)
        );
    }
}
