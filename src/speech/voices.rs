//! Voice selection by language tag

/// A voice offered by a synthesis engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Engine-specific voice name
    pub name: String,
    /// BCP 47 language tag (e.g. "en-US", "ta-IN")
    pub language: String,
    /// Whether the engine marks this as the default voice for its language
    pub default_for_language: bool,
}

impl VoiceInfo {
    #[must_use]
    pub fn new(name: &str, language: &str, default_for_language: bool) -> Self {
        Self {
            name: name.to_string(),
            language: language.to_string(),
            default_for_language,
        }
    }
}

/// Select the best voice for a requested language tag
///
/// Prefers a default-flagged voice whose tag prefix-matches the request,
/// then any prefix match. Returns `None` when nothing matches; the caller
/// falls back to the platform default voice rather than treating this as an
/// error.
#[must_use]
pub fn select_voice<'a>(voices: &'a [VoiceInfo], requested_tag: &str) -> Option<&'a VoiceInfo> {
    let primary = requested_tag
        .split('-')
        .next()
        .unwrap_or(requested_tag)
        .to_ascii_lowercase();

    let mut candidates = voices
        .iter()
        .filter(|v| v.language.to_ascii_lowercase().starts_with(&primary));

    let first = candidates.next()?;
    Some(
        std::iter::once(first)
            .chain(candidates)
            .find(|v| v.default_for_language)
            .unwrap_or(first),
    )
}
