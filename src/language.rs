//! Session languages and language-dependent text
//!
//! All user-facing strings live here so the session logic stays
//! language-agnostic. Voice selection matches on the BCP 47 tag prefix.

/// Languages the gateway can run a session in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Tamil,
}

impl Language {
    /// Full BCP 47 tag used for recognition and synthesis
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Tamil => "ta-IN",
        }
    }

    /// Primary-subtag prefix used for voice matching
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Tamil => "ta",
        }
    }

    /// Parse a language from a tag or primary subtag ("en", "en-GB", "ta-IN")
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split('-').next().unwrap_or(tag);
        match primary.to_ascii_lowercase().as_str() {
            "en" => Some(Self::English),
            "ta" => Some(Self::Tamil),
            _ => None,
        }
    }

    /// Default description request sent with a frame when the user asked
    /// nothing specific
    #[must_use]
    pub const fn default_analysis_prompt(self) -> &'static str {
        match self {
            Self::English => {
                "Describe this scene in detail for a visually impaired person. \
                 Focus on any obstacles, people, or important elements."
            }
            Self::Tamil => {
                "பார்வைக் குறைபாடு உள்ள ஒருவருக்காக இந்தக் காட்சியை விரிவாக விவரிக்கவும். \
                 தடைகள், மனிதர்கள் அல்லது முக்கியமான கூறுகள் மீது கவனம் செலுத்தவும்."
            }
        }
    }

    /// Generic scene descriptions used when the vision service is unreachable
    #[must_use]
    pub const fn offline_responses(self) -> &'static [&'static str] {
        match self {
            Self::English => &[
                "I can see what appears to be an indoor space. There are no obvious obstacles in the immediate vicinity.",
                "This looks like an outdoor area. The path ahead seems clear, but proceed with caution.",
                "I can see what might be furniture or objects in the frame. Please be careful when moving forward.",
                "The image shows what appears to be a room with some furniture. There are no immediate hazards visible.",
                "I can see what looks like a pathway. It appears to be clear of obstacles.",
            ],
            Self::Tamil => &[
                "இது ஒரு உட்புற இடம் போல் தெரிகிறது. அருகில் வெளிப்படையான தடைகள் எதுவும் இல்லை.",
                "இது ஒரு வெளிப்புற பகுதி போல் உள்ளது. முன்னால் உள்ள பாதை தெளிவாகத் தெரிகிறது, ஆனால் கவனமாகச் செல்லவும்.",
                "சட்டகத்தில் மரச்சாமான்கள் அல்லது பொருட்கள் இருக்கலாம். முன்னே நகரும் போது கவனமாக இருங்கள்.",
                "படத்தில் சில மரச்சாமான்களுடன் கூடிய அறை தெரிகிறது. உடனடி ஆபத்துகள் எதுவும் தெரியவில்லை.",
                "இது ஒரு நடைபாதை போல் தெரிகிறது. தடைகள் இல்லாமல் இருப்பதாகத் தெரிகிறது.",
            ],
        }
    }

    /// Note appended to an offline response when the user had asked a
    /// question. Always contains the question verbatim.
    #[must_use]
    pub fn offline_question_note(self, question: &str) -> String {
        match self {
            Self::English => format!(
                " Regarding your question: \"{question}\", I'm currently unable to \
                 provide a specific answer as I'm operating in offline mode."
            ),
            Self::Tamil => format!(
                " உங்கள் கேள்வி \"{question}\" குறித்து: நான் இப்போது ஆஃப்லைன் \
                 பயன்முறையில் இருப்பதால் குறிப்பிட்ட பதிலை அளிக்க இயலவில்லை."
            ),
        }
    }
}

/// User-facing notices the session can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    DidNotUnderstand,
    CameraNotActive,
    CameraStarted,
    CameraStopped,
    CameraUnavailable,
    FrameNotReady,
    VoiceUnavailable,
    EmergencyAlert,
}

impl Notice {
    /// Spoken/displayed text for this notice in the given language
    #[must_use]
    pub const fn text(self, language: Language) -> &'static str {
        match (self, language) {
            (Self::DidNotUnderstand, Language::English) => {
                "Sorry, I didn't understand that command."
            }
            (Self::DidNotUnderstand, Language::Tamil) => {
                "மன்னிக்கவும், அந்தக் கட்டளை புரியவில்லை."
            }
            (Self::CameraNotActive, Language::English) => {
                "Camera is not active. Please start the camera first."
            }
            (Self::CameraNotActive, Language::Tamil) => {
                "கேமரா இயக்கத்தில் இல்லை. முதலில் கேமராவைத் தொடங்கவும்."
            }
            (Self::CameraStarted, Language::English) => "Camera activated.",
            (Self::CameraStarted, Language::Tamil) => "கேமரா இயக்கப்பட்டது.",
            (Self::CameraStopped, Language::English) => "Camera has been turned off.",
            (Self::CameraStopped, Language::Tamil) => "கேமரா நிறுத்தப்பட்டது.",
            (Self::CameraUnavailable, Language::English) => {
                "Could not access the camera. Please check permissions."
            }
            (Self::CameraUnavailable, Language::Tamil) => {
                "கேமராவை அணுக முடியவில்லை. அனுமதிகளைச் சரிபார்க்கவும்."
            }
            (Self::FrameNotReady, Language::English) => {
                "Unable to capture a frame. The stream is not ready."
            }
            (Self::FrameNotReady, Language::Tamil) => {
                "படத்தைப் பிடிக்க முடியவில்லை. ஸ்ட்ரீம் தயாராக இல்லை."
            }
            (Self::VoiceUnavailable, Language::English) => {
                "Voice input is unavailable. You can still use the buttons."
            }
            (Self::VoiceUnavailable, Language::Tamil) => {
                "குரல் உள்ளீடு கிடைக்கவில்லை. பொத்தான்களைத் தொடர்ந்து பயன்படுத்தலாம்."
            }
            (Self::EmergencyAlert, Language::English) => {
                "Contacting your emergency contact."
            }
            (Self::EmergencyAlert, Language::Tamil) => {
                "உங்கள் அவசரத் தொடர்பை அழைக்கிறேன்."
            }
        }
    }
}
