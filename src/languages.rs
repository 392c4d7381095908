/// Languages offered by the translate operation. "en" is not listed here:
/// selecting English restores the retained original report without an
/// external call.
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "hi", name: "Hindi" },
    Language { code: "bn", name: "Bengali" },
    Language { code: "ta", name: "Tamil" },
    Language { code: "te", name: "Telugu" },
    Language { code: "mr", name: "Marathi" },
    Language { code: "gu", name: "Gujarati" },
    Language { code: "kn", name: "Kannada" },
    Language { code: "ml", name: "Malayalam" },
    Language { code: "pa", name: "Punjabi" },
    Language { code: "es", name: "Spanish" },
    Language { code: "fr", name: "French" },
];

pub fn is_supported(code: &str) -> bool {
    code == "en" || SUPPORTED_LANGUAGES.iter().any(|l| l.code == code)
}
