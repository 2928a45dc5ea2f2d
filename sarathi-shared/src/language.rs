//! UI language codes and the provider locale tags they map to.

/// Tag used for any code not in the table.
pub const FALLBACK_TAG: &str = "eng_Latn";

/// Codes offered to the user, in display order.
pub const SUPPORTED_LANGUAGES: [&str; 10] =
    ["en", "hi", "kn", "ta", "te", "bn", "gu", "mr", "pa", "or"];

/// Map a two-letter UI code to the provider's locale tag.
pub fn language_tag(code: &str) -> &'static str {
    match code {
        "en" => "eng_Latn",
        "hi" => "hin_Deva",
        "kn" => "kan_Knda",
        "ta" => "tam_Taml",
        "te" => "tel_Telu",
        "bn" => "ben_Beng",
        "gu" => "guj_Gujr",
        "mr" => "mar_Deva",
        "pa" => "pan_Guru",
        "or" => "ory_Orya",
        _ => FALLBACK_TAG,
    }
}

/// The code after `code` in `SUPPORTED_LANGUAGES`, wrapping around.
pub fn next_language(code: &str) -> &'static str {
    let pos = SUPPORTED_LANGUAGES
        .iter()
        .position(|c| *c == code)
        .map(|i| i + 1)
        .unwrap_or(0);
    SUPPORTED_LANGUAGES[pos % SUPPORTED_LANGUAGES.len()]
}
