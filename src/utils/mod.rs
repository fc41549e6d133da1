use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Tags kept in caption text when formatting is preserved
pub const FORMATTING_TAGS: &[&str] = &[
    "strong", "em", "b", "i", "mark", "small", "del", "ins", "sub", "sup",
];

fn video_id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/)([^&\n?#/]+)",
            r"youtube\.com/v/([^&\n?#/]+)",
            r"youtube\.com/watch\?(?:[^#\n]*&)?v=([^&\n?#]+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("must be valid regex"))
        .collect()
    })
}

/// Extract the video id from a YouTube URL.
///
/// Returns `None` when the input is not one of the known URL shapes.
pub fn extract_video_id(input: &str) -> Option<String> {
    video_id_patterns()
        .iter()
        .find_map(|re| re.captures(input))
        .map(|caps| caps[1].to_string())
}

/// Turn user input into a video id, passing through anything that is not a URL
pub fn normalize_video_id(input: &str) -> String {
    let trimmed = input.trim();
    extract_video_id(trimmed).unwrap_or_else(|| trimmed.to_string())
}

/// Decode HTML character references, including the full HTML5 named entity table.
/// Unknown named entities are left untouched.
pub fn decode_html_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Remove markup tags, keeping those whose name is listed in `keep`
pub fn strip_tags(text: &str, keep: &[&str]) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").expect("must be valid regex"));

    re.replace_all(text, |caps: &Captures| {
        let name = caps[1].to_lowercase();
        if keep.contains(&name.as_str()) {
            caps[0].to_string()
        } else {
            String::new()
        }
    })
    .into_owned()
}
