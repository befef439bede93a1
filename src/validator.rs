use regex::Regex;
use std::sync::OnceLock;

/// Accepted source URL shapes: YouTube watch URLs, youtu.be short links,
/// and Instagram posts/reels. Scheme and "www." are optional, trailing
/// query parameters are tolerated.
const ACCEPTED_PATTERNS: &[&str] = &[
    r"^(https?://)?(www\.)?(youtube\.com/watch\?v=|youtu\.be/)[\w-]+",
    r"^(https?://)?(www\.)?youtube\.com/watch\?.*v=[\w-]+",
    r"^(https?://)?(www\.)?instagram\.com/(p|reel|tv)/[\w-]+/?",
];

/// Patterns that capture the platform-specific video identifier.
const IDENTIFIER_PATTERNS: &[&str] = &[
    r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\s]+)",
    r"youtube\.com/watch\?.*v=([^&\s]+)",
    r"instagram\.com/(?:p|reel|tv)/([\w-]+)",
];

fn accepted_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile_patterns(ACCEPTED_PATTERNS))
}

fn identifier_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile_patterns(IDENTIFIER_PATTERNS))
}

fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
}

/// Check whether a string is an acceptable source URL.
///
/// Matches against the fixed pattern set only; unrecognized hosts or path
/// shapes are rejected without any network access.
pub fn is_acceptable_source(url: &str) -> bool {
    accepted_patterns().iter().any(|pattern| pattern.is_match(url))
}

/// Extract the platform-specific video identifier, if present.
///
/// Used for display and logging only; the raw URL is what is sent to the
/// backend.
pub fn extract_identifier(url: &str) -> Option<String> {
    for pattern in identifier_patterns() {
        if let Some(captures) = pattern.captures(url) {
            if let Some(id) = captures.get(1) {
                return Some(id.as_str().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_watch_urls() {
        assert!(is_acceptable_source(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        ));
        assert!(is_acceptable_source("https://youtu.be/dQw4w9WgXcQ"));
    }

    #[test]
    fn accepts_urls_without_scheme_or_www() {
        assert!(is_acceptable_source("youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_acceptable_source("www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_acceptable_source("youtu.be/dQw4w9WgXcQ"));
    }

    #[test]
    fn accepts_extra_query_parameters() {
        assert!(is_acceptable_source(
            "https://www.youtube.com/watch?list=PL123&v=dQw4w9WgXcQ&t=42"
        ));
        assert!(is_acceptable_source(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&feature=share"
        ));
    }

    #[test]
    fn accepts_instagram_posts_and_reels() {
        assert!(is_acceptable_source("https://www.instagram.com/p/Cxyz-123/"));
        assert!(is_acceptable_source("instagram.com/reel/Cxyz-123"));
        assert!(is_acceptable_source("https://instagram.com/tv/Cxyz-123/"));
    }

    #[test]
    fn rejects_unrecognized_sources() {
        assert!(!is_acceptable_source(""));
        assert!(!is_acceptable_source("not a url"));
        assert!(!is_acceptable_source("https://example.com/watch?v=abc"));
        assert!(!is_acceptable_source("https://vimeo.com/12345"));
        assert!(!is_acceptable_source("https://www.youtube.com/playlist?list=PL123"));
    }

    #[test]
    fn extracts_youtube_identifiers() {
        assert_eq!(
            extract_identifier("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_identifier("https://youtu.be/dQw4w9WgXcQ?t=10"),
            Some("dQw4w9WgXcQ?t=10".to_string())
        );
        assert_eq!(
            extract_identifier("youtube.com/watch?list=PL123&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn extracts_instagram_identifiers() {
        assert_eq!(
            extract_identifier("https://www.instagram.com/reel/Cxyz-123/"),
            Some("Cxyz-123".to_string())
        );
    }

    #[test]
    fn absent_identifier_is_none() {
        assert_eq!(extract_identifier("https://example.com/video"), None);
        assert_eq!(extract_identifier(""), None);
    }
}
