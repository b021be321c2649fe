//! Embed URL derivation for short-form videos

use regex::Regex;
use std::sync::LazyLock;

use crate::models::ShortPlatform;

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:(?:www\.|m\.)?youtube\.com/(?:watch\?(?:[^#]*&)?v=|shorts/|embed/)|youtu\.be/)([A-Za-z0-9_-]+)",
    )
    .unwrap()
});

static INSTAGRAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?instagram\.com/(reels?|p)/([A-Za-z0-9_-]+)").unwrap()
});

/// Platform and iframe-ready URL for a shared video link.
///
/// Returns None for anything that is not a recognised YouTube or Instagram
/// video URL.
pub fn resolve(url: &str) -> Option<(ShortPlatform, String)> {
    let url = url.trim();

    if let Some(caps) = YOUTUBE.captures(url) {
        let id = &caps[1];
        return Some((
            ShortPlatform::Youtube,
            format!("https://www.youtube.com/embed/{id}"),
        ));
    }

    if let Some(caps) = INSTAGRAM.captures(url) {
        let kind = if &caps[1] == "p" { "p" } else { "reel" };
        let id = &caps[2];
        return Some((
            ShortPlatform::Instagram,
            format!("https://www.instagram.com/{kind}/{id}/embed"),
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embed(url: &str) -> Option<String> {
        resolve(url).map(|(_, embed)| embed)
    }

    #[test]
    fn test_youtube_variants() {
        let expected = Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_string());
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ&t=42",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "  http://www.youtube.com/shorts/dQw4w9WgXcQ  ",
        ] {
            assert_eq!(embed(url), expected, "{url}");
        }
        assert_eq!(
            resolve("https://youtu.be/dQw4w9WgXcQ").unwrap().0,
            ShortPlatform::Youtube
        );
    }

    #[test]
    fn test_instagram_variants() {
        assert_eq!(
            embed("https://www.instagram.com/reel/C1a2b3/").as_deref(),
            Some("https://www.instagram.com/reel/C1a2b3/embed")
        );
        assert_eq!(
            embed("https://instagram.com/reels/C1a2b3?igsh=xyz").as_deref(),
            Some("https://www.instagram.com/reel/C1a2b3/embed")
        );
        assert_eq!(
            embed("https://www.instagram.com/p/Bx_9-z/").as_deref(),
            Some("https://www.instagram.com/p/Bx_9-z/embed")
        );
        assert_eq!(
            resolve("https://www.instagram.com/p/Bx_9-z/").unwrap().0,
            ShortPlatform::Instagram
        );
    }

    #[test]
    fn test_unsupported_urls() {
        for url in [
            "",
            "not a url",
            "https://vimeo.com/12345",
            "https://www.youtube.com/channel/UC123",
            "https://www.instagram.com/someone/",
            "https://evil.example.com/?u=https://youtu.be/dQw4w9WgXcQ",
        ] {
            assert_eq!(embed(url), None, "{url}");
        }
    }
}
