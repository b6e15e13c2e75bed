use super::types::{NormalizedUrl, OtherPlatform, Platform};

/// Primary and short-link domains of the platform this bot downloads from.
const SUPPORTED_MARKERS: &[&str] = &["facebook.com", "fb.watch"];

const OTHER_MARKERS: &[(OtherPlatform, &[&str])] = &[
    (OtherPlatform::YouTube, &["youtube.com", "youtu.be"]),
    (OtherPlatform::Instagram, &["instagram.com"]),
];

/// Decide which platform a link belongs to. Pure; no network access.
pub fn classify(url: &NormalizedUrl) -> Platform {
    if matches_any(url, SUPPORTED_MARKERS) {
        return Platform::Supported;
    }

    OTHER_MARKERS
        .iter()
        .find(|(_, markers)| matches_any(url, markers))
        .map(|(platform, _)| Platform::KnownUnsupported(*platform))
        .unwrap_or(Platform::Unsupported)
}

fn matches_any(url: &NormalizedUrl, markers: &[&str]) -> bool {
    let host = url.host();
    let path = url.path().to_lowercase();
    markers.iter().any(|marker| {
        host == *marker || host.ends_with(&format!(".{}", marker)) || path.contains(marker)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::normalize;

    fn classify_str(raw: &str) -> Platform {
        classify(&normalize(raw).unwrap())
    }

    #[test]
    fn facebook_links_are_supported() {
        assert_eq!(classify_str("https://www.facebook.com/watch?v=1"), Platform::Supported);
        assert_eq!(classify_str("https://m.facebook.com/reel/42"), Platform::Supported);
        assert_eq!(classify_str("fb.watch/abcDEF"), Platform::Supported);
    }

    #[test]
    fn marker_in_path_counts() {
        assert_eq!(
            classify_str("https://l.example.net/redirect/facebook.com/video"),
            Platform::Supported
        );
    }

    #[test]
    fn youtube_gets_tailored_reply() {
        let platform = classify_str("https://youtu.be/xyz");
        assert_eq!(platform, Platform::KnownUnsupported(OtherPlatform::YouTube));
        if let Platform::KnownUnsupported(other) = platform {
            assert_eq!(other.name(), "youtube");
            assert!(other.suggestion().contains("@StreamifyYTBot"));
        }
    }

    #[test]
    fn instagram_gets_tailored_reply() {
        assert_eq!(
            classify_str("https://www.instagram.com/reel/C0ffee/"),
            Platform::KnownUnsupported(OtherPlatform::Instagram)
        );
    }

    #[test]
    fn lookalike_host_is_not_supported() {
        assert_eq!(classify_str("https://notfacebook.community/x"), Platform::Unsupported);
        assert_eq!(classify_str("https://example.org/video.mp4"), Platform::Unsupported);
    }
}
