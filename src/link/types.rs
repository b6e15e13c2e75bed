use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// An absolute URL with a scheme, a lowercase host and no fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    /// Wrap an already parsed URL, dropping its fragment.
    ///
    /// Returns `None` when the URL carries no usable host.
    pub fn from_url(mut url: Url) -> Option<Self> {
        match url.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => return None,
        }
        url.set_fragment(None);
        Some(Self(url))
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.0.query()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// A well-known video platform this bot recognises but does not download from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherPlatform {
    YouTube,
    Instagram,
}

impl OtherPlatform {
    pub fn name(&self) -> &'static str {
        match self {
            OtherPlatform::YouTube => "youtube",
            OtherPlatform::Instagram => "instagram",
        }
    }

    /// Reply pointing the user at a bot that handles this platform.
    pub fn suggestion(&self) -> &'static str {
        match self {
            OtherPlatform::YouTube => {
                "⚠️ Streamify-FB only supports Facebook links.\n\
                 For YouTube downloads, try @StreamifyYTBot 🎬"
            }
            OtherPlatform::Instagram => {
                "⚠️ Streamify-FB only supports Facebook links.\n\
                 For Instagram videos, check out @InstaStreamBot 📸"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Supported,
    KnownUnsupported(OtherPlatform),
    Unsupported,
}
