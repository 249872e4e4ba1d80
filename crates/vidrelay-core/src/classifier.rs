//! Recognition of supported video platform URLs.
//!
//! The check is a regex *search*: a URL is accepted when any of the
//! platform patterns occurs somewhere in the input. Hosts are matched
//! case-insensitively and must be followed by a `/`.

use lazy_regex::{lazy_regex, Lazy, Regex};
use std::fmt;

static YOUTUBE: Lazy<Regex> = lazy_regex!(r"(?i)(https?://)?(www\.)?(youtube\.com|youtu\.be)/");
static TIKTOK: Lazy<Regex> = lazy_regex!(r"(?i)(https?://)?(www\.)?(tiktok\.com|vm\.tiktok\.com)/");
static INSTAGRAM: Lazy<Regex> = lazy_regex!(r"(?i)(https?://)?(www\.)?(instagram\.com)/");

/// Video platforms the bot knows how to relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// `youtube.com`, `youtu.be`
    YouTube,
    /// `tiktok.com`, `vm.tiktok.com`
    TikTok,
    /// `instagram.com`
    Instagram,
}

impl Platform {
    /// Human-readable platform name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::TikTok => "TikTok",
            Self::Instagram => "Instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returns the platform whose URL pattern occurs in `input`, if any.
///
/// # Examples
///
/// ```
/// use vidrelay_core::classifier::{classify, Platform};
///
/// assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ"), Some(Platform::YouTube));
/// assert_eq!(classify("https://vimeo.com/123"), None);
/// ```
#[must_use]
pub fn classify(input: &str) -> Option<Platform> {
    if YOUTUBE.is_match(input) {
        Some(Platform::YouTube)
    } else if TIKTOK.is_match(input) {
        Some(Platform::TikTok)
    } else if INSTAGRAM.is_match(input) {
        Some(Platform::Instagram)
    } else {
        None
    }
}

/// Returns true iff `input` looks like a link to a supported platform.
#[must_use]
pub fn is_supported_url(input: &str) -> bool {
    classify(input).is_some()
}
