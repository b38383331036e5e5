//! URL allow-list for `href` and `src` props.
//!
//! Schemas arrive from model output and from render-link query strings, so
//! link and media URLs are checked before they reach an attribute. Parsing
//! uses the WHATWG rules implemented by `url`, the same rules browsers
//! apply, so tabs or newlines spliced into a scheme are seen through.

use url::{ParseError, Url};

/// Where a URL ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlUse {
    /// `href` on a button link: `http`, `https`, `mailto`, `tel`.
    Link,
    /// `src` on an image or avatar: `http`, `https`, `data:image/...`.
    Media,
}

impl UrlUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Media => "media",
        }
    }
}

/// Whether `raw` may be emitted as a `usage` URL. Relative references
/// (paths, `?query`, `#fragment`, `//host/...`) are always allowed; blank
/// strings never are.
pub fn is_safe_url(raw: &str, usage: UrlUse) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    match Url::parse(trimmed) {
        Ok(url) => match (url.scheme(), usage) {
            ("http" | "https", _) => true,
            ("mailto" | "tel", UrlUse::Link) => true,
            ("data", UrlUse::Media) => url
                .path()
                .get(..6)
                .is_some_and(|media| media.eq_ignore_ascii_case("image/")),
            _ => false,
        },
        Err(ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}
