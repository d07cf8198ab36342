//! CSS color validation.

use std::sync::LazyLock;

use regex::Regex;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("hex color regex")
});

static FUNCTIONAL_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:rgba?|hsla?)\(\s*[-+0-9.%]+(?:deg)?(?:\s*[,\s/]\s*[-+0-9.%]+(?:deg)?){2,3}\s*\)$")
        .expect("functional color regex")
});

static KEYWORD_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]{3,20}$").expect("keyword color regex"));

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("'{0}' is not a valid color")]
pub struct ColorError(pub String);

/// Whether `value` looks like a CSS color the renderer can consume.
///
/// Accepts hex notation, `rgb()`/`rgba()`/`hsl()`/`hsla()` and alphabetic
/// keywords such as `steelblue`.
pub fn is_valid_color(value: &str) -> bool {
    let value = value.trim();
    HEX_COLOR.is_match(value) || FUNCTIONAL_COLOR.is_match(value) || KEYWORD_COLOR.is_match(value)
}
