//! Classifies free-text input into a link, color or text bookmark.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::types::bookmark::BookmarkType;
use crate::types::errors::ValidationError;

static HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?([A-Fa-f0-9]{3,4}|[A-Fa-f0-9]{6}|[A-Fa-f0-9]{8})$").expect("valid hex regex")
});

static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^rgba?\s*\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})(?:\s*,\s*[\d.]+)?\s*\)$")
        .expect("valid rgb regex")
});

static HSL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^hsla?\s*\(\s*(\d{1,3})\s*,\s*(\d{1,3})%?\s*,\s*(\d{1,3})%?(?:\s*,\s*[\d.]+)?\s*\)$",
    )
    .expect("valid hsl regex")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)?[\w.-]+\.[a-z]{2,}").expect("valid url regex")
});

/// A bookmark as typed by the user, before it has an id or a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkDraft {
    pub title: String,
    pub url: Option<String>,
    pub kind: BookmarkType,
    pub color: Option<String>,
}

impl BookmarkDraft {
    pub fn text(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: None,
            kind: BookmarkType::Text,
            color: None,
        }
    }
}

/// Parses CSS-like color syntax into a `#hex` string.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` (the `#` is optional),
/// `rgb()`/`rgba()` and `hsl()`/`hsla()`. Only the three digit form is
/// expanded; other hex input keeps its length and case.
pub fn parse_color(value: &str) -> Option<String> {
    let trimmed = value.trim();

    if let Some(caps) = HEX_RE.captures(trimmed) {
        let digits = &caps[1];
        if digits.len() == 3 {
            let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
            return Some(format!("#{}", expanded));
        }
        return Some(format!("#{}", digits));
    }

    if let Some(caps) = RGB_RE.captures(trimmed) {
        let channel = |i: usize| caps[i].parse::<u32>().unwrap_or(0);
        return Some(format!(
            "#{:02x}{:02x}{:02x}",
            channel(1),
            channel(2),
            channel(3)
        ));
    }

    if let Some(caps) = HSL_RE.captures(trimmed) {
        let number = |i: usize| caps[i].parse::<f64>().unwrap_or(0.0);
        return Some(hsl_to_hex(number(1), number(2) / 100.0, number(3) / 100.0));
    }

    None
}

fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if (0.0..60.0).contains(&h) => (c, x, 0.0),
        h if (60.0..120.0).contains(&h) => (x, c, 0.0),
        h if (120.0..180.0).contains(&h) => (0.0, c, x),
        h if (180.0..240.0).contains(&h) => (0.0, x, c),
        h if (240.0..300.0).contains(&h) => (x, 0.0, c),
        h if (300.0..360.0).contains(&h) => (c, 0.0, x),
        _ => (0.0, 0.0, 0.0),
    };

    let to_hex = |n: f64| format!("{:02x}", ((n + m) * 255.0).round().max(0.0) as u32);
    format!("#{}{}{}", to_hex(r), to_hex(g), to_hex(b))
}

/// Loose "looks like a URL" check: optional scheme, a dotted host and a TLD.
pub fn is_url(value: &str) -> bool {
    URL_RE.is_match(value)
}

/// Defaults the scheme to https unless the value already starts with `http`.
pub fn normalize_url(value: &str) -> String {
    if value.starts_with("http") {
        value.to_string()
    } else {
        format!("https://{}", value)
    }
}

/// Title for a link bookmark: the host without its first `www.`.
pub fn link_title(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.replacen("www.", "", 1))
}

/// Turns raw input into a draft: color syntax wins, then single-line URLs,
/// everything else is text.
pub fn parse_input(value: &str) -> Result<BookmarkDraft, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    if let Some(hex) = parse_color(trimmed) {
        return Ok(BookmarkDraft {
            title: trimmed.to_string(),
            url: None,
            kind: BookmarkType::Color,
            color: Some(hex),
        });
    }

    if !trimmed.contains('\n') && is_url(trimmed) {
        let url = normalize_url(trimmed);
        let title = link_title(&url).unwrap_or_else(|| trimmed.to_string());
        return Ok(BookmarkDraft {
            title,
            url: Some(url),
            kind: BookmarkType::Link,
            color: None,
        });
    }

    Ok(BookmarkDraft::text(trimmed))
}
