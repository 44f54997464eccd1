//! Unit tests for free-text classification into link, color and text bookmarks.

use rstest::rstest;

use minimark::services::input_parser::{
    is_url, link_title, normalize_url, parse_color, parse_input, BookmarkDraft,
};
use minimark::types::bookmark::BookmarkType;
use minimark::types::errors::ValidationError;

// ─── Colors ───

/// Validates: hex, rgb and hsl notations normalize to a hex string.
#[rstest]
#[case("#FF5733", "#FF5733")]
#[case("FF5733", "#FF5733")]
#[case("#fff", "#ffffff")]
#[case("#AbC", "#AAbbCC")]
#[case("#12345678", "#12345678")]
#[case("rgb(255, 0, 0)", "#ff0000")]
#[case("RGBA(0, 128, 255, 0.5)", "#0080ff")]
#[case("hsl(0, 100%, 50%)", "#ff0000")]
#[case("hsl(120, 100%, 50%)", "#00ff00")]
#[case("  #000000  ", "#000000")]
fn test_parse_color_accepts(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(parse_color(input).as_deref(), Some(expected));
}

#[rstest]
#[case("#GGGGGG")]
#[case("#12345")]
#[case("red")]
#[case("rgb(1, 2)")]
#[case("")]
fn test_parse_color_rejects(#[case] input: &str) {
    assert_eq!(parse_color(input), None);
}

// ─── URLs ───

#[rstest]
#[case("example.com", true)]
#[case("https://github.com/rust-lang", true)]
#[case("http://sub.domain.co.uk/path?q=1", true)]
#[case("localhost", false)]
#[case("just some words", false)]
#[case("ftp://example.com", false)]
fn test_is_url(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(is_url(input), expected);
}

#[test]
fn test_normalize_url_adds_scheme_once() {
    assert_eq!(normalize_url("example.com"), "https://example.com");
    assert_eq!(normalize_url("http://example.com"), "http://example.com");
    assert_eq!(normalize_url("https://example.com"), "https://example.com");
}

#[test]
fn test_link_title_strips_www() {
    assert_eq!(link_title("https://www.rust-lang.org/learn").as_deref(), Some("rust-lang.org"));
    assert_eq!(link_title("https://docs.rs").as_deref(), Some("docs.rs"));
    assert_eq!(link_title("not a url"), None);
}

// ─── Classification ───

/// A color input becomes a color bookmark titled with the raw text.
///
/// Validates: color classification
#[test]
fn test_hex_input_becomes_color_bookmark() {
    let draft = parse_input("#FF5733").unwrap();
    assert_eq!(
        draft,
        BookmarkDraft {
            title: "#FF5733".to_string(),
            url: None,
            kind: BookmarkType::Color,
            color: Some("#FF5733".to_string()),
        }
    );
}

/// A bare domain becomes an https link titled with its host.
///
/// Validates: link classification
#[test]
fn test_domain_input_becomes_link() {
    let draft = parse_input("example.com").unwrap();
    assert_eq!(draft.kind, BookmarkType::Link);
    assert_eq!(draft.url.as_deref(), Some("https://example.com"));
    assert_eq!(draft.title, "example.com");
    assert_eq!(draft.color, None);
}

#[test]
fn test_link_title_drops_www_prefix() {
    let draft = parse_input("www.github.com").unwrap();
    assert_eq!(draft.url.as_deref(), Some("https://www.github.com"));
    assert_eq!(draft.title, "github.com");
}

#[rstest]
#[case("remember the milk")]
#[case("line one\nexample.com")]
fn test_other_input_becomes_text(#[case] input: &str) {
    assert_eq!(parse_input(input).unwrap(), BookmarkDraft::text(input));
}

#[test]
fn test_input_is_trimmed() {
    assert_eq!(parse_input("  note  ").unwrap().title, "note");
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
fn test_blank_input_is_rejected(#[case] input: &str) {
    assert_eq!(parse_input(input), Err(ValidationError::EmptyTitle));
}
