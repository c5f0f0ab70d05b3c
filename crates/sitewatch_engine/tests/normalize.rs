use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use sitewatch_engine::{content_hash, normalize};

const SCOPED_PAGE: &str = concat!(
    "<html><head><meta name=\"description\" content=\"Whole page\"></head>",
    "<body><div id=\"main\"><p>Inside</p></div>",
    "<footer><p>Outside</p></footer></body></html>"
);

#[test]
fn scripts_styles_and_comments_are_stripped() {
    let raw = concat!(
        "<!DOCTYPE html><html><head>",
        "<style>body { color: red; }</style>",
        "<script>alert(\"x\");</script>",
        "</head><body><p>Kept</p><!-- secret note --></body></html>"
    );

    let page = normalize(raw, None);

    assert_eq!(page.visible_text, "Kept");
    assert!(page.structural_markup.starts_with("<!DOCTYPE html>"));
    assert!(!page.structural_markup.contains("alert"));
    assert!(!page.structural_markup.contains("color"));
    assert!(!page.structural_markup.contains("secret"));
}

#[test]
fn visible_text_is_trimmed_and_newline_joined() {
    let raw = concat!(
        "<html><body><h1>  Welcome  </h1>",
        "<p>First line</p><p>Second   line</p></body></html>"
    );

    let page = normalize(raw, None);

    assert_eq!(page.visible_text, "Welcome\nFirst line\nSecond   line");
}

#[test]
fn metadata_needs_both_name_and_content() {
    let raw = concat!(
        "<html><head>",
        "<meta name=\"description\" content=\"A site\">",
        "<meta name=\"author\" content=\"\">",
        "<meta name=\"\" content=\"orphan\">",
        "<meta charset=\"utf-8\">",
        "<meta property=\"og:title\" content=\"Og\">",
        "</head><body><p>x</p></body></html>"
    );

    let page = normalize(raw, None);

    let expected =
        BTreeMap::from([("description".to_string(), "A site".to_string())]);
    assert_eq!(page.metadata, expected);
}

#[test]
fn selector_scopes_the_extraction() {
    let page = normalize(SCOPED_PAGE, Some("#main"));

    assert_eq!(page.visible_text, "Inside");
    assert_eq!(page.structural_markup, r#"<div id="main"><p>Inside</p></div>"#);
    assert!(page.metadata.is_empty());
}

#[test]
fn invalid_selector_falls_back_to_the_whole_document() {
    let page = normalize(SCOPED_PAGE, Some("p["));

    assert!(page.visible_text.contains("Inside"));
    assert!(page.visible_text.contains("Outside"));
    assert_eq!(page.metadata.get("description").map(String::as_str), Some("Whole page"));
}

#[test]
fn unmatched_selector_falls_back_to_the_whole_document() {
    let page = normalize(SCOPED_PAGE, Some(".missing"));

    assert!(page.visible_text.contains("Inside"));
    assert!(page.visible_text.contains("Outside"));
}

#[test]
fn identical_markup_normalizes_identically() {
    let raw = "<html><body><p>Stable</p><img src=\"a.png\"></body></html>";

    assert_eq!(normalize(raw, None), normalize(raw, None));
}

#[test]
fn void_elements_keep_single_tags() {
    let raw = concat!(
        "<html><body><p>Line one<br>Line two</p>",
        "<img src=\"logo.png\"></body></html>"
    );

    let page = normalize(raw, None);

    assert_eq!(page.visible_text, "Line one\nLine two");
    assert!(page.structural_markup.contains("<br>"));
    assert!(page.structural_markup.contains(r#"<img src="logo.png">"#));
    assert!(!page.structural_markup.contains("</br>"));
    assert!(!page.structural_markup.contains("</img>"));
}

#[test]
fn entities_stay_decoded_in_text_and_escaped_in_markup() {
    let raw = "<html><body><p>Fish &amp; chips</p></body></html>";

    let page = normalize(raw, None);

    assert_eq!(page.visible_text, "Fish & chips");
    assert!(page.structural_markup.contains("Fish &amp; chips"));
}

#[test]
fn content_hash_is_hex_and_input_sensitive() {
    let first = content_hash("<html><body>a</body></html>");
    let again = content_hash("<html><body>a</body></html>");
    let other = content_hash("<html><body>b</body></html>");

    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|ch| ch.is_ascii_hexdigit()));
}
