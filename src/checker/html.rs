// src/checker/html.rs
// =============================================================================
// This module turns a fetched page body into the facts we report about it.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model) with html5ever
// - Never fails on bad markup; it repairs the tree the way browsers do
// - Supports CSS selectors for finding elements
//
// What we extract:
// - Document version (from the doctype only, not a conformance check)
// - Title, heading counts per level, login form presence
// - Every <a href> in document order, exactly as written
// - The <base href> override, if the page declares one
//
// Rust concepts:
// - LazyLock: build each Selector once and reuse it
// - Pattern matching on enum variants (Node::Doctype)
// =============================================================================

use scraper::node::Node;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::checker::resolve::resolve;
use crate::error::ParseError;
use crate::model::{DocumentVersion, HeadingCounts, PageMetadata};

// These selectors are constants and known to be valid
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static INPUT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("input").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static BASE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("base[href]").unwrap());
static HEADINGS: LazyLock<[Selector; 6]> = LazyLock::new(|| {
    HeadingCounts::TAGS.map(|tag| Selector::parse(tag).unwrap())
});

/// How many leading bytes we look at when deciding whether a body is text
const SNIFF_LEN: usize = 512;

/// Everything the parser found in one document
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub metadata: PageMetadata,
    /// Raw href values in document order, empty ones already removed
    pub hrefs: Vec<String>,
    /// Address relative links resolve against: <base href> or the page itself
    pub base: Url,
}

/// Parses a page body.
///
/// `declared_base` is the address the body was fetched from. It is the base
/// for relative links unless the document carries its own <base href>.
pub fn parse_document(body: &[u8], declared_base: &Url) -> Result<ParsedDocument, ParseError> {
    if let Some(position) = first_binary_byte(body) {
        return Err(ParseError {
            reason: format!("binary byte 0x{:02x} at offset {}", body[position], position),
        });
    }

    // Bad UTF-8 sequences become U+FFFD instead of failing the whole page
    let text = String::from_utf8_lossy(body);
    let document = Html::parse_document(&text);

    let metadata = PageMetadata {
        document_version: detect_version(&document),
        title: extract_title(&document),
        heading_counts: count_headings(&document),
        has_login_form: has_password_input(&document),
    };

    Ok(ParsedDocument {
        metadata,
        hrefs: extract_hrefs(&document),
        base: effective_base(&document, declared_base),
    })
}

// Position of the first byte that never appears in a text document
// (NUL and the other C0 controls except TAB, LF, FF, CR and ESC)
fn first_binary_byte(body: &[u8]) -> Option<usize> {
    body.iter()
        .take(SNIFF_LEN)
        .position(|&b| matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F))
}

// Heuristic: `<!DOCTYPE html>` with no identifiers is HTML5, any doctype with
// a public identifier is HTML4 (or an XHTML 1.x relative), everything else is
// Unknown. html5ever only keeps a doctype that precedes the content, so this
// looks at the start of the document and nowhere else.
fn detect_version(document: &Html) -> DocumentVersion {
    let doctype = document.tree.root().children().find_map(|child| match child.value() {
        Node::Doctype(doctype) => Some(doctype),
        _ => None,
    });

    match doctype {
        Some(d) if !d.public_id().is_empty() => DocumentVersion::Html4,
        Some(d) if d.name().eq_ignore_ascii_case("html") && d.system_id().is_empty() => {
            DocumentVersion::Html5
        }
        _ => DocumentVersion::Unknown,
    }
}

fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn count_headings(document: &Html) -> HeadingCounts {
    let mut counts = [0usize; 6];
    for (count, selector) in counts.iter_mut().zip(HEADINGS.iter()) {
        *count = document.select(selector).count();
    }
    HeadingCounts::from_counts(counts)
}

// Heuristic: one password field means a login form. The value must be exactly
// "password", so `type="PASSWORD"` does not count.
fn has_password_input(document: &Html) -> bool {
    document
        .select(&INPUT)
        .any(|input| input.value().attr("type") == Some("password"))
}

fn extract_hrefs(document: &Html) -> Vec<String> {
    document
        .select(&ANCHOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

fn effective_base(document: &Html, declared_base: &Url) -> Url {
    document
        .select(&BASE)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| resolve(href, declared_base))
        .unwrap_or_else(|| declared_base.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://example.com/docs/index.html").unwrap()
    }

    fn parse(html: &str) -> ParsedDocument {
        parse_document(html.as_bytes(), &page()).unwrap()
    }

    #[test]
    fn test_detects_html5() {
        let doc = parse("<!DOCTYPE html><html><head><title>x</title></head></html>");
        assert_eq!(doc.metadata.document_version, DocumentVersion::Html5);

        // Leading whitespace and lowercase are still the standards-mode marker
        let doc = parse("\n  <!doctype html><p>hi</p>");
        assert_eq!(doc.metadata.document_version, DocumentVersion::Html5);
    }

    #[test]
    fn test_detects_html4() {
        let doc = parse(
            r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd"><html></html>"#,
        );
        assert_eq!(doc.metadata.document_version, DocumentVersion::Html4);
    }

    #[test]
    fn test_unknown_without_doctype() {
        let doc = parse("<html><body><h1>No doctype</h1></body></html>");
        assert_eq!(doc.metadata.document_version, DocumentVersion::Unknown);

        let doc = parse(r#"<!DOCTYPE html SYSTEM "about:legacy-compat"><html></html>"#);
        assert_eq!(doc.metadata.document_version, DocumentVersion::Unknown);
    }

    #[test]
    fn test_first_title_only() {
        let doc = parse("<title>  First </title><svg><title>Second</title></svg>");
        assert_eq!(doc.metadata.title, "First");

        let doc = parse("<p>untitled</p>");
        assert_eq!(doc.metadata.title, "");
    }

    #[test]
    fn test_heading_counts_cover_all_levels() {
        let doc = parse("<h1>a</h1><div><section><h2>b</h2><h2>c</h2></section></div><h6>d</h6>");
        let counts = doc.metadata.heading_counts;
        assert_eq!(counts.iter().count(), 6);
        assert_eq!(counts.get(1), 1);
        assert_eq!(counts.get(2), 2);
        assert_eq!(counts.get(3), 0);
        assert_eq!(counts.get(6), 1);
    }

    #[test]
    fn test_login_form_needs_password_input() {
        let doc = parse(r#"<form><input type="text" name="user"><input type="password"></form>"#);
        assert!(doc.metadata.has_login_form);

        let doc = parse(r#"<form><input type="text"><input type="submit"></form>"#);
        assert!(!doc.metadata.has_login_form);
    }

    #[test]
    fn test_hrefs_in_document_order_skipping_empty() {
        let doc = parse(
            r##"<a href="/one">1</a><a>no href</a><a href="">empty</a>
                <p><a href="#frag">2</a></p><a href="/one">dup</a>"##,
        );
        assert_eq!(doc.hrefs, vec!["/one", "#frag", "/one"]);
    }

    #[test]
    fn test_base_href_overrides_page_address() {
        let doc = parse(r#"<head><base href="https://cdn.example.com/assets/"></head>"#);
        assert_eq!(doc.base.as_str(), "https://cdn.example.com/assets/");

        let doc = parse("<head></head>");
        assert_eq!(doc.base, page());
    }

    #[test]
    fn test_malformed_markup_is_best_effort() {
        let doc = parse("<html><body><h1>unclosed<p><a href='/x'>x</span></div><h2>");
        assert_eq!(doc.metadata.document_version, DocumentVersion::Unknown);
        assert_eq!(doc.metadata.heading_counts.get(1), 1);
        assert_eq!(doc.hrefs, vec!["/x"]);
    }

    #[test]
    fn test_binary_body_is_rejected() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
        let err = parse_document(&png, &page()).unwrap_err();
        assert!(err.reason.contains("binary byte"));
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let body = b"<!DOCTYPE html><title>caf\xe9</title>";
        let doc = parse_document(body, &page()).unwrap();
        assert_eq!(doc.metadata.document_version, DocumentVersion::Html5);
        assert!(doc.metadata.title.starts_with("caf"));
    }
}
